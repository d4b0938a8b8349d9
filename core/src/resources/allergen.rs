use crate::client::MenuHttpClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::AllergenResult;

/// `/allergens` resource family. Read-only.
pub struct Allergens<'a, T> {
    http: &'a MenuHttpClient<T>,
}

impl<'a, T: Transport> Allergens<'a, T> {
    pub fn new(http: &'a MenuHttpClient<T>) -> Self {
        Self { http }
    }

    pub fn get_allergens(&self) -> Result<Vec<AllergenResult>, ApiError> {
        self.http.get("/allergens")
    }

    pub fn get_allergen(&self, id: u64) -> Result<AllergenResult, ApiError> {
        self.http.get(&format!("/allergens/{id}"))
    }
}
