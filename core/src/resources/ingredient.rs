use crate::client::MenuHttpClient;
use crate::error::ApiError;
use crate::schema::registry::CREATE_INGREDIENT;
use crate::transport::Transport;
use crate::types::{CreateIngredientInput, ResponseMessage, UploadResult};
use crate::upload::UploadPayload;
use crate::validator::{validate_schema, validate_upload_file};

/// `/ingredients` resource family.
pub struct Ingredients<'a, T> {
    http: &'a MenuHttpClient<T>,
}

impl<'a, T: Transport> Ingredients<'a, T> {
    pub fn new(http: &'a MenuHttpClient<T>) -> Self {
        Self { http }
    }

    pub fn update(&self, id: u64, input: &CreateIngredientInput) -> Result<ResponseMessage, ApiError> {
        validate_schema(&CREATE_INGREDIENT, input)?;
        self.http.put(&format!("/ingredients/{id}"), input)
    }

    pub fn delete(&self, id: u64) -> Result<ResponseMessage, ApiError> {
        self.http.delete(&format!("/ingredients/{id}"))
    }

    pub fn upload(&self, id: u64, image: UploadPayload) -> Result<UploadResult, ApiError> {
        validate_upload_file(&image)?;
        self.http.put_form(&format!("/ingredients/{id}/upload"), image.into_form())
    }
}
