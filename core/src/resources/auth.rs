use uuid::Uuid;

use crate::client::MenuHttpClient;
use crate::error::ApiError;
use crate::schema::registry::{CREATE_USER, RESET_PASSWORD, UPDATE_API_KEY};
use crate::transport::Transport;
use crate::types::{
    ApiKey, CreateApiKeyInput, CreateUserInput, NewApiKey, ResetPasswordInput, ResponseMessage, SignInToken,
    UpdateApiKeyInput,
};
use crate::validator::{validate_password, validate_schema};

/// `/auth` resource family: accounts, sign-in and API keys.
pub struct Auth<'a, T> {
    http: &'a MenuHttpClient<T>,
}

impl<'a, T: Transport> Auth<'a, T> {
    pub fn new(http: &'a MenuHttpClient<T>) -> Self {
        Self { http }
    }

    pub fn sign_up(&self, input: &CreateUserInput) -> Result<ResponseMessage, ApiError> {
        validate_schema(&CREATE_USER, input)?;
        self.http.post("/auth/sign-up", input)
    }

    /// Credentials are forwarded as-is; the server is the only judge.
    pub fn sign_in(&self, input: &CreateUserInput) -> Result<SignInToken, ApiError> {
        self.http.post("/auth/sign-in", input)
    }

    /// Issue a new API key. The plaintext key is only ever returned here.
    pub fn create_api_key(&self, input: &CreateApiKeyInput) -> Result<NewApiKey, ApiError> {
        self.http.post("/auth/api-key", input)
    }

    pub fn get_api_keys(&self) -> Result<Vec<ApiKey>, ApiError> {
        self.http.get("/auth/api-keys")
    }

    pub fn get_api_key(&self, alias: Uuid) -> Result<ApiKey, ApiError> {
        self.http.get(&format!("/auth/api-keys/{alias}"))
    }

    /// Rename, enable or revoke a key.
    pub fn update_api_key(&self, alias: Uuid, input: &UpdateApiKeyInput) -> Result<ApiKey, ApiError> {
        validate_schema(&UPDATE_API_KEY, input)?;
        self.http.patch(&format!("/auth/api-keys/{alias}"), input)
    }

    /// Ask the server to mail a one-time PIN to `email`.
    pub fn forgot_password(&self, email: &str) -> Result<ResponseMessage, ApiError> {
        self.http.post("/auth/forgot-password", email)
    }

    /// Schema violations are reported ahead of password strength.
    pub fn reset_password(&self, input: &ResetPasswordInput) -> Result<ResponseMessage, ApiError> {
        validate_schema(&RESET_PASSWORD, input)?;
        validate_password(&input.password)?;
        self.http.post("/auth/reset-password", input)
    }
}
