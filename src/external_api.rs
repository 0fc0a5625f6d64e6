pub mod paperless_api;

use log::debug;
use reqwest::{header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE}, Client, RequestBuilder, StatusCode, Url};
use thiserror::Error;

const APPLICATION_JSON: &str = "application/json";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Api error {0}: {1}")]
    Api(StatusCode, String),
    #[error("Deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid API token")]
    InvalidApiKey,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to retrieve the user's directories")]
    NotFoundUserDir,
    #[error("The string entered must be a URL")]
    InvalidUrl,
    #[error("Your token failed validation, please try again")]
    InvalidToken,
    #[error("Couldn't create a config")]
    CantCreateConfig,
    #[error("Couldn't read the config at path: <{0}>. Run `pcf init` first")]
    ConfigNotFound(String),
    #[error("The ID must be greater than zero")]
    IdMoreThenZero,
    #[error("Couldn't find a custom field with ID == {0}")]
    CouldNotFindCustomFieldById(u32),
    #[error("'{0}' has not been saved yet and has no ID")]
    NotSaved(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unsupported filter rule type: {0}")]
    UnsupportedFilterRule(u32),
    #[error("Permission denied: cannot {0} {1}")]
    PermissionDenied(String, String),
    #[error("Deletion cancelled by user")]
    DeleteCancelledByUser,
}

/// Basic api client
pub struct BaseApiClient {
    client: Client,
    pub base_url: Url,
}

impl BaseApiClient {

    /// Endpoints are relative to the base url, a leading `/` does not drop its path
    fn build_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    fn get_default_headers(api_key: &str) -> Result<HeaderMap, ApiError>{
        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));

        match HeaderValue::from_str(&format!("Token {}", api_key)) {
            Ok(value) => headers.insert(AUTHORIZATION, value),
            Err(_) => return Err(ApiError::InvalidApiKey)
        };

        Ok(headers)
    }

    async fn send(&self, method: &str, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{} {} -> {}", method, response.url(), status);
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Api(status, body));
        }
        Ok(body)
    }

    async fn handle_response<T: serde::de::DeserializeOwned> (
        &self,
        method: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(method, request).await?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => Err(ApiError::Serde(e))
        }
    }

    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ApiError> {
        let default_headers = Self::get_default_headers(api_key)?;

        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        let mut parse_base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        // without the trailing slash `join` would replace the last path segment
        if !parse_base_url.path().ends_with('/') {
            let path = format!("{}/", parse_base_url.path());
            parse_base_url.set_path(&path);
        }

        Ok(
            Self {
                client,
                base_url: parse_base_url,
        })
    }

    pub async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = self.build_url(endpoint)?;
        self.handle_response("GET", self.client.get(url).query(query)).await
    }

    pub async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.build_url(endpoint)?;
        self.handle_response("POST", self.client.post(url).json(body)).await
    }

    pub async fn put<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.build_url(endpoint)?;
        self.handle_response("PUT", self.client.put(url).json(body)).await
    }

    /// DELETE answers with an empty body, so nothing is deserialized
    pub async fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        let url = self.build_url(endpoint)?;
        self.send("DELETE", self.client.delete(url)).await?;
        Ok(())
    }
}
