//! Form service API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::error::{DynaformError, Result};
use crate::schema::{FormResponse, User};

/// Default form service endpoint
pub const DEFAULT_API_URL: &str = "https://dynamic-form-generator-9rl7.onrender.com";

/// Message reported for a duplicate registration
pub const USER_EXISTS_MESSAGE: &str = "User already exists. You can login with your credentials.";

/// Message reported when a success body does not carry a usable form
pub const INVALID_FORM_MESSAGE: &str = "Invalid form data received from server";

/// Operations the form service offers
#[async_trait]
pub trait FormApi: Send + Sync {
    /// Register a new account
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Fetch the form assigned to `roll_number`
    async fn get_form(&self, roll_number: &str) -> Result<FormResponse>;
}

/// HTTP client for the form service
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ServerMessage {
    #[serde(default)]
    message: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        Url::parse(base_url)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }
}

#[async_trait]
impl FormApi for ApiClient {
    async fn create_user(&self, user: &User) -> Result<()> {
        let url = self.endpoint("/create-user")?;
        tracing::info!("Creating user {}", user.roll_number);

        let resp = self.client.post(url).json(user).send().await?;
        let status = resp.status();
        if status == StatusCode::CONFLICT {
            return Err(DynaformError::Server {
                status: status.as_u16(),
                message: USER_EXISTS_MESSAGE.into(),
            });
        }
        if !status.is_success() {
            let body = resp.bytes().await?;
            return Err(DynaformError::Server {
                status: status.as_u16(),
                message: server_message(&body)
                    .unwrap_or_else(|| format!("Failed to create user ({})", status.as_u16())),
            });
        }
        Ok(())
    }

    async fn get_form(&self, roll_number: &str) -> Result<FormResponse> {
        let mut url = self.endpoint("/get-form")?;
        url.query_pairs_mut().append_pair("rollNumber", roll_number);
        tracing::info!("Fetching form for {}", roll_number);

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            return Err(DynaformError::Server {
                status: status.as_u16(),
                message: server_message(&body)
                    .unwrap_or_else(|| format!("Failed to fetch form ({})", status.as_u16())),
            });
        }

        let json: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|_| DynaformError::Payload(INVALID_FORM_MESSAGE.into()))?;
        if json.pointer("/form/sections").map_or(true, |s| s.is_null()) {
            return Err(DynaformError::Payload(INVALID_FORM_MESSAGE.into()));
        }
        let response = FormResponse::from_value(json)
            .map_err(|e| DynaformError::Payload(format!("{}: {}", INVALID_FORM_MESSAGE, e)))?;
        response.form.check()?;

        tracing::debug!(
            "Fetched form {} v{} with {} section(s)",
            response.form.form_id,
            response.form.version,
            response.form.sections.len()
        );
        Ok(response)
    }
}

fn server_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ServerMessage>(body)
        .ok()
        .and_then(|m| m.message)
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form_body() -> serde_json::Value {
        json!({
            "message": "ok",
            "form": {
                "formTitle": "Student Form",
                "formId": "f-1",
                "version": "2",
                "sections": [{
                    "sectionId": 1,
                    "title": "Basics",
                    "description": "",
                    "fields": [{"fieldId": "name", "type": "text", "label": "Name",
                                "required": true, "dataTestId": "name-input"}]
                }]
            }
        })
    }

    async fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), None).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create-user"))
            .and(body_json(json!({"rollNumber": "R1", "name": "Al"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "created"})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).await.create_user(&User::new("R1", "Al")).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_user_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create-user"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "dup"})))
            .mount(&server)
            .await;

        let err = client(&server).await.create_user(&User::new("R1", "Al")).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), USER_EXISTS_MESSAGE);
    }

    #[tokio::test]
    async fn test_create_user_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
            .mount(&server)
            .await;

        let err = client(&server).await.create_user(&User::new("R1", "Al")).await.unwrap_err();
        assert!(!err.is_conflict());
        assert_eq!(err.to_string(), "db down");
    }

    #[tokio::test]
    async fn test_get_form_encodes_roll_number() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-form"))
            .and(query_param("rollNumber", "R 1/&x"))
            .respond_with(ResponseTemplate::new(200).set_body_json(form_body()))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server).await.get_form("R 1/&x").await.unwrap();
        assert_eq!(response.message, "ok");
        assert_eq!(response.form.form_id, "f-1");
        assert_eq!(response.form.sections[0].fields[0].field_id, "name");
    }

    #[tokio::test]
    async fn test_get_form_missing_sections() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-form"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok", "form": {}})))
            .mount(&server)
            .await;

        let err = client(&server).await.get_form("R1").await.unwrap_err();
        assert!(matches!(err, DynaformError::Payload(_)));
        assert_eq!(err.to_string(), INVALID_FORM_MESSAGE);
    }

    #[tokio::test]
    async fn test_get_form_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-form"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server).await.get_form("R1").await.unwrap_err();
        assert!(matches!(err, DynaformError::Server { status: 404, .. }));
        assert_eq!(err.to_string(), "Failed to fetch form (404)");
    }

    #[tokio::test]
    async fn test_network_failure() {
        let api = ApiClient::new("http://127.0.0.1:1", None).unwrap();
        let err = api.get_form("R1").await.unwrap_err();
        assert!(matches!(err, DynaformError::Network(_)));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(ApiClient::new("not a url", None), Err(DynaformError::Url(_))));
    }
}
