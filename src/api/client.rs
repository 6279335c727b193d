use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ApiError;
use crate::kasi_config::ApiConfig;
use crate::models::normalize_identity;
use crate::session::Session;

const USER_AGENT: &str = concat!("kasi-manager/", env!("CARGO_PKG_VERSION"));

/// What a request is about, used to shape error mapping.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target<'a> {
    pub resource: &'static str,
    pub id: Option<&'a str>,
    /// Whether a 401 means our session died (true) or the credentials
    /// themselves were rejected (false, only for login).
    pub authenticated: bool,
}

impl<'a> Target<'a> {
    pub fn collection(resource: &'static str) -> Self {
        Self {
            resource,
            id: None,
            authenticated: true,
        }
    }

    pub fn item(resource: &'static str, id: &'a str) -> Self {
        Self {
            resource,
            id: Some(id),
            authenticated: true,
        }
    }
}

/// Shared HTTP plumbing for every resource client.
///
/// Holds the connection pool, the base URLs and the session. Cloning is
/// cheap and shares all three.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    upload_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        upload_url: Option<&str>,
        timeout: Option<Duration>,
        session: Session,
    ) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let upload_url = upload_url
            .map(|u| u.to_string())
            .unwrap_or_else(|| format!("{}/file-management/upload", base_url));
        Ok(Self {
            http,
            base_url,
            upload_url,
            session,
        })
    }

    pub fn from_config(config: &ApiConfig, session: Session) -> anyhow::Result<Self> {
        Self::new(
            &config.base_url,
            config.upload_url.as_deref(),
            config.timeout_secs.map(Duration::from_secs),
            session,
        )
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request builder carrying the bearer token. Fails before any I/O when
    /// the local auth predicate does not hold.
    pub(crate) fn authorized(&self, method: Method, url: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.session.bearer_token()?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    pub(crate) fn anonymous(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send a request and turn any non-2xx answer into an [`ApiError`].
    pub(crate) async fn dispatch(
        &self,
        request: RequestBuilder,
        target: Target<'_>,
    ) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(resource = target.resource, error = %e, "Request failed to reach the server");
            ApiError::Network(e)
        })?;

        let status = response.status();
        tracing::debug!(
            resource = target.resource,
            id = target.id,
            status = status.as_u16(),
            "Response received"
        );
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body);
        let error = match status {
            StatusCode::UNAUTHORIZED if target.authenticated => {
                self.session.teardown();
                ApiError::Unauthenticated(message.unwrap_or_else(|| {
                    "Your session has expired. Run `kasi login` again.".to_string()
                }))
            }
            StatusCode::NOT_FOUND if target.id.is_some() => ApiError::NotFound {
                resource: target.resource,
                id: target.id.unwrap_or_default().to_string(),
            },
            _ => ApiError::Http {
                status: status.as_u16(),
                message,
            },
        };
        tracing::warn!(resource = target.resource, id = target.id, error = %error, "Request rejected");
        Err(error)
    }

    pub(crate) async fn decode<T: DeserializeOwned>(
        response: Response,
        context: &str,
    ) -> Result<T, ApiError> {
        let value = Self::decode_value(response, context).await?;
        from_normalized(value, context)
    }

    pub(crate) async fn decode_value(response: Response, context: &str) -> Result<Value, ApiError> {
        let bytes = response.bytes().await.map_err(ApiError::Network)?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Parse {
            context: context.to_string(),
            source,
        })
    }
}

/// Normalize identity keys across the tree, then deserialize.
pub(crate) fn from_normalized<T: DeserializeOwned>(
    mut value: Value,
    context: &str,
) -> Result<T, ApiError> {
    normalize_identity(&mut value);
    serde_json::from_value(value).map_err(|source| ApiError::Parse {
        context: context.to_string(),
        source,
    })
}

/// Pull a human-readable message out of an error body.
///
/// JSON bodies use `message` (a string or a list of strings) or `error`;
/// short plain-text bodies are used as-is.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => {
            for key in ["message", "error"] {
                match map.get(key) {
                    Some(Value::String(s)) if !s.trim().is_empty() => {
                        return Some(s.trim().to_string());
                    }
                    Some(Value::Array(parts)) => {
                        let joined: Vec<&str> = parts.iter().filter_map(Value::as_str).collect();
                        if !joined.is_empty() {
                            return Some(joined.join("; "));
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        Ok(_) => None,
        Err(_) if trimmed.len() <= 200 && !trimmed.starts_with('<') => Some(trimmed.to_string()),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_from_json() {
        assert_eq!(
            extract_message(r#"{"message": "Slug already exists"}"#).as_deref(),
            Some("Slug already exists")
        );
        assert_eq!(
            extract_message(r#"{"statusCode": 400, "message": ["price must be positive", "name should not be empty"]}"#)
                .as_deref(),
            Some("price must be positive; name should not be empty")
        );
        assert_eq!(
            extract_message(r#"{"error": "Forbidden"}"#).as_deref(),
            Some("Forbidden")
        );
    }

    #[test]
    fn test_extract_message_plain_text_and_empty() {
        assert_eq!(extract_message("  Bad gateway  ").as_deref(), Some("Bad gateway"));
        assert_eq!(extract_message(""), None);
        assert_eq!(extract_message("<html><body>502</body></html>"), None);
        assert_eq!(extract_message(r#"{"statusCode": 500}"#), None);
    }

    #[test]
    fn test_from_normalized_renames_legacy_id() {
        let value = serde_json::json!({"_id": "u9", "email": "a@b.c", "role": "admin"});
        let user: crate::models::User = from_normalized(value, "user").unwrap();
        assert_eq!(user.id.as_deref(), Some("u9"));
    }

    #[test]
    fn test_new_trims_base_and_derives_upload_url() {
        let client = ApiClient::new("http://api.test/api/", None, None, Session::in_memory()).unwrap();
        assert_eq!(client.base_url(), "http://api.test/api");
        assert_eq!(client.upload_url(), "http://api.test/api/file-management/upload");
        assert_eq!(client.url("/products"), "http://api.test/api/products");
    }

    #[test]
    fn test_authorized_requires_session() {
        let client = ApiClient::new("http://api.test", None, None, Session::in_memory()).unwrap();
        assert!(matches!(
            client.authorized(Method::GET, "http://api.test/products"),
            Err(ApiError::Unauthenticated(_))
        ));
    }
}
