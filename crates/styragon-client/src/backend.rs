use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use styragon_core::config::HttpConfig;
use styragon_core::error::AppError;
use url::Url;

/// Connection to the hosted backend project shared by the storage and auth
/// clients.
///
/// Every request carries the project's anonymous key in the `apikey` header.
/// Authenticated calls add a bearer token on top.
///
/// # Examples
///
/// ```
/// use styragon_client::BackendClient;
/// use styragon_core::config::HttpConfig;
///
/// let backend = BackendClient::new(
///     "https://project.backend.test",
///     "anon-key",
///     &HttpConfig::default(),
/// )
/// .unwrap();
/// assert_eq!(backend.base_url().as_str(), "https://project.backend.test/");
/// ```
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    anon_key: String,
    timeout_secs: u64,
}

/// Error bodies differ between the backend's services; whichever message
/// field is present wins.
#[derive(Deserialize, Default)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

impl BackendClient {
    /// Creates a client for the project at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if `base_url` is not an absolute URL.
    /// Returns `AppError::ClientError` if the HTTP client cannot be built.
    pub fn new(base_url: &str, anon_key: &str, config: &HttpConfig) -> Result<Self, AppError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|_| AppError::InvalidUrl(format!("Invalid backend URL: {}", base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::InvalidUrl(format!(
                "Invalid backend URL: {}",
                base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent("Styragon/0.1")
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            anon_key: anon_key.to_string(),
            timeout_secs: config.timeout.as_secs(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` (no leading slash) against the project URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::InvalidUrl(e.to_string()))
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
    }

    /// Request authorised with the anonymous key only.
    pub(crate) fn anon_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.request(method, url).bearer_auth(&self.anon_key)
    }

    /// Sends `request`, mapping transport failures and non-2xx statuses.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {}", e))
            } else {
                AppError::ClientError(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        Err(AppError::ClientError(format!(
            "HTTP {}: {}",
            status.as_u16(),
            message
        )))
    }
}

/// Message carried by a backend error body, if it is one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
}

/// `ClientError("HTTP <code>: <message>")` → `<message>`.
pub(crate) fn strip_status(err: AppError) -> String {
    match err {
        AppError::ClientError(msg) => match msg.split_once(": ") {
            Some((prefix, rest)) if prefix.starts_with("HTTP ") => rest.to_string(),
            _ => msg,
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(url: &str) -> BackendClient {
        BackendClient::new(url, "anon", &HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_new_with_invalid_url() {
        let result = BackendClient::new("not a url", "anon", &HttpConfig::default());
        match result {
            Err(AppError::InvalidUrl(msg)) => assert!(msg.contains("Invalid backend URL")),
            _ => panic!("Expected AppError::InvalidUrl"),
        }
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = backend("https://gateway.test/project");
        assert_eq!(
            client.endpoint("auth/v1/logout").unwrap().as_str(),
            "https://gateway.test/project/auth/v1/logout"
        );
    }

    #[test]
    fn test_error_message_fields() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            Some("Invalid login credentials".to_string())
        );
        assert_eq!(
            error_message(r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#),
            Some("The resource already exists".to_string())
        );
        assert_eq!(error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_strip_status() {
        assert_eq!(
            strip_status(AppError::ClientError("HTTP 400: Invalid login credentials".into())),
            "Invalid login credentials"
        );
        assert_eq!(
            strip_status(AppError::ClientError("builder error".into())),
            "builder error"
        );
    }
}
