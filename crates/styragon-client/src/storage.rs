use reqwest::Method;
use styragon_core::error::AppError;
use styragon_core::traits::ObjectStorage;
use tracing::debug;

use crate::backend::BackendClient;

/// Object storage client for the backend's public buckets.
///
/// # Examples
///
/// ```no_run
/// use styragon_client::{BackendClient, StorageClient};
/// use styragon_core::config::HttpConfig;
/// use styragon_core::traits::ObjectStorage;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = BackendClient::new("https://project.backend.test", "anon", &HttpConfig::default())?;
/// let storage = StorageClient::new(backend);
/// storage
///     .upload("images", "blog-images/cover.png", vec![0x89, 0x50], Some("image/png"))
///     .await?;
/// println!("{}", storage.public_url("images", "blog-images/cover.png"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StorageClient {
    backend: BackendClient,
}

impl StorageClient {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

impl ObjectStorage for StorageClient {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), AppError> {
        let url = self
            .backend
            .endpoint(&format!("storage/v1/object/{}/{}", bucket, key))?;

        let size = bytes.len();
        let request = self
            .backend
            .anon_request(Method::POST, url)
            .header("content-type", content_type.unwrap_or("application/octet-stream"))
            .header("x-upsert", "false")
            .body(bytes);

        self.backend.send(request).await?;
        debug!(bucket, key, size, "object stored");
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}storage/v1/object/public/{}/{}",
            self.backend.base_url(),
            bucket,
            key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use styragon_core::config::HttpConfig;

    #[test]
    fn test_public_url() {
        let backend =
            BackendClient::new("https://project.backend.test", "anon", &HttpConfig::default())
                .unwrap();
        let storage = StorageClient::new(backend);
        assert_eq!(
            storage.public_url("images", "blog-images/abc.png"),
            "https://project.backend.test/storage/v1/object/public/images/blog-images/abc.png"
        );
    }
}
