//! Image and attachment uploads.
//!
//! Content type and size policy belong to the storage service's bucket
//! configuration; nothing here inspects the bytes.

use std::path::Path;

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::traits::ObjectStorage;
use crate::AppError;

/// Where an uploaded file belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDestination {
    Post,
    Project,
    Avatar,
    LeadAttachment,
}

impl UploadDestination {
    /// Folder inside the bucket.
    pub fn folder(&self) -> &'static str {
        match self {
            UploadDestination::Post => "blog-images",
            UploadDestination::Project => "project-images",
            UploadDestination::Avatar => "testimonial-avatars",
            UploadDestination::LeadAttachment => "lead-attachments",
        }
    }
}

/// A file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).map(str::to_string);
        Self {
            file_name,
            bytes,
            content_type,
        }
    }

    /// Lowercased extension of the original file name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(str::to_ascii_lowercase)
    }
}

fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "pdf" => "application/pdf",
        _ => return None,
    })
}

/// Collision-resistant key: `<folder>/<random token>[.<ext>]`.
pub fn storage_key(destination: UploadDestination, file: &UploadFile) -> String {
    let token = Uuid::new_v4().simple();
    match file.extension() {
        Some(ext) => format!("{}/{}.{}", destination.folder(), token, ext),
        None => format!("{}/{}", destination.folder(), token),
    }
}

/// Uploads files and hands back their public URL.
#[derive(Clone)]
pub struct ImageUploader<O: ObjectStorage> {
    storage: O,
    config: StorageConfig,
}

impl<O: ObjectStorage> ImageUploader<O> {
    pub fn new(storage: O, config: StorageConfig) -> Self {
        Self { storage, config }
    }

    fn bucket(&self, destination: UploadDestination) -> &str {
        match destination {
            UploadDestination::LeadAttachment => &self.config.lead_bucket,
            _ => &self.config.image_bucket,
        }
    }

    /// Stores `file` and returns its public URL.
    ///
    /// Any storage failure comes back as [`AppError::UploadError`]; the
    /// caller must then abort the create/update it was part of.
    pub async fn upload(
        &self,
        file: UploadFile,
        destination: UploadDestination,
    ) -> Result<String, AppError> {
        let key = storage_key(destination, &file);
        let bucket = self.bucket(destination).to_string();
        let size = file.bytes.len();

        if let Err(e) = self
            .storage
            .upload(&bucket, &key, file.bytes, file.content_type.as_deref())
            .await
        {
            warn!(bucket = %bucket, key = %key, error = %e, "upload failed");
            return Err(match e {
                AppError::UploadError(msg) => AppError::UploadError(msg),
                other => AppError::UploadError(other.to_string()),
            });
        }

        info!(bucket = %bucket, key = %key, size, "uploaded file");
        Ok(self.storage.public_url(&bucket, &key))
    }

}
