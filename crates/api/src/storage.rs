//! Receipt storage on the local filesystem.
//!
//! Receipts are written under the configured uploads directory as
//! `{uuid}_{YYYYmmddHHMMSS}.{ext}`. The stored path is what ends up in
//! `appointments.receipt_path`; reads only ever resolve the file name
//! inside the uploads directory.

use std::path::{Path, PathBuf};

use chrono::Utc;
use slotbook_core::errors::{BookingError, BookingResult};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Extensions accepted for payment receipts.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "pdf"];

/// A receipt read back from disk.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Lower-cased extension of `file_name` when it is an accepted receipt type.
pub fn receipt_extension(file_name: &str) -> Option<String> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    ALLOWED_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

#[derive(Debug, Clone)]
pub struct ReceiptStore {
    root: PathBuf,
}

impl ReceiptStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes an uploaded receipt and returns its stored path.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> BookingResult<String> {
        let extension = receipt_extension(original_name).ok_or_else(|| {
            BookingError::validation("Invalid file type. Only JPG, PNG, and PDF allowed")
        })?;

        fs::create_dir_all(&self.root).await?;

        let file_name = format!(
            "{}_{}.{}",
            Uuid::new_v4(),
            Utc::now().format("%Y%m%d%H%M%S"),
            extension
        );
        let path = self.root.join(file_name);
        fs::write(&path, bytes).await?;

        debug!("Stored receipt {} ({} bytes)", path.display(), bytes.len());
        Ok(path.to_string_lossy().into_owned())
    }

    /// Best-effort removal of a receipt whose appointment was never stored.
    pub async fn remove(&self, stored_path: &str) {
        let Some(path) = self.resolve(stored_path) else {
            return;
        };
        if let Err(e) = fs::remove_file(&path).await {
            warn!("Failed to remove receipt {}: {}", path.display(), e);
        }
    }

    pub async fn read(&self, stored_path: &str) -> BookingResult<StoredFile> {
        let path = self
            .resolve(stored_path)
            .ok_or_else(|| BookingError::not_found("Receipt file"))?;

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BookingError::not_found("Receipt file"));
            }
            Err(e) => return Err(e.into()),
        };
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();

        Ok(StoredFile {
            bytes,
            content_type,
        })
    }

    fn resolve(&self, stored_path: &str) -> Option<PathBuf> {
        let file_name = Path::new(stored_path).file_name()?;
        Some(self.root.join(file_name))
    }
}
