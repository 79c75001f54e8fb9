//! File download operations with atomic writes and streaming
//!
//! The response body is streamed into a temporary sibling of the cache data
//! file and renamed into place once complete, so readers opening the data
//! file never see a partially written download.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Response;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// File download operations handler
#[derive(Debug, Default, Clone, Copy)]
pub struct DownloadHandler;

impl DownloadHandler {
    /// Creates a new DownloadHandler
    pub fn new() -> Self {
        Self
    }

    /// Temporary path used while writing `destination`
    pub fn temp_path(destination: &Path) -> PathBuf {
        let mut name = OsString::from(destination.as_os_str());
        name.push(files::TEMP_FILE_SUFFIX);
        PathBuf::from(name)
    }

    /// Stream a response body to `destination`, replacing any previous file
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if reading the body or writing the file fails.
    /// The temporary file is removed on failure and `destination` is left
    /// untouched.
    pub async fn save_response(&self, response: Response, destination: &Path) -> DownloadResult<u64> {
        let temp_path = Self::temp_path(destination);

        match Self::write_body(response, &temp_path).await {
            Ok(bytes) => {
                fs::rename(&temp_path, destination).await.map_err(|_e| {
                    DownloadError::AtomicOperationFailed {
                        temp_path: temp_path.clone(),
                        final_path: destination.to_path_buf(),
                    }
                })?;
                Ok(bytes)
            }
            Err(e) => {
                let _ = fs::remove_file(&temp_path).await;
                Err(e)
            }
        }
    }

    async fn write_body(response: Response, temp_path: &Path) -> DownloadResult<u64> {
        let mut file = File::create(temp_path).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}
