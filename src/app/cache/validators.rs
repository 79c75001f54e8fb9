//! HTTP validator persistence
//!
//! The `.cache` sibling of each data file records the ETag and Last-Modified
//! values returned with the data, so a later refresh can be conditional even
//! after a restart.

use std::path::Path;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ETAG, LAST_MODIFIED};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::constants::files;
use crate::errors::{CacheError, CacheResult};

/// Conditional-request validators for one cache entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheValidators {
    /// Value of the last `ETag` response header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Value of the last `Last-Modified` response header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// When the validators were last refreshed from the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl CacheValidators {
    /// True when neither validator is known
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }

    /// Validators describing a freshly downloaded body
    ///
    /// Nothing carries over from earlier responses.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut validators = Self::default();
        validators.update_from_headers(headers);
        validators
    }

    /// Merge validators from a 304 response
    ///
    /// Headers missing from the response keep their previous values.
    pub fn update_from_headers(&mut self, headers: &HeaderMap) {
        if let Some(etag) = headers.get(ETAG).and_then(|v| v.to_str().ok()) {
            self.etag = Some(etag.to_string());
        }
        if let Some(modified) = headers.get(LAST_MODIFIED).and_then(|v| v.to_str().ok()) {
            self.last_modified = Some(modified.to_string());
        }
        self.fetched_at = Some(Utc::now());
    }

    /// Load validators from a metadata file
    ///
    /// A missing file yields `Ok(None)`.
    pub async fn load(path: &Path) -> CacheResult<Option<Self>> {
        let content = match fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|source| CacheError::InvalidMetadata {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Write validators to a metadata file, replacing it atomically
    pub async fn store(&self, path: &Path) -> CacheResult<()> {
        let content =
            serde_json::to_vec_pretty(self).map_err(|source| CacheError::InvalidMetadata {
                path: path.to_path_buf(),
                source,
            })?;

        let mut temp_path = path.as_os_str().to_owned();
        temp_path.push(files::TEMP_FILE_SUFFIX);

        fs::write(&temp_path, content).await?;
        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}
