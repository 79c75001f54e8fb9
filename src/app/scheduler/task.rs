//! The fetch pipeline run off the scheduler task
//!
//! One call handles one request end to end: load stored validators, fetch,
//! then either persist the new validators or remove every cache artifact for
//! the key. The request comes back with `success` and `not_found` set.

use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info, warn};

use crate::app::cache::CacheValidators;
use crate::app::client::{FetchStatus, GuideFetcher};
use crate::app::queue::RequestInfo;
use crate::errors::DownloadError;

/// Run one fetch and record its outcome on the request
pub async fn execute_request<F: GuideFetcher>(
    fetcher: Arc<F>,
    mut request: RequestInfo,
    verbose: bool,
) -> RequestInfo {
    // Validators only mean something while the data they describe exists
    if path_exists(&request.data_file).await {
        match CacheValidators::load(&request.metadata_file).await {
            Ok(Some(validators)) => request.validators = validators,
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable validators for {}: {}", request.key(), e),
        }
    }

    match fetcher.fetch(&mut request).await {
        Ok(status) => {
            request.success = true;
            match status {
                FetchStatus::Downloaded { bytes } if verbose => {
                    info!("Fetched {} ({} bytes) from {}", request.key(), bytes, request.url)
                }
                FetchStatus::Downloaded { bytes } => {
                    debug!("Fetched {} ({} bytes)", request.key(), bytes)
                }
                FetchStatus::NotModified if verbose => {
                    info!("{} not modified on server", request.key())
                }
                FetchStatus::NotModified => debug!("{} not modified on server", request.key()),
            }

            if !request.validators.is_empty() {
                if let Err(e) = request.validators.store(&request.metadata_file).await {
                    warn!("Failed to store validators for {}: {}", request.key(), e);
                }
            }
        }
        Err(e) => {
            request.not_found = matches!(e, DownloadError::NotFound { .. });
            if request.not_found {
                debug!("No guide data for {} at {}", request.key(), request.url);
            } else {
                warn!("Fetch of {} failed: {}", request.key(), e);
            }
            remove_cache_files(&request.data_file, &request.metadata_file).await;
        }
    }

    request
}

/// Delete the data and metadata files of a request, ignoring missing files
pub async fn remove_cache_files(data_file: &Path, metadata_file: &Path) {
    for path in [data_file, metadata_file] {
        match fs::remove_file(path).await {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
}

async fn path_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}
