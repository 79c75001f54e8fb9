//! Request URL construction
//!
//! Guide servers publish one file per channel and day under each of their
//! mirror base URLs. A mirror is picked uniformly at random per request so
//! load spreads across them.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use url::Url;

use crate::app::cache::CacheFileKind;
use crate::app::cache::PathGenerator;
use crate::app::models::Channel;
use crate::errors::{DownloadError, DownloadResult};

/// Choose a base URL for a channel
///
/// Returns `None` when the channel lists no base URLs.
pub fn choose_base_url<'a, R>(channel: &'a Channel, rng: &mut R) -> Option<&'a str>
where
    R: Rng + ?Sized,
{
    match channel.base_urls.as_slice() {
        [] => None,
        [only] => Some(only.as_str()),
        urls => urls.choose(rng).map(String::as_str),
    }
}

/// Build the request URL for one channel and day
///
/// The result is `<base>/<channelId>_<YYYY-MM-DD>.xml.gz`, with a `/` added to
/// the base if it lacks one.
pub fn build_request_url<R>(channel: &Channel, date: NaiveDate, rng: &mut R) -> DownloadResult<Url>
where
    R: Rng + ?Sized,
{
    let base_url = choose_base_url(channel, rng).ok_or_else(|| DownloadError::NoBaseUrls {
        channel_id: channel.id.clone(),
    })?;

    let mut request_url = String::with_capacity(base_url.len() + channel.id.len() + 20);
    request_url.push_str(base_url);
    if !base_url.ends_with('/') {
        request_url.push('/');
    }
    request_url.push_str(&PathGenerator::file_name(
        &channel.id,
        date,
        CacheFileKind::Data,
    ));

    Url::parse(&request_url).map_err(|e| DownloadError::InvalidUrl {
        url: request_url,
        error: e.to_string(),
    })
}
