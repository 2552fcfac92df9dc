use border_wait_core::RawCrossing;
use log::debug;

use super::{FeedError, FeedSource, decode_feed};

/// Fetch the feed from `source` and decode it into raw crossings.
///
/// # Errors
///
/// Returns [`FeedError::Fetch`] when the bytes cannot be retrieved and
/// [`FeedError::Decode`] when they cannot be decoded. Either way the whole
/// pass fails; no partial crossing list is returned.
pub async fn fetch_crossings<S: FeedSource + ?Sized>(
    source: &S,
) -> Result<Vec<RawCrossing>, FeedError> {
    let bytes = source
        .fetch()
        .await
        .map_err(|err| FeedError::Fetch { source: err })?;
    debug!("fetched {} bytes from {}", bytes.len(), source.location());
    let crossings = decode_feed(&bytes).map_err(|err| FeedError::Decode {
        location: source.location().to_owned(),
        source: err,
    })?;
    debug!(
        "decoded {} crossings from {}",
        crossings.len(),
        source.location()
    );
    Ok(crossings)
}
