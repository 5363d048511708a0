//! Search Engine (unanchored substring filter over dataset keywords)
//!
//! No scoring and no ranking: a keyword either contains the normalized query
//! or it doesn't, and matches keep dataset order. Large datasets are scanned
//! with rayon; its indexed collect keeps the input order, so both paths
//! return identical results.

use crate::interface::{DatasetProvider, Entry, MojiError};
use tokio_util::sync::CancellationToken;

/// Default dataset size at which the keyword scan goes parallel.
pub const DEFAULT_PARALLEL_SCAN_THRESHOLD: u64 = 4096;

/// Trim and lower-case a raw query
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Keywords containing `needle`, in their original order.
/// An empty needle matches every keyword.
pub fn matching_keywords<'a>(
    keywords: &'a [String],
    needle: &str,
    parallel_threshold: usize,
) -> Vec<&'a str> {
    if needle.is_empty() {
        return keywords.iter().map(String::as_str).collect();
    }

    if keywords.len() >= parallel_threshold {
        use rayon::prelude::*;
        keywords
            .par_iter()
            .filter(|keyword| keyword.contains(needle))
            .map(String::as_str)
            .collect()
    } else {
        keywords
            .iter()
            .filter(|keyword| keyword.contains(needle))
            .map(String::as_str)
            .collect()
    }
}

/// Run one search attempt against `provider`.
///
/// The token is checked before the scan and between renders; a cancelled
/// attempt returns [`MojiError::Cancelled`] and produces no entries.
pub(crate) async fn run_search(
    provider: &dyn DatasetProvider,
    query: &str,
    parallel_threshold: usize,
    token: &CancellationToken,
) -> Result<Vec<Entry>, MojiError> {
    if token.is_cancelled() {
        return Err(MojiError::Cancelled);
    }

    let needle = normalize_query(query);

    #[cfg(feature = "perf-log")]
    let t0 = std::time::Instant::now();
    let keywords = matching_keywords(provider.all_keywords(), &needle, parallel_threshold);
    #[cfg(feature = "perf-log")]
    let t1 = std::time::Instant::now();

    let mut entries = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        if token.is_cancelled() {
            return Err(MojiError::Cancelled);
        }
        let rendered_text = provider.render(keyword).await?;
        entries.push(Entry::new(keyword, rendered_text));
    }

    #[cfg(feature = "perf-log")]
    {
        let t2 = std::time::Instant::now();
        tracing::debug!(
            scan_ms = (t1 - t0).as_secs_f64() * 1000.0,
            render_ms = (t2 - t1).as_secs_f64() * 1000.0,
            matches = entries.len(),
            "[perf] search attempt"
        );
    }

    Ok(entries)
}
