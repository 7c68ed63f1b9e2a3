use crate::domain::model::Page;
use crate::utils::error::{Result, SurveyError};
use std::future::Future;

/// Requests pages 1, 2, ... in order until one reports it is the last.
///
/// Fails with [`SurveyError::PaginationLimitError`] when `max_pages` pages
/// were fetched and the API still claims more are available.
pub async fn collect_pages<T, F, Fut>(what: &str, max_pages: u32, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();

    for page_number in 1..=max_pages {
        let page = fetch(page_number).await?;
        let has_more = page.has_more();
        tracing::debug!(
            "Fetched {} page {} ({} results, {} total)",
            what,
            page_number,
            page.results.len(),
            page.total_results
        );
        items.extend(page.results);

        if !has_more {
            return Ok(items);
        }
    }

    Err(SurveyError::PaginationLimitError {
        what: what.to_string(),
        max_pages,
    })
}

/// Keyset pagination over a listing sorted by ascending id.
///
/// `fetch` receives the last id seen (0 for the first request) and must
/// return only records above it, with `total_results` counting what remains.
/// Unlike numbered pages this has no upper offset limit on the API side.
pub async fn collect_after<T, K, F, Fut>(
    what: &str,
    max_pages: u32,
    key: K,
    mut fetch: F,
) -> Result<Vec<T>>
where
    K: Fn(&T) -> u64,
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut cursor = 0;

    for request in 1..=max_pages {
        let page = fetch(cursor).await?;
        let received = page.results.len();
        tracing::debug!(
            "Fetched {} after id {} ({} results, {} remaining)",
            what,
            cursor,
            received,
            page.total_results
        );

        let is_last = received == 0
            || received < page.per_page as usize
            || received as u64 >= page.total_results;
        let next = page.results.last().map(&key).unwrap_or(cursor);
        items.extend(page.results);

        if is_last {
            return Ok(items);
        }
        if next <= cursor {
            return Err(SurveyError::ProcessingError {
                message: format!(
                    "{} did not advance past id {} on request {}",
                    what, cursor, request
                ),
            });
        }
        cursor = next;
    }

    Err(SurveyError::PaginationLimitError {
        what: what.to_string(),
        max_pages,
    })
}
