use crate::utils::retry::RetryPolicy;
use common::{Error, Result};
use std::future::Future;
use tracing::debug;

/// How an upstream list endpoint signals that it has no more pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exhaustion {
    /// A page holding fewer than `page_size` items is the last one.
    ShortPage,
    /// Keep paging until an empty page comes back.
    EmptyPage,
}

/// Walks an offset-paginated list operation until it is exhausted.
///
/// `fetch_page` is called with `(limit, offset)` for offsets `0, P, 2P, ...`.
/// Each page goes through `policy` on its own; the first page that still fails
/// aborts the whole collection. Items keep the order the upstream served them.
pub async fn collect_pages<T, F, Fut>(
    policy: &RetryPolicy,
    page_size: usize,
    exhaustion: Exhaustion,
    fetch_page: F,
) -> Result<Vec<T>>
where
    F: Fn(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    if page_size == 0 {
        return Err(Error::InvalidInput("page size must be at least 1".into()));
    }

    let mut items = Vec::new();
    let mut offset = 0;

    loop {
        let page = policy.run(|| fetch_page(page_size, offset)).await?;
        let count = page.len();
        debug!(offset, count, page_size, "Fetched page");
        items.extend(page);

        let exhausted = match exhaustion {
            Exhaustion::ShortPage => count < page_size,
            Exhaustion::EmptyPage => count == 0,
        };
        if exhausted {
            break;
        }
        offset += page_size;
    }

    Ok(items)
}
