use std::num::NonZeroU32;

use crate::{
    error::{ArchiveError, ArchiveResult},
    FragmentSelector, FragmentSource, ListFragmentsRequest, PageCursor,
};

/// Upper bound the service accepts for `MaxResults`.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Follows the listing of `stream_name` until the service stops returning a
/// continuation token, then returns every fragment number sorted.
///
/// Fragment numbers of one stream share their length, so string order is
/// chronological order. The first failing page fails the whole listing; no
/// partial list is ever returned.
pub async fn list_all_fragments<S>(
    source: &S,
    stream_name: &str,
    selector: &FragmentSelector,
    page_size: NonZeroU32,
) -> ArchiveResult<Vec<String>>
where
    S: FragmentSource,
{
    if stream_name.is_empty() {
        return Err(ArchiveError::InvalidArgument(
            "stream name must not be empty".to_string(),
        ));
    }
    if page_size.get() > MAX_PAGE_SIZE {
        return Err(ArchiveError::InvalidArgument(format!(
            "page size {page_size} exceeds {MAX_PAGE_SIZE}"
        )));
    }
    selector.timestamp_range.validate()?;

    let mut fragment_numbers = Vec::new();
    let mut cursor = PageCursor::Selector(selector.clone());
    let mut pages = 0usize;

    loop {
        let page = source
            .list_fragments(ListFragmentsRequest {
                stream_name: stream_name.to_string(),
                max_results: page_size.get(),
                cursor,
            })
            .await?;
        pages += 1;

        log::debug!(
            "Page {pages} of {stream_name} returned {} fragment(s).",
            page.fragments.len()
        );

        let next_token = page.continuation().map(str::to_string);
        fragment_numbers.extend(page.fragments.into_iter().map(|f| f.fragment_number));

        match next_token {
            Some(token) => cursor = PageCursor::NextToken(token),
            None => break,
        }
    }

    fragment_numbers.sort();
    log::info!(
        "Listed {} fragment(s) of {stream_name} in {pages} page(s).",
        fragment_numbers.len()
    );

    Ok(fragment_numbers)
}
