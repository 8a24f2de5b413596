use std::future::Future;

use farelink_core::ProviderResult;
use farelink_shared::wire::Paginated;
use tracing::warn;

/// Follow an upstream cursor chain until the response carries no `after`
/// cursor, concatenating every page's items in page order.
///
/// Pagination is strictly sequential: page N+1 cannot be requested before
/// page N's cursor is known. `page_cap` bounds a cursor chain the upstream
/// never terminates; hitting it returns what was collected so far.
pub async fn collect_pages<T, F, Fut>(page_cap: u32, mut fetch_page: F) -> ProviderResult<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = ProviderResult<Paginated<T>>>,
{
    let mut items = Vec::new();
    let mut after: Option<String> = None;
    let mut pages: u32 = 0;

    loop {
        if pages >= page_cap {
            warn!(pages, "Cursor chain hit the page cap, returning collected items");
            break;
        }
        pages += 1;

        let page = fetch_page(after.take()).await?;
        items.extend(page.data);

        after = page.meta.and_then(|m| m.after);
        if after.is_none() {
            break;
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use farelink_core::ProviderError;
    use farelink_shared::wire::ListMeta;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn page(items: &[&str], after: Option<&str>) -> Paginated<String> {
        Paginated {
            data: items.iter().map(|s| s.to_string()).collect(),
            meta: Some(ListMeta {
                after: after.map(|s| s.to_string()),
                limit: Some(50),
            }),
        }
    }

    #[tokio::test]
    async fn test_concatenates_all_pages_in_order() {
        let calls = AtomicUsize::new(0);

        let items = collect_pages(200, |after| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(match after.as_deref() {
                    None => page(&["a", "b"], Some("cur-1")),
                    Some("cur-1") => page(&["c"], Some("cur-2")),
                    Some("cur-2") => page(&["d", "e"], None),
                    other => panic!("unexpected cursor: {:?}", other),
                })
            }
        })
        .await
        .expect("pagination failed");

        assert_eq!(items, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(calls.load(Ordering::SeqCst), 3, "exactly one call per page");
    }

    #[tokio::test]
    async fn test_missing_meta_terminates_after_first_page() {
        let items = collect_pages(200, |_after| async move {
            Ok(Paginated {
                data: vec!["only".to_string()],
                meta: None,
            })
        })
        .await
        .unwrap();

        assert_eq!(items, vec!["only"]);
    }

    #[tokio::test]
    async fn test_page_cap_stops_a_cursor_chain_that_never_ends() {
        let calls = AtomicUsize::new(0);

        let items = collect_pages(5, |_after| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(page(&["x"], Some("forever"))) }
        })
        .await
        .unwrap();

        assert_eq!(items.len(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_mid_chain_failure_propagates() {
        let result: ProviderResult<Vec<String>> = collect_pages(200, |after| async move {
            match after {
                None => Ok(page(&["a"], Some("cur-1"))),
                Some(_) => Err(ProviderError::Upstream("boom".to_string())),
            }
        })
        .await;

        assert!(matches!(result, Err(ProviderError::Upstream(_))));
    }
}
