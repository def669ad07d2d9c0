use serde::Serialize;

pub const PAGE_SIZE_DEFAULT: i64 = 10;
pub const PAGE_SIZE_MAX: i64 = 10;

/// Effective `(start, size)` for a list request: `start` is clamped to `>= 0`,
/// `size` falls back to the default when missing or non-positive and is capped
/// at `PAGE_SIZE_MAX`.
pub fn compute_paging_limits(start: Option<i64>, size: Option<i64>) -> (i64, i64) {
    let start = start.unwrap_or(0).max(0);
    let size = match size {
        Some(s) if s > 0 => s.min(PAGE_SIZE_MAX),
        _ => PAGE_SIZE_DEFAULT,
    };
    (start, size)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PagingLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    pub first: String,
    pub last: String,
}

impl PagingLinks {
    pub fn build(
        path: &str,
        current_count: usize,
        page_number: i64,
        page_size: i64,
        total_count: u64,
        additional_query: &[&str],
    ) -> Self {
        tracing::info!(
            path,
            current_count,
            page_number,
            page_size,
            total_count,
            "generating pagination links"
        );

        let current_count = i64::try_from(current_count).unwrap_or(i64::MAX);
        let total_count = i64::try_from(total_count).unwrap_or(i64::MAX);
        let page_size = page_size.max(1);
        let extra = if additional_query.is_empty() {
            String::new()
        } else {
            format!("&{}", additional_query.join("&"))
        };
        let link =
            |start: i64| format!("{path}?page[start]={start}&page[size]={page_size}{extra}");

        let prev = (current_count > 0 && page_number > 0 && total_count > 0)
            .then(|| link(page_number - 1));

        let next = (current_count > 0 && page_number.saturating_add(current_count) < total_count)
            .then(|| link(page_number + 1));

        // An empty collection still gets a usable `last` link pointing at the first page.
        let last_start = if total_count % page_size == 0 {
            total_count / page_size - 1
        } else {
            total_count / page_size
        };

        Self {
            prev,
            next,
            first: link(0),
            last: link(last_start.max(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "http://localhost/api/auditlogs/users/jdoe";

    #[test]
    fn paging_limits_defaults_and_clamps() {
        assert_eq!(compute_paging_limits(None, None), (0, 10));
        assert_eq!(compute_paging_limits(Some(-3), Some(0)), (0, 10));
        assert_eq!(compute_paging_limits(Some(4), Some(-1)), (4, 10));
        assert_eq!(compute_paging_limits(Some(2), Some(50)), (2, 10));
        assert_eq!(compute_paging_limits(Some(2), Some(5)), (2, 5));
    }

    #[test]
    fn empty_collection_has_no_negative_last() {
        let links = PagingLinks::build(PATH, 0, 0, 10, 0, &[]);
        assert_eq!(links.first, format!("{PATH}?page[start]=0&page[size]=10"));
        assert_eq!(links.last, links.first);
        assert!(links.prev.is_none());
        assert!(links.next.is_none());
    }

    #[test]
    fn first_page_has_next_but_no_prev() {
        let links = PagingLinks::build(PATH, 5, 0, 5, 12, &[]);
        assert!(links.prev.is_none());
        assert_eq!(links.next.unwrap(), format!("{PATH}?page[start]=1&page[size]=5"));
        assert_eq!(links.last, format!("{PATH}?page[start]=2&page[size]=5"));
    }

    #[test]
    fn last_page_has_prev_but_no_next() {
        let links = PagingLinks::build(PATH, 2, 10, 5, 12, &[]);
        assert_eq!(links.prev.unwrap(), format!("{PATH}?page[start]=9&page[size]=5"));
        assert!(links.next.is_none());
    }

    #[test]
    fn exact_multiple_total_points_last_at_previous_page() {
        let links = PagingLinks::build(PATH, 5, 0, 5, 10, &[]);
        assert_eq!(links.last, format!("{PATH}?page[start]=1&page[size]=5"));
    }

    #[test]
    fn first_and_last_agree_on_single_page() {
        for total in 1..=10 {
            let links = PagingLinks::build(PATH, total as usize, 0, 10, total, &[]);
            assert_eq!(links.first, links.last, "total={total}");
            assert!(links.next.is_none());
        }
    }

    #[test]
    fn additional_query_is_appended() {
        let links = PagingLinks::build(PATH, 0, 0, 10, 0, &["q=foo", "sort=asc"]);
        assert_eq!(links.first, format!("{PATH}?page[start]=0&page[size]=10&q=foo&sort=asc"));
    }
}
