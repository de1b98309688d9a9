//! Page arithmetic and the page links shown under paginated lists.

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The number of rows per page when the user has not picked a page size.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
    /// The page sizes offered in the page size picker.
    pub page_size_options: Vec<u64>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_pages: 5,
            page_size_options: vec![10, 20, 50, 100],
        }
    }
}

/// The number of pages needed to show `total` rows, `page_size` rows at a time.
///
/// A page size of zero is treated as one so this never divides by zero.
pub fn page_count(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size.max(1))
}

/// One element of the pagination bar.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// Build the pagination bar for `curr_page` out of `page_count` pages, showing
/// at most `max_pages` page numbers around the current page.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let mut indicators: Vec<PaginationIndicator> = if page_count <= max_pages {
        (1..=page_count).map(map_page).collect()
    } else if curr_page <= (max_pages / 2) {
        (1..=max_pages).map(map_page).collect()
    } else if curr_page > (page_count - max_pages / 2) {
        ((page_count - max_pages + 1)..=page_count)
            .map(map_page)
            .collect()
    } else {
        ((curr_page - max_pages / 2)..=(curr_page + max_pages / 2))
            .map(map_page)
            .collect()
    };

    if page_count > max_pages {
        if curr_page > (max_pages / 2) + 1 {
            indicators.insert(0, PaginationIndicator::Page(1));
            indicators.insert(1, PaginationIndicator::Ellipsis);
        }

        if curr_page < (page_count - max_pages / 2) {
            indicators.push(PaginationIndicator::Ellipsis);
            indicators.push(PaginationIndicator::Page(page_count));
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

#[cfg(test)]
mod page_count_tests {
    use super::page_count;

    #[test]
    fn rounds_up_partial_pages() {
        assert_eq!(page_count(120, 50), 3);
        assert_eq!(page_count(100, 50), 2);
        assert_eq!(page_count(1, 50), 1);
    }

    #[test]
    fn empty_list_has_no_pages() {
        assert_eq!(page_count(0, 20), 0);
    }

    #[test]
    fn zero_page_size_does_not_panic() {
        assert_eq!(page_count(3, 0), 3);
    }
}
