//! Fixed-size pagination over an ordered slice

use serde::Serialize;

/// One page of a larger sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<'a, T> {
    /// Contiguous slice of the input, original order
    pub items: &'a [T],

    /// Always at least 1, even for empty input
    pub total_pages: usize,

    /// Requested page clamped into `[1, total_pages]`
    pub page: usize,
}

impl<T> Page<'_, T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Slices sequences into pages of `page_size` items
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: usize,
}

impl Paginator {
    /// A zero page size is treated as 1
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size).max(1)
    }

    pub fn paginate<'a, T>(&self, items: &'a [T], requested: usize) -> Page<'a, T> {
        paginate(items, self.page_size, requested)
    }
}

/// Return page `requested` (1-based, clamped) of `items`
pub fn paginate<T>(items: &[T], page_size: usize, requested: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let page = requested.clamp(1, total_pages);

    let start = ((page - 1) * page_size).min(items.len());
    let end = (page * page_size).min(items.len());

    Page {
        items: &items[start..end],
        total_pages,
        page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_items_four_per_page() {
        let items: Vec<u32> = (1..=10).collect();

        let first = paginate(&items, 4, 1);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items, &[1, 2, 3, 4]);
        assert!(first.has_next());
        assert!(!first.has_prev());

        let last = paginate(&items, 4, 3);
        assert_eq!(last.items, &[9, 10]);
        assert!(!last.has_next());
    }

    #[test]
    fn test_out_of_range_pages_clamp() {
        let items: Vec<u32> = (1..=10).collect();

        let low = paginate(&items, 4, 0);
        assert_eq!(low.page, 1);
        assert_eq!(low.items, &[1, 2, 3, 4]);

        let high = paginate(&items, 4, 99);
        assert_eq!(high.page, 3);
        assert_eq!(high.items, &[9, 10]);
    }

    #[test]
    fn test_empty_input_has_one_page() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 4, 5);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_exact_multiple() {
        let items: Vec<u32> = (1..=8).collect();
        let paginator = Paginator::new(4);
        assert_eq!(paginator.total_pages(items.len()), 2);
        assert_eq!(paginator.paginate(&items, 2).items, &[5, 6, 7, 8]);
    }

    #[test]
    fn test_pages_cover_input_in_order() {
        let items: Vec<u32> = (1..=23).collect();
        let paginator = Paginator::new(5);
        let total = paginator.total_pages(items.len());

        let rebuilt: Vec<u32> = (1..=total)
            .flat_map(|p| paginator.paginate(&items, p).items.to_vec())
            .collect();
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn test_zero_page_size_is_one() {
        assert_eq!(Paginator::new(0).page_size(), 1);
    }
}
