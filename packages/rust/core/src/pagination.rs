//! Pagination: cut a flat item list into page sections at marker items.

use tracing::{debug, instrument};

use dashtree_shared::ContentItem;

/// Items between two pagination markers.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSection {
    pub items: Vec<ContentItem>,
    /// 1-based position of this page.
    pub page_index: usize,
    pub total_pages: usize,
}

impl PageSection {
    pub fn is_first(&self) -> bool {
        self.page_index == 1
    }

    pub fn is_last(&self) -> bool {
        self.page_index == self.total_pages
    }
}

/// True iff any item is a pagination marker.
pub fn has_pagination_markers(items: &[ContentItem]) -> bool {
    items.iter().any(ContentItem::pagination_break)
}

/// Split `items` at pagination markers.
///
/// Markers are dropped. Zero markers give one section holding everything.
/// Empty sections before the first item or between consecutive markers are
/// kept, but trailing markers never leave empty pages at the end; at least
/// one section is always returned.
#[instrument(skip_all, fields(items = items.len()))]
pub fn split(items: &[ContentItem]) -> Vec<PageSection> {
    let mut pages: Vec<Vec<ContentItem>> = Vec::new();
    let mut current: Vec<ContentItem> = Vec::new();

    for item in items {
        if item.pagination_break() {
            pages.push(std::mem::take(&mut current));
        } else {
            current.push(item.clone());
        }
    }
    pages.push(current);

    while pages.len() > 1 && pages.last().is_some_and(Vec::is_empty) {
        pages.pop();
    }

    let total_pages = pages.len();
    debug!(total_pages, "split into page sections");

    pages
        .into_iter()
        .enumerate()
        .map(|(i, items)| PageSection {
            items,
            page_index: i + 1,
            total_pages,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(name: &str) -> ContentItem {
        ContentItem::new(json!({ "name": name }))
    }

    fn marker() -> ContentItem {
        ContentItem::pagination_marker()
    }

    fn sizes(sections: &[PageSection]) -> Vec<usize> {
        sections.iter().map(|s| s.items.len()).collect()
    }

    #[test]
    fn no_markers_gives_one_section() {
        let items = vec![item("a"), item("b")];
        assert!(!has_pagination_markers(&items));
        let sections = split(&items);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].items, items);
        assert_eq!(sections[0].page_index, 1);
        assert_eq!(sections[0].total_pages, 1);
    }

    #[test]
    fn empty_input_gives_one_empty_section() {
        let sections = split(&[]);
        assert_eq!(sizes(&sections), vec![0]);
    }

    #[test]
    fn marker_in_the_middle() {
        let items = vec![item("a"), marker(), item("b")];
        assert!(has_pagination_markers(&items));
        let sections = split(&items);
        assert_eq!(sizes(&sections), vec![1, 1]);
        assert!(sections.iter().all(|s| s.total_pages == 2));
        assert_eq!(sections[1].page_index, 2);
        assert!(sections[0].is_first());
        assert!(sections[1].is_last());
    }

    #[test]
    fn tabbed_trailing_marker_adds_no_page() {
        let items = vec![
            item("a").with_tab_path(["a"]),
            marker().with_tab_path(["a"]),
        ];
        let sections = split(&items);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].total_pages, 1);
    }

    #[test]
    fn trailing_marker_matches_unmarked_count() {
        let with = vec![item("a"), marker(), item("b"), marker()];
        let without = vec![item("a"), marker(), item("b")];
        assert_eq!(split(&with).len(), split(&without).len());
    }

    #[test]
    fn run_of_trailing_markers_adds_no_page() {
        let with = vec![item("a"), marker(), marker()];
        let without = vec![item("a"), marker()];
        assert_eq!(sizes(&split(&with)), vec![1]);
        assert_eq!(split(&with).len(), split(&without).len());
        assert_eq!(split(&with)[0].total_pages, 1);

        let items = vec![item("a"), marker(), item("b"), marker(), marker(), marker()];
        assert_eq!(sizes(&split(&items)), vec![1, 1]);
    }

    #[test]
    fn consecutive_markers_keep_empty_page() {
        let items = vec![item("a"), marker(), marker(), item("b")];
        assert_eq!(sizes(&split(&items)), vec![1, 0, 1]);
    }

    #[test]
    fn leading_marker_keeps_empty_first_page() {
        let items = vec![marker(), item("a")];
        assert_eq!(sizes(&split(&items)), vec![0, 1]);
    }

    #[test]
    fn lone_marker_gives_one_empty_page() {
        assert_eq!(sizes(&split(&[marker()])), vec![0]);
        assert_eq!(sizes(&split(&[marker(), marker()])), vec![0]);
    }

    #[test]
    fn split_round_trips_with_markers() {
        let items = vec![
            item("a"),
            item("b"),
            marker(),
            item("c"),
            marker(),
            marker(),
            item("d"),
        ];
        let sections = split(&items);

        let mut rebuilt = Vec::new();
        for (i, section) in sections.iter().enumerate() {
            if i > 0 {
                rebuilt.push(marker());
            }
            rebuilt.extend(section.items.iter().cloned());
        }
        assert_eq!(rebuilt, items);
    }
}
