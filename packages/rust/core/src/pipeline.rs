//! End-to-end planning: collection → pages → tab trees.

use tracing::{info, instrument};

use dashtree_shared::{BuildOptions, LabelMap, Result};

use crate::collection::Collection;
use crate::hierarchy::{TabGroupNode, UnresolvedAttachment, build_tree_with};
use crate::pagination::{has_pagination_markers, split};
use crate::serializer::{Event, serialize_from};

/// One page of a planned document.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub page_index: usize,
    pub total_pages: usize,
    pub tree: TabGroupNode,
    pub unresolved: Vec<UnresolvedAttachment>,
    base_depth: usize,
}

impl PagePlan {
    /// Event stream for this page's tree.
    pub fn events(&self) -> Vec<Event<'_>> {
        serialize_from(&self.tree, self.base_depth)
    }
}

/// Every page of a document, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPlan {
    pub pages: Vec<PagePlan>,
    /// No pagination markers were present; a single artifact suffices.
    pub single_page: bool,
    /// Effective labels: configured labels overridden by the collection's.
    pub labels: LabelMap,
}

impl DocumentPlan {
    pub fn unresolved_count(&self) -> usize {
        self.pages.iter().map(|p| p.unresolved.len()).sum()
    }

    pub fn leaf_count(&self) -> usize {
        self.pages.iter().map(|p| p.tree.leaf_count()).sum()
    }
}

/// Split `collection` into pages and build the tab tree of each.
///
/// Pages are independent; an error on any page aborts the whole plan so no
/// partial output is produced.
#[instrument(skip_all, fields(items = collection.len()))]
pub fn plan_document(collection: &Collection, options: &BuildOptions) -> Result<DocumentPlan> {
    let mut labels = options.labels.clone();
    labels.merge(collection.labels());

    let single_page = !has_pagination_markers(collection.items());
    let sections = split(collection.items());

    let pages = sections
        .iter()
        .map(|section| -> Result<PagePlan> {
            let built = build_tree_with(section, &labels, options.unresolved_policy)?;
            Ok(PagePlan {
                page_index: section.page_index,
                total_pages: section.total_pages,
                tree: built.root,
                unresolved: built.unresolved,
                base_depth: options.base_depth,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let plan = DocumentPlan {
        pages,
        single_page,
        labels,
    };

    info!(
        pages = plan.pages.len(),
        leaves = plan.leaf_count(),
        unresolved = plan.unresolved_count(),
        "document planned"
    );

    Ok(plan)
}
