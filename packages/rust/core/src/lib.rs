//! Content organization for dashboard documents.
//!
//! This crate turns an ordered list of content items into page sections and,
//! per page, a tree of tab groups, then flattens each tree into an event
//! stream for a renderer (`plan_document` runs the whole flow).

pub mod collection;
pub mod hierarchy;
pub mod layout;
pub mod pagination;
pub mod pipeline;
pub mod serializer;
pub mod signature;

pub use collection::{Collection, Part, combine};
pub use hierarchy::{
    BuiltTree, HierarchyBuilder, ItemNode, TabGroupNode, TreeNode, UnresolvedAttachment,
    build_tree, build_tree_with,
};
pub use layout::{collection_from_value, load_layout, parse_layout};
pub use pagination::{PageSection, has_pagination_markers, split};
pub use pipeline::{DocumentPlan, PagePlan, plan_document};
pub use serializer::{Event, serialize, serialize_from};
pub use signature::{Signature, equal, signature};
