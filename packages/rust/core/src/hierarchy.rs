//! Tab hierarchy builder.
//!
//! Turns the items of one [`PageSection`] into a tree of tab groups and
//! content nodes. Several items may declare the same tab path and differ only
//! by filter; they become sibling *slots*. A deeper item whose path extends a
//! slot path attaches beneath the one slot with the same filter signature,
//! which turns that slot into a container.
//!
//! Construction happens in an arena addressed by [`NodeId`]. Slots are
//! registered in a lookup keyed by the scope they were created in plus their
//! last segment; later insertions only read it. [`HierarchyBuilder::finalize`]
//! converts the arena into an owned tree, sorting siblings by the earliest
//! insertion index in each subtree.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, instrument, warn};

use dashtree_shared::{ContentItem, DashtreeError, LabelMap, Result, UnresolvedPolicy};

use crate::pagination::PageSection;
use crate::signature::{Signature, equal, signature};

type NodeId = usize;

/// Arena index of the implicit root group.
const ROOT: NodeId = 0;

// ---------------------------------------------------------------------------
// Output tree
// ---------------------------------------------------------------------------

/// A named tab containing groups and content.
#[derive(Debug, Clone, PartialEq)]
pub struct TabGroupNode {
    /// Path segment. Empty for the page root.
    pub name: String,
    /// Display label from the label map, else `name`.
    pub label: String,
    pub children: Vec<TreeNode>,
}

/// A content item placed in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemNode {
    pub item: ContentItem,
    /// Label used when this item renders as a tab of its own: its
    /// `title_tabset`, else the label of its last path segment.
    pub label: String,
    /// Subtree attached beneath this item. Empty means the item is a leaf.
    pub nested_children: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Group(TabGroupNode),
    Item(ItemNode),
}

impl ItemNode {
    /// A container renders only its nested subtree, never its payload.
    pub fn is_container(&self) -> bool {
        !self.nested_children.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.nested_children.is_empty()
    }
}

impl TreeNode {
    /// Smallest insertion index anywhere in this subtree.
    pub fn min_index(&self) -> usize {
        match self {
            Self::Group(group) => group
                .children
                .iter()
                .map(TreeNode::min_index)
                .min()
                .unwrap_or(usize::MAX),
            Self::Item(node) => node
                .nested_children
                .iter()
                .map(TreeNode::min_index)
                .fold(node.item.insertion_index, usize::min),
        }
    }
}

impl TabGroupNode {
    /// Number of items that render their payload.
    pub fn leaf_count(&self) -> usize {
        count_leaves(&self.children)
    }

    /// Number of tab levels below this node.
    pub fn depth(&self) -> usize {
        nested_depth(&self.children)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

fn count_leaves(nodes: &[TreeNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            TreeNode::Group(group) => group.leaf_count(),
            TreeNode::Item(item) if item.is_leaf() => 1,
            TreeNode::Item(item) => count_leaves(&item.nested_children),
        })
        .sum()
}

fn nested_depth(nodes: &[TreeNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            TreeNode::Group(group) => 1 + group.depth(),
            TreeNode::Item(item) if item.is_container() => 1 + nested_depth(&item.nested_children),
            TreeNode::Item(_) => 0,
        })
        .max()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Unresolved attachments
// ---------------------------------------------------------------------------

/// A deep item found slots at one of its prefixes, but none with its filter.
///
/// Never fatal: the item is still placed according to the
/// [`UnresolvedPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedAttachment {
    pub tab_path: Vec<String>,
    /// Index into `tab_path` of the segment that could not be matched.
    pub position: usize,
    pub insertion_index: usize,
    /// Fingerprint of the item's filter signature.
    pub fingerprint: String,
    pub policy: UnresolvedPolicy,
}

impl fmt::Display for UnresolvedAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "item #{} at {} has no slot with filter {} at {:?}; placed by {}",
            self.insertion_index,
            self.tab_path.join("/"),
            self.fingerprint,
            self.tab_path[..=self.position].join("/"),
            self.policy,
        )
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum ArenaNode {
    Group { name: String, children: Vec<NodeId> },
    Item { item: ContentItem, nested: Vec<NodeId> },
}

/// Result of [`HierarchyBuilder::finalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltTree {
    pub root: TabGroupNode,
    pub unresolved: Vec<UnresolvedAttachment>,
}

/// Incrementally builds the tab tree of one page.
#[derive(Debug)]
pub struct HierarchyBuilder {
    nodes: Vec<ArenaNode>,
    /// `(scope, segment)` → slots registered there, in insertion order.
    slots: HashMap<(NodeId, String), Vec<(Signature, NodeId)>>,
    labels: LabelMap,
    policy: UnresolvedPolicy,
    unresolved: Vec<UnresolvedAttachment>,
}

impl HierarchyBuilder {
    pub fn new(labels: LabelMap) -> Self {
        Self {
            nodes: vec![ArenaNode::Group {
                name: String::new(),
                children: Vec::new(),
            }],
            slots: HashMap::new(),
            labels,
            policy: UnresolvedPolicy::default(),
            unresolved: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Soft failures recorded so far.
    pub fn unresolved(&self) -> &[UnresolvedAttachment] {
        &self.unresolved
    }

    /// Place one item in the tree.
    ///
    /// Fails with [`DashtreeError::MalformedPath`] if any path segment is
    /// empty, in which case nothing is inserted. Pagination markers are
    /// skipped.
    pub fn insert(&mut self, item: ContentItem) -> Result<()> {
        if item.pagination_break() {
            debug!(index = item.insertion_index, "skipping pagination marker");
            return Ok(());
        }
        if let Some(position) = item.tab_path.iter().position(String::is_empty) {
            return Err(DashtreeError::MalformedPath {
                path: item.tab_path.clone(),
                position,
            });
        }

        let sig = signature(item.filter.as_ref());
        let path = item.tab_path.clone();
        let mut scope = ROOT;

        for (position, segment) in path.iter().enumerate() {
            let group = self.child_group(scope, segment);

            if position + 1 == path.len() {
                debug!(
                    index = item.insertion_index,
                    path = %path.join("/"),
                    filter = %sig.fingerprint(),
                    "registering slot"
                );
                let id = self.push_item(group, item);
                self.slots
                    .entry((scope, segment.clone()))
                    .or_default()
                    .push((sig, id));
                return Ok(());
            }

            scope = self.descend(scope, group, &path, position, &sig, item.insertion_index);
        }

        self.push_item(ROOT, item);
        Ok(())
    }

    /// Pick the scope beneath `path[..=position]` for a deeper item.
    fn descend(
        &mut self,
        scope: NodeId,
        group: NodeId,
        path: &[String],
        position: usize,
        sig: &Signature,
        insertion_index: usize,
    ) -> NodeId {
        let Some(candidates) = self.slots.get(&(scope, path[position].clone())) else {
            return group;
        };

        if let Some(&(_, slot)) = candidates.iter().find(|(candidate, _)| equal(candidate, sig)) {
            return slot;
        }

        let earliest = candidates[0].1;
        let unresolved = UnresolvedAttachment {
            tab_path: path.to_vec(),
            position,
            insertion_index,
            fingerprint: sig.fingerprint(),
            policy: self.policy,
        };
        warn!(%unresolved, "unresolved attachment");
        self.unresolved.push(unresolved);

        match self.policy {
            UnresolvedPolicy::SharedContainer => group,
            UnresolvedPolicy::EarliestCandidate => earliest,
        }
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id] {
            ArenaNode::Group { children, .. } => children,
            ArenaNode::Item { nested, .. } => nested,
        }
    }

    fn children_mut(&mut self, id: NodeId) -> &mut Vec<NodeId> {
        match &mut self.nodes[id] {
            ArenaNode::Group { children, .. } => children,
            ArenaNode::Item { nested, .. } => nested,
        }
    }

    /// Find or create the group named `segment` directly under `scope`.
    fn child_group(&mut self, scope: NodeId, segment: &str) -> NodeId {
        let existing = self.children(scope).iter().copied().find(|&id| {
            matches!(&self.nodes[id], ArenaNode::Group { name, .. } if name == segment)
        });
        if let Some(id) = existing {
            return id;
        }

        let id = self.nodes.len();
        self.nodes.push(ArenaNode::Group {
            name: segment.to_string(),
            children: Vec::new(),
        });
        self.children_mut(scope).push(id);
        id
    }

    fn push_item(&mut self, parent: NodeId, item: ContentItem) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(ArenaNode::Item {
            item,
            nested: Vec::new(),
        });
        self.children_mut(parent).push(id);
        id
    }

    /// Convert the arena into an owned tree with sorted siblings and
    /// resolved labels.
    pub fn finalize(self) -> BuiltTree {
        let HierarchyBuilder {
            nodes,
            labels,
            unresolved,
            ..
        } = self;
        let mut nodes: Vec<Option<ArenaNode>> = nodes.into_iter().map(Some).collect();

        let root_children = match nodes[ROOT].take() {
            Some(ArenaNode::Group { children, .. }) => children,
            _ => Vec::new(),
        };

        BuiltTree {
            root: TabGroupNode {
                name: String::new(),
                label: String::new(),
                children: convert_all(&mut nodes, &root_children, &labels),
            },
            unresolved,
        }
    }
}

fn convert_all(
    nodes: &mut [Option<ArenaNode>],
    ids: &[NodeId],
    labels: &LabelMap,
) -> Vec<TreeNode> {
    let mut converted: Vec<TreeNode> = ids
        .iter()
        .filter_map(|&id| convert(nodes, id, labels))
        .collect();
    converted.sort_by_key(TreeNode::min_index);
    converted
}

fn convert(nodes: &mut [Option<ArenaNode>], id: NodeId, labels: &LabelMap) -> Option<TreeNode> {
    let node = match nodes[id].take()? {
        ArenaNode::Group { name, children } => TreeNode::Group(TabGroupNode {
            label: labels.resolve(&name).to_string(),
            children: convert_all(nodes, &children, labels),
            name,
        }),
        ArenaNode::Item { item, nested } => {
            let label = match (&item.title_tabset, item.tab_path.last()) {
                (Some(title), _) => title.clone(),
                (None, Some(segment)) => labels.resolve(segment).to_string(),
                (None, None) => String::new(),
            };
            TreeNode::Item(ItemNode {
                label,
                nested_children: convert_all(nodes, &nested, labels),
                item,
            })
        }
    };
    Some(node)
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Build the tab tree for one page section with the default policy.
pub fn build_tree(section: &PageSection, labels: &LabelMap) -> Result<TabGroupNode> {
    Ok(build_tree_with(section, labels, UnresolvedPolicy::default())?.root)
}

/// Build the tab tree for one page section, reporting unresolved attachments.
#[instrument(skip_all, fields(page = section.page_index, items = section.items.len()))]
pub fn build_tree_with(
    section: &PageSection,
    labels: &LabelMap,
    policy: UnresolvedPolicy,
) -> Result<BuiltTree> {
    let mut builder = HierarchyBuilder::new(labels.clone()).with_policy(policy);
    for item in &section.items {
        builder.insert(item.clone())?;
    }
    let built = builder.finalize();
    debug!(
        leaves = built.root.leaf_count(),
        depth = built.root.depth(),
        unresolved = built.unresolved.len(),
        "tab tree built"
    );
    Ok(built)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
