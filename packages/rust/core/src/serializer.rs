//! Depth-first event stream over a finished tab tree.
//!
//! A renderer consumes the events in order: every `OpenTab` is matched by a
//! later `CloseTab`, and `RenderPayload` appears once per leaf item.

use serde::Serialize;

use dashtree_shared::ContentItem;

use crate::hierarchy::{ItemNode, TabGroupNode, TreeNode};

/// Depth reported for top-level tabs unless configured otherwise.
pub const DEFAULT_BASE_DEPTH: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event<'a> {
    /// Start of a tab. `depth` only suggests a heading level.
    OpenTab {
        name: &'a str,
        label: &'a str,
        depth: usize,
    },
    CloseTab,
    RenderPayload { item: &'a ContentItem },
}

/// Serialize `tree` with top-level tabs at [`DEFAULT_BASE_DEPTH`].
pub fn serialize(tree: &TabGroupNode) -> Vec<Event<'_>> {
    serialize_from(tree, DEFAULT_BASE_DEPTH)
}

/// Serialize `tree` with top-level tabs at `base_depth`.
///
/// The root group itself emits nothing; only its children do.
pub fn serialize_from(tree: &TabGroupNode, base_depth: usize) -> Vec<Event<'_>> {
    let mut events = Vec::new();
    walk(&tree.children, base_depth, &mut events);
    events
}

fn walk<'a>(nodes: &'a [TreeNode], depth: usize, events: &mut Vec<Event<'a>>) {
    for node in nodes {
        match node {
            TreeNode::Group(group) => {
                events.push(Event::OpenTab {
                    name: &group.name,
                    label: &group.label,
                    depth,
                });
                walk(&group.children, depth + 1, events);
                events.push(Event::CloseTab);
            }
            TreeNode::Item(node) if node.is_leaf() => {
                events.push(Event::RenderPayload { item: &node.item });
            }
            TreeNode::Item(node) => open_container(node, depth, events),
        }
    }
}

// A container renders as a tab of its own, never its payload.
fn open_container<'a>(node: &'a ItemNode, depth: usize, events: &mut Vec<Event<'a>>) {
    let name = node.item.tab_path.last().map(String::as_str).unwrap_or("");
    events.push(Event::OpenTab {
        name,
        label: &node.label,
        depth,
    });
    walk(&node.nested_children, depth + 1, events);
    events.push(Event::CloseTab);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Collection;
    use crate::hierarchy::build_tree;
    use crate::pagination::split;
    use dashtree_shared::LabelMap;
    use serde_json::json;

    fn tree_for(items: Vec<ContentItem>, labels: &LabelMap) -> TabGroupNode {
        let mut collection = Collection::new();
        for item in items {
            collection.append(item);
        }
        let sections = split(collection.items());
        build_tree(&sections[0], labels).expect("build")
    }

    fn named(name: &str) -> ContentItem {
        ContentItem::new(json!({ "name": name }))
    }

    /// Compact trace: `+label@depth`, `-`, or the payload name.
    fn trace(events: &[Event<'_>]) -> Vec<String> {
        events
            .iter()
            .map(|e| match e {
                Event::OpenTab { label, depth, .. } => format!("+{label}@{depth}"),
                Event::CloseTab => "-".to_string(),
                Event::RenderPayload { item } => {
                    item.payload["name"].as_str().unwrap_or("?").to_string()
                }
            })
            .collect()
    }

    #[test]
    fn untabbed_items_render_directly() {
        let tree = tree_for(vec![named("a"), named("b")], &LabelMap::new());
        assert_eq!(trace(&serialize(&tree)), vec!["a", "b"]);
    }

    #[test]
    fn filtered_branches_open_item_tabs() {
        let labels: LabelMap = [("sis", "Siblings"), ("age", "Age")].into_iter().collect();
        let tree = tree_for(
            vec![
                named("w1").with_tab_path(["sis"]).with_filter("w1").with_title_tabset("Wave 1"),
                named("w2").with_tab_path(["sis"]).with_filter("w2").with_title_tabset("Wave 2"),
                named("a1").with_tab_path(["sis", "age", "item1"]).with_filter("w1"),
                named("a2").with_tab_path(["sis", "age", "item1"]).with_filter("w2"),
            ],
            &labels,
        );

        assert_eq!(
            trace(&serialize(&tree)),
            vec![
                "+Siblings@1",
                "+Wave 1@2",
                "+Age@3",
                "+item1@4",
                "a1",
                "-",
                "-",
                "-",
                "+Wave 2@2",
                "+Age@3",
                "+item1@4",
                "a2",
                "-",
                "-",
                "-",
                "-",
            ]
        );
    }

    #[test]
    fn container_payload_is_never_rendered() {
        let tree = tree_for(
            vec![
                named("parent").with_tab_path(["p"]),
                named("child").with_tab_path(["p", "c"]),
            ],
            &LabelMap::new(),
        );
        let events = serialize(&tree);
        let rendered: Vec<String> = trace(&events)
            .into_iter()
            .filter(|t| !t.starts_with('+') && t != "-")
            .collect();
        assert_eq!(rendered, vec!["child"]);

        let container_tab = events.iter().find_map(|e| match e {
            Event::OpenTab { name, depth: 2, .. } => Some(*name),
            _ => None,
        });
        assert_eq!(container_tab, Some("p"));
    }

    #[test]
    fn tabs_are_balanced_and_leaves_render_once() {
        let tree = tree_for(
            vec![
                named("x").with_tab_path(["a", "b"]),
                named("y").with_tab_path(["a"]),
                named("z"),
                named("w").with_tab_path(["c"]).with_filter("f"),
                named("v").with_tab_path(["c", "d"]).with_filter("f"),
            ],
            &LabelMap::new(),
        );
        let events = serialize(&tree);

        let mut open = 0i64;
        for e in &events {
            match e {
                Event::OpenTab { .. } => open += 1,
                Event::CloseTab => {
                    open -= 1;
                    assert!(open >= 0);
                }
                Event::RenderPayload { .. } => {}
            }
        }
        assert_eq!(open, 0);

        let payloads = events
            .iter()
            .filter(|e| matches!(e, Event::RenderPayload { .. }))
            .count();
        assert_eq!(payloads, tree.leaf_count());
        assert_eq!(payloads, 4);
    }

    #[test]
    fn base_depth_shifts_levels() {
        let tree = tree_for(vec![named("x").with_tab_path(["a"])], &LabelMap::new());
        assert_eq!(trace(&serialize_from(&tree, 3)), vec!["+a@3", "x", "-"]);
    }

    #[test]
    fn events_serialize_as_tagged_json() {
        let tree = tree_for(vec![named("x").with_tab_path(["a"])], &LabelMap::new());
        let json = serde_json::to_value(serialize(&tree)).expect("serialize");
        assert_eq!(json[0]["event"], "open_tab");
        assert_eq!(json[0]["label"], "a");
        assert_eq!(json[1]["event"], "render_payload");
        assert_eq!(json[1]["item"]["payload"]["name"], "x");
        assert_eq!(json[2], json!({ "event": "close_tab" }));
    }
}
