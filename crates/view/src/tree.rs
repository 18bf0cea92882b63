//! Lazily expanded prefix tree.
//!
//! The tree is a set of containers. A container is an attachment point that
//! shows exactly one thing at a time: nothing, a child placeholder, a busy
//! indicator, an inline error, a notice, or a rendered list item. A rendered
//! item with children owns at most one child list, and each entry of that list
//! is itself a container filled by a separate load.
//!
//! Loads are split in two halves so the caller decides how the request is
//! performed: [`PrefixTree::begin_load`] marks the container busy and hands out
//! a [`LoadTicket`], [`PrefixTree::finish_load`] applies the response. A ticket
//! whose container was removed or reloaded in the meantime is stale and its
//! completion is dropped.

use std::collections::HashMap;
use std::fmt;

use ipam_types::{ChildPrefix, PrefixNode};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::route::{Route, Routes};

pub const NO_PREFIX_NOTICE: &str = "No prefix specified.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Empty,
    Placeholder(Link),
    Busy,
    Failed { url: String },
    Notice(String),
    Item(ListItem),
}

impl Content {
    pub fn is_busy(&self) -> bool {
        matches!(self, Content::Busy)
    }

    pub fn item(&self) -> Option<&ListItem> {
        match self {
            Content::Item(item) => Some(item),
            _ => None,
        }
    }
}

/// A rendered node: its map link plus the expansion state of its children.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub link: Link,
    pub vrf: Option<String>,
    children: Vec<ChildPrefix>,
    pub state: DisplayState,
}

impl ListItem {
    pub fn child_prefixes(&self) -> &[ChildPrefix] {
        &self.children
    }

    /// Label of the toggle control, `None` for leaves.
    pub fn toggle_label(&self) -> Option<&'static str> {
        match self.state {
            DisplayState::Leaf => None,
            DisplayState::Collapsed => Some(" [+]"),
            DisplayState::Expanded(_) => Some(" [-]"),
        }
    }

    pub fn child_list(&self) -> Option<&[ContainerId]> {
        match &self.state {
            DisplayState::Expanded(list) => Some(list),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    Leaf,
    Collapsed,
    Expanded(Vec<ContainerId>),
}

/// A container waiting for its node to be requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub container: ContainerId,
    pub vrf: Option<String>,
    pub prefix: String,
}

/// An in-flight load, keyed by container and load epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub container: ContainerId,
    epoch: u64,
    pub vrf: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered,
    Failed,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Child placeholders were attached and now need loading, in order.
    Expanded(Vec<LoadRequest>),
    /// The child list was detached; the ids are every container removed with it.
    Collapsed(Vec<ContainerId>),
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
struct Container {
    parent: Option<ContainerId>,
    epoch: u64,
    content: Content,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixTree {
    routes: Routes,
    containers: HashMap<ContainerId, Container>,
    root: ContainerId,
    next_id: u64,
}

impl PrefixTree {
    pub fn new(routes: Routes) -> Self {
        let root = ContainerId(0);
        let mut containers = HashMap::new();
        containers.insert(
            root,
            Container {
                parent: None,
                epoch: 0,
                content: Content::Empty,
            },
        );
        Self {
            routes,
            containers,
            root,
            next_id: 1,
        }
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    pub fn root(&self) -> ContainerId {
        self.root
    }

    pub fn contains(&self, id: ContainerId) -> bool {
        self.containers.contains_key(&id)
    }

    pub fn content(&self, id: ContainerId) -> Option<&Content> {
        self.containers.get(&id).map(|c| &c.content)
    }

    pub fn parent(&self, id: ContainerId) -> Option<ContainerId> {
        self.containers.get(&id).and_then(|c| c.parent)
    }

    /// Number of live containers, the root included.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Starts the tree for the page at `pathname`.
    ///
    /// Returns the root load to run, or `None` when the path names no prefix,
    /// in which case the root shows [`NO_PREFIX_NOTICE`].
    pub fn bootstrap(&mut self, pathname: &str) -> Option<LoadTicket> {
        match self.routes.parse(pathname) {
            Route::Prefix { vrf, prefix } => self.begin_load(LoadRequest {
                container: self.root,
                vrf,
                prefix,
            }),
            Route::NoPrefix => {
                debug!(%pathname, "no prefix in page path");
                self.set_content(self.root, Content::Notice(NO_PREFIX_NOTICE.to_string()));
                None
            }
        }
    }

    /// Shows the busy indicator in the target container and issues a ticket for
    /// its request. Anything previously under the container is discarded.
    pub fn begin_load(&mut self, request: LoadRequest) -> Option<LoadTicket> {
        let LoadRequest { container, vrf, prefix } = request;
        if !self.contains(container) {
            warn!(%container, %prefix, "load requested for a removed container");
            return None;
        }
        self.detach_children(container);
        let url = self.routes.data_url(vrf.as_deref(), &prefix);
        let slot = self.containers.get_mut(&container)?;
        slot.epoch += 1;
        slot.content = Content::Busy;
        Some(LoadTicket {
            container,
            epoch: slot.epoch,
            vrf,
            url,
        })
    }

    /// Applies the result of a ticket's request to its container.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<PrefixNode, FetchError>) -> LoadOutcome {
        let live = self
            .containers
            .get(&ticket.container)
            .is_some_and(|c| c.epoch == ticket.epoch && c.content.is_busy());
        if !live {
            warn!(container = %ticket.container, url = %ticket.url, "dropping stale load result");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(node) => {
                let item = self.render(node, ticket.vrf);
                self.set_content(ticket.container, Content::Item(item));
                LoadOutcome::Rendered
            }
            Err(err) => {
                debug!(container = %ticket.container, %err, "rendering load failure");
                self.set_content(ticket.container, Content::Failed { url: ticket.url });
                LoadOutcome::Failed
            }
        }
    }

    /// Flips the toggle of the item rendered in `id`.
    pub fn toggle(&mut self, id: ContainerId) -> ToggleOutcome {
        let children = match self.content(id) {
            Some(Content::Item(ListItem {
                state: DisplayState::Collapsed,
                children,
                ..
            })) => children.clone(),
            Some(Content::Item(ListItem {
                state: DisplayState::Expanded(_),
                ..
            })) => return ToggleOutcome::Collapsed(self.detach_children(id)),
            _ => return ToggleOutcome::Ignored,
        };

        let mut list = Vec::with_capacity(children.len());
        let mut requests = Vec::with_capacity(children.len());
        for child in children {
            let link = self.link(child.vrf.as_deref(), &child.prefix);
            let container = self.insert(id, Content::Placeholder(link));
            list.push(container);
            requests.push(LoadRequest {
                container,
                vrf: child.vrf,
                prefix: child.prefix,
            });
        }
        if let Some(Content::Item(item)) = self.content_mut(id) {
            item.state = DisplayState::Expanded(list);
        }
        ToggleOutcome::Expanded(requests)
    }

    /// Plain-text rendering of the visible tree, one line per container.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(self.root, 0, &mut out);
        out
    }

    fn write_outline(&self, id: ContainerId, depth: usize, out: &mut String) {
        let Some(content) = self.content(id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let line = match content {
            Content::Empty => return,
            Content::Placeholder(link) => format!("{indent}{} (pending)", link.label),
            Content::Busy => format!("{indent}Loading..."),
            Content::Failed { url } => format!("{indent}{}", failure_message(url)),
            Content::Notice(text) => format!("{indent}{text}"),
            Content::Item(item) => format!("{indent}{}{}", item.link.label, item.toggle_label().unwrap_or("")),
        };
        out.push_str(&line);
        out.push('\n');
        if let Some(list) = content.item().and_then(ListItem::child_list) {
            for child in list {
                self.write_outline(*child, depth + 1, out);
            }
        }
    }

    fn render(&self, node: PrefixNode, requested_vrf: Option<String>) -> ListItem {
        let vrf = node.vrf.or(requested_vrf);
        let link = self.link(vrf.as_deref(), &node.prefix);
        let state = if node.child_prefixes.is_empty() {
            DisplayState::Leaf
        } else {
            DisplayState::Collapsed
        };
        ListItem {
            link,
            vrf,
            children: node.child_prefixes,
            state,
        }
    }

    fn link(&self, vrf: Option<&str>, prefix: &str) -> Link {
        Link {
            href: self.routes.map_url(vrf, prefix),
            label: prefix.to_string(),
        }
    }

    fn insert(&mut self, parent: ContainerId, content: Content) -> ContainerId {
        let id = ContainerId(self.next_id);
        self.next_id += 1;
        self.containers.insert(
            id,
            Container {
                parent: Some(parent),
                epoch: 0,
                content,
            },
        );
        id
    }

    fn set_content(&mut self, id: ContainerId, content: Content) {
        if let Some(container) = self.containers.get_mut(&id) {
            container.content = content;
        }
    }

    fn content_mut(&mut self, id: ContainerId) -> Option<&mut Content> {
        self.containers.get_mut(&id).map(|c| &mut c.content)
    }

    /// Removes the child list under `id`, if any, and everything below it.
    fn detach_children(&mut self, id: ContainerId) -> Vec<ContainerId> {
        let list = match self.content_mut(id) {
            Some(Content::Item(item)) => match std::mem::replace(&mut item.state, DisplayState::Collapsed) {
                DisplayState::Expanded(list) => list,
                other => {
                    item.state = other;
                    return Vec::new();
                }
            },
            _ => return Vec::new(),
        };

        let mut removed = Vec::new();
        let mut pending = list;
        while let Some(child) = pending.pop() {
            if let Some(container) = self.containers.remove(&child) {
                if let Content::Item(ListItem {
                    state: DisplayState::Expanded(grandchildren),
                    ..
                }) = container.content
                {
                    pending.extend(grandchildren);
                }
                removed.push(child);
            }
        }
        removed
    }
}

/// Inline text shown in place of a container whose load failed.
pub fn failure_message(url: &str) -> String {
    format!("Failed to load prefix tree. URL: {url}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn child(prefix: &str) -> ChildPrefix {
        ChildPrefix {
            prefix: prefix.to_string(),
            vrf: None,
            tenant: None,
        }
    }

    fn node(prefix: &str, children: &[&str]) -> PrefixNode {
        PrefixNode {
            prefix: prefix.to_string(),
            vrf: None,
            child_prefixes: children.iter().map(|c| child(c)).collect(),
        }
    }

    fn loaded_root(children: &[&str]) -> PrefixTree {
        let mut tree = PrefixTree::new(Routes::default());
        let ticket = tree.bootstrap("/tree/None/10_0_0_0_16").unwrap();
        tree.finish_load(ticket, Ok(node("10.0.0.0/16", children)));
        tree
    }

    fn child_lists(tree: &PrefixTree, id: ContainerId) -> usize {
        tree.content(id)
            .and_then(Content::item)
            .and_then(ListItem::child_list)
            .map_or(0, |_| 1)
    }

    #[test]
    fn busy_until_root_resolves() {
        let mut tree = PrefixTree::new(Routes::new("/ipam"));
        let ticket = tree.bootstrap("/ipam/tree/None/10_0_0_0_16").unwrap();
        assert_eq!(ticket.url, "/ipam/data/None/10_0_0_0_16");
        assert_eq!(tree.content(tree.root()), Some(&Content::Busy));

        let outcome = tree.finish_load(ticket, Ok(node("10.0.0.0/16", &[])));
        assert_eq!(outcome, LoadOutcome::Rendered);
        let item = tree.content(tree.root()).and_then(Content::item).unwrap();
        assert_eq!(item.link.label, "10.0.0.0/16");
        assert_eq!(item.link.href, "/ipam/map/None/10_0_0_0_16");
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn missing_prefix_shows_notice() {
        let mut tree = PrefixTree::new(Routes::default());
        assert!(tree.bootstrap("/tree/blue").is_none());
        assert_eq!(
            tree.content(tree.root()),
            Some(&Content::Notice(NO_PREFIX_NOTICE.to_string()))
        );
    }

    #[test]
    fn leaf_has_no_toggle() {
        let mut tree = loaded_root(&[]);
        let root = tree.root();
        let item = tree.content(root).and_then(Content::item).unwrap();
        assert_eq!(item.toggle_label(), None);
        assert_eq!(tree.toggle(root), ToggleOutcome::Ignored);
    }

    #[test]
    fn expand_attaches_placeholders_in_order() {
        let mut tree = loaded_root(&["10.0.1.0/24", "10.0.2.0/24"]);
        let root = tree.root();
        let ToggleOutcome::Expanded(requests) = tree.toggle(root) else {
            panic!("expected expansion");
        };

        let prefixes: Vec<_> = requests.iter().map(|r| r.prefix.as_str()).collect();
        assert_eq!(prefixes, ["10.0.1.0/24", "10.0.2.0/24"]);
        let item = tree.content(root).and_then(Content::item).unwrap();
        assert_eq!(item.toggle_label(), Some(" [-]"));
        assert_eq!(
            tree.content(requests[0].container),
            Some(&Content::Placeholder(Link {
                href: "/map/None/10_0_1_0_24".to_string(),
                label: "10.0.1.0/24".to_string(),
            }))
        );
        assert_eq!(tree.parent(requests[1].container), Some(root));
    }

    #[test]
    fn toggling_twice_detaches_child_list() {
        let mut tree = loaded_root(&["10.0.1.0/24"]);
        let root = tree.root();
        let before = tree.clone();

        let ToggleOutcome::Expanded(requests) = tree.toggle(root) else {
            panic!("expected expansion");
        };
        let ToggleOutcome::Collapsed(removed) = tree.toggle(root) else {
            panic!("expected collapse");
        };

        assert_eq!(removed, vec![requests[0].container]);
        assert_eq!(child_lists(&tree, root), 0);
        assert_eq!(tree.content(root), before.content(root));
        assert_eq!(tree.len(), before.len());
    }

    #[test]
    fn re_expanding_never_duplicates() {
        let mut tree = loaded_root(&["10.0.1.0/24", "10.0.2.0/24"]);
        let root = tree.root();
        tree.toggle(root);
        tree.toggle(root);
        let ToggleOutcome::Expanded(requests) = tree.toggle(root) else {
            panic!("expected expansion");
        };

        assert_eq!(child_lists(&tree, root), 1);
        assert_eq!(requests.len(), 2);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn collapse_removes_nested_descendants() {
        let mut tree = loaded_root(&["10.0.1.0/24"]);
        let root = tree.root();
        let ToggleOutcome::Expanded(mut requests) = tree.toggle(root) else {
            panic!("expected expansion");
        };
        let ticket = tree.begin_load(requests.remove(0)).unwrap();
        let child_id = ticket.container;
        tree.finish_load(ticket, Ok(node("10.0.1.0/24", &["10.0.1.0/25", "10.0.1.128/25"])));
        tree.toggle(child_id);
        assert_eq!(tree.len(), 4);

        let ToggleOutcome::Collapsed(mut removed) = tree.toggle(root) else {
            panic!("expected collapse");
        };
        removed.sort();
        assert_eq!(removed.len(), 3);
        assert!(removed.contains(&child_id));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn failure_stays_in_its_container() {
        let mut tree = loaded_root(&["10.0.1.0/24", "10.0.2.0/24"]);
        let root = tree.root();
        let ToggleOutcome::Expanded(requests) = tree.toggle(root) else {
            panic!("expected expansion");
        };
        let mut tickets: Vec<_> = requests.into_iter().filter_map(|r| tree.begin_load(r)).collect();
        let second = tickets.pop().unwrap();
        let first = tickets.pop().unwrap();

        let failed_url = first.url.clone();
        let failed_id = first.container;
        let err = FetchError::Status {
            url: failed_url.clone(),
            status: 500,
        };
        assert_eq!(tree.finish_load(first, Err(err)), LoadOutcome::Failed);
        let second_id = second.container;
        assert_eq!(
            tree.finish_load(second, Ok(node("10.0.2.0/24", &["10.0.2.0/25"]))),
            LoadOutcome::Rendered
        );

        assert_eq!(tree.content(failed_id), Some(&Content::Failed { url: failed_url }));
        assert!(matches!(tree.toggle(second_id), ToggleOutcome::Expanded(ref r) if r.len() == 1));
        assert!(tree.content(root).and_then(Content::item).is_some());
    }

    #[test]
    fn result_after_collapse_is_stale() {
        let mut tree = loaded_root(&["10.0.1.0/24"]);
        let root = tree.root();
        let ToggleOutcome::Expanded(mut requests) = tree.toggle(root) else {
            panic!("expected expansion");
        };
        let ticket = tree.begin_load(requests.remove(0)).unwrap();
        tree.toggle(root);

        assert_eq!(tree.finish_load(ticket, Ok(node("10.0.1.0/24", &[]))), LoadOutcome::Stale);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn reload_supersedes_older_ticket() {
        let mut tree = PrefixTree::new(Routes::default());
        let first = tree.bootstrap("/tree/None/10_0_0_0_16").unwrap();
        let second = tree.bootstrap("/tree/None/10_0_0_0_16").unwrap();

        assert_eq!(tree.finish_load(first, Ok(node("10.0.0.0/16", &[]))), LoadOutcome::Stale);
        assert_eq!(tree.finish_load(second, Ok(node("10.0.0.0/16", &[]))), LoadOutcome::Rendered);
    }

    #[test]
    fn response_vrf_wins_over_requested() {
        let mut tree = PrefixTree::new(Routes::default());
        let ticket = tree.bootstrap("/tree/blue/10_0_0_0_8").unwrap();
        assert_eq!(ticket.url, "/data/blue/10_0_0_0_8");

        let mut payload = node("10.0.0.0/8", &[]);
        tree.finish_load(ticket, Ok(payload.clone()));
        let item = tree.content(tree.root()).and_then(Content::item).unwrap();
        assert_eq!(item.link.href, "/map/blue/10_0_0_0_8");

        payload.vrf = Some("red".to_string());
        let ticket = tree.bootstrap("/tree/blue/10_0_0_0_8").unwrap();
        tree.finish_load(ticket, Ok(payload));
        let item = tree.content(tree.root()).and_then(Content::item).unwrap();
        assert_eq!(item.link.href, "/map/red/10_0_0_0_8");
    }

    #[test]
    fn outline_reflects_visible_tree() {
        let mut tree = loaded_root(&["10.0.1.0/24", "10.0.2.0/24"]);
        let root = tree.root();
        let ToggleOutcome::Expanded(requests) = tree.toggle(root) else {
            panic!("expected expansion");
        };
        let mut requests = requests.into_iter();
        let first = tree.begin_load(requests.next().unwrap()).unwrap();
        tree.finish_load(first, Ok(node("10.0.1.0/24", &[])));

        assert_eq!(
            tree.outline(),
            "10.0.0.0/16 [-]\n  10.0.1.0/24\n  10.0.2.0/24 (pending)\n"
        );
    }
}
