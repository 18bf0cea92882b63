use std::collections::HashMap;

use ipam_view::tree::{failure_message, ListItem};
use ipam_view::{fetch_node, Content, ContainerId, LoadRequest, LoadTicket, PrefixTree, Routes, ToggleOutcome};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::trace;
use web_sys::{AbortController, AbortSignal};

use crate::http::HttpSource;

/// Abort handles for requests still running, keyed by target container.
#[derive(Clone, Copy)]
pub struct InFlight(StoredValue<HashMap<ContainerId, AbortController>, LocalStorage>);

impl InFlight {
    pub fn new() -> Self {
        Self(StoredValue::new_local(HashMap::new()))
    }

    fn start(&self, id: ContainerId) -> Option<AbortSignal> {
        let controller = AbortController::new().ok()?;
        let signal = controller.signal();
        self.0.update_value(|running| {
            if let Some(previous) = running.insert(id, controller) {
                previous.abort();
            }
        });
        Some(signal)
    }

    fn finish(&self, id: ContainerId) {
        self.0.update_value(|running| {
            running.remove(&id);
        });
    }

    fn abort(&self, ids: &[ContainerId]) {
        self.0.update_value(|running| {
            for id in ids {
                if let Some(controller) = running.remove(id) {
                    trace!(container = %id, "aborting request for removed container");
                    controller.abort();
                }
            }
        });
    }
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}

#[component]
pub fn PrefixTreePage(routes: Routes, pathname: String) -> impl IntoView {
    let tree = RwSignal::new(PrefixTree::new(routes));
    let inflight = InFlight::new();
    if let Some(ticket) = tree.try_update(|t| t.bootstrap(&pathname)).flatten() {
        spawn_fetch(tree, inflight, ticket);
    }
    let root = tree.with_untracked(PrefixTree::root);

    view! { <div class="prefix-tree">{render_container(tree, inflight, root)}</div> }
}

fn render_container(tree: RwSignal<PrefixTree>, inflight: InFlight, id: ContainerId) -> AnyView {
    let content = Memo::new(move |_| tree.with(|t| t.content(id).cloned()));
    (move || match content.get() {
        None | Some(Content::Empty) => ().into_any(),
        Some(Content::Placeholder(link)) => view! { <a href=link.href>{link.label}</a> }.into_any(),
        Some(Content::Busy) => view! {
            <div class="spinner">
                <div class="spinner-ring"></div>
                <p>"Loading..."</p>
            </div>
        }
        .into_any(),
        Some(Content::Failed { url }) => failure_message(&url).into_any(),
        Some(Content::Notice(text)) => text.into_any(),
        Some(Content::Item(item)) => render_item(tree, inflight, id, item),
    })
    .into_any()
}

fn render_item(tree: RwSignal<PrefixTree>, inflight: InFlight, id: ContainerId, item: ListItem) -> AnyView {
    let toggle = item.toggle_label().map(|label| {
        view! {
            <button class="toggle" style="margin-left: 10px" on:click=move |_| on_toggle(tree, inflight, id)>
                {label}
            </button>
        }
    });
    let children = item.child_list().map(|list| {
        let entries = list
            .iter()
            .map(|child| view! { <li>{render_container(tree, inflight, *child)}</li> })
            .collect_view();
        view! { <ul>{entries}</ul> }
    });
    let ListItem { link, .. } = item;

    view! {
        <ul>
            <li>
                <a href=link.href>{link.label}</a>
                {toggle}
                {children}
            </li>
        </ul>
    }
    .into_any()
}

fn on_toggle(tree: RwSignal<PrefixTree>, inflight: InFlight, id: ContainerId) {
    match tree.try_update(|t| t.toggle(id)) {
        Some(ToggleOutcome::Expanded(requests)) => {
            for request in requests {
                spawn_load(tree, inflight, request);
            }
        }
        Some(ToggleOutcome::Collapsed(removed)) => inflight.abort(&removed),
        Some(ToggleOutcome::Ignored) | None => {}
    }
    tree.with_untracked(|t| trace!(outline = %t.outline(), "toggled {id}"));
}

fn spawn_load(tree: RwSignal<PrefixTree>, inflight: InFlight, request: LoadRequest) {
    spawn_local(async move {
        if let Some(ticket) = tree.try_update(|t| t.begin_load(request)).flatten() {
            run_fetch(tree, inflight, ticket).await;
        }
    });
}

fn spawn_fetch(tree: RwSignal<PrefixTree>, inflight: InFlight, ticket: LoadTicket) {
    spawn_local(run_fetch(tree, inflight, ticket));
}

async fn run_fetch(tree: RwSignal<PrefixTree>, inflight: InFlight, ticket: LoadTicket) {
    let container = ticket.container;
    let source = HttpSource::new(inflight.start(container));
    let result = fetch_node(&source, &ticket).await;
    inflight.finish(container);
    tree.update(|t| {
        t.finish_load(ticket, result);
    });
}
