//! Browser entry points. The hosting page loads the module and calls one of
//! the exported functions with a JSON configuration object.

mod http;
mod logging;
mod overlay;
mod tree;

use ipam_view::{OverlayConfig, Routes, TreeConfig};
use leptos::prelude::*;
use tracing::info;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

use crate::overlay::OverlayView;
use crate::tree::PrefixTreePage;

/// Renders the prefix tree for the current page path.
#[wasm_bindgen]
pub fn start_prefix_tree(config: &str) -> Result<(), JsValue> {
    let config = TreeConfig::from_json(config).map_err(js_error)?;
    logging::init(config.max_level().map_err(js_error)?);

    let pathname = window().location().pathname()?;
    let routes = Routes::new(config.base_path.clone());
    info!(%pathname, base_path = %routes.base_path(), "starting prefix tree");

    let parent = mount_point(&config.container_id)?;
    leptos::mount::mount_to(parent, move || view! { <PrefixTreePage routes=routes pathname=pathname /> }).forget();
    Ok(())
}

/// Draws hover regions over the visualization image.
#[wasm_bindgen]
pub fn start_overlay(config: &str) -> Result<(), JsValue> {
    let config = OverlayConfig::from_json(config).map_err(js_error)?;
    logging::init(config.max_level().map_err(js_error)?);
    info!(data_url = %config.data_url, "starting overlay");

    let parent = mount_point(&config.overlay_id)?;
    leptos::mount::mount_to(parent, move || view! { <OverlayView config=config /> }).forget();
    Ok(())
}

fn mount_point(id: &str) -> Result<HtmlElement, JsValue> {
    document()
        .get_element_by_id(id)
        .ok_or_else(|| js_error(format!("no element with id {id}")))?
        .dyn_into::<HtmlElement>()
        .map_err(JsValue::from)
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
