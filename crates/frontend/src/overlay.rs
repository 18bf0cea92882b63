use ipam_view::{fetch_overlay, HitRegion, Overlay, OverlayConfig, Tooltip};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::debug;

use crate::http::HttpSource;

#[component]
pub fn OverlayView(config: OverlayConfig) -> impl IntoView {
    let overlay = RwSignal::new(Overlay::new(config.image_width, config.image_height));
    let tooltip = RwSignal::new(Tooltip::default());
    let offset = config.tooltip_offset;

    let data_url = config.data_url.clone();
    spawn_local(async move {
        if let Ok(payload) = fetch_overlay(&HttpSource::default(), &data_url).await {
            debug!(
                addresses = payload.ip_addresses.len(),
                prefixes = payload.child_prefixes.len(),
                "annotating image"
            );
            overlay.update(|o| o.annotate(payload));
        }
    });

    let (width, height) = (config.image_width, config.image_height);
    view! {
        <svg
            class="overlay"
            width=width
            height=height
            viewBox=format!("0 0 {width} {height}")
            style="position: absolute; left: 0; top: 0;"
        >
            {move || {
                overlay
                    .with(|o| o.regions.clone())
                    .into_iter()
                    .map(|region| hit_region(region, tooltip, offset))
                    .collect_view()
            }}
        </svg>
        <div class="tooltip" style=move || format!("position: fixed; {}", tooltip.with(Tooltip::style))>
            {move || {
                tooltip
                    .with(|t| t.lines.clone())
                    .into_iter()
                    .map(|line| view! { <div>{line}</div> })
                    .collect_view()
            }}
        </div>
    }
}

fn hit_region(region: HitRegion, tooltip: RwSignal<Tooltip>, offset: f64) -> impl IntoView {
    let rect = region.rect;
    let class = region.kind.class();
    view! {
        <rect
            class=class
            x=rect.x
            y=rect.y
            width=rect.width
            height=rect.height
            fill="transparent"
            on:mouseover=move |ev| {
                tooltip.update(|t| t.show(&region, f64::from(ev.client_x()), f64::from(ev.client_y()), offset))
            }
            on:mouseout=move |_| tooltip.update(Tooltip::hide)
        />
    }
}
