//! Hover regions drawn over a visualization image.

use ipam_types::{OverlayPayload, Tenant};
use tracing::warn;

pub const UNKNOWN_TENANT: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Address,
    Prefix,
}

impl RegionKind {
    pub fn class(self) -> &'static str {
        match self {
            RegionKind::Address => "ip",
            RegionKind::Prefix => "prefix",
        }
    }

    fn caption(self) -> &'static str {
        match self {
            RegionKind::Address => "IP Address",
            RegionKind::Prefix => "Prefix",
        }
    }
}

/// Pixel rectangle relative to the image origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height].iter().all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HitRegion {
    pub kind: RegionKind,
    pub rect: Rect,
    pub label: String,
    pub tenant: Option<Tenant>,
}

impl HitRegion {
    pub fn tenant_label(&self) -> String {
        self.tenant
            .as_ref()
            .and_then(Tenant::label)
            .unwrap_or_else(|| UNKNOWN_TENANT.to_string())
    }

    pub fn tooltip_lines(&self) -> Vec<String> {
        vec![
            format!("{}: {}", self.kind.caption(), self.label),
            format!("Tenant: {}", self.tenant_label()),
        ]
    }
}

/// The overlay surface: sized to the image, holding one region per rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub width: f64,
    pub height: f64,
    pub regions: Vec<HitRegion>,
}

impl Overlay {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            regions: Vec::new(),
        }
    }

    /// Replaces the regions with those in `payload`, addresses first.
    pub fn annotate(&mut self, payload: OverlayPayload) {
        let addresses = payload.ip_addresses.into_iter().map(|r| HitRegion {
            kind: RegionKind::Address,
            rect: Rect { x: r.x, y: r.y, width: r.width, height: r.height },
            label: r.address,
            tenant: r.tenant,
        });
        let prefixes = payload.child_prefixes.into_iter().map(|r| HitRegion {
            kind: RegionKind::Prefix,
            rect: Rect { x: r.x, y: r.y, width: r.width, height: r.height },
            label: r.prefix,
            tenant: r.tenant,
        });

        self.regions = addresses
            .chain(prefixes)
            .filter(|region| {
                let ok = region.rect.is_finite();
                if !ok {
                    warn!(label = %region.label, "skipping region with non-finite geometry");
                }
                ok
            })
            .collect();
    }

    pub fn regions_of(&self, kind: RegionKind) -> impl Iterator<Item = &HitRegion> {
        self.regions.iter().filter(move |r| r.kind == kind)
    }
}

/// Tooltip that follows the cursor while a region is hovered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    pub left: f64,
    pub top: f64,
    pub lines: Vec<String>,
}

impl Tooltip {
    pub fn show(&mut self, region: &HitRegion, page_x: f64, page_y: f64, offset: f64) {
        self.visible = true;
        self.left = page_x + offset;
        self.top = page_y + offset;
        self.lines = region.tooltip_lines();
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Inline CSS for the tooltip element.
    pub fn style(&self) -> String {
        if self.visible {
            format!("display: block; left: {}px; top: {}px;", self.left, self.top)
        } else {
            "display: none;".to_string()
        }
    }
}
