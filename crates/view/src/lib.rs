//! Browser-independent core of the IPAM visualizer client: prefix tokens,
//! page routes, the lazily expanded prefix tree and the image overlay.

pub mod codec;
pub mod config;
pub mod error;
pub mod overlay;
pub mod route;
pub mod source;
pub mod tree;

pub use config::{ConfigError, OverlayConfig, TreeConfig};
pub use error::FetchError;
pub use overlay::{HitRegion, Overlay, RegionKind, Tooltip};
pub use route::{Route, Routes};
pub use source::{fetch_node, fetch_overlay, JsonSource};
pub use tree::{Content, ContainerId, DisplayState, LoadOutcome, LoadRequest, LoadTicket, PrefixTree, ToggleOutcome};
