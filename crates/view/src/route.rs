//! Same-origin URLs for the data and map endpoints, and the reverse mapping
//! from the current page path to the prefix it shows.

use std::borrow::Cow;

use crate::codec;

/// Path segment used in URLs when a prefix lives in the global table.
pub const NO_VRF: &str = "None";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Prefix { vrf: Option<String>, prefix: String },
    NoPrefix,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Routes {
    base_path: String,
}

impl Routes {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn data_url(&self, vrf: Option<&str>, prefix: &str) -> String {
        self.endpoint("data", vrf, prefix)
    }

    pub fn map_url(&self, vrf: Option<&str>, prefix: &str) -> String {
        self.endpoint("map", vrf, prefix)
    }

    fn endpoint(&self, kind: &str, vrf: Option<&str>, prefix: &str) -> String {
        format!(
            "{}/{kind}/{}/{}",
            self.base_path,
            vrf_segment(vrf),
            codec::encode(prefix)
        )
    }

    /// Reads `{base}/{page}/{vrf}/{token...}` out of a page path.
    pub fn parse(&self, pathname: &str) -> Route {
        let path = if self.base_path.is_empty() {
            pathname
        } else {
            pathname.strip_prefix(self.base_path.as_str()).unwrap_or(pathname)
        };
        let segments: Vec<Cow<'_, str>> = path.split('/').map(unescape).collect();

        let vrf = segments
            .get(2)
            .filter(|s| !s.is_empty() && **s != NO_VRF)
            .map(|s| s.to_string());
        let token = segments.get(3..).map(|rest| rest.join("/")).unwrap_or_default();
        if token.is_empty() {
            return Route::NoPrefix;
        }
        Route::Prefix {
            vrf,
            prefix: codec::decode(&token),
        }
    }
}

fn vrf_segment(vrf: Option<&str>) -> Cow<'_, str> {
    urlencoding::encode(vrf.unwrap_or(NO_VRF))
}

fn unescape(segment: &str) -> Cow<'_, str> {
    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}
