//! The fetch contract between the view model and whatever performs HTTP.

use std::future::Future;

use ipam_types::{OverlayPayload, PrefixNode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::FetchError;
use crate::tree::LoadTicket;

/// Something that can GET a URL and decode its JSON body.
///
/// Non-2xx answers must be reported as [`FetchError::Status`].
pub trait JsonSource {
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> impl Future<Output = Result<T, FetchError>>;
}

/// Runs the request behind a load ticket.
pub async fn fetch_node<S: JsonSource>(source: &S, ticket: &LoadTicket) -> Result<PrefixNode, FetchError> {
    debug!(url = %ticket.url, container = %ticket.container, "fetching prefix node");
    let result = source.get_json::<PrefixNode>(&ticket.url).await;
    if let Err(err) = &result {
        error!(%err, "failed to fetch prefix tree data");
    }
    result
}

pub async fn fetch_overlay<S: JsonSource>(source: &S, url: &str) -> Result<OverlayPayload, FetchError> {
    debug!(%url, "fetching overlay regions");
    let result = source.get_json::<OverlayPayload>(url).await;
    if let Err(err) = &result {
        error!(%err, "error fetching data");
    }
    result
}
