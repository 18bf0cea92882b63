use gloo_net::http::Request;
use ipam_view::{FetchError, JsonSource};
use serde::de::DeserializeOwned;
use web_sys::AbortSignal;

/// Same-origin GETs through `fetch`, optionally tied to an abort signal.
#[derive(Default)]
pub struct HttpSource {
    abort: Option<AbortSignal>,
}

impl HttpSource {
    pub fn new(abort: Option<AbortSignal>) -> Self {
        Self { abort }
    }
}

impl JsonSource for HttpSource {
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = Request::get(url)
            .abort_signal(self.abort.as_ref())
            .send()
            .await
            .map_err(|err| FetchError::Network {
                url: url.to_string(),
                message: err.to_string(),
            })?;
        if !response.ok() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }
        response.json::<T>().await.map_err(|err| FetchError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })
    }
}
