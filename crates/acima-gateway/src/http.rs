//! Provider transport helpers.
//!
//! Every outbound call goes through [`send`], which folds transport failures
//! and non-2xx replies into one [`ProviderReply`] with a single success
//! predicate. No retries are attempted.

use reqwest::StatusCode;
use url::Url;

use crate::error::GatewayError;
use crate::response::ResponseBody;

/// Media type for versioned Acima REST calls.
pub(crate) const ACCEPT_ACIMA_V2: &str = "application/vnd.acima-v2+json";

/// Header carrying the static merchant API key.
pub(crate) const API_TOKEN_HEADER: &str = "API-Token";

/// Key under which an unparseable failure body is preserved.
pub const RAW_BODY_KEY: &str = "raw";

/// Append `segments` to the path of `base`, one path segment each.
///
/// Segments are percent-encoded, so an id containing `?`, `#` or `/` stays
/// inside its own segment. Empty, `.` and `..` segments are rejected because
/// they would address a different resource.
pub(crate) fn endpoint_url(
    base: &str,
    segments: &[&str],
    endpoint: &str,
) -> Result<Url, GatewayError> {
    let invalid = |reason: String| GatewayError::InvalidRequest {
        endpoint: endpoint.to_string(),
        reason,
    };

    if let Some(bad) = segments
        .iter()
        .find(|s| s.is_empty() || **s == "." || **s == "..")
    {
        return Err(invalid(format!("path segment {bad:?} is not allowed")));
    }

    let mut url = Url::parse(base).map_err(|e| invalid(format!("base URL {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| invalid(format!("base URL {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Outcome of one provider call.
#[derive(Debug)]
pub(crate) struct ProviderReply {
    /// `None` when the request failed before a status line arrived.
    pub status: Option<StatusCode>,
    pub text: String,
}

impl ProviderReply {
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|s| s.is_success())
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status.map(|s| s.as_u16())
    }

    /// Interpret the reply text as a JSON object.
    ///
    /// Empty text yields an empty map. Text that is not a JSON object is a
    /// hard error on a successful reply and is kept verbatim under
    /// [`RAW_BODY_KEY`] on a failed one.
    pub fn body(&self, endpoint: &str) -> Result<ResponseBody, GatewayError> {
        match self.parse_object() {
            Ok(map) => Ok(map),
            Err(reason) if self.is_success() => Err(GatewayError::MalformedResponse {
                endpoint: endpoint.to_string(),
                reason,
            }),
            Err(_) => Ok(self.raw_body()),
        }
    }

    /// Like [`body`](Self::body), but never fails: text that is not a JSON
    /// object is kept under [`RAW_BODY_KEY`] whatever the status.
    ///
    /// Used where the provider has already acted on a 2xx reply and
    /// discarding the outcome would hide a completed state change.
    pub fn body_or_raw(&self, endpoint: &str) -> ResponseBody {
        self.parse_object().unwrap_or_else(|reason| {
            tracing::warn!(endpoint, %reason, "keeping non-JSON Acima body as raw text");
            self.raw_body()
        })
    }

    fn parse_object(&self) -> Result<ResponseBody, String> {
        if self.text.trim().is_empty() {
            return Ok(ResponseBody::new());
        }
        match serde_json::from_str::<serde_json::Value>(&self.text) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => Err("expected a JSON object".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn raw_body(&self) -> ResponseBody {
        let mut map = ResponseBody::new();
        map.insert(
            RAW_BODY_KEY.to_string(),
            serde_json::Value::String(self.text.clone()),
        );
        map
    }
}

/// Send a request and capture its outcome.
pub(crate) async fn send(request: reqwest::RequestBuilder, endpoint: &str) -> ProviderReply {
    tracing::debug!(endpoint, "calling Acima");
    match request.send().await {
        Ok(resp) => {
            let status = resp.status();
            let text = match resp.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(endpoint, %status, "failed to read Acima response body: {e}");
                    String::new()
                }
            };
            if !status.is_success() {
                tracing::warn!(endpoint, %status, "Acima returned a non-success status");
            }
            ProviderReply {
                status: Some(status),
                text,
            }
        }
        Err(e) => {
            tracing::warn!(endpoint, timeout = e.is_timeout(), "Acima request failed: {e}");
            ProviderReply {
                status: None,
                text: e.to_string(),
            }
        }
    }
}
