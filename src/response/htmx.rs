//! HTMX partial-update protocol adaptation
//!
//! HTMX issues its requests through XHR, so a plain 3xx redirect is followed
//! transparently by the browser and the swapped-in fragment is the redirect
//! target rendered as a partial. To navigate properly the server answers with
//! an `HX-Location` header instead, carrying the target and the swap hints as
//! one JSON object.

use super::core::ActionResponse;
use crate::request::ActionRequest;
use serde_json::{Map, Value};
use tracing::debug;

/// Marker header sent by HTMX on every request it issues
pub const HX_REQUEST: &str = "HX-Request";
/// Client-side redirect with optional swap context (JSON)
pub const HX_LOCATION: &str = "HX-Location";
/// Override the `hx-select` of the triggering element
pub const HX_RESELECT: &str = "HX-Reselect";
/// Override the target element
pub const HX_RETARGET: &str = "HX-Retarget";
/// Override the swap strategy
pub const HX_RESWAP: &str = "HX-Reswap";

const VARY: &str = "Vary";
const LOCATION: &str = "Location";

/// Status `202 Accepted`
pub const STATUS_ACCEPTED: u16 = 202;
/// Status `303 See Other`
pub const STATUS_SEE_OTHER: u16 = 303;
/// Status an adapted redirect is answered with
pub const STATUS_OK: u16 = 200;

/// Hint headers folded into `HX-Location`, with their key in the JSON object
const HINTS: &[(&str, &str)] = &[
    (HX_RESELECT, "select"),
    (HX_RETARGET, "target"),
    (HX_RESWAP, "swap"),
];

/// `true` if the request was issued by HTMX
///
/// HTMX always sends `HX-Request: true`; any other value, empty included, is
/// not the marker.
#[must_use]
pub fn is_htmx_request(request: &ActionRequest) -> bool {
    request
        .header(HX_REQUEST)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Apply the redirect adaptation to a finished response
///
/// - `Location` present and HTMX request: `Location` and the hint headers are
///   packaged into `HX-Location`, the status becomes `200` and
///   `Vary: HX-Request` is added so caches keep both variants apart.
/// - `Location` absent and status `202`: rewritten to `303`, telling the
///   client the accepted work is done and the page should be refetched.
#[must_use]
pub fn adapt(request: &ActionRequest, response: ActionResponse) -> ActionResponse {
    match response.header(LOCATION).map(str::to_string) {
        Some(location) if is_htmx_request(request) => {
            let mut spec = Map::new();
            spec.insert("path".to_string(), Value::String(location.clone()));
            let mut response = response.without_header(LOCATION);
            for (header, key) in HINTS {
                if let Some(value) = response.header(header).map(str::to_string) {
                    spec.insert((*key).to_string(), Value::String(value));
                    response = response.without_header(header);
                }
            }
            debug!(
                location = %location,
                status = response.status(),
                hints = spec.len() - 1,
                "Redirect adapted for HTMX client"
            );
            let vary = merge_vary(response.header(VARY));
            response
                .with_header(HX_LOCATION, Value::Object(spec).to_string())
                .with_header(VARY, vary)
                .with_status(STATUS_OK)
        }
        None if response.status() == STATUS_ACCEPTED => {
            debug!("Accepted response without Location rewritten to 303");
            response.with_status(STATUS_SEE_OTHER)
        }
        _ => response,
    }
}

fn merge_vary(existing: Option<&str>) -> String {
    match existing {
        Some(v)
            if v
                .split(',')
                .any(|part| part.trim().eq_ignore_ascii_case(HX_REQUEST)) =>
        {
            v.to_string()
        }
        Some(v) if !v.trim().is_empty() => format!("{}, {}", v, HX_REQUEST),
        _ => HX_REQUEST.to_string(),
    }
}
