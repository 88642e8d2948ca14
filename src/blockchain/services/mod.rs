// src/blockchain/services/mod.rs
//
// One async function per tool. Each returns the upstream status plus the
// payload the standardizer should see: markdown for section-shaped results,
// reshaped JSON for lists. Non-2xx answers are passed through untouched.

pub mod address;
pub mod analytics;
pub mod boxes;
pub mod network;
pub mod token;
pub mod transaction;

use serde_json::Value;

use crate::blockchain::client::UpstreamResponse;

/// JSON body of a successful response, or `None` when it should be passed through.
pub(crate) fn success_json(response: &UpstreamResponse) -> Option<&Value> {
    if response.is_success() {
        response.json()
    } else {
        None
    }
}
