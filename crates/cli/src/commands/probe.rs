//! Payload-size probe for the admin catalog endpoint.
//!
//! Creates throwaway pet products whose `images` hold one synthetic `data:`
//! URL, doubling the size each step, until the server rejects one or the
//! maximum is reached. Accepted products are deleted again.
//!
//! ```bash
//! pawcase-cli probe --url http://localhost:5000 --cookie "pawcase_session=..."
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use reqwest::{StatusCode, header};
use serde_json::{Value, json};
use thiserror::Error;

use pawcase_storefront::middleware::session::SESSION_COOKIE_NAME;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("start size must be between 1 and the maximum size")]
    InvalidRange,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("session rejected ({0}); pass an admin session cookie")]
    NotAuthorized(StatusCode),
}

/// Outcome of a probe run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Largest image payload the server accepted, in bytes.
    pub largest_accepted: Option<usize>,
    /// First rejected payload size and the status it got.
    pub first_rejected: Option<(usize, StatusCode)>,
    /// Products that could not be deleted afterwards.
    pub left_behind: Vec<i64>,
}

/// Payload sizes to try: `start`, doubling, capped at `max`.
#[must_use]
pub fn probe_sizes(start: usize, max: usize) -> Vec<usize> {
    let mut sizes = Vec::new();
    let mut size = start;
    while size > 0 && size < max {
        sizes.push(size);
        size = size.saturating_mul(2);
    }
    if start > 0 && start <= max {
        sizes.push(max);
    }
    sizes
}

fn cookie_header(cookie: &str) -> String {
    if cookie.contains('=') {
        cookie.to_owned()
    } else {
        format!("{SESSION_COOKIE_NAME}={cookie}")
    }
}

fn synthetic_image(size: usize) -> String {
    // base64 expands 3 bytes into 4 characters
    let mut raw = vec![0; size / 4 * 3];
    rand::rng().fill_bytes(&mut raw);
    format!("data:image/jpeg;base64,{}", STANDARD.encode(raw))
}

/// Run the probe against `base_url`.
///
/// # Errors
///
/// Returns `ProbeError::NotAuthorized` if the cookie is not an admin session,
/// and `ProbeError::Http` if the server cannot be reached.
pub async fn run(
    base_url: &str,
    cookie: &str,
    start: usize,
    max: usize,
) -> Result<ProbeReport, ProbeError> {
    if start == 0 || start > max {
        return Err(ProbeError::InvalidRange);
    }

    let client = reqwest::Client::new();
    let base_url = base_url.trim_end_matches('/');
    let endpoint = format!("{base_url}/api/admin/pet-products");
    let cookie = cookie_header(cookie);
    let mut report = ProbeReport::default();

    for size in probe_sizes(start, max) {
        let body = json!({
            "name": format!("Payload probe {size}"),
            "category": "probe",
            "key": format!("probe-{size}-{:08x}", rand::random::<u32>()),
            "price": 0,
            "images": [synthetic_image(size)],
        });

        let response = client
            .post(&endpoint)
            .header(header::COOKIE, &cookie)
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(ProbeError::NotAuthorized(status));
        }

        if status.is_success() {
            tracing::info!(size, %status, "Accepted");
            report.largest_accepted = Some(size);

            let created: Value = response.json().await?;
            if let Some(id) = created.get("id").and_then(Value::as_i64) {
                let cleanup = client
                    .delete(format!("{endpoint}/{id}"))
                    .header(header::COOKIE, &cookie)
                    .send()
                    .await?
                    .status();
                if !cleanup.is_success() {
                    tracing::warn!(id, status = %cleanup, "Could not delete probe product");
                    report.left_behind.push(id);
                }
            }
        } else {
            tracing::warn!(size, %status, "Rejected");
            report.first_rejected = Some((size, status));
            break;
        }
    }

    Ok(report)
}
