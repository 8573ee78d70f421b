//! Signed OAuth state codec
//!
//! The `state` query parameter carried through a provider redirect is a
//! tamper-evident token: `base64url(json payload) . base64url(hmac-sha256)`.
//! The payload records who initiated the flow and where to land afterwards;
//! the signature binds it to the server secret so a forged or altered token
//! is rejected before any provider call is made.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use schedlink_domain::{Result, SchedlinkError};

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a state token, in milliseconds
pub const MAX_STATE_AGE_MS: i64 = 30 * 60 * 1000;

/// Payload carried inside a signed state token
///
/// `ts` is issuance time in epoch milliseconds. Decoding tolerates the
/// camelCase spellings (`employeeId`, `returnTo`) emitted by older clients,
/// and legacy tokens that carry no `ts`/`nonce` at all; encoding always
/// produces the snake_case form with both fields set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatePayload {
    #[serde(alias = "employeeId")]
    pub employee_id: String,
    #[serde(default, alias = "returnTo")]
    pub return_to: String,
    #[serde(default)]
    pub ts: Option<i64>,
    #[serde(default)]
    pub nonce: String,
}

impl StatePayload {
    /// Build a fresh payload stamped with the current time and a random nonce
    pub fn new(employee_id: impl Into<String>, return_to: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            return_to: return_to.into(),
            ts: Some(Utc::now().timestamp_millis()),
            nonce: random_nonce(),
        }
    }
}

fn random_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn mac_for(secret: &str, data: &[u8]) -> Result<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| SchedlinkError::Internal(format!("HMAC key setup failed: {e}")))?;
    mac.update(data);
    Ok(mac)
}

/// Sign a payload into a URL-safe state token
pub fn sign_state(payload: &StatePayload, secret: &str) -> Result<String> {
    let json = serde_json::to_vec(payload)
        .map_err(|e| SchedlinkError::Internal(format!("state serialization failed: {e}")))?;
    let body = URL_SAFE_NO_PAD.encode(&json);
    let sig = mac_for(secret, body.as_bytes())?.finalize().into_bytes();
    Ok(format!("{body}.{}", URL_SAFE_NO_PAD.encode(sig)))
}

/// Verify a state token and return its payload
///
/// Rejects malformed tokens, bad signatures (constant-time comparison),
/// blank employee ids, and payloads whose issuance time is more than
/// [`MAX_STATE_AGE_MS`] away from now in either direction. Payloads without
/// a `ts` field skip the age check; `employee_id`/`return_to` come back
/// trimmed.
pub fn verify_state(token: &str, secret: &str) -> Result<StatePayload> {
    verify_state_at(token, secret, Utc::now().timestamp_millis())
}

fn verify_state_at(token: &str, secret: &str, now_ms: i64) -> Result<StatePayload> {
    let (body, sig_b64) = token
        .split_once('.')
        .ok_or_else(|| SchedlinkError::InvalidState("malformed token".to_string()))?;

    let sig = URL_SAFE_NO_PAD
        .decode(sig_b64)
        .map_err(|_| SchedlinkError::InvalidState("malformed signature".to_string()))?;
    mac_for(secret, body.as_bytes())?
        .verify_slice(&sig)
        .map_err(|_| SchedlinkError::InvalidState("signature mismatch".to_string()))?;

    let json = URL_SAFE_NO_PAD
        .decode(body)
        .map_err(|_| SchedlinkError::InvalidState("malformed payload".to_string()))?;
    let mut payload: StatePayload = serde_json::from_slice(&json)
        .map_err(|_| SchedlinkError::InvalidState("unreadable payload".to_string()))?;

    payload.employee_id = payload.employee_id.trim().to_string();
    payload.return_to = payload.return_to.trim().to_string();
    if payload.employee_id.is_empty() {
        return Err(SchedlinkError::InvalidState("missing employee id".to_string()));
    }

    if let Some(ts) = payload.ts {
        if (now_ms - ts).abs() > MAX_STATE_AGE_MS {
            return Err(SchedlinkError::InvalidState("token expired".to_string()));
        }
    }

    Ok(payload)
}
