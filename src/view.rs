//! Dashboard view model: session gate and the litter log table.

use serde::Serialize;
use tracing::info;

use crate::models::{EnrichedRecord, User};
use crate::session::{SessionError, SessionStore, Storage, UserVerifier};

pub const SIGN_IN_ROUTE: &str = "/signin";
pub const UNKNOWN_LOCATION: &str = "Unknown location";
pub const LOADING_ROWS: usize = 6;

/// What the dashboard should do for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionGate {
    Authenticated(User),
    RedirectToSignIn,
}

/// Restore the cached user and confirm the backend still knows it.
pub async fn check_session<S: Storage>(
    store: &mut SessionStore<S>,
    verifier: &UserVerifier,
) -> Result<SessionGate, SessionError> {
    let Some(user) = store.load()?.cloned() else {
        info!("No cached user; redirecting to {}", SIGN_IN_ROUTE);
        return Ok(SessionGate::RedirectToSignIn);
    };

    if verifier.verify(&user).await {
        Ok(SessionGate::Authenticated(user))
    } else {
        Ok(SessionGate::RedirectToSignIn)
    }
}

/// Drop the cached user; the caller navigates to sign-in.
pub fn sign_out<S: Storage>(store: &mut SessionStore<S>) -> Result<SessionGate, SessionError> {
    store.clear()?;
    info!("Signed out");
    Ok(SessionGate::RedirectToSignIn)
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRow {
    pub id: String,
    pub location: String,
    pub image_url: String,
    pub timestamp: String,
}

impl From<&EnrichedRecord> for LogRow {
    fn from(e: &EnrichedRecord) -> Self {
        Self {
            id: e.record.id.clone(),
            location: e
                .address
                .clone()
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            image_url: e.record.image_url.clone(),
            timestamp: e.display_timestamp.clone(),
        }
    }
}

/// The table is either entirely loading or entirely ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "rows", rename_all = "lowercase")]
pub enum LogTable {
    Loading,
    Ready(Vec<LogRow>),
}

impl LogTable {
    pub fn ready(records: &[EnrichedRecord]) -> Self {
        LogTable::Ready(records.iter().map(LogRow::from).collect())
    }

    /// Plain-text rendering for terminals.
    pub fn render(&self) -> String {
        const HEADERS: [&str; 3] = ["Location", "Image", "Timestamp"];

        let rows: Vec<[String; 3]> = match self {
            LogTable::Loading => (0..LOADING_ROWS)
                .map(|_| ["...".to_string(), "...".to_string(), "...".to_string()])
                .collect(),
            LogTable::Ready(rows) => rows
                .iter()
                .map(|r| [r.location.clone(), r.image_url.clone(), r.timestamp.clone()])
                .collect(),
        };

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |cells: [&str; 3]| -> String {
            cells
                .iter()
                .zip(widths)
                .map(|(c, w)| format!("{:<w$}", c, w = w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = vec![line(HEADERS)];
        out.push(line(widths.map(|w| "-".repeat(w)).each_ref().map(String::as_str)));
        for row in &rows {
            out.push(line(row.each_ref().map(String::as_str)));
        }
        out.join("\n")
    }
}
