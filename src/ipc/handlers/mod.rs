pub mod backup_exchange;
pub mod core;
pub mod dashboard;
pub mod moods;
pub mod reports;
pub mod students;

use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::store::StoreError;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::json;

pub(crate) fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// Day params must be canonical ISO dates. Day views match by string
/// equality and ranges compare lexicographically, so a stored
/// "2026-3-2" would never be seen again by any query.
pub(crate) fn required_day(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    let day = required_str(req, key)?;
    let canonical = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok();
    if canonical.as_deref() != Some(day.as_str()) {
        return Err(err(
            &req.id,
            "bad_params",
            format!("{} must be an ISO date (YYYY-MM-DD)", key),
            Some(json!({ key: day })),
        ));
    }
    Ok(day)
}

pub(crate) fn db_conn<'a>(
    state: &'a AppState,
    req: &Request,
) -> Result<&'a Connection, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub(crate) fn store_err(req: &Request, e: StoreError) -> serde_json::Value {
    err(&req.id, &e.code, e.message, e.details)
}
