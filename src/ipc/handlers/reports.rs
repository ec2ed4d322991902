use super::{db_conn, store_err};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::report;
use serde_json::json;

fn handle_monthly(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let Some(year) = req.params.get("year").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing year", None);
    };
    let Some(month) = req.params.get("month").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing month", None);
    };
    if !(1..=12).contains(&month) {
        return err(
            &req.id,
            "bad_params",
            "month must be between 1 and 12",
            Some(json!({ "month": month })),
        );
    }
    // No truncating cast: an oversized year must not alias to a valid one.
    let Ok(year) = i32::try_from(year) else {
        return err(
            &req.id,
            "bad_params",
            "year is out of range",
            Some(json!({ "year": year })),
        );
    };

    match report::monthly_rollup(conn, year, month as u32) {
        Ok(model) => ok(&req.id, json!({ "report": model })),
        Err(e) => store_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "report.monthly" => Some(handle_monthly(state, req)),
        _ => None,
    }
}
