use super::{db_conn, required_str, store_err};
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "name": "moodclassd",
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match db::open_db(&path) {
        Ok(conn) => {
            state.workspace = Some(path.clone());
            state.db = Some(conn);
            ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

fn handle_panel_unlock(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let pin = match required_str(req, "pin") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let stored = match store::teacher_pin(conn) {
        Ok(v) => v,
        Err(e) => return store_err(req, e),
    };
    if pin != stored {
        return err(&req.id, "bad_pin", "incorrect teacher PIN", None);
    }
    ok(&req.id, json!({ "granted": true }))
}

fn handle_panel_set_pin(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let pin = match required_str(req, "pin") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let new_pin = match required_str(req, "newPin") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if new_pin.trim().is_empty() {
        return err(&req.id, "bad_params", "newPin must not be empty", None);
    }
    let stored = match store::teacher_pin(conn) {
        Ok(v) => v,
        Err(e) => return store_err(req, e),
    };
    if pin != stored {
        return err(&req.id, "bad_pin", "incorrect teacher PIN", None);
    }
    if let Err(e) = store::set_teacher_pin(conn, new_pin.trim()) {
        return store_err(req, e);
    }
    ok(&req.id, json!({ "updated": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "panel.unlock" => Some(handle_panel_unlock(state, req)),
        "panel.set_pin" => Some(handle_panel_set_pin(state, req)),
        _ => None,
    }
}
