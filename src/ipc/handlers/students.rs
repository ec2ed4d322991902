use super::{db_conn, required_str, store_err};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, DeleteOutcome};
use serde_json::json;

/// Typed confirmation token for the one destructive operation.
const DELETE_CONFIRMATION: &str = "ELIMINAR";

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match store::list_subjects(conn) {
        Ok(students) => ok(&req.id, json!({ "students": students })),
        Err(e) => store_err(req, e),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let raw_name = match required_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let confirm_duplicate = req
        .params
        .get("confirmDuplicate")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let name = store::normalize_display(&raw_name);
    if name.is_empty() {
        return err(&req.id, "bad_params", "name must not be empty", None);
    }
    if name.split_whitespace().count() < 2 {
        return err(
            &req.id,
            "full_name_required",
            "name must include first and last name",
            None,
        );
    }

    // Duplicates warn, they are not hard-blocked: the caller re-sends with
    // confirmDuplicate=true after an explicit confirmation.
    match store::student_exists_ci(conn, &name) {
        Ok(true) if !confirm_duplicate => {
            return err(
                &req.id,
                "duplicate_name",
                "a student with this name already exists",
                Some(json!({ "name": store::normalize_key(&name) })),
            );
        }
        Ok(_) => {}
        Err(e) => return store_err(req, e),
    }

    match store::insert_student(conn, &name) {
        Ok(id) => ok(&req.id, json!({ "id": id, "name": name })),
        Err(e) => store_err(req, e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let Some(student_id) = req.params.get("studentId").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    let delete_moods = req
        .params
        .get("deleteMoods")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    let confirm = match required_str(req, "confirm") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if confirm.trim().to_uppercase() != DELETE_CONFIRMATION {
        return err(
            &req.id,
            "bad_confirmation",
            format!("type {} to confirm deletion", DELETE_CONFIRMATION),
            None,
        );
    }

    match store::delete_student(conn, student_id, delete_moods) {
        Ok(DeleteOutcome::Cascaded { moods_deleted }) => ok(
            &req.id,
            json!({ "deleted": true, "moodsDeleted": moods_deleted }),
        ),
        Ok(DeleteOutcome::Orphaned { moods_orphaned }) => ok(
            &req.id,
            json!({ "deleted": true, "moodsOrphaned": moods_orphaned }),
        ),
        Err(e) => store_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_list(state, req)),
        "students.create" => Some(handle_create(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
