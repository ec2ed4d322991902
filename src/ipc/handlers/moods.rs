use super::{db_conn, required_day, required_str, store_err};
use crate::export;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, NewMood, ENTRY_MOMENT, EXIT_MOMENT};
use chrono::Local;
use serde_json::json;
use std::path::PathBuf;

const MAX_NOTE_CHARS: usize = 180;

fn handle_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let day = match required_day(req, "day") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let moment = match required_str(req, "moment") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if moment != ENTRY_MOMENT && moment != EXIT_MOMENT {
        return err(
            &req.id,
            "bad_params",
            format!("moment must be {} or {}", ENTRY_MOMENT, EXIT_MOMENT),
            Some(json!({ "moment": moment })),
        );
    }
    let emotion = match required_str(req, "emotion") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if emotion.trim().is_empty() {
        return err(&req.id, "bad_params", "select an emotion first", None);
    }

    let is_anonymous = req
        .params
        .get("isAnonymous")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let student_id = req.params.get("studentId").and_then(|v| v.as_i64());

    // The identity invariant holds in both directions.
    if is_anonymous && student_id.is_some() {
        return err(
            &req.id,
            "bad_params",
            "anonymous records must not carry a studentId",
            None,
        );
    }
    if !is_anonymous {
        let Some(sid) = student_id else {
            return err(
                &req.id,
                "bad_params",
                "pick a student or submit anonymously",
                None,
            );
        };
        match store::student_name(conn, sid) {
            Ok(Some(_)) => {}
            Ok(None) => return err(&req.id, "not_found", "student not found", None),
            Err(e) => return store_err(req, e),
        }
    }

    let reason = req
        .params
        .get("reason")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let note = req
        .params
        .get("note")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    if note.chars().count() > MAX_NOTE_CHARS {
        return err(
            &req.id,
            "bad_params",
            format!("note must be at most {} characters", MAX_NOTE_CHARS),
            None,
        );
    }

    let mood = NewMood {
        created_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        day,
        moment,
        is_anonymous,
        student_id,
        emotion,
        reason,
        note,
    };
    match store::insert_mood(conn, &mood) {
        Ok(id) => ok(&req.id, json!({ "id": id, "createdAt": mood.created_at })),
        Err(e) => store_err(req, e),
    }
}

fn handle_day(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let day = match required_day(req, "day") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store::moods_for_day(conn, &day) {
        Ok(rows) => {
            let moods: Vec<serde_json::Value> = rows.iter().map(mood_json).collect();
            ok(&req.id, json!({ "day": day, "moods": moods }))
        }
        Err(e) => store_err(req, e),
    }
}

fn handle_range(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let start = match required_day(req, "startDay") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let end = match required_day(req, "endDay") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store::moods_for_range(conn, &start, &end) {
        Ok(rows) => {
            let moods: Vec<serde_json::Value> = rows.iter().map(mood_json).collect();
            ok(&req.id, json!({ "moods": moods }))
        }
        Err(e) => store_err(req, e),
    }
}

fn handle_all(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match store::all_moods(conn) {
        Ok(rows) => {
            let moods: Vec<serde_json::Value> = rows.iter().map(mood_json).collect();
            ok(&req.id, json!({ "moods": moods }))
        }
        Err(e) => store_err(req, e),
    }
}

fn handle_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let day = match required_day(req, "day") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let path = match required_str(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };
    match export::write_day_csv(conn, &day, &path) {
        Ok(rows) => ok(
            &req.id,
            json!({ "path": path.to_string_lossy(), "rows": rows }),
        ),
        Err(e) => err(&req.id, "io_failed", format!("{e:#}"), None),
    }
}

fn mood_json(row: &store::MoodRow) -> serde_json::Value {
    json!({
        "id": row.id,
        "createdAt": row.created_at,
        "day": row.day,
        "moment": row.moment,
        "isAnonymous": row.is_anonymous,
        "studentId": row.student_id,
        "estudiante": row.display_student(),
        "emotion": row.emotion,
        "reason": row.reason,
        "note": row.note,
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "moods.submit" => Some(handle_submit(state, req)),
        "moods.day" => Some(handle_day(state, req)),
        "moods.range" => Some(handle_range(state, req)),
        "moods.all" => Some(handle_all(state, req)),
        "moods.export_csv" => Some(handle_export_csv(state, req)),
        _ => None,
    }
}
