use super::{db_conn, required_day, store_err};
use crate::engine;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, MoodRow, ENTRY_MOMENT, EXIT_MOMENT};
use crate::taxonomy::{self, Emotion, EMOTIONS, REASONS};
use serde_json::json;

fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let day = match required_day(req, "day") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let rows = match store::moods_for_day(conn, &day) {
        Ok(v) => v,
        Err(e) => return store_err(req, e),
    };
    let entry: Vec<MoodRow> = rows
        .iter()
        .filter(|r| r.moment == ENTRY_MOMENT)
        .cloned()
        .collect();
    let exit: Vec<MoodRow> = rows
        .iter()
        .filter(|r| r.moment == EXIT_MOMENT)
        .cloned()
        .collect();

    // Risk and the toolkit recommendation read the entry side only.
    let traffic_light = engine::classify_risk(&entry);
    let recommendation = engine::recommend_tool(&entry);

    ok(
        &req.id,
        json!({
            "day": day,
            "totalRecords": rows.len(),
            "entryCount": entry.len(),
            "exitCount": exit.len(),
            "topEmotion": engine::most_frequent_label(&entry),
            "trafficLight": traffic_light,
            "topEntry": engine::top_n(&entry, 3),
            "topExit": engine::top_n(&exit, 3),
            "comparison": engine::compare_moments(&entry, &exit),
            "toolkit": recommendation,
        }),
    )
}

fn handle_student_history(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let Some(student_id) = req.params.get("studentId").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };

    let name = match store::student_name(conn, student_id) {
        Ok(Some(n)) => n,
        Ok(None) => return err(&req.id, "not_found", "student not found", None),
        Err(e) => return store_err(req, e),
    };
    let rows = match store::moods_for_student(conn, student_id) {
        Ok(v) => v,
        Err(e) => return store_err(req, e),
    };

    let labels: Vec<String> = rows
        .iter()
        .map(|r| taxonomy::label_of(&r.emotion).to_string())
        .collect();
    let alert = engine::soft_alert(&labels);

    let moods: Vec<serde_json::Value> = rows
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "createdAt": r.created_at,
                "day": r.day,
                "moment": r.moment,
                "emotion": r.emotion,
                "reason": r.reason,
                "note": r.note,
            })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "student": { "id": student_id, "name": name },
            "moods": moods,
            "softAlert": {
                "triggered": alert.is_some(),
                "label": alert,
            },
        }),
    )
}

fn handle_catalog(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let emotions: Vec<serde_json::Value> = EMOTIONS
        .iter()
        .map(|e| {
            json!({
                "icon": e.icon(),
                "label": e.label(),
                "charged": e.is_charged(),
                "composite": e.composite(),
            })
        })
        .collect();
    let toolkit: Vec<serde_json::Value> = EMOTIONS
        .iter()
        .map(|e: &Emotion| json!({ "label": e.label(), "tools": e.toolkit() }))
        .collect();

    ok(
        &req.id,
        json!({
            "emotions": emotions,
            "reasons": REASONS,
            "toolkit": toolkit,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.summary" => Some(handle_summary(state, req)),
        "dashboard.student_history" => Some(handle_student_history(state, req)),
        "taxonomy.catalog" => Some(handle_catalog(state, req)),
        _ => None,
    }
}
