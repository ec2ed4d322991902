//! Record store: the two-table SQLite schema behind the check-in tool.
//! Day views read newest-first for review; range views read oldest-first so
//! trend series come out chronological.

use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

/// Moment vocabulary, as submitted by the check-in form.
pub const ENTRY_MOMENT: &str = "entrada";
pub const EXIT_MOMENT: &str = "salida";

#[derive(Debug, Clone, Serialize)]
pub struct StoreError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl StoreError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::new("db_query_failed", e.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodRow {
    pub id: i64,
    pub created_at: String,
    pub day: String,
    pub moment: String,
    pub is_anonymous: bool,
    pub student_id: Option<i64>,
    pub student_name: Option<String>,
    pub emotion: String,
    pub reason: String,
    pub note: String,
}

impl MoodRow {
    /// Display identity for tables and exports.
    pub fn display_student(&self) -> &str {
        if self.is_anonymous {
            "Anónimo"
        } else {
            self.student_name.as_deref().unwrap_or("—")
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewMood {
    pub created_at: String,
    pub day: String,
    pub moment: String,
    pub is_anonymous: bool,
    pub student_id: Option<i64>,
    pub emotion: String,
    pub reason: String,
    pub note: String,
}

#[derive(Debug, Clone, Copy)]
pub enum DeleteOutcome {
    Cascaded { moods_deleted: usize },
    Orphaned { moods_orphaned: usize },
}

const MOOD_SELECT: &str = "SELECT m.id, m.created_at, m.day, m.moment, m.is_anonymous,
        m.student_id, s.name, m.emotion, m.reason, m.note
 FROM moods m
 LEFT JOIN students s ON s.id = m.student_id";

fn mood_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<MoodRow> {
    Ok(MoodRow {
        id: r.get(0)?,
        created_at: r.get(1)?,
        day: r.get(2)?,
        moment: r.get(3)?,
        is_anonymous: r.get::<_, i64>(4)? != 0,
        student_id: r.get(5)?,
        student_name: r.get(6)?,
        emotion: r.get(7)?,
        reason: r.get(8)?,
        note: r.get(9)?,
    })
}

pub fn insert_mood(conn: &Connection, mood: &NewMood) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO moods(created_at, day, moment, is_anonymous, student_id, emotion, reason, note)
         VALUES (?,?,?,?,?,?,?,?)",
        (
            &mood.created_at,
            &mood.day,
            &mood.moment,
            mood.is_anonymous as i64,
            mood.student_id,
            &mood.emotion,
            &mood.reason,
            &mood.note,
        ),
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn moods_for_day(conn: &Connection, day: &str) -> Result<Vec<MoodRow>, StoreError> {
    let sql = format!("{} WHERE m.day = ? ORDER BY m.created_at DESC, m.id DESC", MOOD_SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([day], mood_from_row)
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;
    Ok(rows)
}

pub fn moods_for_range(
    conn: &Connection,
    start_day: &str,
    end_day: &str,
) -> Result<Vec<MoodRow>, StoreError> {
    let sql = format!(
        "{} WHERE m.day >= ? AND m.day <= ? ORDER BY m.created_at ASC, m.id ASC",
        MOOD_SELECT
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([start_day, end_day], mood_from_row)
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;
    Ok(rows)
}

pub fn all_moods(conn: &Connection) -> Result<Vec<MoodRow>, StoreError> {
    let sql = format!("{} ORDER BY m.created_at DESC, m.id DESC", MOOD_SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], mood_from_row)
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;
    Ok(rows)
}

/// A subject's own history, oldest first; anonymous rows never join here.
pub fn moods_for_student(conn: &Connection, student_id: i64) -> Result<Vec<MoodRow>, StoreError> {
    let sql = format!(
        "{} WHERE m.student_id = ? AND m.is_anonymous = 0 ORDER BY m.created_at ASC, m.id ASC",
        MOOD_SELECT
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([student_id], mood_from_row)
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;
    Ok(rows)
}

/// Collapses internal whitespace, preserving the submitted casing.
pub fn normalize_display(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased display form; the case-insensitive duplicate key.
pub fn normalize_key(name: &str) -> String {
    normalize_display(name).to_lowercase()
}

pub fn insert_student(conn: &Connection, display_name: &str) -> Result<i64, StoreError> {
    conn.execute("INSERT INTO students(name) VALUES (?)", [display_name])?;
    Ok(conn.last_insert_rowid())
}

pub fn student_exists_ci(conn: &Connection, name: &str) -> Result<bool, StoreError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM students WHERE lower(trim(name)) = ? LIMIT 1",
            [normalize_key(name)],
            |r| r.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn student_name(conn: &Connection, student_id: i64) -> Result<Option<String>, StoreError> {
    let name = conn
        .query_row("SELECT name FROM students WHERE id = ?", [student_id], |r| {
            r.get::<_, String>(0)
        })
        .optional()?;
    Ok(name)
}

pub fn list_subjects(conn: &Connection) -> Result<Vec<SubjectRow>, StoreError> {
    let mut stmt = conn.prepare("SELECT id, name FROM students ORDER BY name, id")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(SubjectRow {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;
    Ok(rows)
}

/// Deletes a subject in one transaction. `cascade` removes their records;
/// otherwise the records stay, orphaned as anonymous.
pub fn delete_student(
    conn: &Connection,
    student_id: i64,
    cascade: bool,
) -> Result<DeleteOutcome, StoreError> {
    let tx = conn.unchecked_transaction()?;

    let outcome = if cascade {
        let n = tx.execute("DELETE FROM moods WHERE student_id = ?", [student_id])?;
        DeleteOutcome::Cascaded { moods_deleted: n }
    } else {
        let n = tx.execute(
            "UPDATE moods SET student_id = NULL, is_anonymous = 1 WHERE student_id = ?",
            [student_id],
        )?;
        DeleteOutcome::Orphaned { moods_orphaned: n }
    };

    let removed = tx.execute("DELETE FROM students WHERE id = ?", [student_id])?;
    if removed == 0 {
        return Err(StoreError::new("not_found", "student not found"));
    }
    tx.commit()?;
    Ok(outcome)
}

pub fn teacher_pin(conn: &Connection) -> Result<String, StoreError> {
    let pin = conn
        .query_row(
            "SELECT value FROM settings WHERE key = 'teacher_pin'",
            [],
            |r| r.get::<_, String>(0),
        )
        .optional()?;
    Ok(pin.unwrap_or_else(|| crate::db::DEFAULT_TEACHER_PIN.to_string()))
}

pub fn set_teacher_pin(conn: &Connection, pin: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('teacher_pin', ?1)
         ON CONFLICT(key) DO UPDATE SET value = ?1",
        [pin],
    )?;
    Ok(())
}
