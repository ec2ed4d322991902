use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE: &str = "moodclass.sqlite3";

pub const DEFAULT_TEACHER_PIN: &str = "1234";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS moods(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            day TEXT NOT NULL,
            moment TEXT NOT NULL,
            is_anonymous INTEGER NOT NULL,
            student_id INTEGER,
            emotion TEXT NOT NULL,
            reason TEXT NOT NULL DEFAULT '',
            note TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(student_id) REFERENCES students(id)
        )",
        [],
    )?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_moods_day ON moods(day)", [])?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_moods_student ON moods(student_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_moods_created_at ON moods(created_at)",
        [],
    )?;

    // Databases from the first pilot predate reason/note. Add if needed.
    ensure_moods_reason_note(&conn)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO settings(key, value) VALUES('teacher_pin', ?)",
        [DEFAULT_TEACHER_PIN],
    )?;

    Ok(conn)
}

fn ensure_moods_reason_note(conn: &Connection) -> anyhow::Result<()> {
    if !table_has_column(conn, "moods", "reason")? {
        conn.execute(
            "ALTER TABLE moods ADD COLUMN reason TEXT NOT NULL DEFAULT ''",
            [],
        )?;
    }
    if !table_has_column(conn, "moods", "note")? {
        conn.execute(
            "ALTER TABLE moods ADD COLUMN note TEXT NOT NULL DEFAULT ''",
            [],
        )?;
    }
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
