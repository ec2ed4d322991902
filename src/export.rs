//! Day-detail CSV export. Written with a UTF-8 BOM so spreadsheet apps
//! render the accented Spanish labels correctly.

use anyhow::Context;
use rusqlite::Connection;
use std::io::Write;
use std::path::Path;

use crate::store;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes one row per record of the day, newest first (day-view order).
/// Returns the number of data rows written.
pub fn write_day_csv(conn: &Connection, day: &str, path: &Path) -> anyhow::Result<usize> {
    let rows = store::moods_for_day(conn, day)
        .map_err(|e| anyhow::anyhow!("{}: {}", e.code, e.message))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create csv file {}", path.to_string_lossy()))?;
    file.write_all(BOM).context("failed to write BOM")?;

    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(["created_at", "moment", "estudiante", "emotion", "reason", "note"])
        .context("failed to write csv header")?;
    for row in &rows {
        writer
            .write_record([
                row.created_at.as_str(),
                row.moment.as_str(),
                row.display_student(),
                row.emotion.as_str(),
                row.reason.as_str(),
                row.note.as_str(),
            ])
            .context("failed to write csv row")?;
    }
    writer.flush().context("failed to flush csv file")?;
    Ok(rows.len())
}
