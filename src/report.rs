//! Month-level roll-up feeding the printed report. Produces KPI scalars,
//! the per-day charged series and the top-emotions table; rendering (PDF,
//! charts) is the caller's concern.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::engine::{self, EmotionCount};
use crate::store::{self, MoodRow, StoreError, ENTRY_MOMENT, EXIT_MOMENT};

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChargedPoint {
    pub day: String,
    pub charged_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportModel {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub first_day: String,
    pub last_day: String,
    pub total_records: usize,
    pub entry_count: usize,
    pub exit_count: usize,
    pub daily_charged: Vec<DailyChargedPoint>,
    pub top_emotions: Vec<EmotionCount>,
}

/// Full calendar span of a month, leap-aware.
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// One point per calendar day holding at least one entry record, ascending.
/// Days with no entry records are omitted, not zero-filled.
pub fn daily_charged_series(entry: &[MoodRow]) -> Vec<DailyChargedPoint> {
    let mut out: Vec<DailyChargedPoint> = Vec::new();
    // Backfilled rows can interleave days within created_at order, so group
    // into an ordered map rather than assuming contiguous runs.
    let mut by_day: std::collections::BTreeMap<&str, Vec<&MoodRow>> =
        std::collections::BTreeMap::new();
    for r in entry {
        by_day.entry(r.day.as_str()).or_default().push(r);
    }
    for (day, rows) in by_day {
        let charged = rows
            .iter()
            .filter(|r| crate::taxonomy::is_charged_label(crate::taxonomy::label_of(&r.emotion)))
            .count();
        out.push(DailyChargedPoint {
            day: day.to_string(),
            charged_percent: 100.0 * charged as f64 / rows.len() as f64,
        });
    }
    out
}

pub fn monthly_rollup(
    conn: &Connection,
    year: i32,
    month: u32,
) -> Result<ReportModel, StoreError> {
    let (first, last) = month_range(year, month)
        .ok_or_else(|| StoreError::new("bad_params", "year/month out of range"))?;
    let first_day = first.format("%Y-%m-%d").to_string();
    let last_day = last.format("%Y-%m-%d").to_string();

    let rows = store::moods_for_range(conn, &first_day, &last_day)?;
    let (entry, exit): (Vec<MoodRow>, Vec<MoodRow>) =
        rows.iter().cloned().partition(|r| r.moment == ENTRY_MOMENT);
    let exit: Vec<MoodRow> = exit.into_iter().filter(|r| r.moment == EXIT_MOMENT).collect();

    Ok(ReportModel {
        year,
        month,
        month_name: MONTH_NAMES[(month - 1) as usize],
        first_day,
        last_day,
        total_records: rows.len(),
        entry_count: entry.len(),
        exit_count: exit.len(),
        daily_charged: daily_charged_series(&entry),
        top_emotions: engine::top_n(&entry, 8),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_range_handles_leap_years() {
        let (f, l) = month_range(2024, 2).unwrap();
        assert_eq!(f.to_string(), "2024-02-01");
        assert_eq!(l.to_string(), "2024-02-29");

        let (f, l) = month_range(2023, 2).unwrap();
        assert_eq!(f.to_string(), "2023-02-01");
        assert_eq!(l.to_string(), "2023-02-28");

        let (f, l) = month_range(2026, 12).unwrap();
        assert_eq!(f.to_string(), "2026-12-01");
        assert_eq!(l.to_string(), "2026-12-31");

        assert!(month_range(2026, 13).is_none());
        assert!(month_range(2026, 0).is_none());
    }

    fn entry(day: &str, emotion: &str) -> MoodRow {
        MoodRow {
            id: 0,
            created_at: format!("{}T08:00:00", day),
            day: day.to_string(),
            moment: ENTRY_MOMENT.to_string(),
            is_anonymous: true,
            student_id: None,
            student_name: None,
            emotion: emotion.to_string(),
            reason: String::new(),
            note: String::new(),
        }
    }

    #[test]
    fn daily_series_omits_days_without_entries() {
        let rows = vec![
            entry("2026-03-02", "\u{1F621} Molesto"),
            entry("2026-03-02", "\u{1F603} Feliz"),
            // 2026-03-03 has no records at all.
            entry("2026-03-04", "\u{1F603} Feliz"),
        ];
        let series = daily_charged_series(&rows);
        assert_eq!(
            series,
            vec![
                DailyChargedPoint {
                    day: "2026-03-02".into(),
                    charged_percent: 50.0
                },
                DailyChargedPoint {
                    day: "2026-03-04".into(),
                    charged_percent: 0.0
                },
            ]
        );
    }
}
