//! Pure aggregation over mood records: risk classification, frequency
//! tables, entry/exit deltas and the toolkit recommendation. No I/O; every
//! function is deterministic in its input collection, and empty input is a
//! defined state, never an error.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::store::MoodRow;
use crate::taxonomy::{self, label_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    NoData,
    Balanced,
    Loaded,
    AtRisk,
}

impl RiskStatus {
    /// Badge text shown on the teacher panel.
    pub fn badge(self) -> &'static str {
        match self {
            RiskStatus::NoData => "Aula sin datos (aún)",
            RiskStatus::Balanced => "Aula equilibrada",
            RiskStatus::Loaded => "Aula cargada",
            RiskStatus::AtRisk => "Aula en riesgo emocional",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub status: RiskStatus,
    pub label: &'static str,
    pub charged_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionCount {
    pub emotion: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentDelta {
    pub emotion: String,
    pub entry_count: i64,
    pub exit_count: i64,
    pub delta: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub top_label: Option<String>,
    pub tools: Vec<String>,
}

/// Thresholds are inclusive lower bounds, evaluated high to low: exactly
/// 55.0 is AtRisk and exactly 35.0 is Loaded.
pub fn status_for_percent(charged_percent: f64) -> RiskStatus {
    if charged_percent >= 55.0 {
        RiskStatus::AtRisk
    } else if charged_percent >= 35.0 {
        RiskStatus::Loaded
    } else {
        RiskStatus::Balanced
    }
}

pub fn charged_percent(records: &[MoodRow]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let charged = records
        .iter()
        .filter(|r| taxonomy::is_charged_label(label_of(&r.emotion)))
        .count();
    100.0 * charged as f64 / records.len() as f64
}

/// Traffic light for one moment of one day (typically entry records).
pub fn classify_risk(records: &[MoodRow]) -> RiskSummary {
    if records.is_empty() {
        return RiskSummary {
            status: RiskStatus::NoData,
            label: RiskStatus::NoData.badge(),
            charged_percent: 0.0,
        };
    }
    let pct = charged_percent(records);
    let status = status_for_percent(pct);
    RiskSummary {
        status,
        label: status.badge(),
        charged_percent: pct,
    }
}

/// Most frequent de-iconified label. Ties go to the lowest taxonomy rank;
/// unknown labels rank after the catalogue and tie lexically.
pub fn most_frequent_label(records: &[MoodRow]) -> Option<String> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for r in records {
        *counts.entry(label_of(&r.emotion)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .min_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| taxonomy::label_rank(a.0).cmp(&taxonomy::label_rank(b.0)))
                .then_with(|| a.0.cmp(b.0))
        })
        .map(|(label, _)| label.to_string())
}

/// Suggested coping tools for the day's dominant entry emotion. Empty input
/// is the explicit insufficient-data state: no label, no tools.
pub fn recommend_tool(records: &[MoodRow]) -> Recommendation {
    let Some(top) = most_frequent_label(records) else {
        return Recommendation {
            top_label: None,
            tools: Vec::new(),
        };
    };
    let tools = taxonomy::tools_for_label(&top)
        .iter()
        .map(|t| t.to_string())
        .collect();
    Recommendation {
        top_label: Some(top),
        tools,
    }
}

/// Frequency table over the raw stored emotion values (icon kept), count
/// descending, ties ascending lexically, truncated to `n`.
pub fn top_n(records: &[MoodRow], n: usize) -> Vec<EmotionCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for r in records {
        *counts.entry(r.emotion.as_str()).or_insert(0) += 1;
    }
    let mut out: Vec<EmotionCount> = counts
        .into_iter()
        .map(|(emotion, count)| EmotionCount {
            emotion: emotion.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.emotion.cmp(&b.emotion)));
    out.truncate(n);
    out
}

/// Entry-vs-exit comparison over the union of raw emotion values, sorted
/// ascending lexically. An emotion absent from one side counts 0 there.
pub fn compare_moments(entry: &[MoodRow], exit: &[MoodRow]) -> Vec<MomentDelta> {
    let mut table: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for r in entry {
        table.entry(r.emotion.as_str()).or_insert((0, 0)).0 += 1;
    }
    for r in exit {
        table.entry(r.emotion.as_str()).or_insert((0, 0)).1 += 1;
    }
    table
        .into_iter()
        .map(|(emotion, (e, s))| MomentDelta {
            emotion: emotion.to_string(),
            entry_count: e,
            exit_count: s,
            delta: s - e,
        })
        .collect()
}

const ALERT_LABELS: [&str; 3] = ["Ansioso", "Triste", "Molesto"];

/// Soft alert over a subject's chronologically ordered labels: fires iff
/// the last 3 exist, are all equal, and the label is in the trigger set.
/// Not a diagnosis; re-evaluated fresh on every call.
pub fn soft_alert(labels: &[String]) -> Option<String> {
    if labels.len() < 3 {
        return None;
    }
    let last3 = &labels[labels.len() - 3..];
    if last3[1] != last3[0] || last3[2] != last3[0] {
        return None;
    }
    if ALERT_LABELS.contains(&last3[0].as_str()) {
        Some(last3[0].clone())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(emotion: &str, moment: &str) -> MoodRow {
        MoodRow {
            id: 0,
            created_at: "2026-03-02T08:00:00".to_string(),
            day: "2026-03-02".to_string(),
            moment: moment.to_string(),
            is_anonymous: true,
            student_id: None,
            student_name: None,
            emotion: emotion.to_string(),
            reason: String::new(),
            note: String::new(),
        }
    }

    fn entries(labels: &[&str]) -> Vec<MoodRow> {
        labels.iter().map(|l| row(l, "entrada")).collect()
    }

    #[test]
    fn status_boundaries_belong_to_higher_severity() {
        assert_eq!(status_for_percent(55.0), RiskStatus::AtRisk);
        assert_eq!(status_for_percent(54.999), RiskStatus::Loaded);
        assert_eq!(status_for_percent(35.0), RiskStatus::Loaded);
        assert_eq!(status_for_percent(34.999), RiskStatus::Balanced);
        assert_eq!(status_for_percent(0.0), RiskStatus::Balanced);
        assert_eq!(status_for_percent(100.0), RiskStatus::AtRisk);
    }

    #[test]
    fn classify_risk_empty_is_no_data() {
        let s = classify_risk(&[]);
        assert_eq!(s.status, RiskStatus::NoData);
        assert_eq!(s.charged_percent, 0.0);
        assert_eq!(s.label, "Aula sin datos (aún)");
    }

    #[test]
    fn classify_risk_reference_scenario() {
        // 3 charged of 5 => 60% => at risk; top label Molesto.
        let recs = entries(&[
            "\u{1F621} Molesto",
            "\u{1F621} Molesto",
            "\u{1F622} Triste",
            "\u{1F603} Feliz",
            "\u{1F610} Normal",
        ]);
        let s = classify_risk(&recs);
        assert_eq!(s.status, RiskStatus::AtRisk);
        assert!((s.charged_percent - 60.0).abs() < 1e-9);

        let rec = recommend_tool(&recs);
        assert_eq!(rec.top_label.as_deref(), Some("Molesto"));
        assert_eq!(rec.tools.len(), 3);
    }

    #[test]
    fn classify_risk_works_on_bare_labels() {
        let recs = entries(&["Molesto", "Feliz"]);
        let s = classify_risk(&recs);
        assert!((s.charged_percent - 50.0).abs() < 1e-9);
        assert_eq!(s.status, RiskStatus::Loaded);
    }

    #[test]
    fn recommend_tool_empty_signals_insufficient_data() {
        let rec = recommend_tool(&[]);
        assert!(rec.top_label.is_none());
        assert!(rec.tools.is_empty());
    }

    #[test]
    fn recommend_tool_unknown_label_falls_back() {
        let recs = entries(&["Contento", "Contento"]);
        let rec = recommend_tool(&recs);
        assert_eq!(rec.top_label.as_deref(), Some("Contento"));
        assert_eq!(rec.tools, vec!["Respira 3 veces lento (30s).".to_string()]);
    }

    #[test]
    fn most_frequent_tie_goes_to_taxonomy_order() {
        // Feliz (rank 1) beats Triste (rank 5) on a 2-2 tie.
        let recs = entries(&["\u{1F622} Triste", "\u{1F603} Feliz", "\u{1F622} Triste", "\u{1F603} Feliz"]);
        assert_eq!(most_frequent_label(&recs).as_deref(), Some("Feliz"));
    }

    #[test]
    fn top_n_sorted_desc_then_lexical_and_truncated() {
        let recs = entries(&["B", "A", "A", "C", "B", "D"]);
        let top = top_n(&recs, 3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].emotion, "A");
        assert_eq!(top[0].count, 2);
        assert_eq!(top[1].emotion, "B");
        assert_eq!(top[1].count, 2);
        assert_eq!(top[2].emotion, "C");
        assert_eq!(top[2].count, 1);
        assert!(top_n(&[], 3).is_empty());
    }

    #[test]
    fn compare_moments_covers_union_and_delta_balances() {
        let entry = entries(&["\u{1F603} Feliz", "\u{1F603} Feliz", "\u{1F622} Triste"]);
        let exit: Vec<MoodRow> = ["\u{1F603} Feliz", "\u{1F60A} Tranquilo"]
            .iter()
            .map(|l| row(l, "salida"))
            .collect();

        let table = compare_moments(&entry, &exit);
        assert_eq!(table.len(), 3);
        // Sorted ascending lexically by raw value.
        let emotions: Vec<&str> = table.iter().map(|r| r.emotion.as_str()).collect();
        let mut sorted = emotions.clone();
        sorted.sort();
        assert_eq!(emotions, sorted);

        for r in &table {
            assert_eq!(r.delta, r.exit_count - r.entry_count);
        }
        let delta_sum: i64 = table.iter().map(|r| r.delta).sum();
        assert_eq!(delta_sum, exit.len() as i64 - entry.len() as i64);

        let triste = table.iter().find(|r| r.emotion.contains("Triste")).unwrap();
        assert_eq!(triste.entry_count, 1);
        assert_eq!(triste.exit_count, 0);
        assert_eq!(triste.delta, -1);
    }

    #[test]
    fn soft_alert_rules() {
        let s = |xs: &[&str]| xs.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        assert_eq!(
            soft_alert(&s(&["Ansioso", "Ansioso", "Ansioso"])),
            Some("Ansioso".to_string())
        );
        assert_eq!(soft_alert(&s(&["Ansioso", "Ansioso", "Triste"])), None);
        assert_eq!(soft_alert(&s(&["Feliz", "Feliz", "Feliz"])), None);
        assert_eq!(soft_alert(&s(&["Triste", "Triste"])), None);
        assert_eq!(soft_alert(&[]), None);
        // Only the trailing window counts.
        assert_eq!(
            soft_alert(&s(&["Feliz", "Molesto", "Molesto", "Molesto"])),
            Some("Molesto".to_string())
        );
        assert_eq!(soft_alert(&s(&["Molesto", "Molesto", "Molesto", "Feliz"])), None);
    }
}
