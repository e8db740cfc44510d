use crate::model::{DisciplineRecord, parse_date};
use chrono::{Datelike, Duration, NaiveDateTime};
use clap::ValueEnum;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const NO_TOP_VIOLATION: &str = "Tiada";
pub const CHART_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Window {
    Today,
    #[value(name = "7days")]
    Last7Days,
    Month,
    #[default]
    All,
}

impl Window {
    /// Label printed on tabular reports and used in their file names.
    pub fn report_label(self) -> &'static str {
        match self {
            Window::Today => "HARIAN",
            Window::Last7Days => "MINGGUAN",
            Window::Month => "BULANAN",
            Window::All => "KESELURUHAN",
        }
    }

    fn admits(self, date: &str, now: NaiveDateTime) -> bool {
        if self == Window::All {
            return true;
        }
        let Some(day) = parse_date(date) else {
            return false;
        };
        match self {
            Window::Today => day == now.date(),
            Window::Last7Days => day
                .and_hms_opt(0, 0, 0)
                .is_some_and(|start| start >= now - Duration::days(7)),
            Window::Month => day.month() == now.month() && day.year() == now.year(),
            Window::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    #[value(name = "name")]
    StudentName,
    #[default]
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewConfig {
    pub search: String,
    pub window: Window,
    pub sort_key: SortKey,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub today: usize,
    pub total: usize,
    pub top_violation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemeritTotal {
    pub student_name: String,
    pub total: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<'a> {
    pub visible: Vec<&'a DisciplineRecord>,
    pub stats: Stats,
    pub chart: Vec<DemeritTotal>,
}

pub fn run<'a>(
    records: &'a [DisciplineRecord],
    view: &ViewConfig,
    now: NaiveDateTime,
) -> QueryResult<'a> {
    let visible = visible_records(records, view, now);
    let chart = demerit_totals(&visible);
    QueryResult {
        stats: stats(records, now),
        visible,
        chart,
    }
}

/// Search, then window, then a stable sort on the chosen key.
pub fn visible_records<'a>(
    records: &'a [DisciplineRecord],
    view: &ViewConfig,
    now: NaiveDateTime,
) -> Vec<&'a DisciplineRecord> {
    let needle = view.search.to_lowercase();
    let mut visible: Vec<&DisciplineRecord> = records
        .iter()
        .filter(|r| needle.is_empty() || r.student_name.to_lowercase().contains(&needle))
        .filter(|r| view.window.admits(&r.date, now))
        .collect();

    visible.sort_by(|a, b| {
        let ord: Ordering = sort_value(a, view.sort_key).cmp(sort_value(b, view.sort_key));
        match view.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    visible
}

fn sort_value(record: &DisciplineRecord, key: SortKey) -> &str {
    match key {
        SortKey::StudentName => &record.student_name,
        SortKey::Date => &record.date,
    }
}

pub fn stats(records: &[DisciplineRecord], now: NaiveDateTime) -> Stats {
    let today = now.date().format("%Y-%m-%d").to_string();
    Stats {
        today: records.iter().filter(|r| r.date == today).count(),
        total: records.len(),
        top_violation: top_violation(records).unwrap_or_else(|| NO_TOP_VIOLATION.to_string()),
    }
}

/// Most frequent violation type; ties go to the type seen first.
pub fn top_violation(records: &[DisciplineRecord]) -> Option<String> {
    let counts = tally(records.iter().map(|r| (r.violation_type.as_str(), 1)));
    let mut best: Option<(&str, i32)> = None;
    for (name, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.to_string())
}

/// Per-student `abs(demerit)` sums, largest first, at most [`CHART_LIMIT`].
pub fn demerit_totals(records: &[&DisciplineRecord]) -> Vec<DemeritTotal> {
    let mut totals = tally(
        records
            .iter()
            .map(|r| (r.student_name.as_str(), r.demerit.abs())),
    );
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.truncate(CHART_LIMIT);
    totals
        .into_iter()
        .map(|(name, total)| DemeritTotal {
            student_name: name.to_string(),
            total,
        })
        .collect()
}

// Sums values per key, keeping first-seen key order.
fn tally<'a>(items: impl Iterator<Item = (&'a str, i32)>) -> Vec<(&'a str, i32)> {
    let mut order: Vec<(&str, i32)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (key, value) in items {
        let found = index.get(key).copied();
        match found {
            Some(i) => order[i].1 += value,
            None => {
                index.insert(key, order.len());
                order.push((key, value));
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use chrono::NaiveDate;

    fn rec(id: &str, name: &str, date: &str, violation: &str, demerit: i32) -> DisciplineRecord {
        DisciplineRecord {
            id: id.to_string(),
            student_name: name.to_string(),
            date: date.to_string(),
            day: String::new(),
            time: "08:00".to_string(),
            student_class: "1 Al-Farabi".to_string(),
            category: Category::Ringan,
            violation_type: violation.to_string(),
            demerit,
            location: "Kelas".to_string(),
            reported_by: "Ustaz Hamdan".to_string(),
            action_taken: "Amaran Lisan".to_string(),
            details: String::new(),
            created_at: 0,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn view(window: Window) -> ViewConfig {
        ViewConfig {
            window,
            ..ViewConfig::default()
        }
    }

    fn ids(records: &[&DisciplineRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn today_window_keeps_only_today() {
        let records = vec![
            rec("a", "Ali", "2024-03-15", "Lewat", -5),
            rec("b", "Abu", "2024-03-14", "Lewat", -5),
        ];
        let visible = visible_records(&records, &view(Window::Today), now());
        assert_eq!(ids(&visible), vec!["a"]);
    }

    #[test]
    fn seven_day_window_uses_instant_cutoff() {
        // cutoff is 2024-03-08 14:30, so midnight of the 8th falls outside
        let records = vec![
            rec("a", "Ali", "2024-03-09", "Lewat", -5),
            rec("b", "Abu", "2024-03-08", "Lewat", -5),
            rec("c", "Ahmad", "2024-02-20", "Lewat", -5),
        ];
        let visible = visible_records(&records, &view(Window::Last7Days), now());
        assert_eq!(ids(&visible), vec!["a"]);
    }

    #[test]
    fn seven_day_cutoff_is_inclusive() {
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records = vec![
            rec("a", "Ali", "2024-03-08", "Lewat", -5),
            rec("b", "Abu", "2024-03-07", "Lewat", -5),
        ];
        let visible = visible_records(&records, &view(Window::Last7Days), midnight);
        assert_eq!(ids(&visible), vec!["a"]);
    }

    #[test]
    fn month_window_matches_month_and_year() {
        let records = vec![
            rec("a", "Ali", "2024-03-01", "Lewat", -5),
            rec("b", "Abu", "2023-03-01", "Lewat", -5),
            rec("c", "Ahmad", "2024-04-01", "Lewat", -5),
        ];
        let visible = visible_records(&records, &view(Window::Month), now());
        assert_eq!(ids(&visible), vec!["a"]);
    }

    #[test]
    fn unparseable_dates_only_survive_all() {
        let records = vec![rec("a", "Ali", "bukan-tarikh", "Lewat", -5)];
        for window in [Window::Today, Window::Last7Days, Window::Month] {
            assert!(visible_records(&records, &view(window), now()).is_empty());
        }
        assert_eq!(visible_records(&records, &view(Window::All), now()).len(), 1);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let records = vec![
            rec("a", "Nur Aisyah", "2024-03-01", "Lewat", -5),
            rec("b", "Siti Khadijah", "2024-03-01", "Lewat", -5),
        ];
        let cfg = ViewConfig {
            search: "AISY".to_string(),
            ..ViewConfig::default()
        };
        assert_eq!(ids(&visible_records(&records, &cfg, now())), vec!["a"]);
    }

    #[test]
    fn date_sort_ascending_is_chronological() {
        let records = vec![
            rec("mar", "A", "2024-03-01", "Lewat", -5),
            rec("jan", "B", "2024-01-10", "Lewat", -5),
            rec("feb", "C", "2024-02-15", "Lewat", -5),
        ];
        let cfg = ViewConfig {
            direction: SortDirection::Asc,
            ..ViewConfig::default()
        };
        assert_eq!(
            ids(&visible_records(&records, &cfg, now())),
            vec!["jan", "feb", "mar"]
        );
    }

    #[test]
    fn sort_keeps_insertion_order_on_ties() {
        let records = vec![
            rec("1", "Zaki", "2024-01-01", "Lewat", -5),
            rec("2", "Ali", "2024-01-01", "Lewat", -5),
            rec("3", "Zaki", "2024-01-02", "Lewat", -5),
        ];
        let desc = ViewConfig {
            sort_key: SortKey::StudentName,
            direction: SortDirection::Desc,
            ..ViewConfig::default()
        };
        assert_eq!(ids(&visible_records(&records, &desc, now())), vec!["1", "3", "2"]);

        let by_date = ViewConfig::default();
        assert_eq!(ids(&visible_records(&records, &by_date, now())), vec!["3", "1", "2"]);
    }

    #[test]
    fn top_violation_counts_and_breaks_ties_by_first_seen() {
        let records = vec![
            rec("1", "X", "2024-01-01", "A", -5),
            rec("2", "X", "2024-01-01", "A", -5),
            rec("3", "X", "2024-01-01", "B", -5),
        ];
        assert_eq!(top_violation(&records).as_deref(), Some("A"));

        let tie = vec![
            rec("1", "X", "2024-01-01", "B", -5),
            rec("2", "X", "2024-01-01", "A", -5),
        ];
        assert_eq!(top_violation(&tie).as_deref(), Some("B"));
        assert_eq!(stats(&[], now()).top_violation, NO_TOP_VIOLATION);
    }

    #[test]
    fn stats_use_full_collection() {
        let records = vec![
            rec("1", "X", "2024-03-15", "A", -5),
            rec("2", "Y", "2024-03-15", "B", -5),
            rec("3", "Z", "2024-01-01", "B", -5),
        ];
        let cfg = ViewConfig {
            search: "X".to_string(),
            ..ViewConfig::default()
        };
        let result = run(&records, &cfg, now());
        assert_eq!(result.visible.len(), 1);
        assert_eq!(
            result.stats,
            Stats {
                today: 2,
                total: 3,
                top_violation: "B".to_string(),
            }
        );
    }

    #[test]
    fn demerit_totals_sum_absolute_values() {
        let records = vec![
            rec("1", "X", "2024-01-01", "A", -5),
            rec("2", "X", "2024-01-01", "A", -10),
        ];
        let refs: Vec<&DisciplineRecord> = records.iter().collect();
        assert_eq!(
            demerit_totals(&refs),
            vec![DemeritTotal {
                student_name: "X".to_string(),
                total: 15,
            }]
        );
    }

    #[test]
    fn demerit_totals_are_sorted_and_truncated() {
        let records: Vec<DisciplineRecord> = (0..10)
            .map(|i| rec(&i.to_string(), &format!("S{i}"), "2024-01-01", "A", -(i + 1)))
            .collect();
        let refs: Vec<&DisciplineRecord> = records.iter().collect();
        let chart = demerit_totals(&refs);
        assert_eq!(chart.len(), CHART_LIMIT);
        assert_eq!(chart[0].student_name, "S9");
        assert_eq!(chart[0].total, 10);
        assert!(chart.windows(2).all(|w| w[0].total >= w[1].total));
    }

    #[test]
    fn chart_follows_filtered_set() {
        let records = vec![
            rec("1", "X", "2024-03-15", "A", -20),
            rec("2", "Y", "2024-01-01", "A", -5),
        ];
        let result = run(&records, &view(Window::Today), now());
        assert_eq!(result.chart.len(), 1);
        assert_eq!(result.chart[0].student_name, "X");
    }
}
