//! Sidebar filters for admin changelists.

use crate::orm::questions;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use sea_orm::{ColumnTrait, Condition};
use std::collections::HashMap;

/// A filter configured on a `ModelAdmin`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListFilter {
    /// Published/unpublished split on `questions.pub_date`.
    Published,
    /// Exact match on a related record, one link per related row.
    Related {
        title: &'static str,
        parameter_name: &'static str,
    },
}

impl ListFilter {
    pub fn title(&self) -> &'static str {
        match self {
            ListFilter::Published => PUBLISHED_TITLE,
            ListFilter::Related { title, .. } => title,
        }
    }

    pub fn parameter_name(&self) -> &'static str {
        match self {
            ListFilter::Published => PUBLISHED_PARAMETER,
            ListFilter::Related { parameter_name, .. } => parameter_name,
        }
    }
}

pub const PUBLISHED_TITLE: &str = "Published questions";
pub const PUBLISHED_PARAMETER: &str = "pub_date";

/// Lookup values and their sidebar labels.
pub const PUBLISHED_LOOKUPS: [(&str, &str); 2] = [
    ("Published", "Published questions"),
    ("Unpublished", "Unpublished questions"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishedState {
    Published,
    Unpublished,
}

impl PublishedState {
    /// Anything other than the two lookup values selects nothing.
    pub fn from_selector(selector: Option<&str>) -> Option<Self> {
        match selector {
            Some("Published") => Some(PublishedState::Published),
            Some("Unpublished") => Some(PublishedState::Unpublished),
            _ => None,
        }
    }

    pub fn matches(&self, pub_date: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            PublishedState::Published => pub_date < now,
            PublishedState::Unpublished => pub_date >= now,
        }
    }

    pub fn condition(&self, now: NaiveDateTime) -> Condition {
        match self {
            PublishedState::Published => Condition::all().add(questions::Column::PubDate.lt(now)),
            PublishedState::Unpublished => {
                Condition::all().add(questions::Column::PubDate.gte(now))
            }
        }
    }
}

/// Keeps the questions selected by `selector`, relative to `now`.
///
/// An absent or unrecognised selector returns the input unchanged.
pub fn filter_questions(
    questions: Vec<questions::Model>,
    selector: Option<&str>,
    now: NaiveDateTime,
) -> Vec<questions::Model> {
    match PublishedState::from_selector(selector) {
        Some(state) => questions
            .into_iter()
            .filter(|q| state.matches(q.pub_date, now))
            .collect(),
        None => questions,
    }
}

/// Date drill-down over a datetime field (`<field>__year`, `__month`, `__day`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateDrilldown {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl DateDrilldown {
    pub fn from_params(field: &str, params: &HashMap<String, String>) -> Self {
        let get = |suffix: &str| params.get(&format!("{}__{}", field, suffix));
        let year = get("year").and_then(|v| v.parse().ok());
        // A month without a year, or a day without a month, is ignored.
        let month = year.and(get("month").and_then(|v| v.parse().ok()));
        let day = month.and(get("day").and_then(|v| v.parse().ok()));
        Self { year, month, day }
    }

    /// Half-open `[start, end)` range selected by the drill-down.
    pub fn range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let year = self.year?;
        let (start, end) = match (self.month, self.day) {
            (Some(month), Some(day)) => {
                let start = NaiveDate::from_ymd_opt(year, month, day)?;
                (start, start + Duration::days(1))
            }
            (Some(month), None) => {
                let start = NaiveDate::from_ymd_opt(year, month, 1)?;
                let end = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)?
                };
                (start, end)
            }
            _ => (
                NaiveDate::from_ymd_opt(year, 1, 1)?,
                NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
            ),
        };
        Some((start.and_hms_opt(0, 0, 0)?, end.and_hms_opt(0, 0, 0)?))
    }

    /// Next level of links: years, then months of the year, then days of the month.
    pub fn choices(&self, dates: &[NaiveDateTime]) -> Vec<(String, u32)> {
        let range = self.range();
        let mut values: Vec<u32> = dates
            .iter()
            .filter(|dt| range.map_or(true, |(start, end)| **dt >= start && **dt < end))
            .filter_map(|dt| match (self.year, self.month, self.day) {
                (None, _, _) => Some(dt.year() as u32),
                (Some(_), None, _) => Some(dt.month()),
                (Some(_), Some(_), None) => Some(dt.day()),
                (Some(_), Some(_), Some(_)) => None,
            })
            .collect();
        values.sort_unstable();
        values.dedup();

        values
            .into_iter()
            .map(|v| {
                let label = match (self.year, self.month) {
                    (None, _) => v.to_string(),
                    (Some(_), None) => month_name(v).to_string(),
                    (Some(_), Some(month)) => format!("{} {}", month_name(month), v),
                };
                (label, v)
            })
            .collect()
    }
}

fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn question(id: i32, pub_date: NaiveDateTime) -> questions::Model {
        questions::Model {
            id,
            question_text: format!("Question {}", id),
            pub_date,
            created_date: pub_date,
            updated_date: pub_date,
            ref_author_id: 1,
        }
    }

    #[test]
    fn test_published_includes_past_excludes_future() {
        let now = Utc::now().naive_utc();
        let past = question(1, now - Duration::days(3));
        let future = question(2, now + Duration::days(3));
        let all = vec![past.clone(), future.clone()];

        let published = filter_questions(all.clone(), Some("Published"), now);
        assert_eq!(published, vec![past.clone()]);

        let unpublished = filter_questions(all, Some("Unpublished"), now);
        assert_eq!(unpublished, vec![future]);
    }

    #[test]
    fn test_pub_date_equal_to_now_is_unpublished() {
        let now = Utc::now().naive_utc();
        assert!(!PublishedState::Published.matches(now, now));
        assert!(PublishedState::Unpublished.matches(now, now));
    }

    #[test]
    fn test_absent_or_unknown_selector_passes_through() {
        let now = Utc::now().naive_utc();
        let all = vec![
            question(1, now - Duration::days(1)),
            question(2, now + Duration::days(1)),
        ];

        assert_eq!(filter_questions(all.clone(), None, now), all);
        assert_eq!(filter_questions(all.clone(), Some("Drafts"), now), all);
    }

    #[test]
    fn test_drilldown_month_range_wraps_year() {
        let mut params = HashMap::new();
        params.insert("pub_date__year".to_string(), "2023".to_string());
        params.insert("pub_date__month".to_string(), "12".to_string());
        let drill = DateDrilldown::from_params("pub_date", &params);

        let (start, end) = drill.range().unwrap();
        assert_eq!(start.to_string(), "2023-12-01 00:00:00");
        assert_eq!(end.to_string(), "2024-01-01 00:00:00");
    }

    #[test]
    fn test_drilldown_day_without_month_is_ignored() {
        let mut params = HashMap::new();
        params.insert("pub_date__year".to_string(), "2023".to_string());
        params.insert("pub_date__day".to_string(), "4".to_string());
        let drill = DateDrilldown::from_params("pub_date", &params);

        assert_eq!(drill.day, None);
        let (start, end) = drill.range().unwrap();
        assert_eq!(start.to_string(), "2023-01-01 00:00:00");
        assert_eq!(end.to_string(), "2024-01-01 00:00:00");
    }

    #[test]
    fn test_drilldown_choices_levels() {
        let dates: Vec<NaiveDateTime> = [(2022, 5, 2), (2023, 1, 9), (2023, 1, 3), (2023, 3, 1)]
            .iter()
            .map(|(y, m, d)| {
                NaiveDate::from_ymd_opt(*y, *m, *d)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap()
            })
            .collect();

        let years = DateDrilldown::default().choices(&dates);
        assert_eq!(
            years,
            vec![("2022".to_string(), 2022), ("2023".to_string(), 2023)]
        );

        let months = DateDrilldown {
            year: Some(2023),
            ..Default::default()
        }
        .choices(&dates);
        assert_eq!(
            months,
            vec![
                ("January".to_string(), 1),
                ("March".to_string(), 3),
            ]
        );
    }
}
