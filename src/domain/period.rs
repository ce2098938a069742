use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// A reporting window over payment dates.
///
/// Month and year periods are anchored on their first day; construct them with
/// [`Period::month`] and [`Period::year`] so the anchor is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day(NaiveDate),
    Month(NaiveDate),
    Year(NaiveDate),
    /// Inclusive on both ends
    Between { from: NaiveDate, to: NaiveDate },
}

impl Period {
    pub fn month(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Period::Month)
    }

    pub fn year(year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, 1, 1).map(Period::Year)
    }

    pub fn month_of(date: NaiveDate) -> Self {
        Period::Month(date.with_day(1).unwrap_or(date))
    }

    pub fn year_of(date: NaiveDate) -> Self {
        Period::Year(date.with_ordinal(1).unwrap_or(date))
    }

    /// Half-open date bounds `[start, end)`.
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        match *self {
            Period::Day(day) => (day, day.succ_opt().unwrap_or(NaiveDate::MAX)),
            Period::Month(first) => (
                first,
                first
                    .checked_add_months(Months::new(1))
                    .unwrap_or(NaiveDate::MAX),
            ),
            Period::Year(first) => (
                first,
                first
                    .checked_add_months(Months::new(12))
                    .unwrap_or(NaiveDate::MAX),
            ),
            Period::Between { from, to } => (from, to.succ_opt().unwrap_or(NaiveDate::MAX)),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let (start, end) = self.bounds();
        date >= start && date < end
    }

    /// Short human label: "2024-03-05", "Mar 2024", "2024", "2024-01-01..2024-01-31".
    pub fn label(&self) -> String {
        match self {
            Period::Day(day) => day.format("%Y-%m-%d").to_string(),
            Period::Month(first) => first.format("%b %Y").to_string(),
            Period::Year(first) => first.year().to_string(),
            Period::Between { from, to } => {
                format!("{}..{}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
            }
        }
    }

    /// The `count` calendar months ending with the month of `today`, oldest first.
    pub fn trailing_months(today: NaiveDate, count: u32) -> Vec<Period> {
        let current = today.with_day(1).unwrap_or(today);
        (0..count)
            .rev()
            .filter_map(|back| current.checked_sub_months(Months::new(back)))
            .map(Period::Month)
            .collect()
    }
}
