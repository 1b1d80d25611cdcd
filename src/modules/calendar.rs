// Month grid for the calendar panel. Weeks start on Monday.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("no such month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Direction of the calendar panel's arrow buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthStep {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub day: u32,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    /// Rows of seven cells, Monday first; `None` pads days outside the month.
    pub weeks: Vec<[Option<DayCell>; 7]>,
}

impl MonthView {
    pub fn new(year: i32, month: u32, today: NaiveDate) -> Result<Self, CalendarError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidMonth { year, month })?;
        Ok(Self::starting(first, today))
    }

    /// The month containing `today`.
    pub fn containing(today: NaiveDate) -> Self {
        Self::starting(today.with_day(1).unwrap_or(today), today)
    }

    fn starting(first: NaiveDate, today: NaiveDate) -> Self {
        let (year, month) = (first.year(), first.month());
        let days = days_in_month(first);
        let lead = first.weekday().num_days_from_monday() as usize;

        let mut weeks = Vec::new();
        let mut row: [Option<DayCell>; 7] = [None; 7];
        let mut col = lead;
        for day in 1..=days {
            row[col] = Some(DayCell {
                day,
                is_today: today.year() == year && today.month() == month && today.day() == day,
            });
            col += 1;
            if col == 7 {
                weeks.push(row);
                row = [None; 7];
                col = 0;
            }
        }
        if col > 0 {
            weeks.push(row);
        }

        Self { year, month, weeks }
    }

    pub fn previous(&self, today: NaiveDate) -> Result<Self, CalendarError> {
        let (year, month) = if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        };
        Self::new(year, month, today)
    }

    pub fn next(&self, today: NaiveDate) -> Result<Self, CalendarError> {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        Self::new(year, month, today)
    }

    /// This month for `None`, otherwise the neighbour in that direction.
    pub fn step(self, step: Option<MonthStep>, today: NaiveDate) -> Result<Self, CalendarError> {
        match step {
            None => Ok(self),
            Some(MonthStep::Previous) => self.previous(today),
            Some(MonthStep::Next) => self.next(today),
        }
    }
}

fn days_in_month(first: NaiveDate) -> u32 {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    match next {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        None => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days(view: &MonthView) -> Vec<u32> {
        view.weeks.iter().flatten().flatten().map(|c| c.day).collect()
    }

    fn marked_today(view: &MonthView) -> Option<u32> {
        view.weeks.iter().flatten().flatten().find(|c| c.is_today).map(|c| c.day)
    }

    #[rstest]
    #[case(2024, 2, 29)]
    #[case(2023, 2, 28)]
    #[case(2026, 10, 31)]
    #[case(2026, 4, 30)]
    #[case(2026, 12, 31)]
    fn test_month_lengths(#[case] year: i32, #[case] month: u32, #[case] len: u32) {
        let view = MonthView::new(year, month, date(2000, 1, 1)).unwrap();
        assert_eq!(days(&view), (1..=len).collect::<Vec<_>>());
    }

    #[test]
    fn test_weeks_start_on_monday() {
        // 1 October 2026 is a Thursday
        let view = MonthView::new(2026, 10, date(2026, 10, 19)).unwrap();
        let first_week = &view.weeks[0];
        assert!(first_week[..3].iter().all(Option::is_none));
        assert_eq!(first_week[3].map(|c| c.day), Some(1));
        assert_eq!(view.weeks.len(), 5);
        // 19 October 2026 is a Monday
        assert_eq!(view.weeks[3][0].map(|c| c.day), Some(19));
    }

    #[test]
    fn test_today_marker() {
        let view = MonthView::containing(date(2026, 10, 19));
        assert_eq!(marked_today(&view), Some(19));

        let other = view.next(date(2026, 10, 19)).unwrap();
        assert_eq!(marked_today(&other), None);
    }

    #[test]
    fn test_stepping_across_year_boundary() {
        let today = date(2026, 10, 19);
        let january = MonthView::new(2027, 1, today).unwrap();
        let december = january.previous(today).unwrap();
        assert_eq!((december.year, december.month), (2026, 12));

        let back = december.next(today).unwrap();
        assert_eq!((back.year, back.month), (2027, 1));
    }

    #[rstest]
    #[case(None, (2026, 10))]
    #[case(Some(MonthStep::Previous), (2026, 9))]
    #[case(Some(MonthStep::Next), (2026, 11))]
    fn test_step(#[case] step: Option<MonthStep>, #[case] expected: (i32, u32)) {
        let today = date(2026, 10, 19);
        let view = MonthView::containing(today).step(step, today).unwrap();
        assert_eq!((view.year, view.month), expected);
    }

    #[test]
    fn test_step_names_from_the_ui() {
        let step: MonthStep = serde_json::from_str("\"previous\"").unwrap();
        assert_eq!(step, MonthStep::Previous);
        let step: MonthStep = serde_json::from_str("\"next\"").unwrap();
        assert_eq!(step, MonthStep::Next);
    }

    #[rstest]
    #[case(0)]
    #[case(13)]
    fn test_invalid_month(#[case] month: u32) {
        assert_eq!(
            MonthView::new(2026, month, date(2026, 1, 1)),
            Err(CalendarError::InvalidMonth { year: 2026, month })
        );
    }
}
