use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::task::Task;

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn due_days(tasks: &[Task], year: i32, month: u32) -> BTreeSet<u32> {
    tasks
        .iter()
        .filter(|task| !task.completed)
        .filter_map(|task| task.due)
        .map(|due| due.date())
        .filter(|date| date.year() == year && date.month() == month)
        .map(|date| date.day())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub day: Option<u32>,
    pub is_today: bool,
    pub is_past: bool,
    pub has_due: bool,
}

impl DayCell {
    pub fn blank() -> Self {
        Self {
            day: None,
            is_today: false,
            is_past: false,
            has_due: false,
        }
    }

    pub fn shows_dot(&self) -> bool {
        self.day.is_some() && !self.is_past && self.has_due
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[DayCell; 7]>,
}

impl MonthGrid {
    pub fn build(year: i32, month: u32, today: NaiveDate, due: &BTreeSet<u32>) -> Self {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            warn!(year, month, "cannot lay out invalid month");
            return Self {
                year,
                month,
                weeks: Vec::new(),
            };
        };

        let leading = first.weekday().num_days_from_sunday() as usize;
        let mut cells = vec![DayCell::blank(); leading];
        for day in 1..=days_in_month(year, month) {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                continue;
            };
            cells.push(DayCell {
                day: Some(day),
                is_today: date == today,
                is_past: date < today,
                has_due: due.contains(&day),
            });
        }
        while cells.len() % 7 != 0 {
            cells.push(DayCell::blank());
        }

        let weeks = cells
            .chunks(7)
            .map(|chunk| chunk.try_into().unwrap_or([DayCell::blank(); 7]))
            .collect();
        Self { year, month, weeks }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|date| date.pred_opt())
        .map_or(31, |date| date.day())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    pub fn at(today: NaiveDate) -> Self {
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn prev(&mut self) {
        if self.month == 1 {
            self.month = 12;
            self.year -= 1;
        } else {
            self.month -= 1;
        }
    }

    pub fn next(&mut self) {
        if self.month == 12 {
            self.month = 1;
            self.year += 1;
        } else {
            self.month += 1;
        }
    }

    pub fn jump(&mut self, year: i32, month: u32) {
        if !(1..=12).contains(&month) {
            warn!(year, month, "ignoring jump to invalid month");
            return;
        }
        self.year = year;
        self.month = month;
    }

    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::at(today);
    }

    pub fn title(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|date| date.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use super::{DayCell, MonthCursor, MonthGrid, due_days};
    use crate::task::Task;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn task_due(title: &str, due: NaiveDate) -> Task {
        let noon = due.and_hms_opt(12, 0, 0).expect("valid time");
        Task::new(title.to_string(), None, Some(noon), noon)
    }

    #[test]
    fn due_days_collects_open_tasks_in_month() {
        let mut done = task_due("Returned books", date(2024, 6, 9));
        done.completed = true;
        let tasks = vec![
            task_due("Pay rent", date(2024, 6, 5)),
            task_due("Dentist", date(2024, 6, 5)),
            task_due("Ship report", date(2024, 6, 7)),
            task_due("Next month", date(2024, 7, 1)),
            done,
        ];

        let days = due_days(&tasks, 2024, 6);
        assert_eq!(days, BTreeSet::from([5, 7]));
    }

    #[test]
    fn june_2024_grid_shape() {
        let grid = MonthGrid::build(2024, 6, date(2024, 6, 10), &BTreeSet::new());

        assert_eq!(grid.weeks.len(), 6);
        let first_week = grid.weeks[0];
        assert!(first_week[..6].iter().all(|cell| cell.day.is_none()));
        assert_eq!(first_week[6].day, Some(1));

        let last_week = grid.weeks[5];
        assert_eq!(last_week[0].day, Some(30));
        assert!(last_week[1..].iter().all(|cell| cell.day.is_none()));
    }

    #[test]
    fn grid_marks_today_and_past() {
        let grid = MonthGrid::build(2024, 6, date(2024, 6, 10), &BTreeSet::new());
        let cells: Vec<DayCell> = grid.weeks.iter().flatten().copied().collect();

        let day = |n: u32| {
            cells
                .iter()
                .find(|cell| cell.day == Some(n))
                .copied()
                .expect("day present")
        };

        assert!(day(10).is_today);
        assert!(!day(10).is_past);
        assert!(day(9).is_past);
        assert!(!day(11).is_past);
    }

    #[test]
    fn dot_skips_past_days() {
        let due = BTreeSet::from([5, 20]);
        let grid = MonthGrid::build(2024, 6, date(2024, 6, 10), &due);
        let cells: Vec<DayCell> = grid.weeks.iter().flatten().copied().collect();

        let day = |n: u32| {
            cells
                .iter()
                .find(|cell| cell.day == Some(n))
                .copied()
                .expect("day present")
        };

        assert!(day(5).has_due);
        assert!(!day(5).shows_dot());
        assert!(day(20).shows_dot());
        assert!(!day(11).shows_dot());
    }

    #[test]
    fn cursor_rolls_over_year_boundaries() {
        let mut cursor = MonthCursor::at(date(2024, 1, 15));
        cursor.prev();
        assert_eq!((cursor.year, cursor.month), (2023, 12));
        cursor.next();
        assert_eq!((cursor.year, cursor.month), (2024, 1));

        let mut cursor = MonthCursor::at(date(2024, 12, 3));
        cursor.next();
        assert_eq!((cursor.year, cursor.month), (2025, 1));
    }

    #[test]
    fn jump_ignores_invalid_months() {
        let mut cursor = MonthCursor::at(date(2024, 6, 10));
        cursor.jump(2026, 13);
        assert_eq!((cursor.year, cursor.month), (2024, 6));
        cursor.jump(2026, 2);
        assert_eq!((cursor.year, cursor.month), (2026, 2));
    }

    #[test]
    fn cursor_title_names_month_and_year() {
        let cursor = MonthCursor::at(date(2024, 6, 10));
        assert_eq!(cursor.title(), "June 2024");
    }
}
