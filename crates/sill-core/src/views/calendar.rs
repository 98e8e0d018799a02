use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::calendar::{MonthCursor, MonthGrid, due_days};
use crate::settings::WidgetSettings;
use crate::task::Task;

#[derive(Debug)]
pub struct CalendarView {
    pub settings: WidgetSettings,
    cursor: MonthCursor,
    grid: MonthGrid,
}

impl CalendarView {
    pub fn new(settings: WidgetSettings, today: NaiveDate) -> Self {
        let cursor = MonthCursor::at(today);
        let grid = MonthGrid::build(cursor.year, cursor.month, today, &BTreeSet::new());
        Self {
            settings,
            cursor,
            grid,
        }
    }

    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    pub fn grid(&self) -> &MonthGrid {
        &self.grid
    }

    pub fn title(&self) -> String {
        self.cursor.title()
    }

    pub fn refresh(&mut self, tasks: &[Task], today: NaiveDate) {
        let due = due_days(tasks, self.cursor.year, self.cursor.month);
        self.grid = MonthGrid::build(self.cursor.year, self.cursor.month, today, &due);
    }

    pub fn prev_month(&mut self, tasks: &[Task], today: NaiveDate) {
        self.cursor.prev();
        self.refresh(tasks, today);
    }

    pub fn next_month(&mut self, tasks: &[Task], today: NaiveDate) {
        self.cursor.next();
        self.refresh(tasks, today);
    }

    pub fn jump(&mut self, year: i32, month: u32, tasks: &[Task], today: NaiveDate) {
        self.cursor.jump(year, month);
        self.refresh(tasks, today);
    }

    pub fn go_today(&mut self, tasks: &[Task], today: NaiveDate) {
        self.cursor.reset(today);
        self.refresh(tasks, today);
    }
}
