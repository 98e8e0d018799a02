use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::settings::WidgetSettings;
use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: Uuid,
    pub title: String,
    pub due_label: Option<String>,
    pub overdue: bool,
    pub completed: bool,
}

#[derive(Debug)]
pub struct TodoView {
    pub settings: WidgetSettings,
    rows: Vec<TaskRow>,
}

impl TodoView {
    pub fn new(settings: WidgetSettings) -> Self {
        Self {
            settings,
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[TaskRow] {
        &self.rows
    }

    pub fn refresh(&mut self, tasks: &[Task], now: NaiveDateTime) {
        let mut pending: Vec<&Task> = tasks.iter().filter(|task| !task.completed).collect();
        pending.sort_by_key(|task| {
            (
                !task.is_overdue(now),
                task.due.unwrap_or(NaiveDateTime::MAX),
            )
        });

        self.rows = pending
            .into_iter()
            .chain(tasks.iter().filter(|task| task.completed))
            .map(|task| task_row(task, now))
            .collect();
    }
}

fn task_row(task: &Task, now: NaiveDateTime) -> TaskRow {
    TaskRow {
        id: task.id,
        title: task.title.clone(),
        due_label: task.due.map(|due| due.format("%b %d  %H:%M").to_string()),
        overdue: task.is_overdue(now),
        completed: task.completed,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::TodoView;
    use crate::settings::{ScreenBounds, WidgetKind, WidgetSettings};
    use crate::task::Task;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .expect("valid date")
            .and_hms_opt(h, min, 0)
            .expect("valid time")
    }

    fn view() -> TodoView {
        TodoView::new(WidgetSettings::defaults(
            WidgetKind::Todo,
            ScreenBounds::default(),
        ))
    }

    fn task(title: &str, due: Option<chrono::NaiveDateTime>, completed: bool) -> Task {
        let mut task = Task::new(title.to_string(), None, due, at(2024, 6, 1, 9, 0));
        task.completed = completed;
        task
    }

    #[test]
    fn rows_order_overdue_then_due_then_undated_then_completed() {
        let now = at(2024, 6, 10, 12, 0);
        let tasks = vec![
            task("Someday", None, false),
            task("Tomorrow", Some(at(2024, 6, 11, 9, 0)), false),
            task("Yesterday", Some(at(2024, 6, 9, 9, 0)), false),
            task("Finished", Some(at(2024, 6, 2, 9, 0)), true),
            task("Last week", Some(at(2024, 6, 3, 9, 0)), false),
        ];

        let mut view = view();
        view.refresh(&tasks, now);

        let titles: Vec<&str> = view.rows().iter().map(|row| row.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Last week", "Yesterday", "Tomorrow", "Someday", "Finished"]
        );
        assert!(view.rows()[0].overdue);
        assert!(!view.rows()[2].overdue);
        assert!(view.rows()[4].completed);
    }

    #[test]
    fn ties_keep_stored_order() {
        let now = at(2024, 6, 10, 12, 0);
        let due = Some(at(2024, 6, 11, 9, 0));
        let tasks = vec![
            task("First", due, false),
            task("Second", due, false),
        ];

        let mut view = view();
        view.refresh(&tasks, now);
        let titles: Vec<&str> = view.rows().iter().map(|row| row.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn due_label_uses_short_month_format() {
        let now = at(2024, 6, 1, 9, 0);
        let tasks = vec![task("Pay rent", Some(at(2024, 6, 5, 12, 30)), false)];

        let mut view = view();
        view.refresh(&tasks, now);
        assert_eq!(view.rows()[0].due_label.as_deref(), Some("Jun 05  12:30"));
    }
}
