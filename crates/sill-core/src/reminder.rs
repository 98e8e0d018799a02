use chrono::{Duration, NaiveDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::notify::Notifier;
use crate::store::TaskStore;
use crate::task::Task;

pub const EARLY_WARNING_SECS: i64 = 300;

pub fn early_warning() -> Duration {
    Duration::seconds(EARLY_WARNING_SECS)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderKind {
    DueNow,
    DueSoon { minutes: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub task_id: Uuid,
    pub title: String,
    pub kind: ReminderKind,
}

impl Reminder {
    pub fn message(&self) -> (String, String) {
        match &self.kind {
            ReminderKind::DueNow => (
                "Task Due".to_string(),
                format!("\"{}\" is due now!", self.title),
            ),
            ReminderKind::DueSoon { minutes } => (
                "Task Due Soon".to_string(),
                format!("\"{}\" is due in ~{minutes} minutes.", self.title),
            ),
        }
    }
}

pub fn scan(tasks: &[Task], now: NaiveDateTime, early_warning: Duration) -> Vec<Reminder> {
    let mut reminders = Vec::new();
    for task in tasks {
        if task.completed || task.notified {
            continue;
        }
        let Some(due) = task.due else {
            continue;
        };

        if due <= now {
            reminders.push(Reminder {
                task_id: task.id,
                title: task.title.clone(),
                kind: ReminderKind::DueNow,
            });
        } else if due - now <= early_warning {
            reminders.push(Reminder {
                task_id: task.id,
                title: task.title.clone(),
                kind: ReminderKind::DueSoon {
                    minutes: early_warning.num_minutes(),
                },
            });
        }
    }
    reminders
}

#[tracing::instrument(skip(store, notifier))]
pub fn deliver(
    store: &mut TaskStore,
    notifier: &dyn Notifier,
    now: NaiveDateTime,
) -> anyhow::Result<usize> {
    let reminders = scan(store.tasks(), now, early_warning());
    if reminders.is_empty() {
        return Ok(0);
    }

    let mut delivered = 0;
    let mut flipped = false;
    for reminder in reminders {
        let (title, body) = reminder.message();
        match notifier.send(&title, &body) {
            Ok(()) => {
                delivered += 1;
                if matches!(reminder.kind, ReminderKind::DueNow)
                    && store.set_notified(reminder.task_id, true)
                {
                    flipped = true;
                }
                debug!(task = %reminder.task_id, "delivered reminder");
            }
            Err(err) => {
                warn!(
                    task = %reminder.task_id,
                    error = %err,
                    "reminder delivery failed; leaving task unnotified"
                );
            }
        }
    }

    if flipped {
        store.save()?;
    }
    Ok(delivered)
}
