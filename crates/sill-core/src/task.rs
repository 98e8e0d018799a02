use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::datetime::iso_date_serde;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,

    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, rename = "dueDate", with = "iso_date_serde::option")]
    pub due: Option<NaiveDateTime>,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub notified: bool,

    #[serde(default, with = "iso_date_serde")]
    pub created: NaiveDateTime,
}

impl Task {
    pub fn new(
        title: String,
        description: Option<String>,
        due: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            due,
            completed: false,
            notified: false,
            created: now,
        }
    }

    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        !self.completed && self.due.map(|due| due < now).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due: Option<Option<NaiveDateTime>>,
    pub completed: Option<bool>,
}
