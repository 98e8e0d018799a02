use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::task::{Task, TaskUpdate};

pub const TASKS_FILE: &str = "tasks.json";

#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

enum LoadOutcome {
    Loaded(Vec<Task>),
    Missing,
    Malformed,
}

impl TaskStore {
    #[tracing::instrument(skip(path))]
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let tasks = match read_tasks(path)? {
            LoadOutcome::Loaded(tasks) => dedup_by_id(tasks),
            LoadOutcome::Missing => {
                debug!(file = %path.display(), "task file not found; starting empty");
                Vec::new()
            }
            LoadOutcome::Malformed => Vec::new(),
        };

        info!(file = %path.display(), count = tasks.len(), "opened task store");
        Ok(Self {
            path: path.to_path_buf(),
            tasks,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn reload(&mut self) -> anyhow::Result<()> {
        match read_tasks(&self.path)? {
            LoadOutcome::Loaded(tasks) => {
                self.tasks = dedup_by_id(tasks);
                debug!(count = self.tasks.len(), "reloaded tasks");
            }
            LoadOutcome::Missing => self.tasks.clear(),
            LoadOutcome::Malformed => {}
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn save(&self) -> anyhow::Result<()> {
        debug!(file = %self.path.display(), count = self.tasks.len(), "saving tasks");

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        let serialized = serde_json::to_string_pretty(&self.tasks)?;
        writeln!(temp, "{serialized}")?;
        temp.flush()?;

        temp.persist(&self.path)
            .map_err(|err| anyhow!("failed to persist {}: {}", self.path.display(), err))?;

        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn add(&mut self, task: Task) {
        debug!(id = %task.id, title = %task.title, "adding task");
        self.tasks.push(task);
    }

    #[tracing::instrument(skip(self, update), fields(id = %id))]
    pub fn update(&mut self, id: Uuid, update: TaskUpdate) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };

        if let Some(title) = update.title {
            task.title = title;
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(due) = update.due {
            task.due = due;
            task.notified = false;
        }
        if let Some(completed) = update.completed {
            if task.completed && !completed {
                task.notified = false;
            }
            task.completed = completed;
        }

        debug!("task updated");
        true
    }

    pub fn toggle_completed(&mut self, id: Uuid) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };
        task.completed = !task.completed;
        if !task.completed {
            task.notified = false;
        }
        true
    }

    pub fn set_notified(&mut self, id: Uuid, notified: bool) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };
        task.notified = notified;
        true
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        before != self.tasks.len()
    }
}

fn read_tasks(path: &Path) -> anyhow::Result<LoadOutcome> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(LoadOutcome::Missing);
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed reading {}", path.display()));
        }
    };

    match serde_json::from_str::<Vec<Task>>(&raw) {
        Ok(tasks) => Ok(LoadOutcome::Loaded(tasks)),
        Err(err) => {
            warn!(file = %path.display(), error = %err, "malformed task file; starting empty");
            Ok(LoadOutcome::Malformed)
        }
    }
}

fn dedup_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    let mut out = Vec::with_capacity(tasks.len());
    for task in tasks {
        if seen.insert(task.id) {
            out.push(task);
        } else {
            warn!(id = %task.id, title = %task.title, "dropping task with duplicate id");
        }
    }
    out
}
