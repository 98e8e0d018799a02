use std::path::Path;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::autostart::StartupRegistrar;
use crate::cli::WidgetSelection;
use crate::notify::Notifier;
use crate::reminder;
use crate::settings::{ScreenBounds, SettingsStore, WidgetKind, WidgetSettings};
use crate::store::{TASKS_FILE, TaskStore};
use crate::task::{Task, TaskUpdate};
use crate::theme::{DEFAULT_THEME, Theme, ThemeSet};
use crate::tick::{TickKind, Ticker};
use crate::views::{CalendarView, TodoView};

pub struct WidgetHost {
    store: TaskStore,
    settings_store: SettingsStore,
    themes: ThemeSet,
    todo: Option<TodoView>,
    calendar: Option<CalendarView>,
    notifier: Box<dyn Notifier>,
    registrar: Box<dyn StartupRegistrar>,
}

impl WidgetHost {
    #[instrument(skip(themes, notifier, registrar))]
    pub fn open(
        data_dir: &Path,
        selection: WidgetSelection,
        themes: ThemeSet,
        screen: ScreenBounds,
        notifier: Box<dyn Notifier>,
        registrar: Box<dyn StartupRegistrar>,
    ) -> anyhow::Result<Self> {
        let store = TaskStore::open(&data_dir.join(TASKS_FILE))?;
        let settings_store = SettingsStore::new(data_dir);

        let now = Local::now().naive_local();
        let todo = if selection.includes(WidgetKind::Todo) {
            let settings = settings_store.load(WidgetKind::Todo, screen, &themes)?;
            Some(TodoView::new(settings))
        } else {
            None
        };
        let calendar = if selection.includes(WidgetKind::Calendar) {
            let settings = settings_store.load(WidgetKind::Calendar, screen, &themes)?;
            Some(CalendarView::new(settings, now.date()))
        } else {
            None
        };

        let mut host = Self {
            store,
            settings_store,
            themes,
            todo,
            calendar,
            notifier,
            registrar,
        };
        host.refresh_views(now);

        if host.any_startup_enabled() && !host.registrar.is_enabled() {
            if let Err(err) = host.registrar.enable() {
                warn!(error = %err, "could not register startup entry");
            }
        }

        info!(
            tasks = host.store.len(),
            todo = host.todo.is_some(),
            calendar = host.calendar.is_some(),
            "widget host ready"
        );
        Ok(host)
    }

    pub fn todo_view(&self) -> Option<&TodoView> {
        self.todo.as_ref()
    }

    pub fn calendar_view(&self) -> Option<&CalendarView> {
        self.calendar.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn themes(&self) -> &ThemeSet {
        &self.themes
    }

    pub fn widget_settings(&self, kind: WidgetKind) -> Option<&WidgetSettings> {
        match kind {
            WidgetKind::Todo => self.todo.as_ref().map(|view| &view.settings),
            WidgetKind::Calendar => self.calendar.as_ref().map(|view| &view.settings),
        }
    }

    pub fn theme_for(&self, kind: WidgetKind) -> &Theme {
        let name = self
            .widget_settings(kind)
            .map(|settings| settings.theme.as_str())
            .unwrap_or(DEFAULT_THEME);
        self.themes.resolve(name)
    }

    pub fn is_open(&self) -> bool {
        self.todo.is_some() || self.calendar.is_some()
    }

    #[instrument(skip(self, description, due))]
    pub fn add_task(
        &mut self,
        title: String,
        description: Option<String>,
        due: Option<NaiveDateTime>,
    ) -> anyhow::Result<Uuid> {
        let title = title.trim().to_string();
        if title.is_empty() {
            anyhow::bail!("task title is empty");
        }

        let now = Local::now().naive_local();
        let task = Task::new(title, description, due, now);
        let id = task.id;
        self.store.add(task);
        self.store.save()?;
        self.refresh_views(now);
        Ok(id)
    }

    #[instrument(skip(self))]
    pub fn toggle_task(&mut self, id: Uuid) -> anyhow::Result<bool> {
        if !self.store.toggle_completed(id) {
            warn!(%id, "toggle for unknown task");
            return Ok(false);
        }
        self.store.save()?;
        self.refresh_views(Local::now().naive_local());
        Ok(true)
    }

    #[instrument(skip(self, update))]
    pub fn edit_task(&mut self, id: Uuid, update: TaskUpdate) -> anyhow::Result<bool> {
        if !self.store.update(id, update) {
            warn!(%id, "edit for unknown task");
            return Ok(false);
        }
        self.store.save()?;
        self.refresh_views(Local::now().naive_local());
        Ok(true)
    }

    #[instrument(skip(self))]
    pub fn remove_task(&mut self, id: Uuid) -> anyhow::Result<bool> {
        if !self.store.remove(id) {
            warn!(%id, "remove for unknown task");
            return Ok(false);
        }
        self.store.save()?;
        self.refresh_views(Local::now().naive_local());
        Ok(true)
    }

    pub fn move_widget(&mut self, kind: WidgetKind, x: i32, y: i32) {
        if let Some(settings) = self.view_settings_mut(kind) {
            settings.move_to(x, y);
        }
    }

    pub fn resize_widget(&mut self, kind: WidgetKind, width: u32, height: u32) {
        if let Some(settings) = self.view_settings_mut(kind) {
            settings.resize_to(kind, width, height);
        }
    }

    #[instrument(skip(self))]
    pub fn set_widget_opacity(&mut self, kind: WidgetKind, opacity: f64) -> anyhow::Result<()> {
        let snapshot = {
            let Some(settings) = self.view_settings_mut(kind) else {
                return Ok(());
            };
            settings.opacity = opacity;
            settings.clamp_opacity();
            settings.clone()
        };
        self.settings_store.save(kind, &snapshot)
    }

    #[instrument(skip(self))]
    pub fn set_widget_theme(&mut self, kind: WidgetKind, name: &str) -> anyhow::Result<()> {
        let resolved = if self.themes.contains(name) {
            name.to_string()
        } else {
            warn!(theme = %name, "unknown theme name; using default");
            DEFAULT_THEME.to_string()
        };

        let snapshot = {
            let Some(settings) = self.view_settings_mut(kind) else {
                return Ok(());
            };
            settings.theme = resolved;
            settings.clone()
        };
        self.settings_store.save(kind, &snapshot)
    }

    #[instrument(skip(self))]
    pub fn set_widget_startup(&mut self, kind: WidgetKind, enabled: bool) -> anyhow::Result<()> {
        let snapshot = {
            let Some(settings) = self.view_settings_mut(kind) else {
                return Ok(());
            };
            settings.startup_enabled = enabled;
            settings.clone()
        };

        let result = if self.any_startup_enabled() {
            self.registrar.enable()
        } else {
            self.registrar.disable()
        };
        if let Err(err) = result {
            warn!(error = %err, "startup registration change failed");
        }

        self.settings_store.save(kind, &snapshot)
    }

    #[instrument(skip(self))]
    pub fn close_widget(&mut self, kind: WidgetKind) -> anyhow::Result<()> {
        let settings = match kind {
            WidgetKind::Todo => self.todo.take().map(|view| view.settings),
            WidgetKind::Calendar => self.calendar.take().map(|view| view.settings),
        };
        if let Some(settings) = settings {
            info!(?kind, "closing widget");
            self.settings_store.save(kind, &settings)?;
        }
        Ok(())
    }

    pub fn calendar_prev(&mut self) {
        let today = Local::now().naive_local().date();
        if let Some(calendar) = self.calendar.as_mut() {
            calendar.prev_month(self.store.tasks(), today);
        }
    }

    pub fn calendar_next(&mut self) {
        let today = Local::now().naive_local().date();
        if let Some(calendar) = self.calendar.as_mut() {
            calendar.next_month(self.store.tasks(), today);
        }
    }

    pub fn calendar_jump(&mut self, year: i32, month: u32) {
        let today = Local::now().naive_local().date();
        if let Some(calendar) = self.calendar.as_mut() {
            calendar.jump(year, month, self.store.tasks(), today);
        }
    }

    pub fn calendar_today(&mut self) {
        let today = Local::now().naive_local().date();
        if let Some(calendar) = self.calendar.as_mut() {
            calendar.go_today(self.store.tasks(), today);
        }
    }

    #[instrument(skip(self, kinds))]
    pub fn step(&mut self, kinds: &[TickKind], now: NaiveDateTime) -> anyhow::Result<()> {
        for kind in kinds {
            match kind {
                TickKind::Autosave => self.autosave()?,
                TickKind::Reminder => self.reminder_pass(now)?,
            }
        }
        Ok(())
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut ticker = Ticker::new(Instant::now());
        info!("entering widget loop");

        while self.is_open() {
            let deadline = ticker.next_deadline();
            let before = Instant::now();
            if deadline > before {
                std::thread::sleep(deadline - before);
            }

            let fired = ticker.due(Instant::now());
            if fired.is_empty() {
                continue;
            }

            let now = Local::now().naive_local();
            if let Err(err) = self.step(&fired, now) {
                warn!(error = %err, "tick step failed");
            }
        }

        info!("all widgets closed");
        Ok(())
    }

    fn autosave(&mut self) -> anyhow::Result<()> {
        if let Some(view) = self.todo.as_ref() {
            self.settings_store.save(WidgetKind::Todo, &view.settings)?;
        }
        if let Some(view) = self.calendar.as_ref() {
            self.settings_store.save(WidgetKind::Calendar, &view.settings)?;
        }
        Ok(())
    }

    fn reminder_pass(&mut self, now: NaiveDateTime) -> anyhow::Result<()> {
        if self.todo.is_some() {
            reminder::deliver(&mut self.store, self.notifier.as_ref(), now)?;
        }
        if self.calendar.is_some() {
            self.store.reload()?;
        }
        self.refresh_views(now);
        Ok(())
    }

    fn refresh_views(&mut self, now: NaiveDateTime) {
        if let Some(todo) = self.todo.as_mut() {
            todo.refresh(self.store.tasks(), now);
        }
        if let Some(calendar) = self.calendar.as_mut() {
            calendar.refresh(self.store.tasks(), now.date());
        }
    }

    fn view_settings_mut(&mut self, kind: WidgetKind) -> Option<&mut WidgetSettings> {
        match kind {
            WidgetKind::Todo => self.todo.as_mut().map(|view| &mut view.settings),
            WidgetKind::Calendar => self.calendar.as_mut().map(|view| &mut view.settings),
        }
    }

    fn any_startup_enabled(&self) -> bool {
        let todo = self
            .todo
            .as_ref()
            .map(|view| view.settings.startup_enabled)
            .unwrap_or(false);
        let calendar = self
            .calendar
            .as_ref()
            .map(|view| view.settings.startup_enabled)
            .unwrap_or(false);
        todo || calendar
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate};
    use tempfile::tempdir;

    use super::WidgetHost;
    use crate::autostart::UnsupportedAutostart;
    use crate::cli::WidgetSelection;
    use crate::notify::NullNotifier;
    use crate::settings::{ScreenBounds, WidgetKind};
    use crate::task::TaskUpdate;
    use crate::theme::ThemeSet;
    use crate::tick::TickKind;

    fn host_at(dir: &std::path::Path, selection: WidgetSelection) -> WidgetHost {
        WidgetHost::open(
            dir,
            selection,
            ThemeSet::builtin(),
            ScreenBounds::default(),
            Box::new(NullNotifier),
            Box::new(UnsupportedAutostart),
        )
        .expect("open widget host")
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .expect("valid date")
            .and_hms_opt(h, min, 0)
            .expect("valid time")
    }

    #[test]
    fn open_builds_selected_views_only() {
        let temp = tempdir().expect("tempdir");
        let host = host_at(temp.path(), WidgetSelection::Calendar);
        assert!(host.todo_view().is_none());
        assert!(host.calendar_view().is_some());
        assert!(host.is_open());
    }

    #[test]
    fn task_mutations_persist_and_refresh_rows() {
        let temp = tempdir().expect("tempdir");
        let mut host = host_at(temp.path(), WidgetSelection::Both);

        let id = host
            .add_task("Pay rent".to_string(), None, Some(at(2030, 6, 5, 12, 0)))
            .expect("add task");
        assert!(temp.path().join("tasks.json").exists());

        let rows = host.todo_view().expect("todo view").rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Pay rent");
        assert!(!rows[0].completed);

        assert!(host.toggle_task(id).expect("toggle"));
        let rows = host.todo_view().expect("todo view").rows();
        assert!(rows[0].completed);

        let update = TaskUpdate {
            title: Some("Pay June rent".to_string()),
            ..TaskUpdate::default()
        };
        assert!(host.edit_task(id, update).expect("edit"));
        assert!(host.remove_task(id).expect("remove"));
        assert!(host.todo_view().expect("todo view").rows().is_empty());
    }

    #[test]
    fn empty_title_is_rejected() {
        let temp = tempdir().expect("tempdir");
        let mut host = host_at(temp.path(), WidgetSelection::Todo);
        assert!(host.add_task("   ".to_string(), None, None).is_err());
        assert!(host.tasks().is_empty());
    }

    #[test]
    fn autosave_tick_writes_settings_files() {
        let temp = tempdir().expect("tempdir");
        let mut host = host_at(temp.path(), WidgetSelection::Both);

        host.move_widget(WidgetKind::Todo, 7, 9);
        host.step(&[TickKind::Autosave], Local::now().naive_local())
            .expect("autosave step");

        assert!(temp.path().join("todo.settings.json").exists());
        assert!(temp.path().join("calendar.settings.json").exists());

        let raw = std::fs::read_to_string(temp.path().join("todo.settings.json"))
            .expect("read settings");
        assert!(raw.contains("\"x\": 7"));
    }

    #[test]
    fn reminder_tick_marks_due_tasks() {
        let temp = tempdir().expect("tempdir");
        let mut host = host_at(temp.path(), WidgetSelection::Todo);

        host.add_task("Overdue".to_string(), None, Some(at(2020, 1, 1, 9, 0)))
            .expect("add task");
        host.step(&[TickKind::Reminder], Local::now().naive_local())
            .expect("reminder step");

        assert!(host.tasks()[0].notified);
    }

    #[test]
    fn unknown_theme_request_falls_back() {
        let temp = tempdir().expect("tempdir");
        let mut host = host_at(temp.path(), WidgetSelection::Todo);

        host.set_widget_theme(WidgetKind::Todo, "purple")
            .expect("set theme");
        assert_eq!(
            host.widget_settings(WidgetKind::Todo)
                .expect("settings")
                .theme,
            "dark"
        );

        host.set_widget_theme(WidgetKind::Todo, "light")
            .expect("set theme");
        assert_eq!(host.theme_for(WidgetKind::Todo).accent, "#4a80d9");
    }

    #[test]
    fn closing_all_widgets_ends_the_host() {
        let temp = tempdir().expect("tempdir");
        let mut host = host_at(temp.path(), WidgetSelection::Both);

        host.close_widget(WidgetKind::Todo).expect("close todo");
        assert!(host.is_open());
        host.close_widget(WidgetKind::Calendar).expect("close calendar");
        assert!(!host.is_open());

        assert!(temp.path().join("todo.settings.json").exists());
        assert!(temp.path().join("calendar.settings.json").exists());
    }

    #[test]
    fn resize_respects_minimums() {
        let temp = tempdir().expect("tempdir");
        let mut host = host_at(temp.path(), WidgetSelection::Calendar);

        host.resize_widget(WidgetKind::Calendar, 100, 100);
        let settings = host
            .widget_settings(WidgetKind::Calendar)
            .expect("settings");
        assert_eq!((settings.width, settings.height), (300, 300));
    }
}
