use log::{info, warn};
use chrono::{DateTime, Local, TimeZone, Utc};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::*;
use std::cmp::Ordering;
use std::time::{Duration, Instant};

use crate::app::models::{Priority, Task};
use crate::app::service::TaskService;
use crate::app::theme::Palette;
use crate::error::StorageResult;

// Possible task list sorting orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    ByPriority,
    ByDueDate,
    Alphabetically,
}

impl SortOption {
    pub fn label(self) -> &'static str {
        match self {
            SortOption::ByPriority => "priority",
            SortOption::ByDueDate => "due date",
            SortOption::Alphabetically => "title",
        }
    }

    pub fn next(self) -> SortOption {
        match self {
            SortOption::ByPriority => SortOption::ByDueDate,
            SortOption::ByDueDate => SortOption::Alphabetically,
            SortOption::Alphabetically => SortOption::ByPriority,
        }
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortOption::ByPriority => b.priority.cmp(&a.priority),
            SortOption::ByDueDate => a.due_date.cmp(&b.due_date),
            SortOption::Alphabetically => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    }
}

// Which tasks the list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterOption {
    #[default]
    All,
    Completed,
    Pending,
}

impl FilterOption {
    pub fn label(self) -> &'static str {
        match self {
            FilterOption::All => "all",
            FilterOption::Completed => "completed",
            FilterOption::Pending => "pending",
        }
    }

    pub fn next(self) -> FilterOption {
        match self {
            FilterOption::All => FilterOption::Completed,
            FilterOption::Completed => FilterOption::Pending,
            FilterOption::Pending => FilterOption::All,
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterOption::All => true,
            FilterOption::Completed => task.completed,
            FilterOption::Pending => !task.completed,
        }
    }
}

// Filter, then sort. The sort is stable, so equal keys keep storage order.
pub fn derive_visible_tasks(tasks: &[Task], sort: SortOption, filter: FilterOption) -> Vec<Task> {
    let mut visible: Vec<Task> = tasks.iter().filter(|t| filter.matches(t)).cloned().collect();
    visible.sort_by(|a, b| sort.compare(a, b));
    visible
}

// Share of completed tasks in percent; 0 for an empty list
pub fn completion_percentage(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let completed = tasks.iter().filter(|t| t.completed).count();
    completed as f64 / tasks.len() as f64 * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Delete,
    Complete,
}

// A delete or complete that has been requested but not written yet
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub kind: PendingKind,
    pub task: Task,
    staged_at: Instant,
}

impl PendingAction {
    pub fn message(&self) -> String {
        match self.kind {
            PendingKind::Delete => format!("Task deleted: {}", self.task.title),
            PendingKind::Complete => format!("Task completed: {}", self.task.title),
        }
    }

    fn expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.staged_at) >= window
    }
}

pub struct TaskList {
    pub state: ListState,
    tasks: Vec<Task>,
    visible: Vec<Task>,
    service: TaskService,
    sort: SortOption,
    filter: FilterOption,
    pending: Option<PendingAction>,
    undo_window: Duration,
}

impl TaskList {
    // Initialize a task list with items from the database
    pub fn with_items_from_service(
        service: TaskService,
        undo_window: Duration,
    ) -> StorageResult<TaskList> {
        let mut list = TaskList {
            state: ListState::default(),
            tasks: Vec::new(),
            visible: Vec::new(),
            service,
            sort: SortOption::default(),
            filter: FilterOption::default(),
            pending: None,
            undo_window,
        };
        list.refresh()?;
        Ok(list)
    }

    // Reload the snapshot from storage and re-derive the visible list
    pub fn refresh(&mut self) -> StorageResult<()> {
        self.tasks = self.service.get_tasks()?;
        self.rederive();
        Ok(())
    }

    fn rederive(&mut self) {
        let mut visible = derive_visible_tasks(&self.tasks, self.sort, self.filter);
        if let Some(hidden) = self.pending.as_ref().and_then(|p| p.task.id) {
            visible.retain(|t| t.id != Some(hidden));
        }
        self.visible = visible;

        match self.state.selected() {
            Some(_) if self.visible.is_empty() => self.state.select(None),
            Some(i) if i >= self.visible.len() => self.state.select(Some(self.visible.len() - 1)),
            _ => {}
        }
    }

    pub fn sort_option(&self) -> SortOption {
        self.sort
    }

    pub fn filter_option(&self) -> FilterOption {
        self.filter
    }

    pub fn set_sort_option(&mut self, sort: SortOption) {
        self.sort = sort;
        self.rederive();
    }

    pub fn set_filter_option(&mut self, filter: FilterOption) {
        self.filter = filter;
        self.rederive();
    }

    pub fn visible_tasks(&self) -> &[Task] {
        &self.visible
    }

    // Split borrow for rendering the list together with its selection
    pub fn list_parts(&mut self) -> (&[Task], &mut ListState) {
        (&self.visible, &mut self.state)
    }

    pub fn all_tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn completion_percentage(&self) -> f64 {
        completion_percentage(&self.tasks)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn overdue_count<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> usize {
        self.tasks.iter().filter(|t| t.is_overdue(now)).count()
    }

    pub fn task_by_id(&self, task_id: i32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == Some(task_id))
    }

    pub fn add_task(
        &mut self,
        title: &str,
        description: &str,
        priority: Priority,
        due_date: chrono::DateTime<Utc>,
    ) -> StorageResult<i32> {
        let task = Task::new(title, description, priority, due_date);
        let id = self.service.add_task(&task)?;
        self.refresh()?;
        Ok(id)
    }

    // Insert a new task or overwrite an existing one, depending on its id
    pub fn save_task(&mut self, task: &Task) -> StorageResult<()> {
        match task.id {
            Some(_) => self.service.update_task(task)?,
            None => {
                self.service.add_task(task)?;
            }
        }
        self.refresh()
    }

    // Unknown ids are ignored
    pub fn mark_task_as_complete(&mut self, task_id: i32) -> StorageResult<()> {
        let Some(task) = self.task_by_id(task_id) else {
            return Ok(());
        };
        let mut task = task.clone();
        task.completed = true;
        self.service.update_task(&task)?;
        self.refresh()
    }

    // Unknown ids are ignored
    pub fn delete_task(&mut self, task_id: i32) -> StorageResult<()> {
        let Some(task) = self.task_by_id(task_id).cloned() else {
            return Ok(());
        };
        self.service.delete_task(&task)?;
        self.refresh()
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    // Hide the selected task and remember the action until the undo window closes.
    // An earlier pending action is committed first.
    pub fn stage_for_selected(&mut self, kind: PendingKind, now: Instant) -> StorageResult<()> {
        let Some(task) = self.get_selected().cloned() else {
            return Ok(());
        };
        self.commit_pending()?;
        info!(
            "event=task_stage module=task_list kind={:?} id={}",
            kind,
            task.id.unwrap_or(-1)
        );
        self.pending = Some(PendingAction {
            kind,
            task,
            staged_at: now,
        });
        self.rederive();
        Ok(())
    }

    pub fn undo(&mut self) -> Option<PendingAction> {
        let cancelled = self.pending.take();
        if cancelled.is_some() {
            self.rederive();
        }
        cancelled
    }

    // Write the pending action to storage, if any
    pub fn commit_pending(&mut self) -> StorageResult<()> {
        let Some(action) = self.pending.take() else {
            return Ok(());
        };
        let Some(id) = action.task.id else {
            return Ok(());
        };
        let result = match action.kind {
            PendingKind::Delete => self.delete_task(id),
            PendingKind::Complete => self.mark_task_as_complete(id),
        };
        if result.is_err() {
            warn!("event=task_commit module=task_list status=error id={id}");
            self.rederive();
        }
        result
    }

    // Commit the pending action once its undo window has elapsed
    pub fn tick(&mut self, now: Instant) -> StorageResult<()> {
        let window = self.undo_window;
        let expired = self
            .pending
            .as_ref()
            .map_or(false, |action| action.expired(now, window));
        if expired {
            self.commit_pending()
        } else {
            Ok(())
        }
    }

    // Move the selection to the next item
    // Same wrap-around as the ratatui list example
    pub fn next(&mut self) {
        let i = match self.state.selected() {
            Some(i) => {
                if self.visible.is_empty() || i >= self.visible.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    // Move the selection to the previous item
    // Same wrap-around as the ratatui list example
    pub fn previous(&mut self) {
        let i = match self.state.selected() {
            Some(i) => {
                if self.visible.is_empty() {
                    0
                } else if i == 0 {
                    self.visible.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn unselect(&mut self) {
        self.state.select(None);
    }

    // Get the selected task
    pub fn get_selected(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.visible.get(i))
    }
}

// Build the UI (list) for task list
pub fn get_list_items_ui<'a>(tasks: &'a [Task], palette: &Palette) -> Vec<ListItem<'a>> {
    let now = Local::now();
    tasks
        .iter()
        .map(|task| {
            let title_style = if task.completed {
                Style::new()
                    .fg(palette.muted)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::new().fg(palette.priority(task.priority))
            };

            let mut lines = vec![Line::from(vec![
                Span::from(if task.completed { "[✓] " } else { "[ ] " }),
                Span::styled(task.title.as_str(), title_style),
                Span::raw(" "),
                priority_badge(task.priority, palette),
            ])];

            let mut details = vec![Span::from(format!(
                "    Due: {}",
                task.due_date.format("%d.%m.%Y")
            ))];
            if task.is_overdue(&now) {
                details.push(Span::styled(" (overdue)", Style::new().fg(Color::Red)));
            }
            if task.has_description() {
                details.push(Span::from(format!(" Description: {}", task.description)).fg(palette.muted));
            }
            lines.push(Line::from(details));

            ListItem::new(lines).style(Style::default().fg(palette.foreground))
        })
        .collect()
}

pub fn priority_badge<'a>(priority: Priority, palette: &Palette) -> Span<'a> {
    Span::styled(
        format!(" {} ", priority.label()),
        Style::new()
            .fg(palette.priority(priority))
            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
    )
}

// Build the UI (lines) shown instead of the list when there is nothing to show
pub fn get_empty_state_ui<'a>(palette: &Palette) -> Vec<Line<'a>> {
    vec![
        Line::raw(""),
        Line::styled("No Tasks Yet!", Style::new().fg(palette.accent).add_modifier(Modifier::BOLD)),
        Line::raw(""),
        Line::styled(
            "Get started by adding a task and conquer your day!",
            Style::new().fg(palette.muted),
        ),
        Line::styled("Press a to add one.", Style::new().fg(palette.muted)),
    ]
}

// Build the UI (lines) for statistics infobox
pub fn get_statistics_ui<'a>(tasks: &TaskList) -> Vec<Line<'a>> {
    let total = tasks.all_tasks().len();
    let completed = tasks.completed_count();
    vec![
        Line::from(format!("Total tasks: {total}")),
        Line::from(format!("Completed: {completed}")),
        Line::from(format!(
            "Pending: {} (overdue: {})",
            total - completed,
            tasks.overdue_count(&Local::now())
        )),
    ]
}

// Build the UI (lines) for instructions infobox
pub fn get_instructions_ui<'a>() -> Vec<Line<'a>> {
    vec![
        "Enter/c - mark as completed".into(),
        "a - add a task".into(),
        "e - edit a task".into(),
        "x - delete a task".into(),
        "u - undo last delete/complete".into(),
        "s - change sort order".into(),
        "f - change filter".into(),
        "p - preferences".into(),
        "r - reload".into(),
        "q - quit".into(),
    ]
}
