use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::{info, warn};
use ratatui::{prelude::*, widgets::*};
use std::{
    io,
    time::{Duration, Instant},
};

use crate::app::preferences::{PreferenceStore, Preferences};
use crate::app::settings::{get_settings_ui, SettingsDialogState};
use crate::app::task_edit::{get_task_edit_ui, TaskEditDialogState, DATE_FORMAT};
use crate::app::task_list::*;
use crate::app::theme::Palette;
use crate::error::StorageResult;

pub struct App {
    pub items: TaskList,
    pub task_edit_dialog_state: TaskEditDialogState,
    pub settings_dialog_state: SettingsDialogState,
    pub preference_store: PreferenceStore,
    pub palette: Palette,
    system_is_dark: bool,
    status_message: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(items: TaskList, preference_store: PreferenceStore, system_is_dark: bool) -> App {
        let preferences = preference_store.load();
        App {
            items,
            task_edit_dialog_state: TaskEditDialogState::default(),
            settings_dialog_state: SettingsDialogState::default(),
            preference_store,
            palette: Palette::from_preferences(&preferences, system_is_dark),
            system_is_dark,
            status_message: None,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    fn reload_palette(&mut self) {
        let preferences: Preferences = self.preference_store.load();
        self.palette = Palette::from_preferences(&preferences, self.system_is_dark);
    }

    // Storage failures never end the loop; they show up in the status line
    fn report(&mut self, result: StorageResult<()>) {
        if let Err(err) = result {
            warn!("event=ui_action module=ui status=error error={err}");
            self.status_message = Some(format!("Error: {err}"));
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        let result = self.items.tick(now);
        self.report(result);
    }

    // Commit anything still pending before leaving
    pub fn shutdown(&mut self) {
        let result = self.items.commit_pending();
        self.report(result);
        info!("event=app_stop module=ui status=ok");
    }

    pub fn handle_key(&mut self, code: KeyCode, now: Instant) {
        if self.task_edit_dialog_state.dialog_active {
            self.handle_edit_key(code);
        } else if self.settings_dialog_state.dialog_active {
            self.handle_settings_key(code);
        } else {
            self.handle_list_key(code, now);
        }
    }

    // Handle input for the task edit dialog
    fn handle_edit_key(&mut self, code: KeyCode) {
        let dialog = &mut self.task_edit_dialog_state;
        match code {
            KeyCode::Down | KeyCode::Tab => dialog.move_cursor_down(),
            KeyCode::Up | KeyCode::BackTab => dialog.move_cursor_up(),
            KeyCode::Esc => dialog.cancel(),
            KeyCode::Enter => dialog.save_task(&mut self.items),
            KeyCode::Left => dialog.move_cursor_left(),
            KeyCode::Right => dialog.move_cursor_right(),
            KeyCode::Backspace => dialog.delete_char(),
            KeyCode::Char(to_insert) => dialog.input(to_insert),
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, code: KeyCode) {
        let dialog = &mut self.settings_dialog_state;
        match code {
            KeyCode::Esc => dialog.close(),
            KeyCode::Tab => {
                dialog.toggle_dark_mode(&self.preference_store);
                self.reload_palette();
            }
            KeyCode::Enter => {
                dialog.save(&self.preference_store);
                self.reload_palette();
            }
            KeyCode::Backspace => dialog.delete_char(),
            KeyCode::Char(to_insert) => dialog.input(to_insert),
            _ => {}
        }
    }

    // Handle input for the task list navigation, sorting, filtering and state change
    fn handle_list_key(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left => self.items.unselect(),
            KeyCode::Down => self.items.next(),
            KeyCode::Up => self.items.previous(),
            KeyCode::Char('a') => self.task_edit_dialog_state.create_a_new_task(),
            KeyCode::Char('e') => {
                if let Some(task) = self.items.get_selected() {
                    self.task_edit_dialog_state.edit_task(task);
                }
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                let result = self.items.stage_for_selected(PendingKind::Delete, now);
                self.report(result);
            }
            KeyCode::Enter | KeyCode::Char('c') => {
                let already_done = self.items.get_selected().map_or(true, |t| t.completed);
                if !already_done {
                    let result = self.items.stage_for_selected(PendingKind::Complete, now);
                    self.report(result);
                }
            }
            KeyCode::Char('u') => {
                if let Some(action) = self.items.undo() {
                    self.status_message = Some(format!("Restored: {}", action.task.title));
                }
            }
            KeyCode::Char('s') => {
                let sort = self.items.sort_option().next();
                self.items.set_sort_option(sort);
            }
            KeyCode::Char('f') => {
                let filter = self.items.filter_option().next();
                self.items.set_filter_option(filter);
            }
            KeyCode::Char('p') => {
                let preferences = self.preference_store.load();
                self.settings_dialog_state
                    .open(&preferences, self.system_is_dark);
            }
            KeyCode::Char('r') => {
                let result = self.items.refresh();
                self.report(result);
            }
            _ => {}
        }
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw_ui(f, &mut app))?;
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, Instant::now());
                }
            }
        }

        if app.should_quit() {
            app.shutdown();
            return Ok(());
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick(Instant::now());
            last_tick = Instant::now();
        }
    }
}

// Draws the whole user interface
pub fn draw_ui(f: &mut Frame, app: &mut App) {
    let palette = app.palette;
    let base = Style::new().fg(palette.foreground).bg(palette.background);
    let bordered = |title: &'static str| {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::new().fg(palette.accent))
            .title(title)
    };

    f.render_widget(Block::default().style(base), f.size());

    // Main area on top, one status line below
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.size());

    // Create two chunks of screen in 60-40 ratio
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);

    // DRAW LEFT PART
    let list_title = " Task Manager ";
    if app.items.visible_tasks().is_empty() {
        let empty = Paragraph::new(get_empty_state_ui(&palette))
            .alignment(Alignment::Center)
            .block(bordered(list_title))
            .style(base);
        f.render_widget(empty, chunks[0]);
    } else {
        // Create a List from the visible tasks and highlight the currently selected one
        let (visible, state) = app.items.list_parts();
        let task_list = List::new(get_list_items_ui(visible, &palette))
            .block(bordered(list_title))
            .style(base)
            .highlight_style(
                Style::default()
                    .bg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");

        f.render_stateful_widget(task_list, chunks[0], state);
    }

    // DRAW RIGHT PART
    let right_side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(chunks[1]);

    let stats_area = bordered(" Statistics ");
    let stats_inner = stats_area.inner(right_side[0]);
    f.render_widget(stats_area, right_side[0]);
    let stats_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(stats_inner);
    f.render_widget(
        Paragraph::new(get_statistics_ui(&app.items)).style(base),
        stats_rows[0],
    );
    let percent = app.items.completion_percentage();
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::new().fg(palette.accent).bg(palette.background))
            .ratio((percent / 100.0).clamp(0.0, 1.0))
            .label(format!("{percent:.0}% done")),
        stats_rows[1],
    );

    if app.task_edit_dialog_state.dialog_active {
        let title = if app.task_edit_dialog_state.is_editing() {
            " Edit Task "
        } else {
            " Add Task "
        };
        let dialog = Paragraph::new(get_task_edit_ui(&app.task_edit_dialog_state, &palette))
            .block(bordered(title))
            .wrap(Wrap { trim: false })
            .style(base);
        f.render_widget(dialog, right_side[1]);
    } else if app.settings_dialog_state.dialog_active {
        let dialog = Paragraph::new(get_settings_ui(&app.settings_dialog_state, &palette))
            .block(bordered(" Settings "))
            .wrap(Wrap { trim: false })
            .style(base);
        f.render_widget(dialog, right_side[1]);
    } else if app.items.get_selected().is_some() {
        // Show details of the selected task above the command list
        let lower = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(right_side[1]);
        let details = Paragraph::new(get_task_details_ui(&app.items, &palette))
            .block(bordered(" Task Details "))
            .wrap(Wrap { trim: false })
            .style(base);
        f.render_widget(details, lower[0]);
        f.render_widget(commands_widget(&palette, base), lower[1]);
    } else {
        f.render_widget(commands_widget(&palette, base), right_side[1]);
    }

    // DRAW STATUS LINE
    f.render_widget(
        Paragraph::new(get_status_line_ui(app)).style(base),
        rows[1],
    );
}

fn commands_widget<'a>(palette: &Palette, base: Style) -> Paragraph<'a> {
    Paragraph::new(get_instructions_ui())
        .block(
            Block::new()
                .title(" Commands ")
                .borders(Borders::ALL)
                .border_style(Style::new().fg(palette.accent)),
        )
        .style(base)
}

fn get_task_details_ui<'a>(items: &TaskList, palette: &Palette) -> Vec<Line<'a>> {
    let Some(task) = items.get_selected() else {
        return Vec::new();
    };
    let label = Style::new().fg(palette.muted);
    let mut lines = vec![
        Line::styled(
            task.title.clone(),
            Style::new().fg(palette.accent).add_modifier(Modifier::BOLD),
        ),
        Line::from(vec![
            Span::styled("Priority: ", label),
            priority_badge(task.priority, palette),
        ]),
        Line::from(vec![
            Span::styled("Due: ", label),
            Span::raw(task.due_date.format(DATE_FORMAT).to_string()),
        ]),
        Line::from(vec![
            Span::styled("Status: ", label),
            Span::raw(if task.completed { "Completed" } else { "Pending" }),
        ]),
    ];
    if task.has_description() {
        lines.push(Line::raw(""));
        lines.push(Line::raw(task.description.clone()));
    }
    lines
}

fn get_status_line_ui<'a>(app: &App) -> Line<'a> {
    let muted = Style::new().fg(app.palette.muted);
    let mut spans = vec![Span::styled(
        format!(
            " sort: {} | filter: {} ",
            app.items.sort_option().label(),
            app.items.filter_option().label()
        ),
        muted,
    )];
    if let Some(action) = app.items.pending() {
        spans.push(Span::styled(
            format!(" {} (u - undo)", action.message()),
            Style::new().fg(app.palette.accent).add_modifier(Modifier::BOLD),
        ));
    } else if let Some(message) = app.status_message() {
        spans.push(Span::raw(format!(" {message}")));
    }
    Line::from(spans)
}
