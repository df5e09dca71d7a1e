use chrono::{Local, NaiveDate};
use derivative::Derivative;
use log::warn;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::app::models::{Priority, Task};
use crate::app::task_list::{priority_badge, TaskList};
use crate::app::theme::Palette;

pub const DATE_FORMAT: &str = "%d.%m.%Y";

// Index of the last editable line (title, description, due date, priority)
const LAST_LINE: usize = 3;
const PRIORITY_LINE: usize = 3;

// State object for the task edit dialog
// Keeps track of the state of the dialog and the content of the task being edited
#[derive(Derivative)]
#[derivative(Default)]
pub struct TaskEditDialogState {
    pub dialog_active: bool,
    task_id: Option<i32>,
    completed: bool,
    content: TaskEditDialogContent,
    error_message: Option<String>,
    // (char column, line)
    cursor_position: (usize, usize),
}

// Current content of the task being edited/created
#[derive(Derivative, Debug, Clone, PartialEq)]
#[derivative(Default)]
struct TaskEditDialogContent {
    title: String,
    description: String,
    due_date: String,
    priority: Priority,
}

impl TaskEditDialogState {
    // Opens the dialog and prepares to accept an input for the new task
    pub fn create_a_new_task(&mut self) {
        self.dialog_active = true;
        self.task_id = None;
        self.completed = false;
        self.error_message = None;
        self.cursor_position = (0, 0);
        self.content = TaskEditDialogContent {
            due_date: Local::now().date_naive().format(DATE_FORMAT).to_string(),
            ..TaskEditDialogContent::default()
        };
    }

    // Opens the dialog and prepares to accept an input for the existing task
    pub fn edit_task(&mut self, task: &Task) {
        self.dialog_active = true;
        self.task_id = task.id;
        self.completed = task.completed;
        self.error_message = None;
        self.cursor_position = (0, 0);
        self.content = TaskEditDialogContent {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.format(DATE_FORMAT).to_string(),
            priority: task.priority,
        };
    }

    pub fn cancel(&mut self) {
        self.dialog_active = false;
        self.error_message = None;
    }

    pub fn is_editing(&self) -> bool {
        self.task_id.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    // Move the cursor one line BELOW the current one.
    // An overflow should be prevented, and the horizontal cursor position should be preserved if possible
    pub fn move_cursor_down(&mut self) {
        let (x, y) = self.cursor_position;
        let future_y_position = (y + 1).min(LAST_LINE);
        self.cursor_position = (x.min(self.line_length(future_y_position)), future_y_position);
    }

    // Move the cursor one line ABOVE the current one.
    pub fn move_cursor_up(&mut self) {
        let (x, y) = self.cursor_position;
        if y > 0 {
            self.cursor_position = (x.min(self.line_length(y - 1)), y - 1);
        }
    }

    // Move the cursor one char LEFT to the current one.
    // On the priority line this steps the priority instead
    pub fn move_cursor_left(&mut self) {
        let (x, y) = self.cursor_position;
        if y == PRIORITY_LINE {
            self.content.priority = self.content.priority.next().next();
        } else if x > 0 {
            self.cursor_position = (x - 1, y);
        }
    }

    // Move the cursor one char RIGHT to the current one.
    pub fn move_cursor_right(&mut self) {
        let (x, y) = self.cursor_position;
        if y == PRIORITY_LINE {
            self.content.priority = self.content.priority.next();
        } else {
            self.cursor_position = ((x + 1).min(self.line_length(y)), y);
        }
    }

    // Delete the char before the cursor
    pub fn delete_char(&mut self) {
        let (x, y) = self.cursor_position;
        if x == 0 {
            return;
        }
        if let Some(field) = self.field_at_y_pos(y) {
            remove_char_at(field, x - 1);
            self.cursor_position = (x - 1, y);
        }
    }

    // Handles the input of a char by inserting it at the cursor of the active field
    pub fn input(&mut self, to_insert: char) {
        let (x, y) = self.cursor_position;
        if y == PRIORITY_LINE {
            match to_insert.to_ascii_lowercase() {
                'l' => self.content.priority = Priority::Low,
                'm' => self.content.priority = Priority::Medium,
                'h' => self.content.priority = Priority::High,
                ' ' => self.content.priority = self.content.priority.next(),
                _ => {}
            }
            return;
        }
        if let Some(field) = self.field_at_y_pos(y) {
            insert_char_at(field, x, to_insert);
            self.cursor_position = (x + 1, y);
        }
    }

    // Maps the vertical cursor position to the text field it edits
    fn field_at_y_pos(&mut self, y_position: usize) -> Option<&mut String> {
        match y_position {
            0 => Some(&mut self.content.title),
            1 => Some(&mut self.content.description),
            2 => Some(&mut self.content.due_date),
            _ => None,
        }
    }

    fn line_length(&self, y_position: usize) -> usize {
        match y_position {
            0 => self.content.title.chars().count(),
            1 => self.content.description.chars().count(),
            2 => self.content.due_date.chars().count(),
            _ => 0,
        }
    }

    // Validate the form and build the task it describes
    pub fn build_task(&self) -> Result<Task, String> {
        let content = &self.content;
        let title = content.title.trim();
        if title.is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        let date = NaiveDate::parse_from_str(content.due_date.trim(), DATE_FORMAT)
            .map_err(|_| "Date should be in format dd.mm.yyyy".to_string())?;
        let due_date = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| "Date should be in format dd.mm.yyyy".to_string())?
            .and_utc();

        Ok(Task {
            id: self.task_id,
            title: title.to_string(),
            description: content.description.trim().to_string(),
            due_date,
            priority: content.priority,
            completed: self.completed,
        })
    }

    // Saves the task to the database; on failure the dialog stays open with a message
    pub fn save_task(&mut self, tasks: &mut TaskList) {
        let task = match self.build_task() {
            Ok(task) => task,
            Err(message) => {
                self.error_message = Some(message);
                return;
            }
        };

        if let Err(err) = tasks.save_task(&task) {
            warn!("event=task_save module=task_edit status=error error={err}");
            self.error_message = Some(format!("Failed to save the task: {err}"));
            return;
        }

        self.error_message = None;
        self.dialog_active = false;
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn insert_char_at(text: &mut String, char_index: usize, c: char) {
    let at = byte_index(text, char_index);
    text.insert(at, c);
}

fn remove_char_at(text: &mut String, char_index: usize) {
    let at = byte_index(text, char_index);
    if at < text.len() {
        text.remove(at);
    }
}

// Returns the UI content for the task edit dialog
pub fn get_task_edit_ui<'a>(state: &TaskEditDialogState, palette: &Palette) -> Vec<Line<'a>> {
    let gray_text = Style::new().fg(palette.muted);
    let normal_text = Style::new().fg(palette.foreground);
    let cursor = Style::new().fg(palette.background).bg(palette.foreground);
    let mut text = Vec::new();

    struct TextDialogInputLine {
        prefix: &'static str,
        placeholder: &'static str,
        value: String,
    }

    // Define the text lines of the dialog; priority is drawn separately
    let content = &state.content;
    let lines = [
        TextDialogInputLine {
            prefix: "Title:       ",
            placeholder: "My task name",
            value: content.title.clone(),
        },
        TextDialogInputLine {
            prefix: "Description: ",
            placeholder: "My description",
            value: content.description.clone(),
        },
        TextDialogInputLine {
            prefix: "Due date:    ",
            placeholder: "23.11.2023",
            value: content.due_date.clone(),
        },
    ];

    let (cursor_x, cursor_y) = state.cursor_position;

    for (i, line) in lines.iter().enumerate() {
        let mut spans = vec![Span::styled(line.prefix, normal_text)];

        if line.value.is_empty() {
            // If the line is empty, a placeholder is displayed
            if cursor_y == i {
                // Line is selected. First char is highlighted, the rest is gray
                spans.push(Span::styled(
                    line.placeholder.chars().take(1).collect::<String>(),
                    cursor,
                ));
                spans.push(Span::styled(
                    line.placeholder.chars().skip(1).collect::<String>(),
                    gray_text,
                ));
            } else {
                spans.push(Span::styled(line.placeholder, gray_text));
            }
        } else if cursor_y == i {
            // All chars are plain, except for the one at the cursor position which is highlighted
            spans.push(Span::styled(
                line.value.chars().take(cursor_x).collect::<String>(),
                normal_text,
            ));
            let under_cursor: String = line.value.chars().skip(cursor_x).take(1).collect();
            spans.push(Span::styled(
                if under_cursor.is_empty() {
                    " ".to_string()
                } else {
                    under_cursor
                },
                cursor,
            ));
            spans.push(Span::styled(
                line.value.chars().skip(cursor_x + 1).collect::<String>(),
                normal_text,
            ));
        } else {
            spans.push(Span::styled(line.value.clone(), normal_text));
        }

        text.push(Line::from(spans));
    }

    let mut priority_spans = vec![Span::styled("Priority:    ", normal_text)];
    if cursor_y == PRIORITY_LINE {
        priority_spans.push(Span::styled("< ", cursor));
    }
    priority_spans.push(priority_badge(content.priority, palette));
    if cursor_y == PRIORITY_LINE {
        priority_spans.push(Span::styled(" >", cursor));
    }
    text.push(Line::from(priority_spans));

    text.push(Line::raw(""));

    // Display the error message if there is one
    if let Some(ref error_message) = state.error_message {
        text.push(Line::styled(error_message.clone(), Style::new().fg(Color::Red)));
        text.push(Line::raw(""));
    }

    // Display the help text
    text.push(Line::styled(
        "Enter - save, Esc - cancel, ←/→ or l/m/h - priority",
        normal_text,
    ));

    text
}
