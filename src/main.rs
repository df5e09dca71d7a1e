use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::error;
use ratatui::prelude::*;
use std::io;

use task_manager::app::preferences::{system_prefers_dark, PreferenceStore};
use task_manager::app::service::TaskService;
use task_manager::app::storage::Storage;
use task_manager::app::task_list::TaskList;
use task_manager::app::ui::{run_app, App};
use task_manager::config::{AppConfig, Cli};
use task_manager::error::AppError;
use task_manager::logging::{flush_logging, init_logging};

// Start the app.
// The terminal handling is based on:
// https://github.com/ratatui-org/ratatui/blob/main/examples/list.rs
fn main() {
    let cli = Cli::parse();
    let result = run(&cli);
    flush_logging();
    if let Err(err) = result {
        eprintln!("task-manager: {err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = AppConfig::from_cli(cli)?;
    init_logging(config.log_level, &config.log_dir)?;

    // Initialize connection to the database
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let storage = Storage::open(&config.db_path)?;
    let service = TaskService::new(Box::new(storage));
    let items = TaskList::with_items_from_service(service, config.undo_window)?;
    let app = App::new(
        items,
        PreferenceStore::new(&config.settings_path),
        system_prefers_dark(),
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, config.tick_rate);

    // Restore previous terminal state after exit
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!("event=app_loop module=main status=error error={err}");
    }
    Ok(res?)
}
