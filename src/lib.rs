// Terminal task manager: SQLite tasks, TOML preferences, ratatui front end

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

pub use app::models::{Priority, Task};
pub use app::preferences::{PreferenceStore, Preferences, ThemeMode};
pub use app::repository::TaskRepository;
pub use app::service::TaskService;
pub use app::storage::Storage;
pub use app::task_list::{FilterOption, SortOption, TaskList};
pub use error::{AppError, StorageError};
