pub mod models;
pub mod preferences;
pub mod repository;
pub mod service;
pub mod settings;
pub mod storage;
pub mod task_edit;
pub mod task_list;
pub mod theme;
pub mod ui;
