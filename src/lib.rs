pub mod app;
pub mod chat;
pub mod config;
pub mod event;
pub mod logging;
pub mod tui;
pub mod ui;
