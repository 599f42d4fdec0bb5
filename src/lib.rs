//! Biblio Library Management System
//!
//! REST JSON backend for a school library: loans of book copies, JWT
//! authentication with group-based roles, and due-date notifications
//! (overdue loans, J-30 and J-5 reminders).

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
