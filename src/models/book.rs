//! Book and copy models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Physical copy of a book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookCopy {
    pub id: i32,
    pub book_id: i32,
    pub state_id: Option<i32>,
    pub available: bool,
    pub added_on: NaiveDate,
}

/// Book identity shown alongside a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookRef {
    pub id: i32,
    pub title: String,
    pub author: String,
}
