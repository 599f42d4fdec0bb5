//! Loan model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookRef;
use super::notification::BorrowerRef;

/// Loan status, ids fixed by the statuses table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum LoanStatus {
    InProgress = 1,
    ReturnedOnTime = 2,
    ReturnedLate = 3,
    Lost = 4,
}

impl LoanStatus {
    /// Status of a loan closed on `returned_on`
    pub fn on_return(due_on: NaiveDate, returned_on: NaiveDate) -> Self {
        if returned_on <= due_on {
            LoanStatus::ReturnedOnTime
        } else {
            LoanStatus::ReturnedLate
        }
    }
}

impl TryFrom<i32> for LoanStatus {
    type Error = String;

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(LoanStatus::InProgress),
            2 => Ok(LoanStatus::ReturnedOnTime),
            3 => Ok(LoanStatus::ReturnedLate),
            4 => Ok(LoanStatus::Lost),
            _ => Err(format!("Unknown loan status id: {}", v)),
        }
    }
}

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub copy_id: i32,
    pub borrower_id: i32,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    pub returned_on: Option<NaiveDate>,
    pub status_id: i32,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.returned_on.is_none()
    }

    pub fn status(&self) -> Option<LoanStatus> {
        LoanStatus::try_from(self.status_id).ok()
    }
}

/// Open loan with its borrower and copy->book joined.
///
/// The references are optional so that a broken foreign key surfaces as a
/// resolution error in the notification engine instead of a dropped row.
#[derive(Debug, Clone)]
pub struct OpenLoan {
    pub id: i32,
    pub copy_id: i32,
    pub borrower_id: i32,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    pub borrower: Option<BorrowerRef>,
    pub book: Option<BookRef>,
}

/// Open loan as listed for a borrower
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub copy_id: i32,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    pub book: BookRef,
    pub is_overdue: bool,
}

/// Lend a copy to a borrower
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLoan {
    #[validate(range(min = 1, message = "Invalid copy id"))]
    pub copy_id: i32,
    #[validate(range(min = 1, message = "Invalid borrower id"))]
    pub borrower_id: i32,
    /// Defaults to today
    pub borrowed_on: Option<NaiveDate>,
    pub due_on: NaiveDate,
}

/// Close a loan (return or loss declaration)
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CloseLoan {
    /// Defaults to today
    pub on: Option<NaiveDate>,
}
