//! Due-date notification records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::book::BookRef;

/// Borrower identity shown alongside a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BorrowerRef {
    pub id: i32,
    pub lastname: String,
    pub firstname: String,
    pub email: String,
}

/// Notification bucket a loan falls into for a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Due date strictly before today
    Overdue,
    /// Due exactly 30 days from today
    Reminder30,
    /// Due exactly 5 days from today
    Reminder5,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Overdue, Bucket::Reminder30, Bucket::Reminder5];

    /// Days between today and the due date the reminder fires on
    pub fn days_before_due(&self) -> Option<i64> {
        match self {
            Bucket::Overdue => None,
            Bucket::Reminder30 => Some(30),
            Bucket::Reminder5 => Some(5),
        }
    }

    /// Bucket of an open loan due on `due_on`, seen from `today`
    pub fn classify(due_on: NaiveDate, today: NaiveDate) -> Option<Bucket> {
        let days_left = (due_on - today).num_days();
        if days_left < 0 {
            return Some(Bucket::Overdue);
        }
        Bucket::ALL
            .into_iter()
            .find(|bucket| bucket.days_before_due() == Some(days_left))
    }
}

/// Display record for one loan in a notification bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoanNotice {
    pub loan_id: i32,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    /// Set for overdue loans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<i64>,
    /// Set for J-30 and J-5 reminders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    pub borrower: BorrowerRef,
    pub book: BookRef,
    pub copy_id: i32,
}

/// Every notification of the day, by bucket
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AllReminders {
    pub overdue: Vec<LoanNotice>,
    pub reminder_30: Vec<LoanNotice>,
    pub reminder_5: Vec<LoanNotice>,
}

/// Notifications of a single borrower
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserNotifications {
    pub overdue: Vec<LoanNotice>,
    pub reminder_30: Vec<LoanNotice>,
    pub reminder_5: Vec<LoanNotice>,
    pub total_count: usize,
}

impl From<AllReminders> for UserNotifications {
    fn from(all: AllReminders) -> Self {
        let total_count = all.overdue.len() + all.reminder_30.len() + all.reminder_5.len();
        Self {
            overdue: all.overdue,
            reminder_30: all.reminder_30,
            reminder_5: all.reminder_5,
            total_count,
        }
    }
}
