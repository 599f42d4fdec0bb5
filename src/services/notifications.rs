//! Due-date notification engine
//!
//! Classifies open loans relative to a caller-supplied `today`:
//!
//! - overdue: `due_on < today`
//! - J-30 reminder: `due_on == today + 30 days`
//! - J-5 reminder: `due_on == today + 5 days`
//!
//! Reminders match one exact day, so a loan is reminded once per threshold.
//! Every bucket of a single call is computed from the same `today`.

use std::sync::Arc;

use chrono::{Days, NaiveDate};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::OpenLoan,
        notification::{AllReminders, Bucket, LoanNotice, UserNotifications},
    },
    repository::loans::{DueFilter, LoanSource, OpenLoanFilter},
};

#[derive(Clone)]
pub struct NotificationsService {
    source: Arc<dyn LoanSource>,
}

impl NotificationsService {
    pub fn new(source: Arc<dyn LoanSource>) -> Self {
        Self { source }
    }

    /// Open loans overdue as of `today`
    pub async fn overdue_loans(&self, today: NaiveDate) -> AppResult<Vec<LoanNotice>> {
        self.bucket(Bucket::Overdue, today, None).await
    }

    /// Open loans due in exactly 30 days
    pub async fn reminders_30(&self, today: NaiveDate) -> AppResult<Vec<LoanNotice>> {
        self.bucket(Bucket::Reminder30, today, None).await
    }

    /// Open loans due in exactly 5 days
    pub async fn reminders_5(&self, today: NaiveDate) -> AppResult<Vec<LoanNotice>> {
        self.bucket(Bucket::Reminder5, today, None).await
    }

    pub async fn all_reminders(&self, today: NaiveDate) -> AppResult<AllReminders> {
        self.collect(today, None).await
    }

    /// The three buckets restricted to one borrower, with their total
    pub async fn reminders_for_user(&self, today: NaiveDate, user_id: i32) -> AppResult<UserNotifications> {
        let notifications: UserNotifications = self.collect(today, Some(user_id)).await?.into();
        tracing::debug!(
            user_id,
            total = notifications.total_count,
            "Computed user notifications"
        );
        Ok(notifications)
    }

    async fn collect(&self, today: NaiveDate, borrower_id: Option<i32>) -> AppResult<AllReminders> {
        Ok(AllReminders {
            overdue: self.bucket(Bucket::Overdue, today, borrower_id).await?,
            reminder_30: self.bucket(Bucket::Reminder30, today, borrower_id).await?,
            reminder_5: self.bucket(Bucket::Reminder5, today, borrower_id).await?,
        })
    }

    async fn bucket(
        &self,
        bucket: Bucket,
        today: NaiveDate,
        borrower_id: Option<i32>,
    ) -> AppResult<Vec<LoanNotice>> {
        let filter = OpenLoanFilter {
            due: due_filter(bucket, today)?,
            borrower_id,
        };

        let loans = self.source.open_loans(filter).await?;
        tracing::debug!(?bucket, %today, count = loans.len(), "Fetched open loans");

        loans
            .into_iter()
            .map(|loan| project(loan, bucket, today))
            .collect()
    }
}

/// Storage predicate selecting the loans of `bucket`.
///
/// Fails with [`AppError::InvalidDate`] when the reminder day falls past the
/// last representable date.
pub fn due_filter(bucket: Bucket, today: NaiveDate) -> AppResult<DueFilter> {
    match bucket.days_before_due() {
        None => Ok(DueFilter::Before(today)),
        Some(days) => today
            .checked_add_days(Days::new(days.unsigned_abs()))
            .map(DueFilter::On)
            .ok_or_else(|| {
                AppError::InvalidDate(format!("{} is out of the supported date range", today))
            }),
    }
}

/// Build the display record of an open loan.
///
/// Fails with [`AppError::Resolution`] when the borrower or the book of the
/// loan is missing: the whole call is aborted rather than returning a
/// partial list.
pub fn project(loan: OpenLoan, bucket: Bucket, today: NaiveDate) -> AppResult<LoanNotice> {
    let borrower = loan.borrower.ok_or_else(|| {
        AppError::Resolution(format!(
            "loan {} references unknown borrower {}",
            loan.id, loan.borrower_id
        ))
    })?;
    let book = loan.book.ok_or_else(|| {
        AppError::Resolution(format!(
            "loan {} references copy {} with no book",
            loan.id, loan.copy_id
        ))
    })?;

    let (days_overdue, days_remaining) = match bucket.days_before_due() {
        None => (Some((today - loan.due_on).num_days()), None),
        Some(days) => (None, Some(days)),
    };

    Ok(LoanNotice {
        loan_id: loan.id,
        borrowed_on: loan.borrowed_on,
        due_on: loan.due_on,
        days_overdue,
        days_remaining,
        borrower,
        book,
        copy_id: loan.copy_id,
    })
}
