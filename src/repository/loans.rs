//! Loans repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookCopy, BookRef},
        loan::{Loan, LoanDetails, LoanStatus, OpenLoan},
        notification::BorrowerRef,
    },
};

/// Predicate over the due date of open loans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueFilter {
    /// `due_on < date`
    Before(NaiveDate),
    /// `due_on == date`
    On(NaiveDate),
}

impl DueFilter {
    pub fn matches(&self, due_on: NaiveDate) -> bool {
        match *self {
            DueFilter::Before(date) => due_on < date,
            DueFilter::On(date) => due_on == date,
        }
    }
}

/// Selection of open loans (`returned_on IS NULL` is always implied)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenLoanFilter {
    pub due: DueFilter,
    pub borrower_id: Option<i32>,
}

/// Read access to open loans, with borrower and book resolved in the same call
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanSource: Send + Sync {
    /// Open loans matching `filter`, ordered by due date then id
    async fn open_loans(&self, filter: OpenLoanFilter) -> AppResult<Vec<OpenLoan>>;
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get copy by ID
    pub async fn get_copy(&self, id: i32) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopy>("SELECT * FROM copies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))
    }

    /// Whether the copy is currently lent
    pub async fn copy_has_open_loan(&self, copy_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE copy_id = $1 AND returned_on IS NULL)",
        )
        .bind(copy_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Open loans of a borrower
    pub async fn get_user_loans(&self, user_id: i32, today: NaiveDate) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.copy_id, l.borrowed_on, l.due_on,
                   b.id AS book_id, b.title, b.author
            FROM loans l
            JOIN copies c ON c.id = l.copy_id
            JOIN books b ON b.id = c.book_id
            WHERE l.borrower_id = $1 AND l.returned_on IS NULL
            ORDER BY l.due_on, l.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let due_on: NaiveDate = row.get("due_on");
                LoanDetails {
                    id: row.get("id"),
                    copy_id: row.get("copy_id"),
                    borrowed_on: row.get("borrowed_on"),
                    due_on,
                    book: BookRef {
                        id: row.get("book_id"),
                        title: row.get("title"),
                        author: row.get("author"),
                    },
                    is_overdue: due_on < today,
                }
            })
            .collect())
    }

    /// Create an in-progress loan and mark the copy unavailable.
    ///
    /// Fails when the copy is lent or lost in the meantime.
    pub async fn create(
        &self,
        copy_id: i32,
        borrower_id: i32,
        borrowed_on: NaiveDate,
        due_on: NaiveDate,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let reserved = sqlx::query("UPDATE copies SET available = FALSE WHERE id = $1 AND available")
            .bind(copy_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if reserved == 0 {
            return Err(AppError::BusinessRule(format!("Copy {} is not available", copy_id)));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (copy_id, borrower_id, borrowed_on, due_on, status_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(copy_id)
        .bind(borrower_id)
        .bind(borrowed_on)
        .bind(due_on)
        .bind(LoanStatus::InProgress as i32)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::BusinessRule(format!("Copy {} is already lent", copy_id))
            }
            _ => AppError::Database(e),
        })?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Close an open loan with the given status.
    ///
    /// The copy becomes available again unless it was lost.
    pub async fn close(&self, loan_id: i32, closed_on: NaiveDate, status: LoanStatus) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET returned_on = $1, status_id = $2
            WHERE id = $3 AND returned_on IS NULL
            RETURNING *
            "#,
        )
        .bind(closed_on)
        .bind(status as i32)
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::BusinessRule("Loan already closed".to_string()))?;

        if status != LoanStatus::Lost {
            sqlx::query("UPDATE copies SET available = TRUE WHERE id = $1")
                .bind(loan.copy_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(loan)
    }
}

#[async_trait]
impl LoanSource for LoansRepository {
    async fn open_loans(&self, filter: OpenLoanFilter) -> AppResult<Vec<OpenLoan>> {
        let (due_condition, due_date) = match filter.due {
            DueFilter::Before(date) => ("l.due_on < $1", date),
            DueFilter::On(date) => ("l.due_on = $1", date),
        };

        let mut conditions = vec!["l.returned_on IS NULL", due_condition];
        if filter.borrower_id.is_some() {
            conditions.push("l.borrower_id = $2");
        }

        // LEFT JOINs keep loans whose references are broken so they can be reported
        let sql = format!(
            r#"
            SELECT l.id, l.copy_id, l.borrower_id, l.borrowed_on, l.due_on,
                   u.id AS user_id, u.lastname, u.firstname, u.email,
                   b.id AS book_id, b.title, b.author
            FROM loans l
            LEFT JOIN users u ON u.id = l.borrower_id
            LEFT JOIN copies c ON c.id = l.copy_id
            LEFT JOIN books b ON b.id = c.book_id
            WHERE {}
            ORDER BY l.due_on, l.id
            "#,
            conditions.join(" AND ")
        );

        let mut query = sqlx::query(&sql).bind(due_date);
        if let Some(borrower_id) = filter.borrower_id {
            query = query.bind(borrower_id);
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let borrower = row
                    .get::<Option<i32>, _>("user_id")
                    .map(|id| BorrowerRef {
                        id,
                        lastname: row.get("lastname"),
                        firstname: row.get("firstname"),
                        email: row.get("email"),
                    });
                let book = row.get::<Option<i32>, _>("book_id").map(|id| BookRef {
                    id,
                    title: row.get("title"),
                    author: row.get("author"),
                });

                OpenLoan {
                    id: row.get("id"),
                    copy_id: row.get("copy_id"),
                    borrower_id: row.get("borrower_id"),
                    borrowed_on: row.get("borrowed_on"),
                    due_on: row.get("due_on"),
                    borrower,
                    book,
                }
            })
            .collect())
    }
}
