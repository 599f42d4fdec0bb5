//! Loan management service

use chrono::NaiveDate;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookCopy,
        loan::{CreateLoan, Loan, LoanDetails, LoanStatus},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get open loans for a user
    pub async fn get_user_loans(&self, user_id: i32, today: NaiveDate) -> AppResult<Vec<LoanDetails>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.get_user_loans(user_id, today).await
    }

    /// Lend a copy (creates an in-progress loan)
    pub async fn create_loan(&self, loan: CreateLoan, today: NaiveDate) -> AppResult<Loan> {
        loan.validate()?;
        let borrowed_on = loan.borrowed_on.unwrap_or(today);
        check_loan_dates(borrowed_on, loan.due_on)?;

        self.repository.users.get_by_id(loan.borrower_id).await?;
        let copy = self.repository.loans.get_copy(loan.copy_id).await?;
        let lent = self.repository.loans.copy_has_open_loan(loan.copy_id).await?;
        check_lendable(&copy, lent)?;

        let created = self
            .repository
            .loans
            .create(loan.copy_id, loan.borrower_id, borrowed_on, loan.due_on)
            .await?;

        tracing::info!(
            loan_id = created.id,
            copy_id = created.copy_id,
            borrower_id = created.borrower_id,
            due_on = %created.due_on,
            "Loan created"
        );
        Ok(created)
    }

    /// Return a borrowed copy
    pub async fn return_loan(&self, loan_id: i32, returned_on: NaiveDate) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;
        let status = closing_status(&loan, returned_on, false)?;

        let closed = self.repository.loans.close(loan_id, returned_on, status).await?;
        tracing::info!(loan_id, ?status, "Loan returned");
        Ok(closed)
    }

    /// Declare the copy of a loan lost
    pub async fn declare_lost(&self, loan_id: i32, declared_on: NaiveDate) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;
        let status = closing_status(&loan, declared_on, true)?;

        let closed = self.repository.loans.close(loan_id, declared_on, status).await?;
        tracing::warn!(loan_id, copy_id = closed.copy_id, "Copy declared lost");
        Ok(closed)
    }
}

fn check_loan_dates(borrowed_on: NaiveDate, due_on: NaiveDate) -> AppResult<()> {
    if due_on < borrowed_on {
        return Err(AppError::Validation(format!(
            "Due date {} is before borrow date {}",
            due_on, borrowed_on
        )));
    }
    Ok(())
}

/// A copy can be lent when it has no open loan and was not declared lost
fn check_lendable(copy: &BookCopy, has_open_loan: bool) -> AppResult<()> {
    if has_open_loan {
        return Err(AppError::BusinessRule(format!("Copy {} is already lent", copy.id)));
    }
    if !copy.available {
        return Err(AppError::BusinessRule(format!("Copy {} is not available", copy.id)));
    }
    Ok(())
}

/// Status a loan gets when closed on `on`
fn closing_status(loan: &Loan, on: NaiveDate, lost: bool) -> AppResult<LoanStatus> {
    if !loan.is_open() {
        return Err(AppError::BusinessRule(format!("Loan {} is already closed", loan.id)));
    }
    if on < loan.borrowed_on {
        return Err(AppError::Validation(format!(
            "Closing date {} is before borrow date {}",
            on, loan.borrowed_on
        )));
    }

    Ok(if lost {
        LoanStatus::Lost
    } else {
        LoanStatus::on_return(loan.due_on, on)
    })
}
