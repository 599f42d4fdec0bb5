//! Loan management endpoints

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::loan::{CloseLoan, CreateLoan, Loan, LoanDetails, LoanStatus},
    policy::{authorize, authorize_self_or_librarian, LIBRARIANS},
    AppState,
};

use super::{today, AuthenticatedUser};

/// Loan with its decoded status
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    pub loan: Loan,
    pub status: Option<LoanStatus>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        let status = loan.status();
        Self { loan, status }
    }
}

/// Get open loans for a specific user
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's open loans", body = Vec<LoanDetails>),
        (status = 403, description = "Not the caller and not a librarian"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    authorize_self_or_librarian(&claims, user_id)?;

    let loans = state
        .services
        .loans
        .get_user_loans(user_id, today())
        .await?;
    Ok(Json(loans))
}

/// Lend a copy to a borrower
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Librarians only"),
        (status = 404, description = "Borrower or copy not found"),
        (status = 422, description = "Copy already lent")
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    authorize(&claims, LIBRARIANS)?;

    let loan = state
        .services
        .loans
        .create_loan(request, today())
        .await?;

    Ok((StatusCode::CREATED, Json(loan.into())))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body = CloseLoan,
    responses(
        (status = 200, description = "Loan returned", body = LoanResponse),
        (status = 403, description = "Librarians only"),
        (status = 404, description = "Loan not found"),
        (status = 422, description = "Loan already closed")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
    body: Bytes,
) -> AppResult<Json<LoanResponse>> {
    authorize(&claims, LIBRARIANS)?;

    let returned_on = parse_close_request(&body)?.on.unwrap_or_else(today);

    let loan = state.services.loans.return_loan(loan_id, returned_on).await?;
    Ok(Json(loan.into()))
}

/// Declare the copy of a loan lost
#[utoipa::path(
    post,
    path = "/loans/{id}/lost",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body = CloseLoan,
    responses(
        (status = 200, description = "Loan closed as lost", body = LoanResponse),
        (status = 403, description = "Librarians only"),
        (status = 404, description = "Loan not found"),
        (status = 422, description = "Loan already closed")
    )
)]
pub async fn declare_lost(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
    body: Bytes,
) -> AppResult<Json<LoanResponse>> {
    authorize(&claims, LIBRARIANS)?;

    let declared_on = parse_close_request(&body)?.on.unwrap_or_else(today);

    let loan = state.services.loans.declare_lost(loan_id, declared_on).await?;
    Ok(Json(loan.into()))
}

/// Body of a close request; an empty body closes the loan today
fn parse_close_request(body: &[u8]) -> AppResult<CloseLoan> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CloseLoan::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))
}
