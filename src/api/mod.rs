//! API handlers for Biblio REST endpoints

pub mod auth;
pub mod health;
pub mod loans;
pub mod notifications;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::IntoParams;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        // Tokens with an unknown role fail to decode here
        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Current local date, the default reference day of every endpoint
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Optional reference day for date-dependent endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DayQuery {
    /// Reference day (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
}

impl DayQuery {
    /// The requested day, or the current date when absent
    pub fn resolve(&self) -> Result<NaiveDate, AppError> {
        match self.date.as_deref() {
            None => Ok(today()),
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                AppError::InvalidDate(format!("'{}' is not a valid YYYY-MM-DD date", raw))
            }),
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Loans
        .route("/loans", post(loans::create_loan))
        .route("/loans/:id/return", post(loans::return_loan))
        .route("/loans/:id/lost", post(loans::declare_lost))
        .route("/users/:id/loans", get(loans::get_user_loans))
        // Notifications
        .route("/notifications/retards", get(notifications::overdue_loans))
        .route("/notifications/rappels/j30", get(notifications::reminders_30))
        .route("/notifications/rappels/j5", get(notifications::reminders_5))
        .route("/notifications/tous", get(notifications::all_reminders))
        .route("/notifications/mes-notifications", get(notifications::my_notifications))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
