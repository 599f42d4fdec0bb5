//! Due-date notification endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::notification::{AllReminders, LoanNotice, UserNotifications},
    policy::{authorize_view, NotificationView},
    AppState,
};

use super::{AuthenticatedUser, DayQuery};

/// Open loans past their due date
#[utoipa::path(
    get,
    path = "/notifications/retards",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(DayQuery),
    responses(
        (status = 200, description = "Overdue loans", body = Vec<LoanNotice>),
        (status = 400, description = "Invalid date"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Librarians only")
    )
)]
pub async fn overdue_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<Vec<LoanNotice>>> {
    authorize_view(&claims, NotificationView::Overdue)?;
    let today = query.resolve()?;

    let notices = state.services.notifications.overdue_loans(today).await?;
    Ok(Json(notices))
}

/// Open loans due in exactly 30 days
#[utoipa::path(
    get,
    path = "/notifications/rappels/j30",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(DayQuery),
    responses(
        (status = 200, description = "J-30 reminders", body = Vec<LoanNotice>),
        (status = 400, description = "Invalid date"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Librarians only")
    )
)]
pub async fn reminders_30(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<Vec<LoanNotice>>> {
    authorize_view(&claims, NotificationView::Reminder30)?;
    let today = query.resolve()?;

    let notices = state.services.notifications.reminders_30(today).await?;
    Ok(Json(notices))
}

/// Open loans due in exactly 5 days
#[utoipa::path(
    get,
    path = "/notifications/rappels/j5",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(DayQuery),
    responses(
        (status = 200, description = "J-5 reminders", body = Vec<LoanNotice>),
        (status = 400, description = "Invalid date"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Librarians only")
    )
)]
pub async fn reminders_5(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<Vec<LoanNotice>>> {
    authorize_view(&claims, NotificationView::Reminder5)?;
    let today = query.resolve()?;

    let notices = state.services.notifications.reminders_5(today).await?;
    Ok(Json(notices))
}

/// Every notification of the day, grouped by bucket
#[utoipa::path(
    get,
    path = "/notifications/tous",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(DayQuery),
    responses(
        (status = 200, description = "All notifications", body = AllReminders),
        (status = 400, description = "Invalid date"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Librarians only")
    )
)]
pub async fn all_reminders(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<AllReminders>> {
    authorize_view(&claims, NotificationView::All)?;
    let today = query.resolve()?;

    let all = state.services.notifications.all_reminders(today).await?;
    Ok(Json(all))
}

/// Notifications of the authenticated user
#[utoipa::path(
    get,
    path = "/notifications/mes-notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(DayQuery),
    responses(
        (status = 200, description = "Caller's notifications", body = UserNotifications),
        (status = 400, description = "Invalid date"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_notifications(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<UserNotifications>> {
    authorize_view(&claims, NotificationView::Mine)?;
    let today = query.resolve()?;

    let notifications = state
        .services
        .notifications
        .reminders_for_user(today, claims.user_id)
        .await?;
    Ok(Json(notifications))
}
