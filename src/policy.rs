//! Role-based access policy
//!
//! Handlers call [`authorize`] explicitly before touching a service, so the
//! allowed roles of every endpoint are visible at the call site.

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, UserClaims},
};

/// Roles allowed to manage loans and see library-wide notifications
pub const LIBRARIANS: &[Role] = &[Role::Librarian];

/// Any authenticated role
pub const EVERYONE: &[Role] = &Role::ALL;

/// Notification views exposed over the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationView {
    Overdue,
    Reminder30,
    Reminder5,
    All,
    /// The caller's own notifications
    Mine,
}

impl NotificationView {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            NotificationView::Overdue
            | NotificationView::Reminder30
            | NotificationView::Reminder5
            | NotificationView::All => LIBRARIANS,
            NotificationView::Mine => EVERYONE,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            NotificationView::Overdue => "overdue loans",
            NotificationView::Reminder30 => "J-30 reminders",
            NotificationView::Reminder5 => "J-5 reminders",
            NotificationView::All => "all reminders",
            NotificationView::Mine => "own notifications",
        }
    }
}

/// Whether `role` is one of `allowed`
pub fn can_access(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

/// Reject callers whose role is not in `allowed`
pub fn authorize(claims: &UserClaims, allowed: &[Role]) -> AppResult<()> {
    if can_access(claims.role, allowed) {
        Ok(())
    } else {
        tracing::warn!(user_id = claims.user_id, role = %claims.role, "Access denied");
        Err(AppError::Authorization(format!(
            "Role '{}' is not allowed to perform this action",
            claims.role
        )))
    }
}

/// Reject callers not allowed to open a notification view
pub fn authorize_view(claims: &UserClaims, view: NotificationView) -> AppResult<()> {
    authorize(claims, view.allowed_roles()).map_err(|_| {
        AppError::Authorization(format!(
            "Role '{}' cannot access {}",
            claims.role,
            view.name()
        ))
    })
}

/// Librarians may act on any user, others only on themselves
pub fn authorize_self_or_librarian(claims: &UserClaims, user_id: i32) -> AppResult<()> {
    if claims.user_id == user_id {
        Ok(())
    } else {
        authorize(claims, LIBRARIANS)
    }
}
