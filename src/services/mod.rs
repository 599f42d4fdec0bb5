//! Business logic services

pub mod auth;
pub mod loans;
pub mod notifications;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub loans: loans::LoansService,
    pub notifications: notifications::NotificationsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            loans: loans::LoansService::new(repository.clone()),
            notifications: notifications::NotificationsService::new(Arc::new(
                repository.loans.clone(),
            )),
            repository,
        }
    }
}
