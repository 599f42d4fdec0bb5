//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, User},
};

const USER_SELECT: &str = r#"
    SELECT u.id, u.lastname, u.firstname, u.email, u.password_hash,
           u.department_id, u.group_id, g.name AS role
    FROM users u
    JOIN groups g ON g.id = u.group_id
"#;

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!("{} WHERE u.id = $1", USER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (authentication identifier)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "{} WHERE LOWER(u.email) = LOWER($1)",
            USER_SELECT
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Insert a user into the group matching its role
    pub async fn create(&self, user: &NewUser) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (lastname, firstname, email, password_hash, group_id)
            VALUES ($1, $2, $3, $4, (SELECT id FROM groups WHERE name = $5))
            RETURNING id
            "#,
        )
        .bind(&user.lastname)
        .bind(&user.firstname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
