//! Database repository for admin accounts.

use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        models::users::{Role, UserAccount, UserCreateDBRequest},
    },
    types::{UserId, abbrev_uuid},
};

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    id: UserId,
    email: String,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<(Vec<Role>, User)> for UserAccount {
    fn from((roles, user): (Vec<Role>, User)) -> Self {
        Self {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
            roles,
            created_at: user.created_at,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    async fn roles_for(&mut self, user_id: UserId) -> Result<Vec<Role>> {
        let roles = sqlx::query_scalar::<_, Role>("SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role")
            .bind(user_id)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(roles)
    }

    #[instrument(skip(self, request), err)]
    pub async fn create(&mut self, request: &UserCreateDBRequest) -> Result<UserAccount> {
        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id, email, password_hash, created_at",
        )
        .bind(&request.email)
        .bind(&request.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        let mut roles = vec![Role::User];
        if request.is_admin {
            roles.insert(0, Role::Admin);
        }
        for role in &roles {
            sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
                .bind(user.id)
                .bind(role)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(UserAccount::from((roles, user)))
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserAccount>> {
        let user = sqlx::query_as::<_, User>("SELECT id, email, password_hash, created_at FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        match user {
            Some(user) => {
                let roles = self.roles_for(user.id).await?;
                Ok(Some(UserAccount::from((roles, user))))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, password_hash), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn set_password_hash(&mut self, id: UserId, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&mut *self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn grant_admin(&mut self, id: UserId) -> Result<()> {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT (user_id, role) DO NOTHING")
            .bind(id)
            .bind(Role::Admin)
            .execute(&mut *self.db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_admin_and_lookup_by_email(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo
            .create(&UserCreateDBRequest {
                email: "owner@example.com".to_string(),
                password_hash: Some("hash".to_string()),
                is_admin: true,
            })
            .await
            .unwrap();
        assert!(created.is_admin());

        let found = repo.get_user_by_email("owner@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(found.is_admin());
        assert!(found.roles.contains(&Role::User));

        assert!(repo.get_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_grant_admin_is_idempotent(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo
            .create(&UserCreateDBRequest {
                email: "editor@example.com".to_string(),
                password_hash: None,
                is_admin: false,
            })
            .await
            .unwrap();
        assert!(!user.is_admin());

        repo.grant_admin(user.id).await.unwrap();
        repo.grant_admin(user.id).await.unwrap();
        repo.set_password_hash(user.id, "new-hash").await.unwrap();

        let found = repo.get_user_by_email("editor@example.com").await.unwrap().unwrap();
        assert!(found.is_admin());
        assert_eq!(found.password_hash.as_deref(), Some("new-hash"));
    }
}
