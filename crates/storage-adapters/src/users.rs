use async_trait::async_trait;
use sqlx::Row;

use domains::{AppError, NewUser, Result, User, UserRepo};

use crate::rows;
use crate::{internal, write_error, SqliteStore};

#[async_trait]
impl UserRepo for SqliteStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(
            "INSERT INTO users (name, email, password_hash, role, mobile, age, location, bio, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.mobile)
        .bind(user.age)
        .bind(&user.location)
        .bind(&user.bio)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("Email already registered"))?;

        rows::user(&row).map_err(internal)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .map(|row| rows::user(&row))
            .transpose()
            .map_err(internal)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        let Some(row) = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
        else {
            return Ok(None);
        };

        let user = rows::user(&row).map_err(internal)?;
        let password_hash: String = row.try_get("password_hash").map_err(internal)?;
        Ok(Some((user, password_hash)))
    }

    async fn update_user(&self, user: User) -> Result<User> {
        let row = sqlx::query(
            "UPDATE users
             SET name = ?, mobile = ?, age = ?, location = ?, bio = ?, avatar_url = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&user.name)
        .bind(&user.mobile)
        .bind(user.age)
        .bind(&user.location)
        .bind(&user.bio)
        .bind(&user.avatar_url)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::not_found("User", user.id))?;

        rows::user(&row).map_err(internal)
    }

    async fn list_providers(&self, location: Option<String>) -> Result<Vec<User>> {
        let pattern = location
            .filter(|location| !location.trim().is_empty())
            .map(|location| format!("%{}%", location.trim()));

        let found = sqlx::query(
            "SELECT * FROM users
             WHERE role = 'provider' AND (? IS NULL OR location LIKE ?)
             ORDER BY id",
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        rows::all(found, rows::user).map_err(internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use domains::Role;

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let store = testing::store().await;
        let first = testing::user(&store, "bob@example.com", Role::Provider).await;

        let mut again = NewUser {
            name: "Other Bob".into(),
            email: first.email.clone(),
            password_hash: "hash".into(),
            role: Role::User,
            mobile: None,
            age: None,
            location: None,
            bio: None,
            created_at: first.created_at,
        };
        let err = store.create_user(again.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        again.email = "other@example.com".into();
        assert!(store.create_user(again).await.is_ok());
    }

    #[tokio::test]
    async fn test_credentials_carry_the_hash() {
        let store = testing::store().await;
        testing::user(&store, "bob@example.com", Role::Provider).await;

        let (user, hash) = store
            .find_credentials("bob@example.com")
            .await
            .unwrap()
            .expect("registered");
        assert_eq!(user.role, Role::Provider);
        assert_eq!(hash, "hash");
        assert!(store.find_credentials("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_providers_filter_by_location_case_insensitively() {
        let store = testing::store().await;
        testing::user(&store, "alice@example.com", Role::User).await;
        let bob = testing::user(&store, "bob@example.com", Role::Provider).await;

        let all = store.list_providers(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, bob.id);

        assert_eq!(store.list_providers(Some("leeds".into())).await.unwrap().len(), 1);
        assert!(store.list_providers(Some("York".into())).await.unwrap().is_empty());
    }
}
