use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// Profile record. At most one per user, enforced by the unique constraint
/// on user_id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: Option<String>,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub hobbies: Vec<String>,
    pub profile_picture: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Profile {
    /// Insert a profile for a user. Under concurrent creates the unique
    /// constraint lets exactly one succeed; the loser gets `ProfileExists`.
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        description: Option<&str>,
        likes: &[String],
        dislikes: &[String],
        hobbies: &[String],
        profile_picture: Option<&str>,
    ) -> Result<Profile, ApiError> {
        let res = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, description, likes, dislikes, hobbies, profile_picture)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, description, likes, dislikes, hobbies, profile_picture,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(description)
        .bind(likes)
        .bind(dislikes)
        .bind(hobbies)
        .bind(profile_picture)
        .fetch_one(db)
        .await;

        match res {
            Ok(profile) => Ok(profile),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(ApiError::ProfileExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, description, likes, dislikes, hobbies, profile_picture,
                   created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, description, likes, dislikes, hobbies, profile_picture,
                   created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Full scan, tiny-scale only (same caveat as user listing).
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, description, likes, dislikes, hobbies, profile_picture,
                   created_at, updated_at
            FROM profiles
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(profiles)
    }

    /// Write the merged field set back. Callers compute the merge; this sets
    /// every mutable column plus updated_at.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        description: Option<&str>,
        likes: &[String],
        dislikes: &[String],
        hobbies: &[String],
        profile_picture: Option<&str>,
    ) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
               SET description = $2,
                   likes = $3,
                   dislikes = $4,
                   hobbies = $5,
                   profile_picture = $6,
                   updated_at = now()
             WHERE id = $1
            RETURNING id, user_id, description, likes, dislikes, hobbies, profile_picture,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(description)
        .bind(likes)
        .bind(dislikes)
        .bind(hobbies)
        .bind(profile_picture)
        .fetch_one(db)
        .await?;
        Ok(profile)
    }
}
