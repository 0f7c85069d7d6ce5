use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::user_repository::{SpotifyUserUpsert, UserRepository};
use crate::models::user::User;

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

const USER_COLUMNS: &str = r#"
    id,
    name,
    email,
    spotify_id,
    spotify_display_name,
    avatar_url,
    country,
    product,
    followers_count,
    explicit_content_filter,
    spotify_access_token,
    spotify_refresh_token,
    spotify_token_expires_at,
    created_at
"#;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn upsert_spotify_user(&self, upsert: &SpotifyUserUpsert) -> Result<User, sqlx::Error> {
        // Single statement so two concurrent first logins for the same
        // spotify_id cannot race a create against an update. COALESCE keeps
        // previously stored values when the new snapshot omits a field.
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (
                id,
                name,
                email,
                spotify_id,
                spotify_display_name,
                avatar_url,
                country,
                product,
                followers_count,
                explicit_content_filter,
                spotify_access_token,
                spotify_refresh_token,
                spotify_token_expires_at,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (spotify_id) DO UPDATE
            SET name = EXCLUDED.name,
                email = COALESCE(EXCLUDED.email, users.email),
                spotify_display_name = EXCLUDED.spotify_display_name,
                avatar_url = COALESCE(EXCLUDED.avatar_url, users.avatar_url),
                country = COALESCE(EXCLUDED.country, users.country),
                product = COALESCE(EXCLUDED.product, users.product),
                followers_count = COALESCE(EXCLUDED.followers_count, users.followers_count),
                explicit_content_filter =
                    COALESCE(EXCLUDED.explicit_content_filter, users.explicit_content_filter),
                spotify_access_token = EXCLUDED.spotify_access_token,
                spotify_refresh_token =
                    COALESCE(EXCLUDED.spotify_refresh_token, users.spotify_refresh_token),
                spotify_token_expires_at = EXCLUDED.spotify_token_expires_at
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&upsert.name)
        .bind(&upsert.email)
        .bind(&upsert.spotify_id)
        .bind(&upsert.display_name)
        .bind(&upsert.avatar_url)
        .bind(&upsert.country)
        .bind(&upsert.product)
        .bind(upsert.followers_count)
        .bind(upsert.explicit_content_filter)
        .bind(&upsert.access_token)
        .bind(&upsert.refresh_token)
        .bind(upsert.token_expires_at)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.pool)
        .await
    }

    async fn update_spotify_access_token(
        &self,
        user_id: Uuid,
        access_token: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET spotify_access_token = $2,
                spotify_token_expires_at = $3
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(access_token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear_spotify_tokens(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET spotify_access_token = NULL,
                spotify_refresh_token = NULL,
                spotify_token_expires_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
