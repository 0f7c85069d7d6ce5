use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::user_repository::{SpotifyUserUpsert, UserRepository};
use crate::models::user::User;

/// In-memory repository mirroring the Postgres upsert semantics, including
/// the COALESCE merge of optional profile fields.
#[derive(Default)]
pub struct MockDb {
    pub users: Mutex<HashMap<Uuid, User>>,
    pub should_fail: bool,
}

impl MockDb {
    pub fn with_user(user: User) -> Self {
        let db = MockDb::default();
        db.users.lock().unwrap().insert(user.id, user);
        db
    }

    pub fn user(&self, user_id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&user_id).cloned()
    }

    pub fn user_by_spotify_id(&self, spotify_id: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|user| user.spotify_id.as_deref() == Some(spotify_id))
            .cloned()
    }

    fn fail(&self) -> Result<(), sqlx::Error> {
        if self.should_fail {
            return Err(sqlx::Error::Protocol("mock db failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        self.fail()?;
        Ok(self.user(user_id))
    }

    async fn upsert_spotify_user(&self, upsert: &SpotifyUserUpsert) -> Result<User, sqlx::Error> {
        self.fail()?;
        let mut users = self.users.lock().unwrap();

        let existing_id = users
            .values()
            .find(|user| user.spotify_id.as_deref() == Some(upsert.spotify_id.as_str()))
            .map(|user| user.id);

        let user = match existing_id {
            Some(id) => {
                let user = users.get_mut(&id).expect("user present");
                user.name = upsert.name.clone();
                user.email = upsert.email.clone().or(user.email.take());
                user.spotify_display_name = upsert.display_name.clone();
                user.avatar_url = upsert.avatar_url.clone().or(user.avatar_url.take());
                user.country = upsert.country.clone().or(user.country.take());
                user.product = upsert.product.clone().or(user.product.take());
                user.followers_count = upsert.followers_count.or(user.followers_count);
                user.explicit_content_filter =
                    upsert.explicit_content_filter.or(user.explicit_content_filter);
                user.spotify_access_token = Some(upsert.access_token.clone());
                user.spotify_refresh_token = upsert
                    .refresh_token
                    .clone()
                    .or(user.spotify_refresh_token.take());
                user.spotify_token_expires_at = Some(upsert.token_expires_at);
                user.clone()
            }
            None => {
                let user = User {
                    id: Uuid::new_v4(),
                    name: upsert.name.clone(),
                    email: upsert.email.clone(),
                    spotify_id: Some(upsert.spotify_id.clone()),
                    spotify_display_name: upsert.display_name.clone(),
                    avatar_url: upsert.avatar_url.clone(),
                    country: upsert.country.clone(),
                    product: upsert.product.clone(),
                    followers_count: upsert.followers_count,
                    explicit_content_filter: upsert.explicit_content_filter,
                    spotify_access_token: Some(upsert.access_token.clone()),
                    spotify_refresh_token: upsert.refresh_token.clone(),
                    spotify_token_expires_at: Some(upsert.token_expires_at),
                    created_at: OffsetDateTime::now_utc(),
                };
                users.insert(user.id, user.clone());
                user
            }
        };

        Ok(user)
    }

    async fn update_spotify_access_token(
        &self,
        user_id: Uuid,
        access_token: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), sqlx::Error> {
        self.fail()?;
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&user_id).ok_or(sqlx::Error::RowNotFound)?;
        user.spotify_access_token = Some(access_token.to_string());
        user.spotify_token_expires_at = Some(expires_at);
        Ok(())
    }

    async fn clear_spotify_tokens(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        self.fail()?;
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&user_id).ok_or(sqlx::Error::RowNotFound)?;
        user.spotify_access_token = None;
        user.spotify_refresh_token = None;
        user.spotify_token_expires_at = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn upsert_snapshot(followers: Option<i32>, refresh_token: Option<&str>) -> SpotifyUserUpsert {
        SpotifyUserUpsert {
            spotify_id: "u1".into(),
            name: "Alice".into(),
            email: Some("a@example.com".into()),
            display_name: Some("Alice".into()),
            avatar_url: None,
            country: None,
            product: Some("premium".into()),
            followers_count: followers,
            explicit_content_filter: Some(false),
            access_token: "at".into(),
            refresh_token: refresh_token.map(str::to_owned),
            token_expires_at: OffsetDateTime::now_utc() + Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn second_upsert_overwrites_profile_snapshot() {
        let db = MockDb::default();

        let first = db
            .upsert_spotify_user(&upsert_snapshot(Some(10), Some("rt-1")))
            .await
            .unwrap();
        assert_eq!(first.followers_count, Some(10));

        let second = db
            .upsert_spotify_user(&upsert_snapshot(Some(20), Some("rt-2")))
            .await
            .unwrap();

        // same row, fully refreshed snapshot
        assert_eq!(second.id, first.id);
        assert_eq!(second.followers_count, Some(20));
        assert_eq!(second.spotify_refresh_token.as_deref(), Some("rt-2"));
        assert_eq!(db.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_refresh_token_keeps_the_stored_one() {
        let db = MockDb::default();

        db.upsert_spotify_user(&upsert_snapshot(Some(10), Some("rt-1")))
            .await
            .unwrap();
        let updated = db
            .upsert_spotify_user(&upsert_snapshot(Some(20), None))
            .await
            .unwrap();

        assert_eq!(updated.spotify_refresh_token.as_deref(), Some("rt-1"));
    }

    #[tokio::test]
    async fn clear_spotify_tokens_nulls_the_token_columns() {
        let db = MockDb::default();
        let user = db
            .upsert_spotify_user(&upsert_snapshot(Some(10), Some("rt-1")))
            .await
            .unwrap();

        db.clear_spotify_tokens(user.id).await.unwrap();

        let user = db.user(user.id).unwrap();
        assert!(user.spotify_access_token.is_none());
        assert!(user.spotify_refresh_token.is_none());
        assert!(user.spotify_token_expires_at.is_none());
        // profile row survives logout
        assert_eq!(user.spotify_id.as_deref(), Some("u1"));
    }
}
