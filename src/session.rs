use dashmap::DashMap;
use once_cell::sync::Lazy;
use sqlx::PgPool;
#[cfg(not(test))]
use sqlx::Row;
use time::{Duration, OffsetDateTime};
#[cfg(not(test))]
use tracing::{debug, warn};
use tracing::{error, info};
use uuid::Uuid;

/// How long an issued bearer session stays valid.
pub const SESSION_TTL_HOURS: i64 = 24 * 30;

#[derive(Clone, Debug)]
pub struct SessionData {
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

pub static SESSION_CACHE: Lazy<DashMap<Uuid, SessionData>> = Lazy::new(DashMap::new);

#[cfg(test)]
static TEST_SESSION_STORE: Lazy<DashMap<Uuid, SessionData>> = Lazy::new(DashMap::new);

#[cfg(test)]
pub fn reset_test_sessions() {
    TEST_SESSION_STORE.clear();
    SESSION_CACHE.clear();
}

#[cfg(test)]
pub fn insert_test_session(session_id: Uuid, session: SessionData) {
    TEST_SESSION_STORE.insert(session_id, session.clone());
    SESSION_CACHE.insert(session_id, session);
}

pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    ttl_hours: i64,
) -> Result<Uuid, sqlx::Error> {
    let session_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();
    let session = SessionData {
        user_id,
        created_at: now,
        expires_at: now + Duration::hours(ttl_hours.max(1)),
    };

    #[cfg(test)]
    {
        let _ = pool;
        insert_test_session(session_id, session);
        Ok(session_id)
    }

    #[cfg(not(test))]
    {
        sqlx::query(
            r#"
            INSERT INTO api_sessions (id, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(pool)
        .await
        .inspect_err(|err| error!(%session_id, %user_id, ?err, "failed to persist session"))?;

        SESSION_CACHE.insert(session_id, session);
        info!(%session_id, %user_id, "session created");
        Ok(session_id)
    }
}

pub async fn get_session(
    pool: &PgPool,
    session_id: Uuid,
) -> Result<Option<SessionData>, sqlx::Error> {
    #[cfg(test)]
    {
        let _ = pool;
        if let Some(entry) = TEST_SESSION_STORE.get(&session_id) {
            if entry.expires_at > OffsetDateTime::now_utc() {
                return Ok(Some(entry.clone()));
            }
            drop(entry);
            TEST_SESSION_STORE.remove(&session_id);
        }
        Ok(None)
    }

    #[cfg(not(test))]
    {
        if let Some(cached) = SESSION_CACHE.get(&session_id) {
            if cached.expires_at > OffsetDateTime::now_utc() {
                debug!(%session_id, "session cache hit");
                return Ok(Some(cached.clone()));
            }
            drop(cached);
            SESSION_CACHE.remove(&session_id);
        }

        let record = sqlx::query(
            r#"
            SELECT user_id, created_at, expires_at
            FROM api_sessions
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await
        .inspect_err(|err| error!(%session_id, ?err, "failed to load session"))?;

        let Some(record) = record else {
            return Ok(None);
        };

        let session = SessionData {
            user_id: record.try_get("user_id")?,
            created_at: record.try_get("created_at")?,
            expires_at: record.try_get("expires_at")?,
        };

        if session.expires_at <= OffsetDateTime::now_utc() {
            warn!(%session_id, "session expired in storage, removing");
            if let Err(err) = sqlx::query("DELETE FROM api_sessions WHERE id = $1")
                .bind(session_id)
                .execute(pool)
                .await
            {
                error!(%session_id, ?err, "failed to purge expired session");
            }
            return Ok(None);
        }

        SESSION_CACHE.insert(session_id, session.clone());
        Ok(Some(session))
    }
}

/// Removes every session belonging to the user. Returns the number of
/// sessions revoked; revoking a user with no sessions is a no-op.
pub async fn delete_sessions_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    SESSION_CACHE.retain(|_, session| session.user_id != user_id);

    #[cfg(test)]
    {
        let _ = pool;
        let matching = TEST_SESSION_STORE
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .count() as u64;
        TEST_SESSION_STORE.retain(|_, session| session.user_id != user_id);
        Ok(matching)
    }

    #[cfg(not(test))]
    {
        let result = sqlx::query("DELETE FROM api_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await
            .inspect_err(|err| error!(%user_id, ?err, "failed to revoke sessions"))?;

        let revoked = result.rows_affected();
        info!(%user_id, revoked, "sessions revoked");
        Ok(revoked)
    }
}
