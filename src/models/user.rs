use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    /// IANA identifier kept for clients; server-side aggregation windows
    /// are evaluated in UTC.
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            timezone: u.timezone,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub parent_token_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// A stored token can mint a new pair only while unrevoked and
    /// unexpired. Revoked tokens are handled separately by the refresh
    /// handler's reuse detection before this check.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(revoked: bool, expires_in_secs: i64) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "ab".repeat(32),
            expires_at: now + Duration::seconds(expires_in_secs),
            revoked,
            revoked_at: revoked.then(|| now),
            parent_token_id: Some(Uuid::new_v4()),
            created_at: now,
        }
    }

    #[test]
    fn unrevoked_unexpired_token_is_active() {
        assert!(token(false, 3600).is_active(Utc::now()));
    }

    #[test]
    fn expired_token_is_not_active() {
        assert!(!token(false, -1).is_active(Utc::now()));
    }

    #[test]
    fn revoked_token_is_not_active() {
        assert!(!token(true, 3600).is_active(Utc::now()));
    }
}
