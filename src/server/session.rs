use std::collections::HashMap;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "portal.sid";

/// Sessions last one day from login.
pub fn session_ttl() -> Duration {
    Duration::days(1)
}

struct Session {
    user_id: String,
    expires_at: DateTime<Utc>,
}

pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create(&self, user_id: &str) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            user_id: user_id.to_string(),
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions.write().await.insert(id, session);
        id
    }

    /// The signed-in user, if the session exists and has not expired.
    /// Expired sessions are dropped here.
    pub async fn user_id(&self, id: &Uuid) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(id) {
            Some(s) if s.expires_at > Utc::now() => Some(s.user_id.clone()),
            Some(_) => {
                sessions.remove(id);
                None
            }
            None => None,
        }
    }

    pub async fn destroy(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// End every session belonging to `user_id`.
    pub async fn destroy_user(&self, user_id: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        before - sessions.len()
    }

    pub fn cookie(&self, id: Uuid) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.ttl.num_seconds()))
            .build()
    }
}

pub fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
}

pub fn clear_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_resolve_until_destroyed() {
        let store = SessionStore::new(session_ttl());
        let id = store.create("user-1").await;
        assert_eq!(store.user_id(&id).await.as_deref(), Some("user-1"));
        assert!(store.destroy(&id).await);
        assert!(store.user_id(&id).await.is_none());
        assert!(!store.destroy(&id).await);
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected() {
        let store = SessionStore::new(Duration::seconds(-1));
        let id = store.create("user-1").await;
        assert!(store.user_id(&id).await.is_none());
        assert!(!store.destroy(&id).await);
    }

    #[tokio::test]
    async fn destroy_user_ends_every_session() {
        let store = SessionStore::new(session_ttl());
        let a = store.create("user-1").await;
        let b = store.create("user-1").await;
        let c = store.create("user-2").await;
        assert_eq!(store.destroy_user("user-1").await, 2);
        assert!(store.user_id(&a).await.is_none());
        assert!(store.user_id(&b).await.is_none());
        assert!(store.user_id(&c).await.is_some());
    }

    #[test]
    fn cookie_is_http_only_for_a_day() {
        let store = SessionStore::new(session_ttl());
        let id = Uuid::new_v4();
        let cookie = store.cookie(id);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), id.to_string());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(1)));

        let jar = CookieJar::new().add(cookie);
        assert_eq!(session_id(&jar), Some(id));
    }
}
