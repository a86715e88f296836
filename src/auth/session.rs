use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct Session {
    nickname: String,
    issued_at: Instant,
}

/// Session tokens issued at login, mapped to the nickname they belong to.
/// A token stops resolving once it is older than the store's ttl; expired
/// tokens are swept whenever a new one is issued.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn issue(&self, nickname: &str) -> String {
        self.prune_expired();

        let token = uuid::Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                nickname: nickname.to_string(),
                issued_at: Instant::now(),
            },
        );
        info!(nickname, "Session issued");
        token
    }

    pub fn nickname_for(&self, token: &str) -> Option<String> {
        self.sessions
            .get(token)
            .filter(|session| session.issued_at.elapsed() < self.ttl)
            .map(|session| session.nickname.clone())
    }

    /// Drop every expired token, returning how many went
    pub fn prune_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.issued_at.elapsed() < self.ttl);
        let pruned = before.saturating_sub(self.sessions.len());
        if pruned > 0 {
            debug!(pruned, "Expired sessions removed");
        }
        pruned
    }
}
