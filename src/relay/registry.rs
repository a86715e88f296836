use super::error::{DeliveryFailureReason, RelayError};
use super::state::{MatchSnapshot, MatchState};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Serialized frame waiting to be written to a client
pub type Outbound = Arc<str>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to one client's outbound queue. The transport owns the receiving
/// half and drains it into the socket in FIFO order.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    tx: mpsc::Sender<Outbound>,
}

impl Connection {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                id: ConnectionId::new(),
                tx,
            },
            rx,
        )
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a frame without waiting. A full queue means the peer is not
    /// keeping up and the frame is dropped for this connection only.
    pub fn deliver(&self, payload: Outbound) -> Result<(), RelayError> {
        self.tx.try_send(payload).map_err(|err| {
            let reason = match err {
                mpsc::error::TrySendError::Full(_) => DeliveryFailureReason::QueueFull,
                mpsc::error::TrySendError::Closed(_) => DeliveryFailureReason::Closed,
            };
            RelayError::DeliveryFailure {
                connection: self.id,
                reason,
            }
        })
    }
}

/// A connection registered in a match under a display name
#[derive(Debug, Clone)]
pub struct Member {
    pub connection: Connection,
    pub name: String,
}

#[derive(Debug, PartialEq)]
pub enum JoinOutcome {
    Joined,
    /// The connection was already a member; only its name changed
    Renamed { previous: String },
}

struct MatchEntry {
    members: Vec<Member>,
    state: MatchState,
    last_active: Instant,
}

impl MatchEntry {
    fn new() -> Self {
        Self {
            members: Vec::new(),
            state: MatchState::new(),
            last_active: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    fn users(&self) -> Vec<String> {
        self.members.iter().map(|m| m.name.clone()).collect()
    }
}

/// Owns every match: its member list and its state.
///
/// Each operation holds the map's shard lock only for an in-memory critical
/// section, so work on one match is serialized while other matches proceed.
/// Nothing here performs I/O.
#[derive(Default)]
pub struct MatchRegistry {
    matches: DashMap<String, MatchEntry>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, match_id: &str) -> bool {
        self.matches.contains_key(match_id)
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Return the match's state, creating an empty match if needed
    pub fn get_or_create(&self, match_id: &str) -> MatchState {
        self.matches
            .entry(match_id.to_string())
            .or_insert_with(MatchEntry::new)
            .state
            .clone()
    }

    /// Register `connection` in the match under `name`.
    ///
    /// A connection that is already a member is renamed in place instead of
    /// being listed twice. Player state for a name is created once and never
    /// reset by later joins.
    pub fn join(&self, match_id: &str, connection: Connection, name: String) -> JoinOutcome {
        self.join_then(match_id, connection, name, |_, _| {})
    }

    /// `join`, then run `publish` on the updated match before its lock is
    /// released. `publish` must not touch the registry.
    pub fn join_then<F>(
        &self,
        match_id: &str,
        connection: Connection,
        name: String,
        publish: F,
    ) -> JoinOutcome
    where
        F: FnOnce(&[Member], &MatchState),
    {
        let mut entry = self
            .matches
            .entry(match_id.to_string())
            .or_insert_with(MatchEntry::new);
        entry.touch();

        if entry.state.add_player(&name) {
            info!(match_id, nickname = name, "New player in match");
        }

        let existing = entry
            .members
            .iter_mut()
            .find(|m| m.connection.id() == connection.id());

        let outcome = match existing {
            Some(member) => {
                let previous = std::mem::replace(&mut member.name, name);
                debug!(match_id, connection = %connection.id(), previous, "Member renamed");
                JoinOutcome::Renamed { previous }
            }
            None => {
                entry.members.push(Member { connection, name });
                JoinOutcome::Joined
            }
        };

        publish(&entry.members, &entry.state);
        outcome
    }

    /// Remove the member registered with `connection`. Player state is kept so
    /// a returning player resumes with the same life and score.
    pub fn leave(&self, match_id: &str, connection: ConnectionId) -> bool {
        self.leave_then(match_id, connection, |_, _| {})
    }

    /// `leave`, running `publish` under the match lock only if a member was
    /// actually removed
    pub fn leave_then<F>(&self, match_id: &str, connection: ConnectionId, publish: F) -> bool
    where
        F: FnOnce(&[Member], &MatchState),
    {
        let Some(mut entry) = self.matches.get_mut(match_id) else {
            return false;
        };

        let before = entry.members.len();
        entry.members.retain(|m| m.connection.id() != connection);
        let removed = entry.members.len() != before;
        if removed {
            entry.touch();
            publish(&entry.members, &entry.state);
        }
        removed
    }

    /// Snapshot of the member list, in join order
    pub fn connections(&self, match_id: &str) -> Vec<Member> {
        self.matches
            .get(match_id)
            .map(|entry| entry.members.clone())
            .unwrap_or_default()
    }

    pub fn participants(&self, match_id: &str) -> Vec<String> {
        self.matches
            .get(match_id)
            .map(|entry| entry.users())
            .unwrap_or_default()
    }

    pub fn snapshot(&self, match_id: &str) -> Option<MatchSnapshot> {
        self.matches.get(match_id).map(|entry| entry.state.snapshot())
    }

    /// Advance the match's turn and return the resulting state
    pub fn pass_turn(&self, match_id: &str) -> Result<MatchSnapshot, RelayError> {
        self.pass_turn_then(match_id, |_, _| {})
    }

    /// `pass_turn`, then run `publish` under the match lock. `publish` runs
    /// for an existing match even when the turn could not advance, so the
    /// unchanged state can be re-sent. An unknown match is never created.
    pub fn pass_turn_then<F>(&self, match_id: &str, publish: F) -> Result<MatchSnapshot, RelayError>
    where
        F: FnOnce(&[Member], &MatchState),
    {
        let Some(mut entry) = self.matches.get_mut(match_id) else {
            return Err(RelayError::EmptyMatchTurnAdvance);
        };
        let result = entry.state.pass_turn();
        if result.is_ok() {
            entry.touch();
        }
        publish(&entry.members, &entry.state);
        result.map(|()| entry.state.snapshot())
    }

    /// Drop matches that have had no members for at least `ttl`
    pub fn reap_idle(&self, ttl: Duration) -> usize {
        let before = self.matches.len();
        self.matches
            .retain(|_, entry| !entry.members.is_empty() || entry.last_active.elapsed() < ttl);
        before.saturating_sub(self.matches.len())
    }
}
