use super::broadcast::Broadcaster;
use super::error::RelayError;
use super::messages::{ClientMessage, ServerMessage};
use super::registry::{Connection, ConnectionId, JoinOutcome, MatchRegistry, Member};
use super::state::MatchState;
use std::sync::Arc;
use tracing::{debug, info};

/// Dispatches inbound frames: mutates match state through the registry and
/// fans the result out through the broadcaster.
pub struct MessageRouter {
    registry: Arc<MatchRegistry>,
    broadcaster: Broadcaster,
}

impl MessageRouter {
    pub fn new(registry: Arc<MatchRegistry>) -> Self {
        Self {
            broadcaster: Broadcaster::new(registry.clone()),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<MatchRegistry> {
        &self.registry
    }

    /// Handle one raw frame from `sender`. Errors mean the frame was dropped;
    /// the connection stays open.
    ///
    /// State changes are announced while the match is still locked, so every
    /// member sees `estado` frames in the order the changes happened.
    pub fn handle(&self, match_id: &str, sender: &Connection, raw: &str) -> Result<(), RelayError> {
        match ClientMessage::decode(raw)? {
            ClientMessage::Join { nickname } => {
                let outcome = self.registry.join_then(
                    match_id,
                    sender.clone(),
                    nickname.clone(),
                    |members, state| self.announce(match_id, members, state),
                );
                match outcome {
                    JoinOutcome::Joined => {
                        info!(match_id, connection = %sender.id(), nickname, "Player joined match");
                    }
                    JoinOutcome::Renamed { previous } => {
                        info!(match_id, connection = %sender.id(), previous, nickname, "Player renamed");
                    }
                }
                Ok(())
            }
            ClientMessage::PassTurn => {
                // An empty match still gets its current state re-sent
                let state = self
                    .registry
                    .pass_turn_then(match_id, |members, state| {
                        self.publish_state(match_id, members, state)
                    })?;
                debug!(match_id, turn = state.turn, current = ?state.current_player, "Turn passed");
                Ok(())
            }
            ClientMessage::Signal(_) | ClientMessage::IceCandidate(_) => {
                self.broadcaster
                    .send(match_id, Some(sender.id()), Arc::from(raw));
                Ok(())
            }
        }
    }

    /// Called by the transport once a connection's read loop has ended
    pub fn disconnect(&self, match_id: &str, connection: ConnectionId) {
        let removed = self
            .registry
            .leave_then(match_id, connection, |members, state| {
                self.announce(match_id, members, state)
            });
        if removed {
            info!(match_id, %connection, "Player left match");
        } else {
            debug!(match_id, %connection, "Closed connection was not a member");
        }
    }

    /// Send `participants` followed by `estado` to the match
    fn announce(&self, match_id: &str, members: &[Member], state: &MatchState) {
        let users = members.iter().map(|m| m.name.clone()).collect();
        self.broadcaster
            .fan_out_message(match_id, members, &ServerMessage::Participants { users });
        self.publish_state(match_id, members, state);
    }

    fn publish_state(&self, match_id: &str, members: &[Member], state: &MatchState) {
        self.broadcaster.fan_out_message(
            match_id,
            members,
            &ServerMessage::Estado {
                estado: state.snapshot(),
            },
        );
    }
}
