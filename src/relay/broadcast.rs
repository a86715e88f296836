use super::messages::ServerMessage;
use super::registry::{ConnectionId, MatchRegistry, Member, Outbound};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Fans frames out to the members of a match
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<MatchRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<MatchRegistry>) -> Self {
        Self { registry }
    }

    /// Queue `payload` for every member of the match except `exclude`.
    ///
    /// The member list is snapshotted first, so no registry lock is held while
    /// delivering. Used for relayed frames that carry no match state.
    pub fn send(&self, match_id: &str, exclude: Option<ConnectionId>, payload: Outbound) -> usize {
        let members = self.registry.connections(match_id);
        self.fan_out(match_id, &members, exclude, payload)
    }

    /// Queue `payload` for each of `members` except `exclude`.
    ///
    /// A failed delivery is logged and skipped; the transport's own
    /// disconnect handling removes dead connections. Deliveries never wait,
    /// so this is safe to call while a match is locked. Returns how many
    /// connections accepted the frame.
    pub fn fan_out(
        &self,
        match_id: &str,
        members: &[Member],
        exclude: Option<ConnectionId>,
        payload: Outbound,
    ) -> usize {
        let mut delivered = 0;

        for member in members
            .iter()
            .filter(|m| Some(m.connection.id()) != exclude)
        {
            match member.connection.deliver(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => warn!(match_id, nickname = member.name, %err, "Dropped frame"),
            }
        }

        debug!(match_id, delivered, total = members.len(), "Broadcast");
        delivered
    }

    /// Serialize `msg` once and fan it out to `members`
    pub fn fan_out_message(&self, match_id: &str, members: &[Member], msg: &ServerMessage) -> usize {
        match msg.to_payload() {
            Ok(payload) => self.fan_out(match_id, members, None, payload),
            Err(err) => {
                error!(match_id, %err, "Failed to serialize server message");
                0
            }
        }
    }
}
