use super::registry::ConnectionId;

/// Why a single delivery did not make it into a connection's outbound queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryFailureReason {
    #[error("connection closed")]
    Closed,
    #[error("outbound queue full")]
    QueueFull,
}

/// Failures scoped to one inbound message or one connection. None of these
/// are fatal to the relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("unrecognized message type `{0}`")]
    UnrecognizedMessageType(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("cannot advance the turn of a match with no players")]
    EmptyMatchTurnAdvance,

    #[error("delivery to connection {connection} failed: {reason}")]
    DeliveryFailure {
        connection: ConnectionId,
        reason: DeliveryFailureReason,
    },
}
