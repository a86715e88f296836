mod broadcast;
pub mod error;
mod match_id;
pub mod messages;
mod reaper;
pub mod registry;
mod router;
pub mod state;
mod ws;

pub use broadcast::Broadcaster;
pub use error::RelayError;
pub use match_id::new_unique_match_id;
pub use reaper::spawn_reaper;
pub use registry::{Connection, ConnectionId, MatchRegistry};
pub use router::MessageRouter;
pub use ws::{ConnectionSettings, run_connection};
