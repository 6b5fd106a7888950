pub mod claim;
pub mod deriver;

pub use claim::{PathClaim, PathMatch, PathType};
pub use deriver::{extract_paths, ExplicitEndpointMode, PathDeriver, WEBHOOK_ACTION, WEBSOCKET_ACTION};
