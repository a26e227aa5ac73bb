pub mod bearer;
pub mod identity;
pub mod store;

pub use bearer::bearer_gate;
pub use identity::{resolve_client, PrincipalStore};
