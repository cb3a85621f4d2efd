//! Auth-domain identifiers, flow identity, state tokens, and credential models.

pub mod credential;
pub mod id;
pub mod identity;
pub mod scope;
pub mod state;

pub use credential::*;
pub use id::*;
pub use identity::*;
pub use scope::*;
pub use state::*;
