//! Flow identity: the user/org pair every ephemeral entry is scoped to.

// self
use crate::{
	_prelude::*,
	auth::{OrgId, UserId},
};

/// Identifies one account-link attempt: a user acting inside an organization.
///
/// The pair is never persisted on its own; it derives the correlation keys for the
/// attempt's state and credential entries. A user cannot run two concurrent attempts
/// for the same organization without the second replacing the first's pending state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowIdentity {
	/// User running the link attempt.
	#[serde(rename = "user_id")]
	pub user: UserId,
	/// Organization the linked account belongs to.
	#[serde(rename = "org_id")]
	pub org: OrgId,
}
impl FlowIdentity {
	/// Creates an identity for the provided user/org pair.
	pub fn new(user: UserId, org: OrgId) -> Self {
		Self { user, org }
	}
}
impl Display for FlowIdentity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}:{}", self.user, self.org)
	}
}
