//! Group files: cached loading and membership resolution.

mod mask;
mod membership;
mod registry;

pub use mask::mask_match;
pub use membership::{Membership, MembershipResolver, Peer};
pub use registry::GroupRegistry;
