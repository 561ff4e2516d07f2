//! Typed model of protection and group setup files.

mod group;
mod protection;
mod scheme;

pub use group::{GroupDefinition, GroupFile, GroupId, Item, Reference};
pub use protection::{ProtectionDirective, ProtectionRecord};
pub use scheme::Scheme;
