//! Protection setups: cached loading, run-as identity and the per-request
//! default/current protection context.

mod context;
mod registry;

pub use context::{BoundProtection, ProtectionContext, bind_identity};
pub use registry::ProtectionRegistry;
