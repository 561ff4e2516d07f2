//! Access-control engine: cached setup files, group membership, credential
//! checks and the per-request protection context.

pub mod auth;
pub mod cache;
pub mod error;
pub mod group;
pub mod protection;
