//! Setup file parsing.
//!
//! Both file kinds share one tokenizer. Parsing never fails as a whole: each
//! declaration is returned either parsed or as a [`SyntaxError`], and the
//! parser resumes at the next record separator after an error.
//!
//! ## Usage
//!
//! ```rust
//! use warden_rules::core::GroupFile;
//! use warden_rules::parse::parse_group_file;
//!
//! let mut file = GroupFile::new();
//! for outcome in parse_group_file("staff: alice, bob\nadmins: (alice) @ 10.0.0.*\n") {
//!     if let Ok(definition) = outcome {
//!         file.push(definition);
//!     }
//! }
//! assert_eq!(file.len(), 2);
//! ```

mod error;
mod group;
mod lexer;
mod protection;

pub use error::SyntaxError;
pub use group::{parse_group_body, parse_group_file};
pub use lexer::{Lexer, Token};
pub use protection::parse_protection_file;
