//! Protection and group setup files: data model, lexer and grammar parsers.

pub mod core;
pub mod parse;
pub mod template;
