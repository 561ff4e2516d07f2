//! Protection setup file grammar.
//!
//! One directive per line: a field name, an optional `:`, then a value whose
//! shape depends on the field. `Auth` takes a comma-separated scheme list,
//! `Mask` takes a group definition body, and anything else takes one word.

use super::error::SyntaxError;
use super::group::parse_group_body;
use super::lexer::{Lexer, Token};
use crate::core::{ProtectionDirective, Scheme};

/// Case-insensitive match on the first four characters of a field name.
fn field_is(field: &str, keyword: &str) -> bool {
    field
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
}

/// ## Summary
/// Parses a protection setup file into directives and syntax errors, in file
/// order.
///
/// A line that parsed a directive before running into trailing junk yields
/// both the directive and the error.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_protection_file(input: &str) -> Vec<Result<ProtectionDirective, SyntaxError>> {
    let mut lexer = Lexer::new(input);
    let mut outcomes = Vec::new();

    loop {
        let mut token = lexer.next_token();
        while token == Token::RecordSep {
            token = lexer.next_token();
        }
        if token == Token::Eof {
            break;
        }

        let end = match token {
            Token::Word(field) => {
                let separator = lexer.next_token();
                if separator != Token::FieldSep {
                    lexer.pushback(separator);
                }

                if field_is(&field, "auth") {
                    let (schemes, end) = parse_scheme_list(&mut lexer);
                    outcomes.push(Ok(ProtectionDirective::Auth(schemes)));
                    end
                } else if field_is(&field, "mask") {
                    match parse_group_body(&mut lexer) {
                        Ok(mask) => {
                            tracing::trace!(mask = %mask, "Mask group");
                            outcomes.push(Ok(ProtectionDirective::Mask(mask)));
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "Mask group syntax error");
                            if !err.at_boundary() {
                                lexer.skip_record();
                            }
                            outcomes.push(Err(err));
                        }
                    }
                    continue;
                } else {
                    match lexer.next_token() {
                        Token::Word(value) => {
                            tracing::trace!(name = %field, value = %value, "Attribute bound");
                            outcomes.push(Ok(ProtectionDirective::Attribute { name: field, value }));
                            lexer.next_token()
                        }
                        other => other,
                    }
                }
            }
            other => other,
        };

        if !end.is_boundary() {
            let err = SyntaxError::new(
                lexer.line(),
                "Syntax error in protection setup file (line ignored)",
                &end,
            );
            tracing::warn!(line = err.line, error = %err, "Syntax error in protection file");
            lexer.skip_record();
            outcomes.push(Err(err));
        }
    }

    outcomes
}

/// Reads `Word { ',' Word }`, allowing line breaks after each `,`. Returns
/// the known schemes and the first token past the list.
fn parse_scheme_list(lexer: &mut Lexer<'_>) -> (Vec<Scheme>, Token) {
    let mut schemes = Vec::new();
    let mut token = lexer.next_token();

    while let Token::Word(name) = &token {
        let scheme = Scheme::parse(name);
        if scheme.is_known() {
            tracing::trace!(scheme = %scheme, "Valid authentication scheme");
            schemes.push(scheme);
        } else {
            tracing::debug!(name = %name, "Unknown authentication scheme ignored");
        }

        token = lexer.next_token();
        if token != Token::ItemSep {
            break;
        }
        token = lexer.next_token();
        while token == Token::RecordSep {
            token = lexer.next_token();
        }
    }

    (schemes, token)
}
