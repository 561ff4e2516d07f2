//! Group file grammar.
//!
//! ```text
//! group_decl   ::= Word ':' group_def
//! group_def    ::= item_list RecordSep
//! item_list    ::= item { ',' item }
//! item         ::= [user_part] ['@' address_part]
//! user_part    ::= Word | '(' Word { ',' Word } ')'
//! address_part ::= addr | '(' addr { ',' addr } ')'
//! addr         ::= Word | TemplateWord
//! ```
//!
//! Newlines directly after a `,` continue the list on the next line.

use super::error::SyntaxError;
use super::lexer::{Lexer, Token};
use crate::core::{GroupDefinition, Item, Reference};

type ParseResult<T> = Result<T, SyntaxError>;

/// ## Summary
/// Parses every declaration of a group file.
///
/// Returns one outcome per declaration in file order. References are not
/// linked here; feed the definitions to [`crate::core::GroupFile::push`].
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_group_file(input: &str) -> Vec<ParseResult<GroupDefinition>> {
    let mut lexer = Lexer::new(input);
    let mut outcomes = Vec::new();

    while let Some(outcome) = parse_group_decl(&mut lexer) {
        if let Err(err) = &outcome {
            tracing::warn!(line = err.line, error = %err, "Syntax error in group file");
            if !err.at_boundary() {
                lexer.skip_record();
            }
        }
        outcomes.push(outcome);
    }

    tracing::trace!(count = outcomes.len(), "Parsed group declarations");
    outcomes
}

/// ## Summary
/// Parses a group definition body (the part after `name:`) through its
/// terminating record separator. Used for group declarations and for the
/// `Mask` line of protection files.
///
/// ## Errors
/// Returns a syntax error if the body is malformed or followed by anything
/// other than the end of the line.
pub fn parse_group_body(lexer: &mut Lexer<'_>) -> ParseResult<GroupDefinition> {
    let items = parse_item_list(lexer)?;

    match lexer.next_token() {
        Token::RecordSep => Ok(GroupDefinition::unnamed(items)),
        Token::Eof => {
            lexer.pushback(Token::Eof);
            Ok(GroupDefinition::unnamed(items))
        }
        other => Err(SyntaxError::new(
            lexer.line(),
            "Garbage after group definition",
            &other,
        )),
    }
}

/// Returns `None` at end of input.
fn parse_group_decl(lexer: &mut Lexer<'_>) -> Option<ParseResult<GroupDefinition>> {
    let token = skip_record_seps(lexer);

    let name = match token {
        Token::Eof => return None,
        Token::Word(name) => name,
        other => {
            return Some(Err(SyntaxError::new(
                lexer.line(),
                "Expecting group name",
                &other,
            )));
        }
    };

    let separator = lexer.next_token();
    if separator != Token::FieldSep {
        return Some(Err(SyntaxError::new(
            lexer.line(),
            "Expecting field separator",
            &separator,
        )));
    }

    Some(parse_group_body(lexer).map(|mut definition| {
        definition.name = Some(name);
        definition
    }))
}

fn parse_item_list(lexer: &mut Lexer<'_>) -> ParseResult<Vec<Item>> {
    let mut items = Vec::new();

    loop {
        items.push(parse_item(lexer)?);

        let token = lexer.next_token();
        if token != Token::ItemSep {
            lexer.pushback(token);
            return Ok(items);
        }

        let token = skip_record_seps(lexer);
        lexer.pushback(token);
    }
}

fn parse_item(lexer: &mut Lexer<'_>) -> ParseResult<Item> {
    let mut item = Item::default();

    let mut token = lexer.next_token();
    if matches!(token, Token::Word(_) | Token::OpenGroup) {
        lexer.pushback(token);
        item.user_clause = Some(parse_user_part(lexer)?);
        token = lexer.next_token();
    }

    if token == Token::AtSign {
        let next = lexer.next_token();
        if !matches!(
            next,
            Token::Word(_) | Token::TemplateWord(_) | Token::OpenGroup
        ) {
            return Err(SyntaxError::new(
                lexer.line(),
                "Expected address part (single address or list)",
                &next,
            ));
        }
        lexer.pushback(next);
        item.address_clause = Some(parse_address_part(lexer)?);
    } else {
        let line = lexer.line();
        if item.user_clause.is_none() {
            let err = SyntaxError::new(line, "Empty item not allowed", &token);
            lexer.pushback(token);
            return Err(err);
        }
        lexer.pushback(token);
    }

    Ok(item)
}

fn parse_user_part(lexer: &mut Lexer<'_>) -> ParseResult<Vec<Reference>> {
    parse_reference_part(lexer, |token| match token {
        Token::Word(name) => Some(name),
        _ => None,
    })
    .map_err(|(line, token, stage)| {
        let message = match stage {
            PartStage::Start => "Expecting a single name or '(' beginning list",
            PartStage::Entry => "Expecting user or group name",
            PartStage::Close => "Expecting ')' closing user/group list",
        };
        SyntaxError::new(line, message, &token)
    })
}

fn parse_address_part(lexer: &mut Lexer<'_>) -> ParseResult<Vec<Reference>> {
    parse_reference_part(lexer, |token| match token {
        Token::Word(mask) | Token::TemplateWord(mask) => Some(mask),
        _ => None,
    })
    .map_err(|(line, token, stage)| {
        let message = match stage {
            PartStage::Start => "Expecting a single address or '(' beginning list",
            PartStage::Entry => "Expecting an address template",
            PartStage::Close => "Expecting ')' closing address list",
        };
        SyntaxError::new(line, message, &token)
    })
}

/// Where a reference part went wrong.
enum PartStage {
    Start,
    Entry,
    Close,
}

/// Parses `entry | '(' entry { ',' entry } ')'`, where `entry` accepts a
/// token and returns its text.
fn parse_reference_part(
    lexer: &mut Lexer<'_>,
    entry: impl Fn(Token) -> Option<String>,
) -> Result<Vec<Reference>, (usize, Token, PartStage)> {
    let token = lexer.next_token();
    if token != Token::OpenGroup {
        return match entry(token.clone()) {
            Some(name) => Ok(vec![Reference::new(name)]),
            None => Err((lexer.line(), token, PartStage::Start)),
        };
    }

    let mut references = Vec::new();
    let mut token = lexer.next_token();
    loop {
        match entry(token.clone()) {
            Some(name) => references.push(Reference::new(name)),
            None => {
                let stage = if references.is_empty() {
                    PartStage::Start
                } else {
                    PartStage::Entry
                };
                return Err((lexer.line(), token, stage));
            }
        }

        token = lexer.next_token();
        if token != Token::ItemSep {
            break;
        }
        token = skip_record_seps(lexer);
    }

    if token == Token::CloseGroup {
        Ok(references)
    } else {
        Err((lexer.line(), token, PartStage::Close))
    }
}

fn skip_record_seps(lexer: &mut Lexer<'_>) -> Token {
    loop {
        let token = lexer.next_token();
        if token != Token::RecordSep {
            return token;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_definitions(input: &str) -> Vec<GroupDefinition> {
        parse_group_file(input)
            .into_iter()
            .filter_map(Result::ok)
            .collect()
    }

    fn names(references: Option<&Vec<Reference>>) -> Vec<&str> {
        references
            .map(|refs| refs.iter().map(|r| r.literal_name.as_str()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn simple_user_list() {
        let defs = ok_definitions("staff: alice, bob\n");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name.as_deref(), Some("staff"));
        assert_eq!(defs[0].items.len(), 2);
        assert_eq!(names(defs[0].items[0].user_clause.as_ref()), vec!["alice"]);
        assert_eq!(names(defs[0].items[1].user_clause.as_ref()), vec!["bob"]);
        assert!(defs[0].items[0].address_clause.is_none());
    }

    #[test]
    fn parenthesized_users_with_address() {
        let defs = ok_definitions("admins: (alice, bob) @ 10.0.0.*\n");
        let item = &defs[0].items[0];
        assert_eq!(names(item.user_clause.as_ref()), vec!["alice", "bob"]);
        assert_eq!(names(item.address_clause.as_ref()), vec!["10.0.0.*"]);
    }

    #[test]
    fn address_only_item_and_address_list() {
        let defs = ok_definitions("lan: @(128.141.*.*, *.cern.ch)\n");
        let item = &defs[0].items[0];
        assert!(item.user_clause.is_none());
        assert_eq!(
            names(item.address_clause.as_ref()),
            vec!["128.141.*.*", "*.cern.ch"]
        );
    }

    #[test]
    fn list_continues_after_item_separator() {
        let defs = ok_definitions("team: alice,\n\n  bob, (carol,\n dave)\n");
        assert_eq!(defs[0].items.len(), 3);
        assert_eq!(
            names(defs[0].items[2].user_clause.as_ref()),
            vec!["carol", "dave"]
        );
    }

    #[test]
    fn final_declaration_may_end_at_eof() {
        let defs = ok_definitions("a: x\nb: y");
        assert_eq!(defs.len(), 2);
    }

    #[test]
    fn blank_lines_and_comments_are_ignored() {
        let defs = ok_definitions("\n# groups\n\nstaff: alice\n\n");
        assert_eq!(defs.len(), 1);
    }

    #[test]
    fn empty_item_is_an_error_and_parsing_resumes() {
        let outcomes = parse_group_file("broken: alice, , bob\nstaff: carol\n");
        assert_eq!(outcomes.len(), 2);
        let err = outcomes[0].as_ref().expect_err("empty item");
        assert_eq!(err.message, "Empty item not allowed");
        assert_eq!(err.line, 1);
        let staff = outcomes[1].as_ref().expect("next declaration parses");
        assert_eq!(staff.name.as_deref(), Some("staff"));
    }

    #[test]
    fn garbage_after_definition_drops_declaration() {
        let outcomes = parse_group_file("staff: alice bob junk\nok: carol\n");
        assert_eq!(outcomes.len(), 2);
        let err = outcomes[0].as_ref().expect_err("garbage");
        assert_eq!(err.message, "Garbage after group definition");
        assert!(outcomes[1].is_ok());
    }

    #[test]
    fn missing_field_separator() {
        let outcomes = parse_group_file("staff alice\nok: bob\n");
        assert_eq!(
            outcomes[0].as_ref().expect_err("separator").message,
            "Expecting field separator"
        );
        assert!(outcomes[1].is_ok());
    }

    #[test]
    fn unclosed_user_list_at_end_of_line() {
        let outcomes = parse_group_file("staff: (alice, bob\nok: carol\n");
        let err = outcomes[0].as_ref().expect_err("unclosed");
        assert_eq!(err.message, "Expecting ')' closing user/group list");
        assert!(err.at_boundary());
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[1].is_ok());
    }

    #[test]
    fn template_is_not_a_user_name() {
        let outcomes = parse_group_file("staff: ali*\nok: bob\n");
        assert!(outcomes[0].is_err());
        assert!(outcomes[1].is_ok());
    }

    #[test]
    fn at_sign_without_address() {
        let outcomes = parse_group_file("staff: alice @\nok: bob\n");
        assert_eq!(
            outcomes[0].as_ref().expect_err("address").message,
            "Expected address part (single address or list)"
        );
        assert!(outcomes[1].is_ok());
    }

    #[test]
    fn declaration_must_start_with_name() {
        let outcomes = parse_group_file("(oops)\nok: bob\n");
        assert_eq!(
            outcomes[0].as_ref().expect_err("name").message,
            "Expecting group name"
        );
        assert!(outcomes[1].is_ok());
        assert_eq!(outcomes.len(), 2);
    }

    #[test]
    fn body_parser_reads_mask_line() {
        let mut lexer = Lexer::new("(alice, staff) @ *.cern.ch\nnext");
        let mask = parse_group_body(&mut lexer).expect("mask body parses");
        assert!(mask.name.is_none());
        assert_eq!(names(mask.items[0].user_clause.as_ref()), vec!["alice", "staff"]);
        assert_eq!(lexer.next_token(), Token::Word("next".to_string()));
    }
}
