//! Tokenizer for setup files.
//!
//! Whitespace other than newline separates tokens. `#` at the start of a token
//! comments out the rest of the line. Any run of characters that is not
//! whitespace and not one of `: , ( ) @` forms a word; a word containing `*`
//! is a template word.

use std::iter::Peekable;
use std::str::Chars;

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    TemplateWord(String),
    /// `:`
    FieldSep,
    /// `,`
    ItemSep,
    /// Newline.
    RecordSep,
    /// `(`
    OpenGroup,
    /// `)`
    CloseGroup,
    /// `@`
    AtSign,
    Eof,
}

impl Token {
    /// Returns `true` for tokens that end a record.
    #[must_use]
    pub const fn is_boundary(&self) -> bool {
        matches!(self, Self::RecordSep | Self::Eof)
    }

    /// Short human-readable form for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Word(text) => format!("word `{text}`"),
            Self::TemplateWord(text) => format!("template `{text}`"),
            Self::FieldSep => "':'".to_string(),
            Self::ItemSep => "','".to_string(),
            Self::RecordSep => "end of line".to_string(),
            Self::OpenGroup => "'('".to_string(),
            Self::CloseGroup => "')'".to_string(),
            Self::AtSign => "'@'".to_string(),
            Self::Eof => "end of file".to_string(),
        }
    }
}

/// Token stream with one token of push-back.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    token_line: usize,
    pushed: Option<(Token, usize)>,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            token_line: 1,
            pushed: None,
        }
    }

    /// Line of the most recently returned token (1-based).
    #[must_use]
    pub const fn line(&self) -> usize {
        self.token_line
    }

    /// Returns a token to the stream; the next call to [`Lexer::next_token`]
    /// yields it again. Only one token can be pending.
    pub fn pushback(&mut self, token: Token) {
        debug_assert!(self.pushed.is_none(), "only one token of push-back");
        self.pushed = Some((token, self.token_line));
    }

    pub fn next_token(&mut self) -> Token {
        if let Some((token, line)) = self.pushed.take() {
            self.token_line = line;
            return token;
        }

        loop {
            let Some(c) = self.chars.next() else {
                self.token_line = self.line;
                return Token::Eof;
            };
            self.token_line = self.line;

            let token = match c {
                '\n' => {
                    self.line += 1;
                    Token::RecordSep
                }
                ':' => Token::FieldSep,
                ',' => Token::ItemSep,
                '(' => Token::OpenGroup,
                ')' => Token::CloseGroup,
                '@' => Token::AtSign,
                '#' => {
                    self.skip_comment();
                    continue;
                }
                c if c.is_whitespace() => continue,
                c => self.word(c),
            };
            return token;
        }
    }

    /// ## Summary
    /// Error recovery: consumes tokens through the next record separator.
    ///
    /// Stops without consuming anything further when the stream is already at
    /// end of file.
    pub fn skip_record(&mut self) {
        loop {
            match self.next_token() {
                Token::RecordSep => return,
                Token::Eof => {
                    self.pushback(Token::Eof);
                    return;
                }
                _ => {}
            }
        }
    }

    fn skip_comment(&mut self) {
        while self.chars.next_if(|c| *c != '\n').is_some() {}
    }

    fn word(&mut self, first: char) -> Token {
        let mut text = String::from(first);
        while let Some(c) = self.chars.next_if(|c| is_word_char(*c)) {
            text.push(c);
        }

        if text.contains('*') {
            Token::TemplateWord(text)
        } else {
            Token::Word(text)
        }
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ':' | ',' | '(' | ')' | '@')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token == Token::Eof;
            out.push(token);
            if done {
                return out;
            }
        }
    }

    fn word(text: &str) -> Token {
        Token::Word(text.to_string())
    }

    #[test]
    fn group_declaration_tokens() {
        assert_eq!(
            tokens("admins: (alice, bob) @ 10.0.0.*\n"),
            vec![
                word("admins"),
                Token::FieldSep,
                Token::OpenGroup,
                word("alice"),
                Token::ItemSep,
                word("bob"),
                Token::CloseGroup,
                Token::AtSign,
                Token::TemplateWord("10.0.0.*".to_string()),
                Token::RecordSep,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn paths_and_dotted_names_are_single_words() {
        assert_eq!(
            tokens("passw /etc/warden/passwd"),
            vec![word("passw"), word("/etc/warden/passwd"), Token::Eof]
        );
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(
            tokens("# heading\nAuth basic # trailing\n"),
            vec![
                Token::RecordSep,
                word("Auth"),
                word("basic"),
                Token::RecordSep,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn hash_inside_word_is_kept() {
        assert_eq!(tokens("a#b"), vec![word("a#b"), Token::Eof]);
    }

    #[test]
    fn pushback_replays_token_and_line() {
        let mut lexer = Lexer::new("one\ntwo");
        assert_eq!(lexer.next_token(), word("one"));
        assert_eq!(lexer.next_token(), Token::RecordSep);
        let two = lexer.next_token();
        assert_eq!(lexer.line(), 2);
        lexer.pushback(two.clone());
        assert_eq!(lexer.next_token(), two);
        assert_eq!(lexer.line(), 2);
        assert_eq!(lexer.next_token(), Token::Eof);
    }

    #[test]
    fn skip_record_stops_after_newline() {
        let mut lexer = Lexer::new("junk ( , @\nnext");
        lexer.skip_record();
        assert_eq!(lexer.next_token(), word("next"));
    }

    #[test]
    fn skip_record_keeps_eof() {
        let mut lexer = Lexer::new("junk junk");
        lexer.skip_record();
        assert_eq!(lexer.next_token(), Token::Eof);
    }
}
