//! Splits template text into literal text and tokenized actions.
//!
//! Text, comments and trim markers are scanned here; the inside of each
//! action is tokenized by [`Lexeme`].

use logos::Logos;

use super::SyntaxError;

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";
const LEFT_COMMENT: &str = "/*";
const RIGHT_COMMENT: &str = "*/";

/// Whitespace that may surround a trim marker.
const TRIM_SPACE: [char; 4] = [' ', '\t', '\r', '\n'];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// `.`
    Dot,
    /// `.Field.Sub`
    Field(Vec<String>),
    /// Keyword or function name.
    Ident(String),
    Str(String),
    Int(i64),
    Bool(bool),
    LeftParen,
    RightParen,
    Pipe,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Item {
    Text(String),
    Action { tokens: Vec<Token>, line: usize },
}

/// Raw tokens of an action body, up to and including the closing delimiter.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum Lexeme {
    #[token("}}")]
    RightDelim,
    #[token("-}}")]
    RightTrimDelim,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("|")]
    Pipe,
    #[token(".")]
    Dot,

    #[regex(r"(\.[a-zA-Z_][a-zA-Z0-9_]*)+", field_names)]
    Field(Vec<String>),
    #[regex(r"(\.[a-zA-Z_][a-zA-Z0-9_]*)+\.")]
    BadField,

    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, unquote)]
    #[regex(r"`[^`]*`", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    Str(String),

    #[regex(r"[-+]?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),
    #[regex(r"[-+]?[0-9]+[a-zA-Z_.][a-zA-Z0-9_.]*")]
    BadNumber,

    #[regex(r"\$[a-zA-Z0-9_]*")]
    Variable,
}

fn field_names(lex: &mut logos::Lexer<Lexeme>) -> Vec<String> {
    lex.slice()[1..].split('.').map(str::to_string).collect()
}

/// Resolve escapes in a double-quoted string; an unknown escape fails the token.
fn unquote(lex: &mut logos::Lexer<Lexeme>) -> Option<String> {
    let s = lex.slice();
    let mut value = String::with_capacity(s.len());
    let mut chars = s[1..s.len() - 1].chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        value.push(match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            _ => return None,
        });
    }
    Some(value)
}

/// Lex `input` into items. Comments are dropped and trim markers
/// (`{{- ` and ` -}}`) are applied to the neighbouring text.
pub(crate) fn lex(input: &str) -> Result<Vec<Item>, SyntaxError> {
    let mut lexer = Lexer {
        input,
        pos: 0,
        line: 1,
        items: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.items)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    items: Vec<Item>,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) -> Result<(), SyntaxError> {
        let input = self.input;
        let mut trim_next = false;

        loop {
            let rest = &input[self.pos..];
            let Some(open) = rest.find(LEFT_DELIM) else {
                self.push_text(rest, trim_next, false);
                return Ok(());
            };

            let after = &rest[open + LEFT_DELIM.len()..];
            let left_trim = has_left_trim(after);
            self.push_text(&rest[..open], trim_next, left_trim);
            self.line += count_lines(&rest[..open]);

            self.pos += open + LEFT_DELIM.len();
            if left_trim {
                // dash plus one ASCII space
                self.line += count_lines(&after[..2]);
                self.pos += 2;
            }

            trim_next = if input[self.pos..].starts_with(LEFT_COMMENT) {
                self.comment()?
            } else {
                self.action()?
            };
        }
    }

    fn push_text(&mut self, text: &str, trim_start: bool, trim_end: bool) {
        let mut text = text;
        if trim_start {
            text = text.trim_start();
        }
        if trim_end {
            text = text.trim_end();
        }
        if !text.is_empty() {
            self.items.push(Item::Text(text.to_string()));
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line: self.line,
            message: message.into(),
        }
    }

    /// Error positioned after `consumed`, the part of the action read so far.
    fn error_after(&self, consumed: &str, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line: self.line + count_lines(consumed),
            message: message.into(),
        }
    }

    /// Skip a `/* ... */` comment and its closing delimiter.
    fn comment(&mut self) -> Result<bool, SyntaxError> {
        let rest = &self.input[self.pos..];
        let end = rest
            .find(RIGHT_COMMENT)
            .ok_or_else(|| self.error("unclosed comment"))?;
        self.line += count_lines(&rest[..end]);
        self.pos += end + RIGHT_COMMENT.len();

        let (len, right_trim) = close_delim(&self.input[self.pos..])
            .ok_or_else(|| self.error("comment ends before closing delimiter"))?;
        self.pos += len;
        Ok(right_trim)
    }

    /// Tokenize one action up to and including its closing delimiter.
    fn action(&mut self) -> Result<bool, SyntaxError> {
        let input = self.input;
        let rest = &input[self.pos..];
        let line = self.line;
        let mut tokens = Vec::new();

        for (lexeme, span) in Lexeme::lexer(rest).spanned() {
            let token = match lexeme {
                Ok(Lexeme::RightDelim) => {
                    self.close_action(&rest[..span.end], tokens, line);
                    return Ok(false);
                }
                Ok(Lexeme::RightTrimDelim) => {
                    if !rest[..span.start].ends_with(TRIM_SPACE) {
                        return Err(self.error_after(&rest[..span.start], "missing space before -}}"));
                    }
                    self.close_action(&rest[..span.end], tokens, line);
                    return Ok(true);
                }
                Ok(Lexeme::LeftParen) => Token::LeftParen,
                Ok(Lexeme::RightParen) => Token::RightParen,
                Ok(Lexeme::Pipe) => Token::Pipe,
                Ok(Lexeme::Dot) => Token::Dot,
                Ok(Lexeme::Field(names)) => Token::Field(names),
                Ok(Lexeme::Bool(b)) => Token::Bool(b),
                Ok(Lexeme::Ident(name)) => Token::Ident(name),
                Ok(Lexeme::Str(s)) => Token::Str(s),
                Ok(Lexeme::Int(i)) => Token::Int(i),
                Ok(Lexeme::BadField) => {
                    return Err(self.error_after(&rest[..span.start], "bad field syntax"))
                }
                Ok(Lexeme::BadNumber) => {
                    return Err(self.error_after(
                        &rest[..span.start],
                        format!("bad number syntax: {:?}", &rest[span]),
                    ))
                }
                Ok(Lexeme::Variable) => {
                    return Err(self.error_after(&rest[..span.start], "variables are not supported"))
                }
                Err(()) => {
                    return Err(self.error_after(
                        &rest[..span.start],
                        format!("unexpected {:?} in action", &rest[span]),
                    ))
                }
            };
            tokens.push(token);
        }

        Err(self.error("unclosed action"))
    }

    fn close_action(&mut self, consumed: &str, tokens: Vec<Token>, line: usize) {
        self.line += count_lines(consumed);
        self.pos += consumed.len();
        self.items.push(Item::Action { tokens, line });
    }
}

/// A left trim marker is a dash followed by ASCII whitespace: `{{- `.
fn has_left_trim(after_delim: &str) -> bool {
    let mut chars = after_delim.chars();
    chars.next() == Some('-') && chars.next().is_some_and(|c| TRIM_SPACE.contains(&c))
}

/// Length of the closing delimiter at the start of `s` (including a ` -`
/// trim marker and the whitespace before it) and whether it trims.
fn close_delim(s: &str) -> Option<(usize, bool)> {
    if s.starts_with(RIGHT_DELIM) {
        return Some((RIGHT_DELIM.len(), false));
    }
    let trimmed = s.trim_start_matches(TRIM_SPACE);
    let ws = s.len() - trimmed.len();
    if ws > 0 && trimmed.starts_with("-}}") {
        return Some((ws + 3, true));
    }
    None
}

fn count_lines(s: &str) -> usize {
    s.matches('\n').count()
}
