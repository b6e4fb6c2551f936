//! Builds the node tree from lexed items.

use std::collections::BTreeMap;

use super::lexer::{Item, Token};
use super::{FuncMap, SyntaxError};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(String),
    Action {
        pipe: Pipeline,
        line: usize,
    },
    If {
        branches: Vec<(Pipeline, Vec<Node>)>,
        otherwise: Vec<Node>,
        line: usize,
    },
    Template {
        name: String,
        pipe: Option<Pipeline>,
        line: usize,
    },
}

/// Commands joined by `|`; each command's result is passed as the last
/// argument of the next.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pipeline {
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Command {
    pub args: Vec<Arg>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Arg {
    Dot,
    Nil,
    Field(Vec<String>),
    Func(String),
    Str(String),
    Int(i64),
    Bool(bool),
    Pipeline(Pipeline),
}

#[derive(Debug)]
pub(crate) struct Parsed {
    pub root: Vec<Node>,
    pub defines: BTreeMap<String, Vec<Node>>,
}

pub(crate) fn parse(items: Vec<Item>, funcs: &FuncMap) -> Result<Parsed, SyntaxError> {
    let mut parser = Parser {
        items: items.into_iter(),
        funcs,
        defines: BTreeMap::new(),
        line: 1,
    };

    let (root, end) = parser.list(true)?;
    match end {
        Terminator::Eof => Ok(Parsed {
            root,
            defines: parser.defines,
        }),
        Terminator::End(line) => Err(SyntaxError {
            line,
            message: "unexpected {{end}}".into(),
        }),
        Terminator::Else(line, _) => Err(SyntaxError {
            line,
            message: "unexpected {{else}}".into(),
        }),
    }
}

enum Terminator {
    Eof,
    End(usize),
    Else(usize, Option<Pipeline>),
}

struct Parser<'a> {
    items: std::vec::IntoIter<Item>,
    funcs: &'a FuncMap,
    defines: BTreeMap<String, Vec<Node>>,
    line: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line: self.line,
            message: message.into(),
        }
    }

    /// Parse nodes until `{{end}}`, `{{else}}` or end of input.
    fn list(&mut self, top_level: bool) -> Result<(Vec<Node>, Terminator), SyntaxError> {
        let mut nodes = Vec::new();

        while let Some(item) = self.items.next() {
            let (tokens, line) = match item {
                Item::Text(text) => {
                    nodes.push(Node::Text(text));
                    continue;
                }
                Item::Action { tokens, line } => (tokens, line),
            };
            self.line = line;

            let keyword = match tokens.first() {
                Some(Token::Ident(name)) => name.as_str(),
                Some(_) => "",
                None => return Err(self.error("missing value for command")),
            };

            match keyword {
                "end" => {
                    if tokens.len() != 1 {
                        return Err(self.error("unexpected arguments after end"));
                    }
                    return Ok((nodes, Terminator::End(line)));
                }
                "else" => {
                    let branch = match &tokens[1..] {
                        [] => None,
                        [Token::Ident(kw), rest @ ..] if kw == "if" => Some(self.pipeline(rest)?),
                        _ => return Err(self.error("unexpected arguments after else")),
                    };
                    return Ok((nodes, Terminator::Else(line, branch)));
                }
                "if" => nodes.push(self.if_block(&tokens[1..], line)?),
                "define" => {
                    if !top_level {
                        return Err(self.error("define is only allowed at the top level"));
                    }
                    self.define(&tokens[1..])?;
                }
                "template" => nodes.push(self.template(&tokens[1..], line)?),
                "range" | "with" | "block" | "break" | "continue" => {
                    return Err(self.error(format!("{{{{{}}}}} is not supported", keyword)));
                }
                _ => nodes.push(Node::Action {
                    pipe: self.pipeline(&tokens)?,
                    line,
                }),
            }
        }

        Ok((nodes, Terminator::Eof))
    }

    fn if_block(&mut self, tokens: &[Token], line: usize) -> Result<Node, SyntaxError> {
        let mut branches = Vec::new();
        let mut condition = self.pipeline(tokens)?;

        loop {
            let (body, end) = self.list(false)?;
            branches.push((condition, body));
            match end {
                Terminator::End(_) => {
                    return Ok(Node::If {
                        branches,
                        otherwise: Vec::new(),
                        line,
                    })
                }
                Terminator::Else(_, Some(next)) => condition = next,
                Terminator::Else(_, None) => {
                    let (otherwise, end) = self.list(false)?;
                    return match end {
                        Terminator::End(_) => Ok(Node::If {
                            branches,
                            otherwise,
                            line,
                        }),
                        Terminator::Else(else_line, _) => Err(SyntaxError {
                            line: else_line,
                            message: "expected end; found {{else}}".into(),
                        }),
                        Terminator::Eof => Err(self.error("unexpected EOF in if")),
                    };
                }
                Terminator::Eof => return Err(self.error("unexpected EOF in if")),
            }
        }
    }

    fn define(&mut self, tokens: &[Token]) -> Result<(), SyntaxError> {
        let name = match tokens {
            [Token::Str(name)] => name.clone(),
            _ => return Err(self.error("define expects a single quoted name")),
        };

        let (body, end) = self.list(false)?;
        match end {
            Terminator::End(_) => {}
            Terminator::Else(line, _) => {
                return Err(SyntaxError {
                    line,
                    message: format!("unexpected {{{{else}}}} in define {:?}", name),
                })
            }
            Terminator::Eof => {
                return Err(self.error(format!("unexpected EOF in define {:?}", name)))
            }
        }

        if self.defines.contains_key(&name) {
            return Err(self.error(format!("multiple definition of template {:?}", name)));
        }
        self.defines.insert(name, body);
        Ok(())
    }

    fn template(&mut self, tokens: &[Token], line: usize) -> Result<Node, SyntaxError> {
        let (name, rest) = match tokens {
            [Token::Str(name), rest @ ..] => (name.clone(), rest),
            _ => return Err(self.error("template expects a quoted name")),
        };
        let pipe = if rest.is_empty() {
            None
        } else {
            Some(self.pipeline(rest)?)
        };
        Ok(Node::Template { name, pipe, line })
    }

    fn pipeline(&self, tokens: &[Token]) -> Result<Pipeline, SyntaxError> {
        let mut cursor = Cursor { tokens, pos: 0 };
        let pipe = self.pipeline_until(&mut cursor, false)?;
        if cursor.pos < tokens.len() {
            return Err(self.error("unexpected right paren"));
        }
        Ok(pipe)
    }

    fn pipeline_until(&self, cursor: &mut Cursor<'_>, nested: bool) -> Result<Pipeline, SyntaxError> {
        let mut commands = Vec::new();
        let mut args = Vec::new();

        loop {
            let Some(token) = cursor.next() else {
                if nested {
                    return Err(self.error("unclosed left paren"));
                }
                break;
            };

            match token {
                Token::RightParen if nested => break,
                Token::RightParen => {
                    cursor.pos -= 1;
                    break;
                }
                Token::Pipe => {
                    if args.is_empty() {
                        return Err(self.error("missing command before |"));
                    }
                    commands.push(Command {
                        args: std::mem::take(&mut args),
                    });
                }
                Token::LeftParen => args.push(Arg::Pipeline(self.pipeline_until(cursor, true)?)),
                Token::Dot => args.push(Arg::Dot),
                Token::Field(names) => args.push(Arg::Field(names.clone())),
                Token::Str(s) => args.push(Arg::Str(s.clone())),
                Token::Int(i) => args.push(Arg::Int(*i)),
                Token::Bool(b) => args.push(Arg::Bool(*b)),
                Token::Ident(name) if name == "nil" => args.push(Arg::Nil),
                Token::Ident(name) => {
                    if !self.funcs.contains(name) {
                        return Err(self.error(format!("function {:?} not defined", name)));
                    }
                    args.push(Arg::Func(name.clone()));
                }
            }
        }

        if args.is_empty() {
            let message = if commands.is_empty() {
                "missing value for command"
            } else {
                "missing command after |"
            };
            return Err(self.error(message));
        }
        commands.push(Command { args });

        Ok(Pipeline { commands })
    }
}

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lexer::lex;

    fn parse_text(text: &str) -> Result<Parsed, SyntaxError> {
        parse(lex(text)?, &FuncMap::builtins())
    }

    #[test]
    fn test_pipeline_structure() {
        let parsed = parse_text(r#"{{ printf "%s" .A | printf "%s!" }}"#).unwrap();
        let Node::Action { pipe, .. } = &parsed.root[0] else {
            panic!("expected an action");
        };
        assert_eq!(pipe.commands.len(), 2);
        assert_eq!(
            pipe.commands[0].args,
            vec![
                Arg::Func("printf".into()),
                Arg::Str("%s".into()),
                Arg::Field(vec!["A".into()]),
            ]
        );
    }

    #[test]
    fn test_nested_parens() {
        let parsed = parse_text("{{ not (eq (printf \"%d\" 1) \"1\") }}").unwrap();
        let Node::Action { pipe, .. } = &parsed.root[0] else {
            panic!("expected an action");
        };
        assert!(matches!(pipe.commands[0].args[1], Arg::Pipeline(_)));
    }

    #[test]
    fn test_else_if_branches() {
        let parsed = parse_text("{{if .A}}a{{else if .B}}b{{else}}c{{end}}").unwrap();
        let Node::If { branches, otherwise, .. } = &parsed.root[0] else {
            panic!("expected if");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(otherwise, &vec![Node::Text("c".into())]);
    }

    #[test]
    fn test_defines_are_collected() {
        let parsed = parse_text("root{{define \"a\"}}A{{end}}{{define \"b\"}}B{{end}}").unwrap();
        assert_eq!(parsed.root, vec![Node::Text("root".into())]);
        assert_eq!(parsed.defines.len(), 2);
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse_text("{{ }}").is_err());
        assert!(parse_text("{{ (.A }}").is_err());
        assert!(parse_text("{{ .A) }}").is_err());
        assert!(parse_text("{{ | printf }}").is_err());
        assert!(parse_text("{{ .A | }}").is_err());
        assert!(parse_text("{{ template .A }}").is_err());
        assert!(parse_text("{{ if .A }}{{ else }}{{ else }}{{ end }}").is_err());
        assert!(parse_text("{{ define \"x\" }}").is_err());
    }

    #[test]
    fn test_error_line_is_reported() {
        let err = parse_text("a\nb\n{{ Unknown }}").unwrap_err();
        assert_eq!(err.line, 3);
    }
}
