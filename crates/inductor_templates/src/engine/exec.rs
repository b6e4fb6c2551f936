//! Evaluates a parsed template against JSON data.

use serde_json::Value;

use super::builtins::{format_value, is_true};
use super::parser::{Arg, Command, Node, Pipeline};
use super::Template;

/// Nested `{{template}}` calls allowed before execution gives up.
const MAX_TEMPLATE_DEPTH: usize = 100;

#[derive(Debug)]
pub(crate) struct ExecError {
    pub line: usize,
    pub message: String,
}

pub(crate) fn execute(template: &Template, data: &Value) -> Result<String, ExecError> {
    let mut state = State {
        template,
        out: String::new(),
        depth: 0,
    };
    state.walk(&template.root, data)?;
    Ok(state.out)
}

struct State<'a> {
    template: &'a Template,
    out: String,
    depth: usize,
}

impl<'a> State<'a> {
    fn walk(&mut self, nodes: &[Node], dot: &Value) -> Result<(), ExecError> {
        for node in nodes {
            match node {
                Node::Text(text) => self.out.push_str(text),
                Node::Action { pipe, line } => {
                    let value = self.pipeline(pipe, dot, *line)?;
                    self.out.push_str(&format_value(&value));
                }
                Node::If {
                    branches,
                    otherwise,
                    line,
                } => {
                    let mut taken = None;
                    for (condition, body) in branches {
                        if is_true(&self.pipeline(condition, dot, *line)?) {
                            taken = Some(body);
                            break;
                        }
                    }
                    self.walk(taken.unwrap_or(otherwise), dot)?;
                }
                Node::Template { name, pipe, line } => {
                    let template = self.template;
                    let body = template.defines.get(name).ok_or_else(|| ExecError {
                        line: *line,
                        message: format!("no such template {:?}", name),
                    })?;
                    let next_dot = match pipe {
                        Some(pipe) => self.pipeline(pipe, dot, *line)?,
                        None => Value::Null,
                    };

                    if self.depth >= MAX_TEMPLATE_DEPTH {
                        return Err(ExecError {
                            line: *line,
                            message: format!(
                                "exceeded maximum template depth ({}) calling {:?}",
                                MAX_TEMPLATE_DEPTH, name
                            ),
                        });
                    }
                    self.depth += 1;
                    self.walk(body, &next_dot)?;
                    self.depth -= 1;
                }
            }
        }
        Ok(())
    }

    fn pipeline(&self, pipe: &Pipeline, dot: &Value, line: usize) -> Result<Value, ExecError> {
        let mut piped = None;
        for command in &pipe.commands {
            piped = Some(self.command(command, dot, piped, line)?);
        }
        Ok(piped.unwrap_or(Value::Null))
    }

    fn command(
        &self,
        command: &Command,
        dot: &Value,
        piped: Option<Value>,
        line: usize,
    ) -> Result<Value, ExecError> {
        let error = |message: String| ExecError { line, message };

        let (first, rest) = command
            .args
            .split_first()
            .ok_or_else(|| error("empty command".into()))?;

        if let Arg::Func(name) = first {
            let mut args = rest
                .iter()
                .map(|arg| self.arg(arg, dot, line))
                .collect::<Result<Vec<_>, _>>()?;
            args.extend(piped);
            return self.call(name, &args, line);
        }

        if !rest.is_empty() || piped.is_some() {
            return Err(error(format!("can't give argument to non-function {}", describe(first))));
        }
        self.arg(first, dot, line)
    }

    fn arg(&self, arg: &Arg, dot: &Value, line: usize) -> Result<Value, ExecError> {
        match arg {
            Arg::Dot => Ok(dot.clone()),
            Arg::Nil => Ok(Value::Null),
            Arg::Str(s) => Ok(Value::String(s.clone())),
            Arg::Int(i) => Ok(Value::from(*i)),
            Arg::Bool(b) => Ok(Value::Bool(*b)),
            Arg::Field(names) => field(dot, names).map_err(|message| ExecError { line, message }),
            Arg::Func(name) => self.call(name, &[], line),
            Arg::Pipeline(pipe) => self.pipeline(pipe, dot, line),
        }
    }

    fn call(&self, name: &str, args: &[Value], line: usize) -> Result<Value, ExecError> {
        let func = self.template.funcs.get(name).ok_or_else(|| ExecError {
            line,
            message: format!("function {:?} not defined", name),
        })?;
        func(args).map_err(|message| ExecError {
            line,
            message: format!("error calling {}: {}", name, message),
        })
    }
}

fn field(dot: &Value, names: &[String]) -> Result<Value, String> {
    let mut current = dot;
    for name in names {
        current = match current {
            Value::Object(map) => map
                .get(name)
                .ok_or_else(|| format!("can't evaluate field {} in {}", name, kind(current)))?,
            other => return Err(format!("can't evaluate field {} in type {}", name, kind(other))),
        };
    }
    Ok(current.clone())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn describe(arg: &Arg) -> String {
    match arg {
        Arg::Dot => ".".into(),
        Arg::Nil => "nil".into(),
        Arg::Field(names) => format!(".{}", names.join(".")),
        Arg::Func(name) => name.clone(),
        Arg::Str(s) => format!("{:?}", s),
        Arg::Int(i) => i.to_string(),
        Arg::Bool(b) => b.to_string(),
        Arg::Pipeline(_) => "(pipeline)".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_lookup() {
        let data = json!({"A": {"B": 1}});
        assert_eq!(field(&data, &["A".into(), "B".into()]).unwrap(), json!(1));
        assert!(field(&data, &["A".into(), "C".into()]).is_err());
        assert!(field(&data, &["A".into(), "B".into(), "C".into()]).is_err());
        assert!(field(&json!(null), &["A".into()]).is_err());
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&Arg::Field(vec!["A".into(), "B".into()])), ".A.B");
        assert_eq!(describe(&Arg::Str("x".into())), "\"x\"");
    }
}
