//! A small text template engine compatible with the subset of Go's
//! `text/template` used by Packer, Autounattend and Vagrant templates.
//!
//! Supported: text, `{{ pipeline }}`, `if`/`else if`/`else`/`end`,
//! top level `define`, `template "name" [pipeline]`, comments, trim markers,
//! string/raw string/integer/boolean literals, `.Field` access,
//! parenthesised pipelines and `|` chaining. Data is a [`serde_json::Value`].

mod builtins;
mod exec;
mod lexer;
mod parser;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::{TemplateError, TemplateResult};

pub use builtins::{format_value, is_true};

/// A template function. Receives evaluated arguments, the piped value last.
pub type Func = fn(&[Value]) -> Result<Value, String>;

/// Functions callable from templates, by name.
#[derive(Clone)]
pub struct FuncMap {
    funcs: BTreeMap<&'static str, Func>,
}

impl FuncMap {
    /// An empty map. Templates parsed against it can still use the
    /// builtins, which are always present.
    pub fn empty() -> Self {
        Self {
            funcs: BTreeMap::new(),
        }
    }

    /// `eq`, `ne`, `not`, `and`, `or` and `printf`.
    pub fn builtins() -> Self {
        let mut map = Self::empty();
        map.insert("eq", builtins::eq);
        map.insert("ne", builtins::ne);
        map.insert("not", builtins::not);
        map.insert("and", builtins::and);
        map.insert("or", builtins::or);
        map.insert("printf", builtins::printf);
        map
    }

    pub fn insert(&mut self, name: &'static str, func: Func) {
        self.funcs.insert(name, func);
    }

    pub fn with(mut self, name: &'static str, func: Func) -> Self {
        self.insert(name, func);
        self
    }

    pub fn get(&self, name: &str) -> Option<Func> {
        self.funcs.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.funcs.keys().copied()
    }
}

impl Default for FuncMap {
    fn default() -> Self {
        Self::builtins()
    }
}

impl fmt::Debug for FuncMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.funcs.keys()).finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SyntaxError {
    pub line: usize,
    pub message: String,
}

/// A parsed template with its `define` blocks.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    root: Vec<parser::Node>,
    defines: BTreeMap<String, Vec<parser::Node>>,
    funcs: FuncMap,
}

impl Template {
    /// Parse `text`. Every function a template calls must be in `funcs`
    /// or be one of the builtins.
    pub fn parse(name: impl Into<String>, text: &str, funcs: FuncMap) -> TemplateResult<Self> {
        let name = name.into();
        let mut funcs = funcs;
        for (builtin, func) in FuncMap::builtins().funcs {
            funcs.funcs.entry(builtin).or_insert(func);
        }

        let parse_error = |e: SyntaxError| TemplateError::Parse {
            template: name.clone(),
            line: e.line,
            message: e.message,
        };

        let items = lexer::lex(text).map_err(parse_error)?;
        let parsed = parser::parse(items, &funcs).map_err(parse_error)?;

        Ok(Self {
            name,
            root: parsed.root,
            defines: parsed.defines,
            funcs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the `define` blocks, sorted.
    pub fn defined_templates(&self) -> Vec<&str> {
        self.defines.keys().map(String::as_str).collect()
    }

    /// Execute the main body against `data`.
    pub fn execute(&self, data: &Value) -> TemplateResult<String> {
        exec::execute(self, data).map_err(|e| TemplateError::Execution {
            template: self.name.clone(),
            line: e.line,
            message: e.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(text: &str, data: Value) -> TemplateResult<String> {
        Template::parse("test", text, FuncMap::builtins())?.execute(&data)
    }

    fn upper(args: &[Value]) -> Result<Value, String> {
        match args {
            [Value::String(s)] => Ok(Value::String(s.to_uppercase())),
            _ => Err("expected one string".into()),
        }
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        assert_eq!(render("no actions here", json!({})).unwrap(), "no actions here");
    }

    #[test]
    fn test_field_substitution() {
        let out = render(
            "box {{ .OSName }} with {{.RAM}}MB, headless={{ .Headless }}",
            json!({"OSName": "windows10", "RAM": 2048, "Headless": true}),
        )
        .unwrap();
        assert_eq!(out, "box windows10 with 2048MB, headless=true");
    }

    #[test]
    fn test_nested_fields() {
        let out = render("{{ .A.B }}", json!({"A": {"B": "deep"}})).unwrap();
        assert_eq!(out, "deep");
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let err = render("line one\n{{ .Nope }}", json!({"OSName": "x"})).unwrap_err();
        match err {
            TemplateError::Execution { template, line, message } => {
                assert_eq!(template, "test");
                assert_eq!(line, 2);
                assert!(message.contains("Nope"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_if_else_chain() {
        let text = r#"{{ if eq .Communicator "ssh" }}ssh{{ else if eq .Communicator "winrm" }}winrm{{ else }}other{{ end }}"#;
        assert_eq!(render(text, json!({"Communicator": "ssh"})).unwrap(), "ssh");
        assert_eq!(render(text, json!({"Communicator": "winrm"})).unwrap(), "winrm");
        assert_eq!(render(text, json!({"Communicator": "none"})).unwrap(), "other");
    }

    #[test]
    fn test_if_truthiness() {
        let text = "{{ if .ProductKey }}key={{ .ProductKey }}{{ end }}";
        assert_eq!(render(text, json!({"ProductKey": ""})).unwrap(), "");
        assert_eq!(render(text, json!({"ProductKey": "ABC"})).unwrap(), "key=ABC");
        assert_eq!(render("{{ if not .WindowsUpdates }}skip{{ end }}", json!({"WindowsUpdates": false})).unwrap(), "skip");
    }

    #[test]
    fn test_define_and_template() {
        let text = "<a>{{ template \"disks\" . }}</a>\n{{define \"disks\"}}\n<d>{{ .Disk }}</d>\n{{end}}";
        let tmpl = Template::parse("root", text, FuncMap::builtins()).unwrap();
        assert_eq!(tmpl.defined_templates(), vec!["disks"]);
        assert_eq!(tmpl.execute(&json!({"Disk": 1})).unwrap(), "<a>\n<d>1</d>\n</a>\n");
    }

    #[test]
    fn test_template_without_data_gets_nil_dot() {
        let text = "{{ template \"t\" }}{{ define \"t\" }}[{{ . }}]{{ end }}";
        assert_eq!(render(text, json!({"A": 1})).unwrap(), "[<no value>]");
    }

    #[test]
    fn test_undefined_template_is_an_error() {
        assert!(matches!(
            render("{{ template \"missing\" . }}", json!({})),
            Err(TemplateError::Execution { .. })
        ));
    }

    #[test]
    fn test_duplicate_define_is_a_parse_error() {
        let text = "{{define \"a\"}}1{{end}}{{define \"a\"}}2{{end}}";
        assert!(matches!(render(text, json!({})), Err(TemplateError::Parse { .. })));
    }

    #[test]
    fn test_recursive_template_is_stopped() {
        let text = "{{ template \"loop\" . }}{{ define \"loop\" }}{{ template \"loop\" . }}{{ end }}";
        assert!(matches!(render(text, json!({})), Err(TemplateError::Execution { .. })));
    }

    #[test]
    fn test_custom_functions_and_pipes() {
        let funcs = FuncMap::builtins().with("ToUpper", upper);
        let tmpl = Template::parse(
            "t",
            r#"{{ .Name | ToUpper }} {{ ToUpper (printf "%s-%d" .Name 7) }}"#,
            funcs,
        )
        .unwrap();
        assert_eq!(tmpl.execute(&json!({"Name": "box"})).unwrap(), "BOX BOX-7");
    }

    #[test]
    fn test_unknown_function_is_a_parse_error() {
        let err = render("{{ Frobnicate .X }}", json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { ref message, .. } if message.contains("Frobnicate")));
    }

    #[test]
    fn test_escaped_delimiters() {
        let out = render(r#"{{"{{"}} .HTTPIP {{"}}"}}"#, json!({})).unwrap();
        assert_eq!(out, "{{ .HTTPIP }}");
    }

    #[test]
    fn test_unsupported_actions() {
        assert!(render("{{ range .X }}{{ end }}", json!({"X": []})).is_err());
        assert!(render("{{ with .X }}{{ end }}", json!({"X": 1})).is_err());
    }

    #[test]
    fn test_unbalanced_blocks() {
        assert!(matches!(render("{{ if true }}open", json!({})), Err(TemplateError::Parse { .. })));
        assert!(matches!(render("{{ end }}", json!({})), Err(TemplateError::Parse { .. })));
        assert!(matches!(render("{{ else }}", json!({})), Err(TemplateError::Parse { .. })));
    }

    #[test]
    fn test_define_only_at_top_level() {
        let text = "{{ if true }}{{ define \"x\" }}{{ end }}{{ end }}";
        assert!(matches!(render(text, json!({})), Err(TemplateError::Parse { .. })));
    }

    #[test]
    fn test_builtins_always_available() {
        let tmpl = Template::parse("t", "{{ printf \"%d\" 3 }}", FuncMap::empty()).unwrap();
        assert_eq!(tmpl.execute(&json!({})).unwrap(), "3");
    }
}
