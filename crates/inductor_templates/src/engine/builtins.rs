//! Builtin template functions and value formatting.

use serde_json::{Number, Value};

/// Truthiness: false, zero, nil and empty strings/arrays/objects are false.
pub fn is_true(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Print a value the way an action emits it.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "<no value>".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(" "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}:{}", k, format_value(v)))
                .collect();
            format!("map[{}]", entries.join(" "))
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "<nil>",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float64",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "[]interface {}",
        Value::Object(_) => "map[string]interface {}",
    }
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), String> {
    if args.len() != expected {
        return Err(format!(
            "wrong number of args for {}: want {} got {}",
            name,
            expected,
            args.len()
        ));
    }
    Ok(())
}

fn equal(a: &Value, b: &Value) -> Result<bool, String> {
    match (a, b) {
        (Value::Null, Value::Null) => Ok(true),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        (Value::String(x), Value::String(y)) => Ok(x == y),
        (Value::Number(x), Value::Number(y)) => Ok(numbers_equal(x, y)),
        (Value::Array(_), _) | (Value::Object(_), _) => {
            Err(format!("non-comparable type {}", type_name(a)))
        }
        (_, Value::Array(_)) | (_, Value::Object(_)) => {
            Err(format!("non-comparable type {}", type_name(b)))
        }
        _ => Err("incompatible types for comparison".to_string()),
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (x.as_i64(), y.as_i64()) {
        (Some(a), Some(b)) => a == b,
        _ => x.as_f64() == y.as_f64(),
    }
}

/// `eq a b [c ...]`: true when `a` equals any of the others.
pub(crate) fn eq(args: &[Value]) -> Result<Value, String> {
    let (first, rest) = args
        .split_first()
        .ok_or_else(|| "missing argument for comparison".to_string())?;
    if rest.is_empty() {
        return Err("missing argument for comparison".to_string());
    }
    for other in rest {
        if equal(first, other)? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

pub(crate) fn ne(args: &[Value]) -> Result<Value, String> {
    arity("ne", args, 2)?;
    Ok(Value::Bool(!equal(&args[0], &args[1])?))
}

pub(crate) fn not(args: &[Value]) -> Result<Value, String> {
    arity("not", args, 1)?;
    Ok(Value::Bool(!is_true(&args[0])))
}

/// First false argument, or the last one.
pub(crate) fn and(args: &[Value]) -> Result<Value, String> {
    if args.len() < 2 {
        return Err(format!("wrong number of args for and: want at least 2 got {}", args.len()));
    }
    let found = args.iter().find(|v| !is_true(v)).unwrap_or(&args[args.len() - 1]);
    Ok(found.clone())
}

/// First true argument, or the last one.
pub(crate) fn or(args: &[Value]) -> Result<Value, String> {
    if args.len() < 2 {
        return Err(format!("wrong number of args for or: want at least 2 got {}", args.len()));
    }
    let found = args.iter().find(|v| is_true(v)).unwrap_or(&args[args.len() - 1]);
    Ok(found.clone())
}

/// `printf format args...` supporting `%s %d %v %t %q %%`.
///
/// Bad verbs and argument mismatches are written into the output
/// (`%!d(string=x)`, `%!s(MISSING)`) rather than failing.
pub(crate) fn printf(args: &[Value]) -> Result<Value, String> {
    let (format, values) = match args.split_first() {
        Some((Value::String(format), values)) => (format, values),
        Some((other, _)) => return Err(format!("format must be a string, got {}", type_name(other))),
        None => return Err("wrong number of args for printf: want at least 1 got 0".to_string()),
    };

    let mut out = String::new();
    let mut values = values.iter();
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        let Some(value) = values.next() else {
            out.push_str(&format!("%!{}(MISSING)", verb));
            continue;
        };
        out.push_str(&format_verb(verb, value));
    }

    let extra: Vec<String> = values
        .map(|v| format!("{}={}", type_name(v), format_value(v)))
        .collect();
    if !extra.is_empty() {
        out.push_str(&format!("%!(EXTRA {})", extra.join(", ")));
    }

    Ok(Value::String(out))
}

fn format_verb(verb: char, value: &Value) -> String {
    match (verb, value) {
        ('v', _) => format_value(value),
        ('s', Value::String(s)) => s.clone(),
        ('q', Value::String(s)) => format!("{:?}", s),
        ('t', Value::Bool(b)) => b.to_string(),
        ('d', Value::Number(n)) if n.as_i64().is_some() || n.as_u64().is_some() => n.to_string(),
        _ => format!("%!{}({}={})", verb, type_name(value), format_value(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    #[test]
    fn test_is_true() {
        assert!(!is_true(&json!(null)));
        assert!(!is_true(&json!(0)));
        assert!(!is_true(&json!("")));
        assert!(!is_true(&json!([])));
        assert!(is_true(&json!(61400)));
        assert!(is_true(&json!("winrm")));
        assert!(is_true(&json!({"a": 1})));
    }

    #[test]
    fn test_eq() {
        assert_eq!(eq(&[s("ssh"), s("ssh")]).unwrap(), json!(true));
        assert_eq!(eq(&[s("ssh"), s("winrm")]).unwrap(), json!(false));
        assert_eq!(eq(&[s("a"), s("b"), s("a")]).unwrap(), json!(true));
        assert_eq!(eq(&[json!(2), json!(2)]).unwrap(), json!(true));
        assert!(eq(&[s("2"), json!(2)]).is_err());
        assert!(eq(&[s("a")]).is_err());
        assert!(eq(&[json!([1]), json!([1])]).is_err());
    }

    #[test]
    fn test_ne_not_and_or() {
        assert_eq!(ne(&[s("a"), s("b")]).unwrap(), json!(true));
        assert_eq!(not(&[json!(false)]).unwrap(), json!(true));
        assert!(not(&[]).is_err());
        assert_eq!(and(&[json!(1), s(""), json!(2)]).unwrap(), s(""));
        assert_eq!(and(&[json!(1), json!(2)]).unwrap(), json!(2));
        assert_eq!(or(&[s(""), s("x")]).unwrap(), s("x"));
        assert_eq!(or(&[s(""), json!(0)]).unwrap(), json!(0));
    }

    #[test]
    fn test_printf() {
        assert_eq!(
            printf(&[s("vagrant-%s"), s("win10")]).unwrap(),
            s("vagrant-win10")
        );
        assert_eq!(
            printf(&[s("%d MB, %v cpus, %t, %q, 100%%"), json!(2048), json!(2), json!(true), s("a\"b")]).unwrap(),
            s("2048 MB, 2 cpus, true, \"a\\\"b\", 100%")
        );
    }

    #[test]
    fn test_printf_mismatches() {
        assert_eq!(printf(&[s("%d"), s("x")]).unwrap(), s("%!d(string=x)"));
        assert_eq!(printf(&[s("%s")]).unwrap(), s("%!s(MISSING)"));
        assert_eq!(printf(&[s("a"), json!(1)]).unwrap(), s("a%!(EXTRA int=1)"));
        assert!(printf(&[json!(1)]).is_err());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!(null)), "<no value>");
        assert_eq!(format_value(&json!([1, "a"])), "[1 a]");
        assert_eq!(format_value(&json!({"k": true})), "map[k:true]");
    }
}
