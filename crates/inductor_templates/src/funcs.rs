//! Helper functions available to every template.

use serde_json::Value;

use crate::engine::FuncMap;

/// Longest NetBIOS computer name Windows accepts.
pub const MAX_COMPUTER_NAME_LEN: usize = 15;

const INVALID_COMPUTER_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Make `name` usable as a Windows computer name: drop characters Windows
/// rejects and keep at most fifteen characters. An empty name becomes
/// `computername`.
pub fn safe_computer_name(name: &str) -> String {
    if name.is_empty() {
        return "computername".to_string();
    }
    name.chars()
        .filter(|c| !INVALID_COMPUTER_NAME_CHARS.contains(c))
        .take(MAX_COMPUTER_NAME_LEN)
        .collect()
}

/// Builtins plus `Contains`, `Replace`, `ToUpper`, `ToLower` and `SafeComputerName`.
pub fn template_funcs() -> FuncMap {
    FuncMap::builtins()
        .with("Contains", contains)
        .with("Replace", replace)
        .with("ToUpper", to_upper)
        .with("ToLower", to_lower)
        .with("SafeComputerName", safe_computer_name_func)
}

fn string_arg<'v>(name: &str, args: &'v [Value], index: usize) -> Result<&'v str, String> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(format!("{}: argument {} must be a string, got {}", name, index + 1, other)),
        None => Err(format!("{}: missing argument {}", name, index + 1)),
    }
}

fn expect_args(name: &str, args: &[Value], counts: &[usize]) -> Result<(), String> {
    if counts.contains(&args.len()) {
        return Ok(());
    }
    Err(format!(
        "{}: wrong number of args: want {:?} got {}",
        name,
        counts,
        args.len()
    ))
}

fn contains(args: &[Value]) -> Result<Value, String> {
    expect_args("Contains", args, &[2])?;
    let haystack = string_arg("Contains", args, 0)?;
    let needle = string_arg("Contains", args, 1)?;
    Ok(Value::Bool(haystack.contains(needle)))
}

/// `Replace s old new [n]`; a negative or missing `n` replaces every match.
fn replace(args: &[Value]) -> Result<Value, String> {
    expect_args("Replace", args, &[3, 4])?;
    let s = string_arg("Replace", args, 0)?;
    let old = string_arg("Replace", args, 1)?;
    let new = string_arg("Replace", args, 2)?;

    let limit = match args.get(3) {
        None => None,
        Some(value) => {
            let n = value
                .as_i64()
                .ok_or_else(|| format!("Replace: count must be an integer, got {}", value))?;
            usize::try_from(n).ok()
        }
    };

    let replaced = match limit {
        Some(n) => replacen(s, old, new, n),
        None if old.is_empty() => replacen(s, old, new, usize::MAX),
        None => s.replace(old, new),
    };
    Ok(Value::String(replaced))
}

/// Like `str::replacen`, except an empty `old` matches before every
/// character and at the end, as Go's `strings.Replace` does.
fn replacen(s: &str, old: &str, new: &str, n: usize) -> String {
    if !old.is_empty() {
        return s.replacen(old, new, n);
    }

    let mut out = String::with_capacity(s.len());
    let mut done = 0;
    for c in s.chars() {
        if done < n {
            out.push_str(new);
            done += 1;
        }
        out.push(c);
    }
    if done < n {
        out.push_str(new);
    }
    out
}

fn to_upper(args: &[Value]) -> Result<Value, String> {
    expect_args("ToUpper", args, &[1])?;
    Ok(Value::String(string_arg("ToUpper", args, 0)?.to_uppercase()))
}

fn to_lower(args: &[Value]) -> Result<Value, String> {
    expect_args("ToLower", args, &[1])?;
    Ok(Value::String(string_arg("ToLower", args, 0)?.to_lowercase()))
}

fn safe_computer_name_func(args: &[Value]) -> Result<Value, String> {
    expect_args("SafeComputerName", args, &[1])?;
    Ok(Value::String(safe_computer_name(string_arg(
        "SafeComputerName",
        args,
        0,
    )?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Template;
    use serde_json::json;

    fn render(text: &str, data: Value) -> String {
        Template::parse("funcs", text, template_funcs())
            .unwrap()
            .execute(&data)
            .unwrap()
    }

    #[test]
    fn test_safe_computer_name() {
        assert_eq!(safe_computer_name(""), "computername");
        assert_eq!(safe_computer_name("vagrant-win10"), "vagrant-win10");
        assert_eq!(safe_computer_name("a\\b/c:d*e?f\"g<h>i|j"), "abcdefghij");
        assert_eq!(safe_computer_name("vagrant-win2012r2core"), "vagrant-win2012");
        assert_eq!(safe_computer_name("vagrant-win2012r2core").len(), MAX_COMPUTER_NAME_LEN);
    }

    #[test]
    fn test_safe_computer_name_mixed_invalid_and_long() {
        let name = "ab\\cd/ef:gh*ij?kl\"mn<op>qr|st";
        assert_eq!(safe_computer_name(name), "abcdefghijklmno");
    }

    #[test]
    fn test_safe_computer_name_only_invalid_chars() {
        assert_eq!(safe_computer_name("***"), "");
    }

    #[test]
    fn test_replace() {
        assert_eq!(replace(&[json!("windows10"), json!("windows"), json!("win")]).unwrap(), json!("win10"));
        assert_eq!(
            replace(&[json!("a.a.a"), json!("a"), json!("b"), json!(-1)]).unwrap(),
            json!("b.b.b")
        );
        assert_eq!(
            replace(&[json!("a.a.a"), json!("a"), json!("b"), json!(2)]).unwrap(),
            json!("b.b.a")
        );
        assert_eq!(
            replace(&[json!("ab"), json!(""), json!("-"), json!(-1)]).unwrap(),
            json!("-a-b-")
        );
        assert!(replace(&[json!("a"), json!("b")]).is_err());
        assert!(replace(&[json!("a"), json!("b"), json!("c"), json!("x")]).is_err());
    }

    #[test]
    fn test_contains_and_case() {
        assert_eq!(contains(&[json!("windows2012r2"), json!("2012")]).unwrap(), json!(true));
        assert_eq!(contains(&[json!("nano"), json!("2012")]).unwrap(), json!(false));
        assert_eq!(to_upper(&[json!("winrm")]).unwrap(), json!("WINRM"));
        assert_eq!(to_lower(&[json!("SSH")]).unwrap(), json!("ssh"));
        assert!(to_upper(&[json!(1)]).is_err());
    }

    #[test]
    fn test_computer_name_expression() {
        let out = render(
            r#"{{ SafeComputerName ( printf "vagrant-%s" ( Replace .OSName "windows" "win" -1 )) }}"#,
            json!({"OSName": "windows2012r2"}),
        );
        assert_eq!(out, "vagrant-win2012");
    }

    #[test]
    fn test_funcs_in_conditions() {
        let text = r#"{{ if Contains .OSName "nano" }}nano{{ else }}{{ ToUpper .OSName }}{{ end }}"#;
        assert_eq!(render(text, json!({"OSName": "nano"})), "nano");
        assert_eq!(render(text, json!({"OSName": "windows10"})), "WINDOWS10");
    }
}
