//! Placeholder substitution for command templates.
//!
//! `$1`..`$9` take the matching positional argument, `$@` and `$*` take all
//! arguments joined by a single space. Nothing is quoted here; the
//! sanitizer's expanded stage is what guards the result.

use crate::error::{DevctlError, Result};

/// Substitute placeholders in `template` with `args` in a single pass.
///
/// Substituted values are never re-scanned, so an argument containing `$2`
/// stays literal. A positional placeholder without a matching argument is
/// an error rather than being passed through to the shell.
pub fn expand(template: &str, args: &[String]) -> Result<String> {
    if !template.contains('$') {
        return Ok(template.to_string());
    }

    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(d @ '1'..='9') => {
                chars.next();
                let index = (d as usize) - ('0' as usize);
                let value = args.get(index - 1).ok_or_else(|| DevctlError::UnboundPlaceholder {
                    placeholder: format!("${d}"),
                    supplied: args.len(),
                })?;
                out.push_str(value);
            }
            Some('@') | Some('*') => {
                chars.next();
                out.push_str(&args.join(" "));
            }
            _ => out.push('$'),
        }
    }
    Ok(out)
}

/// Highest positional placeholder referenced by `template` (0 if none).
pub fn required_args(template: &str) -> usize {
    let mut max = 0;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            continue;
        }
        if let Some(d @ '1'..='9') = chars.peek().copied() {
            chars.next();
            max = max.max((d as usize) - ('0' as usize));
        }
    }
    max
}

/// Whether `template` forwards all arguments via `$@` or `$*`.
pub fn is_variadic(template: &str) -> bool {
    template.contains("$@") || template.contains("$*")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn positional() {
        assert_eq!(
            expand("echo $1 $2", &args(&["hello", "world"])).unwrap(),
            "echo hello world"
        );
        assert_eq!(expand("echo $2-$1", &args(&["a", "b"])).unwrap(), "echo b-a");
    }

    #[test]
    fn all_arguments() {
        assert_eq!(
            expand("docker exec c $@", &args(&["ls", "-la"])).unwrap(),
            "docker exec c ls -la"
        );
        assert_eq!(
            expand("docker exec c $*", &args(&["ls", "-la"])).unwrap(),
            "docker exec c ls -la"
        );
        assert_eq!(expand("go test $@", &[]).unwrap(), "go test ");
    }

    #[test]
    fn arguments_are_not_quoted() {
        assert_eq!(
            expand("grep $1", &args(&["two words"])).unwrap(),
            "grep two words"
        );
    }

    #[test]
    fn templates_without_placeholders_are_unchanged() {
        for template in ["docker compose up -d", "echo $HOME", "echo $", "price: 5$"] {
            for a in [args(&[]), args(&["x"]), args(&["x", "y", "z"])] {
                assert_eq!(expand(template, &a).unwrap(), template);
            }
        }
    }

    #[test]
    fn single_pass_no_recursive_expansion() {
        assert_eq!(
            expand("echo $1 $2", &args(&["$2", "b"])).unwrap(),
            "echo $2 b"
        );
        assert_eq!(expand("echo $@", &args(&["$1"])).unwrap(), "echo $1");
    }

    #[test]
    fn unbound_placeholder_fails_fast() {
        let err = expand("echo $1 $4", &args(&["a", "b"])).unwrap_err();
        match err {
            DevctlError::UnboundPlaceholder {
                placeholder,
                supplied,
            } => {
                assert_eq!(placeholder, "$4");
                assert_eq!(supplied, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn only_single_digit_placeholders() {
        // `$10` is `$1` followed by a literal `0`.
        assert_eq!(expand("echo $10", &args(&["x"])).unwrap(), "echo x0");
        assert_eq!(expand("echo $0", &args(&["x"])).unwrap(), "echo $0");
    }

    #[test]
    fn required_args_counts_highest_positional() {
        assert_eq!(required_args("echo"), 0);
        assert_eq!(required_args("echo $2 $1"), 2);
        assert_eq!(required_args("echo $9 $@"), 9);
        assert_eq!(required_args("echo $0 $HOME"), 0);
    }

    #[test]
    fn variadic_detection() {
        assert!(is_variadic("go test $@"));
        assert!(is_variadic("go test $*"));
        assert!(!is_variadic("go test $1"));
    }
}
