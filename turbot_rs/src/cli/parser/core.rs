//! Core option parsing.
//!
//! Accepts `--long`, `--long VALUE`, `--long=VALUE`, `-s`, `-s VALUE`,
//! `-sVALUE` and clustered short flags (`-ab`). `--` ends option parsing.
//! Unknown flags and positionals are not errors: they are collected, in
//! order, as leftovers and parsing continues with the next token.

use tracing::debug;

use crate::cli::command::{OptionSpec, OptionValue, Options};
use crate::error::{Result, TurbotError};

/// Result of parsing one argument list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub options: Options,
    /// Positionals and unrecognised flags, in the order they appeared.
    pub leftovers: Vec<String>,
}

/// Parse `args` against `specs`. Earlier specs win when two declare the
/// same flag, so global options go first.
pub fn parse_arguments(specs: &[OptionSpec], args: &[String]) -> Result<ParsedArgs> {
    let mut parsed = ParsedArgs::default();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if arg == "--" {
            parsed.leftovers.extend(args[i + 1..].iter().cloned());
            break;
        }

        if let Some(body) = arg.strip_prefix("--").filter(|b| !b.is_empty()) {
            let (flag, inline) = match body.split_once('=') {
                Some((name, value)) => (format!("--{}", name), Some(value.to_string())),
                None => (arg.clone(), None),
            };
            let Some(spec) = specs.iter().find(|s| s.matches_long(&flag)) else {
                debug!(token = %arg, "unrecognised long option kept as leftover");
                parsed.leftovers.push(arg.clone());
                i += 1;
                continue;
            };
            if spec.takes_value() {
                let value = match inline {
                    Some(value) => value,
                    None => {
                        i += 1;
                        args.get(i)
                            .cloned()
                            .ok_or_else(|| missing_argument(&flag))?
                    }
                };
                record(&mut parsed.options, spec, Some(value))?;
            } else if inline.is_some() {
                return Err(TurbotError::OptionParse(format!("needless argument: {}", arg)));
            } else {
                record(&mut parsed.options, spec, None)?;
            }
            i += 1;
            continue;
        }

        if let Some(cluster) = arg.strip_prefix('-').filter(|c| !c.is_empty() && !c.starts_with('-')) {
            for (pos, c) in cluster.char_indices() {
                let Some(spec) = specs.iter().find(|s| s.matches_short(c)) else {
                    debug!(token = %arg, "unrecognised short option kept as leftover");
                    parsed.leftovers.push(format!("-{}", &cluster[pos..]));
                    break;
                };
                if spec.takes_value() {
                    let rest = &cluster[pos + c.len_utf8()..];
                    let value = if rest.is_empty() {
                        i += 1;
                        args.get(i)
                            .cloned()
                            .ok_or_else(|| missing_argument(&format!("-{}", c)))?
                    } else {
                        rest.to_string()
                    };
                    record(&mut parsed.options, spec, Some(value))?;
                    break;
                }
                record(&mut parsed.options, spec, None)?;
            }
            i += 1;
            continue;
        }

        parsed.leftovers.push(arg.clone());
        i += 1;
    }

    Ok(parsed)
}

fn record(options: &mut Options, spec: &OptionSpec, value: Option<String>) -> Result<()> {
    if let (Some(hook), Some(value)) = (spec.hook, value.as_deref()) {
        hook(value).map_err(TurbotError::OptionParse)?;
    }
    let value = match value {
        Some(value) => OptionValue::Value(value),
        None => OptionValue::Flag,
    };
    options.insert(spec.name.clone(), value);
    Ok(())
}

fn missing_argument(flag: &str) -> TurbotError {
    TurbotError::OptionParse(format!("missing argument: {}", flag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::command::global_options;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn specs() -> Vec<OptionSpec> {
        let mut specs = global_options();
        specs.push(OptionSpec::new("shell", &["-s", "--shell"]));
        specs.push(OptionSpec::new("language", &["-l", "--language LANGUAGE"]));
        specs
    }

    #[test]
    fn test_long_forms() {
        let parsed =
            parse_arguments(&specs(), &args(&["--bot", "a", "--language=python", "--shell"]))
                .expect("parse");
        assert_eq!(parsed.options.get("bot"), Some("a"));
        assert_eq!(parsed.options.get("language"), Some("python"));
        assert!(parsed.options.flag("shell"));
        assert!(parsed.leftovers.is_empty());
    }

    #[test]
    fn test_short_forms_and_clusters() {
        let parsed = parse_arguments(&specs(), &args(&["-b", "a", "-lruby", "-sb", "c"]))
            .expect("parse");
        assert_eq!(parsed.options.get("language"), Some("ruby"));
        assert!(parsed.options.flag("shell"));
        assert_eq!(parsed.options.get("bot"), Some("c"));
    }

    #[test]
    fn test_unknown_flags_and_positionals_are_collected_in_order() {
        let parsed = parse_arguments(
            &specs(),
            &args(&["first", "--nope", "-s", "-z", "second", "--bot", "b"]),
        )
        .expect("parse");
        assert_eq!(parsed.leftovers, args(&["first", "--nope", "-z", "second"]));
        assert_eq!(parsed.options.get("bot"), Some("b"));
        assert!(parsed.options.flag("shell"));
    }

    #[test]
    fn test_double_dash_ends_options() {
        let parsed =
            parse_arguments(&specs(), &args(&["-s", "--", "--bot", "x"])).expect("parse");
        assert!(parsed.options.flag("shell"));
        assert_eq!(parsed.leftovers, args(&["--bot", "x"]));
    }

    #[test]
    fn test_missing_value_is_a_parse_error() {
        let err = parse_arguments(&specs(), &args(&["--bot"])).unwrap_err();
        assert!(matches!(err, TurbotError::OptionParse(ref m) if m == "missing argument: --bot"));
    }

    #[test]
    fn test_hook_rejection_is_a_parse_error() {
        let err = parse_arguments(&specs(), &args(&["--bot", "--shell"])).unwrap_err();
        assert!(matches!(err, TurbotError::OptionParse(_)));
    }

    #[test]
    fn test_needless_argument() {
        let err = parse_arguments(&specs(), &args(&["--shell=yes"])).unwrap_err();
        assert_eq!(err.to_string(), "needless argument: --shell=yes");
    }

    #[test]
    fn test_lone_dash_is_positional() {
        let parsed = parse_arguments(&specs(), &args(&["-"])).expect("parse");
        assert_eq!(parsed.leftovers, args(&["-"]));
    }
}
