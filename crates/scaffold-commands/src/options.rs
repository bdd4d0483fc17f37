//! Option parsing and schema merging.
//!
//! [`parse_argv`] interprets raw CLI tokens against an [`OptionSchema`] and a
//! [`ShorthandMap`]:
//!
//! - `--name value` and `--name=value` for non-boolean options
//! - `--flag`, `--no-flag`, `--flag=false`, `--flag false` for booleans
//! - `-x` expands through the shorthand map; `-abc` expands letter by letter
//!   when every letter is a known shorthand
//! - `--` ends option parsing
//! - unknown `--opt=value` is kept as a string, unknown `--opt` as `true`;
//!   only a declared option takes the following token as its value
//!
//! Tokens that are not consumed end up in [`ParsedArgs::remain`]. Command
//! names are picked from there, so the host parses against every registered
//! command's options first; a value given to any declared option is then
//! never mistaken for a command name.
//!
//! [`merge_options`] layers everything for one command invocation:
//! parsed CLI value, then per-call override, then schema default.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::debug;

use scaffold_types::{OptionKind, OptionSchema, OptionSpec, ShorthandMap, ValueKind};

/// The result of parsing a token list against a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    /// Typed values keyed by option name.
    pub values: BTreeMap<String, Value>,
    /// Tokens that were not consumed as options or option values.
    pub remain: Vec<String>,
}

/// Parse `argv[start..]` against `schema` and `shorthand`.
pub fn parse_argv(
    schema: &OptionSchema,
    shorthand: &ShorthandMap,
    argv: &[String],
    start: usize,
) -> ParsedArgs {
    let tokens = expand_shorthand(shorthand, argv.get(start..).unwrap_or_default());
    let mut parsed = ParsedArgs::default();
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        if token == "--" {
            parsed.remain.extend(iter);
            break;
        }

        let Some(body) = token.strip_prefix("--") else {
            parsed.remain.push(token);
            continue;
        };

        let (raw_name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (body, None),
        };
        let (name, negated) = resolve_negation(schema, raw_name);

        let Some(spec) = schema.get(&name) else {
            let value = match (negated, inline) {
                (true, _) => Value::Bool(false),
                (false, Some(v)) => Value::String(v),
                (false, None) => Value::Bool(true),
            };
            debug!(option = %name, "unknown option kept as-is");
            parsed.values.insert(name, value);
            continue;
        };

        let value = if spec.kind.is_boolean() {
            if negated {
                Some(Value::Bool(false))
            } else if let Some(v) = inline {
                parse_bool(&v)
            } else if let Some(v) = iter.next_if(|next| parse_bool(next).is_some()) {
                parse_bool(&v)
            } else {
                Some(Value::Bool(true))
            }
        } else {
            let raw = inline.or_else(|| iter.next_if(|next| !next.starts_with("--")));
            match raw {
                Some(raw) => convert(spec.kind.value, &raw),
                None if spec.kind.value == ValueKind::String => Some(Value::String(String::new())),
                None => None,
            }
        };

        match value {
            Some(value) => store(&mut parsed.values, &name, spec, value),
            None => debug!(option = %name, kind = %spec.kind, "dropping invalid option value"),
        }
    }

    parsed
}

/// Expand shorthand flags into their long forms. Expansion stops at `--`.
fn expand_shorthand(shorthand: &ShorthandMap, tokens: &[String]) -> Vec<String> {
    let mut expanded = Vec::with_capacity(tokens.len());
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        if token == "--" {
            expanded.push(token.clone());
            expanded.extend(iter.cloned());
            break;
        }

        let key = match token.strip_prefix('-') {
            Some(key) if !key.is_empty() && !key.starts_with('-') => key,
            _ => {
                expanded.push(token.clone());
                continue;
            }
        };

        if let Some(expansion) = shorthand.get(key) {
            expanded.extend(expansion.iter().cloned());
        } else if key.chars().count() > 1
            && key.chars().all(|c| shorthand.contains_key(c.to_string().as_str()))
        {
            for c in key.chars() {
                if let Some(expansion) = shorthand.get(c.to_string().as_str()) {
                    expanded.extend(expansion.iter().cloned());
                }
            }
        } else if key.parse::<f64>().is_ok() {
            // negative number, not a flag
            expanded.push(token.clone());
        } else {
            expanded.push(format!("--{key}"));
        }
    }

    expanded
}

/// Map `no-foo` to (`foo`, negated) when `foo` is a boolean option or
/// neither name is known.
fn resolve_negation(schema: &OptionSchema, name: &str) -> (String, bool) {
    if let Some(base) = name.strip_prefix("no-") {
        if schema.contains_key(name) {
            return (name.to_string(), false);
        }
        match schema.get(base) {
            Some(spec) if spec.kind.is_boolean() => return (base.to_string(), true),
            Some(_) => {}
            None => return (base.to_string(), true),
        }
    }
    (name.to_string(), false)
}

fn parse_bool(raw: &str) -> Option<Value> {
    match raw {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => None,
    }
}

fn convert(kind: ValueKind, raw: &str) -> Option<Value> {
    match kind {
        ValueKind::Boolean => parse_bool(raw),
        ValueKind::String => Some(Value::String(raw.to_string())),
        ValueKind::Path => {
            let path = PathBuf::from(raw);
            let path = if path.is_absolute() {
                path
            } else {
                std::env::current_dir().ok()?.join(path)
            };
            Some(Value::String(path.to_string_lossy().into_owned()))
        }
        ValueKind::Number => {
            if let Ok(n) = raw.parse::<i64>() {
                Some(Value::Number(n.into()))
            } else {
                raw.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
            }
        }
        ValueKind::Url => is_url(raw).then(|| Value::String(raw.to_string())),
    }
}

fn is_url(raw: &str) -> bool {
    match raw.split_once("://") {
        Some((scheme, rest)) => {
            !rest.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn store(values: &mut BTreeMap<String, Value>, name: &str, spec: &OptionSpec, value: Value) {
    if !spec.kind.repeated {
        values.insert(name.to_string(), value);
        return;
    }
    match values.get_mut(name) {
        Some(Value::Array(items)) => items.push(value),
        _ => {
            values.insert(name.to_string(), Value::Array(vec![value]));
        }
    }
}

/// Combine schemas; entries in `command` replace same-named `defaults`.
pub fn merge_schemas(defaults: &OptionSchema, command: &OptionSchema) -> OptionSchema {
    let mut merged = defaults.clone();
    merged.extend(command.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Combine shorthand maps; entries in `command` replace same-named `defaults`.
pub fn merge_shorthand(defaults: &ShorthandMap, command: &ShorthandMap) -> ShorthandMap {
    let mut merged = defaults.clone();
    merged.extend(command.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Everything needed to resolve options for one command invocation.
#[derive(Debug, Clone, Copy)]
pub struct MergeRequest<'a> {
    pub default_schema: &'a OptionSchema,
    pub command_schema: &'a OptionSchema,
    pub default_shorthand: &'a ShorthandMap,
    pub command_shorthand: &'a ShorthandMap,
    pub argv: &'a [String],
    pub start: usize,
    /// Per-call values, used when the command line does not set an option.
    pub overrides: &'a Map<String, Value>,
}

/// Resolve the options for one command invocation.
pub fn merge_options(request: MergeRequest<'_>) -> ResolvedOptions {
    let schema = merge_schemas(request.default_schema, request.command_schema);
    let shorthand = merge_shorthand(request.default_shorthand, request.command_shorthand);
    let parsed = parse_argv(&schema, &shorthand, request.argv, request.start);

    let mut values = Map::new();
    for (name, spec) in &schema {
        if let Some(default) = &spec.default {
            values.insert(name.clone(), default.clone());
        }
    }
    for (name, value) in request.overrides {
        values.insert(name.clone(), value.clone());
    }
    values.extend(parsed.values);

    ResolvedOptions {
        values,
        remain: parsed.remain,
    }
}

/// The options one command invocation receives.
///
/// Each command in a batch gets its own independently merged instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedOptions {
    /// Option name -> value.
    pub values: Map<String, Value>,
    /// Unconsumed tokens, with command names already removed.
    pub remain: Vec<String>,
}

impl ResolvedOptions {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// `true` only when the option is set to boolean `true`.
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_path(&self, name: &str) -> Option<PathBuf> {
        self.get_str(name).map(PathBuf::from)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// All values of a repeated option; a scalar yields a single item.
    pub fn get_list(&self, name: &str) -> Vec<&Value> {
        match self.get(name) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(value) => vec![value],
            None => Vec::new(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn remain(&self) -> &[String] {
        &self.remain
    }

    /// The options as one JSON object, with the unconsumed tokens under
    /// `remain`.
    pub fn to_json(&self) -> Value {
        let mut object = self.values.clone();
        object.insert(
            "remain".to_string(),
            Value::Array(self.remain.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(object)
    }
}

/// Schema entry helper for tests and programmatic commands.
pub fn schema<I, S>(entries: I) -> OptionSchema
where
    I: IntoIterator<Item = (S, OptionKind)>,
    S: Into<String>,
{
    entries
        .into_iter()
        .map(|(name, kind)| (name.into(), OptionSpec::new(kind)))
        .collect()
}
