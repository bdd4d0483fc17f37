//! Option schema types.
//!
//! An [`OptionSchema`] maps option names to an [`OptionSpec`] describing how a
//! raw CLI token is interpreted. Schemas are declared by command definitions
//! and by the host configuration (`default_args`), and are merged per command
//! invocation.
//!
//! In TOML a spec may be written three ways:
//!
//! ```toml
//! [args]
//! out = "path"
//! tag = ["string"]
//! verbose = { kind = "boolean", default = false, description = "Chatty output" }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Option name -> how to interpret it.
pub type OptionSchema = BTreeMap<String, OptionSpec>;

/// Short flag (without the leading `-`) -> tokens it expands into.
pub type ShorthandMap = BTreeMap<String, Vec<String>>;

/// The scalar type of an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Boolean,
    String,
    /// Resolved to an absolute path against the current directory.
    Path,
    Number,
    Url,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::String => write!(f, "string"),
            Self::Path => write!(f, "path"),
            Self::Number => write!(f, "number"),
            Self::Url => write!(f, "url"),
        }
    }
}

/// The declared type of an option: a scalar kind, optionally repeated.
///
/// Repeated options accumulate every occurrence into a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "KindRepr", into = "KindRepr")]
pub struct OptionKind {
    pub value: ValueKind,
    pub repeated: bool,
}

impl OptionKind {
    pub const fn single(value: ValueKind) -> Self {
        Self {
            value,
            repeated: false,
        }
    }

    pub const fn list(value: ValueKind) -> Self {
        Self {
            value,
            repeated: true,
        }
    }

    pub fn is_boolean(&self) -> bool {
        self.value == ValueKind::Boolean
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.repeated {
            write!(f, "[{}]", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum KindRepr {
    Single(ValueKind),
    List(Vec<ValueKind>),
}

impl TryFrom<KindRepr> for OptionKind {
    type Error = String;

    fn try_from(repr: KindRepr) -> Result<Self, Self::Error> {
        match repr {
            KindRepr::Single(value) => Ok(Self::single(value)),
            KindRepr::List(values) => match values.as_slice() {
                [value] => Ok(Self::list(*value)),
                _ => Err(format!(
                    "list option kinds take exactly one element, got {}",
                    values.len()
                )),
            },
        }
    }
}

impl From<OptionKind> for KindRepr {
    fn from(kind: OptionKind) -> Self {
        if kind.repeated {
            KindRepr::List(vec![kind.value])
        } else {
            KindRepr::Single(kind.value)
        }
    }
}

/// A single option declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SpecRepr", into = "SpecRepr")]
pub struct OptionSpec {
    pub kind: OptionKind,
    /// Used when neither the command line nor the caller supplies a value.
    pub default: Option<serde_json::Value>,
    pub description: Option<String>,
}

impl OptionSpec {
    pub fn new(kind: OptionKind) -> Self {
        Self {
            kind,
            default: None,
            description: None,
        }
    }

    pub fn boolean() -> Self {
        Self::new(OptionKind::single(ValueKind::Boolean))
    }

    pub fn string() -> Self {
        Self::new(OptionKind::single(ValueKind::String))
    }

    pub fn path() -> Self {
        Self::new(OptionKind::single(ValueKind::Path))
    }

    pub fn number() -> Self {
        Self::new(OptionKind::single(ValueKind::Number))
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SpecRepr {
    Kind(OptionKind),
    Full {
        kind: OptionKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl From<SpecRepr> for OptionSpec {
    fn from(repr: SpecRepr) -> Self {
        match repr {
            SpecRepr::Kind(kind) => Self::new(kind),
            SpecRepr::Full {
                kind,
                default,
                description,
            } => Self {
                kind,
                default,
                description,
            },
        }
    }
}

impl From<OptionSpec> for SpecRepr {
    fn from(spec: OptionSpec) -> Self {
        if spec.default.is_none() && spec.description.is_none() {
            SpecRepr::Kind(spec.kind)
        } else {
            SpecRepr::Full {
                kind: spec.kind,
                default: spec.default,
                description: spec.description,
            }
        }
    }
}

/// Flags every host understands regardless of its own defaults.
pub fn core_flags() -> OptionSchema {
    ["silent", "help", "version"]
        .into_iter()
        .map(|name| (name.to_string(), OptionSpec::boolean()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        args: OptionSchema,
    }

    #[test]
    fn parses_all_three_spec_forms() {
        let holder: Holder = toml::from_str(
            r#"
[args]
out = "path"
tag = ["string"]
verbose = { kind = "boolean", default = true, description = "Chatty output" }
"#,
        )
        .unwrap();

        assert_eq!(holder.args["out"], OptionSpec::path());
        assert_eq!(
            holder.args["tag"].kind,
            OptionKind::list(ValueKind::String)
        );
        let verbose = &holder.args["verbose"];
        assert!(verbose.kind.is_boolean());
        assert_eq!(verbose.default, Some(serde_json::Value::Bool(true)));
        assert_eq!(verbose.description.as_deref(), Some("Chatty output"));
    }

    #[test]
    fn rejects_multi_element_list_kind() {
        assert!(toml::from_str::<Holder>("[args]\nbad = [\"string\", \"path\"]\n").is_err());
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(toml::from_str::<Holder>("[args]\nbad = \"float\"\n").is_err());
    }

    #[test]
    fn core_flags_are_booleans() {
        let flags = core_flags();
        assert_eq!(flags.len(), 3);
        assert!(flags.values().all(|spec| spec.kind.is_boolean()));
        assert!(flags.contains_key("silent"));
    }

    #[test]
    fn kind_display() {
        assert_eq!(OptionKind::single(ValueKind::Url).to_string(), "url");
        assert_eq!(OptionKind::list(ValueKind::Path).to_string(), "[path]");
    }
}
