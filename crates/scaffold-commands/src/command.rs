//! A loaded command.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use scaffold_types::{OptionSchema, OptionSpec, ShorthandMap};

use crate::definition::CommandDefinition;
use crate::executor::ScriptHandler;
use crate::sdk::RunHandler;

/// A named unit of work: option schema, shorthand, help text and handler.
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub help: Option<String>,
    pub option_schema: OptionSchema,
    pub shorthand: ShorthandMap,
    /// `None` means the command exists but cannot be run.
    pub handler: Option<Arc<dyn RunHandler>>,
}

impl Command {
    /// A command with no options and no handler.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            help: None,
            option_schema: OptionSchema::new(),
            shorthand: ShorthandMap::new(),
            handler: None,
        }
    }

    /// Build a command from a definition file.
    ///
    /// `fallback_name` is used when the definition does not declare one. A
    /// `run` script is resolved relative to the definition's directory.
    pub fn from_definition(
        definition: CommandDefinition,
        fallback_name: &str,
        definition_dir: &Path,
    ) -> Self {
        let handler = definition.run.as_ref().map(|script| {
            let mut handler = ScriptHandler::new(definition_dir.join(script));
            if let Some(secs) = definition.timeout_secs {
                handler = handler.with_timeout(std::time::Duration::from_secs(secs));
            }
            Arc::new(handler) as Arc<dyn RunHandler>
        });

        Self {
            name: definition
                .name
                .unwrap_or_else(|| fallback_name.to_string()),
            description: definition.description,
            help: definition.help,
            option_schema: definition.args,
            shorthand: definition.shorthand,
            handler,
        }
    }

    pub fn with_handler(mut self, handler: Arc<dyn RunHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, spec: OptionSpec) -> Self {
        self.option_schema.insert(name.into(), spec);
        self
    }

    pub fn with_shorthand<S: Into<String>>(mut self, short: impl Into<String>, expansion: Vec<S>) -> Self {
        self.shorthand
            .insert(short.into(), expansion.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// The runnable handler, if there is one and it is currently available.
    pub fn runnable_handler(&self) -> Option<&Arc<dyn RunHandler>> {
        self.handler.as_ref().filter(|h| h.is_available())
    }

    pub fn is_runnable(&self) -> bool {
        self.runnable_handler().is_some()
    }

    /// Text for `--help <command>`: the help, else the description.
    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref().or(self.description.as_deref())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("options", &self.option_schema.keys().collect::<Vec<_>>())
            .field("shorthand", &self.shorthand)
            .field("handler", &self.handler.as_ref().map(|_| "<handler>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::parse_definition;
    use crate::sdk::handler_fn;

    #[test]
    fn from_definition_uses_fallback_name() {
        let def = parse_definition("description = \"d\"\n").unwrap();
        let cmd = Command::from_definition(def, "deploy", Path::new("/tmp/cmds"));
        assert_eq!(cmd.name, "deploy");
        assert_eq!(cmd.help_text(), Some("d"));
        assert!(cmd.handler.is_none());
        assert!(!cmd.is_runnable());
    }

    #[test]
    fn from_definition_prefers_explicit_name() {
        let def = parse_definition("name = \"ship\"\nrun = \"ship.sh\"\n").unwrap();
        let cmd = Command::from_definition(def, "deploy", Path::new("/tmp/cmds"));
        assert_eq!(cmd.name, "ship");
        assert!(cmd.handler.is_some());
        // the script does not exist, so the handler is not available
        assert!(!cmd.is_runnable());
    }

    #[test]
    fn help_prefers_help_over_description() {
        let cmd = Command::new("x")
            .with_description("short")
            .with_help("long help");
        assert_eq!(cmd.help_text(), Some("long help"));
    }

    #[test]
    fn builder_and_runnable() {
        let cmd = Command::new("greet")
            .with_option("loud", OptionSpec::boolean())
            .with_shorthand("l", vec!["--loud"])
            .with_handler(handler_fn(|_, _| async { Ok(serde_json::json!("hi")) }));
        assert!(cmd.is_runnable());
        assert_eq!(cmd.shorthand["l"], vec!["--loud"]);
        assert!(format!("{cmd:?}").contains("<handler>"));
    }
}
