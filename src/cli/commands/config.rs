//! Config command implementation.
//!
//! The `cme config` command shows the resolved settings with secrets masked.

use std::path::PathBuf;

use crate::cli::args::ConfigArgs;
use crate::config::{resolve_config_path, validate_settings, ENV_OVERRIDES};
use crate::error::{CmeError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The config command implementation.
pub struct ConfigCommand {
    context: CommandContext,
    config_path: Option<PathBuf>,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(context: CommandContext, config_path: Option<PathBuf>, args: ConfigArgs) -> Self {
        Self {
            context,
            config_path,
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match resolve_config_path(self.config_path.as_deref()) {
            Some(path) if path.is_file() => ui.message(&format!("# {}", path.display())),
            Some(path) => ui.message(&format!("# {} (not found, using defaults)", path.display())),
            None => ui.message("# no settings file"),
        }

        let overridden: Vec<&str> = ENV_OVERRIDES
            .iter()
            .copied()
            .filter(|name| std::env::var_os(name).is_some_and(|v| !v.is_empty()))
            .collect();
        if !overridden.is_empty() {
            ui.message(&format!("# overridden by: {}", overridden.join(", ")));
        }
        ui.message("");

        let masked = self.context.settings.masked();
        let rendered = if self.args.json {
            serde_json::to_string_pretty(&masked).map_err(|e| CmeError::Other(e.into()))?
        } else {
            serde_yaml::to_string(&masked).map_err(|e| CmeError::Other(e.into()))?
        };
        ui.message(rendered.trim_end());

        for problem in validate_settings(&self.context.settings) {
            ui.warning(&format!("{} {}", problem.field, problem.message));
        }

        Ok(CommandResult::success())
    }
}
