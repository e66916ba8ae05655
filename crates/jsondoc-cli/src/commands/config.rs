//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::config::Config;
use crate::error::Result;

/// Execute the config command.
///
/// Prints the configuration file merged with any command-line overrides.
pub fn execute_config(args: ConfigArgs, config: &Config) -> Result<String> {
    let effective = Config {
        settings: config.settings.clone(),
        converter: config.converter_config(&args.converter)?,
    };
    effective.to_toml()
}
