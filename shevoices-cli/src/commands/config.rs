//! Configuration commands

use crate::config::ConfigLoader;
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (merged)
    Show,
    /// Show configuration file paths
    Path,
    /// Check that the merged configuration is usable
    Validate,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(),
        ConfigCommands::Path => show_paths(),
        ConfigCommands::Validate => validate_config(),
    }
}

fn show_config() -> Result<()> {
    let config = ConfigLoader::load()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{}", toml_str);
    Ok(())
}

fn show_paths() -> Result<()> {
    println!("User config:    {:?}", ConfigLoader::user_config_path());
    println!("Project config: {:?}", ConfigLoader::project_config_path());
    Ok(())
}

fn validate_config() -> Result<()> {
    let config = ConfigLoader::load()?;
    config.guard.validate()?;
    println!(
        "Configuration OK: idle timeout {}s, warning {}",
        config.guard.idle_timeout().as_secs(),
        match config.guard.countdown() {
            Some(countdown) => format!("for the last {}s", countdown.as_secs()),
            None => "disabled".to_string(),
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ConfigArgs,
    }

    #[test]
    fn test_config_show_command() {
        let cli = TestCli::parse_from(["test", "show"]);
        assert!(matches!(cli.config.command, ConfigCommands::Show));
    }

    #[test]
    fn test_config_path_command() {
        let cli = TestCli::parse_from(["test", "path"]);
        assert!(matches!(cli.config.command, ConfigCommands::Path));
    }

    #[test]
    fn test_config_validate_command() {
        let cli = TestCli::parse_from(["test", "validate"]);
        assert!(matches!(cli.config.command, ConfigCommands::Validate));
    }
}
