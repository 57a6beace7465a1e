//! Config command handlers

use wpsync_core::config::Config;

use super::CliError;
use super::args::ConfigCommands;
use super::output::Output;

pub fn handle_config_command(output: &Output, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            base_url,
            cache_dir,
            token,
        } => {
            let config = Config::init(base_url, cache_dir, token)?;
            if let Some(path) = Config::config_path() {
                output.message(&format!("Wrote {}", path.display()));
            }
            output.config(&config);
        }
        ConfigCommands::Show => {
            output.config(&Config::load()?);
        }
    }
    Ok(())
}
