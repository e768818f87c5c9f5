//! Command handlers: each takes the loaded config and drives the core.

pub mod check;
pub mod devices;
pub mod run;

use std::sync::Arc;

use climate_skill_config::Config;
use climate_skill_core::{DirectorySnapshot, Publisher, Skill};

use crate::cli::Command;
use crate::error::CliError;

/// Dispatch a parsed command.
pub async fn dispatch(cmd: Command, config: &Config) -> Result<(), CliError> {
    match cmd {
        Command::Run => run::handle(config).await,
        Command::Devices(args) => devices::handle(config, &args).await,
        Command::Check(args) => check::handle(config, &args).await,
    }
}

/// Build a skill from config, wired to `publisher`.
pub fn build_skill(config: &Config, publisher: Arc<dyn Publisher>) -> Result<Skill, CliError> {
    let templates = config.template_source();
    let skill = Skill::new(
        config.skill_config(),
        Arc::new(config.registry()),
        publisher,
        &*templates,
    )?;
    Ok(skill)
}

/// Read the registry once and validate every record.
pub async fn load_snapshot(config: &Config) -> Result<DirectorySnapshot, CliError> {
    use climate_skill_core::DeviceRegistry;

    let records = config.registry().fetch_devices().await?;
    Ok(DirectorySnapshot::from_records(&records))
}
