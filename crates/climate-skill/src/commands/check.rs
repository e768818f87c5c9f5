//! `check`: validate everything `run` needs without touching the bus.

use climate_skill_config::{Config, render_config};
use climate_skill_core::{Renderer, SkillConfig};

use crate::cli::CheckArgs;
use crate::error::CliError;

use super::load_snapshot;

pub async fn handle(config: &Config, args: &CheckArgs) -> Result<(), CliError> {
    let skill_config = config.skill_config();
    Renderer::load(&*config.template_source())?;
    let snapshot = load_snapshot(config).await?;

    println!("{}", summary(config, &skill_config, snapshot.device_count(), snapshot.rejected()));
    if args.print_config {
        println!();
        println!("{}", render_config(config).map_err(|e| CliError::Config {
            path: "(effective)".into(),
            source: e,
        })?);
    }
    Ok(())
}

fn summary(config: &Config, skill: &SkillConfig, loaded: usize, rejected: usize) -> String {
    let templates = config
        .templates_dir
        .as_ref()
        .map_or_else(|| "built-in".to_owned(), |d| d.display().to_string());
    format!(
        "client id:     {}\n\
         intent topic:  {}\n\
         update topic:  {}\n\
         templates:     {templates} (ok)\n\
         devices file:  {}\n\
         devices:       {loaded} loaded, {rejected} skipped",
        skill.client_id,
        skill.intent_topic(),
        skill.device_update_topic(),
        config.devices_file.display(),
    )
}
