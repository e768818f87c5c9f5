//! `devices`: show what the directory would load from the registry.

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use climate_skill_config::Config;
use climate_skill_core::{Device, DirectorySnapshot};

use crate::cli::{DevicesArgs, OutputFormat};
use crate::error::CliError;

use super::load_snapshot;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Debug, Tabled, Serialize)]
struct DeviceRow {
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Topic")]
    topic: String,
    #[tabled(rename = "Payload")]
    payload: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            room: d.room.clone(),
            name: d.alias.clone(),
            device_type: d.device_type.clone().unwrap_or_else(|| "-".into()),
            topic: d.topic.to_string(),
            payload: d.payload_template.source().to_owned(),
        }
    }
}

fn rows(snapshot: &DirectorySnapshot, room: Option<&str>) -> Vec<DeviceRow> {
    match room {
        Some(room) => snapshot
            .devices_for(&[room])
            .iter()
            .map(|d| DeviceRow::from(d.as_ref()))
            .collect(),
        None => snapshot
            .devices()
            .map(|d| DeviceRow::from(d.as_ref()))
            .collect(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(config: &Config, args: &DevicesArgs) -> Result<(), CliError> {
    let snapshot = load_snapshot(config).await?;
    let rows = rows(&snapshot, args.room.as_deref());

    match args.output {
        OutputFormat::Table => {
            println!("{}", Table::new(&rows).with(Style::rounded()));
            if snapshot.rejected() > 0 {
                eprintln!(
                    "{} record(s) skipped as invalid; run with -v for details",
                    snapshot.rejected()
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(())
}
