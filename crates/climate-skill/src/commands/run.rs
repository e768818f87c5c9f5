//! `run`: serve the skill over the stdio bridge until EOF or Ctrl-C.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{info, warn};

use climate_skill_config::Config;
use climate_skill_core::Skill;

use crate::error::CliError;
use crate::transport::{LinePublisher, parse_inbound};

use super::build_skill;

pub async fn handle(config: &Config) -> Result<(), CliError> {
    let publisher = Arc::new(LinePublisher::new(tokio::io::stdout()));
    let skill = build_skill(config, publisher)?;

    match skill.directory().refresh().await {
        Ok(summary) => info!(
            loaded = summary.loaded,
            rejected = summary.rejected,
            "initial device load complete"
        ),
        Err(e) => warn!(error = %e, "initial device load failed, retrying on first request"),
    }
    info!(subscriptions = ?skill.subscriptions(), "listening for messages on stdin");

    let mut in_flight = JoinSet::new();
    let reader = BufReader::new(tokio::io::stdin());
    let outcome = tokio::select! {
        result = pump(&skill, reader, &mut in_flight) => result.map(|handled| {
            info!(handled, "input closed");
        }),
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
            Ok(())
        }
    };

    while in_flight.join_next().await.is_some() {}
    skill.shutdown().await;
    outcome
}

/// Feed every line from `reader` to the skill, one task per message.
///
/// Returns the number of messages accepted once the input ends. Lines
/// that are blank or not valid JSON are skipped.
pub async fn pump<R>(skill: &Skill, reader: R, in_flight: &mut JoinSet<()>) -> Result<usize, CliError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        while in_flight.try_join_next().is_some() {}

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_inbound(line) {
            Ok(message) => {
                let skill = skill.clone();
                in_flight.spawn(async move { skill.handle_message(&message).await });
                handled += 1;
            }
            Err(e) => warn!(error = %e, "skipping malformed input line"),
        }
    }
    Ok(handled)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use climate_skill_core::{
        BuiltinTemplates, CoreError, DeviceRegistry, Publisher, QoS, RegistryRecord, SkillConfig,
        TransportError,
    };

    use super::*;

    #[derive(Default)]
    struct Outbox(Mutex<Vec<(String, String)>>);

    #[async_trait]
    impl Publisher for Outbox {
        async fn publish(&self, topic: &str, payload: &str, _qos: QoS) -> Result<(), TransportError> {
            self.0
                .lock()
                .unwrap()
                .push((topic.to_owned(), payload.to_owned()));
            Ok(())
        }
    }

    struct OneThermostat;

    #[async_trait]
    impl DeviceRegistry for OneThermostat {
        async fn fetch_devices(&self) -> Result<Vec<RegistryRecord>, CoreError> {
            Ok(vec![RegistryRecord {
                name: "den thermostat".into(),
                room: Some("den".into()),
                device_type: Some("thermostat".into()),
                attributes: json!({ "topic": "den/thermostat/set" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            }])
        }
    }

    #[tokio::test]
    async fn pump_routes_lines_and_skips_garbage() {
        let outbox = Arc::new(Outbox::default());
        let skill = Skill::new(
            SkillConfig::default(),
            Arc::new(OneThermostat),
            Arc::clone(&outbox) as Arc<dyn Publisher>,
            &BuiltinTemplates,
        )
        .unwrap();

        let request = json!({
            "classified_intent": {
                "intent_type": "device.set",
                "confidence": 0.92,
                "entities": {
                    "number": [{
                        "type": "number",
                        "raw_text": "twenty",
                        "normalized_value": 20,
                        "metadata": { "unit": "celsius" }
                    }]
                }
            },
            "client_request": { "room": "den", "output_topic": "client/den/out" }
        });
        let input = format!(
            "{}\n\nnot json\n{}\n",
            json!({ "topic": "assistant/intent_engine/result", "payload": request.to_string() }),
            json!({ "topic": "assistant/global_device_update" }),
        );

        let mut in_flight = JoinSet::new();
        let handled = pump(&skill, BufReader::new(input.as_bytes()), &mut in_flight)
            .await
            .unwrap();
        while in_flight.join_next().await.is_some() {}
        skill.shutdown().await;

        assert_eq!(handled, 2);
        let mut sent = outbox.0.lock().unwrap().clone();
        sent.sort();
        assert_eq!(
            sent,
            vec![
                (
                    "client/den/out".to_owned(),
                    "I have set the temperature to 20°C.".to_owned()
                ),
                (
                    "den/thermostat/set".to_owned(),
                    r#"{"occupied_heating_setpoint": 20}"#.to_owned()
                ),
            ]
        );
    }
}
