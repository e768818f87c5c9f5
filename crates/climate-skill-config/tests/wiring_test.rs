#![allow(clippy::unwrap_used)]

// A config directory on disk wired into a running skill.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use climate_skill_config::load_config;
use climate_skill_core::{
    ClassifiedIntent, ClientRequest, Entity, IntentEntities, IntentRequest, IntentType, Publisher,
    QoS, Skill, TransportError,
};

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

fn write(dir: &std::path::Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[tokio::test]
async fn config_directory_drives_the_skill() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("templates")).unwrap();
    write(
        dir.path(),
        "config.toml",
        r#"
            base_topic = "home"
            templates_dir = "templates"
            devices_file = "devices.toml"
        "#,
    );
    write(
        dir.path(),
        "devices.toml",
        r#"
            [[devices]]
            name = "hall thermostat"
            room = "hall"
            device_type = "thermostat"
            attributes = { topic = "zigbee2mqtt/hall/thermostat/set" }

            [[devices]]
            name = "broken"
            room = "hall"
            attributes = { topic = "hall/#" }
        "#,
    );
    write(dir.path(), "templates/help.tmpl", "help\n");
    write(
        dir.path(),
        "templates/set_temperature.tmpl",
        "{{ targets }} now at {{ temperature }}\n",
    );

    let config = load_config(&dir.path().join("config.toml")).unwrap();
    let outbox = Arc::new(Outbox::default());
    let skill = Skill::new(
        config.skill_config(),
        Arc::new(config.registry()),
        Arc::clone(&outbox) as Arc<dyn Publisher>,
        &*config.template_source(),
    )
    .unwrap();

    let summary = skill.directory().refresh().await.unwrap();
    assert_eq!((summary.loaded, summary.rejected), (1, 1));
    assert_eq!(
        skill.subscriptions(),
        vec![
            "home/intent_engine/result".to_owned(),
            "home/global_device_update".to_owned()
        ]
    );

    let entities = IntentEntities::default().with_number(Entity::number(21).with_metadata("unit", "c"));
    skill
        .process_request(IntentRequest::new(
            ClassifiedIntent::new(IntentType::DeviceSet, 0.9, entities),
            ClientRequest::new("hall", "home/client/hall/output"),
        ))
        .await;
    skill.shutdown().await;

    let mut sent = outbox.0.lock().unwrap().clone();
    sent.sort();
    assert_eq!(
        sent,
        vec![
            (
                "home/client/hall/output".to_owned(),
                "hall thermostat now at 21".to_owned()
            ),
            (
                "zigbee2mqtt/hall/thermostat/set".to_owned(),
                r#"{"occupied_heating_setpoint": 21}"#.to_owned()
            ),
        ]
    );
}
