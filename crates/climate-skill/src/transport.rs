// ── Stdio JSON-lines bridge ──
//
// Lets an external bus client (or a shell pipeline) drive the skill:
// inbound messages arrive on stdin as `{"topic", "payload"}` lines and
// every publish is written to stdout as a `{"topic", "payload", "qos"}` line.

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use climate_skill_core::{InboundMessage, Publisher, QoS, TransportError};

#[derive(Debug, Serialize)]
struct OutboundLine<'a> {
    topic: &'a str,
    payload: &'a str,
    qos: QoS,
}

/// Publisher that writes one JSON object per line to `W`.
///
/// Writes are serialized so concurrent publishes never interleave.
pub struct LinePublisher<W> {
    out: Mutex<W>,
}

impl<W> LinePublisher<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> Publisher for LinePublisher<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn publish(&self, topic: &str, payload: &str, qos: QoS) -> Result<(), TransportError> {
        let mut line = serde_json::to_string(&OutboundLine {
            topic,
            payload,
            qos,
        })
        .map_err(|e| TransportError::Publish {
            topic: topic.to_owned(),
            message: e.to_string(),
        })?;
        line.push('\n');

        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

/// Decode one inbound line.
pub fn parse_inbound(line: &str) -> Result<InboundMessage, serde_json::Error> {
    serde_json::from_str(line)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;

    #[tokio::test]
    async fn publishes_one_json_line_per_message() {
        let publisher = LinePublisher::new(Vec::new());
        publisher
            .publish("office/climate/set", r#"{"occupied_heating_setpoint": 21}"#, QoS::AtLeastOnce)
            .await
            .unwrap();
        publisher
            .publish("client/out", "Done.", QoS::AtMostOnce)
            .await
            .unwrap();

        let written = String::from_utf8(publisher.into_inner()).unwrap();
        let lines: Vec<Value> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                json!({
                    "topic": "office/climate/set",
                    "payload": "{\"occupied_heating_setpoint\": 21}",
                    "qos": 1
                }),
                json!({ "topic": "client/out", "payload": "Done.", "qos": 0 }),
            ]
        );
    }

    #[test]
    fn inbound_payload_defaults_to_empty() {
        let message = parse_inbound(r#"{"topic": "assistant/global_device_update"}"#).unwrap();
        assert_eq!(message.topic, "assistant/global_device_update");
        assert_eq!(message.payload, "");
        assert!(parse_inbound("not json").is_err());
    }
}
