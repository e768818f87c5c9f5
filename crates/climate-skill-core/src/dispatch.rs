// ── Device command dispatch ──
//
// Fans a resolved setpoint out to every target device. Each publish runs
// in its own task so a failing or hung device never holds up the rest.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::model::{IntentType, ResolvedParameters};
use crate::resolver::is_action;
use crate::transport::{Publisher, QoS};

/// Delivery guarantee for device commands.
pub const COMMAND_QOS: QoS = QoS::AtLeastOnce;

/// Publishes per-device setpoint commands.
#[derive(Clone)]
pub struct Dispatcher {
    publisher: Arc<dyn Publisher>,
}

impl Dispatcher {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }

    /// Send the setpoint command to every target device.
    ///
    /// Failures are logged per device and never reported back. Returns once
    /// every per-device publish has finished.
    pub async fn dispatch(&self, intent: IntentType, parameters: &ResolvedParameters) {
        if !is_action(intent) {
            error!(%intent, "unknown intent type for device command");
            return;
        }
        if parameters.targets.is_empty() {
            warn!("no target devices to send commands to");
            return;
        }

        let mut publishes = JoinSet::new();
        for device in &parameters.targets {
            let payload = device.render_payload(parameters.temperature);
            info!(topic = %device.topic, %payload, "sending payload to device");

            let publisher = Arc::clone(&self.publisher);
            let device = Arc::clone(device);
            publishes.spawn(async move {
                match publisher
                    .publish(device.topic.as_str(), &payload, COMMAND_QOS)
                    .await
                {
                    Ok(()) => true,
                    Err(e) => {
                        error!(
                            topic = %device.topic,
                            device = %device.alias,
                            error = %e,
                            "failed to send device command"
                        );
                        false
                    }
                }
            });
        }

        let (mut sent, mut failed) = (0_usize, 0_usize);
        while let Some(outcome) = publishes.join_next().await {
            match outcome {
                Ok(true) => sent += 1,
                Ok(false) => failed += 1,
                Err(e) => {
                    failed += 1;
                    error!(error = %e, "device command task aborted");
                }
            }
        }
        debug!(sent, failed, "device dispatch finished");
    }
}
