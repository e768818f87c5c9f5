// ── Skill facade ──
//
// Routes inbound bus messages and classified intents through resolution,
// rendering and dispatch. Nothing here returns an error to the caller once
// the skill is built: every request ends in a reply, a log line, or silence.

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::config::SkillConfig;
use crate::directory::Directory;
use crate::dispatch::Dispatcher;
use crate::error::CoreError;
use crate::model::{IntentRequest, IntentType, ResolvedParameters};
use crate::registry::DeviceRegistry;
use crate::render::{Renderer, TemplateSource};
use crate::resolver::Resolver;
use crate::transport::{InboundMessage, Publisher, QoS};

/// Reply when a set request matched no device.
pub const NO_DEVICES_MESSAGE: &str = "I couldn't find any climate devices in that room.";
/// Reply when a set request carried no usable temperature.
pub const MISSING_TEMPERATURE_MESSAGE: &str = "Please specify a temperature to set.";
/// Reply for intents the skill does not handle.
pub const UNSUPPORTED_MESSAGE: &str = "I'm not sure how to handle that request.";

/// Delivery guarantee for replies to the client.
const RESPONSE_QOS: QoS = QoS::AtLeastOnce;

// ── Intent routing ───────────────────────────────────────────────

/// The branches the skill distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkillIntent {
    Set,
    Help,
    Unsupported,
}

impl From<IntentType> for SkillIntent {
    fn from(intent: IntentType) -> Self {
        match intent {
            IntentType::DeviceSet => Self::Set,
            IntentType::SystemHelp => Self::Help,
            _ => Self::Unsupported,
        }
    }
}

// ── Skill ────────────────────────────────────────────────────────

/// A running climate skill.
///
/// Cheaply cloneable via `Arc<SkillInner>`; clones share the directory,
/// the publisher and the set of tracked background tasks.
#[derive(Clone)]
pub struct Skill {
    inner: Arc<SkillInner>,
}

struct SkillInner {
    config: SkillConfig,
    directory: Arc<Directory>,
    resolver: Resolver,
    renderer: Renderer,
    dispatcher: Dispatcher,
    publisher: Arc<dyn Publisher>,
    tasks: TaskTracker,
}

impl Skill {
    /// Build the skill. Fails if any response template is missing or invalid.
    ///
    /// The directory starts empty and loads on the first request, or
    /// earlier through [`Directory::refresh`].
    pub fn new(
        config: SkillConfig,
        registry: Arc<dyn DeviceRegistry>,
        publisher: Arc<dyn Publisher>,
        templates: &dyn TemplateSource,
    ) -> Result<Self, CoreError> {
        let renderer = Renderer::load(templates)?;
        let directory = Arc::new(Directory::new(registry));
        let resolver = Resolver::new(Arc::clone(&directory), config.climate.clone());
        let dispatcher = Dispatcher::new(Arc::clone(&publisher));

        info!(client_id = %config.client_id, base_topic = %config.base_topic, "climate skill ready");
        Ok(Self {
            inner: Arc::new(SkillInner {
                config,
                directory,
                resolver,
                renderer,
                dispatcher,
                publisher,
                tasks: TaskTracker::new(),
            }),
        })
    }

    pub fn config(&self) -> &SkillConfig {
        &self.inner.config
    }

    pub fn directory(&self) -> &Arc<Directory> {
        &self.inner.directory
    }

    /// Topics the transport must subscribe to on the skill's behalf.
    pub fn subscriptions(&self) -> Vec<String> {
        vec![
            self.inner.config.intent_topic(),
            self.inner.config.device_update_topic(),
        ]
    }

    // ── Inbound routing ──────────────────────────────────────────

    /// Route one raw bus message.
    pub async fn handle_message(&self, message: &InboundMessage) {
        let config = &self.inner.config;
        if message.topic == config.device_update_topic() {
            self.spawn_refresh();
        } else if message.topic == config.intent_topic() {
            match serde_json::from_str::<IntentRequest>(&message.payload) {
                Ok(request) => self.process_request(request).await,
                Err(e) => {
                    let err = CoreError::Decode {
                        topic: message.topic.clone(),
                        message: e.to_string(),
                    };
                    warn!(error = %err, "dropping undecodable intent request");
                }
            }
        } else {
            debug!(topic = %message.topic, "ignoring message on unexpected topic");
        }
    }

    /// Answer and act on one classified intent.
    pub async fn process_request(&self, request: IntentRequest) {
        let intent = request.classified_intent.intent_type;
        let confidence = request.classified_intent.confidence;

        if let Some(threshold) = self.inner.config.thresholds.for_intent(intent) {
            if confidence < threshold {
                debug!(%intent, confidence, threshold, "intent below confidence threshold, ignoring");
                return;
            }
        }

        if let Err(e) = self.inner.directory.ensure_loaded().await {
            warn!(error = %e, "device directory unavailable, continuing with cached devices");
        }

        match SkillIntent::from(intent) {
            SkillIntent::Set => self.handle_set(intent, request).await,
            SkillIntent::Help => self.handle_help(intent, request).await,
            SkillIntent::Unsupported => self.handle_unsupported(intent, &request).await,
        }
    }

    async fn handle_set(&self, intent: IntentType, request: IntentRequest) {
        let client = request.client_request;
        let parameters = self.inner.resolver.resolve(
            intent,
            &request.classified_intent.entities,
            &client.room,
        );

        if !parameters.relevance.may_proceed() {
            debug!(%intent, "request is not climate related, staying silent");
            return;
        }
        if parameters.targets.is_empty() {
            self.send_response(&client.output_topic, NO_DEVICES_MESSAGE)
                .await;
            return;
        }
        if !parameters.has_setpoint() {
            self.send_response(&client.output_topic, MISSING_TEMPERATURE_MESSAGE)
                .await;
            return;
        }

        let reply = self.inner.renderer.render(intent, &parameters);
        let responder = self.clone();
        self.spawn_tracked(async move {
            responder.send_response(&client.output_topic, &reply).await;
        });
        let dispatcher = self.inner.dispatcher.clone();
        self.spawn_tracked(async move {
            dispatcher.dispatch(intent, &parameters).await;
        });
    }

    async fn handle_help(&self, intent: IntentType, request: IntentRequest) {
        let client = request.client_request;
        let parameters = ResolvedParameters::for_room(client.room);
        let reply = self.inner.renderer.render(intent, &parameters);
        self.send_response(&client.output_topic, &reply).await;
    }

    async fn handle_unsupported(&self, intent: IntentType, request: &IntentRequest) {
        let relevance = self
            .inner
            .resolver
            .relevance(&request.classified_intent.entities);
        if !relevance.is_relevant() {
            debug!(%intent, ?relevance, "unsupported intent carries no climate signal, staying silent");
            return;
        }
        warn!(%intent, "unsupported intent type");
        self.send_response(&request.client_request.output_topic, UNSUPPORTED_MESSAGE)
            .await;
    }

    // ── Outbound ─────────────────────────────────────────────────

    /// Publish reply text to a client's output topic. Failures are logged.
    pub async fn send_response(&self, output_topic: &str, text: &str) {
        match self
            .inner
            .publisher
            .publish(output_topic, text, RESPONSE_QOS)
            .await
        {
            Ok(()) => debug!(topic = output_topic, "response sent"),
            Err(e) => error!(topic = output_topic, error = %e, "failed to send response"),
        }
    }

    // ── Background work ──────────────────────────────────────────

    fn spawn_refresh(&self) {
        let directory = Arc::clone(&self.inner.directory);
        self.spawn_tracked(async move {
            if let Err(e) = directory.refresh().await {
                warn!(error = %e, "device directory refresh failed, keeping previous devices");
            }
        });
    }

    fn spawn_tracked<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.inner.tasks.is_closed() {
            warn!("skill is shutting down, dropping background task");
            return;
        }
        self.inner.tasks.spawn(task);
    }

    /// Stop accepting background work and wait for in-flight tasks.
    pub async fn shutdown(&self) {
        self.inner.tasks.close();
        debug!(pending = self.inner.tasks.len(), "waiting for background tasks");
        self.inner.tasks.wait().await;
        info!("climate skill stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_set_and_help_are_handled() {
        assert_eq!(SkillIntent::from(IntentType::DeviceSet), SkillIntent::Set);
        assert_eq!(SkillIntent::from(IntentType::SystemHelp), SkillIntent::Help);
        for intent in [
            IntentType::DeviceOn,
            IntentType::MediaPlay,
            IntentType::SystemRefresh,
            IntentType::Unknown,
        ] {
            assert_eq!(SkillIntent::from(intent), SkillIntent::Unsupported);
        }
    }
}
