//! Reference `NotificationConsumer` built as a registry from an enumerated
//! channel kind to a boxed delivery capability (design note §9: "dynamic
//! dispatch over channel types" / spec.md §A.B's `SenderRegistry`,
//! grounded on `examples/original_source/.../notifications/domain/sender.go`).
//!
//! Concrete notification transports are out of scope (spec.md §1); this
//! module exists so the single consumer attached to the Alert Dispatcher has
//! somewhere to fan out to, and so that adding a transport is a new enum
//! variant plus a registry entry, never a new match arm.

use crate::engine::domain::AlertEvent;
use crate::engine::logging::EngineLogger;
use crate::engine::repository::NotificationConsumer;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    Log,
    Webhook,
}

#[async_trait]
pub trait ChannelSender: Send + Sync {
    async fn send(&self, event: &AlertEvent);
}

/// Writes the rendered alert through the engine's structured logger.
/// Always registered — this is the fallback every deployment gets for free.
pub struct LogChannelSender {
    logger: Arc<EngineLogger>,
}

impl LogChannelSender {
    pub fn new(logger: Arc<EngineLogger>) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl ChannelSender for LogChannelSender {
    async fn send(&self, event: &AlertEvent) {
        let mut fields = HashMap::new();
        fields.insert("user_id".to_string(), serde_json::Value::String(event.user_id.to_string()));
        fields.insert("severity".to_string(), serde_json::Value::String(event.severity.to_string()));
        fields.insert(
            "previous_severity".to_string(),
            serde_json::Value::String(event.previous_severity.to_string()),
        );
        fields.insert("message".to_string(), serde_json::Value::String(event.render()));
        self.logger.event("AlertDispatcher", "alert_delivered", fields);
    }
}

/// Maps `ChannelType` to the sender(s) responsible for it. No `match` on a
/// channel-type string anywhere in the dispatch path.
pub struct SenderRegistry {
    senders: HashMap<ChannelType, Arc<dyn ChannelSender>>,
}

impl SenderRegistry {
    pub fn new() -> Self {
        Self { senders: HashMap::new() }
    }

    pub fn register(&mut self, channel: ChannelType, sender: Arc<dyn ChannelSender>) {
        self.senders.insert(channel, sender);
    }

    pub fn get(&self, channel: ChannelType) -> Option<Arc<dyn ChannelSender>> {
        self.senders.get(&channel).cloned()
    }
}

impl Default for SenderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The reference `NotificationConsumer`: fans one alert out to every
/// registered channel.
pub struct RegistryNotificationConsumer {
    registry: SenderRegistry,
}

impl RegistryNotificationConsumer {
    pub fn new(registry: SenderRegistry) -> Self {
        Self { registry }
    }

    pub fn with_log_channel(logger: Arc<EngineLogger>) -> Self {
        let mut registry = SenderRegistry::new();
        registry.register(ChannelType::Log, Arc::new(LogChannelSender::new(logger)));
        Self::new(registry)
    }
}

#[async_trait]
impl NotificationConsumer for RegistryNotificationConsumer {
    async fn deliver(&self, event: AlertEvent) {
        for channel in [ChannelType::Log, ChannelType::Webhook] {
            if let Some(sender) = self.registry.get(channel) {
                sender.send(&event).await;
            }
        }
    }
}
