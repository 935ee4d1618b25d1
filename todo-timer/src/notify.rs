use crate::types::Todo;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const TIMER_CHANNEL_ID: &str = "todoTimerChannel";
pub const TIMER_CHANNEL_NAME: &str = "Todo Timer Channel";
pub const TIMER_CHANNEL_DESCRIPTION: &str = "Channel for Todo Timer notifications";

/// Every finished timer reuses this id, so a new one replaces the previous.
pub const TIMER_NOTIFICATION_ID: u32 = 1;
pub const TIMER_FINISHED_TITLE: &str = "Timer Finished";

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Low,
    Default,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
}

impl NotificationChannel {
    pub fn timer() -> Self {
        Self {
            id: TIMER_CHANNEL_ID.to_string(),
            name: TIMER_CHANNEL_NAME.to_string(),
            description: TIMER_CHANNEL_DESCRIPTION.to_string(),
            importance: Importance::High,
        }
    }
}

/// What activating the notification should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAction {
    OpenHome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u32,
    pub channel_id: String,
    pub title: String,
    pub body: String,
    pub priority: Importance,
    pub auto_dismiss: bool,
    pub tap_action: TapAction,
}

impl Notification {
    pub fn timer_finished(todo: &Todo) -> Self {
        Self {
            id: TIMER_NOTIFICATION_ID,
            channel_id: TIMER_CHANNEL_ID.to_string(),
            title: TIMER_FINISHED_TITLE.to_string(),
            body: format!("Timer is over for task: {}", todo.title),
            priority: Importance::High,
            auto_dismiss: true,
            tap_action: TapAction::OpenHome,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification permission denied")]
    PermissionDenied,
    #[error("notification channel {0} is not registered")]
    UnknownChannel(String),
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Abstraction over the service that displays notifications.
#[async_trait]
pub trait NotificationBackend: Send + Sync {
    /// Register a channel. Registering an identical channel again is a no-op;
    /// returns true only when something changed.
    fn create_channel(&self, channel: &NotificationChannel) -> bool;

    /// Whether a consent decision has to be requested before sending.
    fn requires_consent(&self) -> bool;

    /// Last known consent decision, if any.
    fn permission(&self) -> Option<Permission>;

    async fn request_permission(&self) -> Permission;

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, Default)]
struct ChannelRegistry {
    channels: HashMap<String, NotificationChannel>,
}

impl ChannelRegistry {
    fn register(&mut self, channel: &NotificationChannel) -> bool {
        if self.channels.get(&channel.id) == Some(channel) {
            return false;
        }
        self.channels.insert(channel.id.clone(), channel.clone());
        true
    }

    fn get(&self, id: &str) -> Option<&NotificationChannel> {
        self.channels.get(id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotifierKind {
    NotifyRust,
    LogOnly,
}

#[derive(Debug)]
struct DesktopState {
    kind: NotifierKind,
    registry: ChannelRegistry,
    permission: Option<Permission>,
}

/// Desktop notifications via notify-rust, degrading to log output when the
/// notification service is unavailable.
#[derive(Debug)]
pub struct DesktopNotifier {
    app_name: String,
    timeout: Option<Duration>,
    state: Mutex<DesktopState>,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>, timeout: Option<Duration>) -> Self {
        debug!("desktop notifier created");
        Self {
            app_name: app_name.into(),
            timeout,
            state: Mutex::new(DesktopState {
                kind: NotifierKind::NotifyRust,
                registry: ChannelRegistry::default(),
                permission: None,
            }),
        }
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    async fn probe_server(&self) -> Permission {
        match tokio::task::spawn_blocking(notify_rust::get_server_information).await {
            Ok(Ok(info)) => {
                debug!(server = %info.name, version = %info.version, "notification server found");
                Permission::Granted
            }
            Ok(Err(e)) => {
                warn!(error = %e, "no notification server answered");
                Permission::Denied
            }
            Err(e) => {
                warn!(error = %e, "notification server probe panicked");
                Permission::Denied
            }
        }
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    async fn probe_server(&self) -> Permission {
        Permission::Granted
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    async fn show(
        &self,
        notification: &Notification,
        channel: &NotificationChannel,
    ) -> Result<(), NotifyError> {
        let mut desktop = notify_rust::Notification::new();
        desktop
            .appname(&self.app_name)
            .summary(&notification.title)
            .body(&notification.body)
            .id(notification.id)
            .urgency(urgency(notification.priority.max_with(channel.importance)))
            .hint(notify_rust::Hint::Category(channel.id.clone()))
            .hint(notify_rust::Hint::Resident(!notification.auto_dismiss));
        match notification.tap_action {
            TapAction::OpenHome => {
                desktop.action("default", "Open");
            }
        }
        if let Some(timeout) = self.timeout {
            desktop.timeout(notify_rust::Timeout::Milliseconds(
                timeout.as_millis().min(u32::MAX as u128) as u32,
            ));
        }
        desktop
            .show_async()
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    async fn show(
        &self,
        notification: &Notification,
        _channel: &NotificationChannel,
    ) -> Result<(), NotifyError> {
        let mut desktop = notify_rust::Notification::new();
        desktop
            .appname(&self.app_name)
            .summary(&notification.title)
            .body(&notification.body);
        desktop
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}

impl Importance {
    fn max_with(self, other: Importance) -> Importance {
        match (self, other) {
            (Importance::High, _) | (_, Importance::High) => Importance::High,
            (Importance::Default, _) | (_, Importance::Default) => Importance::Default,
            _ => Importance::Low,
        }
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn urgency(importance: Importance) -> notify_rust::Urgency {
    match importance {
        Importance::Low => notify_rust::Urgency::Low,
        Importance::Default => notify_rust::Urgency::Normal,
        Importance::High => notify_rust::Urgency::Critical,
    }
}

#[async_trait]
impl NotificationBackend for DesktopNotifier {
    fn create_channel(&self, channel: &NotificationChannel) -> bool {
        let created = lock(&self.state).registry.register(channel);
        debug!(
            channel = %channel.id,
            name = %channel.name,
            description = %channel.description,
            created,
            "notification channel registered"
        );
        created
    }

    fn requires_consent(&self) -> bool {
        cfg!(all(unix, not(target_os = "macos")))
    }

    fn permission(&self) -> Option<Permission> {
        lock(&self.state).permission
    }

    async fn request_permission(&self) -> Permission {
        let decision = self.probe_server().await;
        let mut state = lock(&self.state);
        state.permission = Some(decision);
        if decision == Permission::Denied {
            state.kind = NotifierKind::LogOnly;
        }
        info!(?decision, "notification permission resolved");
        decision
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let (kind, channel) = {
            let state = lock(&self.state);
            let channel = state
                .registry
                .get(&notification.channel_id)
                .cloned()
                .ok_or_else(|| NotifyError::UnknownChannel(notification.channel_id.clone()))?;
            (state.kind, channel)
        };

        match kind {
            NotifierKind::NotifyRust => {
                debug!(
                    id = notification.id,
                    channel = %channel.id,
                    "showing desktop notification"
                );
                if let Err(e) = self.show(notification, &channel).await {
                    warn!(error = %e, "notify-rust failed; downgrading to log-only notifier");
                    lock(&self.state).kind = NotifierKind::LogOnly;
                    info!("[NOTIFY] {}: {}", notification.title, notification.body);
                    return Err(e);
                }
                Ok(())
            }
            NotifierKind::LogOnly => {
                info!("[NOTIFY] {}: {}", notification.title, notification.body);
                Ok(())
            }
        }
    }
}

/// Writes notifications to the log only.
#[derive(Debug, Default)]
pub struct LogOnlyNotifier {
    registry: Mutex<ChannelRegistry>,
}

#[async_trait]
impl NotificationBackend for LogOnlyNotifier {
    fn create_channel(&self, channel: &NotificationChannel) -> bool {
        lock(&self.registry).register(channel)
    }

    fn requires_consent(&self) -> bool {
        false
    }

    fn permission(&self) -> Option<Permission> {
        Some(Permission::Granted)
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if lock(&self.registry).get(&notification.channel_id).is_none() {
            return Err(NotifyError::UnknownChannel(notification.channel_id.clone()));
        }
        info!("[NOTIFY] {}: {}", notification.title, notification.body);
        Ok(())
    }
}

/// Pick the backend for the current configuration.
pub fn default_backend(
    app_name: &str,
    enabled: bool,
    timeout: Option<Duration>,
) -> Arc<dyn NotificationBackend> {
    if enabled {
        Arc::new(DesktopNotifier::new(app_name, timeout))
    } else {
        debug!("notifications disabled in config, using log-only notifier");
        Arc::new(LogOnlyNotifier::default())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Backend that records what it was asked to do. Visible notifications are
    /// keyed by id, mirroring how a notification server replaces by id.
    #[derive(Debug)]
    pub struct RecordingBackend {
        pub consent_required: bool,
        pub decision: Permission,
        pub fail_delivery: bool,
        channels: Mutex<ChannelRegistry>,
        channel_calls: Mutex<usize>,
        permission: Mutex<Option<Permission>>,
        permission_requests: Mutex<usize>,
        sent: Mutex<Vec<Notification>>,
        visible: Mutex<HashMap<u32, Notification>>,
    }

    impl RecordingBackend {
        pub fn new() -> Self {
            Self {
                consent_required: true,
                decision: Permission::Granted,
                fail_delivery: false,
                channels: Mutex::new(ChannelRegistry::default()),
                channel_calls: Mutex::new(0),
                permission: Mutex::new(None),
                permission_requests: Mutex::new(0),
                sent: Mutex::new(Vec::new()),
                visible: Mutex::new(HashMap::new()),
            }
        }

        pub fn sent(&self) -> Vec<Notification> {
            lock(&self.sent).clone()
        }

        pub fn visible_count(&self) -> usize {
            lock(&self.visible).len()
        }

        pub fn channel_calls(&self) -> usize {
            *lock(&self.channel_calls)
        }

        pub fn permission_requests(&self) -> usize {
            *lock(&self.permission_requests)
        }

        pub fn set_permission(&self, permission: Option<Permission>) {
            *lock(&self.permission) = permission;
        }
    }

    #[async_trait]
    impl NotificationBackend for RecordingBackend {
        fn create_channel(&self, channel: &NotificationChannel) -> bool {
            *lock(&self.channel_calls) += 1;
            lock(&self.channels).register(channel)
        }

        fn requires_consent(&self) -> bool {
            self.consent_required
        }

        fn permission(&self) -> Option<Permission> {
            *lock(&self.permission)
        }

        async fn request_permission(&self) -> Permission {
            *lock(&self.permission_requests) += 1;
            *lock(&self.permission) = Some(self.decision);
            self.decision
        }

        async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
            if lock(&self.channels).get(&notification.channel_id).is_none() {
                return Err(NotifyError::UnknownChannel(notification.channel_id.clone()));
            }
            if self.fail_delivery {
                return Err(NotifyError::Delivery("service unavailable".to_string()));
            }
            lock(&self.sent).push(notification.clone());
            lock(&self.visible).insert(notification.id, notification.clone());
            Ok(())
        }
    }
}
