use crate::app::App;
use crate::countdown::{Countdown, CountdownEvent};
use crate::notify::{Notification, NotificationBackend, NotificationChannel, NotifyError, Permission};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::action_queue::{Action, ActionTx};

/// Screen entry: ask for notification consent when needed and register the
/// timer channel.
pub(super) fn enter_timer_screen(
    app: &mut App,
    backend: &Arc<dyn NotificationBackend>,
    action_tx: &ActionTx,
) {
    let known = backend.permission();
    if backend.requires_consent() && known != Some(Permission::Granted) {
        debug!("requesting notification permission");
        let backend = Arc::clone(backend);
        let action_tx = action_tx.clone();
        tokio::spawn(async move {
            let decision = backend.request_permission().await;
            let _ = action_tx.send(Action::PermissionResolved(decision));
        });
    } else {
        app.permission = known;
    }

    backend.create_channel(&NotificationChannel::timer());
}

pub(super) async fn run_action(
    action: Action,
    app: &mut App,
    backend: &dyn NotificationBackend,
    action_tx: &ActionTx,
) {
    match action {
        Action::StartCountdown { duration } => {
            if let Some(previous) = app.countdown.take() {
                previous.cancel();
            }
            let action_tx = action_tx.clone();
            let handle = Countdown::start(duration, app.tick_interval, move |event| {
                let _ = action_tx.send(Action::Countdown(event));
            });
            app.start_countdown(handle);
            app.clear_status();
        }
        Action::CancelCountdown => {
            if app.cancel_countdown() {
                app.set_status("Timer cancelled".to_string());
            } else {
                app.set_status("No timer running".to_string());
            }
        }
        Action::PermissionResolved(decision) => {
            app.permission = Some(decision);
            if decision == Permission::Denied {
                app.set_status("Warning: notifications are not available".to_string());
            }
        }
        Action::Countdown(CountdownEvent::Tick { remaining }) => {
            app.on_tick(remaining);
        }
        Action::Countdown(CountdownEvent::Finished) => {
            if let Some(notification) = app.on_countdown_finished() {
                deliver_notification(app, backend, &notification).await;
            }
        }
    }
}

async fn deliver_notification(
    app: &mut App,
    backend: &dyn NotificationBackend,
    notification: &Notification,
) {
    let permission = app.permission.or_else(|| backend.permission());
    let result = match permission {
        Some(Permission::Denied) => Err(NotifyError::PermissionDenied),
        _ => backend.notify(notification).await,
    };

    match result {
        Ok(()) => {
            info!(id = notification.id, "timer notification delivered");
            app.set_status(format!("Timer finished for {}", app.task_title()));
        }
        Err(e) => {
            warn!(error = %e, "timer notification not delivered");
            app.set_status(format!("Timer finished, notification error: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ScreenState, View};
    use crate::config::TimerConfig;
    use crate::notify::testing::RecordingBackend;
    use crate::types::Todo;
    use std::time::Duration;
    use tokio::time::Instant;

    use super::super::action_queue::{channel, ActionRx};

    fn test_app() -> App {
        App::new(Some(Todo::with_title("Buy milk")), &TimerConfig::default())
    }

    fn granted_backend() -> Arc<RecordingBackend> {
        let backend = RecordingBackend::new();
        backend.set_permission(Some(Permission::Granted));
        Arc::new(backend)
    }

    /// Feed queued actions back into the app until the countdown finishes.
    async fn drain_until_finished(
        app: &mut App,
        backend: &dyn NotificationBackend,
        tx: &ActionTx,
        rx: &mut ActionRx,
    ) {
        while let Some(action) = rx.recv().await {
            let done = matches!(action, Action::Countdown(CountdownEvent::Finished));
            run_action(action, app, backend, tx).await;
            if done {
                return;
            }
        }
    }

    #[tokio::test]
    async fn entry_registers_channel_and_requests_consent() {
        let recording = Arc::new(RecordingBackend::new());
        let backend: Arc<dyn NotificationBackend> = recording.clone();
        let mut app = test_app();
        let (tx, mut rx) = channel();

        enter_timer_screen(&mut app, &backend, &tx);
        enter_timer_screen(&mut app, &backend, &tx);

        assert_eq!(recording.channel_calls(), 2);
        let action = rx.recv().await.expect("permission result");
        assert!(matches!(action, Action::PermissionResolved(Permission::Granted)));
        run_action(action, &mut app, backend.as_ref(), &tx).await;
        assert_eq!(app.permission, Some(Permission::Granted));
    }

    #[tokio::test]
    async fn entry_skips_request_when_already_granted() {
        let recording = granted_backend();
        let backend: Arc<dyn NotificationBackend> = recording.clone();
        let mut app = test_app();
        let (tx, mut rx) = channel();

        enter_timer_screen(&mut app, &backend, &tx);
        tokio::task::yield_now().await;

        assert_eq!(recording.permission_requests(), 0);
        assert!(rx.try_recv().is_err());
        assert_eq!(app.permission, Some(Permission::Granted));
    }

    #[tokio::test(start_paused = true)]
    async fn completed_countdown_notifies_with_task_title() {
        let recording = granted_backend();
        let backend: Arc<dyn NotificationBackend> = recording.clone();
        let mut app = test_app();
        let (tx, mut rx) = channel();
        enter_timer_screen(&mut app, &backend, &tx);

        let start = Instant::now();
        run_action(
            Action::StartCountdown {
                duration: Duration::from_secs(5),
            },
            &mut app,
            backend.as_ref(),
            &tx,
        )
        .await;
        assert_eq!(app.screen, ScreenState::Counting);

        drain_until_finished(&mut app, backend.as_ref(), &tx, &mut rx).await;

        assert_eq!(start.elapsed(), Duration::from_secs(5));
        let sent = recording.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Timer Finished");
        assert_eq!(sent[0].body, "Timer is over for task: Buy milk");
        assert_eq!(app.screen, ScreenState::Notified);
        assert_eq!(app.current_view, View::Home);
        assert!(!app.can_go_back());
        assert!(!app.is_counting());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_update_remaining_time() {
        let backend = granted_backend();
        let mut app = test_app();
        let (tx, mut rx) = channel();

        run_action(
            Action::StartCountdown {
                duration: Duration::from_secs(3),
            },
            &mut app,
            backend.as_ref(),
            &tx,
        )
        .await;
        assert_eq!(app.remaining, Some(Duration::from_secs(3)));

        let action = rx.recv().await.expect("tick");
        run_action(action, &mut app, backend.as_ref(), &tx).await;
        assert_eq!(app.remaining, Some(Duration::from_secs(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_completions_update_one_notification() {
        let recording = granted_backend();
        let backend: Arc<dyn NotificationBackend> = recording.clone();
        let mut app = test_app();
        let (tx, mut rx) = channel();
        enter_timer_screen(&mut app, &backend, &tx);

        for _ in 0..2 {
            run_action(
                Action::StartCountdown {
                    duration: Duration::from_secs(1),
                },
                &mut app,
                backend.as_ref(),
                &tx,
            )
            .await;
            drain_until_finished(&mut app, backend.as_ref(), &tx, &mut rx).await;
        }

        assert_eq!(recording.sent().len(), 2);
        assert_eq!(recording.visible_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn denied_permission_skips_delivery_but_still_goes_home() {
        let recording = granted_backend();
        let backend: Arc<dyn NotificationBackend> = recording.clone();
        let mut app = test_app();
        let (tx, mut rx) = channel();
        enter_timer_screen(&mut app, &backend, &tx);

        run_action(
            Action::PermissionResolved(Permission::Denied),
            &mut app,
            backend.as_ref(),
            &tx,
        )
        .await;
        run_action(
            Action::StartCountdown {
                duration: Duration::from_secs(2),
            },
            &mut app,
            backend.as_ref(),
            &tx,
        )
        .await;
        drain_until_finished(&mut app, backend.as_ref(), &tx, &mut rx).await;

        assert!(recording.sent().is_empty());
        assert_eq!(app.current_view, View::Home);
        let status = app.status_message.as_deref().unwrap_or_default();
        assert!(status.contains("permission denied"), "status: {status}");
    }

    #[tokio::test(start_paused = true)]
    async fn delivery_failure_is_reported_in_status() {
        let mut recording = RecordingBackend::new();
        recording.fail_delivery = true;
        recording.set_permission(Some(Permission::Granted));
        let backend: Arc<dyn NotificationBackend> = Arc::new(recording);
        let mut app = test_app();
        let (tx, mut rx) = channel();
        enter_timer_screen(&mut app, &backend, &tx);

        run_action(
            Action::StartCountdown {
                duration: Duration::from_secs(1),
            },
            &mut app,
            backend.as_ref(),
            &tx,
        )
        .await;
        drain_until_finished(&mut app, backend.as_ref(), &tx, &mut rx).await;

        let status = app.status_message.as_deref().unwrap_or_default();
        assert!(status.contains("service unavailable"), "status: {status}");
        assert_eq!(app.screen, ScreenState::Notified);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_countdown_never_notifies() {
        let recording = granted_backend();
        let backend: Arc<dyn NotificationBackend> = recording.clone();
        let mut app = test_app();
        let (tx, mut rx) = channel();
        enter_timer_screen(&mut app, &backend, &tx);

        run_action(
            Action::StartCountdown {
                duration: Duration::from_secs(3),
            },
            &mut app,
            backend.as_ref(),
            &tx,
        )
        .await;
        run_action(Action::CancelCountdown, &mut app, backend.as_ref(), &tx).await;
        assert_eq!(app.status_message.as_deref(), Some("Timer cancelled"));

        tokio::time::sleep(Duration::from_secs(10)).await;
        while let Ok(action) = rx.try_recv() {
            run_action(action, &mut app, backend.as_ref(), &tx).await;
        }
        assert!(recording.sent().is_empty());
        assert_eq!(app.screen, ScreenState::Idle);

        run_action(Action::CancelCountdown, &mut app, backend.as_ref(), &tx).await;
        assert_eq!(app.status_message.as_deref(), Some("No timer running"));
    }

    #[tokio::test(start_paused = true)]
    async fn quitting_tears_down_pending_countdown() {
        let recording = granted_backend();
        let backend: Arc<dyn NotificationBackend> = recording.clone();
        let mut app = test_app();
        let (tx, mut rx) = channel();
        enter_timer_screen(&mut app, &backend, &tx);

        run_action(
            Action::StartCountdown {
                duration: Duration::from_secs(2),
            },
            &mut app,
            backend.as_ref(),
            &tx,
        )
        .await;
        app.quit();

        tokio::time::sleep(Duration::from_secs(5)).await;
        while let Ok(action) = rx.try_recv() {
            run_action(action, &mut app, backend.as_ref(), &tx).await;
        }
        assert!(recording.sent().is_empty());
        assert!(!app.running);
    }
}
