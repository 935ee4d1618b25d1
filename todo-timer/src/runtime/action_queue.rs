use crate::countdown::CountdownEvent;
use crate::notify::Permission;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone)]
pub(super) enum Action {
    StartCountdown { duration: Duration },
    CancelCountdown,
    PermissionResolved(Permission),
    Countdown(CountdownEvent),
}

pub(super) type ActionTx = UnboundedSender<Action>;
pub(super) type ActionRx = UnboundedReceiver<Action>;

pub(super) fn channel() -> (ActionTx, ActionRx) {
    mpsc::unbounded_channel()
}
