use crate::app::{self, App};
use crossterm::event::KeyEvent;

use super::action_queue::{Action, ActionTx};

mod home;
mod set_timer;

fn enqueue_action(action_tx: &ActionTx, action: Action) {
    let _ = action_tx.send(action);
}

pub(super) fn handle_view_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match app.current_view {
        app::View::SetTimer => set_timer::handle_set_timer_key(key, app, action_tx),
        app::View::Home => home::handle_home_key(key, app, action_tx),
    }
}
