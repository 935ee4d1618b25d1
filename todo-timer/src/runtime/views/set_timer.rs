use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::super::action_queue::{Action, ActionTx};
use super::enqueue_action;

pub(super) fn handle_set_timer_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.duration_input.clear();
            app.input_error = None;
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.input_char(c);
        }
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Left => app.duration_input.move_left(),
        KeyCode::Right => app.duration_input.move_right(),
        KeyCode::Home => app.duration_input.home(),
        KeyCode::End => app.duration_input.end(),
        KeyCode::Enter => {
            if let Some(duration) = app.submit_duration() {
                enqueue_action(action_tx, Action::StartCountdown { duration });
                app.navigate_home();
            }
        }
        KeyCode::Esc => {
            if !app.go_back() {
                app.quit();
            }
        }
        _ => {}
    }
}
