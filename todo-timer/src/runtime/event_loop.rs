use crate::app::App;
use crate::notify::NotificationBackend;
use crate::ui;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use super::action_queue::channel;
use super::actions::{enter_timer_screen, run_action};
use super::views::handle_view_key;

pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    backend: Arc<dyn NotificationBackend>,
) -> Result<()> {
    let (action_tx, mut action_rx) = channel();

    enter_timer_screen(app, &backend, &action_tx);

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if app.is_counting() {
            app.throbber_state.calc_next();
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_view_key(key, app, &action_tx);
                }
            }
        }

        while let Ok(action) = action_rx.try_recv() {
            run_action(action, app, backend.as_ref(), &action_tx).await;
        }

        if !app.running {
            break;
        }
    }

    // Teardown: a countdown must not outlive the session.
    app.quit();

    Ok(())
}
