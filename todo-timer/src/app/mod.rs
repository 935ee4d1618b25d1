use crate::config::TimerConfig;
use crate::countdown::CountdownHandle;
use crate::notify::{Notification, Permission};
use crate::types::Todo;
use std::time::Duration;
use tracing::{debug, info};

mod navigation;
mod state;
pub use state::{ScreenState, TextInput, View};

pub const INVALID_TIME_MESSAGE: &str = "Please enter a valid time";

pub struct App {
    pub running: bool,
    pub todo: Option<Todo>,
    pub screen: ScreenState,
    pub current_view: View,
    history: Vec<View>,
    pub status_message: Option<String>,

    // Duration entry on the timer screen
    pub duration_input: TextInput,
    pub input_error: Option<String>,

    // Countdown session, owned here so it outlives the timer screen
    pub countdown: Option<CountdownHandle>,
    pub remaining: Option<Duration>,
    pub tick_interval: Duration,

    pub permission: Option<Permission>,
    pub last_notification: Option<Notification>,

    pub throbber_state: throbber_widgets_tui::ThrobberState,
}

impl App {
    pub fn new(todo: Option<Todo>, cfg: &TimerConfig) -> Self {
        let screen = if todo.is_some() {
            ScreenState::Idle
        } else {
            ScreenState::Terminated
        };
        Self {
            running: todo.is_some(),
            todo,
            screen,
            current_view: View::SetTimer,
            history: Vec::new(),
            status_message: None,
            duration_input: TextInput::new(),
            input_error: None,
            countdown: None,
            remaining: None,
            tick_interval: cfg.tick_interval(),
            permission: None,
            last_notification: None,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.screen == ScreenState::Terminated
    }

    pub fn task_title(&self) -> &str {
        self.todo.as_ref().map(|t| t.title.as_str()).unwrap_or("")
    }

    /// Leave the application. Any pending countdown is cancelled.
    pub fn quit(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.cancel();
        }
        self.remaining = None;
        self.running = false;
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn input_char(&mut self, c: char) {
        self.duration_input.insert(c);
        self.input_error = None;
    }

    pub fn input_backspace(&mut self) {
        self.duration_input.backspace();
        self.input_error = None;
    }

    /// Validate the duration field. On failure the inline error is set and
    /// nothing else changes.
    pub fn submit_duration(&mut self) -> Option<Duration> {
        match parse_duration_input(&self.duration_input.value) {
            Some(duration) => {
                self.input_error = None;
                Some(duration)
            }
            None => {
                debug!(input = %self.duration_input.value, "rejected timer duration");
                self.input_error = Some(INVALID_TIME_MESSAGE.to_string());
                None
            }
        }
    }

    pub fn is_counting(&self) -> bool {
        self.countdown
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn start_countdown(&mut self, handle: CountdownHandle) {
        info!(
            task = %self.task_title(),
            millis = handle.duration().as_millis() as u64,
            "timer started"
        );
        self.remaining = Some(handle.duration());
        self.countdown = Some(handle);
        self.screen = ScreenState::Counting;
    }

    pub fn cancel_countdown(&mut self) -> bool {
        let Some(handle) = self.countdown.take() else {
            return false;
        };
        handle.cancel();
        self.remaining = None;
        self.screen = ScreenState::Idle;
        info!(task = %self.task_title(), "timer cancelled");
        true
    }

    pub fn on_tick(&mut self, remaining: Duration) {
        if self.countdown.is_some() {
            self.remaining = Some(remaining);
        }
    }

    /// Completion of the countdown. Returns the notification to deliver, or
    /// None when no countdown is pending (a cancelled one may still have a
    /// queued completion).
    pub fn on_countdown_finished(&mut self) -> Option<Notification> {
        self.countdown.take()?;
        let todo = self.todo.as_ref()?;
        let notification = Notification::timer_finished(todo);
        info!(task = %todo.title, "timer finished");
        self.remaining = None;
        self.screen = ScreenState::Notified;
        self.last_notification = Some(notification.clone());
        self.navigate_home();
        Some(notification)
    }
}

/// Parse a whole number of seconds into a duration. Zero, negative and
/// non-numeric input are rejected.
pub fn parse_duration_input(input: &str) -> Option<Duration> {
    let seconds = input.parse::<i64>().ok().filter(|s| *s > 0)?;
    let millis = u64::try_from(seconds).ok()?.checked_mul(1000)?;
    Some(Duration::from_millis(millis))
}
