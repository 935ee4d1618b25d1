use super::*;

impl App {
    /// Replace the whole view stack with Home. Nothing can navigate back from
    /// here, in particular not to the timer screen.
    pub fn navigate_home(&mut self) {
        self.history.clear();
        self.current_view = View::Home;
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Pop to the previous view. Returns false when there is none, in which
    /// case the caller leaves the application.
    pub fn go_back(&mut self) -> bool {
        match self.history.pop() {
            Some(view) => {
                self.current_view = view;
                true
            }
            None => false,
        }
    }
}
