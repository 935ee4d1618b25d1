use super::utils::{elapsed_ratio, format_remaining};
use super::*;
use crate::app::ScreenState;

pub fn render_home_view(frame: &mut Frame, app: &App, body: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Countdown
            Constraint::Length(1), // Progress
            Constraint::Min(0),    // Spacer
            Constraint::Length(3), // Status
            Constraint::Length(3), // Controls
        ])
        .split(body);

    render_countdown(frame, chunks[0], app);

    if let Some(handle) = &app.countdown {
        let gauge = ratatui::widgets::LineGauge::default()
            .ratio(elapsed_ratio(handle.duration(), handle.remaining()))
            .label("")
            .filled_symbol(ratatui::symbols::line::THICK_HORIZONTAL)
            .unfilled_symbol("╌")
            .filled_style(Style::default().fg(Color::Cyan))
            .unfilled_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(gauge, chunks[1]);
    }

    render_status(frame, chunks[3], app);

    let mut keys = vec![("Q", "Quit")];
    if app.is_counting() {
        keys.insert(0, ("C", "Cancel timer"));
    }
    render_controls(frame, chunks[4], &keys);
}

fn render_countdown(frame: &mut Frame, area: Rect, app: &App) {
    let (text, border_style) = match (app.screen, app.remaining) {
        (ScreenState::Counting, Some(remaining)) => (
            format!("{} ⏵ (running)", format_remaining(remaining)),
            Style::default().fg(Color::Green),
        ),
        (ScreenState::Notified, _) => (
            "Timer finished".to_string(),
            Style::default().fg(Color::Yellow),
        ),
        _ => ("No timer running".to_string(), Style::default()),
    };

    let widget = Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Timer ")
                .border_style(border_style)
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let fallback = match &app.last_notification {
        Some(notification) => notification.body.clone(),
        None => "Ready".to_string(),
    };
    let status_text = app.status_message.as_deref().unwrap_or(&fallback);

    let status_lower = status_text.to_lowercase();
    let is_error = status_lower.contains("error")
        || status_lower.contains("warning")
        || status_lower.contains("cancelled");
    let color = if is_error { Color::Red } else { Color::Green };

    let status = Paragraph::new(status_text.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Status ")
                .border_style(Style::default().fg(color))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(status, area);
}
