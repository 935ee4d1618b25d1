use super::*;

pub fn render_set_timer_view(frame: &mut Frame, app: &App, body: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(2), // Task description
            Constraint::Length(3), // Duration input
            Constraint::Length(1), // Inline error
            Constraint::Min(0),    // Spacer
            Constraint::Length(3), // Controls
        ])
        .split(body);

    let description = app
        .todo
        .as_ref()
        .and_then(|todo| todo.description.as_deref())
        .unwrap_or("How many seconds until the reminder?");
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {}", description),
            Style::default().fg(Color::DarkGray),
        )),
        chunks[0],
    );

    let has_error = app.input_error.is_some();
    let border_style = if has_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Magenta)
    };

    let (before, after) = app.duration_input.split_at_cursor();
    let input = Paragraph::new(format!("{}█{}", before, after))
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Seconds ")
                .border_style(border_style)
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(input, chunks[1]);

    if let Some(error) = &app.input_error {
        let error_line = Paragraph::new(Span::styled(
            format!(" {}", error),
            Style::default().fg(Color::Red),
        ));
        frame.render_widget(error_line, chunks[2]);
    }

    let back_label = if app.can_go_back() { "Back" } else { "Quit" };
    render_controls(
        frame,
        chunks[4],
        &[("Enter", "Start timer"), ("Ctrl+X", "Clear"), ("Esc", back_label)],
    );
}
