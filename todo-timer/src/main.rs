mod app;
mod args;
mod cli;
mod config;
mod countdown;
mod logging;
mod notify;
mod runtime;
mod types;
mod ui;

use anyhow::Result;
use app::{App, TextInput};
use args::{ArgumentReader, LaunchArguments};
use clap::Parser;
use cli::{Cli, Commands};
use config::TimerConfig;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let task_args = match cli.command {
        Some(Commands::ConfigPath) => return print_config_path(),
        Some(Commands::Run(task_args)) => task_args,
        None => cli.task,
    };

    let cfg = TimerConfig::load()?;

    // Logging is best effort; the timer works without it.
    let _log_guard = match cfg
        .log_dir()
        .and_then(|dir| logging::init_file_logging(&dir))
    {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        }
    };

    let reader = LaunchArguments::new(task_args.todo_json, task_args.title);
    let mut app = App::new(reader.read_task(), &cfg);
    if app.is_terminated() {
        info!("launched without a task, exiting");
        return Ok(());
    }
    if let Some(seconds) = &task_args.seconds {
        app.duration_input = TextInput::from_str(seconds);
    }

    let backend = notify::default_backend(
        &cfg.app_name,
        cfg.notifications_enabled,
        cfg.notification_timeout(),
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend)?;

    let res = runtime::run_app(&mut terminal, &mut app, backend).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn print_config_path() -> Result<()> {
    let path = TimerConfig::config_path()?;
    if !path.exists() {
        TimerConfig::default().save()?;
        println!("Created default config at {}", path.display());
    }
    println!("{}", path.display());
    Ok(())
}
