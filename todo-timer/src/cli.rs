use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "todo-timer")]
#[command(about = "Countdown timer that notifies when a to-do item's time is up")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub task: TaskArgs,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open the timer screen for a task
    Run(TaskArgs),
    /// Print config path and create default file if missing
    ConfigPath,
}

#[derive(Debug, Clone, Default, Args)]
pub struct TaskArgs {
    /// Task as a JSON object, e.g. '{"title": "Buy milk"}'
    #[arg(long = "todo", conflicts_with = "title")]
    pub todo_json: Option<String>,

    /// Task title
    #[arg(long)]
    pub title: Option<String>,

    /// Prefill the duration field, in seconds
    #[arg(long)]
    pub seconds: Option<String>,
}
