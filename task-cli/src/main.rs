use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use task_cli::config::Config;
use task_cli::{Status, TaskError, TaskService, TaskStore, table};
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Track tasks in a local JSON file")]
struct Cli {
    /// Task file to use instead of the configured one
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Add a new task
    Add { description: String },
    /// Change the description of a task
    Update { id: u32, description: String },
    /// Delete a task
    Delete { id: u32 },
    /// Mark a task as in progress
    MarkInProgress { id: u32 },
    /// Mark a task as done
    MarkDone { id: u32 },
    /// List tasks, optionally only those with a given status
    List {
        #[arg(value_enum, default_value_t = ListFilter::All)]
        filter: ListFilter,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ListFilter {
    All,
    Todo,
    InProgress,
    Done,
    NotDone,
}

impl ListFilter {
    fn label(&self) -> &'static str {
        match self {
            ListFilter::All => "all",
            ListFilter::Todo => Status::Todo.as_str(),
            ListFilter::InProgress => Status::InProgress.as_str(),
            ListFilter::Done => Status::Done.as_str(),
            ListFilter::NotDone => "not-done",
        }
    }
}

fn init_logging(level: &str) {
    let parsed = level.parse::<LevelFilter>().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_max_level(parsed.unwrap_or(LevelFilter::WARN))
        .init();
    if parsed.is_none() {
        tracing::warn!(level, "unknown log level, falling back to warn");
    }
}

fn list(service: &TaskService, filter: ListFilter) -> Result<(), TaskError> {
    let tasks = match filter {
        ListFilter::All => service.list(None)?,
        ListFilter::Todo => service.list(Some(Status::Todo))?,
        ListFilter::InProgress => service.list(Some(Status::InProgress))?,
        ListFilter::Done => service.list(Some(Status::Done))?,
        ListFilter::NotDone => service.list_where(|task| task.status() != Status::Done)?,
    };

    if tasks.is_empty() {
        match filter {
            ListFilter::All => println!("No tasks found."),
            _ => println!("No tasks found for status: {}.", filter.label()),
        }
    } else {
        println!("{}", table::render(&tasks));
    }
    Ok(())
}

fn run(service: &TaskService, command: Commands) -> Result<(), TaskError> {
    match command {
        Commands::Add { description } => {
            let id = service.add(description)?;
            println!("Task added successfully (ID: {})", id);
        }
        Commands::Update { id, description } => {
            service.update_description(id, description)?;
            println!("Task {} updated.", id);
        }
        Commands::Delete { id } => {
            service.delete(id)?;
            println!("Task {} deleted.", id);
        }
        Commands::MarkInProgress { id } => {
            service.mark_in_progress(id)?;
            println!("Task {} marked as in-progress.", id);
        }
        Commands::MarkDone { id } => {
            service.mark_done(id)?;
            println!("Task {} marked as done.", id);
        }
        Commands::List { filter } => list(service, filter)?,
    };
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(file) = args.file {
        config.file = file;
    }
    init_logging(&config.log_level);

    let service = TaskService::new(TaskStore::new(&config.file))
        .with_policy(config.corrupt_data_policy());

    match run(&service, args.command) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            eprintln!("Error: {:#}", anyhow::Error::from(err));
            Ok(ExitCode::FAILURE)
        }
    }
}
