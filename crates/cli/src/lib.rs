pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(
    name = "stackwise",
    about = "Stackwise estimation CLI",
    long_about = "Recommend a technical stack, estimate workload and budget, and manage saved estimates.",
    after_help = "Examples:\n  stackwise seed\n  stackwise estimate --input answers.json\n  stackwise project save --input answers.json\n  stackwise project save --input answers.json --id <id>\n  stackwise project report <id>"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the default TJM profile grid (idempotent)")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, question catalog and database readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Recommend a stack and compute quick and detailed estimates from answers")]
    Estimate {
        #[arg(long, help = "JSON estimate input (answers, overrides, discount)")]
        input: PathBuf,
    },
    #[command(about = "Compute a detailed budget for an explicit number of days")]
    Budget {
        #[arg(long, help = "JSON estimate input; only overrides and discount are read")]
        input: PathBuf,
        #[arg(long, help = "Total project days to distribute across profiles")]
        days: Decimal,
    },
    #[command(about = "Manage saved estimates")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
}

#[derive(Debug, Subcommand)]
enum ProjectCommand {
    #[command(about = "List saved projects, newest first")]
    List,
    #[command(about = "Show a saved project as JSON")]
    Show { id: String },
    #[command(about = "Save an estimate input as a new draft project, or update a saved one")]
    Save {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, help = "Apply the input over this saved project instead of creating one")]
        id: Option<String>,
    },
    #[command(about = "Move a project to draft, pending or validated")]
    Status {
        id: String,
        #[arg(long = "to")]
        status: String,
    },
    #[command(about = "Delete a saved project")]
    Delete { id: String },
    #[command(about = "Render the plain-text estimate report of a project")]
    Report { id: String },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Estimate { input } => commands::estimate::run(&input),
        Command::Budget { input, days } => commands::budget::run(&input, days),
        Command::Project { command } => match command {
            ProjectCommand::List => commands::project::list(),
            ProjectCommand::Show { id } => commands::project::show(&id),
            ProjectCommand::Save { input, id } => {
                commands::project::save(&input, id.as_deref())
            }
            ProjectCommand::Status { id, status } => commands::project::set_status(&id, &status),
            ProjectCommand::Delete { id } => commands::project::delete(&id),
            ProjectCommand::Report { id } => commands::project::report(&id),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
