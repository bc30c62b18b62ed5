// ABOUTME: Command-line entry point for workflow configuration version control
// Prints results as JSON on stdout; logs go to stderr

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use workflow_config::codec::decode_document_lenient;
use workflow_config::config::AppConfig;
use workflow_config::git::{Author, MergeStatus};
use workflow_config::models::{CreatePullRequest, ProgramWorkflows, Workflow};
use workflow_config::service::WorkflowService;

#[derive(Parser)]
#[command(name = "workflow-config")]
#[command(about = "Git-backed workflow configuration with change tracking and pull requests", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "WORKFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// User whose working copy the command operates on
    #[arg(short, long, default_value = "default")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the central repository and seed it
    Init {
        /// Workflow document to publish as the first commit
        #[arg(long)]
        sample: Option<PathBuf>,
    },

    /// Read and edit workflows in the working copy
    Workflows {
        #[command(subcommand)]
        command: WorkflowCommands,
    },

    /// Working copy status
    Status,

    /// Commit every pending change
    Commit {
        #[arg(short, long)]
        message: String,
        #[arg(long)]
        author_name: Option<String>,
        #[arg(long)]
        author_email: Option<String>,
    },

    /// Throw away uncommitted changes
    Discard,

    /// Fetch and merge the upstream branch
    Pull,

    /// Push the current branch to origin
    Push,

    /// Branch management
    Branch {
        #[command(subcommand)]
        command: BranchCommands,
    },

    /// Recent commits on the current branch
    Log {
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,
    },

    /// Pull requests between branches
    Pr {
        #[command(subcommand)]
        command: PrCommands,
    },
}

#[derive(Subcommand)]
enum WorkflowCommands {
    /// All workflows annotated with pending changes
    List,
    Show {
        key: String,
    },
    /// Add a workflow read from a JSON file
    Create {
        file: PathBuf,
    },
    /// Replace a workflow with one read from a JSON file
    Update {
        key: String,
        file: PathBuf,
    },
    Delete {
        key: String,
    },
    /// Summary of pending changes against the last commit
    Diff,
}

#[derive(Subcommand)]
enum BranchCommands {
    List,
    Create { name: String },
    /// Check out a local branch or `origin/<name>`
    Switch { name: String },
}

#[derive(Subcommand)]
enum PrCommands {
    List {
        #[arg(long)]
        status: Option<String>,
    },
    Show {
        number: u32,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
    },
    /// Workflow-level changes the pull request carries
    Compare {
        number: u32,
    },
    Merge {
        number: u32,
    },
    Close {
        number: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let service = WorkflowService::new(&config);

    run(&service, &cli.user, cli.command).await
}

async fn run(service: &WorkflowService, user: &str, command: Commands) -> Result<()> {
    match command {
        Commands::Init { sample } => {
            let document = match sample {
                Some(path) => read_document(&path)?,
                None => ProgramWorkflows::default(),
            };
            let seeded = service.initialize(document).await?;
            print_json(&serde_json::json!({ "seeded": seeded }))
        }
        Commands::Workflows { command } => run_workflows(service, user, command).await,
        Commands::Status => print_json(&service.status(user).await?),
        Commands::Commit {
            message,
            author_name,
            author_email,
        } => {
            let author = Author::new(
                author_name.unwrap_or_else(|| user.to_string()),
                author_email.unwrap_or_else(|| format!("{user}@workflow.com")),
            );
            let sha = service.commit(user, &message, author).await?;
            print_json(&serde_json::json!({ "sha": sha }))
        }
        Commands::Discard => {
            service.discard_changes(user).await?;
            print_json(&serde_json::json!({ "discarded": true }))
        }
        Commands::Pull => print_json(&merge_status_json(&service.pull(user).await?)),
        Commands::Push => {
            service.push(user).await?;
            print_json(&serde_json::json!({ "pushed": true }))
        }
        Commands::Branch { command } => match command {
            BranchCommands::List => print_json(&service.branches(user).await?),
            BranchCommands::Create { name } => {
                service.create_branch(user, &name).await?;
                print_json(&serde_json::json!({ "created": name }))
            }
            BranchCommands::Switch { name } => {
                let branch = service.switch_branch(user, &name).await?;
                print_json(&serde_json::json!({ "currentBranch": branch }))
            }
        },
        Commands::Log { count } => print_json(&service.commit_history(user, count).await?),
        Commands::Pr { command } => run_pull_requests(service, user, command).await,
    }
}

async fn run_workflows(service: &WorkflowService, user: &str, command: WorkflowCommands) -> Result<()> {
    match command {
        WorkflowCommands::List => print_json(&service.read_workflows(user).await?),
        WorkflowCommands::Show { key } => print_json(&service.get_workflow(user, &key).await?),
        WorkflowCommands::Create { file } => {
            let workflow = read_workflow(&file)?;
            print_json(&service.create_workflow(user, workflow).await?)
        }
        WorkflowCommands::Update { key, file } => {
            let workflow = read_workflow(&file)?;
            print_json(&service.update_workflow(user, &key, workflow).await?)
        }
        WorkflowCommands::Delete { key } => {
            service.delete_workflow(user, &key).await?;
            print_json(&serde_json::json!({ "deleted": key }))
        }
        WorkflowCommands::Diff => {
            let counts = service.change_summary(user).await?;
            print_json(&serde_json::json!({ "summary": counts.format(), "counts": counts }))
        }
    }
}

async fn run_pull_requests(service: &WorkflowService, user: &str, command: PrCommands) -> Result<()> {
    match command {
        PrCommands::List { status } => print_json(&service.list_pull_requests(status).await?),
        PrCommands::Show { number } => print_json(&service.get_pull_request(number).await?),
        PrCommands::Create {
            title,
            description,
            source,
            target,
        } => {
            let request = CreatePullRequest {
                title,
                description,
                source_branch: source,
                target_branch: target,
            };
            print_json(&service.create_pull_request(user, request).await?)
        }
        PrCommands::Compare { number } => {
            print_json(&service.pull_request_comparison(user, number).await?)
        }
        PrCommands::Merge { number } => print_json(&service.merge_pull_request(user, number).await?),
        PrCommands::Close { number } => print_json(&service.close_pull_request(number).await?),
    }
}

fn read_document(path: &Path) -> Result<ProgramWorkflows> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    decode_document_lenient(&bytes).with_context(|| format!("Invalid workflow document {}", path.display()))
}

fn read_workflow(path: &Path) -> Result<Workflow> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Invalid workflow {}", path.display()))
}

fn merge_status_json(status: &MergeStatus) -> serde_json::Value {
    match status {
        MergeStatus::UpToDate => serde_json::json!({ "result": "upToDate" }),
        MergeStatus::FastForward(commit) => {
            serde_json::json!({ "result": "fastForward", "commit": commit.to_string() })
        }
        MergeStatus::Merged(commit) => {
            serde_json::json!({ "result": "merged", "commit": commit.to_string() })
        }
        MergeStatus::Conflicts(paths) => serde_json::json!({ "result": "conflicts", "paths": paths }),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::prelude::*;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workflow_config=info".into()),
        )
        .init();
}
