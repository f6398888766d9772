use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

use bryony_manager::{WorkflowManager, WorkflowStats};
use bryony_store::SqliteStore;
use bryony_workflow::{Workflow, WorkflowTask, validate};

/// Bryony - compose and validate scraping task workflows
#[derive(Parser)]
#[command(name = "bryony")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.bryony)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate a workflow definition file
  Validate {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// Print the trigger tree of a workflow definition file
  Tree {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// Print graph statistics of a workflow definition file
  Stats {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// Validate a workflow definition file and store it
  Import {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// List stored workflows
  List,

  /// Search stored workflows by name or description
  Search { query: String },

  /// Delete a stored workflow by id
  Delete { id: String },
}

/// On-disk workflow definition: what the operator writes by hand or the
/// visual editor exports. Identity and timestamps are minted on load.
#[derive(Deserialize)]
struct WorkflowFile {
  name: String,
  #[serde(default)]
  description: Option<String>,
  tasks: Vec<WorkflowTask>,
}

fn main() -> Result<()> {
  init_logging();

  let cli = Cli::parse();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .expect("could not determine home directory")
      .join(".bryony")
  });

  match cli.command {
    Some(Commands::Validate { workflow_file }) => run_validate(&workflow_file),
    Some(Commands::Tree { workflow_file }) => run_tree(&workflow_file),
    Some(Commands::Stats { workflow_file }) => run_stats(&workflow_file),
    Some(Commands::Import { workflow_file }) => block_on(run_import(workflow_file, data_dir)),
    Some(Commands::List) => block_on(run_list(data_dir)),
    Some(Commands::Search { query }) => block_on(run_search(query, data_dir)),
    Some(Commands::Delete { id }) => block_on(run_delete(id, data_dir)),
    None => {
      println!("bryony - use --help to see available commands");
      Ok(())
    }
  }
}

fn init_logging() {
  let level = std::env::var("BRYONY_LOG")
    .ok()
    .and_then(|s| s.parse::<tracing::Level>().ok())
    .unwrap_or(tracing::Level::INFO);

  tracing_subscriber::fmt()
    .with_max_level(level)
    .with_target(true)
    .init();
}

fn block_on<F: Future<Output = Result<()>>>(future: F) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(future)
}

fn load_workflow(path: &Path) -> Result<Workflow> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read workflow file: {}", path.display()))?;

  let file: WorkflowFile = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", path.display()))?;

  let mut workflow = Workflow::new(file.name, file.description);
  workflow.tasks = file.tasks;
  Ok(workflow)
}

fn run_validate(path: &Path) -> Result<()> {
  let workflow = load_workflow(path)?;
  let report = validate(&workflow);

  for warning in &report.warnings {
    println!("warning: {warning}");
  }
  if !report.valid {
    for error in &report.errors {
      eprintln!("error: {error}");
    }
    anyhow::bail!("workflow '{}' is invalid", workflow.name);
  }

  println!("{}: valid ({} tasks)", workflow.name, workflow.tasks.len());
  Ok(())
}

fn run_tree(path: &Path) -> Result<()> {
  let workflow = load_workflow(path)?;
  let tree = workflow.graph().render_tree();
  if tree.is_empty() {
    anyhow::bail!("workflow '{}' has no entry point", workflow.name);
  }
  print!("{tree}");
  Ok(())
}

fn run_stats(path: &Path) -> Result<()> {
  let workflow = load_workflow(path)?;
  let stats = WorkflowStats::of(&workflow);
  println!("{}", serde_json::to_string_pretty(&stats)?);
  Ok(())
}

async fn open_manager(data_dir: &Path) -> Result<WorkflowManager<SqliteStore>> {
  tokio::fs::create_dir_all(data_dir)
    .await
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

  let options = SqliteConnectOptions::new()
    .filename(data_dir.join("bryony.db"))
    .create_if_missing(true);
  let pool = SqlitePool::connect_with(options)
    .await
    .context("failed to open workflow database")?;

  let store = SqliteStore::new(pool);
  store
    .migrate()
    .await
    .context("failed to run database migrations")?;

  Ok(WorkflowManager::new(store))
}

async fn run_import(path: PathBuf, data_dir: PathBuf) -> Result<()> {
  let mut workflow = load_workflow(&path)?;
  let manager = open_manager(&data_dir).await?;

  let report = manager.save_workflow(&mut workflow).await?;
  for warning in &report.warnings {
    println!("warning: {warning}");
  }
  if !report.valid {
    for error in &report.errors {
      eprintln!("error: {error}");
    }
    anyhow::bail!("workflow '{}' is invalid; nothing was stored", workflow.name);
  }

  println!("stored workflow '{}' as {}", workflow.name, workflow.id);
  Ok(())
}

async fn run_list(data_dir: PathBuf) -> Result<()> {
  let manager = open_manager(&data_dir).await?;
  let workflows = manager.list_workflows().await?;
  if workflows.is_empty() {
    println!("no stored workflows");
    return Ok(());
  }
  for workflow in workflows {
    print_summary(&workflow);
  }
  Ok(())
}

async fn run_search(query: String, data_dir: PathBuf) -> Result<()> {
  let manager = open_manager(&data_dir).await?;
  let workflows = manager.search_workflows(&query).await?;
  if workflows.is_empty() {
    println!("no workflows matching '{query}'");
    return Ok(());
  }
  for workflow in workflows {
    print_summary(&workflow);
  }
  Ok(())
}

async fn run_delete(id: String, data_dir: PathBuf) -> Result<()> {
  let manager = open_manager(&data_dir).await?;
  if manager.delete_workflow(&id).await? {
    println!("deleted workflow {id}");
    Ok(())
  } else {
    anyhow::bail!("no workflow with id {id}");
  }
}

fn print_summary(workflow: &Workflow) {
  println!(
    "{}  {}  {} tasks  updated {}",
    workflow.id,
    workflow.name,
    workflow.tasks.len(),
    workflow.updated_at.format("%Y-%m-%d %H:%M")
  );
}
