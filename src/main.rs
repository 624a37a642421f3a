use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use trackboard::board::render::{render_board, render_dashboard};
use trackboard::board::{Board, Locator, MoveOutcome};
use trackboard::client::TrackerClient;
use trackboard::config::{CliConfig, ServerConfig, DEFAULT_PORT};
use trackboard::models::*;
use trackboard::{api, db};

#[derive(Parser)]
#[command(name = "trackboard")]
#[command(about = "Kanban project tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server (default)
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Show or change the client configuration
    Config {
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        author: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    #[command(flatten)]
    Client(ClientCommands),
}

/// Commands that talk to a running server.
#[derive(Subcommand)]
enum ClientCommands {
    /// List projects with task counts
    Projects,
    /// Show a project's board
    Board {
        /// Project id or name
        project: String,
    },
    /// Move a task, e.g. `--from backlog:0 --to "in progress":2`
    Move {
        /// Project id or name
        project: String,
        /// Source as <column>:<index>
        #[arg(long)]
        from: Slot,
        /// Destination as <column>:<index>
        #[arg(long)]
        to: Slot,
    },
    /// Add a task at the end of a column
    AddTask {
        /// Project id or name
        project: String,
        /// Column id or name
        column: String,
        title: String,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
    },
    /// Comment on a task
    Comment { task: Uuid, content: String },
    /// Attach a checklist with items to a task
    Check {
        task: Uuid,
        title: String,
        #[arg(required = true)]
        items: Vec<String>,
    },
}

/// A position on the board before the column is resolved: `<column>:<index>`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    column: String,
    index: usize,
}

impl FromStr for Slot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, index) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected <column>:<index>, got '{}'", s))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(format!("missing column in '{}'", s));
        }
        let index = index
            .trim()
            .parse()
            .map_err(|_| format!("invalid index in '{}'", s))?;
        Ok(Self {
            column: column.to_string(),
            index,
        })
    }
}

impl Slot {
    fn resolve(&self, project: &Project) -> anyhow::Result<Locator> {
        let column = find_column(project, &self.column)?;
        Ok(Locator::new(column, self.index))
    }
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::from_str(&s.to_ascii_lowercase())
        .ok_or_else(|| format!("unknown priority '{}' (low, medium, high)", s))
}

/// Resolve a column by id, then by case-insensitive name.
fn find_column(project: &Project, key: &str) -> anyhow::Result<Uuid> {
    let found = match Uuid::parse_str(key) {
        Ok(id) => project.column(id),
        Err(_) => project.column_named(key),
    };
    found
        .map(|c| c.id)
        .ok_or_else(|| anyhow!("No column '{}' in project '{}'", key, project.name))
}

/// Resolve a project by id, then by case-insensitive name.
async fn find_project(client: &TrackerClient, key: &str) -> anyhow::Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(key) {
        return Ok(id);
    }
    let projects = client.list_projects().await?;
    projects
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(key))
        .map(|p| p.id)
        .ok_or_else(|| anyhow!("No project named '{}'", key))
}

/// Initialize tracing to stdout for the server, stderr for client commands
fn init_tracing(use_stderr: bool) {
    let default_filter = if use_stderr {
        "trackboard=warn"
    } else {
        "trackboard=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );

    if use_stderr {
        // Client mode: stdout carries only the rendered output
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve { port: DEFAULT_PORT });

    let serving = matches!(command, Commands::Serve { .. });
    init_tracing(!serving);

    match command {
        Commands::Serve { port } => serve(port).await,
        Commands::Config {
            api_url,
            author,
            timeout,
        } => configure(api_url, author, timeout),
        Commands::Client(command) => {
            let config = CliConfig::load();
            let client = TrackerClient::from_config(&config)?;
            run(client, &config, command).await
        }
    }
}

async fn serve(port: u16) -> anyhow::Result<()> {
    let config = ServerConfig::from_env();
    tracing::info!("Starting trackboard server on port {}", port);

    let db = match &config.db_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;

    let app = api::create_router_with_config(db, &config);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Trackboard server listening on http://127.0.0.1:{}/api", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn configure(
    api_url: Option<String>,
    author: Option<String>,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    let mut config = CliConfig::load();
    let changed = api_url.is_some() || author.is_some() || timeout.is_some();

    if let Some(url) = api_url {
        config.api_url = url;
    }
    if let Some(author) = author {
        config.author_name = author;
    }
    if let Some(secs) = timeout {
        config.request_timeout_secs = secs;
    }
    if changed {
        config.save()?;
    }

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

async fn run(client: TrackerClient, config: &CliConfig, command: ClientCommands) -> anyhow::Result<()> {
    match command {
        ClientCommands::Projects => {
            let projects = client.list_projects().await?;
            print!("{}", render_dashboard(&projects));
        }
        ClientCommands::Board { project } => {
            let id = find_project(&client, &project).await?;
            let project = client.get_project(id).await?;
            print!("{}", render_board(&project));
        }
        ClientCommands::Move { project, from, to } => {
            let id = find_project(&client, &project).await?;
            let board = Board::new(client, id);
            if !board.load().await {
                bail!("Project {} is unavailable", id);
            }
            let current = board
                .project()
                .ok_or_else(|| anyhow!("Project {} is unavailable", id))?;
            let source = from.resolve(&current)?;
            let destination = to.resolve(&current)?;

            match board.move_task(source, destination).await {
                MoveOutcome::Skipped => eprintln!("Nothing to move."),
                MoveOutcome::Persisted | MoveOutcome::Superseded => {}
                MoveOutcome::Resynced => eprintln!("Move was not saved; showing the server's board."),
                MoveOutcome::Unavailable => bail!("Move was not saved and the board could not be reloaded"),
            }
            if let Some(project) = board.project() {
                print!("{}", render_board(&project));
            }
        }
        ClientCommands::AddTask {
            project,
            column,
            title,
            priority,
        } => {
            let id = find_project(&client, &project).await?;
            let board = Board::new(client, id);
            if !board.load().await {
                bail!("Project {} is unavailable", id);
            }
            let current = board
                .project()
                .ok_or_else(|| anyhow!("Project {} is unavailable", id))?;
            let column_id = find_column(&current, &column)?;

            let input = CreateTaskInput {
                title,
                column_id,
                priority,
                ..Default::default()
            };
            match board.create_task(input).await? {
                Some(task) => println!("Created task {}", task.id),
                None => bail!("Task title is required"),
            }
            if let Some(project) = board.project() {
                print!("{}", render_board(&project));
            }
        }
        ClientCommands::Comment { task, content } => {
            let comment = client
                .create_comment(&CreateCommentInput {
                    content,
                    task_id: task,
                    author_name: Some(config.author_name.clone()),
                })
                .await?;
            println!("Added comment {} by {}", comment.id, comment.author_name);
        }
        ClientCommands::Check { task, title, items } => {
            let checklist = client
                .create_checklist(&CreateChecklistInput {
                    title,
                    task_id: task,
                })
                .await
                .context("Failed to create checklist")?;
            for content in items {
                client
                    .create_checklist_item(&CreateChecklistItemInput {
                        content,
                        checklist_id: checklist.id,
                        completed: false,
                    })
                    .await?;
            }
            let task = client.get_task(task).await?;
            let (done, total) = task.checklist_progress();
            println!(
                "Added checklist '{}' to '{}' ({}/{} done)",
                checklist.title, task.title, done, total
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;

    fn project() -> Project {
        let id = Uuid::new_v4();
        Project {
            id,
            name: "Launch".to_string(),
            description: None,
            kind: ProjectType::General,
            archived: false,
            created_at: Utc::now(),
            updated_at: None,
            columns: DEFAULT_COLUMNS
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    Arc::new(Column {
                        id: Uuid::new_v4(),
                        project_id: id,
                        name: name.to_string(),
                        position: i as i32,
                        created_at: Utc::now(),
                        tasks: Vec::new(),
                    })
                })
                .collect(),
        }
    }

    #[test]
    fn test_slot_parses_name_and_index() {
        let slot: Slot = "In Progress:2".parse().unwrap();
        assert_eq!(
            slot,
            Slot {
                column: "In Progress".to_string(),
                index: 2
            }
        );
    }

    #[test]
    fn test_slot_rejects_bad_input() {
        assert!("backlog".parse::<Slot>().is_err());
        assert!(":1".parse::<Slot>().is_err());
        assert!("backlog:-1".parse::<Slot>().is_err());
        assert!("backlog:x".parse::<Slot>().is_err());
    }

    #[test]
    fn test_slot_resolves_by_name_or_id() {
        let project = project();
        let review = project.columns[3].id;

        let by_name: Slot = "review:0".parse().unwrap();
        assert_eq!(by_name.resolve(&project).unwrap(), Locator::new(review, 0));

        let by_id: Slot = format!("{}:4", review).parse().unwrap();
        assert_eq!(by_id.resolve(&project).unwrap(), Locator::new(review, 4));

        let missing: Slot = "Archive:0".parse().unwrap();
        assert!(missing.resolve(&project).is_err());
    }

    #[test]
    fn test_priority_is_case_insensitive() {
        assert_eq!(parse_priority("HIGH"), Ok(Priority::High));
        assert!(parse_priority("urgent").is_err());
    }

    #[test]
    fn test_cli_parses_move() {
        let cli = Cli::try_parse_from([
            "trackboard",
            "move",
            "Launch",
            "--from",
            "backlog:0",
            "--to",
            "done:3",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Client(ClientCommands::Move { .. }))
        ));
    }

    #[test]
    fn test_cli_keeps_local_commands_apart() {
        let cli = Cli::try_parse_from(["trackboard", "serve", "--port", "4000"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: 4000 })));

        let cli = Cli::try_parse_from(["trackboard", "config", "--timeout", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                timeout: Some(5),
                ..
            })
        ));

        let cli = Cli::try_parse_from(["trackboard", "projects"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Client(ClientCommands::Projects))
        ));
    }
}
