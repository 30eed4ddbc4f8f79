//! CLI entry point for tick-mcp.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use tick_mcp_app::{AppConfig, TaskQuery, TaskService};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;
mod mcp;

/// TickTick projects and tasks for MCP clients.
#[derive(Parser, Debug)]
#[command(
    name = "tick-mcp",
    version,
    about = "tick-mcp: TickTick tasks over MCP, with batch operations and filtered queries"
)]
struct Cli {
    /// Config file (defaults to <config dir>/tick-mcp/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start MCP server on stdio.
    Mcp,

    /// Authorize with the provider and store the tokens.
    Auth,

    /// Print all projects, or one project by id, as JSON.
    Projects {
        /// Project id or `inbox`.
        id: Option<String>,
    },

    /// Print one task as JSON, whether open or completed.
    Task {
        /// Project containing the task, or `inbox`.
        #[arg(long = "project")]
        project_id: String,
        task_id: String,
    },

    /// Filter open tasks and print the matches as JSON.
    Query {
        #[arg(long = "task")]
        task_id: Option<String>,
        /// Project id or `inbox`.
        #[arg(long = "project")]
        project_id: Option<String>,
        /// none, low, medium, high or 0/1/3/5.
        #[arg(long)]
        priority: Option<String>,
        /// today, tomorrow, overdue, next_7_days or custom.
        #[arg(long = "date")]
        date_filter: Option<String>,
        /// Window length for `--date custom`.
        #[arg(long = "days")]
        custom_days: Option<i64>,
        #[arg(long = "search")]
        search_term: Option<String>,
        /// IANA zone overriding the configured one.
        #[arg(long)]
        timezone: Option<String>,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let Cli { config, cmd } = Cli::parse();
    install_tracing();

    let config = AppConfig::load(config.as_deref())?;
    execute_command(&config, cmd)
}

fn execute_command(config: &AppConfig, command: Command) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    match command {
        Command::Auth => runtime.block_on(commands::authorize(config)),

        Command::Mcp => {
            let service = TaskService::new(config.client()?, config.service_settings()?);
            let server = mcp::TickTickServer::new(service);
            info!(region = %config.region, "serving MCP on stdio");
            runtime
                .block_on(async move {
                    let transport = (tokio::io::stdin(), tokio::io::stdout());
                    let server = server
                        .serve(transport)
                        .await
                        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
                    server.waiting().await.map_err(|e| anyhow::anyhow!("{e:?}"))
                })
                .map(|_| ())
        }

        Command::Projects { id } => {
            let service = TaskService::new(config.client()?, config.service_settings()?);
            match id {
                Some(id) => runtime.block_on(commands::show_project(&service, &id)),
                None => runtime.block_on(commands::list_projects(&service)),
            }
        }

        Command::Task {
            project_id,
            task_id,
        } => {
            let service = TaskService::new(config.client()?, config.service_settings()?);
            runtime.block_on(commands::show_task(&service, &project_id, &task_id))
        }

        Command::Query {
            task_id,
            project_id,
            priority,
            date_filter,
            custom_days,
            search_term,
            timezone,
        } => {
            let service = TaskService::new(config.client()?, config.service_settings()?);
            let query = TaskQuery {
                task_id,
                project_id,
                priority,
                date_filter,
                custom_days,
                search_term,
                timezone,
            };
            runtime.block_on(commands::query(&service, query))
        }
    }
}

fn install_tracing() {
    // RUST_LOG is honored; defaults to INFO. stdout carries the MCP transport.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_command() {
        let cli = Cli::parse_from([
            "tick-mcp",
            "query",
            "--project",
            "inbox",
            "--priority",
            "high",
            "--date",
            "custom",
            "--days",
            "3",
            "--search",
            "groceries",
        ]);

        match cli.cmd {
            Command::Query {
                task_id,
                project_id,
                priority,
                date_filter,
                custom_days,
                search_term,
                timezone,
            } => {
                assert_eq!(task_id, None);
                assert_eq!(project_id.as_deref(), Some("inbox"));
                assert_eq!(priority.as_deref(), Some("high"));
                assert_eq!(date_filter.as_deref(), Some("custom"));
                assert_eq!(custom_days, Some(3));
                assert_eq!(search_term.as_deref(), Some("groceries"));
                assert_eq!(timezone, None);
            }
            _ => panic!("expected query command"),
        }
    }

    #[test]
    fn parse_mcp_command_with_config() {
        let cli = Cli::parse_from(["tick-mcp", "--config", "/tmp/tick.toml", "mcp"]);
        assert!(matches!(cli.cmd, Command::Mcp));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/tick.toml")));
    }

    #[test]
    fn parse_auth_and_projects_commands() {
        let cli = Cli::parse_from(["tick-mcp", "auth"]);
        assert!(matches!(cli.cmd, Command::Auth));
        assert_eq!(cli.config, None);

        let cli = Cli::parse_from(["tick-mcp", "projects"]);
        assert!(matches!(cli.cmd, Command::Projects { id: None }));

        let cli = Cli::parse_from(["tick-mcp", "projects", "work"]);
        assert!(matches!(cli.cmd, Command::Projects { id: Some(ref id) } if id == "work"));
    }

    #[test]
    fn parse_task_command() {
        let cli = Cli::parse_from(["tick-mcp", "task", "--project", "inbox", "abc"]);
        match cli.cmd {
            Command::Task {
                project_id,
                task_id,
            } => {
                assert_eq!(project_id, "inbox");
                assert_eq!(task_id, "abc");
            }
            _ => panic!("expected task command"),
        }

        assert!(Cli::try_parse_from(["tick-mcp", "task", "abc"]).is_err());
    }

    #[test]
    fn query_days_must_be_numeric() {
        let result = Cli::try_parse_from(["tick-mcp", "query", "--date", "custom", "--days", "soon"]);
        assert!(result.is_err());
    }
}
