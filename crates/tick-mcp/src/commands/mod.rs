//! Command-line subcommands other than the MCP server.

use anyhow::{Context, Result};
use tick_mcp_app::{AppConfig, TaskQuery, TaskService};
use tick_mcp_client::{TaskStore, parse_callback};
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

/// Print every project as JSON.
pub async fn list_projects<S: TaskStore>(service: &TaskService<S>) -> Result<()> {
    let projects = service.get_all_projects().await?;
    println!("{}", serde_json::to_string_pretty(&projects)?);
    Ok(())
}

/// Print one project record as JSON.
pub async fn show_project<S: TaskStore>(service: &TaskService<S>, project_id: &str) -> Result<()> {
    let project = service.get_project(project_id).await?;
    println!("{}", serde_json::to_string_pretty(&project)?);
    Ok(())
}

/// Print one task as JSON.
pub async fn show_task<S: TaskStore>(
    service: &TaskService<S>,
    project_id: &str,
    task_id: &str,
) -> Result<()> {
    let task = service.get_task(project_id, task_id).await?;
    println!("{}", serde_json::to_string_pretty(&task)?);
    Ok(())
}

/// Run a task query and print `{count, tasks}`.
pub async fn query<S: TaskStore>(service: &TaskService<S>, query: TaskQuery) -> Result<()> {
    let result = service.query_tasks(query).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    if result.count == 0 {
        eprintln!("No tasks matched the provided filters");
    }
    Ok(())
}

/// Authorization-code flow: print the consent URL, read the redirect back, store tokens.
pub async fn authorize(config: &AppConfig) -> Result<()> {
    let client = config.client()?;
    let credentials = client.credentials();
    let state = Uuid::new_v4().simple().to_string();
    let url = credentials.authorize_url(&state)?;

    println!("Open this URL in a browser and approve access:\n\n  {url}\n");
    println!("Then paste the URL you were redirected to (or just the code):");

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read the redirect URL")?;
    let code = parse_callback(&line, &state)?;
    let tokens = credentials.exchange_code(&code).await?;

    match config.token_path() {
        Some(path) => println!("Authorized. Tokens saved to {}", path.display()),
        None => println!("Authorized. No token path is configured, so tokens were not saved"),
    }
    if tokens.refresh_token.is_none() {
        println!("The provider did not issue a refresh token; run `tick-mcp auth` again when it expires");
    }
    Ok(())
}
