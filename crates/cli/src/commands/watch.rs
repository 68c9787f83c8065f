//! Live dashboard.
//!
//! # Usage
//!
//! ```bash
//! wb-dash watch --interval 15
//! ```
//!
//! Loads page 1, starts the auto-refresh timer and then reads commands from
//! stdin until `q`, end of input or Ctrl-C. See [`super::input`] for the
//! command syntax.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use wb_dashboard::{DashboardConfig, ProductsClient, RefreshController, Renderer, TerminalRenderer};

use super::input::{Action, HELP, parse_action};
use super::{CliError, say};

/// Run the interactive dashboard until the user quits.
pub async fn run(config: &DashboardConfig) -> Result<(), CliError> {
    let client = ProductsClient::new(&config.api)?;
    tracing::info!(api_url = %client.base_url(), "Starting dashboard");

    let renderer: Arc<dyn Renderer> = Arc::new(TerminalRenderer::stdout());
    let controller = RefreshController::new(client, renderer);

    controller.initialize().await;
    let timer = controller.start_auto_refresh(config.refresh_interval);
    say("Type 'h' for help, 'q' to quit.")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let result = loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(CliError::Io(e)),
                };
                match parse_action(&line) {
                    Ok(None) => {}
                    Ok(Some(Action::Quit)) => break Ok(()),
                    Ok(Some(action)) => {
                        if let Err(e) = dispatch(&controller, action).await {
                            break Err(e);
                        }
                    }
                    Err(e) => say(e)?,
                }
            }
            _ = tokio::signal::ctrl_c() => break Ok(()),
        }
    };

    timer.stop().await;
    tracing::info!("Dashboard stopped");
    result
}

async fn dispatch(controller: &RefreshController, action: Action) -> Result<(), CliError> {
    match action {
        Action::Next => {
            if controller.next_page().await.is_none() {
                say("Already on the last page")?;
            }
        }
        Action::Prev => {
            if controller.prev_page().await.is_none() {
                say("Already on the first page")?;
            }
        }
        Action::GoTo(page) => {
            if let Err(e) = controller.go_to_page(page).await {
                say(e)?;
            }
        }
        Action::Sort(field) => {
            controller.toggle_sort(field).await;
        }
        Action::Filter(filters) => {
            controller.apply_filters(filters).await;
        }
        Action::Refresh => {
            controller.refresh().await;
        }
        Action::Help => say(HELP)?,
        Action::Quit => {}
    }
    Ok(())
}
