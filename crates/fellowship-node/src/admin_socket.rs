//! Unix socket server for admin commands.
//!
//! Provides a local IPC interface for maintenance that no HTTP client
//! should trigger on its own: expiry sweeps and pin enforcement across any
//! group, plus a group listing.

use crate::error::Error;
use crate::node::AppState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

/// Admin command sent over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AdminCommand {
    /// Delete a group's expired announcements
    CleanupExpired { group_id: String },
    /// Unpin a group's announcements beyond the pin limit
    EnforcePins { group_id: String },
    /// List all groups
    ListGroups,
    /// Ping (health check)
    Ping,
}

/// Response from admin command.
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdminResponse {
    Ok { message: String },
    Error { error: String },
    List { items: Vec<String> },
    Pong,
}

/// Admin socket server.
pub struct AdminSocket {
    state: Arc<AppState>,
    socket_path: PathBuf,
}

impl AdminSocket {
    /// Create a new admin socket server.
    pub fn new(state: Arc<AppState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Run the admin socket server.
    pub async fn run(&self) -> Result<(), Error> {
        // Remove existing socket file if present
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        tracing::info!("Admin socket listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, state).await {
                            tracing::error!("Admin connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept admin connection: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, state: Arc<AppState>) -> Result<(), Error> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    while reader.read_line(&mut line).await? > 0 {
        let response = match serde_json::from_str::<AdminCommand>(&line) {
            Ok(cmd) => execute_command(cmd, &state),
            Err(e) => AdminResponse::Error {
                error: format!("Invalid command: {}", e),
            },
        };

        let response_json = serde_json::to_string(&response)? + "\n";
        writer.write_all(response_json.as_bytes()).await?;
        line.clear();
    }

    Ok(())
}

fn execute_command(cmd: AdminCommand, state: &AppState) -> AdminResponse {
    match cmd {
        AdminCommand::CleanupExpired { group_id } => {
            match state.announcements.cleanup_expired_announcements(&group_id) {
                Ok(count) => AdminResponse::Ok {
                    message: format!("Removed {} expired announcement(s) from {}", count, group_id),
                },
                Err(e) => AdminResponse::Error {
                    error: e.to_string(),
                },
            }
        }

        AdminCommand::EnforcePins { group_id } => {
            match state.announcements.manage_pinned_announcements(&group_id) {
                Ok(count) => AdminResponse::Ok {
                    message: format!("Unpinned {} announcement(s) in {}", count, group_id),
                },
                Err(e) => AdminResponse::Error {
                    error: e.to_string(),
                },
            }
        }

        AdminCommand::ListGroups => match state.groups.list_all_groups() {
            Ok(groups) => AdminResponse::List {
                items: groups
                    .into_iter()
                    .map(|g| format!("{}  {} ({} members)", g.id, g.name, g.member_count))
                    .collect(),
            },
            Err(e) => AdminResponse::Error {
                error: e.to_string(),
            },
        },

        AdminCommand::Ping => AdminResponse::Pong,
    }
}
