//! fellowship-admin CLI tool
//!
//! Local maintenance for a running Fellowship node.
//!
//! Usage:
//!   fellowship-admin cleanup-expired <group_id>
//!   fellowship-admin enforce-pins <group_id>
//!   fellowship-admin list-groups
//!   fellowship-admin ping

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Admin command sent over the socket.
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum AdminCommand {
    CleanupExpired { group_id: String },
    EnforcePins { group_id: String },
    ListGroups,
    Ping,
}

/// Response from admin command.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum AdminResponse {
    Ok { message: String },
    Error { error: String },
    List { items: Vec<String> },
    Pong,
}

fn print_usage() {
    eprintln!("fellowship-admin - Maintain a Fellowship node");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  fellowship-admin cleanup-expired <group_id>  Delete expired announcements");
    eprintln!("  fellowship-admin enforce-pins <group_id>     Unpin announcements over the limit");
    eprintln!("  fellowship-admin list-groups                 List all groups");
    eprintln!("  fellowship-admin ping                        Check if daemon is running");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FELLOWSHIP_SOCKET  Path to admin socket (default: ./fellowship-data/admin.sock)");
}

fn get_socket_path() -> PathBuf {
    std::env::var("FELLOWSHIP_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./fellowship-data/admin.sock"))
}

fn send_command(cmd: AdminCommand) -> Result<AdminResponse, String> {
    let socket_path = get_socket_path();

    let mut stream = UnixStream::connect(&socket_path).map_err(|e| {
        format!(
            "Failed to connect to fellowship-node at {:?}: {}\n\
             Is the fellowship-node running?",
            socket_path, e
        )
    })?;

    let cmd_json = serde_json::to_string(&cmd).map_err(|e| e.to_string())?;
    writeln!(stream, "{}", cmd_json).map_err(|e| e.to_string())?;

    let mut reader = BufReader::new(&stream);
    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .map_err(|e| e.to_string())?;

    serde_json::from_str(&response_line).map_err(|e| format!("Invalid response: {}", e))
}

fn group_arg(args: &[String], cmd: &str) -> String {
    match args.get(2) {
        Some(group_id) => group_id.clone(),
        None => {
            eprintln!("Error: {} requires a group_id argument", cmd);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let cmd = match args[1].as_str() {
        "cleanup-expired" => AdminCommand::CleanupExpired {
            group_id: group_arg(&args, "cleanup-expired"),
        },
        "enforce-pins" => AdminCommand::EnforcePins {
            group_id: group_arg(&args, "enforce-pins"),
        },
        "list-groups" => AdminCommand::ListGroups,
        "ping" => AdminCommand::Ping,
        "-h" | "--help" | "help" => {
            print_usage();
            std::process::exit(0);
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    };

    match send_command(cmd) {
        Ok(response) => match response {
            AdminResponse::Ok { message } => {
                println!("{}", message);
            }
            AdminResponse::Error { error } => {
                eprintln!("Error: {}", error);
                std::process::exit(1);
            }
            AdminResponse::List { items } => {
                if items.is_empty() {
                    println!("(none)");
                } else {
                    for item in items {
                        println!("{}", item);
                    }
                }
            }
            AdminResponse::Pong => {
                println!("pong - fellowship-node is running");
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
