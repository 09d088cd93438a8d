//! Fellowship Node - the main application entry point.
//!
//! Architecture:
//! - Single daemon process with one shared RocksDB store
//! - HTTP API for clients (profiles, groups, announcements, events, meetings)
//! - Unix admin socket for local maintenance (fellowship-admin CLI)

use crate::admin_socket::AdminSocket;
use crate::api;
use crate::error::Error;
use crate::services::{
    AnnouncementService, EventService, GroupService, MeetingService, UserService,
};
use fellowship_store::DocumentStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a Fellowship node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Data directory for storage
    pub data_dir: PathBuf,

    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// Admin socket path (for fellowship-admin CLI)
    pub admin_socket: PathBuf,
}

impl NodeConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let data_dir = PathBuf::from(
            lookup("FELLOWSHIP_DATA_DIR").unwrap_or_else(|| "./fellowship-data".to_string()),
        );

        let api_addr = lookup("FELLOWSHIP_API_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let api_addr = api_addr
            .parse()
            .map_err(|e| Error::Config(format!("invalid FELLOWSHIP_API_ADDR {:?}: {}", api_addr, e)))?;

        let admin_socket = lookup("FELLOWSHIP_ADMIN_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("admin.sock"));

        Ok(Self {
            data_dir,
            api_addr,
            admin_socket,
        })
    }
}

/// Shared state for handlers and the admin socket. Every service holds the
/// same store.
#[derive(Clone)]
pub struct AppState {
    pub groups: GroupService,
    pub announcements: AnnouncementService,
    pub events: EventService,
    pub meetings: MeetingService,
    pub users: UserService,
    store: Arc<DocumentStore>,
}

impl AppState {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        let groups = GroupService::new(Arc::clone(&store));
        Self {
            announcements: AnnouncementService::new(Arc::clone(&store), groups.clone()),
            events: EventService::new(Arc::clone(&store), groups.clone()),
            meetings: MeetingService::new(Arc::clone(&store), groups.clone()),
            users: UserService::new(Arc::clone(&store)),
            groups,
            store,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }
}

/// A Fellowship node instance.
pub struct FellowshipNode {
    state: Arc<AppState>,
    config: NodeConfig,
}

impl FellowshipNode {
    /// Open the store under the data directory and wire up the services.
    pub fn new(config: NodeConfig) -> Result<Self, Error> {
        std::fs::create_dir_all(&config.data_dir)?;

        let store = Arc::new(DocumentStore::open(config.data_dir.join("store"))?);
        let state = Arc::new(AppState::new(store));

        Ok(Self { state, config })
    }

    /// Get the shared state (for API handlers).
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the node (starts the admin socket and the HTTP server).
    pub async fn run(self) -> Result<(), Error> {
        tracing::info!("Fellowship node starting");
        tracing::info!("  API: http://{}", self.config.api_addr);
        tracing::info!("  Admin: {:?}", self.config.admin_socket);
        tracing::info!("  Data: {:?}", self.config.data_dir);

        let admin_socket = AdminSocket::new(self.state(), self.config.admin_socket.clone());
        tokio::spawn(async move {
            if let Err(e) = admin_socket.run().await {
                tracing::error!("Admin socket error: {}", e);
            }
        });

        let app = api::build_router(self.state());

        let listener = tokio::net::TcpListener::bind(self.config.api_addr).await?;
        tracing::info!("HTTP server listening on {}", self.config.api_addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
