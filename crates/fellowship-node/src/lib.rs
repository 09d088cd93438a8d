//! Fellowship - Recovery Group Backend
//!
//! A single-node service behind a recovery-support app: user profiles,
//! groups with an admin set that can never become empty, announcements
//! with a pin limit and expiry, and group events and meetings.
//!
//! # Architecture
//!
//! - **Models**: Documents and request payloads (Group, Member, Announcement, ...)
//! - **Services**: Membership and admin rules, pinning, expiry, attendance
//! - **Store**: `fellowship-store`, a RocksDB-backed document store
//! - **API**: HTTP endpoints under `/api/v1`
//! - **Admin Socket**: Unix socket for local maintenance (fellowship-admin CLI)
//!
//! # Example
//!
//! ```no_run
//! use fellowship_node::{FellowshipNode, NodeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NodeConfig::from_env()?;
//!     let node = FellowshipNode::new(config)?;
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod admin_socket;
pub mod api;
pub mod error;
pub mod models;
pub mod node;
pub mod paths;
pub mod services;

pub use error::{ApiError, Error, Result};
pub use node::{AppState, FellowshipNode, NodeConfig};
pub use services::{
    AnnouncementService, EventService, GroupService, MeetingService, UserService,
    MAX_PINNED_ANNOUNCEMENTS,
};
