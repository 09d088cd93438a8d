//! Fellowship document store.
//!
//! A small hierarchical document database on top of RocksDB. Documents are
//! JSON objects addressed by slash-separated paths with alternating
//! collection and document segments, e.g. `groups/{gid}/members/{uid}`.
//!
//! # Primitives
//!
//! - **Documents**: get, set, partial update (field merge), delete
//! - **Collections**: list direct children, filtered and ordered [`Query`]
//!   with a `limit` and a `start_after` document cursor
//! - **Transactions**: read-then-write closures applied all-or-nothing
//! - **Batches**: a list of writes committed atomically
//!
//! Every write, including a whole transaction, runs under a single commit
//! lock and lands as one RocksDB write batch, so readers never observe a
//! partially applied transaction.

mod error;
mod path;
mod query;
mod store;
mod transaction;

pub use error::{Error, Result};
pub use path::{validate_collection_path, validate_document_path};
pub use query::{Direction, Filter, Op, Query};
pub use store::DocumentStore;
pub use transaction::{Batch, Transaction};

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated document ids.
pub const ID_LENGTH: usize = 20;

/// Generate a random alphanumeric document id.
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}
