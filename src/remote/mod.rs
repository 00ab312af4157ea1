//! Remote PRISM repository: the connection seam, the folder cache and the
//! session that resolves targets to remote files.

pub mod cache;
pub mod http;
pub mod session;

use std::path::Path;

use crate::error::Result;

pub use cache::FolderCache;
pub use http::HttpRemote;
pub use session::{DownloadReport, Session};

/// A connection to the repository. Listing entries are full remote paths
/// (`{folder}{file name}`).
pub trait Remote {
    async fn connect(&mut self) -> Result<()>;

    async fn close(&mut self);

    async fn list(&mut self, folder: &str) -> Result<Vec<String>>;

    /// Writes the remote file to `dest`, returning the number of bytes.
    async fn fetch(&mut self, path: &str, dest: &Path) -> Result<u64>;
}
