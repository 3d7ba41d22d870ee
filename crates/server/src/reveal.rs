// crates/server/src/reveal.rs
//! "Show in folder" integration.

use std::io;
use std::path::Path;

/// Opens a directory in the platform file manager.
pub trait FolderRevealer: Send + Sync {
    fn reveal(&self, dir: &Path) -> io::Result<()>;
}

/// Uses the OS default handler (`open`, `xdg-open`, `explorer`) without
/// waiting for it to exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRevealer;

impl FolderRevealer for OsRevealer {
    fn reveal(&self, dir: &Path) -> io::Result<()> {
        tracing::debug!(dir = %dir.display(), "revealing folder");
        open::that_detached(dir)
    }
}
