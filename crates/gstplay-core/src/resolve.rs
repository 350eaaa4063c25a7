//! Source resolution
//!
//! Turns what the user typed into a [`Locator`] the framework can open and a
//! title for the window. Anything containing `://` is already a URI and is
//! used verbatim; everything else is a local path.

use crate::{Error, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

/// Scratch block used when pulling a file into the page cache
pub const PRELOAD_BLOCK_SIZE: usize = 32 * 4096;

const SCHEME_SEPARATOR: &str = "://";

/// Canonical source address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Local file with its absolute path and `file://` URI
    File { path: PathBuf, uri: String },
    /// Any other URI, verbatim
    Remote(String),
}

impl Locator {
    /// The URI form handed to the framework
    pub fn as_str(&self) -> &str {
        match self {
            Locator::File { uri, .. } => uri,
            Locator::Remote(uri) => uri,
        }
    }

    /// Absolute path for local files
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Locator::File { path, .. } => Some(path),
            Locator::Remote(_) => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Locator::File { .. })
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locator plus display title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub locator: Locator,
    /// What the user typed; only used for titling and diagnostics
    pub title: String,
}

/// Build the locator for `input` relative to `cwd` without touching the
/// file system
pub fn locate(input: &str, cwd: &Path) -> Result<ResolvedSource> {
    if input.contains(SCHEME_SEPARATOR) {
        return Ok(ResolvedSource {
            locator: Locator::Remote(input.to_string()),
            title: input.to_string(),
        });
    }

    let given = Path::new(input);
    let path = if given.is_absolute() {
        given.to_path_buf()
    } else {
        cwd.join(given)
    };

    let uri = Url::from_file_path(&path)
        .map_err(|_| Error::InvalidLocator(path.display().to_string()))?;

    Ok(ResolvedSource {
        locator: Locator::File {
            path,
            uri: uri.to_string(),
        },
        title: input.to_string(),
    })
}

/// Verify that `path` can be opened and, if `preload` is set, read it end to
/// end so the OS keeps it cached. Returns the number of bytes read.
pub fn check_and_preload(path: &Path, preload: bool) -> Result<u64> {
    let mut file = File::open(path).map_err(|source| Error::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    if !preload {
        return Ok(0);
    }

    info!(path = %path.display(), "Preloading file");

    let mut scratch = vec![0u8; PRELOAD_BLOCK_SIZE];
    let mut total = 0u64;
    loop {
        match file.read(&mut scratch) {
            Ok(0) => break,
            Ok(n) => total += n as u64,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                // The cache warm-up is best effort once the file is open
                warn!(error = %e, bytes = total, "Preload stopped early");
                break;
            }
        }
    }

    debug!(bytes = total, "Preload finished");
    Ok(total)
}

/// Resolves user input into a [`ResolvedSource`]
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    preload: bool,
    cwd: Option<PathBuf>,
}

impl Resolver {
    pub fn new(preload: bool) -> Self {
        Self { preload, cwd: None }
    }

    /// Resolve relative paths against `cwd` instead of the process directory
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Resolve `input`.
    ///
    /// Local files must be readable: failing to open one is an input error
    /// and the caller is expected to end the process.
    pub fn resolve(&self, input: &str) -> Result<ResolvedSource> {
        let cwd = match &self.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir()?,
        };

        let resolved = locate(input, &cwd)?;
        if let Some(path) = resolved.locator.local_path() {
            check_and_preload(path, self.preload)?;
        }

        debug!(locator = %resolved.locator, title = %resolved.title, "Resolved source");
        Ok(resolved)
    }
}
