//! Remote file-transfer session
//!
//! Wraps the blocking `suppaftp` client behind the [`RemoteSource`] seam the
//! pipeline and sensor run against. One [`FtpSession`] is opened per ingestion
//! cycle and reused for every listing and fetch in that cycle; `quit` (or Drop)
//! closes it on all exit paths.
//!
//! Listing is non-recursive: only immediate children of the requested
//! directory are returned, with directories tagged so callers can filter them
//! out before fetching. There is no retry on transient failure.

use anyhow::{Context, Result};
use suppaftp::{list, FtpError, FtpStream, Status};
use tracing::{debug, warn};

use crate::config::IngestConfig;

/// One entry of a remote directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Full remote path
    pub path: String,
    /// True when the entry is a directory rather than a regular file
    pub is_directory: bool,
}

impl RemoteEntry {
    /// Basename of the entry (final path component)
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Result of fetching a single remote file
///
/// The failure causes are tagged rather than collapsed into one null result,
/// so callers and tests can tell "not found" from a transport problem. The
/// pipeline still degrades every non-content outcome to "skip this file".
#[derive(Debug)]
pub enum FetchOutcome {
    /// Full byte content of the file
    Content(Vec<u8>),
    /// The remote path does not exist
    NotFound,
    /// The remote path is a directory, not a file
    IsDirectory,
    /// Connection, authentication, or protocol error
    Transport(String),
}

impl FetchOutcome {
    /// Short label for logs and failure reports
    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Content(_) => "content",
            FetchOutcome::NotFound => "not found",
            FetchOutcome::IsDirectory => "is a directory",
            FetchOutcome::Transport(_) => "transport error",
        }
    }
}

/// A fetched file: path plus content when the fetch succeeded
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub path: String,
    pub content: Vec<u8>,
}

/// The listing/fetch capabilities the ingestion blocks need from a remote
/// endpoint
///
/// Any remote-filesystem-over-network backend works as a collaborator; the
/// production implementation is [`FtpSession`], tests use an in-memory double.
pub trait RemoteSource {
    /// List the immediate children of a directory
    fn list_dir(&mut self, path: &str) -> Result<Vec<RemoteEntry>>;

    /// Fetch the full content of one listed entry
    fn fetch(&mut self, entry: &RemoteEntry) -> FetchOutcome;
}

/// A logged-in FTP session, held open for the duration of one cycle
pub struct FtpSession {
    stream: FtpStream,
}

impl FtpSession {
    /// Connect and log in using the configured endpoint and credentials
    pub fn connect(config: &IngestConfig) -> Result<Self> {
        debug!("Connecting to remote server: {}", config.server_addr());

        let mut stream = FtpStream::connect(config.server_addr())
            .context("Failed to connect to remote server")?;

        // Extended Passive Mode works better behind NAT / in containers
        stream.set_mode(suppaftp::Mode::ExtendedPassive);

        debug!("Logging in as: {}", config.username);
        stream
            .login(&config.username, &config.password)
            .context("Remote login failed")?;

        Ok(Self { stream })
    }

    /// Close the session, ignoring errors on the way out
    pub fn quit(mut self) {
        let _ = self.stream.quit();
    }
}

impl RemoteSource for FtpSession {
    fn list_dir(&mut self, path: &str) -> Result<Vec<RemoteEntry>> {
        debug!("Listing directory: {}", path);

        let lines = self
            .stream
            .list(Some(path))
            .with_context(|| format!("Failed to list directory: {}", path))?;

        let dir = path.trim_end_matches('/');
        let mut entries = Vec::with_capacity(lines.len());

        for line in &lines {
            match list::File::try_from(line.as_str()) {
                Ok(file) => {
                    entries.push(RemoteEntry {
                        path: format!("{}/{}", dir, file.name()),
                        is_directory: file.is_directory(),
                    });
                },
                Err(e) => {
                    // Unparseable LIST line: fall back to the last
                    // whitespace-separated token and assume a regular file
                    warn!("Unrecognized listing line {:?}: {}", line, e);
                    if let Some(name) = line.split_whitespace().last() {
                        entries.push(RemoteEntry {
                            path: format!("{}/{}", dir, name),
                            is_directory: false,
                        });
                    }
                },
            }
        }

        debug!("Listed {} entries from {}", entries.len(), path);
        Ok(entries)
    }

    fn fetch(&mut self, entry: &RemoteEntry) -> FetchOutcome {
        if entry.is_directory {
            return FetchOutcome::IsDirectory;
        }

        debug!("Fetching contents of {}", entry.path);
        match self.stream.retr_as_buffer(&entry.path) {
            Ok(cursor) => {
                let data = cursor.into_inner();
                debug!("Fetched {} bytes from {}", data.len(), entry.path);
                FetchOutcome::Content(data)
            },
            Err(FtpError::UnexpectedResponse(resp)) if resp.status == Status::FileUnavailable => {
                FetchOutcome::NotFound
            },
            Err(e) => FetchOutcome::Transport(e.to_string()),
        }
    }
}
