use std::path::PathBuf;

/// Errors that can occur on the FIFO datalink.
///
/// Back-pressure is not an error: a full pipe is reported as `Ok(0)` by
/// [`ByteSink::send`](crate::ByteSink::send) and an empty pipe as an empty
/// buffer by [`ByteSource::receive`](crate::ByteSource::receive).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No listener opened the FIFO for reading within the attempt budget.
    #[error("no receiver on {path} after {attempts} attempts")]
    NoReceiver { path: PathBuf, attempts: u32 },

    /// Something already exists at the FIFO path (usually a stale pipe).
    #[error("fifo path already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// The path exists but is not a named pipe.
    #[error("not a fifo: {path}")]
    NotFifo { path: PathBuf },

    /// `mkfifo` failed.
    #[error("failed to create fifo {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Opening the FIFO descriptor failed.
    #[error("failed to open fifo {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The kernel accepted only part of a write. The byte stream can no
    /// longer be interpreted by the reader.
    #[error("partial write ({written} of {expected} bytes)")]
    PartialWrite { written: usize, expected: usize },

    /// Every reader closed the pipe (`EPIPE`).
    #[error("receiver closed the pipe")]
    ReceiverGone,

    /// An I/O error occurred on the open descriptor.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
