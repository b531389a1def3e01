use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::config::FifoConfig;
use crate::error::{Result, TransportError};
use crate::traits::{ByteSink, ByteTransport, Role};

/// Largest write the kernel guarantees to be atomic on a pipe.
///
/// Writes up to this size are either taken whole or refused with `EAGAIN`.
/// Larger writes may be split, which [`FifoSender`] treats as fatal.
pub fn atomic_write_limit() -> usize {
    libc::PIPE_BUF
}

/// Write end of a named pipe.
pub struct FifoSender {
    file: File,
    path: PathBuf,
}

impl FifoSender {
    /// Open the FIFO for writing in non-blocking mode.
    ///
    /// The kernel refuses a non-blocking write-only open until a reader has
    /// the pipe open, so this retries `connect_attempts` times with
    /// `connect_delay` in between. A FIFO that does not exist yet counts the
    /// same as one without a reader.
    pub fn connect(config: &FifoConfig) -> Result<Self> {
        let path = config.path.clone();
        let attempts = config.connect_attempts.max(1);

        for attempt in 1..=attempts {
            match open_write_end(&path) {
                Ok(file) => {
                    let metadata = file.metadata()?;
                    if !metadata.file_type().is_fifo() {
                        return Err(TransportError::NotFifo { path });
                    }
                    debug!(?path, attempt, "connected to fifo");
                    return Ok(Self { file, path });
                }
                Err(err) if is_rendezvous_pending(&err) => {
                    trace!(?path, attempt, attempts, "fifo has no reader yet");
                    if attempt < attempts {
                        std::thread::sleep(config.connect_delay);
                    }
                }
                Err(err) => return Err(TransportError::Open { path, source: err }),
            }
        }

        Err(TransportError::NoReceiver { path, attempts })
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "named-pipe"
    }
}

impl ByteTransport for FifoSender {
    fn role(&self) -> Role {
        Role::Sender
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSink for FifoSender {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            match self.file.write(buf) {
                Ok(n) if n == buf.len() => return Ok(n),
                Ok(n) => {
                    return Err(TransportError::PartialWrite {
                        written: n,
                        expected: buf.len(),
                    })
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    trace!(path = ?self.path, len = buf.len(), "fifo full");
                    return Ok(0);
                }
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                    return Err(TransportError::ReceiverGone)
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl Drop for FifoSender {
    fn drop(&mut self) {
        debug!(path = ?self.path, "closing fifo write end");
    }
}

impl std::fmt::Debug for FifoSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoSender")
            .field("path", &self.path)
            .finish()
    }
}

fn open_write_end(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
}

/// `ENXIO`: FIFO exists but nobody reads it. `ENOENT`: listener not up yet.
fn is_rendezvous_pending(err: &std::io::Error) -> bool {
    err.raw_os_error() == Some(libc::ENXIO) || err.kind() == ErrorKind::NotFound
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::listener::{make_fifo, FifoListener};
    use crate::traits::ByteSource;

    fn make_fifo_path(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "eegs-tx-{}-{}-{}",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir.join("stream.fifo")
    }

    fn fast_config(path: &Path, attempts: u32) -> FifoConfig {
        FifoConfig::new(path)
            .with_connect_attempts(attempts)
            .with_connect_delay(Duration::from_millis(10))
    }

    fn cleanup(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn no_receiver_after_attempt_budget() {
        let path = make_fifo_path("absent");
        let start = Instant::now();

        let err = FifoSender::connect(&fast_config(&path, 3)).unwrap_err();

        assert!(matches!(err, TransportError::NoReceiver { attempts: 3, .. }));
        assert!(start.elapsed() >= Duration::from_millis(20));
        cleanup(&path);
    }

    #[test]
    fn no_receiver_when_fifo_has_no_reader() {
        let path = make_fifo_path("noreader");
        make_fifo(&path, 0o600).expect("mkfifo should succeed");

        let err = FifoSender::connect(&fast_config(&path, 2)).unwrap_err();
        assert!(matches!(err, TransportError::NoReceiver { .. }));
        cleanup(&path);
    }

    #[test]
    fn rejects_regular_file() {
        let path = make_fifo_path("regular");
        std::fs::write(&path, b"not a pipe").unwrap();

        let err = FifoSender::connect(&fast_config(&path, 1)).unwrap_err();
        assert!(matches!(err, TransportError::NotFifo { .. }));
        cleanup(&path);
    }

    #[test]
    fn connects_once_listener_appears() {
        let path = make_fifo_path("late");
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let listener_path = path.clone();
        let listener = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            let listener = FifoListener::bind(&FifoConfig::new(&listener_path))
                .expect("listener should bind");
            let _ = done_rx.recv_timeout(Duration::from_secs(5));
            drop(listener);
        });

        let sender = FifoSender::connect(&fast_config(&path, 200)).expect("sender should connect");
        assert_eq!(sender.role(), Role::Sender);
        assert_eq!(sender.path(), path.as_path());

        done_tx.send(()).unwrap();
        listener.join().expect("listener thread should finish");
        cleanup(&path);
    }

    #[test]
    fn send_returns_zero_when_pipe_full() {
        let path = make_fifo_path("full");
        let mut listener = FifoListener::bind(&FifoConfig::new(&path)).unwrap();
        let mut sender = FifoSender::connect(&fast_config(&path, 1)).unwrap();

        let chunk = vec![0x5A; atomic_write_limit()];
        let mut accepted = 0usize;
        loop {
            let n = sender.send(&chunk).expect("back-pressure must not be an error");
            if n == 0 {
                break;
            }
            assert_eq!(n, chunk.len());
            accepted += n;
            assert!(accepted <= 16 * 1024 * 1024, "pipe never filled up");
        }
        assert_eq!(sender.send(&chunk).unwrap(), 0);

        let mut drained = 0usize;
        loop {
            let bytes = listener.receive(64 * 1024).unwrap();
            if bytes.is_empty() {
                break;
            }
            assert!(bytes.iter().all(|b| *b == 0x5A));
            drained += bytes.len();
        }
        assert_eq!(drained, accepted);

        drop(sender);
        drop(listener);
        cleanup(&path);
    }

    #[test]
    fn send_after_listener_left_reports_receiver_gone() {
        let path = make_fifo_path("gone");
        let listener = FifoListener::bind(&FifoConfig::new(&path)).unwrap();
        let mut sender = FifoSender::connect(&fast_config(&path, 1)).unwrap();

        drop(listener);

        let err = sender.send(b"late").unwrap_err();
        assert!(matches!(err, TransportError::ReceiverGone));
        cleanup(&path);
    }
}
