use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use tracing::{debug, info, warn};

use crate::config::FifoConfig;
use crate::error::{Result, TransportError};
use crate::traits::{ByteSource, ByteTransport, Role};

/// Read end of a named pipe. Owns the FIFO file it created.
///
/// On drop the descriptor is closed first, then the FIFO is unlinked if the
/// path still refers to the node this listener created.
pub struct FifoListener {
    // Field order matters: the descriptor closes before the node is unlinked.
    file: File,
    node: FifoNode,
}

impl FifoListener {
    /// Create the FIFO at `config.path` and open it for non-blocking reads.
    ///
    /// Fails with [`TransportError::AlreadyExists`] if anything is already
    /// at the path; stale pipes are never reused or removed.
    pub fn bind(config: &FifoConfig) -> Result<Self> {
        let path = config.path.clone();

        if std::fs::symlink_metadata(&path).is_ok() {
            return Err(TransportError::AlreadyExists { path });
        }

        let node = FifoNode::create(path, config.mode)?;

        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&node.path)
            .map_err(|e| TransportError::Open {
                path: node.path.clone(),
                source: e,
            })?;

        info!(path = ?node.path, "listening on fifo");

        Ok(Self { file, node })
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "named-pipe"
    }
}

impl ByteTransport for FifoListener {
    fn role(&self) -> Role {
        Role::Listener
    }

    fn path(&self) -> &Path {
        &self.node.path
    }
}

impl ByteSource for FifoListener {
    /// Reads whatever is in the pipe, up to `max_bytes`.
    ///
    /// "No data yet" and "writer gone" both come back empty.
    fn receive(&mut self, max_bytes: usize) -> Result<Bytes> {
        if max_bytes == 0 {
            return Ok(Bytes::new());
        }

        let mut buf = BytesMut::zeroed(max_bytes);
        loop {
            match self.file.read(&mut buf) {
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(buf.freeze());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(Bytes::new()),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl std::fmt::Debug for FifoListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoListener")
            .field("path", &self.node.path)
            .finish()
    }
}

/// A FIFO file created by this process, removed again on drop.
struct FifoNode {
    path: PathBuf,
    created_inode: (u64, u64),
}

impl FifoNode {
    fn create(path: PathBuf, mode: u32) -> Result<Self> {
        match make_fifo(&path, mode) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(TransportError::AlreadyExists { path })
            }
            Err(err) => return Err(TransportError::Create { path, source: err }),
        }

        let identity = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode))
            .and_then(|()| std::fs::symlink_metadata(&path));

        match identity {
            Ok(metadata) => Ok(Self {
                created_inode: (metadata.dev(), metadata.ino()),
                path,
            }),
            Err(err) => {
                let _ = std::fs::remove_file(&path);
                Err(TransportError::Create { path, source: err })
            }
        }
    }
}

impl Drop for FifoNode {
    fn drop(&mut self) {
        let (expected_dev, expected_ino) = self.created_inode;
        match std::fs::symlink_metadata(&self.path) {
            Ok(metadata)
                if metadata.file_type().is_fifo()
                    && metadata.dev() == expected_dev
                    && metadata.ino() == expected_ino =>
            {
                debug!(path = ?self.path, "removing fifo");
                if let Err(err) = std::fs::remove_file(&self.path) {
                    warn!(path = ?self.path, error = %err, "failed to remove fifo");
                }
            }
            Ok(_) => {
                debug!(path = ?self.path, "fifo path identity changed; skipping cleanup");
            }
            Err(err) => {
                warn!(path = ?self.path, error = %err, "failed to remove fifo");
            }
        }
    }
}

/// Thin wrapper over `mkfifo(3)`.
pub(crate) fn make_fifo(path: &Path, mode: u32) -> std::io::Result<()> {
    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        std::io::Error::new(ErrorKind::InvalidInput, "fifo path contains a NUL byte")
    })?;

    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), mode as libc::mode_t) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::sender::FifoSender;
    use crate::traits::ByteSink;

    fn make_fifo_path(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "eegs-rx-{}-{}-{}",
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

    fn cleanup(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    fn connect(path: &Path) -> FifoSender {
        FifoSender::connect(
            &FifoConfig::new(path)
                .with_connect_attempts(1)
                .with_connect_delay(Duration::from_millis(1)),
        )
        .expect("sender should connect")
    }

    #[test]
    fn bind_creates_fifo_and_drop_removes_it() {
        let path = make_fifo_path("bind");
        let listener = FifoListener::bind(&FifoConfig::new(&path)).unwrap();

        let metadata = std::fs::symlink_metadata(&path).unwrap();
        assert!(metadata.file_type().is_fifo());
        assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
        assert_eq!(listener.role(), Role::Listener);

        drop(listener);
        assert!(!path.exists(), "fifo should be removed on drop");
        cleanup(&path);
    }

    #[test]
    fn release_removes_fifo() {
        let path = make_fifo_path("release");
        let listener = FifoListener::bind(&FifoConfig::new(&path)).unwrap();
        listener.release();
        assert!(!path.exists());
        cleanup(&path);
    }

    #[test]
    fn bind_rejects_stale_path() {
        let path = make_fifo_path("stale");
        std::fs::write(&path, b"leftover").unwrap();

        let err = FifoListener::bind(&FifoConfig::new(&path)).unwrap_err();
        assert!(matches!(err, TransportError::AlreadyExists { .. }));
        assert!(path.exists(), "stale path must not be removed");
        cleanup(&path);
    }

    #[test]
    fn second_listener_on_same_path_fails() {
        let path = make_fifo_path("twice");
        let _first = FifoListener::bind(&FifoConfig::new(&path)).unwrap();

        let err = FifoListener::bind(&FifoConfig::new(&path)).unwrap_err();
        assert!(matches!(err, TransportError::AlreadyExists { .. }));
        cleanup(&path);
    }

    #[test]
    fn receive_is_empty_without_data() {
        let path = make_fifo_path("empty");
        let mut listener = FifoListener::bind(&FifoConfig::new(&path)).unwrap();

        assert!(listener.receive(1024).unwrap().is_empty());

        let _sender = connect(&path);
        assert!(listener.receive(1024).unwrap().is_empty());
        assert!(listener.receive(0).unwrap().is_empty());
        cleanup(&path);
    }

    #[test]
    fn receive_preserves_send_order() {
        let path = make_fifo_path("order");
        let mut listener = FifoListener::bind(&FifoConfig::new(&path)).unwrap();
        let mut sender = connect(&path);

        assert_eq!(sender.send(b"first-").unwrap(), 6);
        assert_eq!(sender.send(b"second").unwrap(), 6);

        assert_eq!(listener.receive(4).unwrap().as_ref(), b"firs");
        assert_eq!(listener.receive(64).unwrap().as_ref(), b"t-second");
        assert!(listener.receive(64).unwrap().is_empty());
        cleanup(&path);
    }

    #[test]
    fn drop_does_not_remove_replaced_path() {
        let path = make_fifo_path("replaced");
        let listener = FifoListener::bind(&FifoConfig::new(&path)).unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::write(&path, b"replacement").unwrap();

        drop(listener);
        assert!(
            path.exists(),
            "drop must not remove a path whose identity changed"
        );
        cleanup(&path);
    }
}
