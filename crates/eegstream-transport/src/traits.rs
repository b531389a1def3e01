use std::fmt;
use std::path::Path;

use bytes::{Bytes, BytesMut};

use crate::error::Result;

/// Which end of the pipe an endpoint holds. An endpoint is never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Sender,
    Listener,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Sender => "sender",
            Role::Listener => "listener",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities shared by both FIFO endpoints.
pub trait ByteTransport {
    /// The role this endpoint was opened with.
    fn role(&self) -> Role;

    /// Path of the named pipe.
    fn path(&self) -> &Path;

    /// Close the endpoint now.
    ///
    /// The same teardown runs from `Drop`, so calling this is only needed to
    /// make the release point explicit.
    fn release(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

/// Write side of a byte datalink.
pub trait ByteSink {
    /// Write `buf` without blocking.
    ///
    /// Returns `Ok(0)` when the datalink cannot take the bytes right now;
    /// the caller is expected to retry later. An accepted write is always
    /// complete.
    fn send(&mut self, buf: &[u8]) -> Result<usize>;
}

/// Read side of a byte datalink.
pub trait ByteSource {
    /// Read up to `max_bytes` without blocking. Empty when nothing is
    /// available.
    fn receive(&mut self, max_bytes: usize) -> Result<Bytes>;
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).send(buf)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn receive(&mut self, max_bytes: usize) -> Result<Bytes> {
        (**self).receive(max_bytes)
    }
}

/// In-memory sink: appends everything, never back-pressures.
impl ByteSink for BytesMut {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// In-memory source: hands out the front of the buffer.
impl ByteSource for BytesMut {
    fn receive(&mut self, max_bytes: usize) -> Result<Bytes> {
        let n = max_bytes.min(self.len());
        Ok(self.split_to(n).freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_pipe_preserves_order() {
        let mut pipe = BytesMut::new();
        assert_eq!(pipe.send(b"abc").unwrap(), 3);
        assert_eq!(pipe.send(b"def").unwrap(), 3);

        assert_eq!(pipe.receive(4).unwrap().as_ref(), b"abcd");
        assert_eq!(pipe.receive(10).unwrap().as_ref(), b"ef");
        assert!(pipe.receive(10).unwrap().is_empty());
    }

    #[test]
    fn role_names() {
        assert_eq!(Role::Sender.to_string(), "sender");
        assert_eq!(Role::Listener.as_str(), "listener");
    }
}
