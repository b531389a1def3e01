use bytes::BytesMut;
use eegstream_transport::ByteSource;
#[cfg(unix)]
use eegstream_transport::{FifoConfig, FifoListener};
use tracing::trace;

use crate::codec::decode_packets;
#[cfg(unix)]
use crate::config::{DatalinkKind, PacketConfig};
use crate::config::FramingPolicy;
use crate::error::Result;
use crate::format::PacketFormat;
use crate::value::Packet;

/// Upper bound on the bytes requested from the datalink in one receive.
pub const MAX_RECEIVE_BYTES: usize = 1024 * 1024;

/// Receives whole packets from a [`ByteSource`].
pub struct PacketReceiver<T> {
    inner: T,
    format: PacketFormat,
    framing: FramingPolicy,
    tail: BytesMut,
}

impl<T: ByteSource> PacketReceiver<T> {
    /// Create a receiver with strict framing.
    pub fn new(inner: T, format: PacketFormat) -> Self {
        Self {
            inner,
            format,
            framing: FramingPolicy::Strict,
            tail: BytesMut::new(),
        }
    }

    pub fn with_framing(mut self, framing: FramingPolicy) -> Self {
        self.framing = framing;
        self
    }

    /// Receive up to `max_packets` packets without blocking.
    ///
    /// An empty vector means nothing is available yet. Under
    /// [`FramingPolicy::Strict`] a byte run that ends mid-packet fails with
    /// [`PacketError::Framing`](crate::PacketError::Framing); under
    /// [`FramingPolicy::CarryTail`] the partial packet waits for the next
    /// call.
    pub fn receive(&mut self, max_packets: usize) -> Result<Vec<Packet>> {
        let size = self.format.packet_size();
        let max_packets = max_packets.min((MAX_RECEIVE_BYTES / size).max(1));
        if max_packets == 0 {
            return Ok(Vec::new());
        }

        match self.framing {
            FramingPolicy::Strict => {
                let bytes = self.inner.receive(max_packets * size)?;
                decode_packets(&self.format, &bytes)
            }
            FramingPolicy::CarryTail => {
                let wanted = max_packets * size - self.tail.len();
                let bytes = self.inner.receive(wanted)?;
                self.tail.extend_from_slice(&bytes);

                let whole = self.tail.len() - self.tail.len() % size;
                let run = self.tail.split_to(whole);
                if !self.tail.is_empty() {
                    trace!(pending = self.tail.len(), "holding partial packet");
                }
                decode_packets(&self.format, &run)
            }
        }
    }

    /// Bytes of an incomplete packet held back for the next receive.
    pub fn pending_bytes(&self) -> usize {
        self.tail.len()
    }

    pub fn format(&self) -> &PacketFormat {
        &self.format
    }

    pub fn framing(&self) -> FramingPolicy {
        self.framing
    }

    pub fn packet_size(&self) -> usize {
        self.format.packet_size()
    }

    /// Borrow the underlying datalink.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying datalink.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the receiver and return the datalink.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(unix)]
impl PacketReceiver<FifoListener> {
    /// Create the FIFO and start receiving packets from it.
    pub fn bind(config: &PacketConfig, fifo: &FifoConfig) -> Result<Self> {
        let inner = match config.datalink {
            DatalinkKind::Pipe => FifoListener::bind(fifo)?,
        };
        Ok(Self::new(inner, config.format.clone()).with_framing(config.framing))
    }
}
