use bytes::BytesMut;
use eegstream_transport::ByteSink;
#[cfg(unix)]
use eegstream_transport::{FifoConfig, FifoSender};

use crate::codec::encode_packet;
#[cfg(unix)]
use crate::config::{DatalinkKind, PacketConfig};
use crate::error::Result;
use crate::format::PacketFormat;
use crate::value::Value;

/// Sends one packet per call over a [`ByteSink`].
pub struct PacketSender<T> {
    inner: T,
    format: PacketFormat,
    buf: BytesMut,
}

impl<T: ByteSink> PacketSender<T> {
    pub fn new(inner: T, format: PacketFormat) -> Self {
        let buf = BytesMut::with_capacity(format.packet_size());
        Self { inner, format, buf }
    }

    /// Serialise `values` and hand them to the datalink.
    ///
    /// Returns the datalink byte count: `packet_size` when the packet was
    /// written, `0` when the datalink is full and the packet was not sent.
    pub fn send<V>(&mut self, values: &[V]) -> Result<usize>
    where
        V: Copy + Into<Value>,
    {
        self.buf.clear();
        encode_packet(&self.format, values, &mut self.buf)?;
        Ok(self.inner.send(&self.buf)?)
    }

    pub fn format(&self) -> &PacketFormat {
        &self.format
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

    /// Consume the sender and return the datalink.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(unix)]
impl PacketSender<FifoSender> {
    /// Connect to a listening packet receiver.
    pub fn connect(config: &PacketConfig, fifo: &FifoConfig) -> Result<Self> {
        let inner = match config.datalink {
            DatalinkKind::Pipe => FifoSender::connect(fifo)?,
        };
        Ok(Self::new(inner, config.format.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_packets;
    use eegstream_transport::TransportError;

    struct FullSink;

    impl ByteSink for FullSink {
        fn send(&mut self, _buf: &[u8]) -> eegstream_transport::Result<usize> {
            Ok(0)
        }
    }

    struct BrokenSink;

    impl ByteSink for BrokenSink {
        fn send(&mut self, _buf: &[u8]) -> eegstream_transport::Result<usize> {
            Err(TransportError::ReceiverGone)
        }
    }

    #[test]
    fn send_writes_one_packet_per_call() {
        let format = PacketFormat::parse("4d").unwrap();
        let mut sender = PacketSender::new(BytesMut::new(), format.clone());

        assert_eq!(sender.send(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 32);
        assert_eq!(sender.send(&[5.0, 6.0, 7.0, 8.0]).unwrap(), 32);

        let wire = sender.into_inner();
        let packets = decode_packets(&format, &wire).unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[1][3], Value::Float(8.0));
    }

    #[test]
    fn back_pressure_is_passed_through() {
        let mut sender = PacketSender::new(FullSink, PacketFormat::parse("d").unwrap());
        assert_eq!(sender.send(&[1.0]).unwrap(), 0);
    }

    #[test]
    fn transport_errors_propagate() {
        let mut sender = PacketSender::new(BrokenSink, PacketFormat::parse("d").unwrap());
        let err = sender.send(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            crate::PacketError::Transport(TransportError::ReceiverGone)
        ));
    }

    #[test]
    fn invalid_packet_is_not_sent() {
        let mut sender = PacketSender::new(BytesMut::new(), PacketFormat::parse("2d").unwrap());
        assert!(sender.send(&[1.0]).is_err());
        assert!(sender.get_ref().is_empty());
    }
}
