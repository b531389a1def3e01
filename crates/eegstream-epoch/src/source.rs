use eegstream_packet::{Packet, PacketError, PacketReceiver};
use eegstream_transport::ByteSource;

/// Anything the windower can pull samples from.
pub trait SampleSource {
    /// Values per sample.
    fn n_channels(&self) -> usize;

    /// Pull up to `max_samples` samples without blocking.
    fn pull(&mut self, max_samples: usize) -> Result<Vec<Packet>, PacketError>;
}

impl<T: ByteSource> SampleSource for PacketReceiver<T> {
    fn n_channels(&self) -> usize {
        self.format().arity()
    }

    fn pull(&mut self, max_samples: usize) -> Result<Vec<Packet>, PacketError> {
        self.receive(max_samples)
    }
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    fn n_channels(&self) -> usize {
        (**self).n_channels()
    }

    fn pull(&mut self, max_samples: usize) -> Result<Vec<Packet>, PacketError> {
        (**self).pull(max_samples)
    }
}
