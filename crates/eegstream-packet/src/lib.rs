//! Fixed-format numeric packets over a byte datalink.
//!
//! A packet is one multi-channel sample. Its wire layout is declared up
//! front by a [`PacketFormat`] written in the familiar `struct` notation
//! (`"8d"` is eight 8-byte floats), so every packet has the same size and
//! the byte stream needs no header.
//!
//! [`PacketSender`] and [`PacketReceiver`] each own exactly one datalink
//! endpoint and translate between values and bytes.

pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod receiver;
pub mod sender;
pub mod value;

pub use codec::{decode_packet, decode_packets, encode_packet};
pub use config::{DatalinkKind, FramingPolicy, PacketConfig};
pub use error::{FormatError, PacketError, Result};
pub use format::{ByteOrder, FieldType, PacketFormat};
pub use receiver::{PacketReceiver, MAX_RECEIVE_BYTES};
pub use sender::PacketSender;
pub use value::{Packet, Value};
