//! Consumer-facing side of the pipeline.
//!
//! Visualisers and detectors talk to a [`SignalInterface`]: they read its
//! channel count, set a boolean [`MaskController`] mask and pull epochs
//! restricted to the masked channels. They never see the ring buffer.
//! [`DeviceInfo`] carries the acquisition metadata used to size epochs.

pub mod device;
pub mod error;
pub mod interface;
pub mod mask;

pub use device::DeviceInfo;
pub use error::{Result, SignalError};
pub use interface::SignalInterface;
pub use mask::MaskController;
