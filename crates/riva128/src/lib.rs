//! RIVA 128 compatible VGA adapter.
//!
//! The adapter decodes the 32-port legacy VGA window `0x3C0..=0x3DF` (also reachable through
//! an alias in its MMIO BAR), forwards standard VGA registers to a [`riva_vga::VgaCore`] and
//! implements one vendor extension: the DDC (I2C) clock and data lines, bit-banged through
//! CRTC indices `0x3E` (sense) and `0x3F` (drive).
//!
//! Two variants exist. The primary adapter owns the legacy ports and carries an option ROM;
//! the secondary adapter is reachable only through its PCI BARs.
#![forbid(unsafe_code)]

pub mod config;
pub mod ddc;
pub mod decoder;
pub mod device;
mod error;
pub mod integration;
pub mod mux;
pub mod pci;
pub mod registry;
pub mod rom;
mod snapshot;

pub use config::Riva128Config;
pub use ddc::DdcLines;
pub use decoder::{Riva128PortDecoder, RIVA128_IO_BASE, RIVA128_IO_LEN};
pub use device::{
    PortWindow, ResourcePlan, Riva128Device, Riva128Variant, RIVA128_MMIO_IO_OFFSET,
    RIVA128_MMIO_SIZE,
};
pub use error::{Result, Riva128Error};
pub use mux::{CrtcExtensionMux, CRTC_DDC_READ_INDEX, CRTC_DDC_WRITE_INDEX};
pub use registry::{register_riva128_types, DeviceTypeRegistry, RegistryError};
