//! Host-side plumbing shared by the device models in this workspace.
//!
//! - [`io`]: legacy port I/O dispatch ([`io::PortIoDevice`], [`io::IoPortBus`]).
//! - [`mmio`]: memory-mapped handlers and fixed-layout containers used to build PCI BARs.
//! - [`snapshot`]: versioned byte encoding for persisted device state.
#![forbid(unsafe_code)]

pub mod io;
pub mod mmio;
pub mod snapshot;
