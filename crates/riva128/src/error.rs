use std::path::PathBuf;

use riva_platform::io::PortRangeError;
use riva_platform::mmio::MmioLayoutError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Riva128Error>;

/// Construction and host-integration failures. Register accesses never fail.
#[derive(Debug, Error)]
pub enum Riva128Error {
    #[error("failed to allocate {size:#x} bytes of VRAM")]
    VramAllocation { size: usize },

    #[error("option ROM {name:?} not found")]
    RomNotFound { name: String },

    #[error("failed to read option ROM {path}")]
    RomRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("option ROM {name:?} is {len:#x} bytes, larger than the {max:#x} byte limit")]
    RomTooLarge { name: String, len: usize, max: usize },

    #[error("legacy VGA ports are already claimed")]
    LegacyPortsBusy(#[from] PortRangeError),

    #[error("invalid MMIO BAR layout")]
    MmioLayout(#[from] MmioLayoutError),
}
