//! PCI identity and BAR layout of the adapter, as consumed by the host's config-space model.

/// NVIDIA/SGS Thomson joint venture vendor id.
pub const RIVA128_PCI_VENDOR_ID: u16 = 0x12D2;
pub const RIVA128_PCI_DEVICE_ID: u16 = 0x0018;

/// Display controller, VGA compatible.
pub const PCI_CLASS_DISPLAY_VGA: u16 = 0x0300;
/// Display controller, other.
pub const PCI_CLASS_DISPLAY_OTHER: u16 = 0x0380;

pub const VRAM_BAR_INDEX: u8 = 0;
pub const MMIO_BAR_INDEX: u8 = 1;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PciBarDefinition {
    Mmio32 { size: u32, prefetchable: bool },
}

impl PciBarDefinition {
    pub fn size(&self) -> u64 {
        match self {
            Self::Mmio32 { size, .. } => u64::from(*size),
        }
    }

    pub fn is_prefetchable(&self) -> bool {
        matches!(
            self,
            Self::Mmio32 {
                prefetchable: true,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PciProfile {
    pub vendor_id: u16,
    pub device_id: u16,
    /// Base class in the high byte, subclass in the low byte.
    pub class_code: u16,
    pub bars: Vec<(u8, PciBarDefinition)>,
    /// Expansion ROM BAR size, if a ROM is attached through it.
    pub rom_bar_size: Option<u32>,
}

impl PciProfile {
    pub fn bar(&self, index: u8) -> Option<PciBarDefinition> {
        self.bars
            .iter()
            .find_map(|&(i, def)| (i == index).then_some(def))
    }
}
