//! Legacy VGA port decoder for the RIVA 128.
//!
//! Offsets are relative to [`RIVA128_IO_BASE`], whether the access arrived through the
//! legacy port window or through the MMIO alias in BAR1. Only 1- and 2-byte accesses are
//! decoded; a 2-byte access is two byte accesses, low address first, which lets a single
//! 16-bit write to an index port select the index and then write its data register.

use riva_vga::{
    VgaCore, PORT_AC_DATA_READ, PORT_AC_INDEX_DATA, PORT_CRTC_DATA_COLOR, PORT_CRTC_INDEX_COLOR,
    PORT_DAC_DATA, PORT_DAC_PEL_MASK, PORT_DAC_READ_INDEX, PORT_DAC_WRITE_INDEX,
    PORT_FEATURE_CONTROL_READ, PORT_GC_DATA, PORT_GC_INDEX, PORT_INPUT_STATUS1_COLOR,
    PORT_MISC_OUTPUT_READ, PORT_MISC_OUTPUT_WRITE, PORT_SEQ_DATA, PORT_SEQ_INDEX,
    PORT_VIDEO_SUBSYSTEM_ENABLE,
};

use crate::ddc::DdcLines;
use crate::mux::CrtcExtensionMux;

/// First legacy port decoded by the adapter.
pub const RIVA128_IO_BASE: u16 = 0x3C0;
/// Number of ports in the legacy window (`0x3C0..=0x3DF`).
pub const RIVA128_IO_LEN: u16 = 0x20;

enum Route {
    Core,
    CrtcData,
    Unassigned,
}

fn route(port: u16) -> Route {
    match port {
        // 0x3CB and 0x3CD are not decoded by the adapter.
        PORT_AC_INDEX_DATA
        | PORT_AC_DATA_READ
        | PORT_MISC_OUTPUT_WRITE
        | PORT_VIDEO_SUBSYSTEM_ENABLE
        | PORT_SEQ_INDEX
        | PORT_SEQ_DATA
        | PORT_DAC_PEL_MASK
        | PORT_DAC_READ_INDEX
        | PORT_DAC_WRITE_INDEX
        | PORT_DAC_DATA
        | PORT_FEATURE_CONTROL_READ
        | PORT_MISC_OUTPUT_READ
        | PORT_GC_INDEX
        | PORT_GC_DATA
        | PORT_CRTC_INDEX_COLOR
        | PORT_INPUT_STATUS1_COLOR => Route::Core,
        PORT_CRTC_DATA_COLOR => Route::CrtcData,
        _ => Route::Unassigned,
    }
}

/// Stateless view over the VGA core and the DDC lines for one access.
pub struct Riva128PortDecoder<'a, C: VgaCore + ?Sized> {
    core: &'a mut C,
    ddc: &'a mut DdcLines,
}

impl<'a, C: VgaCore + ?Sized> Riva128PortDecoder<'a, C> {
    pub fn new(core: &'a mut C, ddc: &'a mut DdcLines) -> Self {
        Self { core, ddc }
    }

    pub fn read(&mut self, offset: u16, size: u8) -> u32 {
        match size {
            1 => u32::from(self.read_port(offset)),
            2 => {
                let lo = self.read_port(offset);
                let hi = offset.checked_add(1).map_or(0, |next| self.read_port(next));
                u32::from(u16::from_le_bytes([lo, hi]))
            }
            _ => {
                tracing::trace!("unsupported {size}-byte read at offset {offset:#x}");
                0
            }
        }
    }

    pub fn write(&mut self, offset: u16, size: u8, value: u32) {
        let [lo, hi, ..] = value.to_le_bytes();
        match size {
            1 => self.write_port(offset, lo),
            2 => {
                self.write_port(offset, lo);
                if let Some(next) = offset.checked_add(1) {
                    self.write_port(next, hi);
                }
            }
            _ => tracing::trace!("unsupported {size}-byte write at offset {offset:#x}"),
        }
    }

    fn read_port(&mut self, offset: u16) -> u8 {
        let Some(port) = absolute_port(offset) else {
            return 0;
        };
        match route(port) {
            Route::Core => self.core.read_u8(port),
            Route::CrtcData => CrtcExtensionMux::new(&mut *self.core, &mut *self.ddc).read(),
            Route::Unassigned => {
                tracing::trace!("read of unassigned port {port:#x}");
                0
            }
        }
    }

    fn write_port(&mut self, offset: u16, value: u8) {
        let Some(port) = absolute_port(offset) else {
            return;
        };
        match route(port) {
            Route::Core => self.core.write_u8(port, value),
            Route::CrtcData => {
                CrtcExtensionMux::new(&mut *self.core, &mut *self.ddc).write(value)
            }
            Route::Unassigned => {
                tracing::trace!("write of {value:#04x} to unassigned port {port:#x}");
            }
        }
    }
}

fn absolute_port(offset: u16) -> Option<u16> {
    (offset < RIVA128_IO_LEN).then(|| RIVA128_IO_BASE + offset)
}
