use riva_vga::{VgaCore, PORT_CRTC_DATA_COLOR};

use crate::ddc::DdcLines;

/// CRTC index whose reads sample the DDC lines.
pub const CRTC_DDC_READ_INDEX: u8 = 0x3E;
/// CRTC index whose writes drive the DDC lines.
pub const CRTC_DDC_WRITE_INDEX: u8 = 0x3F;

/// Routes accesses to the CRTC data port (`0x3D5`).
///
/// The selected index is read from the VGA core on every access; the mux itself holds only
/// borrows. Each call either touches the DDC lines or delegates to the core, never both.
pub struct CrtcExtensionMux<'a, C: VgaCore + ?Sized> {
    core: &'a mut C,
    ddc: &'a mut DdcLines,
}

impl<'a, C: VgaCore + ?Sized> CrtcExtensionMux<'a, C> {
    pub fn new(core: &'a mut C, ddc: &'a mut DdcLines) -> Self {
        Self { core, ddc }
    }

    pub fn read(&mut self) -> u8 {
        match self.core.crtc_index() {
            CRTC_DDC_READ_INDEX => self.ddc.sense(),
            _ => self.core.read_u8(PORT_CRTC_DATA_COLOR),
        }
    }

    pub fn write(&mut self, value: u8) {
        match self.core.crtc_index() {
            CRTC_DDC_WRITE_INDEX => {
                self.ddc.drive(value);
                tracing::trace!("DDC lines driven: {:?}", self.ddc);
            }
            _ => self.core.write_u8(PORT_CRTC_DATA_COLOR, value),
        }
    }
}
