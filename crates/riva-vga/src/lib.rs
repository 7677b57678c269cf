//! Generic VGA-compatible register bank.
//!
//! Vendor device models sit in front of this crate: they decode their own port window and
//! forward every standard VGA access to a [`VgaCore`]. The crate provides the trait plus
//! [`StandardVga`], a register-file implementation covering the sequencer, graphics
//! controller, CRTC, attribute controller, DAC and the general registers. Rendering is not
//! modelled here.
#![forbid(unsafe_code)]

mod dac;
mod standard;
mod state;

pub use dac::VgaDac;
pub use standard::StandardVga;
pub use state::VgaCoreState;

// VGA I/O port block 0x3C0..=0x3DF (plus the mono aliases at 0x3Bx).
pub const PORT_AC_INDEX_DATA: u16 = 0x3C0;
pub const PORT_AC_DATA_READ: u16 = 0x3C1;
pub const PORT_MISC_OUTPUT_WRITE: u16 = 0x3C2;
pub const PORT_INPUT_STATUS0: u16 = 0x3C2;
pub const PORT_VIDEO_SUBSYSTEM_ENABLE: u16 = 0x3C3;
pub const PORT_SEQ_INDEX: u16 = 0x3C4;
pub const PORT_SEQ_DATA: u16 = 0x3C5;
pub const PORT_DAC_PEL_MASK: u16 = 0x3C6;
pub const PORT_DAC_READ_INDEX: u16 = 0x3C7;
pub const PORT_DAC_STATE: u16 = 0x3C7;
pub const PORT_DAC_WRITE_INDEX: u16 = 0x3C8;
pub const PORT_DAC_DATA: u16 = 0x3C9;
pub const PORT_FEATURE_CONTROL_READ: u16 = 0x3CA;
pub const PORT_MISC_OUTPUT_READ: u16 = 0x3CC;
pub const PORT_GC_INDEX: u16 = 0x3CE;
pub const PORT_GC_DATA: u16 = 0x3CF;

pub const PORT_CRTC_INDEX_COLOR: u16 = 0x3D4;
pub const PORT_CRTC_DATA_COLOR: u16 = 0x3D5;
pub const PORT_INPUT_STATUS1_COLOR: u16 = 0x3DA;
pub const PORT_CRTC_INDEX_MONO: u16 = 0x3B4;
pub const PORT_CRTC_DATA_MONO: u16 = 0x3B5;
pub const PORT_INPUT_STATUS1_MONO: u16 = 0x3BA;

pub const SEQ_REG_COUNT: usize = 5; // 0..=4
pub const GC_REG_COUNT: usize = 9; // 0..=8
pub const AC_REG_COUNT: usize = 0x15; // 0..=0x14
pub const CRTC_REG_COUNT: usize = 0x19; // 0..=0x18

/// The VGA register bank as seen by a vendor front-end.
///
/// `port` is always the absolute legacy port number (`0x3B0..=0x3DF`).
pub trait VgaCore {
    /// CRTC index most recently written through the CRTC index port.
    fn crtc_index(&self) -> u8;

    fn read_u8(&mut self, port: u16) -> u8;
    fn write_u8(&mut self, port: u16, val: u8);

    /// Return every register to its power-on value.
    fn reset(&mut self);
}
