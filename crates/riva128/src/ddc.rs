//! Bit-banged DDC (I2C) lines exposed through the vendor CRTC registers.
//!
//! The bus is not decoded: guests toggle the clock and data lines one write at a time and
//! sample them back. The read and write bit positions differ, so two flag sets are kept.

use bitflags::bitflags;

bitflags! {
    /// Layout of the value returned by a read of CRTC index `0x3E`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DdcSenseBits: u8 {
        const SCL = 0x04;
        const SDA = 0x08;
    }
}

bitflags! {
    /// Layout of the value written to CRTC index `0x3F`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DdcDriveBits: u8 {
        const SDA = 0x10;
        const SCL = 0x20;
    }
}

/// Latched state of the two DDC wires. Both lines are low at construction and after reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DdcLines {
    pub clock: bool,
    pub data: bool,
}

impl DdcLines {
    pub const fn new() -> Self {
        Self {
            clock: false,
            data: false,
        }
    }

    /// Latch a guest write. Bits other than SCL/SDA are ignored.
    pub fn drive(&mut self, value: u8) {
        let bits = DdcDriveBits::from_bits_truncate(value);
        self.clock = bits.contains(DdcDriveBits::SCL);
        self.data = bits.contains(DdcDriveBits::SDA);
    }

    /// Sample both lines. Never has bits outside [`DdcSenseBits::all`] set.
    pub fn sense(&self) -> u8 {
        let mut bits = DdcSenseBits::empty();
        bits.set(DdcSenseBits::SCL, self.clock);
        bits.set(DdcSenseBits::SDA, self.data);
        bits.bits()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_and_sense_use_different_bit_positions() {
        let mut lines = DdcLines::new();
        lines.drive(0x20);
        assert_eq!(
            lines,
            DdcLines {
                clock: true,
                data: false
            }
        );
        assert_eq!(lines.sense(), 0x04);

        lines.drive(0x10);
        assert_eq!(lines.sense(), 0x08);

        // Bits 3/2 on the write side mean nothing.
        lines.drive(0x0C);
        assert_eq!(lines, DdcLines::new());
    }

    #[test]
    fn reset_drops_both_lines() {
        let mut lines = DdcLines::new();
        lines.drive(0xFF);
        assert_eq!(lines.sense(), 0x0C);
        lines.reset();
        assert_eq!(lines.sense(), 0);
    }
}
