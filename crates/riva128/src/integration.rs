//! Host bus adapters.
//!
//! The device is shared with the port I/O bus and the MMIO containers through
//! `Rc<RefCell<_>>`; every adapter borrows it for the duration of one access.

use std::cell::RefCell;
use std::rc::Rc;

use riva_platform::io::{IoPortBus, PortIoDevice};
use riva_platform::mmio::{MmioContainer, MmioHandler};

use crate::decoder::{RIVA128_IO_BASE, RIVA128_IO_LEN};
use crate::device::{Riva128Device, RIVA128_MMIO_IO_OFFSET, RIVA128_MMIO_SIZE};
use crate::error::Result;

pub type SharedRiva128 = Rc<RefCell<Riva128Device>>;

/// Splits a dword access into two word accesses, low half first.
fn read_split(dev: &mut Riva128Device, offset: u16, size: u8) -> u32 {
    match size {
        4 => {
            let lo = dev.port_read(offset, 2);
            let hi = offset
                .checked_add(2)
                .map_or(0, |next| dev.port_read(next, 2));
            lo | (hi << 16)
        }
        _ => dev.port_read(offset, size),
    }
}

fn write_split(dev: &mut Riva128Device, offset: u16, size: u8, value: u32) {
    match size {
        4 => {
            dev.port_write(offset, 2, value & 0xFFFF);
            if let Some(next) = offset.checked_add(2) {
                dev.port_write(next, 2, value >> 16);
            }
        }
        _ => dev.port_write(offset, size, value),
    }
}

/// Legacy port window `0x3C0..=0x3DF`.
pub struct Riva128PortIoDevice {
    pub dev: SharedRiva128,
}

impl PortIoDevice for Riva128PortIoDevice {
    fn read(&mut self, port: u16, size: u8) -> u32 {
        read_split(
            &mut self.dev.borrow_mut(),
            port.wrapping_sub(RIVA128_IO_BASE),
            size,
        )
    }

    fn write(&mut self, port: u16, size: u8, value: u32) {
        write_split(
            &mut self.dev.borrow_mut(),
            port.wrapping_sub(RIVA128_IO_BASE),
            size,
            value,
        )
    }

    fn reset(&mut self) {
        self.dev.borrow_mut().reset();
    }
}

/// The legacy port window re-exposed inside BAR1.
pub struct Riva128MmioPortAlias {
    pub dev: SharedRiva128,
}

impl MmioHandler for Riva128MmioPortAlias {
    fn read(&mut self, offset: u64, size: usize) -> u64 {
        let (Ok(offset), Ok(size)) = (u16::try_from(offset), u8::try_from(size)) else {
            return 0;
        };
        u64::from(read_split(&mut self.dev.borrow_mut(), offset, size))
    }

    fn write(&mut self, offset: u64, size: usize, value: u64) {
        let (Ok(offset), Ok(size)) = (u16::try_from(offset), u8::try_from(size)) else {
            return;
        };
        write_split(&mut self.dev.borrow_mut(), offset, size, value as u32)
    }
}

/// Linear VRAM aperture (BAR0).
pub struct Riva128VramMmio {
    pub dev: SharedRiva128,
}

impl MmioHandler for Riva128VramMmio {
    fn read(&mut self, offset: u64, size: usize) -> u64 {
        self.dev.borrow().vram_read(offset, size)
    }

    fn write(&mut self, offset: u64, size: usize, value: u64) {
        self.dev.borrow_mut().vram_write(offset, size, value)
    }
}

/// Claims the legacy VGA window on `bus` if the adapter owns one.
///
/// Fails if another device (typically a second primary adapter) already holds any of the
/// ports. Returns `Ok(false)` for adapters without legacy ports.
pub fn register_legacy_ports(bus: &mut IoPortBus, dev: &SharedRiva128) -> Result<bool> {
    let Some(window) = dev.borrow().resources().legacy_io else {
        return Ok(false);
    };
    bus.register_range(
        window.start,
        window.len,
        Box::new(Riva128PortIoDevice { dev: dev.clone() }),
    )?;
    Ok(true)
}

/// Releases the legacy window claimed by [`register_legacy_ports`].
pub fn unregister_legacy_ports(bus: &mut IoPortBus, dev: &SharedRiva128) -> bool {
    let Some(window) = dev.borrow().resources().legacy_io else {
        return false;
    };
    bus.unregister_range_device(window.start, window.len)
        .is_some()
}

/// Builds BAR1, or `None` if the adapter was realized without it.
pub fn build_mmio_bar(dev: &SharedRiva128) -> Result<Option<MmioContainer>> {
    if !dev.borrow().resources().mmio_bar {
        return Ok(None);
    }
    let mut bar = MmioContainer::new("riva128.mmio", u64::from(RIVA128_MMIO_SIZE));
    bar.add_subregion(
        "riva128 ioports remapped",
        RIVA128_MMIO_IO_OFFSET,
        u64::from(RIVA128_IO_LEN),
        Box::new(Riva128MmioPortAlias { dev: dev.clone() }),
    )?;
    Ok(Some(bar))
}

/// Builds BAR0, covering all of VRAM.
pub fn build_vram_bar(dev: &SharedRiva128) -> Result<MmioContainer> {
    let len = dev.borrow().vram().len() as u64;
    let mut bar = MmioContainer::new("riva128.vram", len);
    bar.add_subregion("vram", 0, len, Box::new(Riva128VramMmio { dev: dev.clone() }))?;
    Ok(bar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Riva128Config;
    use crate::device::Riva128Variant;
    use crate::rom::MemoryRomSource;

    fn shared(variant: Riva128Variant) -> SharedRiva128 {
        let cfg = Riva128Config {
            vram_size_mb: 1,
            ..Riva128Config::default()
        };
        Rc::new(RefCell::new(
            Riva128Device::realize(variant, cfg, &MemoryRomSource::new()).unwrap(),
        ))
    }

    #[test]
    fn dword_port_access_is_two_word_accesses() {
        let dev = shared(Riva128Variant::Primary);
        let mut port = Riva128PortIoDevice { dev: dev.clone() };

        // 0x3C4 <- 0x02 (seq index), 0x3C5 <- 0x0F (map mask), 0x3C6 <- 0x3F, 0x3C7 <- 0x00.
        port.write(0x3C4, 4, 0x003F_0F02);
        let vga = dev.borrow().vga().clone();
        assert_eq!(vga.seq_regs()[2], 0x0F);
        assert_eq!(vga.dac().pel_mask(), 0x3F);

        assert_eq!(port.read(0x3C4, 4) & 0x00FF_FFFF, 0x003F_0F02);
    }

    #[test]
    fn dword_split_stops_at_the_top_of_the_offset_space() {
        let dev = shared(Riva128Variant::Primary);
        let pristine = dev.borrow().vga().clone();

        write_split(&mut dev.borrow_mut(), 0xFFFE, 4, 0x3333_3333);
        assert_eq!(dev.borrow().vga(), &pristine);

        dev.borrow_mut().port_write(0x00, 1, 0x33);
        assert_eq!(read_split(&mut dev.borrow_mut(), 0xFFFE, 4), 0);
    }

    #[test]
    fn vram_bar_exposes_little_endian_vram() {
        let dev = shared(Riva128Variant::Secondary);
        let mut bar = build_vram_bar(&dev).unwrap();
        bar.write(0x100, 4, 0xDEAD_BEEF);
        assert_eq!(dev.borrow().vram()[0x100], 0xEF);
        assert_eq!(bar.read(0x102, 2), 0xDEAD);
        assert_eq!(bar.size(), 0x10_0000);
    }

    #[test]
    fn secondary_has_no_legacy_window() {
        let dev = shared(Riva128Variant::Secondary);
        let mut bus = IoPortBus::new();
        assert!(!register_legacy_ports(&mut bus, &dev).unwrap());
        assert!(!bus.is_range_claimed(RIVA128_IO_BASE, RIVA128_IO_LEN));
        assert!(build_mmio_bar(&dev).unwrap().is_some());
    }
}
