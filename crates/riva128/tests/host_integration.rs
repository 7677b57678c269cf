use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use riva128::integration::{
    build_mmio_bar, register_legacy_ports, unregister_legacy_ports, SharedRiva128,
};
use riva128::rom::MemoryRomSource;
use riva128::{
    register_riva128_types, DeviceTypeRegistry, Riva128Config, Riva128Error, RIVA128_IO_BASE,
    RIVA128_MMIO_IO_OFFSET,
};
use riva_platform::io::{IoPortBus, PortRangeError};
use riva_platform::mmio::MmioHandler;
use riva_platform::snapshot::IoSnapshot;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn create(type_name: &str) -> SharedRiva128 {
    let mut registry = DeviceTypeRegistry::new();
    register_riva128_types(&mut registry).unwrap();
    let roms = MemoryRomSource::new().with_image("riva128bios.bin", vec![0x55, 0xAA]);
    let cfg = Riva128Config {
        vram_size_mb: 1,
        ..Riva128Config::default()
    };
    Rc::new(RefCell::new(registry.create(type_name, cfg, &roms).unwrap()))
}

#[test]
fn only_one_primary_owns_the_legacy_window() {
    init_tracing();
    let mut bus = IoPortBus::new();
    let first = create("riva128");
    let second = create("riva128");

    assert!(register_legacy_ports(&mut bus, &first).unwrap());
    let err = register_legacy_ports(&mut bus, &second).unwrap_err();
    assert!(matches!(
        err,
        Riva128Error::LegacyPortsBusy(PortRangeError::Overlap {
            start: 0x3C0,
            owner_start: 0x3C0,
            ..
        })
    ));

    // Destroying the first adapter frees the window for the second.
    assert!(unregister_legacy_ports(&mut bus, &first));
    drop(first);
    assert!(register_legacy_ports(&mut bus, &second).unwrap());

    bus.write(0x3D4, 2, 0x303F);
    assert!(second.borrow().ddc().clock);

    // A bus reset reaches the adapter behind the window.
    bus.reset();
    assert!(!second.borrow().ddc().clock);
}

#[test]
fn word_port_write_at_the_last_offset_leaves_the_core_untouched() {
    init_tracing();
    let dev = create("riva128");
    let pristine = dev.borrow().vga().clone();

    dev.borrow_mut().port_write(u16::MAX, 2, 0x3300);
    assert_eq!(dev.borrow().vga(), &pristine);
    assert_eq!(dev.borrow_mut().port_read(u16::MAX, 2), 0);
}

#[test]
fn mmio_alias_behaves_like_the_port_window() {
    init_tracing();
    let mut bus = IoPortBus::new();
    let dev = create("riva128");
    register_legacy_ports(&mut bus, &dev).unwrap();
    let mut bar = build_mmio_bar(&dev).unwrap().unwrap();

    // Drive both lines through the MMIO alias, sample them through the ports.
    bar.write(RIVA128_MMIO_IO_OFFSET + 0x14, 2, 0x303F);
    bus.write_u8(0x3D4, 0x3E);
    assert_eq!(bus.read_u8(0x3D5), 0x0C);
    assert_eq!(bar.read(RIVA128_MMIO_IO_OFFSET + 0x15, 1), 0x0C);

    // Program the sequencer through the ports, read it back through MMIO.
    bus.write(0x3C4, 2, 0x0F02);
    assert_eq!(bar.read(RIVA128_MMIO_IO_OFFSET + 0x04, 2), 0x0F02);

    // Unassigned ports and MMIO outside the alias read zero.
    assert_eq!(bar.read(RIVA128_MMIO_IO_OFFSET + 0x0B, 1), 0);
    assert_eq!(bus.read_u8(RIVA128_IO_BASE + 0x0B), 0);
    assert_eq!(bar.read(0, 4), 0);
    assert_eq!(bar.read(RIVA128_MMIO_IO_OFFSET + 0x20, 1), 0);
}

#[test]
fn snapshot_restores_pre_reset_state() {
    init_tracing();
    let dev = create("secondary-riva128");
    let mut bar = build_mmio_bar(&dev).unwrap().unwrap();

    bar.write(RIVA128_MMIO_IO_OFFSET + 0x14, 2, 0x103F);
    bar.write(RIVA128_MMIO_IO_OFFSET + 0x14, 2, 0x5513);
    bar.write(RIVA128_MMIO_IO_OFFSET + 0x08, 1, 0x07);
    bar.write(RIVA128_MMIO_IO_OFFSET + 0x09, 1, 0x2A);
    {
        let mut d = dev.borrow_mut();
        d.vram_mut()[0x1234] = 0x99;
        d.set_big_endian_framebuffer(true);
    }

    let (saved, before_vga, before_ddc) = {
        let d = dev.borrow();
        (d.save_state(), d.vga().clone(), d.ddc())
    };

    {
        let mut d = dev.borrow_mut();
        d.reset();
        d.vram_mut()[0x1234] = 0;
        d.set_big_endian_framebuffer(false);
        assert_ne!(d.vga(), &before_vga);
    }

    dev.borrow_mut().load_state(&saved).unwrap();
    let d = dev.borrow();
    assert_eq!(d.vga(), &before_vga);
    assert_eq!(d.ddc(), before_ddc);
    assert!(d.ddc().data && !d.ddc().clock);
    assert_eq!(d.vga().crtc_regs()[0x13], 0x55);
    assert_eq!(d.vram()[0x1234], 0x99);
    assert!(d.big_endian_framebuffer());
}
