use proptest::prelude::*;
use riva128::{
    DdcLines, Riva128Config, Riva128Device, Riva128Variant, CRTC_DDC_READ_INDEX,
    CRTC_DDC_WRITE_INDEX,
};
use riva128::rom::MemoryRomSource;
use riva_vga::StandardVga;

const CRTC_INDEX: u16 = 0x14;
const CRTC_DATA: u16 = 0x15;

fn primary() -> Riva128Device {
    let cfg = Riva128Config {
        vram_size_mb: 1,
        ..Riva128Config::default()
    };
    Riva128Device::realize(Riva128Variant::Primary, cfg, &MemoryRomSource::new()).unwrap()
}

fn select(dev: &mut Riva128Device, index: u8) {
    dev.port_write(CRTC_INDEX, 1, u32::from(index));
}

fn observable(dev: &Riva128Device) -> (StandardVga, DdcLines) {
    (dev.vga().clone(), dev.ddc())
}

#[test]
fn drive_then_release_both_lines() {
    let mut dev = primary();

    select(&mut dev, CRTC_DDC_WRITE_INDEX);
    dev.port_write(CRTC_DATA, 1, 0x30);
    assert_eq!(
        dev.ddc(),
        DdcLines {
            clock: true,
            data: true
        }
    );
    select(&mut dev, CRTC_DDC_READ_INDEX);
    assert_eq!(dev.port_read(CRTC_DATA, 1), 0x0C);

    select(&mut dev, CRTC_DDC_WRITE_INDEX);
    dev.port_write(CRTC_DATA, 1, 0x00);
    assert_eq!(dev.ddc(), DdcLines::new());
    select(&mut dev, CRTC_DDC_READ_INDEX);
    assert_eq!(dev.port_read(CRTC_DATA, 1), 0x00);
}

#[test]
fn reset_releases_the_lines() {
    let mut dev = primary();
    dev.port_write(CRTC_INDEX, 2, 0x303F);
    assert_ne!(dev.ddc(), DdcLines::new());

    dev.reset();
    assert_eq!(dev.ddc(), DdcLines::new());
    assert_eq!(dev.vga(), &StandardVga::new());
}

proptest! {
    #[test]
    fn every_byte_latches_bits_five_and_four(v in any::<u8>()) {
        let mut dev = primary();
        select(&mut dev, CRTC_DDC_WRITE_INDEX);
        dev.port_write(CRTC_DATA, 1, u32::from(v));

        prop_assert_eq!(dev.ddc().clock, v & 0x20 != 0);
        prop_assert_eq!(dev.ddc().data, v & 0x10 != 0);

        select(&mut dev, CRTC_DDC_READ_INDEX);
        let sensed = dev.port_read(CRTC_DATA, 1);
        let expected = (u32::from(v & 0x10 != 0) << 3) | (u32::from(v & 0x20 != 0) << 2);
        prop_assert_eq!(sensed, expected);
        prop_assert_eq!(sensed & !0x0C, 0);

        // Sampling is side-effect free.
        prop_assert_eq!(dev.port_read(CRTC_DATA, 1), sensed);
    }

    #[test]
    fn word_write_matches_ordered_byte_writes(v in any::<u8>()) {
        let mut word = primary();
        word.port_write(CRTC_INDEX, 2, 0x3F | (u32::from(v) << 8));

        let mut bytes = primary();
        bytes.port_write(CRTC_INDEX, 1, 0x3F);
        bytes.port_write(CRTC_DATA, 1, u32::from(v));

        prop_assert_eq!(observable(&word), observable(&bytes));
    }

    #[test]
    fn reversed_byte_order_hits_the_previous_index(v in 1u8..) {
        let mut ordered = primary();
        ordered.port_write(CRTC_INDEX, 2, 0x3F | (u32::from(v) << 8));

        // Data first lands in CRTC register 0, the power-on index.
        let mut reversed = primary();
        reversed.port_write(CRTC_DATA, 1, u32::from(v));
        reversed.port_write(CRTC_INDEX, 1, 0x3F);

        prop_assert_eq!(reversed.vga().crtc_regs()[0], v);
        prop_assert_eq!(reversed.ddc(), DdcLines::new());
        prop_assert_ne!(observable(&ordered), observable(&reversed));
    }

    #[test]
    fn other_indices_never_touch_the_lines(index in any::<u8>(), v in any::<u8>()) {
        prop_assume!(index != CRTC_DDC_WRITE_INDEX);
        let mut dev = primary();
        select(&mut dev, CRTC_DDC_WRITE_INDEX);
        dev.port_write(CRTC_DATA, 1, 0x20);
        let before = dev.ddc();

        select(&mut dev, index);
        dev.port_write(CRTC_DATA, 1, u32::from(v));
        prop_assert_eq!(dev.ddc(), before);
    }

    #[test]
    fn unimplemented_indices_read_zero(index in 0x19u8..) {
        prop_assume!(index != CRTC_DDC_READ_INDEX);
        let mut dev = primary();
        select(&mut dev, index);
        dev.port_write(CRTC_DATA, 1, 0xFF);
        prop_assert_eq!(dev.port_read(CRTC_DATA, 1), 0);
    }
}
