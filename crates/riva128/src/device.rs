use std::fmt;

use riva_vga::{StandardVga, VgaCore};

use crate::config::Riva128Config;
use crate::ddc::DdcLines;
use crate::decoder::{Riva128PortDecoder, RIVA128_IO_BASE, RIVA128_IO_LEN};
use crate::error::{Result, Riva128Error};
use crate::pci::{
    PciBarDefinition, PciProfile, MMIO_BAR_INDEX, PCI_CLASS_DISPLAY_OTHER, PCI_CLASS_DISPLAY_VGA,
    RIVA128_PCI_DEVICE_ID, RIVA128_PCI_VENDOR_ID, VRAM_BAR_INDEX,
};
use crate::rom::{load_option_rom, OptionRom, RomSource};

/// Offset of the legacy port alias inside the MMIO BAR.
pub const RIVA128_MMIO_IO_OFFSET: u64 = 0x400;
/// Size of the MMIO BAR (BAR1).
pub const RIVA128_MMIO_SIZE: u32 = 0x100_0000;

/// Bochs VBE index/data ports, used when the primary adapter has no ROM BAR.
pub const VBE_DISPI_IO_START: u16 = 0x1CE;
pub const VBE_DISPI_IO_LEN: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Riva128Variant {
    /// Boot display: owns the legacy VGA ports and carries the option ROM.
    Primary,
    /// Additional display: reachable only through its PCI BARs.
    Secondary,
}

impl Riva128Variant {
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Primary => "riva128",
            Self::Secondary => "secondary-riva128",
        }
    }

    pub const fn class_code(self) -> u16 {
        match self {
            Self::Primary => PCI_CLASS_DISPLAY_VGA,
            Self::Secondary => PCI_CLASS_DISPLAY_OTHER,
        }
    }

    pub const fn hotpluggable(self) -> bool {
        matches!(self, Self::Secondary)
    }

    pub(crate) const fn tag(self) -> u8 {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortWindow {
    pub start: u16,
    pub len: u16,
}

/// Host resources a realized adapter expects to be wired up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePlan {
    /// Legacy VGA window `0x3C0..=0x3DF` (primary only).
    pub legacy_io: Option<PortWindow>,
    /// Bochs VBE window, requested when the primary adapter has its ROM BAR disabled.
    pub vbe_io: Option<PortWindow>,
    /// Whether BAR1 (MMIO, with the port alias at [`RIVA128_MMIO_IO_OFFSET`]) is exposed.
    pub mmio_bar: bool,
}

/// A realized RIVA 128 adapter.
///
/// Construction is realization; dropping the value destroys it. The host is responsible
/// for releasing whatever it mapped from [`Self::resources`].
pub struct Riva128Device {
    pub(crate) variant: Riva128Variant,
    pub(crate) config: Riva128Config,
    pub(crate) vga: StandardVga,
    pub(crate) ddc: DdcLines,
    pub(crate) vram: Vec<u8>,
    pub(crate) rom: Option<OptionRom>,
    pub(crate) resources: ResourcePlan,
    pub(crate) big_endian_framebuffer: bool,
}

impl fmt::Debug for Riva128Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Riva128Device")
            .field("variant", &self.variant)
            .field("config", &self.config)
            .field("ddc", &self.ddc)
            .field("vram_len", &self.vram.len())
            .field("rom", &self.rom.as_ref().map(OptionRom::name))
            .field("resources", &self.resources)
            .field("big_endian_framebuffer", &self.big_endian_framebuffer)
            .finish_non_exhaustive()
    }
}

impl Riva128Device {
    pub fn realize(
        variant: Riva128Variant,
        config: Riva128Config,
        roms: &dyn RomSource,
    ) -> Result<Self> {
        let dev = match variant {
            Riva128Variant::Primary => realize_primary(config, roms)?,
            Riva128Variant::Secondary => realize_secondary(config)?,
        };
        tracing::debug!(
            "realized {} with {} MiB VRAM, resources {:?}",
            variant.type_name(),
            dev.vram.len() >> 20,
            dev.resources
        );
        Ok(dev)
    }

    pub fn variant(&self) -> Riva128Variant {
        self.variant
    }

    pub fn config(&self) -> &Riva128Config {
        &self.config
    }

    pub fn resources(&self) -> &ResourcePlan {
        &self.resources
    }

    pub fn vga(&self) -> &StandardVga {
        &self.vga
    }

    pub fn ddc(&self) -> DdcLines {
        self.ddc
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    pub fn vram_mut(&mut self) -> &mut [u8] {
        &mut self.vram
    }

    pub fn rom(&self) -> Option<&OptionRom> {
        self.rom.as_ref()
    }

    /// Advisory framebuffer byte order for display backends. The decoder ignores it.
    pub fn big_endian_framebuffer(&self) -> bool {
        self.big_endian_framebuffer
    }

    pub fn set_big_endian_framebuffer(&mut self, value: bool) {
        self.big_endian_framebuffer = value;
    }

    pub fn pci_profile(&self) -> PciProfile {
        let mut bars = vec![(
            VRAM_BAR_INDEX,
            PciBarDefinition::Mmio32 {
                size: self.vram.len() as u32,
                prefetchable: true,
            },
        )];
        if self.resources.mmio_bar {
            bars.push((
                MMIO_BAR_INDEX,
                PciBarDefinition::Mmio32 {
                    size: RIVA128_MMIO_SIZE,
                    prefetchable: false,
                },
            ));
        }

        let rom_bar_size = match (&self.rom, self.config.rom_bar) {
            (Some(rom), true) => Some(rom.bar_size()),
            _ => None,
        };

        PciProfile {
            vendor_id: RIVA128_PCI_VENDOR_ID,
            device_id: RIVA128_PCI_DEVICE_ID,
            class_code: self.variant.class_code(),
            bars,
            rom_bar_size,
        }
    }

    /// Legacy port read at `offset` from `0x3C0`.
    pub fn port_read(&mut self, offset: u16, size: u8) -> u32 {
        Riva128PortDecoder::new(&mut self.vga, &mut self.ddc).read(offset, size)
    }

    /// Legacy port write at `offset` from `0x3C0`.
    pub fn port_write(&mut self, offset: u16, size: u8, value: u32) {
        Riva128PortDecoder::new(&mut self.vga, &mut self.ddc).write(offset, size, value)
    }

    /// Little-endian VRAM read. Accesses past the end, or wider than 8 bytes, read 0.
    pub fn vram_read(&self, offset: u64, size: usize) -> u64 {
        let Some(bytes) = vram_span(&self.vram, offset, size) else {
            return 0;
        };
        let mut buf = [0u8; 8];
        buf[..size].copy_from_slice(bytes);
        u64::from_le_bytes(buf)
    }

    pub fn vram_write(&mut self, offset: u64, size: usize, value: u64) {
        let Some(bytes) = vram_span_mut(&mut self.vram, offset, size) else {
            return;
        };
        bytes.copy_from_slice(&value.to_le_bytes()[..size]);
    }

    /// Device reset: VGA registers return to power-on values and both DDC lines drop.
    pub fn reset(&mut self) {
        tracing::debug!("resetting {}", self.variant.type_name());
        self.vga.reset();
        self.ddc.reset();
    }
}

fn vram_range(len: usize, offset: u64, size: usize) -> Option<std::ops::Range<usize>> {
    if size == 0 || size > 8 {
        return None;
    }
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(size).filter(|&end| end <= len)?;
    Some(start..end)
}

fn vram_span(vram: &[u8], offset: u64, size: usize) -> Option<&[u8]> {
    let range = vram_range(vram.len(), offset, size)?;
    Some(&vram[range])
}

fn vram_span_mut(vram: &mut [u8], offset: u64, size: usize) -> Option<&mut [u8]> {
    let range = vram_range(vram.len(), offset, size)?;
    Some(&mut vram[range])
}

fn allocate_vram(size: usize) -> Result<Vec<u8>> {
    let mut vram = Vec::new();
    vram.try_reserve_exact(size)
        .map_err(|_| Riva128Error::VramAllocation { size })?;
    vram.resize(size, 0);
    Ok(vram)
}

fn allocate_common(variant: Riva128Variant, config: &Riva128Config) -> Result<Riva128Device> {
    if config.effective_vram_size_mb() != config.vram_size_mb {
        tracing::warn!(
            "{} MiB VRAM requested, using {} MiB",
            config.vram_size_mb,
            config.effective_vram_size_mb()
        );
    }
    Ok(Riva128Device {
        variant,
        config: config.clone(),
        vga: StandardVga::new(),
        ddc: DdcLines::new(),
        vram: allocate_vram(config.vram_size_bytes())?,
        rom: None,
        resources: ResourcePlan {
            legacy_io: None,
            vbe_io: None,
            mmio_bar: true,
        },
        big_endian_framebuffer: false,
    })
}

fn realize_primary(config: Riva128Config, roms: &dyn RomSource) -> Result<Riva128Device> {
    let mut dev = allocate_common(Riva128Variant::Primary, &config)?;

    if config.rom_enabled() {
        dev.rom = match load_option_rom(roms, &config.rom_file)? {
            Some(rom) => Some(rom),
            None if config.uses_default_rom() => {
                tracing::warn!(
                    "default option ROM {} not found, continuing without",
                    config.rom_file
                );
                None
            }
            None => {
                return Err(Riva128Error::RomNotFound {
                    name: config.rom_file,
                })
            }
        };
    }

    dev.resources = ResourcePlan {
        legacy_io: Some(PortWindow {
            start: RIVA128_IO_BASE,
            len: RIVA128_IO_LEN,
        }),
        vbe_io: (!config.rom_bar).then_some(PortWindow {
            start: VBE_DISPI_IO_START,
            len: VBE_DISPI_IO_LEN,
        }),
        mmio_bar: config.mmio,
    };
    Ok(dev)
}

fn realize_secondary(config: Riva128Config) -> Result<Riva128Device> {
    if config.rom_enabled() && !config.uses_default_rom() {
        tracing::warn!("secondary adapter has no option ROM, ignoring {}", config.rom_file);
    }
    if !config.mmio {
        tracing::warn!("secondary adapter always exposes its MMIO BAR, ignoring mmio=false");
    }
    allocate_common(Riva128Variant::Secondary, &config)
}
