use serde::{Deserialize, Serialize};

/// Option ROM looked up for the primary adapter when none is configured.
pub const DEFAULT_ROM_FILE: &str = "riva128bios.bin";

pub const DEFAULT_VRAM_SIZE_MB: u32 = 4;
/// Largest VRAM size accepted; bigger requests are clamped.
pub const MAX_VRAM_SIZE_MB: u32 = 512;

/// Construction-time configuration shared by both adapter variants.
///
/// Field names on the wire match the device properties a machine description uses, so a
/// config can be loaded straight from JSON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Riva128Config {
    /// VRAM size in MiB. Rounded up to a power of two and clamped to `1..=512`.
    #[serde(rename = "riva128mem_mb")]
    pub vram_size_mb: u32,

    /// Expose the MMIO BAR (BAR1). Only the primary variant honours `false`.
    pub mmio: bool,

    /// Option ROM file name. An empty string disables the ROM. Primary variant only.
    #[serde(rename = "romfile")]
    pub rom_file: String,

    /// Map the option ROM through the PCI expansion ROM BAR. With `false`, the primary
    /// variant falls back to the legacy VBE I/O window instead.
    #[serde(rename = "rombar")]
    pub rom_bar: bool,
}

impl Default for Riva128Config {
    fn default() -> Self {
        Self {
            vram_size_mb: DEFAULT_VRAM_SIZE_MB,
            mmio: true,
            rom_file: DEFAULT_ROM_FILE.to_string(),
            rom_bar: true,
        }
    }
}

impl Riva128Config {
    /// The VRAM size actually allocated, in MiB.
    pub fn effective_vram_size_mb(&self) -> u32 {
        self.vram_size_mb
            .clamp(1, MAX_VRAM_SIZE_MB)
            .next_power_of_two()
    }

    pub fn vram_size_bytes(&self) -> usize {
        self.effective_vram_size_mb() as usize * 1024 * 1024
    }

    pub fn rom_enabled(&self) -> bool {
        !self.rom_file.is_empty()
    }

    pub(crate) fn uses_default_rom(&self) -> bool {
        self.rom_file == DEFAULT_ROM_FILE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_uses_device_property_names() {
        let cfg: Riva128Config =
            serde_json::from_str(r#"{ "riva128mem_mb": 16, "mmio": false }"#).unwrap();
        assert_eq!(
            cfg,
            Riva128Config {
                vram_size_mb: 16,
                mmio: false,
                ..Riva128Config::default()
            }
        );

        let json = serde_json::to_value(Riva128Config::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "riva128mem_mb": 4,
                "mmio": true,
                "romfile": "riva128bios.bin",
                "rombar": true
            })
        );
    }

    #[test]
    fn vram_size_is_clamped_and_rounded() {
        let size = |mb| {
            Riva128Config {
                vram_size_mb: mb,
                ..Riva128Config::default()
            }
            .effective_vram_size_mb()
        };
        assert_eq!(size(0), 1);
        assert_eq!(size(4), 4);
        assert_eq!(size(5), 8);
        assert_eq!(size(4096), 512);
    }
}
