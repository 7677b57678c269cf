//! Option ROM lookup and sizing.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use crate::error::{Result, Riva128Error};

/// PCI expansion ROM BARs cannot exceed 16 MiB.
pub const MAX_ROM_SIZE: usize = 16 * 1024 * 1024;

/// Resolves option ROM file names to their contents.
pub trait RomSource {
    /// Returns `Ok(None)` if `name` does not exist.
    fn load(&self, name: &str) -> io::Result<Option<Vec<u8>>>;

    /// Where `name` would be read from, for error reporting.
    fn describe(&self, name: &str) -> PathBuf {
        PathBuf::from(name)
    }
}

/// Searches a list of directories in order.
#[derive(Debug, Clone, Default)]
pub struct DirRomSource {
    search_path: Vec<PathBuf>,
}

impl DirRomSource {
    pub fn new(search_path: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            search_path: search_path.into_iter().collect(),
        }
    }
}

impl RomSource for DirRomSource {
    fn load(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        for dir in &self.search_path {
            match std::fs::read(dir.join(name)) {
                Ok(bytes) => return Ok(Some(bytes)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }

    fn describe(&self, name: &str) -> PathBuf {
        self.search_path
            .first()
            .map_or_else(|| PathBuf::from(name), |dir| dir.join(name))
    }
}

/// In-memory ROM images keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct MemoryRomSource {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryRomSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.images.insert(name.into(), bytes);
        self
    }
}

impl RomSource for MemoryRomSource {
    fn load(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.images.get(name).cloned())
    }
}

/// An option ROM image padded with zeros to a power-of-two size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRom {
    name: String,
    image: Vec<u8>,
}

impl OptionRom {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Size of the expansion ROM BAR.
    pub fn bar_size(&self) -> u32 {
        self.image.len() as u32
    }

    pub(crate) fn from_image(name: &str, mut image: Vec<u8>) -> Result<Self> {
        if image.len() > MAX_ROM_SIZE {
            return Err(Riva128Error::RomTooLarge {
                name: name.to_string(),
                len: image.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let padded = image.len().max(1).next_power_of_two();
        image.resize(padded, 0);
        Ok(Self {
            name: name.to_string(),
            image,
        })
    }
}

/// Loads `name` through `roms`. `Ok(None)` means the file is absent.
pub(crate) fn load_option_rom(roms: &dyn RomSource, name: &str) -> Result<Option<OptionRom>> {
    let bytes = roms.load(name).map_err(|source| Riva128Error::RomRead {
        path: roms.describe(name),
        source,
    })?;
    bytes.map(|image| OptionRom::from_image(name, image)).transpose()
}
