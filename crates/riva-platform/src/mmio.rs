//! Memory-mapped I/O handlers and fixed-layout containers.
//!
//! A PCI BAR is modelled as an [`MmioContainer`]: a sized window with zero or more
//! non-overlapping subregions, each backed by its own [`MmioHandler`]. Offsets handed to a
//! subregion handler are relative to the subregion start, so the same handler can be mapped
//! behind several windows without knowing where it lives.

use thiserror::Error;

pub trait MmioHandler {
    fn read(&mut self, offset: u64, size: usize) -> u64;
    fn write(&mut self, offset: u64, size: usize, value: u64);
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MmioLayoutError {
    #[error("subregion [{offset:#x}..+{len:#x}) does not fit in a {size:#x} byte container")]
    OutOfBounds { offset: u64, len: u64, size: u64 },

    #[error("subregion [{offset:#x}..+{len:#x}) overlaps an existing subregion")]
    Overlap { offset: u64, len: u64 },

    #[error("subregion length must be non-zero")]
    Empty,
}

struct Subregion {
    offset: u64,
    len: u64,
    handler: Box<dyn MmioHandler>,
}

impl Subregion {
    fn end(&self) -> u64 {
        self.offset + self.len
    }
}

/// A sized MMIO window composed of subregions.
///
/// Accesses that do not land entirely inside a subregion read as zero and drop writes.
pub struct MmioContainer {
    name: &'static str,
    size: u64,
    subregions: Vec<Subregion>,
}

impl MmioContainer {
    pub fn new(name: &'static str, size: u64) -> Self {
        Self {
            name,
            size,
            subregions: Vec::new(),
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn add_subregion(
        &mut self,
        name: &'static str,
        offset: u64,
        len: u64,
        handler: Box<dyn MmioHandler>,
    ) -> Result<(), MmioLayoutError> {
        if len == 0 {
            return Err(MmioLayoutError::Empty);
        }
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= self.size)
            .ok_or(MmioLayoutError::OutOfBounds {
                offset,
                len,
                size: self.size,
            })?;
        if self
            .subregions
            .iter()
            .any(|r| offset < r.end() && r.offset < end)
        {
            return Err(MmioLayoutError::Overlap { offset, len });
        }

        tracing::debug!(
            container = self.name,
            subregion = name,
            "mapped subregion {offset:#x}..{end:#x}"
        );
        let idx = self.subregions.partition_point(|r| r.offset < offset);
        self.subregions.insert(
            idx,
            Subregion {
                offset,
                len,
                handler,
            },
        );
        Ok(())
    }

    fn route(&mut self, offset: u64, size: usize) -> Option<(&mut Subregion, u64)> {
        let end = offset.checked_add(size as u64)?;
        let idx = self.subregions.partition_point(|r| r.offset <= offset);
        let region = self.subregions.get_mut(idx.checked_sub(1)?)?;
        if end > region.end() {
            return None;
        }
        let rel = offset - region.offset;
        Some((region, rel))
    }
}

impl MmioHandler for MmioContainer {
    fn read(&mut self, offset: u64, size: usize) -> u64 {
        if size == 0 {
            return 0;
        }
        match self.route(offset, size) {
            Some((region, rel)) => region.handler.read(rel, size),
            None => {
                tracing::trace!(container = self.name, offset, size, "unassigned MMIO read");
                0
            }
        }
    }

    fn write(&mut self, offset: u64, size: usize, value: u64) {
        if size == 0 {
            return;
        }
        match self.route(offset, size) {
            Some((region, rel)) => region.handler.write(rel, size, value),
            None => {
                tracing::trace!(container = self.name, offset, size, "unassigned MMIO write");
            }
        }
    }
}
