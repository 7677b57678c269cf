use thiserror::Error;

pub trait PortIoDevice {
    fn read(&mut self, port: u16, size: u8) -> u32;
    fn write(&mut self, port: u16, size: u8, value: u32);

    /// Reset the device back to its power-on state.
    fn reset(&mut self) {}
}

/// Rejected attempt to claim a port range.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PortRangeError {
    #[error("I/O port range must be non-empty")]
    Empty,

    #[error("I/O port range wraps past 0xFFFF: start={start:#x} len={len:#x}")]
    Wraps { start: u16, len: u16 },

    #[error("I/O port range [{start:#x}..{end:#x}) overlaps claimed range [{owner_start:#x}..{owner_end:#x})")]
    Overlap {
        start: u16,
        end: u32,
        owner_start: u16,
        owner_end: u32,
    },
}

struct RangeDevice {
    start: u16,
    len: u16,
    dev: Box<dyn PortIoDevice>,
}

impl RangeDevice {
    fn end_exclusive(&self) -> u32 {
        u32::from(self.start) + u32::from(self.len)
    }

    fn contains(&self, port: u16) -> bool {
        let p = u32::from(port);
        p >= u32::from(self.start) && p < self.end_exclusive()
    }
}

/// x86 port I/O dispatcher.
///
/// Ranges are claimed exclusively: a second claim over any already-owned port is rejected,
/// which is how the host enforces single ownership of fixed legacy windows such as `0x3C0..=0x3DF`.
pub struct IoPortBus {
    ranges: Vec<RangeDevice>,
}

impl IoPortBus {
    pub fn new() -> Self {
        Self {
            ranges: Vec::new(),
        }
    }

    /// Returns `true` if any port in `start..start + len` is owned by a range device.
    pub fn is_range_claimed(&self, start: u16, len: u16) -> bool {
        let end = u32::from(start) + u32::from(len);
        self.ranges
            .iter()
            .any(|r| u32::from(start) < r.end_exclusive() && u32::from(r.start) < end)
    }

    /// Claims a contiguous I/O port range for a single device.
    pub fn register_range(
        &mut self,
        start: u16,
        len: u16,
        dev: Box<dyn PortIoDevice>,
    ) -> Result<(), PortRangeError> {
        if len == 0 {
            return Err(PortRangeError::Empty);
        }

        let end_exclusive = u32::from(start) + u32::from(len);
        if end_exclusive > 0x1_0000 {
            return Err(PortRangeError::Wraps { start, len });
        }

        let idx = self.ranges.partition_point(|r| r.start < start);

        let neighbours = [idx.checked_sub(1), Some(idx)];
        for owner in neighbours.into_iter().flatten() {
            let Some(owner) = self.ranges.get(owner) else {
                continue;
            };
            if u32::from(start) < owner.end_exclusive() && u32::from(owner.start) < end_exclusive {
                return Err(PortRangeError::Overlap {
                    start,
                    end: end_exclusive,
                    owner_start: owner.start,
                    owner_end: owner.end_exclusive(),
                });
            }
        }

        tracing::debug!("claimed I/O port range {start:#x}..{end_exclusive:#x}");
        self.ranges.insert(idx, RangeDevice { start, len, dev });
        Ok(())
    }

    /// Releases a range previously claimed via [`Self::register_range`].
    ///
    /// Returns the removed device if a range exactly matching `(start, len)` exists.
    pub fn unregister_range_device(
        &mut self,
        start: u16,
        len: u16,
    ) -> Option<Box<dyn PortIoDevice>> {
        let idx = self.ranges.partition_point(|r| r.start < start);
        let cand = self.ranges.get(idx)?;
        if cand.start != start || cand.len != len {
            return None;
        }
        Some(self.ranges.remove(idx).dev)
    }

    fn find_range_index(&self, port: u16) -> Option<usize> {
        let idx = self.ranges.partition_point(|r| r.start <= port);
        let cand = idx.checked_sub(1)?;
        self.ranges
            .get(cand)
            .is_some_and(|r| r.contains(port))
            .then_some(cand)
    }

    fn device_for(&mut self, port: u16) -> Option<&mut Box<dyn PortIoDevice>> {
        let idx = self.find_range_index(port)?;
        self.ranges.get_mut(idx).map(|r| &mut r.dev)
    }

    pub fn read(&mut self, port: u16, size: u8) -> u32 {
        if size == 0 {
            return 0;
        }

        // Only {1,2,4} are representable by x86 IN/OUT; anything else floats high.
        if !matches!(size, 1 | 2 | 4) {
            return 0xFFFF_FFFF;
        }

        match self.device_for(port) {
            Some(dev) => dev.read(port, size),
            None => all_ones(size),
        }
    }

    pub fn write(&mut self, port: u16, size: u8, value: u32) {
        if !matches!(size, 1 | 2 | 4) {
            return;
        }
        if let Some(dev) = self.device_for(port) {
            dev.write(port, size, value);
        }
    }

    pub fn read_u8(&mut self, port: u16) -> u8 {
        self.read(port, 1) as u8
    }

    pub fn write_u8(&mut self, port: u16, value: u8) {
        self.write(port, 1, u32::from(value));
    }

    pub fn reset(&mut self) {
        for range in self.ranges.iter_mut() {
            range.dev.reset();
        }
    }
}

impl Default for IoPortBus {
    fn default() -> Self {
        Self::new()
    }
}

fn all_ones(size: u8) -> u32 {
    match size {
        1 => 0xFF,
        2 => 0xFFFF,
        _ => 0xFFFF_FFFF,
    }
}
