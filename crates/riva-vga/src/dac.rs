/// VGA DAC: PEL mask, address registers and the 256-entry 6-bit palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VgaDac {
    pub(crate) palette: [[u8; 3]; 256],
    pub(crate) pel_mask: u8,
    pub(crate) write_index: u8,
    pub(crate) read_index: u8,
    pub(crate) component_index: u8,
    pub(crate) write_latch: [u8; 3],
    /// `true` after a write to `0x3C7` (read mode), `false` after `0x3C8`.
    pub(crate) read_mode: bool,
}

impl Default for VgaDac {
    fn default() -> Self {
        Self::new()
    }
}

impl VgaDac {
    pub fn new() -> Self {
        Self {
            palette: [[0u8; 3]; 256],
            pel_mask: 0xFF,
            write_index: 0,
            read_index: 0,
            component_index: 0,
            write_latch: [0; 3],
            read_mode: false,
        }
    }

    #[inline]
    pub fn pel_mask(&self) -> u8 {
        self.pel_mask
    }

    #[inline]
    pub fn palette(&self) -> &[[u8; 3]; 256] {
        &self.palette
    }

    pub fn port_write(&mut self, port: u16, value: u8) {
        match port {
            0x3C6 => self.pel_mask = value,
            0x3C7 => {
                self.read_index = value;
                self.component_index = 0;
                self.read_mode = true;
            }
            0x3C8 => {
                self.write_index = value;
                self.component_index = 0;
                self.read_mode = false;
            }
            0x3C9 => self.write_data(value),
            _ => {}
        }
    }

    pub fn port_read(&mut self, port: u16) -> u8 {
        match port {
            0x3C6 => self.pel_mask,
            // DAC state: 0b11 in read mode, 0b00 in write mode.
            0x3C7 => {
                if self.read_mode {
                    0x03
                } else {
                    0x00
                }
            }
            0x3C8 => self.write_index,
            0x3C9 => self.read_data(),
            _ => 0xFF,
        }
    }

    fn write_data(&mut self, value: u8) {
        let component = usize::from(self.component_index % 3);
        self.write_latch[component] = value & 0x3F;
        self.component_index += 1;
        if self.component_index < 3 {
            return;
        }

        self.palette[usize::from(self.write_index)] = self.write_latch;
        self.write_index = self.write_index.wrapping_add(1);
        self.component_index = 0;
    }

    fn read_data(&mut self) -> u8 {
        let component = usize::from(self.component_index % 3);
        let out = self.palette[usize::from(self.read_index)][component];
        self.component_index += 1;
        if self.component_index >= 3 {
            self.component_index = 0;
            self.read_index = self.read_index.wrapping_add(1);
        }
        out
    }
}
