use crate::{
    VgaCore, VgaDac, AC_REG_COUNT, CRTC_REG_COUNT, GC_REG_COUNT, PORT_AC_DATA_READ,
    PORT_AC_INDEX_DATA, PORT_CRTC_DATA_COLOR, PORT_CRTC_DATA_MONO, PORT_CRTC_INDEX_COLOR,
    PORT_CRTC_INDEX_MONO, PORT_DAC_DATA, PORT_DAC_PEL_MASK, PORT_DAC_STATE, PORT_DAC_WRITE_INDEX,
    PORT_FEATURE_CONTROL_READ, PORT_GC_DATA, PORT_GC_INDEX, PORT_INPUT_STATUS0,
    PORT_INPUT_STATUS1_COLOR, PORT_INPUT_STATUS1_MONO, PORT_MISC_OUTPUT_READ,
    PORT_MISC_OUTPUT_WRITE, PORT_SEQ_DATA, PORT_SEQ_INDEX, PORT_VIDEO_SUBSYSTEM_ENABLE,
    SEQ_REG_COUNT,
};

/// Misc Output at power-on: bit 0 set selects colour I/O decode (CRTC at `0x3D4/0x3D5`).
pub(crate) const POWER_ON_MISC_OUTPUT: u8 = 0x01;

/// Value returned by ports that are not decoded in the current I/O mode.
const UNDECODED_READ_VALUE: u8 = 0xFF;

/// Standard VGA register file.
///
/// Index registers are stored verbatim; data accesses at an index beyond the implemented
/// register count read as `0` and drop writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardVga {
    pub(crate) misc_output: u8,
    /// Video Subsystem Enable (port `0x3C3`). With bit 0 clear every other write is ignored.
    pub(crate) video_subsystem_enable: u8,
    pub(crate) feature_control: u8,

    pub(crate) seq_index: u8,
    pub(crate) seq: [u8; SEQ_REG_COUNT],

    pub(crate) gc_index: u8,
    pub(crate) gc: [u8; GC_REG_COUNT],

    pub(crate) crtc_index: u8,
    pub(crate) crtc: [u8; CRTC_REG_COUNT],

    pub(crate) ac_index: u8,
    pub(crate) ac: [u8; AC_REG_COUNT],
    /// Attribute controller address/data flip-flop (false = expecting index).
    pub(crate) ac_flip_flop_data: bool,
    pub(crate) ac_display_enabled: bool,

    /// Input Status 1 retrace bit; toggled on every status read so polling loops progress
    /// without a timing model.
    pub(crate) input_status1_vretrace: bool,

    pub(crate) dac: VgaDac,
}

impl Default for StandardVga {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardVga {
    pub fn new() -> Self {
        Self {
            misc_output: POWER_ON_MISC_OUTPUT,
            video_subsystem_enable: 0x01,
            feature_control: 0x00,
            seq_index: 0,
            seq: [0; SEQ_REG_COUNT],
            gc_index: 0,
            gc: [0; GC_REG_COUNT],
            crtc_index: 0,
            crtc: [0; CRTC_REG_COUNT],
            ac_index: 0,
            ac: [0; AC_REG_COUNT],
            ac_flip_flop_data: false,
            ac_display_enabled: false,
            input_status1_vretrace: false,
            dac: VgaDac::new(),
        }
    }

    pub fn misc_output(&self) -> u8 {
        self.misc_output
    }

    pub fn dac(&self) -> &VgaDac {
        &self.dac
    }

    pub fn crtc_regs(&self) -> &[u8; CRTC_REG_COUNT] {
        &self.crtc
    }

    pub fn seq_regs(&self) -> &[u8; SEQ_REG_COUNT] {
        &self.seq
    }

    pub fn gc_regs(&self) -> &[u8; GC_REG_COUNT] {
        &self.gc
    }

    pub fn ac_regs(&self) -> &[u8; AC_REG_COUNT] {
        &self.ac
    }

    fn is_colour_io(&self) -> bool {
        (self.misc_output & 0x01) != 0
    }

    /// `true` if `port` belongs to the CRTC/status block that the current I/O mode does not
    /// decode (0x3Bx in colour mode, 0x3Dx in mono mode).
    fn is_undecoded(&self, port: u16) -> bool {
        if self.is_colour_io() {
            (0x3B0..=0x3BF).contains(&port)
        } else {
            (0x3D0..=0x3DF).contains(&port)
        }
    }

    fn crtc_reg_write(&mut self, val: u8) {
        let idx = usize::from(self.crtc_index);
        // CRTC index 0x11 bit 7 write-protects registers 0..=7.
        if idx <= 0x07 && (self.crtc[0x11] & 0x80) != 0 {
            return;
        }
        if let Some(reg) = self.crtc.get_mut(idx) {
            *reg = val;
        }
    }
}

fn indexed_read(regs: &[u8], index: u8) -> u8 {
    regs.get(usize::from(index)).copied().unwrap_or(0)
}

fn indexed_write(regs: &mut [u8], index: u8, val: u8) {
    if let Some(reg) = regs.get_mut(usize::from(index)) {
        *reg = val;
    }
}

impl VgaCore for StandardVga {
    fn crtc_index(&self) -> u8 {
        self.crtc_index
    }

    fn read_u8(&mut self, port: u16) -> u8 {
        if self.is_undecoded(port) {
            return UNDECODED_READ_VALUE;
        }

        match port {
            PORT_AC_INDEX_DATA => {
                let display = if self.ac_display_enabled { 0x20 } else { 0x00 };
                display | (self.ac_index & 0x1F)
            }
            PORT_AC_DATA_READ => indexed_read(&self.ac, self.ac_index),
            PORT_INPUT_STATUS0 => 0x00,
            PORT_VIDEO_SUBSYSTEM_ENABLE => self.video_subsystem_enable,

            PORT_SEQ_INDEX => self.seq_index,
            PORT_SEQ_DATA => indexed_read(&self.seq, self.seq_index),

            PORT_DAC_PEL_MASK | PORT_DAC_STATE | PORT_DAC_WRITE_INDEX | PORT_DAC_DATA => {
                self.dac.port_read(port)
            }

            PORT_FEATURE_CONTROL_READ => self.feature_control,
            PORT_MISC_OUTPUT_READ => self.misc_output,

            PORT_GC_INDEX => self.gc_index,
            PORT_GC_DATA => indexed_read(&self.gc, self.gc_index),

            PORT_CRTC_INDEX_COLOR | PORT_CRTC_INDEX_MONO => self.crtc_index,
            PORT_CRTC_DATA_COLOR | PORT_CRTC_DATA_MONO => indexed_read(&self.crtc, self.crtc_index),

            PORT_INPUT_STATUS1_COLOR | PORT_INPUT_STATUS1_MONO => {
                // Input Status 1 read resets the attribute controller flip-flop.
                self.ac_flip_flop_data = false;
                self.input_status1_vretrace = !self.input_status1_vretrace;

                // Bit 3: vertical retrace. Bit 0: display enable (blanking).
                if self.input_status1_vretrace {
                    0x09
                } else {
                    0x00
                }
            }

            _ => {
                tracing::trace!("unimplemented VGA read at {port:#x}");
                UNDECODED_READ_VALUE
            }
        }
    }

    fn write_u8(&mut self, port: u16, val: u8) {
        if port != PORT_VIDEO_SUBSYSTEM_ENABLE && (self.video_subsystem_enable & 0x01) == 0 {
            return;
        }
        if self.is_undecoded(port) {
            return;
        }

        match port {
            PORT_AC_INDEX_DATA => {
                if !self.ac_flip_flop_data {
                    self.ac_display_enabled = (val & 0x20) != 0;
                    self.ac_index = val & 0x1F;
                } else {
                    indexed_write(&mut self.ac, self.ac_index, val);
                }
                self.ac_flip_flop_data = !self.ac_flip_flop_data;
            }
            PORT_MISC_OUTPUT_WRITE => self.misc_output = val,
            PORT_VIDEO_SUBSYSTEM_ENABLE => self.video_subsystem_enable = val,

            PORT_SEQ_INDEX => self.seq_index = val,
            PORT_SEQ_DATA => indexed_write(&mut self.seq, self.seq_index, val),

            0x3C6..=0x3C9 => self.dac.port_write(port, val),

            PORT_GC_INDEX => self.gc_index = val,
            PORT_GC_DATA => indexed_write(&mut self.gc, self.gc_index, val),

            PORT_CRTC_INDEX_COLOR | PORT_CRTC_INDEX_MONO => self.crtc_index = val,
            PORT_CRTC_DATA_COLOR | PORT_CRTC_DATA_MONO => self.crtc_reg_write(val),

            // Feature Control is written through the Input Status 1 address.
            PORT_INPUT_STATUS1_COLOR | PORT_INPUT_STATUS1_MONO => self.feature_control = val,

            _ => {
                tracing::trace!("unimplemented VGA write at {port:#x}: {val:#04x}");
            }
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
