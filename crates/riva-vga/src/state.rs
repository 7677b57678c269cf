use riva_platform::snapshot::{SnapshotReader, SnapshotResult, SnapshotWriter};

use crate::{StandardVga, VgaDac, AC_REG_COUNT, CRTC_REG_COUNT, GC_REG_COUNT, SEQ_REG_COUNT};

/// Plain register state of a [`StandardVga`], suitable for embedding in a device snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VgaCoreState {
    pub misc_output: u8,
    pub video_subsystem_enable: u8,
    pub feature_control: u8,

    pub sequencer_index: u8,
    pub sequencer: [u8; SEQ_REG_COUNT],

    pub graphics_index: u8,
    pub graphics: [u8; GC_REG_COUNT],

    pub crtc_index: u8,
    pub crtc: [u8; CRTC_REG_COUNT],

    pub attribute_index: u8,
    pub attribute: [u8; AC_REG_COUNT],
    pub attribute_flip_flop_data: bool,
    pub attribute_display_enabled: bool,
    pub input_status1_vretrace: bool,

    pub pel_mask: u8,
    pub dac_write_index: u8,
    pub dac_read_index: u8,
    pub dac_component_index: u8,
    pub dac_write_latch: [u8; 3],
    pub dac_read_mode: bool,
    /// 256 entries of 6-bit `[r, g, b]`.
    pub dac: [[u8; 3]; 256],
}

impl VgaCoreState {
    pub fn encode(&self, w: &mut SnapshotWriter) {
        w.u8(self.misc_output)
            .u8(self.video_subsystem_enable)
            .u8(self.feature_control);

        w.u8(self.sequencer_index).bytes(&self.sequencer);
        w.u8(self.graphics_index).bytes(&self.graphics);
        w.u8(self.crtc_index).bytes(&self.crtc);

        w.u8(self.attribute_index)
            .bytes(&self.attribute)
            .bool(self.attribute_flip_flop_data)
            .bool(self.attribute_display_enabled)
            .bool(self.input_status1_vretrace);

        w.u8(self.pel_mask)
            .u8(self.dac_write_index)
            .u8(self.dac_read_index)
            .u8(self.dac_component_index)
            .bytes(&self.dac_write_latch)
            .bool(self.dac_read_mode);
        for rgb in &self.dac {
            w.bytes(rgb);
        }
    }

    pub fn decode(r: &mut SnapshotReader<'_>) -> SnapshotResult<Self> {
        let misc_output = r.u8()?;
        let video_subsystem_enable = r.u8()?;
        let feature_control = r.u8()?;

        let sequencer_index = r.u8()?;
        let sequencer = r.array()?;
        let graphics_index = r.u8()?;
        let graphics = r.array()?;
        let crtc_index = r.u8()?;
        let crtc = r.array()?;

        let attribute_index = r.u8()?;
        let attribute = r.array()?;
        let attribute_flip_flop_data = r.bool()?;
        let attribute_display_enabled = r.bool()?;
        let input_status1_vretrace = r.bool()?;

        let pel_mask = r.u8()?;
        let dac_write_index = r.u8()?;
        let dac_read_index = r.u8()?;
        let dac_component_index = r.u8()?;
        let dac_write_latch = r.array()?;
        let dac_read_mode = r.bool()?;
        let mut dac = [[0u8; 3]; 256];
        for entry in &mut dac {
            *entry = r.array()?;
        }

        Ok(Self {
            misc_output,
            video_subsystem_enable,
            feature_control,
            sequencer_index,
            sequencer,
            graphics_index,
            graphics,
            crtc_index,
            crtc,
            attribute_index,
            attribute,
            attribute_flip_flop_data,
            attribute_display_enabled,
            input_status1_vretrace,
            pel_mask,
            dac_write_index,
            dac_read_index,
            dac_component_index,
            dac_write_latch,
            dac_read_mode,
            dac,
        })
    }
}

impl StandardVga {
    pub fn state(&self) -> VgaCoreState {
        VgaCoreState {
            misc_output: self.misc_output,
            video_subsystem_enable: self.video_subsystem_enable,
            feature_control: self.feature_control,
            sequencer_index: self.seq_index,
            sequencer: self.seq,
            graphics_index: self.gc_index,
            graphics: self.gc,
            crtc_index: self.crtc_index,
            crtc: self.crtc,
            attribute_index: self.ac_index,
            attribute: self.ac,
            attribute_flip_flop_data: self.ac_flip_flop_data,
            attribute_display_enabled: self.ac_display_enabled,
            input_status1_vretrace: self.input_status1_vretrace,
            pel_mask: self.dac.pel_mask,
            dac_write_index: self.dac.write_index,
            dac_read_index: self.dac.read_index,
            dac_component_index: self.dac.component_index,
            dac_write_latch: self.dac.write_latch,
            dac_read_mode: self.dac.read_mode,
            dac: self.dac.palette,
        }
    }

    pub fn restore_state(&mut self, state: &VgaCoreState) {
        self.misc_output = state.misc_output;
        self.video_subsystem_enable = state.video_subsystem_enable;
        self.feature_control = state.feature_control;

        self.seq_index = state.sequencer_index;
        self.seq = state.sequencer;
        self.gc_index = state.graphics_index;
        self.gc = state.graphics;
        self.crtc_index = state.crtc_index;
        self.crtc = state.crtc;

        self.ac_index = state.attribute_index;
        self.ac = state.attribute;
        self.ac_flip_flop_data = state.attribute_flip_flop_data;
        self.ac_display_enabled = state.attribute_display_enabled;
        self.input_status1_vretrace = state.input_status1_vretrace;

        self.dac = VgaDac {
            palette: state.dac,
            pel_mask: state.pel_mask,
            write_index: state.dac_write_index,
            read_index: state.dac_read_index,
            // Out-of-range values can only come from a hand-built state; clamp to a valid phase.
            component_index: state.dac_component_index % 3,
            write_latch: state.dac_write_latch,
            read_mode: state.dac_read_mode,
        };
    }
}
