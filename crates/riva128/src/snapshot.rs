use riva_platform::snapshot::{
    IoSnapshot, SnapshotError, SnapshotReader, SnapshotResult, SnapshotVersion, SnapshotWriter,
};
use riva_vga::VgaCoreState;

use crate::ddc::DdcLines;
use crate::device::Riva128Device;

// Payload layout (after the common header):
//   variant tag, VGA core state, DDC clock, DDC data, big-endian flag, VRAM blob.
impl IoSnapshot for Riva128Device {
    const DEVICE_ID: [u8; 4] = *b"R128";
    const DEVICE_VERSION: SnapshotVersion = SnapshotVersion::new(2, 0);

    fn save_state(&self) -> Vec<u8> {
        let mut w = SnapshotWriter::new(Self::DEVICE_ID, Self::DEVICE_VERSION);
        w.u8(self.variant.tag());
        self.vga.state().encode(&mut w);
        w.bool(self.ddc.clock)
            .bool(self.ddc.data)
            .bool(self.big_endian_framebuffer)
            .blob(&self.vram);
        w.finish()
    }

    fn load_state(&mut self, bytes: &[u8]) -> SnapshotResult<()> {
        let mut r = SnapshotReader::new(bytes, Self::DEVICE_ID, Self::DEVICE_VERSION)?;

        if r.u8()? != self.variant.tag() {
            return Err(SnapshotError::Corrupt("adapter variant mismatch"));
        }
        let vga = VgaCoreState::decode(&mut r)?;
        let ddc = DdcLines {
            clock: r.bool()?,
            data: r.bool()?,
        };
        let big_endian_framebuffer = r.bool()?;
        let vram = r.blob(self.vram.len())?;
        if vram.len() != self.vram.len() {
            return Err(SnapshotError::Corrupt("VRAM size mismatch"));
        }
        r.finish()?;

        self.vga.restore_state(&vga);
        self.ddc = ddc;
        self.big_endian_framebuffer = big_endian_framebuffer;
        self.vram.copy_from_slice(vram);
        Ok(())
    }
}
