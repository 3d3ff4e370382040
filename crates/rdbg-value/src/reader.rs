//! Seam between the value decoder and whatever owns the byte-addressable memory.
//!
//! The decoder never touches a concrete address space directly; it is
//! generic over anything that can answer these four questions, so the
//! protocol server's sparse `AddressSpace` (and, in tests, a plain
//! `HashMap`-backed stand-in) both work unmodified.

/// Little-endian byte-addressable memory, as seen by the value decoder.
///
/// Implementations must never panic on out-of-range addresses: the spec
/// treats absent bytes as zero (§4.2), and the decoder relies on that to
/// stay total over hostile artifacts.
pub trait MemoryReader {
    fn read_u8(&self, addr: u64) -> u8;

    fn read_u32(&self, addr: u64) -> u32 {
        let mut bytes = [0u8; 4];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = self.read_u8(addr + i as u64);
        }
        u32::from_le_bytes(bytes)
    }

    fn read_u64(&self, addr: u64) -> u64 {
        let mut bytes = [0u8; 8];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = self.read_u8(addr + i as u64);
        }
        u64::from_le_bytes(bytes)
    }

    /// Read up to `max` bytes, stopping at the first NUL byte (exclusive).
    fn read_cstring(&self, addr: u64, max: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(max.min(64));
        for i in 0..max as u64 {
            let b = self.read_u8(addr + i);
            if b == 0 {
                break;
            }
            out.push(b);
        }
        out
    }
}
