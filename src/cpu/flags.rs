/*
    nascom2: a NASCOM-2 microcomputer emulator for the terminal.

    For the full copyright notice, see the lib.rs file.
*/
//! Flag register bit definitions and helpers.
use bitflags::bitflags;

bitflags! {
    /// The Z80 flag register F, the low half of the AF pair.
    #[derive(Default)]
    pub struct CpuFlags: u8 {
        /// Sign: a copy of result bit 7.
        const S  = 0b1000_0000;
        /// Zero.
        const Z  = 0b0100_0000;
        /// Undocumented copy of result bit 5.
        const Y  = 0b0010_0000;
        /// Half carry: carry out of bit 3.
        const H  = 0b0001_0000;
        /// Undocumented copy of result bit 3.
        const X  = 0b0000_1000;
        /// Parity (logical ops) or signed overflow (arithmetic).
        const PV = 0b0000_0100;
        /// The last operation was a subtract.
        const N  = 0b0000_0010;
        /// Carry.
        const C  = 0b0000_0001;
        /// An alias of [CpuFlags::PV].
        const P  = Self::PV.bits;
        /// An alias of [CpuFlags::PV].
        const V  = Self::PV.bits;
        /// Both undocumented bits. [CpuFlags::X] | [CpuFlags::Y].
        const XY = Self::X.bits | Self::Y.bits;
    }
}

impl CpuFlags {
    /// Returns the Sign flag.
    #[inline]
    pub fn sf(self) -> bool {
        self.contains(CpuFlags::S)
    }

    /// Returns the Zero flag.
    #[inline]
    pub fn zf(self) -> bool {
        self.contains(CpuFlags::Z)
    }

    /// Returns the Half Carry flag.
    #[inline]
    pub fn hf(self) -> bool {
        self.contains(CpuFlags::H)
    }

    /// Returns the Parity/Overflow flag.
    #[inline]
    pub fn pvf(self) -> bool {
        self.contains(CpuFlags::PV)
    }

    /// Returns the Add/Subtract flag.
    #[inline]
    pub fn nf(self) -> bool {
        self.contains(CpuFlags::N)
    }

    /// Returns the Carry flag.
    #[inline]
    pub fn cf(self) -> bool {
        self.contains(CpuFlags::C)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_bits_match_the_f_register_layout() {
        assert_eq!(CpuFlags::S.bits(), 0x80);
        assert_eq!(CpuFlags::Z.bits(), 0x40);
        assert_eq!(CpuFlags::Y.bits(), 0x20);
        assert_eq!(CpuFlags::H.bits(), 0x10);
        assert_eq!(CpuFlags::X.bits(), 0x08);
        assert_eq!(CpuFlags::PV.bits(), 0x04);
        assert_eq!(CpuFlags::N.bits(), 0x02);
        assert_eq!(CpuFlags::C.bits(), 0x01);
        assert_eq!(CpuFlags::P, CpuFlags::V);
        assert_eq!(CpuFlags::XY, CpuFlags::X | CpuFlags::Y);
    }

    #[test]
    fn flag_accessors() {
        let mut flags = CpuFlags::empty();
        assert!(!flags.cf());
        flags.set(CpuFlags::C, true);
        assert!(flags.cf());
        flags.set(CpuFlags::C, false);
        assert!(!flags.cf());
        flags.insert(CpuFlags::S | CpuFlags::Z | CpuFlags::H | CpuFlags::PV | CpuFlags::N);
        assert!(flags.sf());
        assert!(flags.zf());
        assert!(flags.hf());
        assert!(flags.pvf());
        assert!(flags.nf());
        assert_eq!(CpuFlags::all().bits(), 0xFF);
    }
}
