/*
    nascom2: a NASCOM-2 microcomputer emulator for the terminal.

    For the full copyright notice, see the lib.rs file.
*/
//! Opcode bit-field parsing and the enums the dispatchers work with.
use core::convert::TryFrom;
use core::fmt;

use super::flags::CpuFlags;

/// One of the two index-register prefixes. Selects which register stands in
/// for HL while the prefixed opcode executes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Prefix {
    Xdd = 0xDD,
    Yfd = 0xFD,
}

impl TryFrom<u8> for Prefix {
    type Error = ();

    #[inline]
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0xDD => Ok(Prefix::Xdd),
            0xFD => Ok(Prefix::Yfd),
            _ => Err(()),
        }
    }
}

/// Displays the prefix as the register pair it selects.
impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Prefix::Xdd => "IX",
            Prefix::Yfd => "IY",
        })
    }
}

/// Defines a register-field enum decoded by masking the opcode. The mask
/// must leave no bit pattern unmapped, which is checked by the exhaustive
/// match arms below (a gap is a compile error in `from`).
macro_rules! opcode_field_enum {
    ($(#[$meta:meta])* $vis:vis $name:ident & ($mask:expr) {$($n:ident = $e:literal;)*}) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $($n = $e,)*
        }

        impl From<u8> for $name {
            #[inline]
            fn from(code: u8) -> Self {
                match code & ($mask) {
                    $($e => $name::$n,)*
                    _ => unreachable!(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $($name::$n => stringify!($n),)*
                })
            }
        }
    };
}

/// An 8-bit register selector from a 3-bit opcode field.
///
/// The field value `0b110` addresses memory instead of a register, so
/// conversion is fallible: `Err(())` means `(HL)` (or `(IX+d)`/`(IY+d)`
/// under a prefix).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Reg8 {
    B = 0b000,
    C = 0b001,
    D = 0b010,
    E = 0b011,
    H = 0b100,
    L = 0b101,
    A = 0b111,
}

impl TryFrom<u8> for Reg8 {
    type Error = ();

    #[inline]
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code & 0b111 {
            0b000 => Ok(Reg8::B),
            0b001 => Ok(Reg8::C),
            0b010 => Ok(Reg8::D),
            0b011 => Ok(Reg8::E),
            0b100 => Ok(Reg8::H),
            0b101 => Ok(Reg8::L),
            0b111 => Ok(Reg8::A),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reg8::B => "B",
            Reg8::C => "C",
            Reg8::D => "D",
            Reg8::E => "E",
            Reg8::H => "H",
            Reg8::L => "L",
            Reg8::A => "A",
        })
    }
}

impl Reg8 {
    /// Decodes the destination field, opcode bits 3..=5.
    #[inline]
    pub(crate) fn from_b5_3(code: u8) -> Result<Reg8, ()> {
        Reg8::try_from(code >> 3)
    }

    /// Decodes the source field, opcode bits 0..=2.
    #[inline]
    pub(crate) fn from_b2_0(code: u8) -> Result<Reg8, ()> {
        Reg8::try_from(code)
    }
}

opcode_field_enum! {
    /// A 16-bit register pair selector with SP, opcode bits 4..=5.
    pub Reg16 & (0b00_11_0000) {
        BC = 0b00_00_0000;
        DE = 0b00_01_0000;
        HL = 0b00_10_0000;
        SP = 0b00_11_0000;
    }
}

opcode_field_enum! {
    /// A 16-bit register pair selector with AF, as used by PUSH and POP.
    pub StkReg16 & (0b00_11_0000) {
        BC = 0b00_00_0000;
        DE = 0b00_01_0000;
        HL = 0b00_10_0000;
        AF = 0b00_11_0000;
    }
}

opcode_field_enum! {
    /// The 8-bit accumulator operation selector, opcode bits 3..=5.
    pub(crate) Ops8 & (0b00_111_000) {
        ADD = 0b00_000_000;
        ADC = 0b00_001_000;
        SUB = 0b00_010_000;
        SBC = 0b00_011_000;
        AND = 0b00_100_000;
        XOR = 0b00_101_000;
        OR  = 0b00_110_000;
        CP  = 0b00_111_000;
    }
}

opcode_field_enum! {
    /// The CB-prefix rotate/shift selector, opcode bits 3..=5.
    pub(crate) Rot & (0b00_111_000) {
        RLC = 0b00_000_000;
        RRC = 0b00_001_000;
        RL  = 0b00_010_000;
        RR  = 0b00_011_000;
        SLA = 0b00_100_000;
        SRA = 0b00_101_000;
        SLL = 0b00_110_000;
        SRL = 0b00_111_000;
    }
}

opcode_field_enum! {
    /// A branch condition, opcode bits 3..=5.
    pub Condition & (0b00_111_000) {
        NZ = 0b00_000_000;
        Z  = 0b00_001_000;
        NC = 0b00_010_000;
        C  = 0b00_011_000;
        PO = 0b00_100_000;
        PE = 0b00_101_000;
        P  = 0b00_110_000;
        M  = 0b00_111_000;
    }
}

impl Condition {
    /// Decodes the two-condition subset available to `JR cc`.
    #[inline]
    pub(crate) fn from_jr_subset(code: u8) -> Self {
        Condition::from(code & 0b00_011_000)
    }

    /// Tests the condition against the flag register.
    #[inline]
    pub fn is_satisfied(self, flags: CpuFlags) -> bool {
        match self {
            Condition::NZ => !flags.contains(CpuFlags::Z),
            Condition::Z => flags.contains(CpuFlags::Z),
            Condition::NC => !flags.contains(CpuFlags::C),
            Condition::C => flags.contains(CpuFlags::C),
            Condition::PO => !flags.contains(CpuFlags::PV),
            Condition::PE => flags.contains(CpuFlags::PV),
            Condition::P => !flags.contains(CpuFlags::S),
            Condition::M => flags.contains(CpuFlags::S),
        }
    }
}

/// A decoded CB-prefix opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BitOps {
    /// The shift and rotate group.
    Rot(Rot, Result<Reg8, ()>),
    /// `BIT b, r|(HL)`
    Bit(u32, Result<Reg8, ()>),
    /// `RES b, r|(HL)`
    Res(u32, Result<Reg8, ()>),
    /// `SET b, r|(HL)`
    Set(u32, Result<Reg8, ()>),
}

#[inline]
fn parse_code_bitnum(code: u8) -> u32 {
    u32::from((code >> 3) & 7)
}

impl From<u8> for BitOps {
    #[inline]
    fn from(code: u8) -> Self {
        let arg = Reg8::from_b2_0(code);
        match code & 0b11_000_000 {
            0b00_000_000 => BitOps::Rot(Rot::from(code), arg),
            0b01_000_000 => BitOps::Bit(parse_code_bitnum(code), arg),
            0b10_000_000 => BitOps::Res(parse_code_bitnum(code), arg),
            _ => BitOps::Set(parse_code_bitnum(code), arg),
        }
    }
}

/// Extracts the restart target address from a `RST p` opcode.
#[inline]
pub(crate) fn parse_restart_address(code: u8) -> u16 {
    u16::from(code & 0b00_111_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reg8_fields() {
        assert_eq!(Reg8::try_from(0u8), Ok(Reg8::B));
        assert_eq!(Reg8::try_from(0b101u8), Ok(Reg8::L));
        assert_eq!(Reg8::try_from(0b110u8), Err(()));
        assert_eq!(Reg8::try_from(0b111u8), Ok(Reg8::A));
        // LD D,(HL) = 0x56
        assert_eq!(Reg8::from_b5_3(0x56), Ok(Reg8::D));
        assert_eq!(Reg8::from_b2_0(0x56), Err(()));
    }

    #[test]
    fn reg16_fields() {
        assert_eq!(Reg16::from(0x01u8), Reg16::BC); // LD BC,nn
        assert_eq!(Reg16::from(0x31u8), Reg16::SP); // LD SP,nn
        assert_eq!(StkReg16::from(0xF5u8), StkReg16::AF); // PUSH AF
        assert_eq!(StkReg16::from(0xC1u8), StkReg16::BC); // POP BC
    }

    #[test]
    fn ops8_fields() {
        assert_eq!(Ops8::from(0x80u8), Ops8::ADD);
        assert_eq!(Ops8::from(0x96u8), Ops8::SUB);
        assert_eq!(Ops8::from(0xBFu8), Ops8::CP);
        assert_eq!(Ops8::from(0xEEu8), Ops8::XOR); // XOR n
    }

    #[test]
    fn conditions() {
        let mut flags = CpuFlags::empty();
        assert!(Condition::NZ.is_satisfied(flags));
        assert!(!Condition::Z.is_satisfied(flags));
        flags.insert(CpuFlags::Z | CpuFlags::C | CpuFlags::S);
        assert!(Condition::Z.is_satisfied(flags));
        assert!(Condition::C.is_satisfied(flags));
        assert!(Condition::M.is_satisfied(flags));
        assert!(!Condition::PE.is_satisfied(flags));
        // JR NZ,d = 0x20, JR C,d = 0x38
        assert_eq!(Condition::from_jr_subset(0x20), Condition::NZ);
        assert_eq!(Condition::from_jr_subset(0x38), Condition::C);
        // RET PO = 0xE0
        assert_eq!(Condition::from(0xE0u8), Condition::PO);
    }

    #[test]
    fn bitops_decode() {
        assert_eq!(BitOps::from(0x00u8), BitOps::Rot(Rot::RLC, Ok(Reg8::B)));
        assert_eq!(BitOps::from(0x3Eu8), BitOps::Rot(Rot::SRL, Err(())));
        assert_eq!(BitOps::from(0x46u8), BitOps::Bit(0, Err(())));
        assert_eq!(BitOps::from(0x87u8), BitOps::Res(0, Ok(Reg8::A)));
        assert_eq!(BitOps::from(0xC7u8), BitOps::Set(0, Ok(Reg8::A)));
        assert_eq!(BitOps::from(0xFEu8), BitOps::Set(7, Err(())));
    }

    #[test]
    fn restart_addresses() {
        for (code, addr) in [(0xC7u8, 0x00u16), (0xCF, 0x08), (0xD7, 0x10),
                             (0xDF, 0x18), (0xE7, 0x20), (0xEF, 0x28),
                             (0xF7, 0x30), (0xFF, 0x38)] {
            assert_eq!(parse_restart_address(code), addr);
        }
    }
}
