/*
    nascom2: a NASCOM-2 microcomputer emulator for the terminal.

    For the full copyright notice, see the lib.rs file.
*/
//! The Z80 CPU: register file and the fetch/decode/execute engine.
//!
//! [Cpu] is a plain value owned by the host; everything it touches outside
//! its own registers goes through the [Memory](crate::bus::Memory) and
//! [Io](crate::bus::Io) seams of the control value passed to [Cpu::step].
mod bitops;
mod extended;
mod flags;
mod indexed;
mod internal;
mod opcodes;
mod ops;
mod parse;
mod registers;
#[cfg(test)]
mod tests;

use core::mem::swap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bus::{Io, Memory};

pub use flags::CpuFlags;
pub use parse::{Condition, Prefix, Reg16, Reg8, StkReg16};
pub use registers::{InterruptMode, RegisterPair};

use registers::{GeneralRegisters, IndexRegisters};

/// The Z80 register file and halt latch.
///
/// All state is zero at power-up: PC points at the restart vector 0 and the
/// monitor ROM boots from there. There are no partial instructions; every
/// observable state is on an instruction boundary.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Cpu {
    af: RegisterPair,
    af_alt: RegisterPair,
    regs: GeneralRegisters,
    regs_alt: GeneralRegisters,
    index: IndexRegisters,
    pc: RegisterPair,
    sp: RegisterPair,
    ir: RegisterPair,
    im: InterruptMode,
    iff1: bool,
    iff2: bool,
    halted: bool,
}

impl Cpu {
    /// Creates a CPU in the power-up state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the CPU to the power-up state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fetches, decodes and executes exactly one instruction, applying all
    /// of its effects on registers, memory and ports.
    ///
    /// Never fails: every opcode byte has defined behavior. `HALT` leaves
    /// PC on its own opcode, so a halted CPU keeps re-executing it; the
    /// block-repeat instructions run their whole loop inside one call.
    pub fn step<M: Memory + Io>(&mut self, ctl: &mut M) {
        let mut flags = self.get_flags();
        let code = self.fetch8(ctl);
        self.execute(code, ctl, &mut flags);
        self.set_flags(flags);
    }

    #[inline]
    pub fn get_pc(&self) -> u16 {
        self.pc.get16()
    }

    #[inline]
    pub fn set_pc(&mut self, pc: u16) {
        self.pc.set16(pc)
    }

    #[inline]
    pub fn get_sp(&self) -> u16 {
        self.sp.get16()
    }

    #[inline]
    pub fn set_sp(&mut self, sp: u16) {
        self.sp.set16(sp)
    }

    /// Returns the accumulator, the high half of AF.
    #[inline]
    pub fn get_acc(&self) -> u8 {
        self.af.get8hi()
    }

    #[inline]
    pub fn set_acc(&mut self, val: u8) {
        self.af.set8hi(val)
    }

    #[inline]
    pub fn get_flags(&self) -> CpuFlags {
        CpuFlags::from_bits_truncate(self.af.get8lo())
    }

    #[inline]
    pub fn set_flags(&mut self, flags: CpuFlags) {
        self.af.set8lo(flags.bits())
    }

    /// Returns the interrupt page register I, the high half of IR.
    #[inline]
    pub fn get_i(&self) -> u8 {
        self.ir.get8hi()
    }

    #[inline]
    pub fn set_i(&mut self, i: u8) {
        self.ir.set8hi(i)
    }

    /// Returns the memory refresh register R, the low half of IR.
    #[inline]
    pub fn get_r(&self) -> u8 {
        self.ir.get8lo()
    }

    #[inline]
    pub fn set_r(&mut self, r: u8) {
        self.ir.set8lo(r)
    }

    #[inline]
    pub fn get_ir(&self) -> u16 {
        self.ir.get16()
    }

    /// Returns `(IFF1, IFF2)`.
    #[inline]
    pub fn get_iffs(&self) -> (bool, bool) {
        (self.iff1, self.iff2)
    }

    #[inline]
    pub fn set_iffs(&mut self, iff1: bool, iff2: bool) {
        self.iff1 = iff1;
        self.iff2 = iff2;
    }

    #[inline]
    pub fn get_im(&self) -> InterruptMode {
        self.im
    }

    #[inline]
    pub fn set_im(&mut self, im: InterruptMode) {
        self.im = im;
    }

    /// Returns `true` once a `HALT` instruction has executed. Nothing ever
    /// clears this short of [Cpu::reset]: interrupts are not modeled.
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Swaps AF with its shadow.
    #[inline]
    pub fn ex_af_af(&mut self) {
        swap(&mut self.af, &mut self.af_alt);
    }

    /// Swaps BC, DE and HL with their shadows.
    #[inline]
    pub fn exx(&mut self) {
        swap(&mut self.regs, &mut self.regs_alt);
    }

    /// Returns an 8-bit register. With a prefix, H and L address the halves
    /// of the selected index register instead.
    pub fn get_reg(&self, reg: Reg8, prefix: Option<Prefix>) -> u8 {
        match reg {
            Reg8::B => self.regs.bc.get8hi(),
            Reg8::C => self.regs.bc.get8lo(),
            Reg8::D => self.regs.de.get8hi(),
            Reg8::E => self.regs.de.get8lo(),
            Reg8::H => match prefix {
                None => self.regs.hl.get8hi(),
                Some(p) => self.index16_ref(p).get8hi(),
            },
            Reg8::L => match prefix {
                None => self.regs.hl.get8lo(),
                Some(p) => self.index16_ref(p).get8lo(),
            },
            Reg8::A => self.af.get8hi(),
        }
    }

    /// Sets an 8-bit register. With a prefix, H and L address the halves of
    /// the selected index register instead.
    pub fn set_reg(&mut self, reg: Reg8, prefix: Option<Prefix>, val: u8) {
        match reg {
            Reg8::B => self.regs.bc.set8hi(val),
            Reg8::C => self.regs.bc.set8lo(val),
            Reg8::D => self.regs.de.set8hi(val),
            Reg8::E => self.regs.de.set8lo(val),
            Reg8::H => match prefix {
                None => self.regs.hl.set8hi(val),
                Some(p) => self.index16_mut(p).set8hi(val),
            },
            Reg8::L => match prefix {
                None => self.regs.hl.set8lo(val),
                Some(p) => self.index16_mut(p).set8lo(val),
            },
            Reg8::A => self.af.set8hi(val),
        }
    }

    /// Returns a register pair from the PUSH/POP bank (AF instead of SP).
    pub fn get_reg16(&self, reg: StkReg16) -> u16 {
        match reg {
            StkReg16::BC => self.regs.bc.get16(),
            StkReg16::DE => self.regs.de.get16(),
            StkReg16::HL => self.regs.hl.get16(),
            StkReg16::AF => self.af.get16(),
        }
    }

    /// Sets a register pair from the PUSH/POP bank (AF instead of SP).
    pub fn set_reg16(&mut self, reg: StkReg16, val: u16) {
        match reg {
            StkReg16::BC => self.regs.bc.set16(val),
            StkReg16::DE => self.regs.de.set16(val),
            StkReg16::HL => self.regs.hl.set16(val),
            StkReg16::AF => self.af.set16(val),
        }
    }

    /// Returns a shadow-bank register pair.
    pub fn get_alt_reg16(&self, reg: StkReg16) -> u16 {
        match reg {
            StkReg16::BC => self.regs_alt.bc.get16(),
            StkReg16::DE => self.regs_alt.de.get16(),
            StkReg16::HL => self.regs_alt.hl.get16(),
            StkReg16::AF => self.af_alt.get16(),
        }
    }

    /// Returns IX or IY, selected by the prefix.
    #[inline]
    pub fn get_index16(&self, prefix: Prefix) -> u16 {
        self.index16_ref(prefix).get16()
    }

    /// Sets IX or IY, selected by the prefix.
    #[inline]
    pub fn set_index16(&mut self, prefix: Prefix, val: u16) {
        self.index16_mut(prefix).set16(val)
    }

    #[inline]
    fn index16_ref(&self, prefix: Prefix) -> &RegisterPair {
        match prefix {
            Prefix::Xdd => &self.index.ix,
            Prefix::Yfd => &self.index.iy,
        }
    }

    #[inline]
    fn index16_mut(&mut self, prefix: Prefix) -> &mut RegisterPair {
        match prefix {
            Prefix::Xdd => &mut self.index.ix,
            Prefix::Yfd => &mut self.index.iy,
        }
    }
}
