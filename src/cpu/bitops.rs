/*
    nascom2: a NASCOM-2 microcomputer emulator for the terminal.

    For the full copyright notice, see the lib.rs file.
*/
//! The CB-prefix group: rotates, shifts, BIT, RES and SET.
//!
//! One decoder serves the plain `CB` form and the `DDCB`/`FDCB` forms. In
//! the indexed form the operand is always the byte at `IXY+d` no matter
//! what the register field says, and the modified byte is also copied into
//! the selected register unless the field addresses `(HL)`.
use super::flags::CpuFlags;
use super::ops;
use super::parse::{BitOps, Reg8, Rot};
use super::Cpu;
use crate::bus::{Io, Memory};

impl Rot {
    fn op(self, val: u8, flags: &mut CpuFlags) -> u8 {
        match self {
            Rot::RLC => ops::rlc(val, flags),
            Rot::RRC => ops::rrc(val, flags),
            Rot::RL => ops::rl(val, flags),
            Rot::RR => ops::rr(val, flags),
            Rot::SLA => ops::sla(val, flags),
            Rot::SRA => ops::sra(val, flags),
            Rot::SLL => ops::sll(val, flags),
            Rot::SRL => ops::srl(val, flags),
        }
    }
}

impl Cpu {
    pub(super) fn execute_bitops<M: Memory + Io>(
        &mut self,
        ctl: &mut M,
        flags: &mut CpuFlags,
        indexed: Option<u16>,
    ) {
        let code = self.fetch8(ctl);
        let selector = Reg8::from_b2_0(code);
        let val = match indexed {
            Some(addr) => ctl.read(addr),
            None => match selector {
                Ok(reg) => self.get_reg(reg, None),
                Err(_) => ctl.read(self.regs.hl.get16()),
            },
        };
        let res = match BitOps::from(code) {
            BitOps::Rot(rot, _) => rot.op(val, flags),
            BitOps::Bit(b, _) => {
                ops::bit(b, val, flags);
                return;
            }
            BitOps::Res(b, _) => ops::res(b, val),
            BitOps::Set(b, _) => ops::set(b, val),
        };
        match indexed {
            Some(addr) => {
                ctl.write(addr, res);
                if let Ok(reg) = selector {
                    self.set_reg(reg, None, res);
                }
            }
            None => match selector {
                Ok(reg) => self.set_reg(reg, None, res),
                Err(_) => ctl.write(self.regs.hl.get16(), res),
            },
        }
    }
}
