/*
    nascom2: a NASCOM-2 microcomputer emulator for the terminal.

    For the full copyright notice, see the lib.rs file.
*/
//! The DD/FD prefix group.
//!
//! Both prefixes run this one decoder; the [Prefix] argument selects which
//! index register stands in for HL, and every access goes through the
//! register accessors so PUSH, POP and `EX (SP)` mutate the real register
//! rather than a copy. An opcode with no indexed meaning rewinds PC one
//! byte and is re-executed unprefixed on the next step.
use super::flags::CpuFlags;
use super::ops;
use super::parse::{Ops8, Prefix, Reg16, Reg8};
use super::Cpu;
use crate::bus::{Io, Memory};

impl Cpu {
    pub(super) fn execute_indexed<M: Memory + Io>(
        &mut self,
        ctl: &mut M,
        flags: &mut CpuFlags,
        prefix: Prefix,
    ) {
        let code = self.fetch8(ctl);
        match code {
            0x09 | 0x19 | 0x29 | 0x39 => {
                // ADD ii,dd with ii itself in the HL slot        0b00_dd_1001
                let rp = match Reg16::from(code) {
                    Reg16::HL => self.get_index16(prefix),
                    reg => self.rp16(reg),
                };
                let sum = ops::add16(self.get_index16(prefix), rp, flags);
                self.set_index16(prefix, sum);
            }
            0x21 => {
                // LD ii,nn
                let nn = self.fetch16(ctl);
                self.set_index16(prefix, nn);
            }
            0x22 => {
                // LD (nn),ii
                let nn = self.fetch16(ctl);
                ctl.write16(nn, self.get_index16(prefix));
            }
            0x2A => {
                // LD ii,(nn)
                let nn = self.fetch16(ctl);
                let val = ctl.read16(nn);
                self.set_index16(prefix, val);
            }
            0x23 => self.index16_mut(prefix).inc16(), // INC ii
            0x2B => self.index16_mut(prefix).dec16(), // DEC ii
            0x24 | 0x2C | 0x34 => {
                // INC q | INC (ii+d)                             0b00_rrr_100
                match Reg8::from_b5_3(code) {
                    Ok(reg) => {
                        let val = ops::inc(self.get_reg(reg, Some(prefix)), flags);
                        self.set_reg(reg, Some(prefix), val);
                    }
                    Err(_) => {
                        let addr = self.index_addr(ctl, prefix);
                        let val = ops::inc(ctl.read(addr), flags);
                        ctl.write(addr, val);
                    }
                }
            }
            0x25 | 0x2D | 0x35 => {
                // DEC q | DEC (ii+d)                             0b00_rrr_101
                match Reg8::from_b5_3(code) {
                    Ok(reg) => {
                        let val = ops::dec(self.get_reg(reg, Some(prefix)), flags);
                        self.set_reg(reg, Some(prefix), val);
                    }
                    Err(_) => {
                        let addr = self.index_addr(ctl, prefix);
                        let val = ops::dec(ctl.read(addr), flags);
                        ctl.write(addr, val);
                    }
                }
            }
            0x26 | 0x2E => {
                // LD q,n
                let n = self.fetch8(ctl);
                if let Ok(reg) = Reg8::from_b5_3(code) {
                    self.set_reg(reg, Some(prefix), n);
                }
            }
            0x36 => {
                // LD (ii+d),n: displacement first, then the immediate.
                let addr = self.index_addr(ctl, prefix);
                let n = self.fetch8(ctl);
                ctl.write(addr, n);
            }
            0x44..=0x46 | 0x4C..=0x4E | 0x54..=0x56 | 0x5C..=0x5E
            | 0x60..=0x75 | 0x77 | 0x7C..=0x7E => {
                // LD q,q | LD r,(ii+d) | LD (ii+d),r. With a memory
                // operand the other side addresses the real H and L.
                match (Reg8::from_b5_3(code), Reg8::from_b2_0(code)) {
                    (Ok(dst), Ok(src)) => {
                        let val = self.get_reg(src, Some(prefix));
                        self.set_reg(dst, Some(prefix), val);
                    }
                    (Ok(dst), Err(_)) => {
                        let addr = self.index_addr(ctl, prefix);
                        let val = ctl.read(addr);
                        self.set_reg(dst, None, val);
                    }
                    (Err(_), Ok(src)) => {
                        let addr = self.index_addr(ctl, prefix);
                        ctl.write(addr, self.get_reg(src, None));
                    }
                    // 0x76 is excluded from the arm pattern above.
                    (Err(_), Err(_)) => {}
                }
            }
            0x84..=0x86 | 0x8C..=0x8E | 0x94..=0x96 | 0x9C..=0x9E
            | 0xA4..=0xA6 | 0xAC..=0xAE | 0xB4..=0xB6 | 0xBC..=0xBE => {
                // @ops A, q | @ops A, (ii+d)                     0b10_ops_rrr
                let val = match Reg8::from_b2_0(code) {
                    Ok(src) => self.get_reg(src, Some(prefix)),
                    Err(_) => {
                        let addr = self.index_addr(ctl, prefix);
                        ctl.read(addr)
                    }
                };
                self.alu8(Ops8::from(code), val, flags);
            }
            0xCB => {
                // DDCB/FDCB: the displacement precedes the CB opcode.
                let addr = self.index_addr(ctl, prefix);
                self.execute_bitops(ctl, flags, Some(addr));
            }
            0xE1 => {
                // POP ii
                let val = self.pop16(ctl);
                self.set_index16(prefix, val);
            }
            0xE3 => {
                // EX (SP),ii
                let old = self.ex_sp16(ctl, self.get_index16(prefix));
                self.set_index16(prefix, old);
            }
            0xE5 => {
                // PUSH ii
                let val = self.get_index16(prefix);
                self.push16(ctl, val);
            }
            0xE9 => self.pc.set16(self.get_index16(prefix)), // JP (ii)
            0xF9 => self.sp.set16(self.get_index16(prefix)), // LD SP,ii
            _ => self.pc.dec16(), // not an indexed opcode; drop the prefix
        }
    }
}
