/*
    nascom2: a NASCOM-2 microcomputer emulator for the terminal.

    For the full copyright notice, see the lib.rs file.
*/
//! The unprefixed opcode table.
//!
//! The arm grouping follows the bit-field structure of the opcode map:
//! `0b01_ddd_sss` is the load block, `0b10_ooo_sss` the accumulator
//! arithmetic block, and the remaining instructions decode their register
//! and condition fields out of bits 3..=5.
use core::mem::swap;

use super::flags::CpuFlags;
use super::ops;
use super::parse::{parse_restart_address, Condition, Ops8, Prefix, Reg16, Reg8, StkReg16};
use super::Cpu;
use crate::bus::{Io, Memory};

impl Cpu {
    pub(super) fn execute<M: Memory + Io>(&mut self, code: u8, ctl: &mut M, flags: &mut CpuFlags) {
        match code {
            // LD r,r' | LD r,(HL) | LD (HL),r | HALT            0b01_rrr_rrr
            0x40..=0x7F => match (Reg8::from_b5_3(code), Reg8::from_b2_0(code)) {
                (Ok(dst), Ok(src)) => {
                    let val = self.get_reg(src, None);
                    self.set_reg(dst, None, val);
                }
                (Ok(dst), Err(_)) => {
                    let val = ctl.read(self.regs.hl.get16());
                    self.set_reg(dst, None, val);
                }
                (Err(_), Ok(src)) => {
                    ctl.write(self.regs.hl.get16(), self.get_reg(src, None));
                }
                // 0x76: leave PC on the opcode so it re-executes each step.
                (Err(_), Err(_)) => {
                    self.pc.dec16();
                    self.halted = true;
                }
            },
            // ADD|ADC|SUB|SBC|AND|XOR|OR|CP A, r|(HL)            0b10_ops_rrr
            0x80..=0xBF => {
                let val = match Reg8::from_b2_0(code) {
                    Ok(src) => self.get_reg(src, None),
                    Err(_) => ctl.read(self.regs.hl.get16()),
                };
                self.alu8(Ops8::from(code), val, flags);
            }
            0x00 => {} // NOP
            0x01 | 0x11 | 0x21 | 0x31 => {
                // LD dd,nn                                       0b00_dd_0001
                let nn = self.fetch16(ctl);
                self.set_rp16(Reg16::from(code), nn);
            }
            0x02 => ctl.write(self.regs.bc.get16(), self.af.get8hi()), // LD (BC),A
            0x12 => ctl.write(self.regs.de.get16(), self.af.get8hi()), // LD (DE),A
            0x0A => {
                // LD A,(BC)
                let val = ctl.read(self.regs.bc.get16());
                self.af.set8hi(val);
            }
            0x1A => {
                // LD A,(DE)
                let val = ctl.read(self.regs.de.get16());
                self.af.set8hi(val);
            }
            0x03 | 0x13 | 0x23 | 0x33 => {
                // INC dd                                         0b00_dd_0011
                let reg = Reg16::from(code);
                self.set_rp16(reg, self.rp16(reg).wrapping_add(1));
            }
            0x0B | 0x1B | 0x2B | 0x3B => {
                // DEC dd                                         0b00_dd_1011
                let reg = Reg16::from(code);
                self.set_rp16(reg, self.rp16(reg).wrapping_sub(1));
            }
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
                // INC r | INC (HL)                               0b00_rrr_100
                match Reg8::from_b5_3(code) {
                    Ok(reg) => {
                        let val = ops::inc(self.get_reg(reg, None), flags);
                        self.set_reg(reg, None, val);
                    }
                    Err(_) => {
                        let hl = self.regs.hl.get16();
                        let val = ops::inc(ctl.read(hl), flags);
                        ctl.write(hl, val);
                    }
                }
            }
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
                // DEC r | DEC (HL)                               0b00_rrr_101
                match Reg8::from_b5_3(code) {
                    Ok(reg) => {
                        let val = ops::dec(self.get_reg(reg, None), flags);
                        self.set_reg(reg, None, val);
                    }
                    Err(_) => {
                        let hl = self.regs.hl.get16();
                        let val = ops::dec(ctl.read(hl), flags);
                        ctl.write(hl, val);
                    }
                }
            }
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                // LD r,n | LD (HL),n                             0b00_rrr_110
                let n = self.fetch8(ctl);
                match Reg8::from_b5_3(code) {
                    Ok(reg) => self.set_reg(reg, None, n),
                    Err(_) => ctl.write(self.regs.hl.get16(), n),
                }
            }
            0x07 => {
                // RLCA
                let acc = ops::rlca(self.af.get8hi(), flags);
                self.af.set8hi(acc);
            }
            0x0F => {
                // RRCA
                let acc = ops::rrca(self.af.get8hi(), flags);
                self.af.set8hi(acc);
            }
            0x17 => {
                // RLA
                let acc = ops::rla(self.af.get8hi(), flags);
                self.af.set8hi(acc);
            }
            0x1F => {
                // RRA
                let acc = ops::rra(self.af.get8hi(), flags);
                self.af.set8hi(acc);
            }
            0x08 => {
                // EX AF,AF': the working flag copy rides along.
                self.af.set8lo(flags.bits());
                self.ex_af_af();
                *flags = self.get_flags();
            }
            0x09 | 0x19 | 0x29 | 0x39 => {
                // ADD HL,dd                                      0b00_dd_1001
                let sum = ops::add16(self.regs.hl.get16(), self.rp16(Reg16::from(code)), flags);
                self.regs.hl.set16(sum);
            }
            0x10 => {
                // DJNZ d
                let b = self.regs.bc.get8hi().wrapping_sub(1);
                self.regs.bc.set8hi(b);
                self.jr_cond(ctl, b != 0);
            }
            0x18 => self.jr_cond(ctl, true), // JR d
            0x20 | 0x28 | 0x30 | 0x38 => {
                // JR cc,d
                let cond = Condition::from_jr_subset(code).is_satisfied(*flags);
                self.jr_cond(ctl, cond);
            }
            0x22 => {
                // LD (nn),HL
                let nn = self.fetch16(ctl);
                ctl.write16(nn, self.regs.hl.get16());
            }
            0x2A => {
                // LD HL,(nn)
                let nn = self.fetch16(ctl);
                let val = ctl.read16(nn);
                self.regs.hl.set16(val);
            }
            0x32 => {
                // LD (nn),A
                let nn = self.fetch16(ctl);
                ctl.write(nn, self.af.get8hi());
            }
            0x3A => {
                // LD A,(nn)
                let nn = self.fetch16(ctl);
                let val = ctl.read(nn);
                self.af.set8hi(val);
            }
            0x27 => {
                // DAA
                let acc = ops::daa(self.af.get8hi(), flags);
                self.af.set8hi(acc);
            }
            0x2F => {
                // CPL
                let acc = ops::cpl(self.af.get8hi(), flags);
                self.af.set8hi(acc);
            }
            0x37 => ops::scf(self.af.get8hi(), flags), // SCF
            0x3F => ops::ccf(self.af.get8hi(), flags), // CCF
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                // RET cc                                         0b11_ccc_000
                let cond = Condition::from(code).is_satisfied(*flags);
                self.ret_cond(ctl, cond);
            }
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                // POP ss                                         0b11_ss_0001
                let val = self.pop16(ctl);
                let reg = StkReg16::from(code);
                self.set_reg16(reg, val);
                if reg == StkReg16::AF {
                    *flags = CpuFlags::from_bits_truncate(val as u8);
                }
            }
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                // JP cc,nn                                       0b11_ccc_010
                let cond = Condition::from(code).is_satisfied(*flags);
                self.jp_cond(ctl, cond);
            }
            0xC3 => self.jp_cond(ctl, true), // JP nn
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                // CALL cc,nn                                     0b11_ccc_100
                let cond = Condition::from(code).is_satisfied(*flags);
                self.call_cond(ctl, cond);
            }
            0xCD => self.call_cond(ctl, true), // CALL nn
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                // PUSH ss                                        0b11_ss_0101
                let reg = StkReg16::from(code);
                if reg == StkReg16::AF {
                    self.af.set8lo(flags.bits());
                }
                let val = self.get_reg16(reg);
                self.push16(ctl, val);
            }
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                // ADD|ADC|SUB|SBC|AND|XOR|OR|CP A, n             0b11_ops_110
                let n = self.fetch8(ctl);
                self.alu8(Ops8::from(code), n, flags);
            }
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                // RST p                                          0b11_ppp_111
                let ret = self.pc.get16();
                self.push16(ctl, ret);
                self.pc.set16(parse_restart_address(code));
            }
            0xC9 => {
                // RET
                let addr = self.pop16(ctl);
                self.pc.set16(addr);
            }
            0xCB => self.execute_bitops(ctl, flags, None),
            0xD3 => {
                // OUT (n),A: the accumulator rides the high address byte.
                let n = self.fetch8(ctl);
                let acc = self.af.get8hi();
                ctl.write_io(u16::from_be_bytes([acc, n]), acc);
            }
            0xDB => {
                // IN A,(n): no flags are affected by this form.
                let n = self.fetch8(ctl);
                let port = u16::from_be_bytes([self.af.get8hi(), n]);
                let val = ctl.read_io(port);
                self.af.set8hi(val);
            }
            0xD9 => self.exx(), // EXX
            0xE3 => {
                // EX (SP),HL
                let old = self.ex_sp16(ctl, self.regs.hl.get16());
                self.regs.hl.set16(old);
            }
            0xE9 => self.pc.set16(self.regs.hl.get16()), // JP (HL)
            0xEB => swap(&mut self.regs.de, &mut self.regs.hl), // EX DE,HL
            0xF9 => self.sp.set16(self.regs.hl.get16()), // LD SP,HL
            0xF3 => {
                // DI
                self.iff1 = false;
                self.iff2 = false;
            }
            0xFB => {
                // EI
                self.iff1 = true;
                self.iff2 = true;
            }
            0xDD => self.execute_indexed(ctl, flags, Prefix::Xdd),
            0xFD => self.execute_indexed(ctl, flags, Prefix::Yfd),
            0xED => self.execute_extended(ctl, flags),
        }
    }

    /// Applies an accumulator ALU operation; CP leaves the accumulator be.
    pub(super) fn alu8(&mut self, op: Ops8, val: u8, flags: &mut CpuFlags) {
        let acc = self.af.get8hi();
        let res = match op {
            Ops8::ADD => ops::add(acc, val, flags),
            Ops8::ADC => ops::adc(acc, val, flags),
            Ops8::SUB => ops::sub(acc, val, flags),
            Ops8::SBC => ops::sbc(acc, val, flags),
            Ops8::AND => ops::and(acc, val, flags),
            Ops8::XOR => ops::xor(acc, val, flags),
            Ops8::OR => ops::or(acc, val, flags),
            Ops8::CP => {
                ops::cp(acc, val, flags);
                return;
            }
        };
        self.af.set8hi(res);
    }
}
