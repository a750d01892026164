/*
    nascom2: a NASCOM-2 microcomputer emulator for the terminal.

    For the full copyright notice, see the lib.rs file.
*/
//! The ED-prefix group.
//!
//! Only the canonical opcode of each extended instruction is decoded; the
//! undocumented alias codes fall into the default arm, which rewinds PC by
//! one byte for the `0x40..=0x7F` range and otherwise acts as a plain NOP.
//! The block-repeat instructions run their whole loop here: with no
//! interrupts modeled there is nothing to interleave with.
use super::flags::CpuFlags;
use super::ops;
use super::parse::{Reg16, Reg8};
use super::registers::InterruptMode;
use super::Cpu;
use crate::bus::{Io, Memory};

/// Post-increment direction of the block instructions.
#[derive(Clone, Copy)]
#[repr(i8)]
enum BlockDelta {
    Increase = 1,
    Decrease = -1,
}

impl BlockDelta {
    #[inline]
    fn offset(self) -> u16 {
        self as i8 as i16 as u16
    }
}

impl Cpu {
    pub(super) fn execute_extended<M: Memory + Io>(&mut self, ctl: &mut M, flags: &mut CpuFlags) {
        let code = self.fetch8(ctl);
        match code {
            0x40 | 0x48 | 0x50 | 0x58 | 0x60 | 0x68 | 0x70 | 0x78 => {
                // IN r,(C): B rides the high byte of the port address.
                // ED 70 only samples the port for its flags.
                let val = ctl.read_io(self.regs.bc.get16());
                ops::io(val, flags);
                if let Ok(reg) = Reg8::from_b5_3(code) {
                    self.set_reg(reg, None, val);
                }
            }
            0x41 | 0x49 | 0x51 | 0x59 | 0x61 | 0x69 | 0x71 | 0x79 => {
                // OUT (C),r; ED 71 drives zero onto the bus.
                let val = match Reg8::from_b5_3(code) {
                    Ok(reg) => self.get_reg(reg, None),
                    Err(_) => 0,
                };
                ctl.write_io(self.regs.bc.get16(), val);
            }
            0x42 | 0x52 | 0x62 | 0x72 => {
                // SBC HL,dd                                      0b01_dd_0010
                let res = ops::sbc16(self.regs.hl.get16(), self.rp16(Reg16::from(code)), flags);
                self.regs.hl.set16(res);
            }
            0x4A | 0x5A | 0x6A | 0x7A => {
                // ADC HL,dd                                      0b01_dd_1010
                let res = ops::adc16(self.regs.hl.get16(), self.rp16(Reg16::from(code)), flags);
                self.regs.hl.set16(res);
            }
            0x43 | 0x53 | 0x63 | 0x73 => {
                // LD (nn),dd                                     0b01_dd_0011
                let nn = self.fetch16(ctl);
                ctl.write16(nn, self.rp16(Reg16::from(code)));
            }
            0x4B | 0x5B | 0x6B | 0x7B => {
                // LD dd,(nn)                                     0b01_dd_1011
                let nn = self.fetch16(ctl);
                let val = ctl.read16(nn);
                self.set_rp16(Reg16::from(code), val);
            }
            0x44 => {
                // NEG
                let acc = ops::neg(self.af.get8hi(), flags);
                self.af.set8hi(acc);
            }
            0x45 | 0x4D => {
                // RETN / RETI: both restore IFF1 from IFF2 and pop PC.
                self.iff1 = self.iff2;
                let addr = self.pop16(ctl);
                self.pc.set16(addr);
            }
            0x46 => self.im = InterruptMode::Mode0,
            0x56 => self.im = InterruptMode::Mode1,
            0x5E => self.im = InterruptMode::Mode2,
            0x47 => self.ir.set8hi(self.af.get8hi()), // LD I,A
            0x4F => self.ir.set8lo(self.af.get8hi()), // LD R,A
            0x57 => {
                // LD A,I
                let i = self.ir.get8hi();
                self.af.set8hi(i);
                ops::ld_a_ir(i, self.iff2, flags);
            }
            0x5F => {
                // LD A,R
                let r = self.ir.get8lo();
                self.af.set8hi(r);
                ops::ld_a_ir(r, self.iff2, flags);
            }
            0x67 => {
                // RRD
                let hl = self.regs.hl.get16();
                let (acc, mem) = ops::rrd(self.af.get8hi(), ctl.read(hl), flags);
                self.af.set8hi(acc);
                ctl.write(hl, mem);
            }
            0x6F => {
                // RLD
                let hl = self.regs.hl.get16();
                let (acc, mem) = ops::rld(self.af.get8hi(), ctl.read(hl), flags);
                self.af.set8hi(acc);
                ctl.write(hl, mem);
            }
            0xA0 => self.block_ld(ctl, flags, BlockDelta::Increase), // LDI
            0xA8 => self.block_ld(ctl, flags, BlockDelta::Decrease), // LDD
            0xB0 | 0xB8 => {
                // LDIR / LDDR run to BC=0; entered with BC=0 they are a
                // no-op beyond dropping the flags an LDI would drop.
                let delta = if code == 0xB0 {
                    BlockDelta::Increase
                } else {
                    BlockDelta::Decrease
                };
                if self.regs.bc.get16() == 0 {
                    flags.remove(CpuFlags::H | CpuFlags::PV | CpuFlags::N);
                } else {
                    loop {
                        self.block_ld(ctl, flags, delta);
                        if self.regs.bc.get16() == 0 {
                            break;
                        }
                    }
                }
            }
            0xA1 => {
                // CPI
                self.block_cp(ctl, flags, BlockDelta::Increase);
            }
            0xA9 => {
                // CPD
                self.block_cp(ctl, flags, BlockDelta::Decrease);
            }
            0xB1 | 0xB9 => {
                // CPIR / CPDR stop on a match or an exhausted counter.
                let delta = if code == 0xB1 {
                    BlockDelta::Increase
                } else {
                    BlockDelta::Decrease
                };
                loop {
                    if self.block_cp(ctl, flags, delta) {
                        break;
                    }
                }
            }
            0xA2 => self.block_in(ctl, flags, BlockDelta::Increase), // INI
            0xAA => self.block_in(ctl, flags, BlockDelta::Decrease), // IND
            0xB2 | 0xBA => {
                // INIR / INDR
                let delta = if code == 0xB2 {
                    BlockDelta::Increase
                } else {
                    BlockDelta::Decrease
                };
                loop {
                    self.block_in(ctl, flags, delta);
                    if self.regs.bc.get8hi() == 0 {
                        break;
                    }
                }
            }
            0xA3 => self.block_out(ctl, flags, BlockDelta::Increase), // OUTI
            0xAB => self.block_out(ctl, flags, BlockDelta::Decrease), // OUTD
            0xB3 | 0xBB => {
                // OTIR / OTDR
                let delta = if code == 0xB3 {
                    BlockDelta::Increase
                } else {
                    BlockDelta::Decrease
                };
                loop {
                    self.block_out(ctl, flags, delta);
                    if self.regs.bc.get8hi() == 0 {
                        break;
                    }
                }
            }
            _ => {
                // Unknown extended opcodes: the 0x40..=0x7F range rewinds
                // so the byte re-executes unprefixed, the rest are NOPs.
                if (0x40..=0x7F).contains(&code) {
                    self.pc.dec16();
                }
            }
        }
    }

    /// LDI/LDD: `(DE) <- (HL)`, both pointers stepped, BC counted down.
    fn block_ld<M: Memory>(&mut self, ctl: &mut M, flags: &mut CpuFlags, delta: BlockDelta) {
        let hl = self.regs.hl.get16();
        let de = self.regs.de.get16();
        let val = ctl.read(hl);
        ctl.write(de, val);
        self.regs.hl.set16(hl.wrapping_add(delta.offset()));
        self.regs.de.set16(de.wrapping_add(delta.offset()));
        let bc_nonzero = !self.regs.bc.dec16_is_zero();
        ops::ldx(self.af.get8hi(), val, bc_nonzero, flags);
    }

    /// CPI/CPD: compare A with `(HL)`, step HL, count BC down. Returns
    /// `true` when a repeat form must stop.
    fn block_cp<M: Memory>(&mut self, ctl: &mut M, flags: &mut CpuFlags, delta: BlockDelta) -> bool {
        let hl = self.regs.hl.get16();
        let val = ctl.read(hl);
        self.regs.hl.set16(hl.wrapping_add(delta.offset()));
        let bc_nonzero = !self.regs.bc.dec16_is_zero();
        ops::cpx(self.af.get8hi(), val, bc_nonzero, flags)
    }

    /// INI/IND: `(HL) <- IN(C)`, step HL, count B down.
    fn block_in<M: Memory + Io>(&mut self, ctl: &mut M, flags: &mut CpuFlags, delta: BlockDelta) {
        let val = ctl.read_io(self.regs.bc.get16());
        let hl = self.regs.hl.get16();
        ctl.write(hl, val);
        self.regs.hl.set16(hl.wrapping_add(delta.offset()));
        let b = self.regs.bc.get8hi().wrapping_sub(1);
        self.regs.bc.set8hi(b);
        ops::iox(b, flags);
    }

    /// OUTI/OUTD: `OUT(C) <- (HL)`, step HL, count B down.
    fn block_out<M: Memory + Io>(&mut self, ctl: &mut M, flags: &mut CpuFlags, delta: BlockDelta) {
        let hl = self.regs.hl.get16();
        let val = ctl.read(hl);
        ctl.write_io(self.regs.bc.get16(), val);
        self.regs.hl.set16(hl.wrapping_add(delta.offset()));
        let b = self.regs.bc.get8hi().wrapping_sub(1);
        self.regs.bc.set8hi(b);
        ops::iox(b, flags);
    }
}
