/*
    nascom2: a NASCOM-2 microcomputer emulator for the terminal.

    nascom2 is free software: you can redistribute it and/or modify it
    under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    nascom2 is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.

    Author contact information: see Cargo.toml file, section [package.authors].
*/
/*! # nascom2

An emulator of the NASCOM-2, a 1979 Z80 single-board home computer, living
in an ordinary terminal: the memory-mapped video RAM renders as ANSI text
and the scanned keyboard matrix is fed from raw stdin.

```text
  _______
=|       |=
=|       |=                    ___________
=|       |=                   |           |=:::: .nas images
=|  Cpu  |= <---------------> |  Memory   |
=|       |=                   |___________|----> ANSI frames
=|  Z80  |=                    ___________
=|       |= <---------------> |   Ports   |<---- key matrix
=|       |=                   |___________|
=|_______|=
```

The building blocks mirror the machine: [Cpu] executes one instruction per
[step](Cpu::step) against anything implementing the [Memory] and [Io]
seams; [NascomMemory](memory::NascomMemory) is the 64 KiB map with the ROM
write-guard and the video redraw hook; [NascomPorts](ports::NascomPorts)
scans the [keyboard matrix](keyboard::KeyMatrix) through port 0. [Nascom]
wires the two halves together for the host loop.

No interrupt is ever delivered, no T-state is counted: the NAS-SYS monitor
polls for everything, and this emulator follows it instruction by
instruction.
*/
pub mod bus;
mod cpu;
pub mod keyboard;
pub mod loader;
pub mod memory;
pub mod ports;
pub mod screen;
pub mod tty;

use std::io::Write;

pub use bus::{Io, Memory};
pub use cpu::{
    Condition, Cpu, CpuFlags, InterruptMode, Prefix, Reg16, Reg8, RegisterPair, StkReg16,
};

use memory::NascomMemory;
use ports::NascomPorts;
use screen::Screen;

/// The assembled machine: memory with its video hook plus the port bus.
///
/// [Cpu::step] takes one control value implementing both bus traits; this
/// is that value for the NASCOM-2.
pub struct Nascom<W: Write> {
    pub memory: NascomMemory<W>,
    pub ports: NascomPorts,
}

impl<W: Write> Nascom<W> {
    /// Builds the machine around the writer that will carry video frames.
    pub fn new(out: W) -> Self {
        Nascom {
            memory: NascomMemory::new(Screen::new(out)),
            ports: NascomPorts::new(),
        }
    }
}

impl<W: Write> Memory for Nascom<W> {
    #[inline]
    fn read(&self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    #[inline]
    fn write(&mut self, addr: u16, val: u8) {
        self.memory.write(addr, val)
    }
}

impl<W: Write> Io for Nascom<W> {
    #[inline]
    fn read_io(&mut self, port: u16) -> u8 {
        self.ports.read_io(port)
    }

    #[inline]
    fn write_io(&mut self, port: u16, data: u8) {
        self.ports.write_io(port, data)
    }
}
