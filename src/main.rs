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
//! The host loop: load the monitor images, clear the screen, then poll the
//! keyboard and step the CPU forever. Stdout belongs to the emulated
//! display, so diagnostics go to a log file.
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use arrayvec::ArrayVec;
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{Config, WriteLogger};

use nascom2::keyboard::{self, KeyQueue};
use nascom2::tty::RawTty;
use nascom2::{Cpu, Nascom};

/// The monitor, its test program and BASIC, loaded in this order.
const DEFAULT_IMAGES: [&str; 3] = ["nassys3.nal", "nastest.nal", "basic.nal"];

const LOG_FILE: &str = "nascom2.log";

#[derive(Parser)]
#[command(name = "nascom2", version, about = "NASCOM-2 emulator for the terminal")]
struct Args {
    /// Image files to load instead of the default monitor set
    #[arg(long = "rom", value_name = "FILE")]
    roms: Vec<PathBuf>,

    /// Busy-wait iterations between instructions; tames the key repeat
    #[arg(long, value_name = "N", default_value_t = 2_000)]
    delay: u32,

    /// Verbosity of the log file
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    WriteLogger::init(args.log_level, Config::default(), File::create(LOG_FILE)?)?;

    let mut machine = Nascom::new(std::io::stdout());
    let images: Vec<PathBuf> = if args.roms.is_empty() {
        DEFAULT_IMAGES.iter().map(|&name| PathBuf::from(name)).collect()
    } else {
        args.roms
    };
    for path in &images {
        machine.memory.load_nas_file(path)?;
        info!("loaded {}", path.display());
    }

    machine.memory.screen_mut().clear()?;
    let mut tty = RawTty::new()?;
    let mut keys = KeyQueue::new();
    let mut cpu = Cpu::new();
    info!("entering the emulation loop");

    loop {
        instruction_delay(args.delay);
        poll_keyboard(&mut tty, &mut keys);
        keys.service(machine.ports.matrix_mut(), Instant::now());
        cpu.step(&mut machine);
    }
}

/// Slows the emulation to something a 1979 keyboard handler expects; an
/// unpaced loop makes the monitor's key repeat unusable.
fn instruction_delay(count: u32) {
    for _ in 0..count {
        std::hint::spin_loop();
    }
}

/// Drains at most one keystroke from the terminal. An ESC byte with
/// exactly two more bytes pending is taken as a CSI cursor sequence.
fn poll_keyboard(tty: &mut RawTty, keys: &mut KeyQueue) {
    let pending = tty.available();
    if pending == 0 {
        return;
    }
    let byte = match tty.read_byte() {
        Some(byte) => byte,
        None => return,
    };
    if byte == 0x1B && pending == 3 {
        let mut tail: ArrayVec<u8, 2> = ArrayVec::new();
        while !tail.is_full() {
            match tty.read_byte() {
                Some(byte) => tail.push(byte),
                None => return,
            }
        }
        if let Some(code) = keyboard::arrow_code(tail[1]) {
            keys.push_code(code);
        }
    } else {
        keys.push_char(byte);
    }
}
