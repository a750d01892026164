/*
    nascom2: a NASCOM-2 microcomputer emulator for the terminal.

    For the full copyright notice, see the lib.rs file.
*/
//! Whole-machine tests: programs running on the assembled NASCOM against
//! the real memory map, video hook and keyboard port.
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use nascom2::keyboard::KeyQueue;
use nascom2::loader::LoadError;
use nascom2::{Cpu, Memory, Nascom};

/// A machine rendering frames into a byte buffer.
fn machine() -> Nascom<Vec<u8>> {
    Nascom::new(Vec::new())
}

fn poke_code(machine: &mut Nascom<Vec<u8>>, addr: u16, code: &[u8]) {
    for (i, &byte) in code.iter().enumerate() {
        machine.memory.poke(addr.wrapping_add(i as u16), byte);
    }
}

fn temp_image(name: &str, contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("nascom2-test-{}-{}", std::process::id(), name));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn rom_window_invariants_hold_for_cpu_stores() {
    let mut nascom = machine();
    // LD A,0x5A; LD (0x0100),A; LD (0x2000),A; LD (0xE100),A
    poke_code(
        &mut nascom,
        0x1000,
        &[
            0x3E, 0x5A, 0x32, 0x00, 0x01, 0x32, 0x00, 0x20, 0x32, 0x00, 0xE1,
        ],
    );
    let mut cpu = Cpu::new();
    cpu.set_pc(0x1000);
    for _ in 0..4 {
        cpu.step(&mut nascom);
    }
    assert_eq!(nascom.read(0x0100), 0x00);
    assert_eq!(nascom.read(0x2000), 0x5A);
    assert_eq!(nascom.read(0xE100), 0x00);
}

#[test]
fn program_writing_video_ram_renders_a_frame() {
    let mut nascom = machine();
    // LD HL,0x080A; LD (HL),'N'; INC HL; LD (HL),'A'; HALT
    poke_code(
        &mut nascom,
        0x1000,
        &[0x21, 0x0A, 0x08, 0x36, b'N', 0x23, 0x36, b'A', 0x76],
    );
    let mut cpu = Cpu::new();
    cpu.set_pc(0x1000);
    for _ in 0..5 {
        cpu.step(&mut nascom);
    }
    assert!(cpu.is_halted());
    let frames = nascom.memory.into_screen().into_inner();
    let text = String::from_utf8(frames).unwrap();
    // Two stores, two frames; the second one shows both characters on the
    // first line below the status line.
    assert_eq!(text.matches("\x1b[H").count(), 2);
    assert!(text.contains("NA"));
}

#[test]
fn monitor_style_keyboard_scan_sees_a_key() {
    let mut nascom = machine();
    let mut keys = KeyQueue::new();
    keys.push_char(b'A'); // matrix row 4, column 4
    keys.service(nascom.ports.matrix_mut(), Instant::now());

    // The NAS-SYS scan: reset the row counter with a bit-1 strobe, then
    // walk to row 4 with bit-0 strobes and read the columns.
    let mut program = vec![
        0x3E, 0x02, 0xD3, 0x00, // LD A,2; OUT (0),A   raise bit 1
        0x3E, 0x00, 0xD3, 0x00, // LD A,0; OUT (0),A   falling edge: reset
    ];
    for _ in 0..4 {
        program.extend_from_slice(&[
            0x3E, 0x01, 0xD3, 0x00, // LD A,1; OUT (0),A   raise bit 0
            0x3E, 0x00, 0xD3, 0x00, // LD A,0; OUT (0),A   falling edge: advance
        ]);
    }
    program.extend_from_slice(&[0xDB, 0x00, 0x76]); // IN A,(0); HALT
    poke_code(&mut nascom, 0x1000, &program);

    let mut cpu = Cpu::new();
    cpu.set_pc(0x1000);
    while !cpu.is_halted() {
        cpu.step(&mut nascom);
    }
    // Row 4 selected; column 4 is down, active low.
    assert_eq!(cpu.get_acc(), !(1u8 << 4));
}

#[test]
fn nas_image_loads_into_rom_and_runs() {
    let path = temp_image(
        "boot.nas",
        "0000 3E 42 32 00 0D 76 00 00\n\
         .\n\
         ignored trailing garbage\n",
    );
    let mut nascom = machine();
    nascom.memory.load_nas_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    // The image landed below ROM_TOP, which a CPU store could never do.
    assert_eq!(nascom.read(0x0000), 0x3E);
    let mut cpu = Cpu::new();
    while !cpu.is_halted() {
        cpu.step(&mut nascom);
    }
    assert_eq!(nascom.read(0x0D00), 0x42);
}

#[test]
fn nas_records_need_not_be_ordered_or_contiguous() {
    let path = temp_image(
        "scatter.nas",
        "0C08 09 0A 0B 0C 0D 0E 0F 10\n\
         0C00 01 02 03 04 05 06 07 08\n\
         .\n",
    );
    let mut nascom = machine();
    nascom.memory.load_nas_file(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(nascom.read(0x0C00), 0x01);
    assert_eq!(nascom.read(0x0C07), 0x08);
    assert_eq!(nascom.read(0x0C08), 0x09);
    assert_eq!(nascom.read(0x0C0F), 0x10);
}

#[test]
fn malformed_nas_line_aborts_the_load() {
    let path = temp_image("bad.nas", "0C00 01 02 zz 04 05 06 07 08\n.\n");
    let mut nascom = machine();
    let err = nascom.memory.load_nas_file(&path).unwrap_err();
    fs::remove_file(&path).unwrap();
    match err {
        LoadError::Malformed { line, .. } => assert_eq!(line, 1),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn missing_image_reports_io_error() {
    let mut nascom = machine();
    let err = nascom
        .memory
        .load_nas_file("/nonexistent/nassys3.nal")
        .unwrap_err();
    match err {
        LoadError::Io { .. } => {}
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn stack_lives_in_work_ram() {
    let mut nascom = machine();
    // LD SP,0x1000; LD BC,0x1234; PUSH BC; POP DE; HALT
    poke_code(
        &mut nascom,
        0x0C00,
        &[0x31, 0x00, 0x10, 0x01, 0x34, 0x12, 0xC5, 0xD1, 0x76],
    );
    let mut cpu = Cpu::new();
    cpu.set_pc(0x0C00);
    while !cpu.is_halted() {
        cpu.step(&mut nascom);
    }
    assert_eq!(cpu.get_reg16(nascom2::StkReg16::DE), 0x1234);
    assert_eq!(cpu.get_sp(), 0x1000);
}
