/*
    nascom2: a NASCOM-2 microcomputer emulator for the terminal.

    For the full copyright notice, see the lib.rs file.
*/
//! The keyboard matrix model.
//!
//! The NASCOM keyboard is wired as rows scanned by software; the monitor
//! drives a row counter through port 0 and reads column bits back. ASCII
//! input from the terminal is translated through the NAS-SYS `ktab` layout
//! into (row, column, shift) positions and queued. Because a terminal only
//! reports presses, each queued key is asserted in the matrix for a fixed
//! hold time and released; when the shift state has to change first, the
//! shift key alone is toggled and the queued key fires on the next tick.
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::trace;

/// Scanned matrix rows. Row 0 carries the modifier bits.
pub const MATRIX_ROWS: usize = 9;

const SHIFT_BIT: u8 = 1 << 4;
const KEY_HOLD: Duration = Duration::from_millis(100);

/// Matrix codes of the cursor keys, delivered by `ESC [ A..D`.
pub const KEY_UP: u8 = 0x46;
pub const KEY_DOWN: u8 = 0x36;
pub const KEY_RIGHT: u8 = 0x2E;
pub const KEY_LEFT: u8 = 0x3E;

/// ASCII to matrix-position map from the NAS-SYS 3 `ktab` table.
///
/// Bit 7 requests shift, bits 6..=3 hold the row (stored inverted, so the
/// real row is `9 - field`), bits 2..=0 the column. Zero means the
/// character has no key.
static KEY_MAP: [u8; 128] = [
    0x00, 0x00, 0x00, 0x00, // 00
    0x00, 0x00, 0x00, 0x00, // 04
    0x00, 0x00, 0x09, 0x00, // 08  \n
    0x00, 0x0E, 0x00, 0x00, // 0C  \r
    0x00, 0x00, 0x00, 0x00, // 10
    0x00, 0x00, 0x00, 0x00, // 14
    0x00, 0x00, 0x00, 0x89, // 18  ESC
    0x00, 0x00, 0x00, 0x00, // 1C
    0x14, 0x9C, 0x9B, 0xA3, // 20  spc ! " #
    0x92, 0xC2, 0xBA, 0xB2, // 24  $ % & '
    0xAA, 0xA2, 0x98, 0xA0, // 28  ( ) * +
    0x29, 0x0A, 0x21, 0x19, // 2C  , - . /
    0x1A, 0x1C, 0x1B, 0x23, // 30  0 1 2 3
    0x12, 0x42, 0x3A, 0x32, // 34  4 5 6 7
    0x2A, 0x22, 0x18, 0x20, // 38  8 9 : ;
    0xA9, 0x8A, 0xA1, 0x99, // 3C  < = > ?
    0x8D, 0x2C, 0x41, 0x13, // 40  @ A B C
    0x3B, 0x33, 0x43, 0x10, // 44  D E F G
    0x40, 0x2D, 0x38, 0x30, // 48  H I J K
    0x28, 0x31, 0x39, 0x25, // 4C  L M N O
    0x1D, 0x24, 0x15, 0x34, // 50  P Q R S
    0x45, 0x35, 0x11, 0x2B, // 54  T U V W
    0x44, 0x3D, 0x3C, 0x1E, // 58  X Y Z [
    0x9E, 0x16, 0x9A, 0x96, // 5C  \ ] ^ _
    0x00, 0xAC, 0xC1, 0x93, // 60  ` a b c
    0xBB, 0xB3, 0xC3, 0x90, // 64  d e f g
    0xC0, 0xAD, 0xB8, 0xB0, // 68  h i j k
    0xA8, 0xB1, 0xB9, 0xA5, // 6C  l m n o
    0x9D, 0xA4, 0x95, 0xB4, // 70  p q r s
    0xC5, 0xB5, 0x91, 0xAB, // 74  t u v w
    0xC4, 0xBD, 0xBC, 0x1E, // 78  x y z {
    0x9E, 0x16, 0x00, 0x08, // 7C  | } ~ DEL
];

/// Looks an ASCII character up in the matrix map.
pub fn lookup(ch: u8) -> Option<u8> {
    match KEY_MAP[usize::from(ch & 0x7F)] {
        0 => None,
        code => Some(code),
    }
}

/// Maps the final byte of a CSI cursor sequence to its matrix code.
pub fn arrow_code(ch: u8) -> Option<u8> {
    match ch {
        b'A' => Some(KEY_UP),
        b'B' => Some(KEY_DOWN),
        b'C' => Some(KEY_RIGHT),
        b'D' => Some(KEY_LEFT),
        _ => None,
    }
}

/// The pressed-key state as the port scanner sees it.
///
/// A tenth row backs the scanner's saturated row index 9; it always reads
/// as no keys down.
#[derive(Clone, Default, Debug)]
pub struct KeyMatrix([u8; MATRIX_ROWS + 1]);

impl KeyMatrix {
    /// Column bits of one row. Out-of-range rows scan as released.
    #[inline]
    pub fn row(&self, row: u8) -> u8 {
        self.0.get(usize::from(row)).copied().unwrap_or(0)
    }

    /// True when no key (and no modifier) is asserted.
    pub fn is_clear(&self) -> bool {
        self.0.iter().all(|&row| row == 0)
    }
}

/// Queued keystrokes plus the hold timer that paces their assertion.
#[derive(Default, Debug)]
pub struct KeyQueue {
    queue: VecDeque<u8>,
    held_since: Option<Instant>,
}

impl KeyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the key for an ASCII character, if it has one.
    pub fn push_char(&mut self, ch: u8) {
        if let Some(code) = lookup(ch) {
            trace!("key {:#04x} -> code {:#04x}", ch, code);
            self.queue.push_back(code);
        }
    }

    /// Queues a raw matrix code (cursor keys).
    pub fn push_code(&mut self, code: u8) {
        self.queue.push_back(code);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Advances the press/release model: while a key is held nothing
    /// changes; afterwards the matrix is released and the next queued key
    /// asserted. A needed shift change spends one tick of its own before
    /// the key itself goes down.
    pub fn service(&mut self, matrix: &mut KeyMatrix, now: Instant) {
        if let Some(since) = self.held_since {
            if now.saturating_duration_since(since) <= KEY_HOLD {
                return;
            }
            self.held_since = None;
        }

        // Release everything but the shift state.
        for row in &mut matrix.0[1..MATRIX_ROWS] {
            *row = 0;
        }

        let key = match self.queue.front() {
            Some(&key) => key,
            None => {
                matrix.0[0] = 0;
                return;
            }
        };

        // The table stores rows inverted relative to the scanner.
        let row = usize::from(9u8.saturating_sub((key & 0x78) >> 3));
        let col = key & 0x07;
        let shift = key & 0x80 != 0;

        if (matrix.0[0] & SHIFT_BIT != 0) != shift {
            matrix.0[0] ^= SHIFT_BIT;
        } else {
            matrix.0[row] |= 1 << col;
            self.queue.pop_front();
        }
        self.held_since = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_maps_letters_and_ignores_holes() {
        assert_eq!(lookup(b'A'), Some(0x2C));
        assert_eq!(lookup(b'a'), Some(0xAC));
        assert_eq!(lookup(b'0'), Some(0x1A));
        assert_eq!(lookup(b'\r'), Some(0x0E));
        assert_eq!(lookup(b'`'), None);
        assert_eq!(lookup(0x00), None);
        // Bit 7 is stripped before the table walk.
        assert_eq!(lookup(b'A' | 0x80), Some(0x2C));
    }

    #[test]
    fn arrows_map_to_their_matrix_codes() {
        assert_eq!(arrow_code(b'A'), Some(0x46));
        assert_eq!(arrow_code(b'B'), Some(0x36));
        assert_eq!(arrow_code(b'C'), Some(0x2E));
        assert_eq!(arrow_code(b'D'), Some(0x3E));
        assert_eq!(arrow_code(b'E'), None);
    }

    #[test]
    fn unshifted_key_asserts_then_releases() {
        let mut queue = KeyQueue::new();
        let mut matrix = KeyMatrix::default();
        let t0 = Instant::now();
        queue.push_char(b'A'); // code 0x2C: row 9-5=4, column 4
        queue.service(&mut matrix, t0);
        assert_eq!(matrix.row(4), 1 << 4);
        assert_eq!(matrix.row(0), 0);
        // Still held: nothing moves.
        queue.service(&mut matrix, t0 + Duration::from_millis(50));
        assert_eq!(matrix.row(4), 1 << 4);
        // Hold expired, queue empty: all released.
        queue.service(&mut matrix, t0 + Duration::from_millis(150));
        assert!(matrix.is_clear());
    }

    #[test]
    fn shifted_key_toggles_shift_first() {
        let mut queue = KeyQueue::new();
        let mut matrix = KeyMatrix::default();
        let t0 = Instant::now();
        queue.push_char(b'a'); // code 0xAC: shifted
        queue.service(&mut matrix, t0);
        // First tick: only the shift key went down.
        assert_eq!(matrix.row(0), SHIFT_BIT);
        assert_eq!(matrix.row(4), 0);
        assert!(!queue.is_empty());
        // Second tick: the key itself, shift still held.
        queue.service(&mut matrix, t0 + Duration::from_millis(150));
        assert_eq!(matrix.row(0), SHIFT_BIT);
        assert_eq!(matrix.row(4), 1 << 4);
        assert!(queue.is_empty());
        // Third tick: everything released.
        queue.service(&mut matrix, t0 + Duration::from_millis(300));
        assert!(matrix.is_clear());
    }

    #[test]
    fn keys_queue_one_at_a_time() {
        let mut queue = KeyQueue::new();
        let mut matrix = KeyMatrix::default();
        let t0 = Instant::now();
        queue.push_char(b'A');
        queue.push_char(b'B'); // code 0x41: row 9-8=1, column 1
        queue.service(&mut matrix, t0);
        assert_eq!(matrix.row(4), 1 << 4);
        assert_eq!(matrix.row(1), 0);
        queue.service(&mut matrix, t0 + Duration::from_millis(150));
        assert_eq!(matrix.row(4), 0);
        assert_eq!(matrix.row(1), 1 << 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn guard_row_scans_as_released() {
        let matrix = KeyMatrix::default();
        assert_eq!(matrix.row(9), 0);
        assert_eq!(matrix.row(200), 0);
    }
}
