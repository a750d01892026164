/*
    nascom2: a NASCOM-2 microcomputer emulator for the terminal.

    For the full copyright notice, see the lib.rs file.
*/
//! The `.nas` image format: the NASCOM monitor's native memory-dump text.
//!
//! Each line carries a 16-bit hex load address followed by eight hex data
//! bytes; anything after the ninth field (dumps append a checksum) is
//! ignored. A line starting with `.` ends the image. A line that parses as
//! neither is a hard error: images are small and a silently skipped record
//! leaves memory subtly corrupt.
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, error};

/// One parsed image record: eight bytes at a load address.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NasRecord {
    pub addr: u16,
    pub data: [u8; 8],
}

/// Why an image failed to load.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be opened or read.
    Io { path: PathBuf, source: io::Error },
    /// A line was neither a record nor the `.` terminator.
    Malformed { path: PathBuf, line: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            LoadError::Malformed { path, line } => {
                write!(f, "{}: malformed record on line {}", path.display(), line)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Malformed { .. } => None,
        }
    }
}

/// Parses one image line. `Ok(None)` is the `.` terminator.
pub fn parse_line(line: &str) -> Result<Option<NasRecord>, ()> {
    if line.starts_with('.') {
        return Ok(None);
    }
    let mut fields = line.split_whitespace();
    let addr = fields
        .next()
        .and_then(|f| u16::from_str_radix(f, 16).ok())
        .ok_or(())?;
    let mut data = [0u8; 8];
    for slot in &mut data {
        *slot = fields
            .next()
            .and_then(|f| u8::from_str_radix(f, 16).ok())
            .ok_or(())?;
    }
    Ok(Some(NasRecord { addr, data }))
}

/// Reads a `.nas` file, feeding every byte to `store`. Addresses wrap at
/// the top of memory like the 16-bit bus they describe.
pub fn load_file<P, F>(path: P, mut store: F) -> Result<(), LoadError>
where
    P: AsRef<Path>,
    F: FnMut(u16, u8),
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.into(),
        source,
    })?;
    let mut records = 0usize;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| LoadError::Io {
            path: path.into(),
            source,
        })?;
        match parse_line(&line) {
            Ok(None) => break,
            Ok(Some(record)) => {
                for (i, &val) in record.data.iter().enumerate() {
                    store(record.addr.wrapping_add(i as u16), val);
                }
                records += 1;
            }
            Err(()) => {
                error!("{}: malformed record on line {}", path.display(), index + 1);
                return Err(LoadError::Malformed {
                    path: path.into(),
                    line: index + 1,
                });
            }
        }
    }
    debug!("{}: loaded {} records", path.display(), records);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_record() {
        let record = parse_line("0C50 31 32 33 34 35 36 37 38")
            .unwrap()
            .unwrap();
        assert_eq!(record.addr, 0x0C50);
        assert_eq!(record.data, [0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38]);
    }

    #[test]
    fn ignores_trailing_checksum_field() {
        let record = parse_line("1000 01 02 03 04 05 06 07 08 24")
            .unwrap()
            .unwrap();
        assert_eq!(record.addr, 0x1000);
        assert_eq!(record.data[7], 0x08);
    }

    #[test]
    fn dot_terminates() {
        assert_eq!(parse_line(".").unwrap(), None);
        assert_eq!(parse_line(". anything").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_line("").is_err());
        assert!(parse_line("zz 01 02 03 04 05 06 07 08").is_err());
        assert!(parse_line("1000 01 02 03").is_err());
        assert!(parse_line("1000 01 02 03 04 05 06 07 xx").is_err());
    }

    #[test]
    fn addresses_wrap() {
        let record = parse_line("FFFE AA BB CC DD EE FF 11 22")
            .unwrap()
            .unwrap();
        let mut seen = Vec::new();
        for (i, &val) in record.data.iter().enumerate() {
            seen.push((record.addr.wrapping_add(i as u16), val));
        }
        assert_eq!(seen[0], (0xFFFE, 0xAA));
        assert_eq!(seen[2], (0x0000, 0xCC));
    }
}
