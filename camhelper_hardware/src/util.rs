use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{HwError, Result};

/// Write `value` to a sysfs-style register file, replacing its content.
pub fn write_register(path: &Path, value: &str) -> Result<()> {
    fs::write(path, value).map_err(|source| HwError::Register {
        path: path.display().to_string(),
        source,
    })
}

/// Read the first line of a register file, without the line terminator.
pub fn read_first_line(path: &Path) -> Result<String> {
    let file = fs::File::open(path).map_err(|source| HwError::Register {
        path: path.display().to_string(),
        source,
    })?;
    let mut line = String::new();
    let n = BufReader::new(file)
        .read_line(&mut line)
        .map_err(|source| HwError::Register {
            path: path.display().to_string(),
            source,
        })?;
    if n == 0 {
        return Err(HwError::EmptyRegister(path.display().to_string()));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
