//! The post-run state dump read by external test harnesses.
//!
//! The dump is a file separator followed by three groups, data stack, address stack, and memory,
//! separated by group separators. Each group is its cells in decimal joined by single spaces.

use std::io::{self, Write};

use crate::cell::Cell;
use crate::vm::FinalState;

/// ASCII file separator, written once before the dump.
pub const FILE_SEPARATOR  : u8 = 0x1C;
/// ASCII group separator, written between the groups.
pub const GROUP_SEPARATOR : u8 = 0x1D;

fn write_group<W: Write>(out: &mut W, cells: &[Cell]) -> io::Result<()> {
  for (i, cell) in cells.iter().enumerate() {
    if i > 0 {
      out.write_all(b" ")?;
    }
    write!(out, "{}", cell)?;
  }
  Ok(())
}

pub fn write_dump<W: Write>(out: &mut W, state: &FinalState) -> io::Result<()> {
  out.write_all(&[FILE_SEPARATOR])?;
  write_group(out, &state.data)?;
  out.write_all(&[GROUP_SEPARATOR])?;
  write_group(out, &state.address)?;
  out.write_all(&[GROUP_SEPARATOR])?;
  write_group(out, &state.memory)?;
  out.flush()
}
