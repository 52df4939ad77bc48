//! Flat, fixed-length cell memory shared by code and data.

use std::ops::Index;

use crate::cell::{Cell, WideCell};
use crate::error::VmError;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Memory {
  cells: Vec<Cell>
}

impl Memory {

  pub fn new(cells: Vec<Cell>) -> Memory {
    Memory { cells }
  }

  /// Converts a cell value to an index, faulting if it does not name a cell.
  pub fn locate(&self, address: WideCell) -> Result<usize, VmError> {
    if address < 0 || address >= self.cells.len() as WideCell {
      return Err(VmError::AddressOutOfRange { address, len: self.cells.len() });
    }
    Ok(address as usize)
  }

  pub fn read(&self, address: WideCell) -> Result<Cell, VmError> {
    let idx = self.locate(address)?;
    Ok(self.cells[idx])
  }

  pub fn write(&mut self, address: WideCell, value: Cell) -> Result<(), VmError> {
    let idx = self.locate(address)?;
    self.cells[idx] = value;
    Ok(())
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn as_slice(&self) -> &[Cell] {
    &self.cells
  }

  pub fn into_vec(self) -> Vec<Cell> {
    self.cells
  }
}

impl Index<usize> for Memory {
  type Output = Cell;

  fn index(&self, idx: usize) -> &Cell {
    &self.cells[idx]
  }
}

impl From<Vec<Cell>> for Memory {
  fn from(cells: Vec<Cell>) -> Memory {
    Memory::new(cells)
  }
}
