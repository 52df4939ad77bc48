//! The data and address stacks. Both are unbounded `Vec`s of cells; popping an empty stack is
//! a `StackUnderflow` fault naming which stack ran dry.

use std::fmt::{Display, Formatter};

use crate::cell::Cell;
use crate::error::VmError;

pub const DATA_DEPTH_HINT   : usize = 128;
pub const ADDRESS_DEPTH_HINT: usize = 1024;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StackKind {
  Data,
  Address
}

impl Display for StackKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      StackKind::Data    => write!(f, "data"),
      StackKind::Address => write!(f, "address")
    }
  }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stack {
  kind  : StackKind,
  cells : Vec<Cell>
}

impl Stack {

  pub fn new(kind: StackKind) -> Stack {
    let hint = match kind {
      StackKind::Data    => DATA_DEPTH_HINT,
      StackKind::Address => ADDRESS_DEPTH_HINT
    };
    Stack {
      kind,
      cells : Vec::with_capacity(hint)
    }
  }

  /// Builds a stack already holding `cells`, bottom first.
  pub fn from_cells(kind: StackKind, cells: &[Cell]) -> Stack {
    let mut stack = Stack::new(kind);
    stack.cells.extend_from_slice(cells);
    stack
  }

  pub fn push(&mut self, value: Cell) {
    self.cells.push(value);
  }

  pub fn pop(&mut self) -> Result<Cell, VmError> {
    self.cells.pop().ok_or(VmError::StackUnderflow(self.kind))
  }

  pub fn top(&self) -> Result<Cell, VmError> {
    self.cells.last().copied().ok_or(VmError::StackUnderflow(self.kind))
  }

  pub fn top_mut(&mut self) -> Result<&mut Cell, VmError> {
    let kind = self.kind;
    self.cells.last_mut().ok_or(VmError::StackUnderflow(kind))
  }

  /// Pops the top entry and combines it into the entry beneath, which becomes the new top.
  /// `op` receives `(second, top)`.
  pub fn fold_top<F>(&mut self, op: F) -> Result<(), VmError>
    where F: FnOnce(Cell, Cell) -> Cell
  {
    let top    = self.pop()?;
    let second = self.top_mut()?;
    *second = op(*second, top);
    Ok(())
  }

  pub fn kind(&self) -> StackKind {
    self.kind
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  /// The entries bottom first.
  pub fn as_slice(&self) -> &[Cell] {
    &self.cells
  }

  pub fn into_vec(self) -> Vec<Cell> {
    self.cells
  }
}
