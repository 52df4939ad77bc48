use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, IntoStaticStr, EnumString, EnumIter};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::cell::Cell;

/**
  Opcodes of the virtual machine.

  The discriminants are the values stored in memory, so the order the opcodes are listed
  below is significant. The `strum` names are the assembly mnemonics.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq,         PartialEq, Debug,            Hash
)]
#[repr(u8)]
pub enum Operation {
  #[strum(to_string = "nop")]     Nop,       // 0
  #[strum(to_string = "lit")]     Lit,       // lit( value )
  #[strum(to_string = "dup")]     Dup,
  #[strum(to_string = "drop")]    Drop,
  #[strum(to_string = "swap")]    Swap,
  #[strum(to_string = "push")]    Push,      // data -> address
  #[strum(to_string = "pop")]     Pop,       // address -> data

  // Control flow //
  #[strum(to_string = "jump")]    Jump,      // 7
  #[strum(to_string = "call")]    Call,
  #[strum(to_string = "if")]      If,
  #[strum(to_string = "return")]  Return,

  // Comparison //
  #[strum(to_string = "eq")]      Eq,        // 11
  #[strum(to_string = "neq")]     Neq,
  #[strum(to_string = "lt")]      Lt,
  #[strum(to_string = "gt")]      Gt,

  // Memory //
  #[strum(to_string = "fetch")]   Fetch,     // 15
  #[strum(to_string = "store")]   Store,

  // Arithmetic //
  #[strum(to_string = "add")]     Add,       // 17
  #[strum(to_string = "sub")]     Sub,
  #[strum(to_string = "mul")]     Mul,
  /// ( dividend divisor -- quotient remainder ): the remainder ends up on top.
  #[strum(to_string = "divmod")]  DivMod,
  #[strum(to_string = "and")]     And,
  #[strum(to_string = "or")]      Or,
  #[strum(to_string = "xor")]     Xor,
  #[strum(to_string = "shift")]   Shift,

  #[strum(to_string = "zret", serialize = "0;")]
                                  ZeroReturn, // 25
  #[strum(to_string = "end")]     End,        // 26
}

pub const MAX_OPCODE: u8 = 26u8;

impl Operation {
  pub fn code(&self) -> Cell {
    Into::<u8>::into(*self) as Cell
  }

  /// Decodes a cell into an operation, if it holds a valid opcode.
  pub fn from_cell(cell: Cell) -> Option<Operation> {
    if cell < 0 || cell > MAX_OPCODE as Cell {
      return None;
    }
    Operation::try_from_primitive(cell as u8).ok()
  }

  /// The number of operand cells following the opcode.
  pub fn arity(&self) -> usize {
    match self {
      Operation::Lit => 1,
      _              => 0
    }
  }
}

/// A decoded instruction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// [lit][value]
  Literal(Cell),
  /// [opcode]
  Nullary(Operation),
  /// A cell in opcode position holding no valid opcode.
  Unknown(Cell),
}

impl Instruction {
  /// Size in cells.
  pub fn size(&self) -> usize {
    match self {
      Instruction::Literal(_) => 2,
      _                       => 1
    }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Instruction::Literal(value) => {
        write!(f, "{} {}", Operation::Lit, value)
      }

      Instruction::Nullary(opcode) => {
        write!(f, "{}", opcode)
      }

      Instruction::Unknown(cell) => {
        write!(f, "??? {}", cell)
      }

    }
  }
}
