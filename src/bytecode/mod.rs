/*!

  An image is a flat sequence of 32 bit signed cells. Every instruction is one cell holding
  its opcode, except `lit`, which is followed by a second cell holding the literal value.
  Opcodes run from 0 to 26. Any other value in an opcode position is decoded as
  `Instruction::Unknown` and executes as a no-op unless the machine is configured to be
  strict about opcodes.

  Code and data share one address space, so nothing in an image marks a cell as code. The
  decoder only ever looks at the cell at the instruction pointer (and the operand of a
  `lit`); a disassembly of an arbitrary range may well be decoding data.

*/

mod binary;
mod instruction;
mod assembly;
mod symboltable;

pub use binary::{decode_instruction, encode_instruction, disassemble};
pub use instruction::{Instruction, Operation};
pub use assembly::{assemble, Assembly};
pub use symboltable::SymbolTable;
