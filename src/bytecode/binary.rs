/*!
  This module is responsible for the encoding and decoding of instructions to and from cells.

*/

use crate::cell::{Cell, WideCell};
use crate::error::VmError;
use crate::memory::Memory;

use super::{Instruction, Operation};

/**
  Decodes the instruction at `ip`. Only a `lit` reads past `ip`; a `lit` in the last cell
  of memory has no operand and faults.
*/
pub fn decode_instruction(memory: &Memory, ip: usize) -> Result<Instruction, VmError> {
  let cell = memory.read(ip as WideCell)?;

  let instruction =
    match Operation::from_cell(cell) {

      Some(Operation::Lit) => {
        Instruction::Literal(memory.read(ip as WideCell + 1)?)
      }

      Some(operation) => Instruction::Nullary(operation),

      None => Instruction::Unknown(cell)

    };

  Ok(instruction)
}

/// Appends the encoded instruction to `code`.
pub fn encode_instruction(instruction: Instruction, code: &mut Vec<Cell>) {
  match instruction {

    Instruction::Literal(value) => {
      code.push(Operation::Lit.code());
      code.push(value);
    }

    Instruction::Nullary(operation) => {
      code.push(operation.code());
    }

    Instruction::Unknown(cell) => {
      code.push(cell);
    }

  }
}

/**
  Decodes `count` instructions starting at `start`, stopping early at the end of memory.
  Returns each instruction with its address. A trailing `lit` without an operand is shown
  as an unknown cell.
*/
pub fn disassemble(memory: &Memory, start: usize, count: usize) -> Vec<(usize, Instruction)> {
  let mut listing = Vec::with_capacity(count);
  let mut address = start;

  while listing.len() < count && address < memory.len() {
    let instruction =
      decode_instruction(memory, address).unwrap_or(Instruction::Unknown(memory[address]));
    listing.push((address, instruction));
    address += instruction.size();
  }

  listing
}
