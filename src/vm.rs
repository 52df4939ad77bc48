//! The Nga virtual machine: a fetch-decode-execute loop over one flat memory with a data stack
//! and an address stack.

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};
use tracing::{info, trace};

use crate::bytecode::{decode_instruction, disassemble, Instruction, Operation};
use crate::cell::*;
use crate::config::VmConfig;
use crate::error::VmError;
use crate::memory::Memory;
use crate::stack::{Stack, StackKind};

/// Number of memory cells shown around `ip` when displaying the machine.
const MEMORY_WINDOW : usize = 8;
/// Number of upcoming instructions shown when displaying the machine.
const CODE_WINDOW   : usize = 6;

/// Why a run stopped without a fault.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Halt {
  /// An `end` instruction was executed.
  End,
  /// `ip` moved past the last cell of memory.
  EndOfMemory
}

/// What an executed instruction does to `ip`.
enum Flow {
  Next,
  Goto(usize),
  Halt
}

/// Everything left over after a run, in the order it is dumped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FinalState {
  pub data    : Vec<Cell>,
  pub address : Vec<Cell>,
  pub memory  : Vec<Cell>
}

pub struct Machine {
  /// Code and data.
  memory   : Memory,
  /// Operands.
  data     : Stack,
  /// Return addresses.
  address  : Stack,
  /// Instruction pointer, a cursor into `memory`.
  ip       : usize,

  strict_opcodes : bool,
  /// Number of instructions executed so far.
  executed : u64,
  halted   : Option<Halt>,
}

impl Machine {

  // region Display methods

  fn make_register_table<T> (
      name      : &str,
      registers : &[T],
      highlight : Option<usize>,
      start     : usize
    ) -> Table
    where T: Display
  {

    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (i, cell) in registers.iter().enumerate() {
      match Some(i) == highlight {

        true  => {
          table.add_row(
            row![r->format!("* --> {}[{}] =", name, i+start), format!("{}", cell)]
          );
        }

        false => {
          table.add_row(
            row![r->format!("{}[{}] =", name, i+start), format!("{}", cell)]
          );
        }

      } // end match on highlight
    } // end for
    table
  }

  fn make_code_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Instruction"]);

    for (address, instruction) in disassemble(&self.memory, self.ip, CODE_WINDOW) {
      table.add_row(row![r->format!("{}", address), format!("{}", instruction)]);
    }
    table
  }

  // endregion

  // region Construction and inspection

  /// A machine over `image` with the default configuration. The image is used as is; padding
  /// is the loader's job.
  pub fn new(image: Vec<Cell>) -> Machine {
    Machine::with_config(image, &VmConfig::default())
  }

  pub fn with_config(image: Vec<Cell>, config: &VmConfig) -> Machine {
    Machine {
      memory         :  Memory::new(image),
      data           :  Stack::new(StackKind::Data),
      address        :  Stack::new(StackKind::Address),
      ip             :  0,
      strict_opcodes :  config.strict_opcodes,
      executed       :  0,
      halted         :  None,
    }
  }

  /// Replaces the data stack with `cells`, bottom first.
  pub fn with_data_stack(mut self, cells: &[Cell]) -> Machine {
    self.data = Stack::from_cells(StackKind::Data, cells);
    self
  }

  /// Replaces the address stack with `cells`, bottom first.
  pub fn with_address_stack(mut self, cells: &[Cell]) -> Machine {
    self.address = Stack::from_cells(StackKind::Address, cells);
    self
  }

  pub fn ip(&self) -> usize {
    self.ip
  }

  pub fn executed(&self) -> u64 {
    self.executed
  }

  pub fn halted(&self) -> Option<Halt> {
    self.halted
  }

  pub fn data_stack(&self) -> &[Cell] {
    self.data.as_slice()
  }

  pub fn address_stack(&self) -> &[Cell] {
    self.address.as_slice()
  }

  pub fn memory(&self) -> &[Cell] {
    self.memory.as_slice()
  }

  pub fn into_final_state(self) -> FinalState {
    FinalState {
      data    : self.data.into_vec(),
      address : self.address.into_vec(),
      memory  : self.memory.into_vec()
    }
  }

  // endregion

  // region Execution

  /**
    Runs until an `end` instruction, the end of memory, or a fault. After a fault `ip` still
    points at the faulting instruction and the stacks hold whatever that instruction left.
  */
  pub fn run(&mut self) -> Result<Halt, VmError> {
    info!(cells = self.memory.len(), "running image");
    loop {
      if let Some(halt) = self.step()? {
        info!(?halt, ip = self.ip, executed = self.executed, "halted");
        return Ok(halt);
      }
    }
  }

  /// Executes one instruction. Returns the halt reason once the machine has stopped.
  pub fn step(&mut self) -> Result<Option<Halt>, VmError> {
    if let Some(halt) = self.halted {
      return Ok(Some(halt));
    }
    if self.ip >= self.memory.len() {
      self.halted = Some(Halt::EndOfMemory);
      return Ok(self.halted);
    }

    let instruction = decode_instruction(&self.memory, self.ip)?;
    trace!(ip = self.ip, %instruction, "execute");

    let flow = self.execute(instruction)?;
    self.executed += 1;
    match flow {
      Flow::Next         => self.ip += instruction.size(),
      Flow::Goto(target) => self.ip = target,
      Flow::Halt         => self.halted = Some(Halt::End)
    }

    #[cfg(feature = "trace_computation")] trace!("\n{}", self);

    Ok(self.halted)
  }

  fn execute(&mut self, instruction: Instruction) -> Result<Flow, VmError> {
    let operation =
      match instruction {

        Instruction::Literal(value) => {
          self.data.push(value);
          return Ok(Flow::Next);
        }

        Instruction::Unknown(cell) => {
          if self.strict_opcodes {
            return Err(VmError::InvalidOpcode(cell));
          }
          return Ok(Flow::Next);
        }

        Instruction::Nullary(operation) => operation

      };

    match operation {

      Operation::Nop => {}

      Operation::Lit => {
        unreachable!("Unreachable: `lit` is always decoded with its operand.");
      }

      Operation::Dup => {
        let value = self.data.top()?;
        self.data.push(value);
      }

      Operation::Drop => {
        self.data.pop()?;
      }

      Operation::Swap => {
        let a = self.data.pop()?;
        let b = self.data.pop()?;
        self.data.push(a);
        self.data.push(b);
      }

      Operation::Push => {
        let value = self.data.pop()?;
        self.address.push(value);
      }

      Operation::Pop => {
        let value = self.address.pop()?;
        self.data.push(value);
      }

      // region Control flow

      Operation::Jump => {
        let target = self.data.pop()?;
        return Ok(Flow::Goto(self.jump_target(target)?));
      }

      Operation::Call => {
        self.address.push(self.ip as Cell);
        let target = self.data.pop()?;
        return Ok(Flow::Goto(self.jump_target(target)?));
      }

      Operation::If => {
        let false_target = self.data.pop()?;
        let true_target  = self.data.pop()?;
        let condition    = self.data.pop()?;
        self.address.push(self.ip as Cell);
        let target = match condition != 0 {
          true  => true_target,
          false => false_target
        };
        return Ok(Flow::Goto(self.jump_target(target)?));
      }

      Operation::Return => {
        let saved = self.address.pop()?;
        return Ok(Flow::Goto(self.return_target(saved)?));
      }

      Operation::ZeroReturn => {
        if self.data.top()? == 0 {
          self.data.pop()?;
          let saved = self.address.pop()?;
          return Ok(Flow::Goto(self.return_target(saved)?));
        }
      }

      Operation::End => {
        return Ok(Flow::Halt);
      }

      // endregion

      // region Comparison

      Operation::Eq  => self.data.fold_top(|b, a| flag(b == a))?,
      Operation::Neq => self.data.fold_top(|b, a| flag(b != a))?,
      Operation::Lt  => self.data.fold_top(|b, a| flag(b <  a))?,
      Operation::Gt  => self.data.fold_top(|b, a| flag(b >  a))?,

      // endregion

      // region Memory

      Operation::Fetch => {
        let address = self.data.top()?;
        let value   = self.memory.read(address as WideCell)?;
        *self.data.top_mut()? = value;
      }

      Operation::Store => {
        let address = self.data.pop()?;
        let value   = self.data.pop()?;
        self.memory.write(address as WideCell, value)?;
      }

      // endregion

      // region Arithmetic

      Operation::Add => {
        self.data.fold_top(|a, b| sign32(a as WideCell + b as WideCell))?
      }

      Operation::Sub => {
        self.data.fold_top(|a, b| sign32(a as WideCell - b as WideCell))?
      }

      Operation::Mul => {
        self.data.fold_top(|a, b| sign32(a as WideCell * b as WideCell))?
      }

      Operation::DivMod => {
        let divisor  = self.data.pop()?;
        let dividend = self.data.pop()?;
        let (quotient, remainder) =
          divmod(dividend, divisor).ok_or(VmError::DivisionByZero)?;
        self.data.push(quotient);
        self.data.push(remainder);
      }

      Operation::And => self.data.fold_top(|a, b| a & b)?,
      Operation::Or  => self.data.fold_top(|a, b| a | b)?,
      Operation::Xor => self.data.fold_top(|a, b| a ^ b)?,

      Operation::Shift => {
        let amount = self.data.pop()?;
        let value  = self.data.pop()?;
        self.data.push(shift(value, amount));
      }

      // endregion

    } // end match operation

    Ok(Flow::Next)
  }

  /// A jump, call, or `if` must land inside memory.
  fn jump_target(&self, target: Cell) -> Result<usize, VmError> {
    self.memory.locate(target as WideCell)
  }

  /**
    A return resumes after the saved address. Resuming exactly at the end of memory is allowed
    and ends the run as if execution had fallen off the end.
  */
  fn return_target(&self, saved: Cell) -> Result<usize, VmError> {
    let resume = saved as WideCell + 1;
    if resume < 0 || resume > self.memory.len() as WideCell {
      return Err(VmError::AddressOutOfRange { address: resume, len: self.memory.len() });
    }
    Ok(resume as usize)
  }

  // endregion

}

/// Runs `image` to completion and returns what is left.
pub fn run_image(image: Vec<Cell>, config: &VmConfig) -> Result<FinalState, VmError> {
  let mut machine = Machine::with_config(image, config);
  machine.run()?;
  Ok(machine.into_final_state())
}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let data_top = self.data.len().checked_sub(1);
    let d_table  = Machine::make_register_table("D", self.data.as_slice(),    data_top, 0);
    let a_table  = Machine::make_register_table("A", self.address.as_slice(), None,     0);

    let len   = self.memory.len();
    let start = self.ip.saturating_sub(MEMORY_WINDOW / 2).min(len);
    let end   = (start + MEMORY_WINDOW).min(len);
    let highlight = match self.ip >= start && self.ip < end {
      true  => Some(self.ip - start),
      false => None
    };
    let m_table = Machine::make_register_table("M", &self.memory.as_slice()[start..end], highlight, start);
    let c_table = self.make_code_table();

    let mut combined_table = table!([d_table, a_table, m_table, c_table]);

    combined_table.set_titles(
      row![ub->"Data Stack", ub->"Address Stack", ub->"Memory", ub->"Code"]
    );
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    let status = match self.halted {
      Some(Halt::End)         => "Halted at `end`.",
      Some(Halt::EndOfMemory) => "Halted at end of memory.",
      None                    => "Running."
    };

    write!(f, "ip: {}\texecuted: {}\t{}\n{}", self.ip, self.executed, status, combined_table)
  }
}
