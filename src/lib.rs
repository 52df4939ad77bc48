/*!
  Nga, a minimal stack machine.

  An image of 32 bit cells is loaded into memory and executed from address 0 until an `end`
  instruction or until the instruction pointer runs off the end of memory. The machine has a
  data stack for operands and an address stack for return addresses; see
  [`bytecode::Operation`] for the instruction set and [`vm::Machine`] for the loop.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod bytecode;
pub mod cell;
pub mod config;
pub mod dump;
pub mod error;
pub mod image;
pub mod memory;
pub mod stack;
pub mod terminal;
pub mod vm;

pub use cell::Cell;
pub use config::VmConfig;
pub use error::{AssemblyError, Error, ImageError, VmError};
pub use vm::{run_image, FinalState, Halt, Machine};
