//! Error types for the machine, the image loader, and the assembler.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::cell::{Cell, WideCell};
use crate::stack::StackKind;

/// Faults raised while executing an image. A fault ends the run.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum VmError {
  #[error("{0} stack underflow")]
  StackUnderflow(StackKind),

  #[error("address {address} is outside memory of {len} cells")]
  AddressOutOfRange { address: WideCell, len: usize },

  #[error("division by zero")]
  DivisionByZero,

  #[error("invalid opcode {0}")]
  InvalidOpcode(Cell),
}

#[derive(Error, Debug)]
pub enum ImageError {
  #[error("image not found: {}", .0.display())]
  NotFound(PathBuf),

  #[error("image {} is {len} bytes, not a whole number of 4 byte cells", .path.display())]
  Truncated { path: PathBuf, len: usize },

  #[error("cannot access image {}: {source}", .path.display())]
  Io { path: PathBuf, source: io::Error },
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum AssemblyError {
  #[error("line {line}: cannot parse `{text}`")]
  Syntax { line: usize, text: String },

  #[error("line {line}: `{name}` is not an operation")]
  NotAnOperation { line: usize, name: String },

  #[error("line {line}: `{operation}` takes {expected} operand(s) but was given {given}")]
  WrongArity { line: usize, operation: String, expected: usize, given: usize },

  #[error("line {line}: label `{label}` is already defined at address {address}")]
  DuplicateLabel { line: usize, label: String, address: usize },

  #[error("line {line}: undefined label `{label}`")]
  UndefinedLabel { line: usize, label: String },
}

/// Everything the command line front end can report.
#[derive(Error, Debug)]
pub enum Error {
  #[error(transparent)]
  Image(#[from] ImageError),

  #[error(transparent)]
  Assembly(#[from] AssemblyError),

  #[error("fault at ip {ip}: {source}")]
  Fault { ip: usize, source: VmError },

  #[error("cannot write output: {0}")]
  Io(#[from] io::Error),
}

/// Exit status for command line usage errors. Distinct from every `Error::exit_code`.
pub const USAGE_EXIT_CODE: i32 = 64;

impl Error {
  /// Process exit status for this error. A missing image is distinguishable from a fault.
  pub fn exit_code(&self) -> i32 {
    match self {
      Error::Fault { .. }                   => 1,
      Error::Image(ImageError::NotFound(_)) => 2,
      Error::Image(_)
      | Error::Assembly(_)
      | Error::Io(_)                        => 3,
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn io_error() -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, "denied")
  }

  #[test]
  fn exit_codes(){
    let fault = Error::Fault { ip: 3, source: VmError::StackUnderflow(StackKind::Data) };
    assert_eq!(fault.exit_code(), 1);

    let missing = Error::from(ImageError::NotFound(PathBuf::from("ngaImage")));
    assert_eq!(missing.exit_code(), 2);

    let truncated = Error::from(ImageError::Truncated { path: PathBuf::from("short"), len: 5 });
    assert_eq!(truncated.exit_code(), 3);

    let unreadable = Error::from(ImageError::Io { path: PathBuf::from("ngaImage"), source: io_error() });
    assert_eq!(unreadable.exit_code(), 3);

    let assembly = Error::from(AssemblyError::UndefinedLabel { line: 1, label: "x".to_string() });
    assert_eq!(assembly.exit_code(), 3);

    assert_eq!(Error::from(io_error()).exit_code(), 3);
  }

  #[test]
  fn usage_code_is_distinct(){
    assert!(![1, 2, 3].contains(&USAGE_EXIT_CODE));
  }

  #[test]
  fn fault_message(){
    let fault = Error::Fault { ip: 0, source: VmError::StackUnderflow(StackKind::Data) };
    assert_eq!(fault.to_string(), "fault at ip 0: data stack underflow");
  }

}
