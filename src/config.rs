//! Run configuration shared by the image loader and the machine.

/// Total memory size in cells after padding, unless the image length is preserved.
pub const DEFAULT_CAPACITY: usize = 1_000_000;
/// Image file used when none is given.
pub const DEFAULT_IMAGE: &str = "ngaImage";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VmConfig {
  /// Number of cells memory is zero padded to.
  pub capacity        : usize,
  /// Keep memory at exactly the image length. Dump mode sets this so the dumped memory is
  /// the image as it was loaded plus whatever the run wrote to it.
  pub preserve_length : bool,
  /// Fault on cells in opcode position that hold no valid opcode instead of skipping them.
  pub strict_opcodes  : bool,
}

impl Default for VmConfig {
  fn default() -> VmConfig {
    VmConfig {
      capacity        : DEFAULT_CAPACITY,
      preserve_length : false,
      strict_opcodes  : false,
    }
  }
}
