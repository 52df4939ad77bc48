//! Loading and saving images. An image file is a headerless run of 32 bit signed cells in
//! native byte order; its length in cells is the file size divided by four.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::cell::Cell;
use crate::config::VmConfig;
use crate::error::ImageError;

pub const CELL_BYTES: usize = 4;

/// Converts raw bytes to cells. Returns `None` if the length is not a multiple of a cell.
pub fn cells_from_bytes(bytes: &[u8]) -> Option<Vec<Cell>> {
  if bytes.len() % CELL_BYTES != 0 {
    return None;
  }
  let cells =
    bytes.chunks_exact(CELL_BYTES)
         .map(|chunk| Cell::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
         .collect();
  Some(cells)
}

pub fn cells_to_bytes(cells: &[Cell]) -> Vec<u8> {
  cells.iter()
       .flat_map(|cell| cell.to_ne_bytes().to_vec())
       .collect()
}

/**
  Pads `cells` with zeros up to `config.capacity`, unless `config.preserve_length` asks for the
  image to be kept at its exact size. An image already larger than the capacity is left alone.
*/
pub fn prepare(mut cells: Vec<Cell>, config: &VmConfig) -> Vec<Cell> {
  if !config.preserve_length && cells.len() < config.capacity {
    cells.resize(config.capacity, 0);
  }
  cells
}

/// Reads the image at `path` and prepares it for a run according to `config`.
pub fn load(path: &Path, config: &VmConfig) -> Result<Vec<Cell>, ImageError> {
  let bytes =
    match fs::read(path) {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        return Err(ImageError::NotFound(path.to_path_buf()));
      }
      Err(e) => {
        return Err(ImageError::Io { path: path.to_path_buf(), source: e });
      }
    };

  let cells =
    cells_from_bytes(&bytes).ok_or_else(|| ImageError::Truncated {
      path : path.to_path_buf(),
      len  : bytes.len()
    })?;

  debug!(path = %path.display(), cells = cells.len(), "loaded image");
  Ok(prepare(cells, config))
}

/// Writes `cells` to `path` in the image format.
pub fn save(path: &Path, cells: &[Cell]) -> Result<(), ImageError> {
  fs::write(path, cells_to_bytes(cells))
    .map_err(|e| ImageError::Io { path: path.to_path_buf(), source: e })?;
  debug!(path = %path.display(), cells = cells.len(), "saved image");
  Ok(())
}
