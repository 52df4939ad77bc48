use std::collections::HashMap;

use bimap::BiMap;
use string_cache::DefaultAtom;

/**
  A symbol table maps assembly labels to the address in memory they mark. Labels are
  interned. A symbol table is really just a convenience wrapper around a BiMap, so an
  address can be looked up by label for resolution and a label by address for listings.

  Several labels may mark the same address. The first one defined is the address's name in
  the BiMap; the rest are kept as aliases and only resolve by label.
*/
#[derive(Clone, Debug)]
pub struct SymbolTable {
  table   : BiMap<DefaultAtom, usize>,
  aliases : HashMap<DefaultAtom, usize>
}

impl SymbolTable {

  pub fn new() -> SymbolTable {
    SymbolTable {
      table   : BiMap::new(),
      aliases : HashMap::new()
    }
  }

  /// The first label defined at `address`.
  pub fn get_label(&self, address: usize) -> Option<&DefaultAtom> {
    self.table.get_by_right(&address)
  }

  pub fn get_address(&self, label: &str) -> Option<usize> {
    let label = DefaultAtom::from(label);
    self.table
        .get_by_left(&label)
        .or_else(|| self.aliases.get(&label))
        .copied()
  }

  /// Records `label` at `address`. If the label is already defined, returns the address it
  /// marks and leaves the table unchanged.
  pub fn insert(&mut self, label: &str, address: usize) -> Result<(), usize> {
    if let Some(existing) = self.get_address(label) {
      return Err(existing);
    }
    let label = DefaultAtom::from(label);
    match self.table.contains_right(&address) {
      true  => { self.aliases.insert(label, address); }
      false => { self.table.insert(label, address); }
    }
    Ok(())
  }

  pub fn len(&self) -> usize {
    self.table.len() + self.aliases.len()
  }

  pub fn is_empty(&self) -> bool {
    self.table.is_empty() && self.aliases.is_empty()
  }
}
