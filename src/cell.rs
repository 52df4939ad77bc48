//! The machine's single data type. Memory cells, stack entries, addresses, and flags are all
//! signed 32 bit integers. The helpers here implement the arithmetic contracts that images
//! depend on: two's-complement wraparound and sign-corrected division.

pub type Cell = i32;

/// Wide integer type used for intermediate arithmetic results before normalization.
pub type WideCell = i64;

/// Comparison instructions push `TRUE` or `FALSE` and nothing else.
pub const TRUE: Cell = -1;
pub const FALSE: Cell = 0;

pub fn flag(value: bool) -> Cell {
  match value {
    true  => TRUE,
    false => FALSE
  }
}

/// Reduces `value` modulo 2^32 and reinterprets the bit pattern as a two's-complement `Cell`.
pub fn sign32(value: WideCell) -> Cell {
  value as u32 as Cell
}

/**
  Divides `dividend` by `divisor`, returning `(quotient, remainder)`, or `None` when `divisor`
  is zero.

  The quotient and remainder of the absolute values are computed first, then corrected:

  | dividend | divisor | correction             |
  |----------|---------|------------------------|
  |   < 0    |   < 0   | negate remainder       |
  |   > 0    |   < 0   | negate quotient        |
  |   < 0    |   > 0   | negate both            |

  The result rounds toward zero. Both values are normalized, so `divmod(i32::MIN, -1)`
  wraps the quotient back to `i32::MIN`.
*/
pub fn divmod(dividend: Cell, divisor: Cell) -> Option<(Cell, Cell)> {
  if divisor == 0 {
    return None;
  }

  let a = dividend as WideCell;
  let b = divisor  as WideCell;
  let mut quotient  = a.abs() / b.abs();
  let mut remainder = a.abs() % b.abs();

  if a < 0 && b < 0 {
    remainder = -remainder;
  } else if a > 0 && b < 0 {
    quotient = -quotient;
  } else if a < 0 && b > 0 {
    quotient  = -quotient;
    remainder = -remainder;
  }

  Some((sign32(quotient), sign32(remainder)))
}

/**
  Shifts `value` left by `-amount` when `amount` is negative, otherwise arithmetically right
  by `amount`. Shifting 32 or more places left gives 0; shifting 32 or more places right
  leaves only the sign.
*/
pub fn shift(value: Cell, amount: Cell) -> Cell {
  let amount = amount as WideCell;

  match amount < 0 {

    true  => {
      let places = -amount;
      if places >= 32 {
        0
      } else {
        sign32((value as WideCell) << places)
      }
    }

    false => {
      let places = amount.min(31) as u32;
      value >> places
    }

  }
}
