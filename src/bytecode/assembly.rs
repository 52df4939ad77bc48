/*!
  The human readable textual form of an image is called assembly. This module leverages the
  `strum` derives of `Operation` to turn mnemonics into opcodes and `nom` to parse lines.

  ```text
  # comment
  :main               # a label marks the address of the next cell
    lit 5
    lit &square       # a label reference is replaced by the label's address
    call
    end
  :square dup mul return
  :counter .data 0    # a raw cell
  ```

  Labels may be referenced before they are defined. The mnemonic `0;` is accepted as an
  alias of `zret`.
*/

use std::str::FromStr;

use nom::{
  branch::alt,
  bytes::complete::take_while1,
  character::complete::{
    char as one_char,
    digit1,
    space0
  },
  combinator::{all_consuming, map, map_res, opt, recognize, rest},
  multi::many0,
  sequence::{pair, preceded, terminated},
  IResult
};

use crate::cell::Cell;
use crate::error::AssemblyError;

use super::{encode_instruction, Instruction, Operation, SymbolTable};

const DATA_DIRECTIVE: &str = ".data";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Operand<'a> {
  Number(Cell),
  Label(&'a str)
}

/// A whitespace separated word of a line, classified.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Token<'a> {
  /// `:name`
  LabelDef(&'a str),
  /// `42` or `&name`
  Operand(Operand<'a>),
  /// Anything else: a mnemonic or a directive.
  Word(&'a str)
}

/// A mnemonic or directive together with the operands that followed it.
struct Statement<'a> {
  name     : &'a str,
  operands : Vec<Operand<'a>>
}

/// A cell of output that may still be waiting on a label.
enum Pending<'a> {
  Resolved(Cell),
  Reference{
    line  : usize,
    label : &'a str
  }
}

/// The result of assembling a source text.
#[derive(Clone, Debug)]
pub struct Assembly {
  pub image   : Vec<Cell>,
  pub symbols : SymbolTable
}

// region Parsers

fn identifier(input: &str) -> IResult<&str, &str> {
  take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')(input)
}

fn numeral(input: &str) -> IResult<&str, &str> {
  recognize(pair(opt(one_char('-')), digit1))(input)
}

fn number(input: &str) -> IResult<&str, Cell> {
  map_res(numeral, |text: &str| text.parse::<Cell>())(input)
}

fn operand(input: &str) -> IResult<&str, Operand> {
  alt((
    map(number, Operand::Number),
    map(preceded(one_char('&'), identifier), Operand::Label)
  ))(input)
}

fn word(input: &str) -> IResult<&str, &str> {
  take_while1(|c: char| !c.is_whitespace() && c != '#')(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
  preceded(one_char('#'), rest)(input)
}

/// Splits a line into words, dropping any trailing comment.
fn words(input: &str) -> IResult<&str, Vec<&str>> {
  all_consuming(terminated(
    many0(preceded(space0, word)),
    pair(space0, opt(comment))
  ))(input)
}

fn classify(text: &str) -> Option<Token> {
  if text.starts_with(':') {
    return all_consuming(preceded(one_char(':'), identifier))(text)
      .ok()
      .map(|(_, label)| Token::LabelDef(label));
  }
  match all_consuming(operand)(text) {
    Ok((_, operand)) => Some(Token::Operand(operand)),
    // A numeral that does not fit in a cell.
    Err(_e) if all_consuming(numeral)(text).is_ok() => None,
    Err(_e)          => Some(Token::Word(text))
  }
}

// endregion

fn expect_operands(
    line      : usize,
    name      : &str,
    operands  : &[Operand],
    expected  : usize
  ) -> Result<(), AssemblyError>
{
  if operands.len() != expected {
    return Err(AssemblyError::WrongArity {
      line,
      operation : name.to_string(),
      expected,
      given     : operands.len()
    });
  }
  Ok(())
}

fn pending_operand(line: usize, operand: Operand) -> Pending {
  match operand {
    Operand::Number(value) => Pending::Resolved(value),
    Operand::Label(label)  => Pending::Reference { line, label }
  }
}

/// Checks a statement's operand count and appends its cells.
fn emit<'a>(
    line      : usize,
    statement : Statement<'a>,
    cells     : &mut Vec<Pending<'a>>
  ) -> Result<(), AssemblyError>
{
  let Statement { name, operands } = statement;

  if name == DATA_DIRECTIVE {
    expect_operands(line, name, &operands, 1)?;
    cells.push(pending_operand(line, operands[0]));
    return Ok(());
  }

  let operation =
    match Operation::from_str(name) {
      Ok(operation) => operation,
      Err(_e)       => {
        return Err(AssemblyError::NotAnOperation { line, name: name.to_string() });
      }
    };
  expect_operands(line, name, &operands, operation.arity())?;

  match operation {

    Operation::Lit => {
      cells.push(Pending::Resolved(operation.code()));
      cells.push(pending_operand(line, operands[0]));
    }

    _ => {
      let mut code = vec![];
      encode_instruction(Instruction::Nullary(operation), &mut code);
      cells.extend(code.into_iter().map(Pending::Resolved));
    }

  }
  Ok(())
}

fn define_label(
    line    : usize,
    label   : &str,
    address : usize,
    symbols : &mut SymbolTable
  ) -> Result<(), AssemblyError>
{
  symbols.insert(label, address).map_err(|existing| {
    AssemblyError::DuplicateLabel {
      line,
      label   : label.to_string(),
      address : existing
    }
  })
}

/**
  Assembles `text` into an image. The first pass splits lines into words, records label
  addresses, and emits cells, leaving label references pending. The second pass resolves them.
*/
pub fn assemble(text: &str) -> Result<Assembly, AssemblyError> {
  let mut symbols = SymbolTable::new();
  let mut cells: Vec<Pending> = Vec::new();

  for (idx, source_line) in text.lines().enumerate() {
    let line = idx + 1;

    let line_words =
      match words(source_line) {
        Ok((_, line_words)) => line_words,
        Err(_e)             => {
          return Err(AssemblyError::Syntax { line, text: source_line.trim().to_string() });
        }
      };

    let mut current: Option<Statement> = None;

    for item in line_words {
      let token =
        classify(item).ok_or_else(|| AssemblyError::Syntax { line, text: item.to_string() })?;

      match token {

        Token::LabelDef(label) => {
          if let Some(statement) = current.take() {
            emit(line, statement, &mut cells)?;
          }
          define_label(line, label, cells.len(), &mut symbols)?;
        }

        Token::Operand(operand) => {
          match current.as_mut() {
            Some(statement) => statement.operands.push(operand),
            None            => {
              // An operand with nothing before it to take it.
              return Err(AssemblyError::Syntax { line, text: item.to_string() });
            }
          }
        }

        Token::Word(name) => {
          if let Some(statement) = current.take() {
            emit(line, statement, &mut cells)?;
          }
          current = Some(Statement { name, operands: vec![] });
        }

      } // end match token
    } // end for words

    if let Some(statement) = current.take() {
      emit(line, statement, &mut cells)?;
    }
  }

  let mut image = Vec::with_capacity(cells.len());
  for cell in cells {
    match cell {

      Pending::Resolved(value) => image.push(value),

      Pending::Reference { line, label } => {
        match symbols.get_address(label) {
          Some(address) => image.push(address as Cell),
          None          => {
            return Err(AssemblyError::UndefinedLabel { line, label: label.to_string() });
          }
        }
      }

    }
  }

  Ok(Assembly { image, symbols })
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn split_words(){
    assert_eq!(words("  :main lit -5   # start").unwrap().1, vec![":main", "lit", "-5"]);
    assert_eq!(words("").unwrap().1, Vec::<&str>::new());
    assert_eq!(words("   # only a comment").unwrap().1, Vec::<&str>::new());
    assert_eq!(words("dup#mul").unwrap().1, vec!["dup"]);
  }

  #[test]
  fn classify_words(){
    assert_eq!(classify(":loop"), Some(Token::LabelDef("loop")));
    assert_eq!(classify("&loop"), Some(Token::Operand(Operand::Label("loop"))));
    assert_eq!(classify("-12"), Some(Token::Operand(Operand::Number(-12))));
    assert_eq!(classify("0;"), Some(Token::Word("0;")));
    assert_eq!(classify("5x"), Some(Token::Word("5x")));
    assert_eq!(classify(":"), None);
    assert_eq!(classify("99999999999"), None);
    assert_eq!(classify("2147483647"), Some(Token::Operand(Operand::Number(i32::MAX))));
  }

  #[test]
  fn straight_line_program(){
    let assembly = assemble("lit 5\nlit 3\nadd\nend\n").unwrap();
    assert_eq!(assembly.image, vec![1, 5, 1, 3, 17, 26]);
    assert!(assembly.symbols.is_empty());
  }

  #[test]
  fn labels_resolve_forward_and_backward(){
    let text = "
      :start lit &target
      jump
      :target 0;
      .data &start
      .data -1
    ";
    let assembly = assemble(text).unwrap();
    assert_eq!(assembly.image, vec![1, 3, 7, 25, 0, -1]);
    assert_eq!(assembly.symbols.get_address("target"), Some(3));
  }

  #[test]
  fn several_statements_per_line(){
    let assembly = assemble(":main lit 21 lit &double call end\n:double dup add return\n").unwrap();
    assert_eq!(assembly.image, vec![1, 21, 1, 6, 8, 26, 2, 17, 10]);
    assert_eq!(assembly.symbols.get_address("double"), Some(6));
    assert_eq!(assembly.symbols.get_address("main"), Some(0));
  }

  #[test]
  fn labels_may_alias(){
    let assembly = assemble(":main\n:start lit &main lit &start end\n").unwrap();
    assert_eq!(assembly.image, vec![1, 0, 1, 0, 26]);
    assert_eq!(assembly.symbols.get_address("start"), Some(0));
    assert_eq!(assembly.symbols.get_label(0).map(|a| &**a), Some("main"));
  }

  #[test]
  fn errors_carry_line_numbers(){
    assert_eq!(
      assemble("nop\nfrobnicate\n").unwrap_err(),
      AssemblyError::NotAnOperation { line: 2, name: "frobnicate".to_string() }
    );
    assert_eq!(
      assemble("lit\n").unwrap_err(),
      AssemblyError::WrongArity { line: 1, operation: "lit".to_string(), expected: 1, given: 0 }
    );
    assert_eq!(
      assemble("add 4\n").unwrap_err(),
      AssemblyError::WrongArity { line: 1, operation: "add".to_string(), expected: 0, given: 1 }
    );
    assert_eq!(
      assemble("lit &nowhere\n").unwrap_err(),
      AssemblyError::UndefinedLabel { line: 1, label: "nowhere".to_string() }
    );
    assert_eq!(
      assemble(":a nop\n:a nop\n").unwrap_err(),
      AssemblyError::DuplicateLabel { line: 2, label: "a".to_string(), address: 0 }
    );
    assert_eq!(
      assemble(":a nop\n:b :a nop\n").unwrap_err(),
      AssemblyError::DuplicateLabel { line: 2, label: "a".to_string(), address: 0 }
    );
    assert_eq!(
      assemble("nop\n5 add\n").unwrap_err(),
      AssemblyError::Syntax { line: 2, text: "5".to_string() }
    );
    assert_eq!(
      assemble("nop\nlit 99999999999\n").unwrap_err(),
      AssemblyError::Syntax { line: 2, text: "99999999999".to_string() }
    );
    assert_eq!(
      assemble(".data -2147483649\n").unwrap_err(),
      AssemblyError::Syntax { line: 1, text: "-2147483649".to_string() }
    );
  }

}
