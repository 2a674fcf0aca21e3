use crate::error::ErrorKind;

/// One decoded line of program text.
#[derive(PartialEq, Eq, Debug)]
pub enum Stmt<'a> {
    /// Blank or whitespace-only line. Still counts as a step.
    Blank,
    /// Terminates the run before any further lines execute.
    Halt,
    Instr(Instruction<'a>),
}

/// A mnemonic plus up to two raw operand tokens, borrowed from the source
/// line and valid for a single execution step.
///
/// The decoder does not validate operand count against the mnemonic's arity;
/// that contract lives in one place, the execution engine dispatch.
#[derive(PartialEq, Eq, Debug)]
pub struct Instruction<'a> {
    pub mnemonic: &'a str,
    pub operands: Vec<&'a str>,
}

const HALT_MNEMONIC: &str = "HLT";

/// Decode one line into a statement.
///
/// A line beginning with the halt mnemonic halts regardless of what follows
/// on the line. Operand text is split on a single comma into at most two
/// tokens, each trimmed of surrounding whitespace.
pub fn decode(line: &str) -> Result<Stmt<'_>, ErrorKind> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Stmt::Blank);
    }
    if trimmed
        .as_bytes()
        .get(..HALT_MNEMONIC.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(HALT_MNEMONIC.as_bytes()))
    {
        return Ok(Stmt::Halt);
    }

    let (mnemonic, operand_text) = match trimmed.split_once(char::is_whitespace) {
        Some((mnemonic, rest)) => (mnemonic, rest),
        None => (trimmed, ""),
    };
    // A line that opens with punctuation or a literal has no mnemonic at all,
    // which is a different failure than an unrecognized mnemonic.
    if !mnemonic.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(ErrorKind::MissingInstruction);
    }

    let operands: Vec<&str> = operand_text
        .splitn(2, ',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .collect();

    Ok(Stmt::Instr(Instruction { mnemonic, operands }))
}

#[cfg(test)]
mod test {
    use super::*;

    fn instr(line: &str) -> Instruction<'_> {
        match decode(line) {
            Ok(Stmt::Instr(instr)) => instr,
            other => panic!("expected instruction for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn blank_lines() {
        assert_eq!(decode("").unwrap(), Stmt::Blank);
        assert_eq!(decode("   \t ").unwrap(), Stmt::Blank);
    }

    #[test]
    fn halt_lines() {
        assert_eq!(decode("HLT").unwrap(), Stmt::Halt);
        assert_eq!(decode("  hlt").unwrap(), Stmt::Halt);
        // Trailing text after the halt keyword still halts
        assert_eq!(decode("HLT now").unwrap(), Stmt::Halt);
    }

    #[test]
    fn two_operand_instruction() {
        let i = instr("MOV ax, 5");
        assert_eq!(i.mnemonic, "MOV");
        assert_eq!(i.operands, vec!["ax", "5"]);
    }

    #[test]
    fn operand_whitespace_is_trimmed() {
        let i = instr("ADD   ax ,   ab");
        assert_eq!(i.operands, vec!["ax", "ab"]);
    }

    #[test]
    fn single_operand_survives_decode() {
        // Arity is checked by the execution engine, not here
        let i = instr("ADD ax");
        assert_eq!(i.operands, vec!["ax"]);
    }

    #[test]
    fn trailing_comma_yields_one_operand() {
        let i = instr("MOV ax,");
        assert_eq!(i.operands, vec!["ax"]);
    }

    #[test]
    fn only_first_comma_splits() {
        // Second comma lands inside the second token
        let i = instr("MOV ax, [1,2]");
        assert_eq!(i.operands, vec!["ax", "[1,2]"]);
    }

    #[test]
    fn missing_mnemonic() {
        assert_eq!(decode(", ax").unwrap_err(), ErrorKind::MissingInstruction);
        assert_eq!(decode("[3], ax").unwrap_err(), ErrorKind::MissingInstruction);
        assert_eq!(decode("42").unwrap_err(), ErrorKind::MissingInstruction);
    }
}
