use std::str::FromStr;

use miette::Report;

use crate::error::{check_report, ErrorKind};
use crate::lexer::{self, Instruction, Stmt};
use crate::symbol::{InstrKind, Register};

/// A classified operand, built once per decoded instruction and discarded
/// after the step completes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operand {
    Reg(Register),
    Imm(i32),
    /// Address exactly as written. May be negative or past the end of
    /// memory; bounds are checked when the operand is resolved against the
    /// machine, so the failure can report the offending value.
    Mem(i64),
}

impl Operand {
    /// Classify a trimmed operand token. Pure - never touches machine state.
    ///
    /// Register names win over everything else, then `[addr]` memory
    /// operands, then base-10 immediates. Anything unparsable is an error
    /// rather than a silent zero.
    pub fn classify(token: &str) -> Result<Operand, ErrorKind> {
        if let Ok(reg) = Register::from_str(token) {
            return Ok(Operand::Reg(reg));
        }
        if let Some(interior) = token.strip_prefix('[') {
            // The address is whatever integer immediately follows the
            // bracket; a closing bracket or trailing text is not required.
            return leading_int(interior)
                .parse::<i64>()
                .map(Operand::Mem)
                .map_err(|_| ErrorKind::BadAddress(token.to_string()));
        }
        token
            .parse::<i32>()
            .map(Operand::Imm)
            .map_err(|_| ErrorKind::BadImmediate(token.to_string()))
    }
}

/// Second decode stage: check the instruction's shape against its mnemonic
/// contract and classify every operand.
///
/// This is the single source of truth for each mnemonic's operand contract:
/// arity, register-only arithmetic operands, and writable MOV destinations.
/// It is pure, so the static `check` pass and the execution engine share it,
/// and a failed instruction can never have touched machine state.
pub fn validate(instr: &Instruction<'_>) -> Result<(InstrKind, Vec<Operand>), ErrorKind> {
    let kind = instr
        .mnemonic
        .parse::<InstrKind>()
        .map_err(|_| ErrorKind::UnknownInstruction(instr.mnemonic.to_string()))?;
    if instr.operands.len() < kind.arity() {
        return Err(ErrorKind::MissingOperand(kind.mnemonic()));
    }
    let operands = match kind {
        InstrKind::Mov => {
            let dst = Operand::classify(instr.operands[0])?;
            if matches!(dst, Operand::Imm(_)) {
                // An immediate is not a writable location
                return Err(ErrorKind::InvalidRegister(instr.operands[0].to_string()));
            }
            let src = Operand::classify(instr.operands[1])?;
            vec![dst, src]
        }
        InstrKind::Add | InstrKind::Sub | InstrKind::Mul | InstrKind::Div => {
            let dst = register_operand(instr.operands[0])?;
            let src = register_operand(instr.operands[1])?;
            vec![Operand::Reg(dst), Operand::Reg(src)]
        }
        InstrKind::Hlt => Vec::new(),
    };
    Ok((kind, operands))
}

fn register_operand(token: &str) -> Result<Register, ErrorKind> {
    match Operand::classify(token) {
        Ok(Operand::Reg(reg)) => Ok(reg),
        _ => Err(ErrorKind::InvalidRegister(token.to_string())),
    }
}

/// Statically decode and validate every line of a program without running
/// it. The first malformed line becomes a diagnostic labeled against the
/// original source.
pub fn check_program(src: &str) -> Result<(), Report> {
    let mut offset = 0;
    for line in src.lines() {
        if let Err(kind) = check_line(line) {
            return Err(check_report(&kind, offset..offset + line.len(), src));
        }
        offset += line.len() + 1;
    }
    Ok(())
}

fn check_line(line: &str) -> Result<(), ErrorKind> {
    match lexer::decode(line)? {
        Stmt::Blank | Stmt::Halt => Ok(()),
        Stmt::Instr(instr) => validate(&instr).map(|_| ()),
    }
}

/// Longest prefix of `s` that looks like a signed base-10 integer.
fn leading_int(s: &str) -> &str {
    let mut end = 0;
    for (idx, ch) in s.char_indices() {
        let part_of_int = ch.is_ascii_digit() || (ch == '-' && idx == 0);
        if !part_of_int {
            break;
        }
        end = idx + ch.len_utf8();
    }
    &s[..end]
}
