use std::fmt;
use std::ops::Range;

use miette::{miette, LabeledSpan, Report, Severity};

/// Closed set of per-instruction failures.
///
/// Every variant is recoverable: the driver loop reports it against the
/// offending line and moves on. Only failure to open the program file is
/// fatal, and that is handled at the CLI boundary.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// A token that must name a register does not.
    InvalidRegister(String),
    /// A memory operand resolved to an address outside `[0, size)`.
    AddressOutOfRange(i64),
    /// DIV with a zero divisor.
    DivisionByZero,
    /// A non-blank line with no mnemonic token.
    MissingInstruction,
    /// Fewer operands than the mnemonic requires.
    MissingOperand(&'static str),
    /// A mnemonic outside the instruction set.
    UnknownInstruction(String),
    /// A non-register, non-bracketed token that is not a valid integer.
    BadImmediate(String),
    /// A bracketed operand whose interior is not a valid integer address.
    BadAddress(String),
}

impl std::error::Error for ErrorKind {}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegister(tok) => {
                write!(f, "operand {tok:?} is not a register (expected ax, ab, ac or ad)")
            }
            Self::AddressOutOfRange(addr) => {
                write!(f, "memory address {addr} is outside of addressable memory")
            }
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::MissingInstruction => write!(f, "line has no instruction mnemonic"),
            Self::MissingOperand(mnemonic) => {
                write!(f, "{mnemonic} is missing a required operand")
            }
            Self::UnknownInstruction(tok) => write!(f, "unknown instruction {tok:?}"),
            Self::BadImmediate(tok) => {
                write!(f, "operand {tok:?} is not a register or integer literal")
            }
            Self::BadAddress(tok) => {
                write!(f, "memory operand {tok:?} does not contain an integer address")
            }
        }
    }
}

// Report builders for the static `check` pass. Each failure is labeled
// against the offending line of the original source.

pub fn check_report(kind: &ErrorKind, line_span: Range<usize>, src: &str) -> Report {
    let (code, help, label) = match kind {
        ErrorKind::InvalidRegister(_) => (
            "check::register",
            "arithmetic instructions only accept the registers ax, ab, ac and ad",
            "operand is not a register",
        ),
        ErrorKind::AddressOutOfRange(_) => (
            "check::address",
            "memory addresses must lie inside the configured memory size",
            "address out of range",
        ),
        ErrorKind::DivisionByZero => (
            "check::div",
            "make sure the divisor register is nonzero before this line",
            "divides by zero",
        ),
        ErrorKind::MissingInstruction => (
            "check::mnemonic",
            "every non-blank line must start with a mnemonic like MOV or ADD",
            "no mnemonic",
        ),
        ErrorKind::MissingOperand(_) => (
            "check::arity",
            "MOV, ADD, SUB, MUL and DIV all take two comma-separated operands",
            "missing operand",
        ),
        ErrorKind::UnknownInstruction(_) => (
            "check::mnemonic",
            "available instructions are MOV, ADD, SUB, MUL, DIV and HLT",
            "unknown mnemonic",
        ),
        ErrorKind::BadImmediate(_) => (
            "check::operand",
            "immediates are base-10 integers like 42 or -7",
            "malformed immediate",
        ),
        ErrorKind::BadAddress(_) => (
            "check::operand",
            "memory operands look like [12], with a base-10 address inside",
            "malformed address",
        ),
    };
    miette!(
        severity = Severity::Error,
        code = code,
        help = help,
        labels = vec![LabeledSpan::at(line_span, label)],
        "{kind}",
    )
    .with_source_code(src.to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_names_offending_token() {
        let err = ErrorKind::UnknownInstruction("FOO".into());
        assert!(err.to_string().contains("FOO"));

        let err = ErrorKind::AddressOutOfRange(-3);
        assert!(err.to_string().contains("-3"));
    }

    #[test]
    fn report_carries_source() {
        let src = "MOV ax, 5\nBAD ax, 1\n";
        let kind = ErrorKind::UnknownInstruction("BAD".into());
        let report = check_report(&kind, 10..19, src);
        assert!(report.to_string().contains("BAD"));
    }
}
