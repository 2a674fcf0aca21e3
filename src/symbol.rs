use std::fmt;
use std::str::FromStr;

/// Represents the machine registers.
///
/// The register bank is closed: exactly these four names exist, and none can
/// be added or removed at runtime. A token naming anything else is not a
/// register operand.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Register {
    Ax = 0,
    Ab,
    Ac,
    Ad,
}

/// Number of registers in the bank.
pub const REGISTER_COUNT: usize = 4;

impl Register {
    /// All registers in report order.
    pub const ALL: [Register; REGISTER_COUNT] =
        [Register::Ax, Register::Ab, Register::Ac, Register::Ad];

    pub fn name(&self) -> &'static str {
        match self {
            Register::Ax => "ax",
            Register::Ab => "ab",
            Register::Ac => "ac",
            Register::Ad => "ad",
        }
    }
}

impl FromStr for Register {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Register names are case-insensitive like mnemonics
        match s.to_ascii_lowercase().as_str() {
            "ax" => Ok(Register::Ax),
            "ab" => Ok(Register::Ab),
            "ac" => Ok(Register::Ac),
            "ad" => Ok(Register::Ad),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Instruction mnemonics understood by the execution engine.
///
/// `Hlt` never reaches dispatch during a run - the decoder turns halt lines
/// into a halt signal before execution - but it is kept here so `check` can
/// classify halt lines like any other statement.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InstrKind {
    Mov,
    Add,
    Sub,
    Mul,
    Div,
    Hlt,
}

impl InstrKind {
    /// Number of operands the mnemonic requires.
    pub fn arity(&self) -> usize {
        match self {
            InstrKind::Hlt => 0,
            _ => 2,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            InstrKind::Mov => "MOV",
            InstrKind::Add => "ADD",
            InstrKind::Sub => "SUB",
            InstrKind::Mul => "MUL",
            InstrKind::Div => "DIV",
            InstrKind::Hlt => "HLT",
        }
    }
}

impl FromStr for InstrKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MOV" => Ok(InstrKind::Mov),
            "ADD" => Ok(InstrKind::Add),
            "SUB" => Ok(InstrKind::Sub),
            "MUL" => Ok(InstrKind::Mul),
            "DIV" => Ok(InstrKind::Div),
            "HLT" => Ok(InstrKind::Hlt),
            _ => Err(()),
        }
    }
}

impl fmt::Display for InstrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
