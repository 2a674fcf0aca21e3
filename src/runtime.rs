use colored::Colorize;

use crate::error::ErrorKind;
use crate::lexer::{self, Instruction, Stmt};
use crate::parse::{validate, Operand};
use crate::symbol::{InstrKind, Register, REGISTER_COUNT};

/// Memory cells available when no size is configured.
pub const MEMORY_DEFAULT: usize = 256;

/// Represents complete machine state during runtime.
pub struct RunState {
    /// 4x 32-bit registers
    reg: [i32; REGISTER_COUNT],
    /// Flat memory, size fixed at construction
    mem: Box<[i32]>,
    /// Program counter - 1-based line index, used for reporting and halt
    /// identification only. There are no jumps.
    pc: usize,
}

impl RunState {
    pub fn new(mem_size: usize) -> RunState {
        RunState {
            reg: [0; REGISTER_COUNT],
            mem: vec![0; mem_size].into_boxed_slice(),
            pc: 1,
        }
    }

    pub fn reg(&self, reg: Register) -> i32 {
        self.reg[reg as usize]
    }

    fn reg_mut(&mut self, reg: Register) -> &mut i32 {
        &mut self.reg[reg as usize]
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn mem_read(&self, addr: i64) -> Result<i32, ErrorKind> {
        self.mem_index(addr).map(|idx| self.mem[idx])
    }

    pub fn mem_write(&mut self, addr: i64, val: i32) -> Result<(), ErrorKind> {
        let idx = self.mem_index(addr)?;
        self.mem[idx] = val;
        Ok(())
    }

    fn mem_index(&self, addr: i64) -> Result<usize, ErrorKind> {
        usize::try_from(addr)
            .ok()
            .filter(|&idx| idx < self.mem.len())
            .ok_or(ErrorKind::AddressOutOfRange(addr))
    }

    fn read_operand(&self, operand: Operand) -> Result<i32, ErrorKind> {
        match operand {
            Operand::Reg(reg) => Ok(self.reg(reg)),
            Operand::Imm(val) => Ok(val),
            Operand::Mem(addr) => self.mem_read(addr),
        }
    }

    fn write_operand(&mut self, operand: Operand, val: i32) -> Result<(), ErrorKind> {
        match operand {
            Operand::Reg(reg) => {
                *self.reg_mut(reg) = val;
                Ok(())
            }
            Operand::Mem(addr) => self.mem_write(addr, val),
            // Rejected during validation, before execution is reached
            Operand::Imm(_) => unreachable!("immediate destination passed validation"),
        }
    }

    /// Execute a single decoded instruction.
    ///
    /// Validation and operand resolution happen before any write, so a
    /// failed instruction leaves registers and memory untouched.
    ///
    /// Arithmetic wraps on overflow (two's complement); division truncates
    /// toward zero.
    pub fn execute(&mut self, instr: &Instruction<'_>) -> Result<(), ErrorKind> {
        let (kind, operands) = validate(instr)?;
        match kind {
            InstrKind::Mov => {
                let val = self.read_operand(operands[1])?;
                self.write_operand(operands[0], val)
            }
            InstrKind::Add => self.binary_op(&operands, i32::wrapping_add),
            InstrKind::Sub => self.binary_op(&operands, i32::wrapping_sub),
            InstrKind::Mul => self.binary_op(&operands, i32::wrapping_mul),
            InstrKind::Div => {
                let (dst, src) = Self::reg_pair(&operands);
                if self.reg(src) == 0 {
                    return Err(ErrorKind::DivisionByZero);
                }
                let res = self.reg(dst).wrapping_div(self.reg(src));
                *self.reg_mut(dst) = res;
                Ok(())
            }
            // Halt lines are intercepted by the decoder during a run
            InstrKind::Hlt => Ok(()),
        }
    }

    fn binary_op(&mut self, operands: &[Operand], op: fn(i32, i32) -> i32) -> Result<(), ErrorKind> {
        let (dst, src) = Self::reg_pair(operands);
        let res = op(self.reg(dst), self.reg(src));
        *self.reg_mut(dst) = res;
        Ok(())
    }

    fn reg_pair(operands: &[Operand]) -> (Register, Register) {
        match operands {
            &[Operand::Reg(dst), Operand::Reg(src), ..] => (dst, src),
            // Guaranteed by validation
            _ => unreachable!("arithmetic operands passed validation"),
        }
    }
}

/// Owns the machine state and the program text, and drives the
/// fetch-decode-execute loop over it.
pub struct RunEnvironment {
    state: RunState,
    src: String,
}

impl RunEnvironment {
    pub fn new(src: String, mem_size: usize) -> RunEnvironment {
        RunEnvironment {
            state: RunState::new(mem_size),
            src,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Run the program to halt or end of input, reporting each step on
    /// stdout. Returns the final program counter.
    ///
    /// Decode and execute failures are reported against the offending line
    /// and the run continues; nothing short of a halt stops it.
    pub fn run(&mut self) -> usize {
        for line in self.src.lines() {
            match lexer::decode(line) {
                Ok(Stmt::Blank) => {}
                Ok(Stmt::Halt) => {
                    println!("{}", format!("Halted at line {}", self.state.pc).cyan());
                    self.report_final();
                    return self.state.pc;
                }
                Ok(Stmt::Instr(instr)) => match self.state.execute(&instr) {
                    Ok(()) => self.report_step(&instr),
                    Err(kind) => self.report_error(&kind),
                },
                Err(kind) => self.report_error(&kind),
            }
            self.state.pc += 1;
        }
        self.report_final();
        self.state.pc
    }

    fn report_step(&self, instr: &Instruction<'_>) {
        let regs = Register::ALL
            .map(|reg| format!("{}={}", reg, self.state.reg(reg)))
            .join(" ");
        println!(
            "{:>4}  {} {}  [{}]",
            self.state.pc,
            instr.mnemonic.to_ascii_uppercase(),
            instr.operands.join(", "),
            regs,
        );
    }

    fn report_error(&self, kind: &ErrorKind) {
        println!("{:>4}  {} {}", self.state.pc, "error:".red(), kind);
    }

    fn report_final(&self) {
        println!("Final program counter: {}", self.state.pc);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn run(src: &str) -> RunEnvironment {
        let mut env = RunEnvironment::new(src.to_string(), MEMORY_DEFAULT);
        env.run();
        env
    }

    fn regs(env: &RunEnvironment) -> [i32; REGISTER_COUNT] {
        Register::ALL.map(|reg| env.state().reg(reg))
    }

    #[test]
    fn mov_immediate_sets_only_target() {
        let env = run("MOV ab, 7\nHLT\n");
        assert_eq!(regs(&env), [0, 7, 0, 0]);
    }

    #[test]
    fn worked_example_add() {
        let env = run("MOV ax, 5\nMOV ab, 3\nADD ax, ab\nHLT\n");
        assert_eq!(env.state().reg(Register::Ax), 8);
        assert_eq!(env.state().reg(Register::Ab), 3);
        assert_eq!(env.state().pc(), 4);
    }

    #[test]
    fn worked_example_div_by_zero() {
        let env = run("DIV ax, ab\nHLT\n");
        assert_eq!(regs(&env), [0, 0, 0, 0]);
        assert_eq!(env.state().pc(), 2);
    }

    #[test]
    fn sub_and_mul() {
        let env = run("MOV ax, 10\nMOV ab, 4\nSUB ax, ab\nMOV ac, 6\nMUL ac, ab\nHLT\n");
        assert_eq!(env.state().reg(Register::Ax), 6);
        assert_eq!(env.state().reg(Register::Ab), 4);
        assert_eq!(env.state().reg(Register::Ac), 24);
    }

    #[test]
    fn div_truncates_toward_zero() {
        let env = run("MOV ax, -7\nMOV ab, 2\nDIV ax, ab\nHLT\n");
        assert_eq!(env.state().reg(Register::Ax), -3);
    }

    #[test]
    fn div_by_zero_leaves_dividend_unchanged() {
        let env = run("MOV ax, 9\nDIV ax, ab\nHLT\n");
        assert_eq!(env.state().reg(Register::Ax), 9);
    }

    #[test]
    fn memory_round_trip() {
        let env = run("MOV ax, 41\nMOV [3], ax\nMOV ab, [3]\nHLT\n");
        assert_eq!(env.state().reg(Register::Ab), 41);
        assert_eq!(env.state().mem_read(3).unwrap(), 41);
        assert_eq!(env.state().mem_read(2).unwrap(), 0);
    }

    #[test]
    fn memory_bounds_are_checked() {
        let mut state = RunState::new(8);
        assert_eq!(state.mem_read(8), Err(ErrorKind::AddressOutOfRange(8)));
        assert_eq!(state.mem_read(-1), Err(ErrorKind::AddressOutOfRange(-1)));
        assert_eq!(state.mem_write(100, 1), Err(ErrorKind::AddressOutOfRange(100)));
        assert_eq!(state.mem_read(7), Ok(0));
    }

    #[test]
    fn out_of_range_store_changes_nothing() {
        let env = run("MOV ax, 5\nMOV [9999], ax\nMOV [-2], ax\nHLT\n");
        assert_eq!(env.state().reg(Register::Ax), 5);
        for addr in 0..MEMORY_DEFAULT {
            assert_eq!(env.state().mem_read(addr as i64).unwrap(), 0);
        }
    }

    #[test]
    fn failed_instruction_is_all_or_nothing() {
        // Source resolves fine, destination fails - no partial write
        let env = run("MOV ax, 5\nADD ax, [2]\nHLT\n");
        assert_eq!(env.state().reg(Register::Ax), 5);
    }

    #[test]
    fn halt_prevents_later_lines() {
        let env = run("MOV ax, 1\nHLT\nMOV ax, 99\n");
        assert_eq!(env.state().reg(Register::Ax), 1);
        assert_eq!(env.state().pc(), 2);
    }

    #[test]
    fn errors_do_not_stop_the_run() {
        let env = run("DIV ax, ab\nBOGUS ax\nMOV ac, 2\nHLT\n");
        assert_eq!(env.state().reg(Register::Ac), 2);
        assert_eq!(env.state().pc(), 4);
    }

    #[test]
    fn blank_lines_count_as_steps() {
        let env = run("\n\nHLT\n");
        assert_eq!(env.state().pc(), 3);
    }

    #[test]
    fn exhaustion_without_halt() {
        let env = run("MOV ax, 1\nMOV ab, 2\n");
        assert_eq!(env.state().pc(), 3);
    }

    #[test]
    fn arithmetic_wraps_on_overflow() {
        let env = run("MOV ax, 2147483647\nMOV ab, 1\nADD ax, ab\nHLT\n");
        assert_eq!(env.state().reg(Register::Ax), i32::MIN);
    }

    #[test]
    fn reruns_are_deterministic() {
        let src = "MOV ax, 5\nADD ax, ab\nDIV ac, ad\nHLT\n";
        let first = run(src);
        let second = run(src);
        assert_eq!(regs(&first), regs(&second));
        assert_eq!(first.state().pc(), second.state().pc());
    }
}
