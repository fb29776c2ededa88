//! The SM32 execution engine: fetch, decode, dispatch.

#![allow(clippy::cast_possible_truncation)]

use crate::arith::{self, DWORD};
use crate::fault::Fault;
use crate::flags::{FlagUpdate, Flags, ALL_FLAGS};
use crate::memory::{Memory, DEFAULT_MEM_SIZE};
use crate::opcode::Opcode;
use crate::registers::{Register, RegisterFile};
use crate::source::ByteSource;

/// A single-owner SM32 virtual machine instance.
///
/// Construction drains the byte source once into memory; execution then
/// proceeds through [`Machine::tick`] or [`Machine::run`] with no further
/// I/O. One instance serves one run: there is no reset or resumable state
/// across faults.
#[derive(Debug)]
pub struct Machine {
    memory: Memory,
    regs: RegisterFile,
    flags: Flags,
    /// Last-fetched instruction word; register-indexed opcodes recover the
    /// embedded register id from it after dispatch.
    op: u32,
    stop: bool,
}

impl Machine {
    /// Loads a machine with the default 64 KiB address space.
    pub fn load(source: &mut dyn ByteSource) -> Self {
        Self::load_with_mem_size(source, DEFAULT_MEM_SIZE)
    }

    /// Loads a machine with a caller-chosen address-space size.
    ///
    /// A short image leaves the remainder of memory zero-filled; a long
    /// image is truncated at `mem_size` bytes. `sp` starts at
    /// `mem_size - 4`, `bp` and `pc` at zero, and the flag register starts
    /// with only `zero` set.
    pub fn load_with_mem_size(source: &mut dyn ByteSource, mem_size: usize) -> Self {
        let memory = Memory::load(source, mem_size);
        let regs = RegisterFile::reset(mem_size as u32);
        Self {
            memory,
            regs,
            flags: Flags {
                zero: true,
                ..Flags::default()
            },
            op: 0,
            stop: false,
        }
    }

    /// Runs to completion and returns the exit value: the dword at `sp`
    /// once the stop flag is set.
    ///
    /// # Errors
    ///
    /// Propagates the first [`Fault`] raised by any instruction, or by the
    /// final exit-value read itself.
    pub fn run(&mut self) -> Result<u32, Fault> {
        while !self.stop {
            self.tick()?;
        }
        self.memory.read_dword(self.regs.sp)
    }

    /// Executes one fetch/decode/dispatch step. A no-op once stopped.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidOpcode`] for an unrecognized opcode byte (or
    /// register id) and [`Fault::OutOfRangeAccess`] for any dword access
    /// outside memory. Both abort the run.
    pub fn tick(&mut self) -> Result<(), Fault> {
        if self.stop {
            return Ok(());
        }

        let offset = self.regs.pc;
        self.op = self.fetch_dword()?;
        let byte = (self.op & 0xff) as u8;
        let opcode = Opcode::from_u8(byte).ok_or(Fault::InvalidOpcode {
            opcode: byte,
            offset,
        })?;
        self.execute(opcode, offset)
    }

    /// Current flag register.
    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.flags
    }

    /// Current register file.
    #[must_use]
    pub const fn regs(&self) -> RegisterFile {
        self.regs
    }

    /// Machine memory, for inspection of final state.
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Returns `true` once the stop flag is set.
    #[must_use]
    pub const fn stopped(&self) -> bool {
        self.stop
    }

    fn execute(&mut self, opcode: Opcode, offset: u32) -> Result<(), Fault> {
        match opcode {
            Opcode::Nop => Ok(()),
            Opcode::Halt => {
                self.stop = true;
                Ok(())
            }
            Opcode::Pushi => self.pushi(),
            Opcode::Pushr => self.pushr(offset),
            Opcode::Popr => self.popr(offset),
            Opcode::Dropi => self.pop_dword().map(|_| ()),
            Opcode::Dupi => self.dupi(),
            Opcode::Overi => self.overi(),
            Opcode::Swapi => self.swapi(),
            Opcode::Fchi => self.fetchi(),
            Opcode::Stri => self.storei(),
            Opcode::Addi => self.binary_arith(arith::add),
            Opcode::Subi => self.binary_arith(arith::sub),
            Opcode::Andi => self.binary_bitwise(|a, b| a & b),
            Opcode::Ori => self.binary_bitwise(|a, b| a | b),
            Opcode::Xori => self.binary_bitwise(|a, b| a ^ b),
            Opcode::Jmp => self.jmp(),
            Opcode::If => self.branch_if_zero(),
            Opcode::Call => self.call(),
            Opcode::Ret => self.ret(),
        }
    }

    /// Reads the dword at `pc` and advances `pc` past it. Used both for
    /// instruction words and for inline operands.
    fn fetch_dword(&mut self) -> Result<u32, Fault> {
        let word = self.memory.read_dword(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(DWORD);
        Ok(word)
    }

    /// Push protocol shared by the data stack and register-indexed ops:
    /// decrement the register by one dword (wraparound arithmetic, flags
    /// discarded), then write at the new address.
    fn push_dword_reg(&mut self, reg: Register, value: u32) -> Result<(), Fault> {
        let (addr, _) = arith::sub(DWORD, u64::from(self.regs.get(reg)), u64::from(DWORD));
        let addr = addr as u32;
        self.regs.set(reg, addr);
        self.memory.write_dword(addr, value)
    }

    /// Pop protocol: read at the current address, then increment the
    /// register by one dword.
    fn pop_dword_reg(&mut self, reg: Register) -> Result<u32, Fault> {
        let addr = self.regs.get(reg);
        let value = self.memory.read_dword(addr)?;
        let (next, _) = arith::add(DWORD, u64::from(addr), u64::from(DWORD));
        self.regs.set(reg, next as u32);
        Ok(value)
    }

    fn push_dword(&mut self, value: u32) -> Result<(), Fault> {
        self.push_dword_reg(Register::Sp, value)
    }

    fn pop_dword(&mut self) -> Result<u32, Fault> {
        self.pop_dword_reg(Register::Sp)
    }

    fn set_value_flags(&mut self, value: u32) {
        self.flags.apply(FlagUpdate::for_dword(value));
    }

    /// Recovers the register id embedded in bits 24-31 of the last-fetched
    /// instruction word. An id outside the closed map reports through the
    /// invalid-opcode path, carrying the instruction's opcode byte.
    fn reg_from_op(&self, offset: u32) -> Result<Register, Fault> {
        let id = (self.op >> 24) as u8;
        Register::from_id(id).ok_or(Fault::InvalidOpcode {
            opcode: (self.op & 0xff) as u8,
            offset,
        })
    }

    fn pushi(&mut self) -> Result<(), Fault> {
        let arg = self.fetch_dword()?;
        self.push_dword(arg)?;
        self.set_value_flags(arg);
        Ok(())
    }

    fn pushr(&mut self, offset: u32) -> Result<(), Fault> {
        let reg = self.reg_from_op(offset)?;
        let arg = self.regs.get(reg);
        self.push_dword(arg)?;
        self.set_value_flags(arg);
        Ok(())
    }

    fn popr(&mut self, offset: u32) -> Result<(), Fault> {
        let reg = self.reg_from_op(offset)?;
        let arg = self.pop_dword()?;
        self.set_value_flags(arg);
        self.regs.set(reg, arg);
        Ok(())
    }

    fn dupi(&mut self) -> Result<(), Fault> {
        let arg = self.memory.read_dword(self.regs.sp)?;
        self.push_dword(arg)?;
        self.set_value_flags(arg);
        Ok(())
    }

    fn overi(&mut self) -> Result<(), Fault> {
        let arg = self.memory.read_dword(self.regs.sp.wrapping_add(DWORD))?;
        self.push_dword(arg)?;
        self.set_value_flags(arg);
        Ok(())
    }

    fn swapi(&mut self) -> Result<(), Fault> {
        let second = self.pop_dword()?;
        let first = self.pop_dword()?;
        self.push_dword(second)?;
        self.push_dword(first)?;
        self.set_value_flags(first);
        Ok(())
    }

    fn fetchi(&mut self) -> Result<(), Fault> {
        let loc = self.pop_dword()?;
        let arg = self.memory.read_dword(loc)?;
        self.push_dword(arg)?;
        self.set_value_flags(arg);
        Ok(())
    }

    fn storei(&mut self) -> Result<(), Fault> {
        let loc = self.pop_dword()?;
        let arg = self.pop_dword()?;
        self.memory.write_dword(loc, arg)?;
        self.set_value_flags(arg);
        Ok(())
    }

    /// Binary stack arithmetic: the second-pushed operand is popped first,
    /// so the result is `first_pushed op second_pushed`. All four flags come
    /// from the arithmetic engine.
    fn binary_arith(&mut self, op: fn(u32, u64, u64) -> (u64, Flags)) -> Result<(), Fault> {
        let second = self.pop_dword()?;
        let first = self.pop_dword()?;
        let (result, flags) = op(DWORD, u64::from(first), u64::from(second));
        self.flags.apply(flags.select(ALL_FLAGS));
        self.push_dword(result as u32)
    }

    fn binary_bitwise(&mut self, op: fn(u32, u32) -> u32) -> Result<(), Fault> {
        let second = self.pop_dword()?;
        let first = self.pop_dword()?;
        let result = op(first, second);
        self.set_value_flags(result);
        self.push_dword(result)
    }

    fn jmp(&mut self) -> Result<(), Fault> {
        let addr = self.fetch_dword()?;
        self.regs.pc = addr;
        Ok(())
    }

    /// The inline address operand is always consumed, taken or not.
    fn branch_if_zero(&mut self) -> Result<(), Fault> {
        let condition = self.pop_dword()?;
        let addr = self.fetch_dword()?;
        if condition == 0 {
            self.regs.pc = addr;
        }
        Ok(())
    }

    fn call(&mut self) -> Result<(), Fault> {
        let addr = self.pop_dword()?;
        self.push_dword(self.regs.pc)?;
        self.regs.pc = addr;
        Ok(())
    }

    /// No balance guard: `pc` receives whatever dword sits at `sp`. An
    /// unbalanced stack surfaces, if at all, as a later fault.
    fn ret(&mut self) -> Result<(), Fault> {
        self.regs.pc = self.pop_dword()?;
        Ok(())
    }
}
