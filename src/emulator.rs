//! [Emulator] for executing programs loaded into a [Memory].

use std::cmp;
use std::fmt;

use itertools::Itertools;
use slog::{debug, o, trace, warn, Discard, Logger};

use crate::bytecode::{word_to_bits, Program};
use crate::event::{Event, EventDispatcher, EventListener};
use crate::instruction::{decode, DecodeError, Instruction, JumpCondition, OpCode, Register, HALT_WORD};
use crate::loader::{self, LoadError, MemoryImage};
use crate::memory::Memory;

/// Contains the execution environment of the DREAMCHASER processor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    /// The Program Counter stores the address of the next instruction to be executed.
    pub pc: usize,

    /// Array containing values for all the eight general purpose registers.
    pub r: [u32; 8],

    /// The condition flags.
    pub flags: Flags,
}

/// The condition flags set by the arithmetic instructions and tested by conditional jumps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub carry: bool,
    pub zero: bool,
    pub negative: bool,

    /// Set when the result is even.
    pub parity: bool,

    pub overflow: bool,
}

impl Flags {
    /// Evaluates a jump condition against the flags.
    pub fn test(&self, condition: JumpCondition) -> bool {
        match condition {
            JumpCondition::Always => true,
            JumpCondition::Zero => self.zero,
            JumpCondition::Positive => !self.negative,
            JumpCondition::Negative => self.negative,
            JumpCondition::Parity => self.parity,
            JumpCondition::Carry => self.carry,
            JumpCondition::Overflow => self.overflow,
            JumpCondition::NoOverflow => !self.overflow,
        }
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "C={} Z={} N={} P={} O={}",
            self.carry as u8,
            self.zero as u8,
            self.negative as u8,
            self.parity as u8,
            self.overflow as u8,
        )
    }
}

/// Sign-mismatch overflow test on the register values and the unmasked result.
///
/// Registers hold unsigned words, so only two positive operands with a negative result can
/// trip it.
fn sign_overflow(a: u32, b: u32, result: i64) -> bool {
    let (a, b) = (a as i64, b as i64);

    (a > 0 && b > 0 && result < 0) || (a < 0 && b < 0 && result >= 0)
}

/// Why the machine stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// The halt word was fetched.
    HaltInstruction,

    /// The program counter ran past the last memory address.
    EndOfMemory,
}

/// A condition that is reported but does not stop the execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// The fetched word matched none of the opcode tables. The cycle was a no-op.
    UnrecognizedOpcode {
        address: usize,
        word: u32,
    },

    /// `MOD` with a zero divisor. The registers were left unchanged.
    ModuloByZero {
        address: usize,
        dividend: Register,
        divisor: Register,
    },
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Fault::UnrecognizedOpcode { address, word } => write!(
                f,
                "at address {}: {}",
                address,
                DecodeError::UnrecognizedOpcode { word: *word },
            ),
            Fault::ModuloByZero { address, dividend, divisor } => write!(
                f,
                "at address {}: division by zero in MOD {} {}",
                address, dividend, divisor,
            ),
        }
    }
}

/// Errors that abort the execution.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionError<E> {
    /// An instruction accessed an address outside of the memory.
    Memory(E),

    /// `DIV` with a zero divisor.
    DivisionByZero {
        address: usize,
        dividend: Register,
        divisor: Register,
    },

    /// The program executed more instructions than the configured cycle limit allows.
    CycleLimitExceeded {
        limit: u64,
    },

    /// [run](Emulator::run) was called on a machine that has already halted at `address`.
    AlreadyHalted {
        address: usize,
    },
}

impl<E: fmt::Display> fmt::Display for ExecutionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionError::Memory(err) => write!(f, "memory error: {}", err),
            ExecutionError::DivisionByZero { address, dividend, divisor } => write!(
                f,
                "at address {}: division by zero in DIV {} {}",
                address, dividend, divisor,
            ),
            ExecutionError::CycleLimitExceeded { limit } => {
                write!(f, "cycle limit of {} instructions exceeded", limit)
            }
            ExecutionError::AlreadyHalted { address } => {
                write!(f, "the machine has already halted at address {}", address)
            }
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ExecutionError<E> {}

/// Snapshot of the machine state for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct StateDump {
    pub pc: usize,
    pub halted: bool,
    pub cycles: u64,
    pub registers: [u32; 8],
    pub flags: Flags,

    /// Address of the first word in `memory`.
    pub memory_start: usize,

    /// The requested memory window.
    pub memory: Vec<u32>,
}

impl fmt::Display for StateDump {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "PC: {}{} after {} cycles",
            self.pc,
            if self.halted { " (halted)" } else { "" },
            self.cycles,
        )?;

        writeln!(
            f,
            "Registers: {}",
            self.registers
                .iter()
                .enumerate()
                .map(|(i, value)| format!("R{}={}", i, value))
                .join(" "),
        )?;

        writeln!(f, "Flags: {}", self.flags)?;
        writeln!(f, "Memory:")?;

        for (offset, word) in self.memory.iter().enumerate() {
            let decoded = match decode(*word) {
                Ok(ins) => ins.to_string(),
                Err(_) => String::from("?"),
            };

            writeln!(
                f,
                "  {:>4}: {} {:>11} {}",
                self.memory_start + offset,
                word_to_bits(*word),
                word,
                decoded,
            )?;
        }

        Ok(())
    }
}

/// Utility struct for implementing methods in the context of emulating a single instruction.
struct InstructionEmulationContext<'e, 'i, M> {
    /// The emulator in whose context the instruction is being emulated.
    emulator: &'e mut Emulator<M>,

    /// The instruction that we are currently emulating.
    instruction: &'i Instruction,
}

impl<'e, 'i, M> InstructionEmulationContext<'e, 'i, M>
where
    M: Memory,
{
    /// Returns value of the first register operand.
    fn first_operand(&self) -> u32 {
        self.emulator.context.r[self.instruction.register.index()]
    }

    /// Returns value of the second register operand.
    fn second_operand(&self) -> u32 {
        self.emulator.context.r[self.instruction.second_register.index()]
    }

    fn set_first_operand(&mut self, value: u32) {
        self.emulator.set_register(self.instruction.register, value);
    }

    fn set_second_operand(&mut self, value: u32) {
        self.emulator.set_register(self.instruction.second_register, value);
    }

    /// Address of the instruction being emulated.
    fn address(&self) -> usize {
        self.emulator.context.pc
    }

    /// Execute the instruction.
    ///
    /// # Returns
    /// An error if the instruction makes an illegal memory access or divides by zero.
    fn emulate(&mut self) -> Result<(), ExecutionError<M::Error>> {
        let field = self.instruction.field as u32;

        match self.instruction.opcode {
            OpCode::Halt => self.emulator.halt(HaltReason::HaltInstruction),

            OpCode::Load => {
                let word = self
                    .emulator
                    .memory
                    .get_word(field as usize)
                    .map_err(ExecutionError::Memory)?;
                self.set_first_operand(word);
            }
            OpCode::Store => {
                let value = self.first_operand();
                self.emulator.set_memory(field as usize, value)?;
            }

            OpCode::ShiftLeft => {
                let value = self.first_operand().checked_shl(field).unwrap_or(0);
                self.set_first_operand(value);
            }
            OpCode::ShiftRight => {
                let value = self.first_operand().checked_shr(field).unwrap_or(0);
                self.set_first_operand(value);
            }
            OpCode::ArithmeticShiftRight => {
                let value = (self.first_operand() as i32) >> cmp::min(field, 31);
                self.set_first_operand(value as u32);
            }
            OpCode::LoadImmediate => self.set_first_operand(field),
            OpCode::RotateLeft => {
                let value = self.first_operand().rotate_left(field);
                self.set_first_operand(value);
            }
            OpCode::RotateRight => {
                let value = self.first_operand().rotate_right(field);
                self.set_first_operand(value);
            }

            OpCode::Jump(condition) => {
                if self.emulator.context.flags.test(condition) {
                    // The increment at the end of the cycle lands on the target.
                    self.emulator.context.pc = (field as usize).wrapping_sub(1);
                }
            }

            OpCode::Or => self.set_first_operand(self.first_operand() | self.second_operand()),
            OpCode::And => self.set_first_operand(self.first_operand() & self.second_operand()),
            OpCode::Xor => self.set_first_operand(self.first_operand() ^ self.second_operand()),
            OpCode::Not => self.set_first_operand(!self.first_operand()),

            OpCode::Add => {
                let (a, b) = (self.first_operand(), self.second_operand());
                let sum = a as u64 + b as u64;
                let result = sum as u32;
                let carry = sum > u32::max_value() as u64;

                self.emulator.set_flags(Flags {
                    carry,
                    zero: result == 0,
                    negative: false,
                    parity: sum & 1 == 0,
                    overflow: carry || sign_overflow(a, b, sum as i64),
                });
                self.set_first_operand(result);
            }
            OpCode::Subtract => {
                let (a, b) = (self.first_operand(), self.second_operand());
                let difference = a as i64 - b as i64;
                let result = difference as u32;

                self.emulator.set_flags(Flags {
                    carry: difference < 0,
                    zero: result == 0,
                    negative: difference < 0,
                    parity: difference & 1 == 0,
                    overflow: sign_overflow(a, b, difference),
                });
                self.set_first_operand(result);
            }
            OpCode::Multiply => {
                let (a, b) = (self.first_operand(), self.second_operand());
                let product = a as u64 * b as u64;
                let result = product as u32;

                self.emulator.set_flags(Flags {
                    carry: product > u32::max_value() as u64,
                    zero: result == 0,
                    negative: false,
                    parity: product & 1 == 0,
                    overflow: sign_overflow(a, b, product as i64),
                });
                self.set_first_operand(result);
            }
            OpCode::Divide => {
                let (a, b) = (self.first_operand(), self.second_operand());

                if b == 0 {
                    return Err(ExecutionError::DivisionByZero {
                        address: self.address(),
                        dividend: self.instruction.register,
                        divisor: self.instruction.second_register,
                    });
                }

                let quotient = a / b;

                self.emulator.set_flags(Flags {
                    carry: false,
                    zero: quotient == 0,
                    negative: false,
                    parity: quotient & 1 == 0,
                    overflow: sign_overflow(a, b, quotient as i64),
                });
                self.set_first_operand(quotient);
                self.set_second_operand(a % b);
            }
            OpCode::Modulo => {
                let (a, b) = (self.first_operand(), self.second_operand());

                if b == 0 {
                    let fault = Fault::ModuloByZero {
                        address: self.address(),
                        dividend: self.instruction.register,
                        divisor: self.instruction.second_register,
                    };
                    self.emulator.fault(fault);
                    return Ok(());
                }

                let remainder = a % b;
                let overflow = self.emulator.context.flags.overflow;

                self.emulator.set_flags(Flags {
                    carry: false,
                    zero: remainder == 0,
                    negative: false,
                    parity: remainder & 1 == 0,
                    overflow,
                });
                self.set_first_operand(remainder);
            }

            OpCode::Copy => self.set_second_operand(self.first_operand()),
            OpCode::Compare => {
                let difference = self.first_operand() as i64 - self.second_operand() as i64;

                let flags = Flags {
                    zero: difference == 0,
                    negative: difference < 0,
                    carry: difference < 0,
                    ..self.emulator.context.flags
                };
                self.emulator.set_flags(flags);
            }
            OpCode::Swap => {
                let (a, b) = (self.first_operand(), self.second_operand());
                self.set_first_operand(b);
                self.set_second_operand(a);
            }
        }

        Ok(())
    }
}

/// The emulator contains all neccessary context for executing a DREAMCHASER program.
///
/// The machine is either running or halted. [run](Emulator::run) starts it from an entry
/// address and executes [steps](Emulator::step) until the halt word is fetched or the program
/// counter runs past the end of the memory.
pub struct Emulator<Mem> {
    /// The memory of the emulated machine.
    /// Contains all the instructions and data required by the program.
    /// Implements [Memory].
    pub memory: Mem,

    /// The execution context, which includes the registers and flags of the CPU.
    pub context: Context,

    /// True if the execution has been halted.
    pub halted: bool,

    /// Non-fatal faults recorded during the execution, in order.
    pub faults: Vec<Fault>,

    cycles: u64,
    cycle_limit: Option<u64>,
    logger: Logger,
    listeners: EventDispatcher,
}

impl<Mem> fmt::Debug for Emulator<Mem> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Emulator")
            .field("context", &self.context)
            .field("halted", &self.halted)
            .field("faults", &self.faults)
            .field("cycles", &self.cycles)
            .field("cycle_limit", &self.cycle_limit)
            .finish()
    }
}

impl<Mem> Emulator<Mem>
where
    Mem: Memory,
{
    /// Create a new emulator.
    ///
    /// # Parameters
    /// - `memory`: A [Memory] object which has the program.
    ///
    /// # Returns
    /// A new [Emulator] instance with zeroed registers and flags and the program counter at 0.
    pub fn new(memory: Mem) -> Emulator<Mem> {
        Emulator::with_logger(memory, None)
    }

    /// Create a new emulator which logs the execution to `logger`.
    pub fn with_logger<L>(memory: Mem, logger: L) -> Emulator<Mem>
    where
        L: Into<Option<Logger>>,
    {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()))
            .new(o!("stage" => "execution"));

        Emulator {
            memory,
            context: Context::default(),
            halted: false,
            faults: Vec::new(),
            cycles: 0,
            cycle_limit: None,
            logger,
            listeners: EventDispatcher::new(),
        }
    }

    pub fn set_logger(&mut self, logger: Logger) {
        self.logger = logger.new(o!("stage" => "execution"));
    }

    /// Limits the number of instructions [run](Emulator::run) executes before it gives up
    /// with [ExecutionError::CycleLimitExceeded]. `None` removes the limit.
    pub fn set_cycle_limit(&mut self, limit: Option<u64>) {
        self.cycle_limit = limit;
    }

    /// Number of instructions executed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Registers a listener that receives every [Event] of the execution.
    pub fn add_listener<L: EventListener + 'static>(&mut self, listener: L) {
        self.listeners.add_listener(listener);
    }

    /// Value of a register.
    pub fn register(&self, register: Register) -> u32 {
        self.context.r[register.index()]
    }

    fn set_register(&mut self, register: Register, data: u32) {
        self.context.r[register.index()] = data;

        if !self.listeners.is_empty() {
            self.listeners.dispatch(Event::RegisterChange { register, data });
        }
    }

    fn set_memory(&mut self, address: usize, data: u32) -> Result<(), ExecutionError<Mem::Error>> {
        self.memory
            .set_word(address, data)
            .map_err(ExecutionError::Memory)?;

        if !self.listeners.is_empty() {
            self.listeners.dispatch(Event::MemoryChange { address, data });
        }

        Ok(())
    }

    fn set_flags(&mut self, flags: Flags) {
        self.context.flags = flags;

        if !self.listeners.is_empty() {
            self.listeners.dispatch(Event::FlagsChange { flags });
        }
    }

    fn fault(&mut self, fault: Fault) {
        warn!(self.logger, "fault"; "fault" => %fault);

        self.faults.push(fault);
        self.listeners.dispatch(Event::Fault(fault));
    }

    fn halt(&mut self, reason: HaltReason) {
        debug!(self.logger, "halt"; "pc" => self.context.pc, "reason" => ?reason, "cycles" => self.cycles);

        self.halted = true;
        self.listeners.dispatch(Event::Halted {
            address: self.context.pc,
            reason,
        });
    }

    /// Relocates `program` to `base` and writes it into the memory.
    ///
    /// # Returns
    /// The placed [MemoryImage], or an error if the program is empty or does not fit.
    pub fn load(&mut self, program: &Program, base: usize) -> Result<MemoryImage, LoadError<Mem::Error>> {
        let image = loader::link_with_logger(
            program.words(),
            base,
            self.memory.size(),
            self.logger.clone(),
        )?;

        image.load_into(&mut self.memory)?;

        Ok(image)
    }

    /// Fetches the word from the address pointed by the Program Counter register.
    ///
    /// # Returns
    /// `None` if the Program Counter is past the end of the memory.
    pub fn get_current_word(&self) -> Result<Option<u32>, Mem::Error> {
        if self.context.pc >= self.memory.size() {
            return Ok(None);
        }

        self.memory.get_word(self.context.pc).map(Some)
    }

    /// Executes a single instruction.
    ///
    /// Does not increment the `PC` register or do anything else related to the instruction
    /// fetching.
    ///
    /// # Errors
    /// Returns an error if the instruction makes an illegal memory access or divides by zero.
    pub fn emulate_instruction(&mut self, ins: &Instruction) -> Result<(), ExecutionError<Mem::Error>> {
        let mut ctx = InstructionEmulationContext {
            emulator: self,
            instruction: ins,
        };

        ctx.emulate()
    }

    /// Runs a single fetch-decode-execute cycle.
    ///
    /// Fetching the halt word or running past the end of the memory halts the machine.
    /// A word that cannot be decoded is recorded as a [Fault] and skipped.
    ///
    /// # Errors
    /// On an error the program counter is left at the failing instruction.
    pub fn step(&mut self) -> Result<(), ExecutionError<Mem::Error>> {
        if self.halted {
            return Ok(());
        }

        let word = match self.get_current_word().map_err(ExecutionError::Memory)? {
            None => {
                self.halt(HaltReason::EndOfMemory);
                return Ok(());
            }
            Some(HALT_WORD) => {
                self.halt(HaltReason::HaltInstruction);
                return Ok(());
            }
            Some(word) => word,
        };

        if let Some(limit) = self.cycle_limit {
            if self.cycles >= limit {
                return Err(ExecutionError::CycleLimitExceeded { limit });
            }
        }

        self.cycles += 1;

        match decode(word) {
            Ok(ins) => {
                trace!(self.logger, "execute"; "pc" => self.context.pc, "word" => word, "instruction" => %ins);
                self.emulate_instruction(&ins)?;
            }
            Err(DecodeError::UnrecognizedOpcode { word }) => {
                let address = self.context.pc;
                self.fault(Fault::UnrecognizedOpcode { address, word });
            }
        }

        self.context.pc = self.context.pc.wrapping_add(1);

        Ok(())
    }

    /// Executes the program from `entry` until it halts.
    ///
    /// Halting is final: a halted machine is not restarted.
    ///
    /// # Errors
    /// Returns an error if the machine has already halted, if an instruction makes an illegal
    /// memory access or divides by zero, or if the cycle limit is reached.
    pub fn run(&mut self, entry: usize) -> Result<(), ExecutionError<Mem::Error>> {
        if self.halted {
            return Err(ExecutionError::AlreadyHalted {
                address: self.context.pc,
            });
        }

        self.context.pc = entry;

        while !self.halted {
            self.step()?;
        }

        Ok(())
    }

    /// Captures the registers, flags and up to `len` memory words starting from `start`.
    pub fn dump(&self, start: usize, len: usize) -> Result<StateDump, Mem::Error> {
        let end = cmp::min(start.saturating_add(len), self.memory.size());

        let memory = (start..end)
            .map(|addr| self.memory.get_word(addr))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StateDump {
            pc: self.context.pc,
            halted: self.halted,
            cycles: self.cycles,
            registers: self.context.r,
            flags: self.context.flags,
            memory_start: start,
            memory,
        })
    }
}
