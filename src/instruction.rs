//! Types for representing instructions and their parts, and the decoder that classifies raw
//! words into them.
//!
//! Every instruction is a single 32-bit word following one of four layouts:
//!
//! ```text
//! Register-memory     | opcode (18) | reg (3) | address (11)   |
//! Register-immediate  | opcode (18) | reg (3) | immediate (11) |
//! Jump                | opcode (21)           | address (11)   |
//! Register-register   | opcode (26)                 | r1 (3) | r2 (3) |
//! ```
//!
//! The layouts carry no explicit tag. Opcode values are chosen so that the value left by
//! masking a word with each format's opcode mask never collides with another format, which lets
//! [decode] try the masks one after another.

use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;

/// The reserved all-zero word. Fetching it stops the machine.
pub const HALT_WORD: u32 = 0;

/// Selects the opcode of the [register-memory](Format::RegisterMemory) and
/// [register-immediate](Format::RegisterImmediate) formats.
pub const REGISTER_FIELD_OPCODE_MASK: u32 = 0xFFFF_C000;

/// Selects the opcode of the [jump](Format::Jump) format.
pub const JUMP_OPCODE_MASK: u32 = 0xFFFF_F800;

/// Selects the opcode of the [register-register](Format::RegisterRegister) format.
pub const REGISTER_PAIR_OPCODE_MASK: u32 = 0xFFFF_FFC0;

/// Width of the address/immediate field.
pub const FIELD_BITS: u32 = 11;

/// Selects the address/immediate field.
pub const FIELD_MASK: u32 = (1 << FIELD_BITS) - 1;

/// Largest value the address/immediate field can hold.
pub const MAX_FIELD: u16 = FIELD_MASK as u16;

const REGISTER_BITS: u32 = 3;

/// Extracts `width` bits of `word` starting from bit `low`.
pub fn bits(word: u32, low: u32, width: u32) -> u32 {
    (word >> low) & ((1u32 << width) - 1)
}

/// The four bit layouts an instruction word can follow.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// A register and a memory address. (`CARGAR`, `ALMACENAR`)
    RegisterMemory,

    /// A register and an immediate value.
    RegisterImmediate,

    /// A jump target address.
    Jump,

    /// Two registers.
    RegisterRegister,
}

impl Format {
    /// Width of the opcode field in bits.
    pub fn opcode_width(&self) -> u32 {
        match self {
            Format::RegisterMemory | Format::RegisterImmediate => 18,
            Format::Jump => 21,
            Format::RegisterRegister => 26,
        }
    }

    /// Position of the lowest bit of the opcode field.
    pub fn opcode_shift(&self) -> u32 {
        32 - self.opcode_width()
    }

    /// Mask selecting the opcode field of a word in this format.
    pub fn opcode_mask(&self) -> u32 {
        match self {
            Format::RegisterMemory | Format::RegisterImmediate => REGISTER_FIELD_OPCODE_MASK,
            Format::Jump => JUMP_OPCODE_MASK,
            Format::RegisterRegister => REGISTER_PAIR_OPCODE_MASK,
        }
    }

    /// Reads the opcode field of `word` as if it followed this format.
    pub fn opcode_field(&self, word: u32) -> u32 {
        (word & self.opcode_mask()) >> self.opcode_shift()
    }
}

/// Describes the predicate of a (un)conditional jump instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum JumpCondition {
    /// Unconditional jump. (`SALTAR`)
    Always,

    /// Jump if the zero flag is set. (`SALTARSICERO`)
    Zero,

    /// Jump if the negative flag is clear. (`SALTARSIPOS`)
    Positive,

    /// Jump if the negative flag is set. (`SALTARSINEG`)
    Negative,

    /// Jump if the parity flag is set. (`SALTARSIPAR`)
    Parity,

    /// Jump if the carry flag is set. (`SALTARSICARRY`)
    Carry,

    /// Jump if the overflow flag is set. (`SALTARSIDES`)
    Overflow,

    /// Jump if the overflow flag is clear. (`SALTARSINODES`)
    NoOverflow,
}

/// Operations of the DREAMCHASER instruction architecture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Stops the machine. Encoded as the all-zero word.
    Halt,

    /// Copies a word from memory into a register.
    Load,

    /// Copies a register into memory.
    Store,

    /// Logical shift left by an immediate amount.
    ShiftLeft,

    /// Logical shift right by an immediate amount.
    ShiftRight,

    /// Shift right by an immediate amount, preserving the sign bit.
    ArithmeticShiftRight,

    /// Sets a register to an immediate value.
    LoadImmediate,

    /// Circular rotation to the left by an immediate amount.
    RotateLeft,

    /// Circular rotation to the right by an immediate amount.
    RotateRight,

    /// Changes the program counter if the condition holds.
    Jump(JumpCondition),

    Or,
    And,
    Xor,
    Not,

    /// Adds the second register into the first one.
    Add,

    /// Subtracts the second register from the first one.
    Subtract,

    /// Multiplies the first register by the second one.
    Multiply,

    /// Stores the quotient into the first register and the remainder into the second one.
    Divide,

    /// Copies the first register into the second one.
    Copy,

    /// Subtracts the second register from the first one, updating only the flags.
    Compare,

    /// Exchanges the values of the two registers.
    Swap,

    /// Stores the remainder of the division into the first register.
    Modulo,
}

impl OpCode {
    /// Every operation of the instruction set.
    pub const ALL: [OpCode; 29] = [
        OpCode::Halt,
        OpCode::Load,
        OpCode::Store,
        OpCode::ShiftLeft,
        OpCode::ShiftRight,
        OpCode::ArithmeticShiftRight,
        OpCode::LoadImmediate,
        OpCode::RotateLeft,
        OpCode::RotateRight,
        OpCode::Jump(JumpCondition::Always),
        OpCode::Jump(JumpCondition::Zero),
        OpCode::Jump(JumpCondition::Positive),
        OpCode::Jump(JumpCondition::Negative),
        OpCode::Jump(JumpCondition::Parity),
        OpCode::Jump(JumpCondition::Carry),
        OpCode::Jump(JumpCondition::Overflow),
        OpCode::Jump(JumpCondition::NoOverflow),
        OpCode::Or,
        OpCode::And,
        OpCode::Xor,
        OpCode::Not,
        OpCode::Add,
        OpCode::Subtract,
        OpCode::Multiply,
        OpCode::Divide,
        OpCode::Copy,
        OpCode::Compare,
        OpCode::Swap,
        OpCode::Modulo,
    ];

    /// The layout of instructions with this opcode. `None` for [OpCode::Halt], which is a
    /// fixed word rather than a format.
    pub fn format(&self) -> Option<Format> {
        match self {
            OpCode::Halt => None,

            OpCode::Load | OpCode::Store => Some(Format::RegisterMemory),

            OpCode::ShiftLeft
            | OpCode::ShiftRight
            | OpCode::ArithmeticShiftRight
            | OpCode::LoadImmediate
            | OpCode::RotateLeft
            | OpCode::RotateRight => Some(Format::RegisterImmediate),

            OpCode::Jump(_) => Some(Format::Jump),

            _ => Some(Format::RegisterRegister),
        }
    }

    /// Value of the opcode field, before it is shifted into place.
    pub fn code(&self) -> u32 {
        match self {
            OpCode::Halt => 0,

            OpCode::Load => 0b100,
            OpCode::Store => 0b110,

            OpCode::ShiftLeft => 0b0001,
            OpCode::ShiftRight => 0b0010,
            OpCode::ArithmeticShiftRight => 0b0011,
            OpCode::LoadImmediate => 0b0101,
            OpCode::RotateLeft => 0b0111,
            OpCode::RotateRight => 0b1000,

            OpCode::Jump(JumpCondition::Zero) => 0b0001,
            OpCode::Jump(JumpCondition::Positive) => 0b0010,
            OpCode::Jump(JumpCondition::Negative) => 0b0011,
            OpCode::Jump(JumpCondition::Parity) => 0b0100,
            OpCode::Jump(JumpCondition::Carry) => 0b0101,
            OpCode::Jump(JumpCondition::Overflow) => 0b0110,
            OpCode::Jump(JumpCondition::Always) => 0b0111,
            // 0b1000 would read as ShiftLeft under the register/field mask.
            OpCode::Jump(JumpCondition::NoOverflow) => 0b100_1000,

            OpCode::Or => 0b0001,
            OpCode::And => 0b0010,
            OpCode::Xor => 0b0011,
            OpCode::Not => 0b0100,
            OpCode::Add => 0b0101,
            OpCode::Subtract => 0b0110,
            OpCode::Multiply => 0b0111,
            OpCode::Divide => 0b1000,
            OpCode::Copy => 0b1001,
            OpCode::Compare => 0b1010,
            OpCode::Swap => 0b1011,
            OpCode::Modulo => 0b1101,
        }
    }

    /// Looks up the opcode with the opcode field value `code` in the table of `format`.
    pub fn from_code(format: Format, code: u32) -> Option<OpCode> {
        let opcode = match (format, code) {
            (Format::RegisterMemory, 0b100) => OpCode::Load,
            (Format::RegisterMemory, 0b110) => OpCode::Store,

            (Format::RegisterImmediate, 0b0001) => OpCode::ShiftLeft,
            (Format::RegisterImmediate, 0b0010) => OpCode::ShiftRight,
            (Format::RegisterImmediate, 0b0011) => OpCode::ArithmeticShiftRight,
            (Format::RegisterImmediate, 0b0101) => OpCode::LoadImmediate,
            (Format::RegisterImmediate, 0b0111) => OpCode::RotateLeft,
            (Format::RegisterImmediate, 0b1000) => OpCode::RotateRight,

            (Format::Jump, 0b0001) => OpCode::Jump(JumpCondition::Zero),
            (Format::Jump, 0b0010) => OpCode::Jump(JumpCondition::Positive),
            (Format::Jump, 0b0011) => OpCode::Jump(JumpCondition::Negative),
            (Format::Jump, 0b0100) => OpCode::Jump(JumpCondition::Parity),
            (Format::Jump, 0b0101) => OpCode::Jump(JumpCondition::Carry),
            (Format::Jump, 0b0110) => OpCode::Jump(JumpCondition::Overflow),
            (Format::Jump, 0b0111) => OpCode::Jump(JumpCondition::Always),
            (Format::Jump, 0b100_1000) => OpCode::Jump(JumpCondition::NoOverflow),

            (Format::RegisterRegister, 0b0001) => OpCode::Or,
            (Format::RegisterRegister, 0b0010) => OpCode::And,
            (Format::RegisterRegister, 0b0011) => OpCode::Xor,
            (Format::RegisterRegister, 0b0100) => OpCode::Not,
            (Format::RegisterRegister, 0b0101) => OpCode::Add,
            (Format::RegisterRegister, 0b0110) => OpCode::Subtract,
            (Format::RegisterRegister, 0b0111) => OpCode::Multiply,
            (Format::RegisterRegister, 0b1000) => OpCode::Divide,
            (Format::RegisterRegister, 0b1001) => OpCode::Copy,
            (Format::RegisterRegister, 0b1010) => OpCode::Compare,
            (Format::RegisterRegister, 0b1011) => OpCode::Swap,
            (Format::RegisterRegister, 0b1101) => OpCode::Modulo,

            _ => return None,
        };

        Some(opcode)
    }

    /// True for the operations whose field is an address: loads, stores and jumps.
    /// The linker-loader relocates the field of these instructions.
    pub fn references_memory(&self) -> bool {
        match self {
            OpCode::Load | OpCode::Store | OpCode::Jump(_) => true,
            _ => false,
        }
    }

    /// The assembly mnemonic of the operation.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            OpCode::Halt => "PARAR",

            OpCode::Load => "CARGAR",
            OpCode::Store => "ALMACENAR",

            OpCode::ShiftLeft => "LSL",
            OpCode::ShiftRight => "LSR",
            OpCode::ArithmeticShiftRight => "ASR",
            OpCode::LoadImmediate => "CARGARVALOR",
            OpCode::RotateLeft => "ROTACIONL",
            OpCode::RotateRight => "ROTACIONR",

            OpCode::Jump(JumpCondition::Always) => "SALTAR",
            OpCode::Jump(JumpCondition::Zero) => "SALTARSICERO",
            OpCode::Jump(JumpCondition::Positive) => "SALTARSIPOS",
            OpCode::Jump(JumpCondition::Negative) => "SALTARSINEG",
            OpCode::Jump(JumpCondition::Parity) => "SALTARSIPAR",
            OpCode::Jump(JumpCondition::Carry) => "SALTARSICARRY",
            OpCode::Jump(JumpCondition::Overflow) => "SALTARSIDES",
            OpCode::Jump(JumpCondition::NoOverflow) => "SALTARSINODES",

            OpCode::Or => "OR",
            OpCode::And => "AND",
            OpCode::Xor => "XOR",
            OpCode::Not => "NOT",
            OpCode::Add => "SUMAR",
            OpCode::Subtract => "RESTAR",
            OpCode::Multiply => "MULT",
            OpCode::Divide => "DIV",
            OpCode::Copy => "COPIAR",
            OpCode::Compare => "COMP",
            OpCode::Swap => "INTERCAMBIAR",
            OpCode::Modulo => "MOD",
        }
    }
}

lazy_static! {
    static ref MNEMONICS: HashMap<&'static str, OpCode> = OpCode::ALL
        .iter()
        .map(|opcode| (opcode.mnemonic(), *opcode))
        .collect();
}

impl FromStr for OpCode {
    type Err = ();

    /// Parses a mnemonic. Mnemonics are case sensitive.
    fn from_str(input: &str) -> Result<OpCode, ()> {
        MNEMONICS.get(input).copied().ok_or(())
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// The eight general purpose registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl Register {
    /// All registers in index order.
    pub const ALL: [Register; 8] = [
        Register::R0,
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
        Register::R6,
        Register::R7,
    ];

    /// Returns the register selected by the low three bits of `bits`.
    pub fn from_bits(bits: u32) -> Register {
        Register::ALL[(bits & 0b111) as usize]
    }

    pub fn index(&self) -> usize {
        match self {
            Register::R0 => 0,
            Register::R1 => 1,
            Register::R2 => 2,
            Register::R3 => 3,
            Register::R4 => 4,
            Register::R5 => 5,
            Register::R6 => 6,
            Register::R7 => 7,
        }
    }
}

impl FromStr for Register {
    type Err = ();

    fn from_str(input: &str) -> Result<Register, ()> {
        match input {
            "R0" => Ok(Register::R0),
            "R1" => Ok(Register::R1),
            "R2" => Ok(Register::R2),
            "R3" => Ok(Register::R3),
            "R4" => Ok(Register::R4),
            "R5" => Ok(Register::R5),
            "R6" => Ok(Register::R6),
            "R7" => Ok(Register::R7),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "R{}", self.index())
    }
}

/// A decoded instruction.
///
/// Fields that the opcode's format does not use are left at `R0`/`0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: OpCode,

    /// The register of the register-memory and register-immediate formats, or the first
    /// register of the register-register format.
    pub register: Register,

    /// The second register of the register-register format.
    pub second_register: Register,

    /// The 11-bit address or immediate value.
    pub field: u16,
}

impl Instruction {
    pub fn halt() -> Instruction {
        Instruction {
            opcode: OpCode::Halt,
            register: Register::R0,
            second_register: Register::R0,
            field: 0,
        }
    }

    /// Creates a register-memory or register-immediate instruction.
    pub fn with_field(opcode: OpCode, register: Register, field: u16) -> Instruction {
        Instruction {
            opcode,
            register,
            second_register: Register::R0,
            field,
        }
    }

    pub fn jump(condition: JumpCondition, target: u16) -> Instruction {
        Instruction {
            opcode: OpCode::Jump(condition),
            register: Register::R0,
            second_register: Register::R0,
            field: target,
        }
    }

    /// Creates a register-register instruction.
    pub fn with_registers(opcode: OpCode, first: Register, second: Register) -> Instruction {
        Instruction {
            opcode,
            register: first,
            second_register: second,
            field: 0,
        }
    }
}

impl From<Instruction> for u32 {
    fn from(ins: Instruction) -> u32 {
        let field = ins.field as u32 & FIELD_MASK;

        match ins.opcode.format() {
            None => HALT_WORD,
            Some(format @ Format::RegisterMemory) | Some(format @ Format::RegisterImmediate) => {
                (ins.opcode.code() << format.opcode_shift())
                    | ((ins.register.index() as u32) << FIELD_BITS)
                    | field
            }
            Some(format @ Format::Jump) => (ins.opcode.code() << format.opcode_shift()) | field,
            Some(format @ Format::RegisterRegister) => {
                (ins.opcode.code() << format.opcode_shift())
                    | ((ins.register.index() as u32) << REGISTER_BITS)
                    | ins.second_register.index() as u32
            }
        }
    }
}

/// Error produced when a word matches none of the opcode tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    UnrecognizedOpcode {
        /// The offending word.
        word: u32,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::UnrecognizedOpcode { word } => write!(
                f,
                "unrecognized operation {} in word {:032b}",
                word & REGISTER_FIELD_OPCODE_MASK,
                word,
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Classifies a word into an [Instruction].
///
/// The halt word is recognized first. Otherwise the word is masked with the register/field
/// mask, the jump mask and the register-pair mask in that order, and the first masked value
/// found in the matching opcode table selects the operation.
pub fn decode(word: u32) -> Result<Instruction, DecodeError> {
    if word == HALT_WORD {
        return Ok(Instruction::halt());
    }

    let field = bits(word, 0, FIELD_BITS) as u16;

    let code = Format::RegisterMemory.opcode_field(word);
    let register_field_opcode = OpCode::from_code(Format::RegisterMemory, code)
        .or_else(|| OpCode::from_code(Format::RegisterImmediate, code));

    if let Some(opcode) = register_field_opcode {
        let register = Register::from_bits(bits(word, FIELD_BITS, REGISTER_BITS));
        return Ok(Instruction::with_field(opcode, register, field));
    }

    let code = Format::Jump.opcode_field(word);

    if let Some(opcode) = OpCode::from_code(Format::Jump, code) {
        return Ok(Instruction {
            opcode,
            register: Register::R0,
            second_register: Register::R0,
            field,
        });
    }

    let code = Format::RegisterRegister.opcode_field(word);

    if let Some(opcode) = OpCode::from_code(Format::RegisterRegister, code) {
        let first = Register::from_bits(bits(word, REGISTER_BITS, REGISTER_BITS));
        let second = Register::from_bits(bits(word, 0, REGISTER_BITS));
        return Ok(Instruction::with_registers(opcode, first, second));
    }

    Err(DecodeError::UnrecognizedOpcode { word })
}

impl TryFrom<u32> for Instruction {
    type Error = DecodeError;

    fn try_from(word: u32) -> Result<Instruction, DecodeError> {
        decode(word)
    }
}

impl fmt::Display for Instruction {
    /// Formats the instruction as a line the assembler accepts.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.opcode.format() {
            None => write!(f, "{}", self.opcode),
            Some(Format::RegisterMemory) | Some(Format::RegisterImmediate) => {
                write!(f, "{} {} {}", self.opcode, self.register, self.field)
            }
            Some(Format::Jump) => write!(f, "{} {}", self.opcode, self.field),
            Some(Format::RegisterRegister) => {
                write!(f, "{} {} {}", self.opcode, self.register, self.second_register)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_opcode_values() {
        // Values of each opcode after masking, as laid out in the opcode tables.
        let cases = vec![
            (OpCode::Load, 65536),
            (OpCode::Store, 98304),
            (OpCode::ShiftLeft, 16384),
            (OpCode::ShiftRight, 32768),
            (OpCode::ArithmeticShiftRight, 49152),
            (OpCode::LoadImmediate, 81920),
            (OpCode::RotateLeft, 114688),
            (OpCode::RotateRight, 131072),
            (OpCode::Jump(JumpCondition::Zero), 2048),
            (OpCode::Jump(JumpCondition::Positive), 4096),
            (OpCode::Jump(JumpCondition::Negative), 6144),
            (OpCode::Jump(JumpCondition::Parity), 8192),
            (OpCode::Jump(JumpCondition::Carry), 10240),
            (OpCode::Jump(JumpCondition::Overflow), 12288),
            (OpCode::Jump(JumpCondition::Always), 14336),
            (OpCode::Or, 64),
            (OpCode::Add, 320),
            (OpCode::Modulo, 832),
        ];

        for (opcode, value) in cases {
            let format = opcode.format().unwrap();
            assert_eq!(opcode.code() << format.opcode_shift(), value, "{}", opcode);
        }
    }

    #[test]
    fn test_opcode_tables_are_disjoint() {
        for opcode in OpCode::ALL.iter().filter(|op| **op != OpCode::Halt) {
            for &field in &[0, 1, MAX_FIELD] {
                let ins = match opcode.format().unwrap() {
                    Format::RegisterRegister => {
                        Instruction::with_registers(*opcode, Register::R7, Register::R5)
                    }
                    Format::Jump => Instruction {
                        opcode: *opcode,
                        ..Instruction::jump(JumpCondition::Always, field)
                    },
                    _ => Instruction::with_field(*opcode, Register::R3, field),
                };

                let word: u32 = ins.into();

                assert_eq!(decode(word), Ok(ins), "{} decoded from {:032b}", ins, word);
            }
        }
    }

    #[test]
    fn test_decode_fields() {
        let ins = decode(0b000000000000000100_011_00000000011).unwrap();
        assert_eq!(ins, Instruction::with_field(OpCode::Load, Register::R3, 3));

        let ins = decode(0b000000000000000000111_00000000101).unwrap();
        assert_eq!(ins, Instruction::jump(JumpCondition::Always, 5));

        let ins = decode(0b00000000000000000000000110_010_001).unwrap();
        assert_eq!(ins, Instruction::with_registers(OpCode::Subtract, Register::R2, Register::R1));
    }

    #[test]
    fn test_opcode_field_per_format() {
        let word = 0b000000000000000100_011_00000000011;

        assert_eq!(Format::RegisterMemory.opcode_field(word), 0b100);
        assert_eq!(Format::RegisterImmediate.opcode_field(word), 0b100);
        assert_eq!(Format::Jump.opcode_field(word), 0b100_011);
        assert_eq!(Format::RegisterRegister.opcode_field(word), 0b100_011_00000);
    }

    #[test]
    fn test_decode_halt() {
        assert_eq!(decode(HALT_WORD), Ok(Instruction::halt()));
        assert_eq!(Instruction::try_from(HALT_WORD), Ok(Instruction::halt()));
    }

    #[test]
    fn test_decode_unrecognized() {
        // Opcode field values that no table contains.
        for &word in &[0x0000_0001, 0x0000_0380, 0x0004_0000, 0xFFFF_FFFF] {
            assert_eq!(decode(word), Err(DecodeError::UnrecognizedOpcode { word }));
        }
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!("SALTARSINODES".parse::<OpCode>(), Ok(OpCode::Jump(JumpCondition::NoOverflow)));
        assert_eq!("INTERCAMBIAR".parse::<OpCode>(), Ok(OpCode::Swap));
        assert_eq!("sumar".parse::<OpCode>(), Err(()));
        assert_eq!("R7".parse::<Register>(), Ok(Register::R7));
        assert_eq!("R8".parse::<Register>(), Err(()));
    }

    #[test]
    fn test_display_is_assembly() {
        let ins = Instruction::with_field(OpCode::LoadImmediate, Register::R4, 2047);
        assert_eq!(ins.to_string(), "CARGARVALOR R4 2047");

        let ins = Instruction::with_registers(OpCode::Swap, Register::R1, Register::R6);
        assert_eq!(ins.to_string(), "INTERCAMBIAR R1 R6");

        assert_eq!(Instruction::jump(JumpCondition::Carry, 12).to_string(), "SALTARSICARRY 12");
        assert_eq!(Instruction::halt().to_string(), "PARAR");
    }
}
