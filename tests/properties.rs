use dreamchaser::{
    assembler::{assemble, assemble_line},
    emulator::{Emulator, ExecutionError, Fault},
    instruction::{decode, Format, Instruction, JumpCondition, OpCode, Register, MAX_FIELD},
    loader::{link, load, LoadError},
    memory::{FixedMemory, Memory, MemoryError},
};

macro_rules! assert_register {
    ($emulator:expr, $register:expr, $value:expr) => {
        let expected: u32 = $value;
        assert_eq!(
            $emulator.register($register),
            expected,
            "Register {} != {:#x}",
            $register,
            expected
        );
    };
}

fn emulator(source: &str) -> Emulator<FixedMemory> {
    let program = assemble(source).unwrap();

    let mut emulator = Emulator::new(FixedMemory::default());
    emulator.load(&program, 0).unwrap();
    emulator
}

#[test]
fn test_decode_assembled_lines() {
    let registers = Register::ALL;
    let fields = [0, 1, 2, 100, 1023, 1024, MAX_FIELD];

    for opcode in OpCode::ALL.iter() {
        let mut instructions = Vec::new();

        match opcode.format() {
            None => instructions.push(Instruction::halt()),
            Some(Format::Jump) => {
                for field in &fields {
                    instructions.push(Instruction::with_field(*opcode, Register::R0, *field));
                }
            }
            Some(Format::RegisterRegister) => {
                for first in &registers {
                    for second in &registers {
                        instructions.push(Instruction::with_registers(*opcode, *first, *second));
                    }
                }
            }
            Some(_) => {
                for register in &registers {
                    for field in &fields {
                        instructions.push(Instruction::with_field(*opcode, *register, *field));
                    }
                }
            }
        }

        for ins in instructions {
            let line = ins.to_string();
            let word = assemble_line(&line).unwrap();

            assert_eq!(decode(word), Ok(ins), "{}", line);
        }
    }
}

#[test]
fn test_add_wraps_around() {
    let mut emulator = emulator("SUMAR R0, R1\nPARAR");
    emulator.context.r[0] = 0xFFFF_FFFF;
    emulator.context.r[1] = 1;

    emulator.run(0).unwrap();

    assert_register!(emulator, Register::R0, 0);
    assert!(emulator.context.flags.carry);
    assert!(emulator.context.flags.zero);
}

#[test]
fn test_subtract_to_zero() {
    let mut emulator = emulator("RESTAR R0, R1\nPARAR");
    emulator.context.r[0] = 5;
    emulator.context.r[1] = 5;

    emulator.run(0).unwrap();

    assert_register!(emulator, Register::R0, 0);
    assert!(emulator.context.flags.zero);
    assert!(!emulator.context.flags.negative);
    assert!(!emulator.context.flags.carry);
}

#[test]
fn test_load_relocates_address() {
    let mut memory = FixedMemory::default();
    let program = [assemble_line("CARGAR R0 3").unwrap()];

    load(&mut memory, &program, 256).unwrap();

    let ins = decode(memory.get_word(256).unwrap()).unwrap();
    assert_eq!(ins, Instruction::with_field(OpCode::Load, Register::R0, 259));
}

#[test]
fn test_halt_only_program() {
    let mut emulator = Emulator::new(FixedMemory::default());

    emulator.load(&assemble("PARAR").unwrap(), 0).unwrap();
    emulator.run(0).unwrap();

    assert!(emulator.halted);
    assert_eq!(emulator.cycles(), 0);
    assert_eq!(emulator.context.r, [0; 8]);
    assert!(emulator.memory.occupied().is_empty());
}

#[test]
fn test_jump_lands_on_target() {
    let mut emulator = Emulator::new(FixedMemory::default());
    emulator.memory.set_word(2, assemble_line("SALTAR 5").unwrap()).unwrap();
    emulator.context.pc = 2;

    emulator.step().unwrap();

    assert_eq!(emulator.context.pc, 5);
}

#[test]
fn test_empty_program_is_rejected() {
    assert_eq!(link::<MemoryError>(&[], 0, 2048), Err(LoadError::EmptyProgram));

    let mut emulator = Emulator::new(FixedMemory::default());
    let program = assemble("; nothing here\n\n").unwrap();

    assert_eq!(emulator.load(&program, 0), Err(LoadError::EmptyProgram));
}

#[test]
fn test_modulo_by_zero_is_reported() {
    let mut emulator = emulator("CARGARVALOR R0 17\nMOD R0 R1\nPARAR");

    emulator.run(0).unwrap();

    assert_register!(emulator, Register::R0, 17);
    assert_register!(emulator, Register::R1, 0);
    assert_eq!(emulator.faults, vec![Fault::ModuloByZero {
        address: 1,
        dividend: Register::R0,
        divisor: Register::R1,
    }]);
}

#[test]
fn test_division_by_zero_aborts() {
    let mut emulator = emulator("CARGARVALOR R0 17\nDIV R0 R1\nPARAR");

    assert_eq!(emulator.run(0), Err(ExecutionError::DivisionByZero {
        address: 1,
        dividend: Register::R0,
        divisor: Register::R1,
    }));
}

#[test]
fn test_runaway_loop_is_bounded() {
    let mut emulator = emulator("SALTARSIPOS 0");
    emulator.set_cycle_limit(Some(1000));

    assert_eq!(emulator.run(0), Err(ExecutionError::CycleLimitExceeded { limit: 1000 }));
}

#[test]
fn test_running_off_the_end() {
    let program = assemble("CARGARVALOR R3 9\nSALTARSINEG 0").unwrap();

    let mut emulator = Emulator::new(FixedMemory::new(4));
    emulator.load(&program, 2).unwrap();
    emulator.run(2).unwrap();

    assert!(emulator.halted);
    assert_eq!(emulator.context.pc, 4);
    assert_register!(emulator, Register::R3, 9);

    let dump = emulator.dump(0, 8).unwrap();
    assert_eq!(dump.memory.len(), 4);
    assert_eq!(
        decode(dump.memory[3]),
        Ok(Instruction::jump(JumpCondition::Negative, 2)),
    );
}
