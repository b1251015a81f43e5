//! Classic CHIP-8 virtual machine core.
//!
//! The crate is split the way the original hardware was: [`Machine`] is the
//! state (memory, registers, stack, display, keypad, timers) and
//! [`Interpreter`] is the engine that runs fetch-decode-execute cycles
//! against it. The host owns the pacing: it calls [`Interpreter::step`] a
//! handful of times per video frame and [`Machine::tick_timers`] once per
//! frame, reading the display buffer and writing the keypad in between.
//!
//! ```
//! use chip8vm::{Interpreter, Machine};
//!
//! let mut machine = Machine::new();
//! machine.load_program(&[0x60, 0x2A]).unwrap(); // V0 = 42
//!
//! let mut interpreter = Interpreter::new();
//! interpreter.step(&mut machine).unwrap();
//!
//! assert_eq!(machine.v[0], 42);
//! assert_eq!(machine.pc, 0x202);
//! ```

pub mod instruction;
pub mod interpreter;
pub mod machine;

pub use instruction::Instruction;
pub use interpreter::Interpreter;
pub use machine::{Machine, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Errors reported by the core.
///
/// `UnknownOpcode` is non-fatal: the program counter has already advanced
/// past the offending word, so the caller may keep stepping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("program is {size} bytes, the machine fits at most {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("unknown opcode {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },
}
