//! CHIP-8 machine state: a plain data container with defined initial values.
//!
//! All behavior beyond initialization, program loading, and the 60Hz timer
//! decrement lives in the [interpreter](crate::interpreter).

use crate::Error;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const RAM_SIZE: usize = 4096;
pub const NUM_REGISTERS: usize = 16;
pub const STACK_SIZE: usize = 16;
pub const NUM_KEYS: usize = 16;

/// Programs start here; the first 512 bytes belonged to the interpreter on
/// the original machines.
pub const START_ADDRESS: u16 = 0x200;

/// Where the hexadecimal glyphs live. Some ROMs depend on this address.
pub const FONT_ADDRESS: usize = 0x50;

/// Largest loadable program: everything above the interpreter area.
pub const MAX_PROGRAM_SIZE: usize = RAM_SIZE - START_ADDRESS as usize;

/// The hexadecimal character sprites (0-F), five bytes per glyph.
/// Each byte is one row of 8 pixels, e.g. the '0':
/// 0xF0 -> 1111....
/// 0x90 -> 1..1....
/// 0x90 -> 1..1....
/// 0x90 -> 1..1....
/// 0xF0 -> 1111....
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// The complete state of one CHIP-8 machine.
///
/// Every field is public: the host reads the display and sound timer and
/// writes the keypad between engine calls. `VF` (`v[0xF]`) is stored like
/// any other register; the arithmetic, shift, and draw instructions
/// overwrite it with their flag output.
#[derive(Clone)]
pub struct Machine {
    pub memory: [u8; RAM_SIZE],
    pub v: [u8; NUM_REGISTERS],
    /// Index register; only the low 12 bits address memory.
    pub i: u16,
    /// Always points at the next instruction to fetch.
    pub pc: u16,
    pub stack: [u16; STACK_SIZE],
    /// Index of the next free stack slot; 0 when the stack is empty.
    pub sp: u8,
    /// Row-major 64x32 buffer, one byte per pixel, 0 or 1.
    pub display: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    /// Host-written key states for the hexadecimal keypad.
    pub keypad: [bool; NUM_KEYS],
    pub delay_timer: u8,
    pub sound_timer: u8,
    /// Set whenever an instruction mutates the display; the host clears it
    /// after rendering.
    pub draw_flag: bool,
    /// Register index parked by the wait-for-key instruction, resolved on
    /// the next step that sees a pressed key.
    pub waiting_for_key: Option<u8>,
}

impl Machine {
    pub fn new() -> Self {
        let mut machine = Self {
            memory: [0; RAM_SIZE],
            v: [0; NUM_REGISTERS],
            i: 0,
            pc: START_ADDRESS,
            stack: [0; STACK_SIZE],
            sp: 0,
            display: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            keypad: [false; NUM_KEYS],
            delay_timer: 0,
            sound_timer: 0,
            draw_flag: false,
            waiting_for_key: None,
        };
        machine.reset();
        machine
    }

    /// Returns the machine to its power-on state: everything zeroed, the
    /// program counter at the program start, and the font copied into the
    /// interpreter area.
    pub fn reset(&mut self) {
        self.memory = [0; RAM_SIZE];
        self.v = [0; NUM_REGISTERS];
        self.i = 0;
        self.pc = START_ADDRESS;
        self.stack = [0; STACK_SIZE];
        self.sp = 0;
        self.display = [0; SCREEN_WIDTH * SCREEN_HEIGHT];
        self.keypad = [false; NUM_KEYS];
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.draw_flag = false;
        self.waiting_for_key = None;

        self.memory[FONT_ADDRESS..FONT_ADDRESS + FONT.len()].copy_from_slice(&FONT);
    }

    /// Copies a program verbatim to the start address. No other field is
    /// touched; call [`reset`](Self::reset) first for a clean load.
    pub fn load_program(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.len() > MAX_PROGRAM_SIZE {
            return Err(Error::ProgramTooLarge {
                size: bytes.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let start = START_ADDRESS as usize;
        self.memory[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// One 60Hz tick: each nonzero timer counts down by 1. The host is
    /// responsible for calling this at a steady 60Hz.
    pub fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            self.sound_timer -= 1;
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
