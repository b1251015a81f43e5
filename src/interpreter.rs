//! The fetch-decode-execute engine.
//!
//! [`Interpreter::step`] runs exactly one cycle against a [`Machine`] and
//! never blocks; the wait-for-key instruction parks the machine via
//! [`Machine::waiting_for_key`] and resolves on a later step. Unknown
//! opcodes are reported, not fatal.

use rand::prelude::*;

use crate::instruction::Instruction;
use crate::machine::{Machine, FONT_ADDRESS, RAM_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH, STACK_SIZE};
use crate::Error;

// RAM_SIZE is a power of two; masking keeps every memory access inside the
// 12-bit address space.
const ADDR_MASK: usize = RAM_SIZE - 1;

pub struct Interpreter {
    rng: ThreadRng,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Runs one fetch-decode-execute cycle.
    ///
    /// An unrecognized word is reported as [`Error::UnknownOpcode`] with the
    /// program counter already past it, so callers may log it and keep
    /// stepping.
    pub fn step(&mut self, m: &mut Machine) -> Result<(), Error> {
        // A parked wait-for-key resolves here instead of fetching.
        if let Some(x) = m.waiting_for_key {
            if let Some(key) = m.keypad.iter().position(|&down| down) {
                m.v[x as usize] = key as u8;
                m.waiting_for_key = None;
            }
            return Ok(());
        }

        let pc = m.pc as usize & ADDR_MASK;
        let word = (m.memory[pc] as u16) << 8 | m.memory[(pc + 1) & ADDR_MASK] as u16;
        // Advance past the word now so jumps and calls below are not
        // clobbered by a post-increment.
        m.pc = m.pc.wrapping_add(2);

        match Instruction::decode(word) {
            Some(instruction) => {
                self.execute(m, instruction);
                Ok(())
            }
            None => Err(Error::UnknownOpcode { opcode: word }),
        }
    }

    fn execute(&mut self, m: &mut Machine, instruction: Instruction) {
        match instruction {
            Instruction::Cls => {
                m.display = [0; SCREEN_WIDTH * SCREEN_HEIGHT];
                m.draw_flag = true;
            }
            Instruction::Ret => {
                // returning with an empty stack is ignored, not an underflow
                if m.sp > 0 {
                    m.sp -= 1;
                    m.pc = m.stack[m.sp as usize];
                }
            }
            Instruction::Jp(addr) => m.pc = addr,
            Instruction::Call(addr) => {
                // calls past the 16-level limit are dropped
                if (m.sp as usize) < STACK_SIZE {
                    m.stack[m.sp as usize] = m.pc;
                    m.sp += 1;
                    m.pc = addr;
                }
            }
            Instruction::SeByte(x, byte) => {
                if m.v[x as usize] == byte {
                    m.pc = m.pc.wrapping_add(2);
                }
            }
            Instruction::SneByte(x, byte) => {
                if m.v[x as usize] != byte {
                    m.pc = m.pc.wrapping_add(2);
                }
            }
            Instruction::SeReg(x, y) => {
                if m.v[x as usize] == m.v[y as usize] {
                    m.pc = m.pc.wrapping_add(2);
                }
            }
            Instruction::LdByte(x, byte) => m.v[x as usize] = byte,
            Instruction::AddByte(x, byte) => {
                m.v[x as usize] = m.v[x as usize].wrapping_add(byte);
            }
            Instruction::LdReg(x, y) => m.v[x as usize] = m.v[y as usize],
            Instruction::Or(x, y) => m.v[x as usize] |= m.v[y as usize],
            Instruction::And(x, y) => m.v[x as usize] &= m.v[y as usize],
            Instruction::Xor(x, y) => m.v[x as usize] ^= m.v[y as usize],
            // The flag is written after the result for the 8-series ALU ops,
            // so VF-as-operand reads happen first and the flag wins when
            // X or Y is F.
            Instruction::AddReg(x, y) => {
                let (result, carry) = m.v[x as usize].overflowing_add(m.v[y as usize]);
                m.v[x as usize] = result;
                m.v[0xF] = carry as u8;
            }
            Instruction::Sub(x, y) => {
                let (result, borrow) = m.v[x as usize].overflowing_sub(m.v[y as usize]);
                m.v[x as usize] = result;
                m.v[0xF] = !borrow as u8;
            }
            Instruction::Shr(x) => {
                let bit = m.v[x as usize] & 0x1;
                m.v[x as usize] >>= 1;
                m.v[0xF] = bit;
            }
            Instruction::Subn(x, y) => {
                let (result, borrow) = m.v[y as usize].overflowing_sub(m.v[x as usize]);
                m.v[x as usize] = result;
                m.v[0xF] = !borrow as u8;
            }
            Instruction::Shl(x) => {
                let bit = m.v[x as usize] >> 7;
                m.v[x as usize] <<= 1;
                m.v[0xF] = bit;
            }
            Instruction::SneReg(x, y) => {
                if m.v[x as usize] != m.v[y as usize] {
                    m.pc = m.pc.wrapping_add(2);
                }
            }
            Instruction::LdI(addr) => m.i = addr,
            Instruction::JpV0(addr) => m.pc = addr.wrapping_add(m.v[0] as u16),
            Instruction::Rnd(x, byte) => m.v[x as usize] = self.rng.gen::<u8>() & byte,
            Instruction::Drw(x, y, height) => self.draw_sprite(m, x, y, height),
            Instruction::Skp(x) => {
                if m.keypad[(m.v[x as usize] & 0xF) as usize] {
                    m.pc = m.pc.wrapping_add(2);
                }
            }
            Instruction::Sknp(x) => {
                if !m.keypad[(m.v[x as usize] & 0xF) as usize] {
                    m.pc = m.pc.wrapping_add(2);
                }
            }
            Instruction::LdDelay(x) => m.v[x as usize] = m.delay_timer,
            Instruction::WaitKey(x) => m.waiting_for_key = Some(x),
            Instruction::SetDelay(x) => m.delay_timer = m.v[x as usize],
            Instruction::SetSound(x) => m.sound_timer = m.v[x as usize],
            Instruction::AddI(x) => m.i = m.i.wrapping_add(m.v[x as usize] as u16),
            Instruction::LdFont(x) => {
                let glyph = (m.v[x as usize] & 0xF) as u16;
                m.i = FONT_ADDRESS as u16 + glyph * 5;
            }
            Instruction::Bcd(x) => {
                let value = m.v[x as usize];
                let i = m.i as usize;
                m.memory[i & ADDR_MASK] = value / 100;
                m.memory[(i + 1) & ADDR_MASK] = value / 10 % 10;
                m.memory[(i + 2) & ADDR_MASK] = value % 10;
            }
            Instruction::Store(x) => {
                let i = m.i as usize;
                for offset in 0..=x as usize {
                    m.memory[(i + offset) & ADDR_MASK] = m.v[offset];
                }
            }
            Instruction::Load(x) => {
                let i = m.i as usize;
                for offset in 0..=x as usize {
                    m.v[offset] = m.memory[(i + offset) & ADDR_MASK];
                }
            }
        }
    }

    /// DXYN. Start coordinates wrap once; pixels past the screen edge are
    /// clipped, not wrapped. VF reports whether any lit pixel was toggled
    /// off and stays set for the rest of the draw.
    fn draw_sprite(&mut self, m: &mut Machine, x: u8, y: u8, height: u8) {
        let start_x = m.v[x as usize] as usize % SCREEN_WIDTH;
        let start_y = m.v[y as usize] as usize % SCREEN_HEIGHT;

        m.v[0xF] = 0;
        for row in 0..height as usize {
            let sprite = m.memory[(m.i as usize + row) & ADDR_MASK];
            for col in 0..8 {
                if sprite & (0x80 >> col) == 0 {
                    continue;
                }
                let px = start_x + col;
                let py = start_y + row;
                if px >= SCREEN_WIDTH || py >= SCREEN_HEIGHT {
                    continue;
                }
                let cell = &mut m.display[py * SCREEN_WIDTH + px];
                if *cell == 1 {
                    m.v[0xF] = 1;
                }
                *cell ^= 1;
            }
        }

        m.draw_flag = true;
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
