use std::env;
use std::fs;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use log::{debug, warn};
use sdl2::audio::{AudioCallback, AudioSpecDesired};
use sdl2::event::Event;
use sdl2::gfx::primitives::DrawRenderer;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels::Color;

use chip8vm::{Interpreter, Machine, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Each CHIP-8 pixel becomes a square this many window pixels wide.
const SCALE_FACTOR: u32 = 15;

/// Engine steps per 60Hz video frame, approximating the original ~600Hz
/// instruction rate.
const CYCLES_PER_FRAME: u32 = 10;

/// Keypad mapping, index = CHIP-8 key:
///
/// ```text
/// 1 2 3 C        1 2 3 4
/// 4 5 6 D   ->   Q W E R
/// 7 8 9 E        A S D F
/// A 0 B F        Z X C V
/// ```
const KEYMAP: [Scancode; 16] = [
    Scancode::X,    // 0
    Scancode::Num1, // 1
    Scancode::Num2, // 2
    Scancode::Num3, // 3
    Scancode::Q,    // 4
    Scancode::W,    // 5
    Scancode::E,    // 6
    Scancode::A,    // 7
    Scancode::S,    // 8
    Scancode::D,    // 9
    Scancode::Z,    // A
    Scancode::C,    // B
    Scancode::Num4, // C
    Scancode::R,    // D
    Scancode::F,    // E
    Scancode::V,    // F
];

struct SquareWave {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = if self.phase <= 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let rom_path = match env::args().nth(1) {
        Some(path) => path,
        None => bail!("usage: chip8vm <rom>"),
    };
    let rom = fs::read(&rom_path).with_context(|| format!("could not read {}", rom_path))?;

    let mut machine = Machine::new();
    machine.load_program(&rom)?;
    let mut interpreter = Interpreter::new();

    let sdl_ctx = sdl2::init().map_err(anyhow::Error::msg)?;
    let video = sdl_ctx.video().map_err(anyhow::Error::msg)?;

    let window = video
        .window(
            "CHIP-8",
            SCREEN_WIDTH as u32 * SCALE_FACTOR,
            SCREEN_HEIGHT as u32 * SCALE_FACTOR,
        )
        .position_centered()
        .build()?;
    let mut canvas = window.into_canvas().build()?;
    canvas
        .set_scale(SCALE_FACTOR as f32, SCALE_FACTOR as f32)
        .map_err(anyhow::Error::msg)?;

    let black = Color::RGB(0, 0, 0);
    let white = Color::RGB(255, 255, 255);
    canvas.set_draw_color(black);
    canvas.clear();
    canvas.present();

    // 440Hz tone, played while the sound timer runs down
    let audio = sdl_ctx.audio().map_err(anyhow::Error::msg)?;
    let desired = AudioSpecDesired {
        freq: Some(44_100),
        channels: Some(1),
        samples: None,
    };
    let beeper = audio
        .open_playback(None, &desired, |spec| SquareWave {
            phase_inc: 440.0 / spec.freq as f32,
            phase: 0.0,
            volume: 0.15,
        })
        .map_err(anyhow::Error::msg)?;

    let mut event_pump = sdl_ctx.event_pump().map_err(anyhow::Error::msg)?;
    let frame = Duration::from_millis(16);
    let mut paused = false;

    'main: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main,
                Event::KeyDown {
                    keycode: Some(Keycode::P),
                    repeat: false,
                    ..
                } => paused = !paused,
                Event::KeyDown {
                    keycode: Some(Keycode::S),
                    repeat: false,
                    ..
                } if paused => {
                    if let Err(e) = interpreter.step(&mut machine) {
                        warn!("{}", e);
                    }
                    debug!(
                        "pc={:#06X} i={:#06X} sp={} v0={:02X} v1={:02X} v2={:02X} v3={:02X}",
                        machine.pc,
                        machine.i,
                        machine.sp,
                        machine.v[0],
                        machine.v[1],
                        machine.v[2],
                        machine.v[3]
                    );
                }
                _ => {}
            }
        }

        let keyboard = event_pump.keyboard_state();
        for (key, scancode) in KEYMAP.iter().enumerate() {
            machine.keypad[key] = keyboard.is_scancode_pressed(*scancode);
        }

        if !paused {
            for _ in 0..CYCLES_PER_FRAME {
                if let Err(e) = interpreter.step(&mut machine) {
                    warn!("{}", e);
                }
            }
        }

        machine.tick_timers();

        if machine.sound_timer > 0 {
            beeper.resume();
        } else {
            beeper.pause();
        }

        if machine.draw_flag {
            machine.draw_flag = false;
            canvas.set_draw_color(black);
            canvas.clear();
            for (idx, pixel) in machine.display.iter().enumerate() {
                if *pixel == 0 {
                    continue;
                }
                let x = (idx % SCREEN_WIDTH) as i16;
                let y = (idx / SCREEN_WIDTH) as i16;
                canvas.pixel(x, y, white).map_err(anyhow::Error::msg)?;
            }
            canvas.present();
        }

        thread::sleep(frame);
    }

    Ok(())
}
