//! End-to-end checks driving the public API the way a host would.

use chip8vm::machine::FONT;
use chip8vm::{Interpreter, Machine, SCREEN_WIDTH};

#[test]
fn draws_a_font_glyph_loaded_as_a_program() {
    let program = [
        0x60, 0x00, // V0 = 0
        0x61, 0x00, // V1 = 0
        0xF0, 0x29, // I = glyph for V0
        0xD0, 0x15, // draw 8x5 sprite at (V0, V1)
    ];

    let mut machine = Machine::new();
    machine.load_program(&program).unwrap();
    let mut interpreter = Interpreter::new();

    for _ in 0..4 {
        interpreter.step(&mut machine).unwrap();
    }

    // the top-left corner now shows the '0' glyph, bit for bit
    for row in 0..5 {
        for col in 0..8 {
            let expected = (FONT[row] >> (7 - col)) & 1;
            assert_eq!(
                machine.display[row * SCREEN_WIDTH + col],
                expected,
                "pixel ({}, {})",
                col,
                row
            );
        }
    }
    assert_eq!(machine.v[0xF], 0);
    assert!(machine.draw_flag);
    assert_eq!(machine.pc, 0x208);
}

#[test]
fn subroutine_program_accumulates_and_halts() {
    let program = [
        0x60, 0x05, // 0x200: V0 = 5
        0x22, 0x08, // 0x202: call 0x208
        0x70, 0x01, // 0x204: V0 += 1
        0x12, 0x06, // 0x206: jump 0x206 (halt loop)
        0x70, 0x03, // 0x208: V0 += 3
        0x00, 0xEE, // 0x20A: return
    ];

    let mut machine = Machine::new();
    machine.load_program(&program).unwrap();
    let mut interpreter = Interpreter::new();

    for _ in 0..6 {
        interpreter.step(&mut machine).unwrap();
    }

    assert_eq!(machine.v[0], 9);
    assert_eq!(machine.sp, 0);
    assert_eq!(machine.pc, 0x206);

    // the halt loop is stable
    interpreter.step(&mut machine).unwrap();
    assert_eq!(machine.pc, 0x206);
}
