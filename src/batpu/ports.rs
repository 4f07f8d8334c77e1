//! Memory-mapped peripherals at addresses 240..=255.
//!
//! Each address owns one [`Port`] handler. The memory bus consults the
//! registry once per access, so the CPU core never branches on peripherals.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const PORT_BASE: u8 = 240;
pub const SCREEN_SIZE: usize = 32;

pub type Screen = [[bool; SCREEN_SIZE]; SCREEN_SIZE];

/// Peripheral state driven by port accesses.
#[derive(Debug, Clone)]
pub struct Peripherals {
    pub pixel_x: u8,
    pub pixel_y: u8,
    draw: Screen,
    visible: Screen,
    pending_chars: String,
    chars: String,
    number: Option<u8>,
    pub signed_mode: bool,
    /// Latest controller sample. Set from outside, survives reset.
    pub controller: u8,
    seed: Option<u64>,
    rng: StdRng,
}

impl Peripherals {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            pixel_x: 0,
            pixel_y: 0,
            draw: [[false; SCREEN_SIZE]; SCREEN_SIZE],
            visible: [[false; SCREEN_SIZE]; SCREEN_SIZE],
            pending_chars: String::new(),
            chars: String::new(),
            number: None,
            signed_mode: false,
            controller: 0,
            seed,
            rng: make_rng(seed),
        }
    }

    /// Clears every peripheral except the controller sample and re-seeds the RNG.
    pub fn reset(&mut self) {
        let controller = self.controller;
        *self = Peripherals::new(self.seed);
        self.controller = controller;
    }

    /// Only the visible half of the double buffer is exposed.
    pub fn screen(&self) -> &Screen {
        &self.visible
    }

    pub fn char_buffer(&self) -> &str {
        &self.chars
    }

    pub fn pending_chars(&self) -> &str {
        &self.pending_chars
    }

    /// Number display value, interpreted through the current signed mode.
    pub fn number_display(&self) -> Option<i16> {
        self.number.map(|raw| {
            if self.signed_mode {
                raw as i8 as i16
            } else {
                raw as i16
            }
        })
    }

    fn cursor(&self) -> (usize, usize) {
        (
            self.pixel_x as usize % SCREEN_SIZE,
            self.pixel_y as usize % SCREEN_SIZE,
        )
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Character set of the text display.
pub fn decode_char(value: u8) -> char {
    const TABLE: &[u8; 30] = b" abcdefghijklmnopqrstuvwxyz.!?";
    match value {
        0..=29 => TABLE[value as usize] as char,
        32..=126 => value as char,
        _ => '?',
    }
}

/// Read/write policy of one port address.
pub trait Port: Sync {
    fn name(&self) -> &'static str;

    fn on_write(&self, _io: &mut Peripherals, _value: u8) {}

    /// `Some` overrides the byte stored in the memory cell.
    fn on_read(&self, _io: &mut Peripherals) -> Option<u8> {
        None
    }
}

struct PixelX;
struct PixelY;
struct DrawPixel;
struct ClearPixel;
struct LoadPixel;
struct BufferScreen;
struct ClearScreenBuffer;
struct WriteChar;
struct BufferChars;
struct ClearCharsBuffer;
struct ShowNumber;
struct ClearNumber;
struct SignedMode;
struct UnsignedMode;
struct RngPort;
struct ControllerInput;

impl Port for PixelX {
    fn name(&self) -> &'static str { "pixel_x" }
    fn on_write(&self, io: &mut Peripherals, value: u8) {
        io.pixel_x = value % SCREEN_SIZE as u8;
    }
}

impl Port for PixelY {
    fn name(&self) -> &'static str { "pixel_y" }
    fn on_write(&self, io: &mut Peripherals, value: u8) {
        io.pixel_y = value % SCREEN_SIZE as u8;
    }
}

impl Port for DrawPixel {
    fn name(&self) -> &'static str { "draw_pixel" }
    fn on_write(&self, io: &mut Peripherals, value: u8) {
        let (x, y) = io.cursor();
        io.draw[y][x] = value != 0;
    }
}

impl Port for ClearPixel {
    fn name(&self) -> &'static str { "clear_pixel" }
    fn on_write(&self, io: &mut Peripherals, _value: u8) {
        let (x, y) = io.cursor();
        io.draw[y][x] = false;
    }
}

impl Port for LoadPixel {
    fn name(&self) -> &'static str { "load_pixel" }
    fn on_read(&self, io: &mut Peripherals) -> Option<u8> {
        let (x, y) = io.cursor();
        Some(io.draw[y][x] as u8)
    }
}

impl Port for BufferScreen {
    fn name(&self) -> &'static str { "buffer_screen" }
    fn on_write(&self, io: &mut Peripherals, _value: u8) {
        io.visible = io.draw;
    }
}

impl Port for ClearScreenBuffer {
    fn name(&self) -> &'static str { "clear_screen_buffer" }
    fn on_write(&self, io: &mut Peripherals, _value: u8) {
        io.draw = [[false; SCREEN_SIZE]; SCREEN_SIZE];
    }
}

impl Port for WriteChar {
    fn name(&self) -> &'static str { "write_char" }
    fn on_write(&self, io: &mut Peripherals, value: u8) {
        io.pending_chars.push(decode_char(value));
    }
}

impl Port for BufferChars {
    fn name(&self) -> &'static str { "buffer_chars" }
    fn on_write(&self, io: &mut Peripherals, _value: u8) {
        let pending = std::mem::take(&mut io.pending_chars);
        io.chars.push_str(&pending);
    }
}

impl Port for ClearCharsBuffer {
    fn name(&self) -> &'static str { "clear_chars_buffer" }
    fn on_write(&self, io: &mut Peripherals, _value: u8) {
        io.pending_chars.clear();
        io.chars.clear();
    }
}

impl Port for ShowNumber {
    fn name(&self) -> &'static str { "show_number" }
    fn on_write(&self, io: &mut Peripherals, value: u8) {
        io.number = Some(value);
    }
}

impl Port for ClearNumber {
    fn name(&self) -> &'static str { "clear_number" }
    fn on_write(&self, io: &mut Peripherals, _value: u8) {
        io.number = None;
    }
}

impl Port for SignedMode {
    fn name(&self) -> &'static str { "signed_mode" }
    fn on_write(&self, io: &mut Peripherals, _value: u8) {
        io.signed_mode = true;
    }
}

impl Port for UnsignedMode {
    fn name(&self) -> &'static str { "unsigned_mode" }
    fn on_write(&self, io: &mut Peripherals, _value: u8) {
        io.signed_mode = false;
    }
}

impl Port for RngPort {
    fn name(&self) -> &'static str { "rng" }
    fn on_read(&self, io: &mut Peripherals) -> Option<u8> {
        Some(io.rng.r#gen::<u8>())
    }
}

impl Port for ControllerInput {
    fn name(&self) -> &'static str { "controller_input" }
    fn on_read(&self, io: &mut Peripherals) -> Option<u8> {
        Some(io.controller)
    }
}

static PORTS: [&dyn Port; 16] = [
    &PixelX,
    &PixelY,
    &DrawPixel,
    &ClearPixel,
    &LoadPixel,
    &BufferScreen,
    &ClearScreenBuffer,
    &WriteChar,
    &BufferChars,
    &ClearCharsBuffer,
    &ShowNumber,
    &ClearNumber,
    &SignedMode,
    &UnsignedMode,
    &RngPort,
    &ControllerInput,
];

/// Handler for `addr`, or `None` for plain RAM.
pub fn port(addr: u8) -> Option<&'static dyn Port> {
    addr.checked_sub(PORT_BASE).map(|i| PORTS[i as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(io: &mut Peripherals, addr: u8, v: u8) {
        port(addr).unwrap().on_write(io, v);
    }

    fn read(io: &mut Peripherals, addr: u8) -> Option<u8> {
        port(addr).unwrap().on_read(io)
    }

    #[test]
    fn registry_covers_the_port_range_only() {
        assert!(port(239).is_none());
        assert_eq!(port(240).map(|p| p.name()), Some("pixel_x"));
        assert_eq!(port(247).map(|p| p.name()), Some("write_char"));
        assert_eq!(port(255).map(|p| p.name()), Some("controller_input"));
    }

    #[test]
    fn pixels_stay_hidden_until_buffered() {
        let mut io = Peripherals::new(Some(1));
        write(&mut io, 240, 3);
        write(&mut io, 241, 4);
        write(&mut io, 242, 1);
        assert!(!io.screen()[4][3]);
        assert_eq!(read(&mut io, 244), Some(1));
        write(&mut io, 245, 0);
        assert!(io.screen()[4][3]);

        write(&mut io, 243, 0);
        write(&mut io, 245, 0);
        assert!(!io.screen()[4][3]);
    }

    #[test]
    fn draw_pixel_with_zero_value_clears() {
        let mut io = Peripherals::new(Some(1));
        write(&mut io, 242, 1);
        write(&mut io, 242, 0);
        assert_eq!(read(&mut io, 244), Some(0));
    }

    #[test]
    fn clear_screen_buffer_leaves_visible_frame() {
        let mut io = Peripherals::new(Some(1));
        write(&mut io, 242, 1);
        write(&mut io, 245, 0);
        write(&mut io, 246, 0);
        assert!(io.screen()[0][0]);
        write(&mut io, 245, 0);
        assert!(!io.screen()[0][0]);
    }

    #[test]
    fn chars_flush_from_pending_queue() {
        let mut io = Peripherals::new(Some(1));
        for v in [8, 9, 28] {
            write(&mut io, 247, v);
        }
        assert_eq!(io.char_buffer(), "");
        assert_eq!(io.pending_chars(), "hi!");
        write(&mut io, 248, 0);
        assert_eq!(io.char_buffer(), "hi!");
        assert_eq!(io.pending_chars(), "");
        write(&mut io, 249, 0);
        assert_eq!(io.char_buffer(), "");
    }

    #[test]
    fn char_table() {
        assert_eq!(decode_char(0), ' ');
        assert_eq!(decode_char(1), 'a');
        assert_eq!(decode_char(26), 'z');
        assert_eq!(decode_char(29), '?');
        assert_eq!(decode_char(65), 'A');
        assert_eq!(decode_char(200), '?');
    }

    #[test]
    fn number_display_follows_signed_mode() {
        let mut io = Peripherals::new(Some(1));
        assert_eq!(io.number_display(), None);
        write(&mut io, 250, 200);
        assert_eq!(io.number_display(), Some(200));
        write(&mut io, 252, 0);
        assert_eq!(io.number_display(), Some(-56));
        write(&mut io, 253, 0);
        write(&mut io, 251, 0);
        assert_eq!(io.number_display(), None);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = Peripherals::new(Some(42));
        let mut b = Peripherals::new(Some(42));
        let xs: Vec<_> = (0..8).map(|_| read(&mut a, 254)).collect();
        let ys: Vec<_> = (0..8).map(|_| read(&mut b, 254)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn reset_keeps_controller_sample() {
        let mut io = Peripherals::new(None);
        io.controller = 0b1010;
        write(&mut io, 250, 7);
        io.reset();
        assert_eq!(io.number_display(), None);
        assert_eq!(read(&mut io, 255), Some(0b1010));
    }
}
