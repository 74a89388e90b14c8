use heapless::String;
use libm::roundf;
use ufmt::{uDisplay, uWrite, uwrite, Formatter};

pub const COLUMNS: usize = 16;
pub const ROWS: u8 = 2;

/// One display row worth of text
pub type Line = String<COLUMNS>;

/// Character display with a cursor. Text is not wrapped, so callers keep
/// every write within the row.
pub trait Display {
    fn clear(&mut self);
    fn set_cursor(&mut self, col: u8, row: u8);
    fn print(&mut self, text: &str);
}

/// Basic function for rendering text onto the LCD
/// It only clears the screen when the top line is written to
/// param line: text to render
/// param top_line: if the top line is to be written to
/// param lcd: LCD instance
pub fn render_screen<D: Display>(line: &str, top_line: bool, lcd: &mut D) {
    if top_line {
        lcd.clear();
        lcd.set_cursor(0, 0);
    } else {
        lcd.set_cursor(0, 1);
    }
    lcd.print(line);
}

/// Renders both rows from scratch
/// param top: text for row 0
/// param bottom: text for row 1
/// param lcd: LCD instance
pub fn render_lines<D: Display>(top: &str, bottom: &str, lcd: &mut D) {
    render_screen(top, true, lcd);
    render_screen(bottom, false, lcd);
}

/// Writes a single masked character for the digit at `position`
pub fn render_mask<D: Display>(position: usize, lcd: &mut D) {
    lcd.set_cursor(position as u8, 1);
    lcd.print("*");
}

/// Formats a line; anything past the display width is dropped
#[macro_export]
macro_rules! lcd_line {
    ($($arg:tt)*) => {{
        let mut line: $crate::rendering::Line = ::heapless::String::new();
        ::ufmt::uwrite!(&mut line, $($arg)*).ok();
        line
    }};
}

/// A float printed with one decimal, since ufmt has no float support.
/// Non-finite values print as `--`.
#[derive(Clone, Copy, Debug)]
pub struct Tenths(pub f32);

impl uDisplay for Tenths {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        if !self.0.is_finite() {
            return f.write_str("--");
        }
        let scaled = roundf(self.0 * 10.0) as i32;
        if scaled < 0 {
            f.write_str("-")?;
        }
        let magnitude = scaled.unsigned_abs();
        uwrite!(f, "{}.{}", magnitude / 10, magnitude % 10)
    }
}
