//! Page drawing in millimetres from the top-left corner, written to a
//! pdf-writer content stream in points from the bottom-left.

use pdf_writer::{Content, Name, Str};

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Resource name of the header logo on every page.
pub const LOGO: Name<'static> = Name(b"Im1");

pub type Rgb = (u8, u8, u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    pub fn resource(self) -> Name<'static> {
        match self {
            Self::Regular => Name(b"F1"),
            Self::Bold => Name(b"F2"),
        }
    }

    pub fn base_font(self) -> Name<'static> {
        match self {
            Self::Regular => Name(b"Helvetica"),
            Self::Bold => Name(b"Helvetica-Bold"),
        }
    }
}

pub struct Canvas {
    height_mm: f32,
    content: Content,
}

impl Canvas {
    pub fn new(height_mm: f32) -> Self {
        Self {
            height_mm,
            content: Content::new(),
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Rgb) {
        self.set_fill(fill);
        self.content
            .rect(pt(x), pt(self.height_mm - y - h), pt(w), pt(h));
        self.content.fill_nonzero();
    }

    /// Draw `text` with its baseline at `y`.
    pub fn text(&mut self, x: f32, y: f32, font: Font, size: f32, fill: Rgb, text: &str) {
        self.set_fill(fill);
        self.content.begin_text();
        self.content.set_font(font.resource(), size);
        self.content.next_line(pt(x), pt(self.height_mm - y));
        self.content.show(Str(&encode_win_ansi(text)));
        self.content.end_text();
    }

    /// Place the logo XObject in the box at `x, y`.
    pub fn logo(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.content.save_state();
        self.content.transform([
            pt(w),
            0.0,
            0.0,
            pt(h),
            pt(x),
            pt(self.height_mm - y - h),
        ]);
        self.content.x_object(LOGO);
        self.content.restore_state();
    }

    pub fn finish(self) -> Vec<u8> {
        self.content.finish()
    }

    fn set_fill(&mut self, (r, g, b): Rgb) {
        self.content.set_fill_rgb(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        );
    }
}

pub fn pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// The standard fonts are declared WinAnsi. Latin-1 maps onto it directly;
/// anything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            n @ (0x20..=0x7E | 0xA0..=0xFF) => n as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    #[test]
    fn millimetres_to_points() {
        assert!((pt(25.4) - 72.0).abs() < 1e-4);
    }

    #[test]
    fn text_uses_font_resource() {
        let mut c = Canvas::new(150.0);
        c.text(10.0, 30.0, Font::Bold, 12.0, (0, 0, 0), "hello");
        let ops = c.finish();
        assert!(contains(&ops, "/F2 12 Tf"));
        assert!(contains(&ops, "(hello) Tj"));
    }

    #[test]
    fn logo_is_drawn_in_its_own_state() {
        let mut c = Canvas::new(150.0);
        c.logo(10.0, 10.0, 25.0, 10.0);
        let ops = c.finish();
        assert!(contains(&ops, "q\n"));
        assert!(contains(&ops, "/Im1 Do"));
        assert!(contains(&ops, "Q"));
    }

    #[test]
    fn text_is_encoded_as_win_ansi() {
        assert_eq!(encode_win_ansi("Conferência"), b"Confer\xEAncia".to_vec());
        assert_eq!(encode_win_ansi("€\n"), b"??".to_vec());
    }
}
