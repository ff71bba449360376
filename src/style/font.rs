use glam::Vec2;

/// Text measurement supplied by the font collaborator.
pub trait FontMetrics: Send + Sync {
    fn measure(&self, text: &str, font_size: f32) -> Vec2;

    fn line_height(&self, font_size: f32) -> f32 {
        self.measure("", font_size).y
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceFont {
    pub advance: f32,
    pub line_height: f32,
}

impl Default for MonospaceFont {
    fn default() -> Self {
        Self {
            advance: 0.5,
            line_height: 1.25,
        }
    }
}

impl FontMetrics for MonospaceFont {
    fn measure(&self, text: &str, font_size: f32) -> Vec2 {
        let mut widest = 0usize;
        let mut lines = 0usize;
        for line in text.split('\n') {
            widest = widest.max(line.chars().count());
            lines += 1;
        }
        Vec2::new(
            widest as f32 * self.advance * font_size,
            lines.max(1) as f32 * self.line_height * font_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{FontMetrics, MonospaceFont};

    #[test]
    fn measures_widest_line() {
        let font = MonospaceFont {
            advance: 0.5,
            line_height: 1.0,
        };
        let size = font.measure("abcd\nab", 10.0);
        assert_eq!(size.x, 20.0);
        assert_eq!(size.y, 20.0);
        assert_eq!(font.line_height(10.0), 10.0);
    }
}
