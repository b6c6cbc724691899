//! Named colours used for surfaces and the scene background.

/// An sRGB colour with the name it is known by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb: [u8; 3],
}

impl NamedColor {
    pub const fn new(name: &'static str, rgb: [u8; 3]) -> Self {
        Self { name, rgb }
    }

    /// Components scaled to `0.0..=1.0`.
    pub fn to_f32(self) -> [f32; 3] {
        self.rgb.map(|c| c as f32 / 255.0)
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b] = self.rgb.map(|c| c as f64 / 255.0);
        wgpu::Color { r, g, b, a: 1.0 }
    }
}

pub const TOMATO: NamedColor = NamedColor::new("Tomato", [255, 99, 71]);
pub const BANANA: NamedColor = NamedColor::new("Banana", [227, 207, 87]);
pub const MINT: NamedColor = NamedColor::new("Mint", [189, 252, 201]);
pub const PEACOCK: NamedColor = NamedColor::new("Peacock", [51, 161, 201]);
pub const SALMON: NamedColor = NamedColor::new("Salmon", [250, 128, 114]);
pub const LAVENDER: NamedColor = NamedColor::new("Lavender", [230, 230, 250]);
pub const WHEAT: NamedColor = NamedColor::new("Wheat", [245, 222, 179]);
pub const CYAN: NamedColor = NamedColor::new("Cyan", [0, 255, 255]);
pub const PINK: NamedColor = NamedColor::new("Pink", [255, 192, 203]);
pub const LIME_GREEN: NamedColor = NamedColor::new("LimeGreen", [50, 205, 50]);

pub const SLATE_GRAY: NamedColor = NamedColor::new("SlateGray", [112, 128, 144]);

/// Surface colours, handed out in load order
pub const PALETTE: [NamedColor; 10] = [
    TOMATO, BANANA, MINT, PEACOCK, SALMON, LAVENDER, WHEAT, CYAN, PINK, LIME_GREEN,
];

/// Scene background
pub const BACKGROUND: NamedColor = SLATE_GRAY;

/// Colour of the `index`-th surface; wraps after ten.
pub fn palette_color(index: usize) -> NamedColor {
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles_every_ten() {
        assert_eq!(palette_color(0).name, "Tomato");
        assert_eq!(palette_color(1).name, "Banana");
        assert_eq!(palette_color(9).name, "LimeGreen");
        for i in 0..35 {
            assert_eq!(palette_color(i), PALETTE[i % 10]);
        }
    }

    #[test]
    fn test_to_f32() {
        assert_eq!(CYAN.to_f32(), [0.0, 1.0, 1.0]);
        assert_eq!(BACKGROUND.name, "SlateGray");
    }
}
