/// Grayscale display mapping, described by window (display range width) and
/// level (display range center).
///
/// Read-only once built; make a new instance to change the mapping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WindowLevel {
    window: f32,
    level: f32,
}

impl WindowLevel {
    /// Builds a window/level mapping.
    ///
    /// Returns `None` unless `window` is positive and both values are finite.
    pub fn new(window: f32, level: f32) -> Option<WindowLevel> {
        if window.is_finite() && level.is_finite() && window > 0.0 {
            Some(Self { window, level })
        } else {
            None
        }
    }

    /// The mapping the inner-ear scans are displayed with: window 1000, level 500.
    #[inline]
    pub const fn scan_default() -> WindowLevel {
        Self {
            window: 1000.0,
            level: 500.0,
        }
    }

    #[inline]
    pub fn window(&self) -> f32 {
        self.window
    }

    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Intensity mapped to black.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.level - self.window / 2.0
    }

    /// Intensity mapped to white.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.level + self.window / 2.0
    }

    /// Gray value (0..=255) for intensity `value`. NaN maps to black.
    pub fn eval(&self, value: f32) -> u8 {
        if value.is_nan() {
            return u8::MIN;
        }
        let lb = self.lower_bound();
        if value <= lb {
            u8::MIN
        } else if value >= self.upper_bound() {
            u8::MAX
        } else {
            // 255, not 256.
            (((value - lb) / self.window) * 255.0) as u8
        }
    }
}

impl Default for WindowLevel {
    fn default() -> Self {
        Self::scan_default()
    }
}

#[cfg(test)]
mod tests {
    use super::WindowLevel;

    #[test]
    fn test_invalid_window() {
        assert!(WindowLevel::new(0.0, 500.0).is_none());
        assert!(WindowLevel::new(-10.0, 500.0).is_none());
        assert!(WindowLevel::new(f32::NAN, 500.0).is_none());
        assert!(WindowLevel::new(1000.0, f32::INFINITY).is_none());
    }

    #[test]
    fn test_scan_default_bounds() {
        let wl = WindowLevel::scan_default();
        assert_eq!(wl.lower_bound(), 0.0);
        assert_eq!(wl.upper_bound(), 1000.0);

        assert_eq!(wl.eval(-200.0), 0);
        assert_eq!(wl.eval(0.0), 0);
        assert_eq!(wl.eval(250.0), (255.0 * 0.25) as u8);
        assert_eq!(wl.eval(500.0), (255.0 * 0.5) as u8);
        assert_eq!(wl.eval(999.9), 254);
        assert_eq!(wl.eval(1000.0), 255);
        assert_eq!(wl.eval(4000.0), 255);
        assert_eq!(wl.eval(f32::NAN), 0);
    }
}
