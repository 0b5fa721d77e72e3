//! Normalized pointer → screen pixel mapping.
//!
//! The pointer only has to travel within an "active rectangle" inset from
//! the camera frame edges; that rectangle is stretched to the full screen,
//! then inversion and a sensitivity gain around the screen centre apply.

use crate::tracking::filters::clamp;
use crate::tracking::landmarks::Point2D;

/// Mapping parameters.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    /// Gain around the centre; > 1 reaches the edges with less travel.
    pub sensitivity_x: f64,
    pub sensitivity_y: f64,
    pub invert_x: bool,
    pub invert_y: bool,
    /// Inset of the active rectangle from each frame edge (normalized).
    pub active_margin_x: f64,
    pub active_margin_y: f64,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            screen_width: 1920,
            screen_height: 1080,
            sensitivity_x: 1.05,
            sensitivity_y: 1.0,
            invert_x: false,
            invert_y: false,
            active_margin_x: 0.15,
            active_margin_y: 0.18,
        }
    }
}

/// Active range for one axis; falls back to the full range if the margins
/// would leave nothing.
fn active_range(margin: f64) -> (f64, f64) {
    let (min, max) = (margin, 1.0 - margin);
    if max <= min {
        (0.0, 1.0)
    } else {
        (min, max)
    }
}

/// One axis of the pointer transform.
fn map_axis(value: f64, margin: f64, invert: bool, sensitivity: f64) -> f64 {
    let (min, max) = active_range(margin);
    let mut v = clamp((value - min) / (max - min), 0.0, 1.0);
    if invert {
        v = 1.0 - v;
    }
    clamp(0.5 + (v - 0.5) * sensitivity, 0.0, 1.0)
}

#[derive(Debug, Clone)]
pub struct CursorMapper {
    pub config: MapperConfig,
}

impl CursorMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    /// Apply active-rectangle, inversion, and sensitivity.  Output in [0,1].
    pub fn normalize(&self, pointer: Point2D) -> Point2D {
        let c = &self.config;
        Point2D::new(
            map_axis(pointer.x, c.active_margin_x, c.invert_x, c.sensitivity_x),
            map_axis(pointer.y, c.active_margin_y, c.invert_y, c.sensitivity_y),
        )
    }

    /// Map a normalized pointer coordinate to screen pixels.
    pub fn to_screen(&self, pointer: Point2D) -> (i32, i32) {
        self.pixels(self.normalize(pointer))
    }

    /// Scale an already screen-relative point (e.g. calibrated gaze) to pixels.
    pub fn pixels(&self, unit: Point2D) -> (i32, i32) {
        let x = clamp(unit.x, 0.0, 1.0) * self.config.screen_width as f64;
        let y = clamp(unit.y, 0.0, 1.0) * self.config.screen_height as f64;
        (x as i32, y as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn plain(width: u32, height: u32) -> CursorMapper {
        CursorMapper::new(MapperConfig {
            screen_width: width,
            screen_height: height,
            sensitivity_x: 1.0,
            sensitivity_y: 1.0,
            invert_x: false,
            invert_y: false,
            active_margin_x: 0.25,
            active_margin_y: 0.25,
        })
    }

    #[test]
    fn test_active_rect_stretches_to_screen() {
        let m = plain(1000, 500);
        assert_eq!(m.to_screen(Point2D::new(0.25, 0.25)), (0, 0));
        assert_eq!(m.to_screen(Point2D::new(0.5, 0.5)), (500, 250));
        assert_eq!(m.to_screen(Point2D::new(0.75, 0.75)), (1000, 500));
        // Outside the rectangle clamps to the edge
        assert_eq!(m.to_screen(Point2D::new(0.1, 0.9)), (0, 500));
    }

    #[test]
    fn test_inverted_margins_use_full_range() {
        let mut m = plain(1000, 1000);
        m.config.active_margin_x = 0.6;
        m.config.active_margin_y = 0.5;
        assert_eq!(m.to_screen(Point2D::new(0.25, 0.75)), (250, 750));
    }

    #[test]
    fn test_inversion() {
        let mut m = plain(1000, 1000);
        m.config.invert_x = true;
        assert_eq!(m.to_screen(Point2D::new(0.25, 0.25)), (1000, 0));
        m.config.invert_y = true;
        assert_eq!(m.to_screen(Point2D::new(0.25, 0.25)), (1000, 1000));
    }

    #[test]
    fn test_sensitivity_scales_around_centre() {
        let mut m = plain(1000, 1000);
        m.config.sensitivity_x = 2.0;
        m.config.sensitivity_y = 0.5;
        // 0.375 -> 0.25 in the rect; x: 0.5 + (0.25 - 0.5) * 2 = 0, y: 0.375
        assert_eq!(m.to_screen(Point2D::new(0.375, 0.375)), (0, 375));
        // centre stays put
        assert_eq!(m.to_screen(Point2D::new(0.5, 0.5)), (500, 500));
    }

    #[test]
    fn test_truncates_to_integer() {
        let m = plain(3, 3);
        // 0.5 * 3 = 1.5 -> 1
        assert_eq!(m.to_screen(Point2D::new(0.5, 0.5)), (1, 1));
    }

    #[test]
    fn test_non_finite_input_stays_on_screen() {
        let m = plain(800, 600);
        let (x, y) = m.to_screen(Point2D::new(f64::NAN, f64::INFINITY));
        assert!((0..=800).contains(&x));
        assert!((0..=600).contains(&y));
    }

    #[test]
    fn test_pixels_skips_active_rect() {
        let m = plain(1000, 500);
        assert_eq!(m.pixels(Point2D::new(0.1, 0.2)), (100, 100));
        assert_eq!(m.pixels(Point2D::new(1.5, -0.5)), (1000, 0));
    }

    proptest! {
        #[test]
        fn test_mapped_output_stays_on_screen(
            x in 0.0f64..=1.0,
            y in 0.0f64..=1.0,
            sx in 0.0f64..5.0,
            sy in 0.0f64..5.0,
            mx in -0.5f64..1.0,
            my in -0.5f64..1.0,
            invert_x: bool,
            invert_y: bool,
            width in 1u32..4000,
            height in 1u32..4000,
        ) {
            let m = CursorMapper::new(MapperConfig {
                screen_width: width,
                screen_height: height,
                sensitivity_x: sx,
                sensitivity_y: sy,
                invert_x,
                invert_y,
                active_margin_x: mx,
                active_margin_y: my,
            });
            let (px, py) = m.to_screen(Point2D::new(x, y));
            prop_assert!(px >= 0 && px <= width as i32);
            prop_assert!(py >= 0 && py <= height as i32);
        }
    }
}
