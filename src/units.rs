// Units: millimetre, point and screen-length conversions

pub const MIN_ZOOM: u32 = 1;
pub const MAX_ZOOM: u32 = 50;

/// Screen pixels per millimetre for each zoom percent
pub const ZOOM_MULTIPLIER: f32 = 0.4;

pub const MM_PER_INCH: f32 = 25.4;
pub const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f32);

impl Scale {
    pub const PRINT: Scale = Scale(1.0);

    /// Zoom percentages outside `MIN_ZOOM..=MAX_ZOOM` are clamped.
    pub fn from_zoom(zoom: u32) -> Self {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        Scale(zoom as f32 * ZOOM_MULTIPLIER)
    }

    pub fn units_per_mm(self) -> f32 {
        self.0
    }

    pub fn to_screen(self, mm: f32) -> f32 {
        mm * self.0
    }

    pub fn to_mm(self, length: f32) -> f32 {
        length / self.0
    }

    pub fn point_to_mm(self, x: f32, y: f32) -> (f32, f32) {
        (self.to_mm(x), self.to_mm(y))
    }

    /// Font sizes are points; they scale with the same factor as geometry.
    pub fn font_to_screen(self, points: f32) -> f32 {
        self.to_screen(points_to_mm(points))
    }

    pub fn font_to_pt(self, length: f32) -> f32 {
        mm_to_points(self.to_mm(length))
    }
}

pub fn points_to_mm(points: f32) -> f32 {
    points * MM_PER_INCH / POINTS_PER_INCH
}

pub fn mm_to_points(mm: f32) -> f32 {
    mm * POINTS_PER_INCH / MM_PER_INCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_clamped() {
        assert_eq!(Scale::from_zoom(0), Scale::from_zoom(MIN_ZOOM));
        assert_eq!(Scale::from_zoom(400), Scale::from_zoom(MAX_ZOOM));
    }

    #[test]
    fn screen_and_mm_are_inverse() {
        let scale = Scale::from_zoom(12);
        let mm = 53.98;
        assert!((scale.to_mm(scale.to_screen(mm)) - mm).abs() < 1e-4);
        let (x, y) = scale.point_to_mm(scale.to_screen(10.0), scale.to_screen(4.0));
        assert!((x - 10.0).abs() < 1e-4 && (y - 4.0).abs() < 1e-4);
    }

    #[test]
    fn fonts_scale_with_geometry() {
        let small = Scale::from_zoom(5);
        let large = Scale::from_zoom(10);
        let ratio = large.font_to_screen(7.0) / small.font_to_screen(7.0);
        assert!((ratio - 2.0).abs() < 1e-4);
        assert!((large.font_to_pt(large.font_to_screen(7.0)) - 7.0).abs() < 1e-4);
    }

    #[test]
    fn print_scale_is_millimetres() {
        assert_eq!(Scale::PRINT.to_screen(85.6), 85.6);
        assert!((Scale::PRINT.font_to_screen(72.0) - 25.4).abs() < 1e-4);
    }
}
