//! Layout configuration: every magic constant of slide composition,
//! named once.
//!
//! All lengths are in inches; the PPTX writer converts to EMU at the end.

/// Geometry and typography constants driving slide layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Full slide width.
    pub slide_width: f64,

    /// Full slide height.
    pub slide_height: f64,

    /// Outer margin kept clear on all four slide edges.
    pub margin: f64,

    /// Horizontal gap between adjacent image columns.
    pub column_gap: f64,

    /// Vertical gap between an image and the text below it.
    pub vertical_gap: f64,

    /// Longest single text atom (in characters, inclusive) that still counts
    /// as a short caption when deciding on the column layout.
    pub short_text_limit: usize,

    /// Font size in points for title-style slides.
    pub title_font_pt: u32,

    /// Pixels per inch assumed when converting an image's intrinsic pixel
    /// size to its natural on-slide size.
    pub image_dpi: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            slide_width: 10.0,
            slide_height: 7.5,
            margin: 0.25,
            column_gap: 0.1,
            vertical_gap: 0.1,
            short_text_limit: 75,
            title_font_pt: 75,
            image_dpi: 72.0,
        }
    }
}

impl LayoutConfig {
    /// Create a configuration with the reference constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the slide dimensions.
    pub fn with_slide_size(mut self, width: f64, height: f64) -> Self {
        self.slide_width = width;
        self.slide_height = height;
        self
    }

    /// Override the short-caption threshold.
    pub fn with_short_text_limit(mut self, chars: usize) -> Self {
        self.short_text_limit = chars;
        self
    }

    /// Width of the area inside the outer margins.
    pub fn content_width(&self) -> f64 {
        self.slide_width - 2.0 * self.margin
    }

    /// Height of the area inside the outer margins.
    pub fn content_height(&self) -> f64 {
        self.slide_height - 2.0 * self.margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = LayoutConfig::default();
        assert_eq!(config.slide_width, 10.0);
        assert_eq!(config.slide_height, 7.5);
        assert_eq!(config.margin, 0.25);
        assert_eq!(config.short_text_limit, 75);
        assert_eq!(config.title_font_pt, 75);
    }

    #[test]
    fn test_content_area() {
        let config = LayoutConfig::default();
        assert_eq!(config.content_width(), 9.5);
        assert_eq!(config.content_height(), 7.0);
    }

    #[test]
    fn test_builders() {
        let config = LayoutConfig::new()
            .with_slide_size(13.333, 7.5)
            .with_short_text_limit(60);
        assert_eq!(config.slide_width, 13.333);
        assert_eq!(config.short_text_limit, 60);
    }
}
