//! Domain types: extracted slide content and computed placement geometry.

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;

/// The smallest unit of slide content extracted from markup.
///
/// Order is significant: the atom sequence is both the visual order and the
/// grouping signal for the column layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentAtom {
    /// A run of text. Non-empty and trimmed by construction.
    Text(String),
    /// A reference to an image by source URL.
    Image(String),
}

impl ContentAtom {
    /// The text payload, if this is a text atom.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image(_) => None,
        }
    }

    /// The image URL, if this is an image atom.
    pub fn as_image(&self) -> Option<&str> {
        match self {
            Self::Image(url) => Some(url),
            Self::Text(_) => None,
        }
    }
}

/// One slide's worth of ordered content atoms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Atoms in document order.
    pub atoms: Vec<ContentAtom>,
}

impl Slide {
    /// Create an empty slide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slide from an atom sequence.
    pub fn from_atoms(atoms: Vec<ContentAtom>) -> Self {
        Self { atoms }
    }

    /// Append an atom.
    pub fn push(&mut self, atom: ContentAtom) {
        self.atoms.push(atom);
    }

    /// Count images and measure the longest single text atom.
    pub fn stats(&self) -> SlideStats {
        let mut stats = SlideStats::default();
        for atom in &self.atoms {
            match atom {
                ContentAtom::Image(_) => stats.image_count += 1,
                ContentAtom::Text(text) => {
                    stats.max_text_len = stats.max_text_len.max(text.chars().count());
                }
            }
        }
        stats
    }

    /// A degenerate slide has no images and no non-empty text; it produces
    /// no output slide at all.
    pub fn is_degenerate(&self) -> bool {
        self.stats().is_empty()
    }
}

/// Summary statistics driving layout classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideStats {
    /// Number of image atoms.
    pub image_count: usize,

    /// Length in characters of the longest single text atom (not a sum).
    pub max_text_len: usize,
}

impl SlideStats {
    /// True when the slide holds no images and no text.
    pub fn is_empty(&self) -> bool {
        self.image_count == 0 && self.max_text_len == 0
    }
}

/// How a slide's content is arranged on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Up to one full-width text block below all images.
    Generic,
    /// Each image paired with the short text directly below it.
    Column,
}

impl LayoutMode {
    /// Pure classification from slide statistics.
    ///
    /// Column layout needs more than one image and at least one text atom
    /// no longer than the short-text limit (the limit is inclusive).
    pub fn classify(stats: SlideStats, config: &LayoutConfig) -> Self {
        let multiple_images = stats.image_count > 1;
        let short_texts =
            stats.max_text_len != 0 && stats.max_text_len <= config.short_text_limit;
        if multiple_images && short_texts {
            Self::Column
        } else {
            Self::Generic
        }
    }
}

/// Ordered non-degenerate slides, ready for layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    /// Slides in document order.
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Build a presentation from extracted slides, dropping degenerate ones.
    pub fn new(slides: impl IntoIterator<Item = Slide>) -> Self {
        Self {
            slides: slides
                .into_iter()
                .filter(|slide| !slide.is_degenerate())
                .collect(),
        }
    }

    /// Number of slides that will appear in the output.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// True when nothing survived extraction.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// An axis-aligned rectangle in slide coordinates (inches).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Vertical anchoring of text inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAnchor {
    /// Text centered vertically (generic layout).
    Middle,
    /// Text pinned to the top (column layout).
    Top,
}

/// A single paragraph to emit into a text box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    /// Paragraph text.
    pub text: String,

    /// Title treatment: centered, large fixed font. Decided per slide, not
    /// per paragraph.
    pub emphasized: bool,
}

/// A fetched picture with its intrinsic pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureData {
    /// Source URL the bytes were fetched from.
    pub url: String,

    /// Raw encoded image bytes, embedded verbatim into the deck package.
    pub bytes: Vec<u8>,

    /// Intrinsic width in pixels.
    pub width_px: u32,

    /// Intrinsic height in pixels.
    pub height_px: u32,
}

/// What an image slot holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageContent {
    /// No visual output; keeps a text column index-aligned with its slot.
    Placeholder,
    /// An actual picture.
    Picture(PictureData),
}

/// Final position and size for one image slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    /// Placement rectangle; zeroed for placeholders.
    pub rect: Rect,

    /// Picture bytes, or a placeholder marker.
    pub content: ImageContent,
}

impl ImagePlacement {
    /// True when this slot renders nothing.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, ImageContent::Placeholder)
    }
}

/// Final position, anchoring, and paragraphs for one text column.
#[derive(Debug, Clone, PartialEq)]
pub struct TextColumnPlacement {
    /// Placement rectangle.
    pub rect: Rect,

    /// Vertical anchor of the text inside the rectangle.
    pub anchor: VerticalAnchor,

    /// Paragraphs in emission order.
    pub paragraphs: Vec<Paragraph>,
}

/// Everything the writer needs to render one slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlidePlan {
    /// Placed image slots, in column order.
    pub images: Vec<ImagePlacement>,

    /// Placed text columns. In column layout this is index-aligned with
    /// `images`; in generic layout it holds at most one entry.
    pub columns: Vec<TextColumnPlacement>,
}

/// The fully planned deck, in slide order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckPlan {
    /// One plan per non-degenerate slide.
    pub slides: Vec<SlidePlan>,
}
