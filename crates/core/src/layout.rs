//! Slide layout: classification, partitioning, and placement geometry.
//!
//! The pipeline per slide is classify → partition → place. Everything here
//! is pure geometry over the content model; the only outside contact is the
//! [`ImageFetcher`] supplying intrinsic pixel dimensions (and the bytes the
//! writer will embed later).

use log::{debug, warn};

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::types::{
    ContentAtom, DeckPlan, ImageContent, ImagePlacement, LayoutMode, Paragraph, PictureData,
    Presentation, Rect, Slide, SlidePlan, TextColumnPlacement, VerticalAnchor,
};

/// Raw bytes and intrinsic pixel dimensions of a fetched image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,

    /// Intrinsic width in pixels.
    pub width_px: u32,

    /// Intrinsic height in pixels.
    pub height_px: u32,
}

/// Image resolution facility: bytes plus intrinsic dimensions by URL.
pub trait ImageFetcher {
    /// Fetch one image. Failures surface as [`Error::ImageFetch`].
    fn fetch(&self, url: &str) -> Result<FetchedImage>;
}

/// What to do when a single image cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageErrorPolicy {
    /// Keep the slot as a zero-height placeholder and keep going.
    #[default]
    UsePlaceholder,
    /// Fail the whole conversion.
    Abort,
}

/// An image slot produced by partitioning: a source URL, or a placeholder
/// keeping a text column aligned with no visual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSlot {
    Placeholder,
    Source(String),
}

/// A slide's atoms split into image slots and text columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Image slots in visual order.
    pub images: Vec<ImageSlot>,

    /// Text columns; each is an ordered list of paragraph texts.
    pub columns: Vec<Vec<String>>,
}

/// Split atoms into image slots and text columns for the given mode.
///
/// Column mode pairs every image slot with the text directly below it, so
/// the result always keeps `images.len() == columns.len()`. Generic mode
/// keeps all images and at most one column holding all text.
pub fn partition(atoms: &[ContentAtom], mode: LayoutMode) -> Partition {
    let mut images = Vec::new();
    let mut columns = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for atom in atoms {
        match (mode, atom) {
            (LayoutMode::Column, ContentAtom::Image(src)) => {
                if images.is_empty() && !pending.is_empty() {
                    // Text arrived before any image: park it under a
                    // placeholder so every column sits beneath a slot.
                    images.push(ImageSlot::Placeholder);
                    columns.push(std::mem::take(&mut pending));
                } else if !images.is_empty() {
                    columns.push(std::mem::take(&mut pending));
                }
                images.push(ImageSlot::Source(src.clone()));
            }
            (LayoutMode::Column, ContentAtom::Text(text)) => pending.push(text.clone()),
            (LayoutMode::Generic, ContentAtom::Image(src)) => {
                images.push(ImageSlot::Source(src.clone()));
            }
            (LayoutMode::Generic, ContentAtom::Text(text)) => pending.push(text.clone()),
        }
    }

    match mode {
        // The last image's column always exists, even when empty.
        LayoutMode::Column => columns.push(pending),
        LayoutMode::Generic => {
            if !pending.is_empty() {
                columns.push(pending);
            }
        }
    }

    Partition { images, columns }
}

/// Computes placement geometry for classified slide content.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
    image_error_policy: ImageErrorPolicy,
}

impl LayoutEngine {
    /// Create an engine over the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            image_error_policy: ImageErrorPolicy::default(),
        }
    }

    /// Choose what a failed image fetch does to the conversion.
    pub fn with_image_error_policy(mut self, policy: ImageErrorPolicy) -> Self {
        self.image_error_policy = policy;
        self
    }

    /// Plan every slide of the presentation, in order.
    pub fn plan(
        &self,
        presentation: &Presentation,
        fetcher: &dyn ImageFetcher,
    ) -> Result<DeckPlan> {
        let mut slides = Vec::with_capacity(presentation.slide_count());
        for slide in &presentation.slides {
            slides.push(self.plan_slide(slide, fetcher)?);
        }
        Ok(DeckPlan { slides })
    }

    /// Classify, partition, and place a single slide.
    pub fn plan_slide(&self, slide: &Slide, fetcher: &dyn ImageFetcher) -> Result<SlidePlan> {
        let stats = slide.stats();
        let mode = LayoutMode::classify(stats, &self.config);
        debug!(
            "planning slide: {} images, longest text {} chars, {:?} layout",
            stats.image_count, stats.max_text_len, mode
        );
        let split = partition(&slide.atoms, mode);
        self.place(&split, mode, fetcher)
    }

    /// Compute absolute geometry for a partitioned slide.
    fn place(
        &self,
        split: &Partition,
        mode: LayoutMode,
        fetcher: &dyn ImageFetcher,
    ) -> Result<SlidePlan> {
        let cfg = &self.config;
        let image_count = split.images.len();

        // One column per image slot, margins off both sides, one gap
        // between each adjacent pair.
        let mut available_width = cfg.content_width();
        if image_count > 0 {
            available_width -= (image_count as f64 - 1.0) * cfg.column_gap;
        }
        let column_width = available_width / image_count.max(1) as f64;

        let mut images = Vec::with_capacity(image_count);
        let mut heights = Vec::with_capacity(image_count);
        let mut max_image_height = 0.0f64;

        for (index, slot) in split.images.iter().enumerate() {
            let url = match slot {
                ImageSlot::Source(url) => url,
                ImageSlot::Placeholder => {
                    // No geometry, but the height slot must stay aligned.
                    heights.push(0.0);
                    images.push(placeholder_slot());
                    continue;
                }
            };

            let fetched = match fetcher.fetch(url) {
                Ok(fetched) => fetched,
                Err(err) => match self.image_error_policy {
                    ImageErrorPolicy::UsePlaceholder => {
                        warn!("keeping placeholder slot: {err}");
                        heights.push(0.0);
                        images.push(placeholder_slot());
                        continue;
                    }
                    ImageErrorPolicy::Abort => return Err(err),
                },
            };
            if fetched.width_px == 0 || fetched.height_px == 0 {
                return Err(Error::InvariantViolation(format!(
                    "image '{url}' has a zero pixel dimension"
                )));
            }

            // Natural size at the assumed DPI, then aspect-preserving
            // clamps: width bound first, height bound second. Both may
            // apply to the same image.
            let mut width = f64::from(fetched.width_px) / cfg.image_dpi;
            let mut height = f64::from(fetched.height_px) / cfg.image_dpi;
            let ratio = width / height;

            let mut left = cfg.margin + index as f64 * (column_width + cfg.column_gap);
            let mut top = cfg.margin;

            if width > cfg.content_width() {
                width = cfg.content_width();
                height = width / ratio;
            }
            if height > cfg.content_height() {
                height = cfg.content_height();
                width = height * ratio;
            }

            if image_count == 1 {
                // A lone image is centered horizontally, and vertically too
                // when no text shares the slide.
                left = (cfg.slide_width / 2.0 - width / 2.0).max(cfg.margin);
                if split.columns.is_empty() {
                    top = (cfg.slide_height / 2.0 - height / 2.0).max(cfg.margin);
                }
            }

            max_image_height = max_image_height.max(height);
            heights.push(height);
            images.push(ImagePlacement {
                rect: Rect { left, top, width, height },
                content: ImageContent::Picture(PictureData {
                    url: url.clone(),
                    bytes: fetched.bytes,
                    width_px: fetched.width_px,
                    height_px: fetched.height_px,
                }),
            });
        }

        let column_count = split.columns.len();
        let mut columns = Vec::with_capacity(column_count);
        for (index, texts) in split.columns.iter().enumerate() {
            let mut rect = Rect {
                left: cfg.margin,
                top: cfg.margin,
                width: cfg.content_width(),
                height: cfg.content_height(),
            };
            if image_count > 0 {
                // With images present, text drops below the tallest one.
                rect.top = cfg.margin + max_image_height + cfg.vertical_gap;
                rect.height = cfg.content_height() - max_image_height - cfg.vertical_gap;
            }
            if mode == LayoutMode::Column {
                // Column layout: each column sits directly below its own
                // image slot.
                let image_height = heights.get(index).copied().ok_or_else(|| {
                    Error::InvariantViolation(
                        "text column without a matching image slot".to_string(),
                    )
                })?;
                rect.left = cfg.margin + index as f64 * (column_width + cfg.column_gap);
                rect.width = column_width;
                rect.top = cfg.margin + image_height + cfg.vertical_gap;
                rect.height = cfg.content_height() - image_height - cfg.vertical_gap;
            }

            let anchor = match mode {
                LayoutMode::Generic => VerticalAnchor::Middle,
                LayoutMode::Column => VerticalAnchor::Top,
            };

            // Title treatment is a whole-slide property: nothing but one
            // standalone text run anywhere on the slide.
            let emphasized = image_count == 0 && column_count == 1 && texts.len() == 1;
            let paragraphs = texts
                .iter()
                .map(|text| Paragraph {
                    text: text.clone(),
                    emphasized,
                })
                .collect();

            columns.push(TextColumnPlacement {
                rect,
                anchor,
                paragraphs,
            });
        }

        Ok(SlidePlan { images, columns })
    }
}

fn placeholder_slot() -> ImagePlacement {
    ImagePlacement {
        rect: Rect::default(),
        content: ImageContent::Placeholder,
    }
}
