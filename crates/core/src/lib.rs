//! Core content model, markup extraction, and slide layout engine for
//! converting a selected region of a web page into a deck.

pub mod config;
pub mod error;
pub mod extract;
pub mod layout;
pub mod markup;
pub mod types;

pub use config::LayoutConfig;
pub use error::{Error, Result};
pub use extract::{extract_atoms, extract_slides};
pub use layout::{
    partition, FetchedImage, ImageErrorPolicy, ImageFetcher, ImageSlot, LayoutEngine, Partition,
};
pub use markup::MarkupNode;
pub use types::{
    ContentAtom, DeckPlan, ImageContent, ImagePlacement, LayoutMode, Paragraph, PictureData,
    Presentation, Rect, Slide, SlidePlan, SlideStats, TextColumnPlacement, VerticalAnchor,
};
