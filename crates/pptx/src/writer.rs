//! Assembling the .pptx package from a planned deck.

use std::collections::BTreeMap;
use std::io::{Cursor, Seek, Write};

use log::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use deck_core::{
    DeckPlan, Error, ImageContent, LayoutConfig, Paragraph, Rect, Result, SlidePlan,
    TextColumnPlacement, VerticalAnchor,
};

use crate::parts::{
    self, content_types_xml, emu, presentation_relationships, presentation_xml,
    relationships_xml, root_relationships, slide_layout_relationships,
    slide_master_relationships, Relationship, A_NS, P_NS, REL_TYPE_IMAGE, R_NS,
};

/// Raster format of an embedded picture, detected from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MediaFormat {
    Png,
    Jpeg,
    Gif,
}

impl MediaFormat {
    /// Detect format from the first bytes of the encoded image.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if bytes.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }
        None
    }

    /// File extension used for the media part.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        }
    }

    /// MIME content type for `[Content_Types].xml`.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }
}

/// Writer serializing a planned deck into a .pptx package.
#[derive(Debug, Clone, Default)]
pub struct PptxWriter {
    config: LayoutConfig,
    debug_fill: bool,
}

impl PptxWriter {
    /// Create a writer over the given layout configuration (the slide size
    /// must match the one the geometry was computed against).
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            debug_fill: false,
        }
    }

    /// Paint text boxes solid red to make computed geometry visible.
    pub fn with_debug_fill(mut self, enabled: bool) -> Self {
        self.debug_fill = enabled;
        self
    }

    /// Serialize the deck into an in-memory .pptx file.
    pub fn write(&self, plan: &DeckPlan) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(plan, &mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Serialize the deck into `sink`.
    pub fn write_to<W: Write + Seek>(&self, plan: &DeckPlan, sink: W) -> Result<()> {
        let slide_count = plan.slides.len();
        debug!("writing deck package with {slide_count} slides");

        // Collect media parts and per-slide relationship tables first; the
        // media numbering is global across the deck.
        let mut media_parts: Vec<(String, Vec<u8>)> = Vec::new();
        let mut media_defaults: BTreeMap<&'static str, &'static str> = BTreeMap::new();
        let mut slide_xmls = Vec::with_capacity(slide_count);
        let mut slide_rels = Vec::with_capacity(slide_count);
        let mut media_index = 0usize;

        for slide in &plan.slides {
            let mut relationships = Vec::new();
            let mut embeds: Vec<Option<String>> = Vec::with_capacity(slide.images.len());
            for image in &slide.images {
                let picture = match &image.content {
                    ImageContent::Placeholder => {
                        embeds.push(None);
                        continue;
                    }
                    ImageContent::Picture(picture) => picture,
                };
                let format =
                    MediaFormat::from_magic(&picture.bytes).ok_or_else(|| Error::ImageFetch {
                        url: picture.url.clone(),
                        reason: "unrecognized image format".to_string(),
                    })?;
                media_index += 1;
                let filename = format!("image{media_index}.{}", format.extension());
                let rel_id = format!("rId{}", relationships.len() + 1);
                relationships.push(Relationship::new(
                    rel_id.clone(),
                    REL_TYPE_IMAGE,
                    format!("../media/{filename}"),
                ));
                media_parts.push((format!("ppt/media/{filename}"), picture.bytes.clone()));
                media_defaults.insert(format.extension(), format.content_type());
                embeds.push(Some(rel_id));
            }
            slide_xmls.push(self.slide_xml(slide, &embeds)?);
            slide_rels.push(relationships_xml(&relationships)?);
        }

        let defaults: Vec<(&str, &str)> = media_defaults.into_iter().collect();

        let mut zip = ZipWriter::new(sink);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        write_part(
            &mut zip,
            options,
            "[Content_Types].xml",
            content_types_xml(slide_count, &defaults)?.as_bytes(),
        )?;
        write_part(
            &mut zip,
            options,
            "_rels/.rels",
            relationships_xml(&root_relationships())?.as_bytes(),
        )?;
        write_part(&mut zip, options, "docProps/app.xml", parts::APP_XML.as_bytes())?;
        write_part(&mut zip, options, "docProps/core.xml", parts::CORE_XML.as_bytes())?;
        write_part(
            &mut zip,
            options,
            "ppt/presentation.xml",
            presentation_xml(slide_count, &self.config)?.as_bytes(),
        )?;
        write_part(
            &mut zip,
            options,
            "ppt/_rels/presentation.xml.rels",
            relationships_xml(&presentation_relationships(slide_count))?.as_bytes(),
        )?;
        write_part(
            &mut zip,
            options,
            "ppt/slideMasters/slideMaster1.xml",
            parts::SLIDE_MASTER_XML.as_bytes(),
        )?;
        write_part(
            &mut zip,
            options,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            relationships_xml(&slide_master_relationships())?.as_bytes(),
        )?;
        write_part(
            &mut zip,
            options,
            "ppt/slideLayouts/slideLayout1.xml",
            parts::SLIDE_LAYOUT_XML.as_bytes(),
        )?;
        write_part(
            &mut zip,
            options,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            relationships_xml(&slide_layout_relationships())?.as_bytes(),
        )?;
        write_part(&mut zip, options, "ppt/theme/theme1.xml", parts::THEME_XML.as_bytes())?;

        for (index, (xml, rels)) in slide_xmls.iter().zip(&slide_rels).enumerate() {
            let number = index + 1;
            write_part(
                &mut zip,
                options,
                &format!("ppt/slides/slide{number}.xml"),
                xml.as_bytes(),
            )?;
            write_part(
                &mut zip,
                options,
                &format!("ppt/slides/_rels/slide{number}.xml.rels"),
                rels.as_bytes(),
            )?;
        }

        for (path, bytes) in &media_parts {
            write_part(&mut zip, options, path, bytes)?;
        }

        zip.finish().map_err(|e| Error::Zip(e.to_string()))?;
        Ok(())
    }

    /// Serialize one slide part: pictures first, then text boxes, matching
    /// the order the geometry was computed in.
    fn slide_xml(&self, slide: &SlidePlan, embeds: &[Option<String>]) -> Result<String> {
        let mut writer = parts::new_document()?;
        parts::start(
            &mut writer,
            "p:sld",
            &[("xmlns:a", A_NS), ("xmlns:r", R_NS), ("xmlns:p", P_NS)],
        )?;
        parts::start(&mut writer, "p:cSld", &[])?;
        parts::start(&mut writer, "p:spTree", &[])?;
        parts::start(&mut writer, "p:nvGrpSpPr", &[])?;
        parts::empty(&mut writer, "p:cNvPr", &[("id", "1"), ("name", "")])?;
        parts::empty(&mut writer, "p:cNvGrpSpPr", &[])?;
        parts::empty(&mut writer, "p:nvPr", &[])?;
        parts::end(&mut writer, "p:nvGrpSpPr")?;
        parts::empty(&mut writer, "p:grpSpPr", &[])?;

        // Shape id 1 is the group shape above.
        let mut shape_id = 2usize;
        for (image, embed) in slide.images.iter().zip(embeds) {
            // Placeholder slots render nothing.
            if let Some(rel_id) = embed {
                write_picture(&mut writer, image.rect, rel_id, shape_id)?;
                shape_id += 1;
            }
        }
        for column in &slide.columns {
            self.write_text_box(&mut writer, column, shape_id)?;
            shape_id += 1;
        }

        parts::end(&mut writer, "p:spTree")?;
        parts::end(&mut writer, "p:cSld")?;
        parts::start(&mut writer, "p:clrMapOvr", &[])?;
        parts::empty(&mut writer, "a:masterClrMapping", &[])?;
        parts::end(&mut writer, "p:clrMapOvr")?;
        parts::end(&mut writer, "p:sld")?;
        parts::finish(writer)
    }

    fn write_text_box(
        &self,
        writer: &mut parts::XmlSink,
        column: &TextColumnPlacement,
        shape_id: usize,
    ) -> Result<()> {
        let id = shape_id.to_string();
        let name = format!("TextBox {shape_id}");

        parts::start(writer, "p:sp", &[])?;
        parts::start(writer, "p:nvSpPr", &[])?;
        parts::empty(writer, "p:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?;
        parts::empty(writer, "p:cNvSpPr", &[("txBox", "1")])?;
        parts::empty(writer, "p:nvPr", &[])?;
        parts::end(writer, "p:nvSpPr")?;

        parts::start(writer, "p:spPr", &[])?;
        write_transform(writer, column.rect)?;
        parts::start(writer, "a:prstGeom", &[("prst", "rect")])?;
        parts::empty(writer, "a:avLst", &[])?;
        parts::end(writer, "a:prstGeom")?;
        if self.debug_fill {
            parts::start(writer, "a:solidFill", &[])?;
            parts::empty(writer, "a:srgbClr", &[("val", "FF0000")])?;
            parts::end(writer, "a:solidFill")?;
        }
        parts::end(writer, "p:spPr")?;

        parts::start(writer, "p:txBody", &[])?;
        let anchor = match column.anchor {
            VerticalAnchor::Middle => "ctr",
            VerticalAnchor::Top => "t",
        };
        // Word wrap and shrink-to-fit are always on.
        parts::start(writer, "a:bodyPr", &[("wrap", "square"), ("anchor", anchor)])?;
        parts::empty(writer, "a:normAutofit", &[])?;
        parts::end(writer, "a:bodyPr")?;
        parts::empty(writer, "a:lstStyle", &[])?;
        for paragraph in &column.paragraphs {
            self.write_paragraph(writer, paragraph)?;
        }
        parts::end(writer, "p:txBody")?;
        parts::end(writer, "p:sp")?;
        Ok(())
    }

    fn write_paragraph(&self, writer: &mut parts::XmlSink, paragraph: &Paragraph) -> Result<()> {
        let title_size = (self.config.title_font_pt * 100).to_string();

        parts::start(writer, "a:p", &[])?;
        if paragraph.emphasized {
            parts::empty(writer, "a:pPr", &[("algn", "ctr")])?;
        }
        parts::start(writer, "a:r", &[])?;
        if paragraph.emphasized {
            parts::empty(
                writer,
                "a:rPr",
                &[("lang", "en-US"), ("sz", title_size.as_str())],
            )?;
        }
        parts::start(writer, "a:t", &[])?;
        parts::text(writer, &paragraph.text)?;
        parts::end(writer, "a:t")?;
        parts::end(writer, "a:r")?;
        parts::end(writer, "a:p")?;
        Ok(())
    }
}

fn write_picture(
    writer: &mut parts::XmlSink,
    rect: Rect,
    rel_id: &str,
    shape_id: usize,
) -> Result<()> {
    let id = shape_id.to_string();
    let name = format!("Picture {shape_id}");

    parts::start(writer, "p:pic", &[])?;
    parts::start(writer, "p:nvPicPr", &[])?;
    parts::empty(writer, "p:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?;
    parts::start(writer, "p:cNvPicPr", &[])?;
    parts::empty(writer, "a:picLocks", &[("noChangeAspect", "1")])?;
    parts::end(writer, "p:cNvPicPr")?;
    parts::empty(writer, "p:nvPr", &[])?;
    parts::end(writer, "p:nvPicPr")?;

    parts::start(writer, "p:blipFill", &[])?;
    parts::empty(writer, "a:blip", &[("r:embed", rel_id)])?;
    parts::start(writer, "a:stretch", &[])?;
    parts::empty(writer, "a:fillRect", &[])?;
    parts::end(writer, "a:stretch")?;
    parts::end(writer, "p:blipFill")?;

    parts::start(writer, "p:spPr", &[])?;
    write_transform(writer, rect)?;
    parts::start(writer, "a:prstGeom", &[("prst", "rect")])?;
    parts::empty(writer, "a:avLst", &[])?;
    parts::end(writer, "a:prstGeom")?;
    parts::end(writer, "p:spPr")?;
    parts::end(writer, "p:pic")?;
    Ok(())
}

fn write_transform(writer: &mut parts::XmlSink, rect: Rect) -> Result<()> {
    let x = emu(rect.left).to_string();
    let y = emu(rect.top).to_string();
    let cx = emu(rect.width).to_string();
    let cy = emu(rect.height).to_string();

    parts::start(writer, "a:xfrm", &[])?;
    parts::empty(writer, "a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
    parts::empty(writer, "a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    parts::end(writer, "a:xfrm")?;
    Ok(())
}

fn write_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: FileOptions,
    path: &str,
    bytes: &[u8],
) -> Result<()> {
    zip.start_file(path, options)
        .map_err(|e| Error::Zip(format!("failed to start '{path}': {e}")))?;
    zip.write_all(bytes)
        .map_err(|e| Error::Zip(format!("failed to write '{path}': {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{ImagePlacement, PictureData};
    use std::io::Read;
    use zip::ZipArchive;

    // Enough of a PNG header to satisfy magic-byte sniffing.
    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00];

    fn title_slide(text: &str) -> SlidePlan {
        SlidePlan {
            images: Vec::new(),
            columns: vec![TextColumnPlacement {
                rect: Rect {
                    left: 0.25,
                    top: 0.25,
                    width: 9.5,
                    height: 7.0,
                },
                anchor: VerticalAnchor::Middle,
                paragraphs: vec![Paragraph {
                    text: text.to_string(),
                    emphasized: true,
                }],
            }],
        }
    }

    fn picture_slide(url: &str, bytes: &[u8]) -> SlidePlan {
        SlidePlan {
            images: vec![ImagePlacement {
                rect: Rect {
                    left: 4.0,
                    top: 0.25,
                    width: 2.0,
                    height: 1.0,
                },
                content: ImageContent::Picture(PictureData {
                    url: url.to_string(),
                    bytes: bytes.to_vec(),
                    width_px: 144,
                    height_px: 72,
                }),
            }],
            columns: vec![TextColumnPlacement {
                rect: Rect {
                    left: 0.25,
                    top: 1.35,
                    width: 9.5,
                    height: 5.9,
                },
                anchor: VerticalAnchor::Middle,
                paragraphs: vec![Paragraph {
                    text: "caption".to_string(),
                    emphasized: false,
                }],
            }],
        }
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    fn write_deck(plan: &DeckPlan) -> ZipArchive<Cursor<Vec<u8>>> {
        let writer = PptxWriter::new(LayoutConfig::default());
        let bytes = writer.write(plan).unwrap();
        ZipArchive::new(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_media_format_from_magic() {
        assert_eq!(MediaFormat::from_magic(PNG_MAGIC), Some(MediaFormat::Png));
        assert_eq!(MediaFormat::from_magic(JPEG_MAGIC), Some(MediaFormat::Jpeg));
        assert_eq!(MediaFormat::from_magic(b"GIF89a"), Some(MediaFormat::Gif));
        assert_eq!(MediaFormat::from_magic(b"bogus"), None);
    }

    #[test]
    fn test_package_inventory() {
        let plan = DeckPlan {
            slides: vec![title_slide("Title"), picture_slide("a.png", PNG_MAGIC)],
        };
        let mut archive = write_deck(&plan);

        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/app.xml",
            "docProps/core.xml",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
            "ppt/media/image1.png",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part: {name}");
        }
    }

    #[test]
    fn test_title_slide_emphasis_markup() {
        let plan = DeckPlan {
            slides: vec![title_slide("Big Title")],
        };
        let mut archive = write_deck(&plan);
        let xml = read_entry(&mut archive, "ppt/slides/slide1.xml");

        assert!(xml.contains("anchor=\"ctr\""));
        assert!(xml.contains("algn=\"ctr\""));
        assert!(xml.contains("sz=\"7500\""));
        assert!(xml.contains("<a:t>Big Title</a:t>"));
        assert!(xml.contains("<a:normAutofit/>"));
    }

    #[test]
    fn test_plain_paragraph_has_no_title_formatting() {
        let plan = DeckPlan {
            slides: vec![picture_slide("a.png", PNG_MAGIC)],
        };
        let mut archive = write_deck(&plan);
        let xml = read_entry(&mut archive, "ppt/slides/slide1.xml");

        assert!(!xml.contains("algn=\"ctr\""));
        assert!(!xml.contains("sz=\"7500\""));
        assert!(xml.contains("<a:t>caption</a:t>"));
    }

    #[test]
    fn test_picture_geometry_in_emu() {
        let plan = DeckPlan {
            slides: vec![picture_slide("a.png", PNG_MAGIC)],
        };
        let mut archive = write_deck(&plan);
        let xml = read_entry(&mut archive, "ppt/slides/slide1.xml");

        // left 4.0in, top 0.25in, width 2.0in, height 1.0in
        assert!(xml.contains("<a:off x=\"3657600\" y=\"228600\"/>"));
        assert!(xml.contains("<a:ext cx=\"1828800\" cy=\"914400\"/>"));
        assert!(xml.contains("r:embed=\"rId1\""));
    }

    #[test]
    fn test_slide_relationships_point_at_media() {
        let plan = DeckPlan {
            slides: vec![picture_slide("a.png", PNG_MAGIC)],
        };
        let mut archive = write_deck(&plan);
        let rels = read_entry(&mut archive, "ppt/slides/_rels/slide1.xml.rels");
        assert!(rels.contains("Target=\"../media/image1.png\""));
    }

    #[test]
    fn test_media_numbering_is_global() {
        let plan = DeckPlan {
            slides: vec![
                picture_slide("a.png", PNG_MAGIC),
                picture_slide("b.jpg", JPEG_MAGIC),
            ],
        };
        let mut archive = write_deck(&plan);
        assert!(archive.by_name("ppt/media/image1.png").is_ok());
        assert!(archive.by_name("ppt/media/image2.jpeg").is_ok());

        let types = read_entry(&mut archive, "[Content_Types].xml");
        assert!(types.contains("Extension=\"png\""));
        assert!(types.contains("Extension=\"jpeg\""));
    }

    #[test]
    fn test_placeholder_renders_no_picture() {
        let plan = DeckPlan {
            slides: vec![SlidePlan {
                images: vec![ImagePlacement {
                    rect: Rect::default(),
                    content: ImageContent::Placeholder,
                }],
                columns: vec![TextColumnPlacement {
                    rect: Rect {
                        left: 0.25,
                        top: 0.35,
                        width: 4.7,
                        height: 6.65,
                    },
                    anchor: VerticalAnchor::Top,
                    paragraphs: vec![Paragraph {
                        text: "only text".to_string(),
                        emphasized: false,
                    }],
                }],
            }],
        };
        let mut archive = write_deck(&plan);
        let xml = read_entry(&mut archive, "ppt/slides/slide1.xml");
        assert!(!xml.contains("<p:pic>"));
        assert!(xml.contains("anchor=\"t\""));
    }

    #[test]
    fn test_debug_fill_paints_text_boxes() {
        let writer = PptxWriter::new(LayoutConfig::default()).with_debug_fill(true);
        let bytes = writer
            .write(&DeckPlan {
                slides: vec![title_slide("x")],
            })
            .unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let xml = read_entry(&mut archive, "ppt/slides/slide1.xml");
        assert!(xml.contains("srgbClr val=\"FF0000\""));
    }

    #[test]
    fn test_unrecognized_image_bytes_error() {
        let plan = DeckPlan {
            slides: vec![picture_slide("a.bin", b"not an image")],
        };
        let writer = PptxWriter::new(LayoutConfig::default());
        let err = writer.write(&plan).unwrap_err();
        assert!(matches!(err, Error::ImageFetch { .. }));
    }

    #[test]
    fn test_xml_text_is_escaped() {
        let plan = DeckPlan {
            slides: vec![title_slide("a < b & c")],
        };
        let mut archive = write_deck(&plan);
        let xml = read_entry(&mut archive, "ppt/slides/slide1.xml");
        assert!(xml.contains("a &lt; b &amp; c"));
    }
}
