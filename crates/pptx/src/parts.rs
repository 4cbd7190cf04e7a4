//! Fixed and parameterized XML parts of the .pptx package.
//!
//! The dynamic parts (content types, relationships, presentation.xml and
//! the slides themselves) are produced with quick-xml's event writer; the
//! boilerplate parts every package carries verbatim (slide master, blank
//! layout, theme, document properties) are embedded as constants.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use deck_core::{Error, LayoutConfig, Result};

/// English Metric Units per inch, the native length unit of OOXML.
pub const EMU_PER_INCH: f64 = 914_400.0;

pub const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub const REL_TYPE_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_TYPE_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const REL_TYPE_APP_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub const REL_TYPE_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub const REL_TYPE_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub const REL_TYPE_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const REL_TYPE_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub const REL_TYPE_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Convert a length in inches to EMU.
pub fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

pub(crate) type XmlSink = Writer<Cursor<Vec<u8>>>;

pub(crate) fn xml_error(err: impl std::fmt::Display) -> Error {
    Error::Xml(err.to_string())
}

/// Start a new XML document with the standard declaration.
pub(crate) fn new_document() -> Result<XmlSink> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_error)?;
    Ok(writer)
}

pub(crate) fn start(writer: &mut XmlSink, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut element = BytesStart::new(name);
    for (key, value) in attrs {
        element.push_attribute((*key, *value));
    }
    writer.write_event(Event::Start(element)).map_err(xml_error)
}

pub(crate) fn empty(writer: &mut XmlSink, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut element = BytesStart::new(name);
    for (key, value) in attrs {
        element.push_attribute((*key, *value));
    }
    writer.write_event(Event::Empty(element)).map_err(xml_error)
}

pub(crate) fn end(writer: &mut XmlSink, name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)
}

pub(crate) fn text(writer: &mut XmlSink, value: &str) -> Result<()> {
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(xml_error)
}

pub(crate) fn finish(writer: XmlSink) -> Result<String> {
    String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
}

/// One entry of a relationships part.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship id, e.g. `rId1`.
    pub id: String,
    /// Relationship type URI.
    pub kind: &'static str,
    /// Target part, relative to the owning part.
    pub target: String,
}

impl Relationship {
    pub fn new(id: impl Into<String>, kind: &'static str, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            target: target.into(),
        }
    }
}

/// Serialize a `.rels` relationships part.
pub fn relationships_xml(relationships: &[Relationship]) -> Result<String> {
    let mut writer = new_document()?;
    start(&mut writer, "Relationships", &[("xmlns", REL_NS)])?;
    for relationship in relationships {
        empty(
            &mut writer,
            "Relationship",
            &[
                ("Id", relationship.id.as_str()),
                ("Type", relationship.kind),
                ("Target", relationship.target.as_str()),
            ],
        )?;
    }
    end(&mut writer, "Relationships")?;
    finish(writer)
}

/// Serialize `[Content_Types].xml` for a deck with `slide_count` slides and
/// the given media extension/content-type pairs.
pub fn content_types_xml(
    slide_count: usize,
    media_defaults: &[(&str, &str)],
) -> Result<String> {
    let mut writer = new_document()?;
    start(&mut writer, "Types", &[("xmlns", CT_NS)])?;
    empty(
        &mut writer,
        "Default",
        &[
            ("Extension", "rels"),
            (
                "ContentType",
                "application/vnd.openxmlformats-package.relationships+xml",
            ),
        ],
    )?;
    empty(
        &mut writer,
        "Default",
        &[("Extension", "xml"), ("ContentType", "application/xml")],
    )?;
    for (extension, content_type) in media_defaults {
        empty(
            &mut writer,
            "Default",
            &[("Extension", extension), ("ContentType", content_type)],
        )?;
    }

    let overrides = [
        (
            "/ppt/presentation.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
        ),
        (
            "/ppt/slideMasters/slideMaster1.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml",
        ),
        (
            "/ppt/slideLayouts/slideLayout1.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml",
        ),
        (
            "/ppt/theme/theme1.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.theme+xml",
        ),
        (
            "/docProps/core.xml".to_string(),
            "application/vnd.openxmlformats-package.core-properties+xml",
        ),
        (
            "/docProps/app.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.extended-properties+xml",
        ),
    ];
    for (part_name, content_type) in &overrides {
        empty(
            &mut writer,
            "Override",
            &[("PartName", part_name.as_str()), ("ContentType", content_type)],
        )?;
    }
    for index in 1..=slide_count {
        let part_name = format!("/ppt/slides/slide{index}.xml");
        empty(
            &mut writer,
            "Override",
            &[
                ("PartName", part_name.as_str()),
                (
                    "ContentType",
                    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml",
                ),
            ],
        )?;
    }
    end(&mut writer, "Types")?;
    finish(writer)
}

/// Serialize `ppt/presentation.xml`: master reference, slide list, and the
/// slide size from the layout configuration.
pub fn presentation_xml(slide_count: usize, config: &LayoutConfig) -> Result<String> {
    let mut writer = new_document()?;
    start(
        &mut writer,
        "p:presentation",
        &[("xmlns:a", A_NS), ("xmlns:r", R_NS), ("xmlns:p", P_NS)],
    )?;

    start(&mut writer, "p:sldMasterIdLst", &[])?;
    empty(
        &mut writer,
        "p:sldMasterId",
        &[("id", "2147483648"), ("r:id", "rId1")],
    )?;
    end(&mut writer, "p:sldMasterIdLst")?;

    if slide_count > 0 {
        start(&mut writer, "p:sldIdLst", &[])?;
        for index in 0..slide_count {
            // Slide ids start at 256; rId1 is taken by the master.
            let id = (256 + index).to_string();
            let rel_id = format!("rId{}", index + 2);
            empty(
                &mut writer,
                "p:sldId",
                &[("id", id.as_str()), ("r:id", rel_id.as_str())],
            )?;
        }
        end(&mut writer, "p:sldIdLst")?;
    }

    let width = emu(config.slide_width).to_string();
    let height = emu(config.slide_height).to_string();
    empty(
        &mut writer,
        "p:sldSz",
        &[("cx", width.as_str()), ("cy", height.as_str())],
    )?;
    empty(
        &mut writer,
        "p:notesSz",
        &[("cx", height.as_str()), ("cy", width.as_str())],
    )?;

    end(&mut writer, "p:presentation")?;
    finish(writer)
}

/// Relationships of the package root.
pub fn root_relationships() -> Vec<Relationship> {
    vec![
        Relationship::new("rId1", REL_TYPE_OFFICE_DOCUMENT, "ppt/presentation.xml"),
        Relationship::new("rId2", REL_TYPE_CORE_PROPS, "docProps/core.xml"),
        Relationship::new("rId3", REL_TYPE_APP_PROPS, "docProps/app.xml"),
    ]
}

/// Relationships of `ppt/presentation.xml`: the master first, then one
/// entry per slide in order.
pub fn presentation_relationships(slide_count: usize) -> Vec<Relationship> {
    let mut relationships = vec![Relationship::new(
        "rId1",
        REL_TYPE_SLIDE_MASTER,
        "slideMasters/slideMaster1.xml",
    )];
    for index in 0..slide_count {
        relationships.push(Relationship::new(
            format!("rId{}", index + 2),
            REL_TYPE_SLIDE,
            format!("slides/slide{}.xml", index + 1),
        ));
    }
    relationships
}

/// Minimal slide master: empty shape tree, standard color map, one layout.
pub const SLIDE_MASTER_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
    r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld>"#,
    r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
    r#"<p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles>"#,
    r#"</p:sldMaster>"#,
);

/// The blank layout every slide uses.
pub const SLIDE_LAYOUT_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">"#,
    r#"<p:cSld name="Blank">"#,
    r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld>"#,
    r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#,
    r#"</p:sldLayout>"#,
);

/// Minimal Office-style theme; required by the master reference.
pub const THEME_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">"#,
    r#"<a:themeElements>"#,
    r#"<a:clrScheme name="Office">"#,
    r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
    r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2>"#,
    r#"<a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1>"#,
    r#"<a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>"#,
    r#"<a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>"#,
    r#"<a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink>"#,
    r#"<a:folHlink><a:srgbClr val="954F72"/></a:folHlink>"#,
    r#"</a:clrScheme>"#,
    r#"<a:fontScheme name="Office">"#,
    r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
    r#"</a:fontScheme>"#,
    r#"<a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>"#,
    r#"<a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>"#,
    r#"<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>"#,
    r#"</a:fmtScheme>"#,
    r#"</a:themeElements>"#,
    r#"</a:theme>"#,
);

/// Extended document properties.
pub const APP_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
    r#"<Application>deckgen</Application>"#,
    r#"</Properties>"#,
);

/// Core document properties.
pub const CORE_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    r#"<dc:title>Generated deck</dc:title>"#,
    r#"</cp:coreProperties>"#,
);

/// Relationships of the slide master (its layout and the theme).
pub fn slide_master_relationships() -> Vec<Relationship> {
    vec![
        Relationship::new("rId1", REL_TYPE_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
        Relationship::new("rId2", REL_TYPE_THEME, "../theme/theme1.xml"),
    ]
}

/// Relationships of the blank layout (back to its master).
pub fn slide_layout_relationships() -> Vec<Relationship> {
    vec![Relationship::new(
        "rId1",
        REL_TYPE_SLIDE_MASTER,
        "../slideMasters/slideMaster1.xml",
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_conversion() {
        assert_eq!(emu(1.0), 914_400);
        assert_eq!(emu(0.25), 228_600);
        assert_eq!(emu(10.0), 9_144_000);
        assert_eq!(emu(7.5), 6_858_000);
    }

    #[test]
    fn test_relationships_xml() {
        let xml = relationships_xml(&[Relationship::new(
            "rId1",
            REL_TYPE_IMAGE,
            "../media/image1.png",
        )])
        .unwrap();
        assert!(xml.contains("Id=\"rId1\""));
        assert!(xml.contains("Target=\"../media/image1.png\""));
        assert!(xml.contains("relationships/image"));
    }

    #[test]
    fn test_content_types_lists_slides_and_media() {
        let xml = content_types_xml(2, &[("png", "image/png")]).unwrap();
        assert!(xml.contains("/ppt/slides/slide1.xml"));
        assert!(xml.contains("/ppt/slides/slide2.xml"));
        assert!(!xml.contains("/ppt/slides/slide3.xml"));
        assert!(xml.contains("Extension=\"png\""));
    }

    #[test]
    fn test_presentation_xml_slide_size_and_ids() {
        let xml = presentation_xml(2, &LayoutConfig::default()).unwrap();
        assert!(xml.contains("cx=\"9144000\" cy=\"6858000\""));
        assert!(xml.contains("r:id=\"rId2\""));
        assert!(xml.contains("r:id=\"rId3\""));
    }

    #[test]
    fn test_presentation_xml_empty_deck_has_no_slide_list() {
        let xml = presentation_xml(0, &LayoutConfig::default()).unwrap();
        assert!(!xml.contains("sldIdLst"));
    }
}
