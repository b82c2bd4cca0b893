//! Report Generator Module
//! Writes the dashboard as a PowerPoint deck: a title slide with the headline
//! metrics, then the static charts two per slide.
//!
//! The package is assembled directly as ZIP + OOXML parts.

use crate::charts::{RenderError, StaticChartRenderer, FIGURE_SIZE};
use crate::stats::{
    BoxStats, CorrelationMatrix, CountEntry, Dashboard, DescriptiveStats, Histogram, ScatterPoint,
    ServiceComparison,
};
use rayon::prelude::*;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::FileOptions;
use zip::ZipWriter;

/// 914400 EMU = 1 inch
const EMU_PER_INCH: i64 = 914400;
/// 16:9 slide, 13.333 x 7.5 inches
const SLIDE_WIDTH: i64 = 12192000;
const SLIDE_HEIGHT: i64 = 6858000;

const FIGURES_PER_SLIDE: usize = 2;
const BRAND_HEX: &str = "E23744";

pub const REPORT_TITLE: &str = "Zomato Bengaluru - Restaurant Analysis";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to package report: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A rendered chart and the caption printed under it.
#[derive(Debug, Clone)]
pub struct Figure {
    pub caption: String,
    pub png: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum Slide {
    Text { title: String, lines: Vec<String> },
    Figures { title: String, figures: Vec<Figure> },
}

/// Chart to render for the report.
enum FigureKind<'a> {
    Bars(&'a [CountEntry], &'static str),
    Donut(&'a [CountEntry]),
    Histogram(Option<&'a Histogram>),
    Scatter(&'a [ScatterPoint]),
    Heatmap(&'a CorrelationMatrix),
    Boxes(&'a [BoxStats]),
}

impl FigureKind<'_> {
    fn render(&self, caption: &str) -> Result<Vec<u8>, RenderError> {
        match self {
            FigureKind::Bars(entries, axis) => StaticChartRenderer::bar_chart(caption, entries, axis),
            FigureKind::Donut(entries) => StaticChartRenderer::donut_chart(caption, entries, 0.45),
            FigureKind::Histogram(h) => StaticChartRenderer::histogram_chart(caption, *h, "Rating"),
            FigureKind::Scatter(points) => StaticChartRenderer::scatter_chart(caption, points),
            FigureKind::Heatmap(matrix) => StaticChartRenderer::heatmap_chart(caption, matrix),
            FigureKind::Boxes(boxes) => StaticChartRenderer::box_chart(caption, boxes, "Rating"),
        }
    }
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    v.map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_else(|| "-".to_string())
}

/// Sample mean, or `None` for an empty group.
fn sample_mean(stats: &DescriptiveStats) -> Option<f64> {
    (stats.count > 0).then_some(stats.mean)
}

fn service_line(s: &ServiceComparison) -> String {
    format!(
        "{}: {} with vs {} without (p = {}){}",
        s.service,
        fmt_opt(sample_mean(&s.with), 2),
        fmt_opt(sample_mean(&s.without), 2),
        fmt_opt(s.p_value, 4),
        if s.is_significant { ", significant" } else { "" }
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub struct ReportGenerator;

impl ReportGenerator {
    /// Render every dashboard chart and lay the deck out.
    /// Charts with no data for the current filters are left out.
    pub fn build_slides(dashboard: &Dashboard) -> Result<Vec<Slide>, ReportError> {
        let o = &dashboard.overview;
        let mut summary = vec![
            format!("Filters: {}", dashboard.filters),
            format!("Restaurants shown: {} of {}", o.restaurants, o.total),
            format!("Average rating: {}", fmt_opt(o.mean_rating, 2)),
            format!("Average cost for two: {} INR", fmt_opt(o.mean_cost, 0)),
            format!("Total votes: {:.0}", o.total_votes),
        ];
        summary.extend(dashboard.services.iter().map(service_line));

        let groups: Vec<(&str, Vec<(&str, FigureKind)>)> = vec![
            (
                "Geography",
                vec![
                    ("Top locations by number of restaurants", FigureKind::Bars(&dashboard.top_locations, "Restaurants")),
                    ("Listings by city", FigureKind::Donut(&dashboard.city_distribution)),
                ],
            ),
            (
                "Types & Cuisines",
                vec![
                    ("Most common restaurant types", FigureKind::Bars(&dashboard.rest_types, "Restaurants")),
                    ("Most common cuisines", FigureKind::Bars(&dashboard.cuisines, "Restaurants")),
                ],
            ),
            (
                "Ratings & Price",
                vec![
                    ("Rating distribution", FigureKind::Histogram(dashboard.rating_histogram.as_ref())),
                    ("Price categories", FigureKind::Donut(&dashboard.price_distribution)),
                ],
            ),
            (
                "Price & Popularity",
                vec![
                    ("Cost for two vs rating (size: votes)", FigureKind::Scatter(&dashboard.scatter)),
                    ("Correlation between rating, votes and cost", FigureKind::Heatmap(&dashboard.correlation)),
                ],
            ),
            (
                "Comparisons",
                vec![
                    ("Rating by price category", FigureKind::Boxes(&dashboard.price_boxes)),
                    ("Rating in the top locations", FigureKind::Boxes(&dashboard.location_boxes)),
                ],
            ),
        ];

        let mut slides = vec![Slide::Text {
            title: REPORT_TITLE.to_string(),
            lines: summary,
        }];

        for (title, charts) in groups {
            let rendered: Vec<Result<Figure, RenderError>> = charts
                .par_iter()
                .map(|(caption, kind)| {
                    kind.render(caption).map(|png| Figure {
                        caption: caption.to_string(),
                        png,
                    })
                })
                .collect();

            let mut figures = Vec::new();
            for result in rendered {
                match result {
                    Ok(figure) => figures.push(figure),
                    Err(RenderError::Empty(caption)) => {
                        log::warn!("Skipping '{}': no data for the current filters", caption)
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            for chunk in figures.chunks(FIGURES_PER_SLIDE) {
                slides.push(Slide::Figures {
                    title: title.to_string(),
                    figures: chunk.to_vec(),
                });
            }
        }

        if !dashboard.top_rated.is_empty() {
            slides.push(Slide::Text {
                title: "Top rated restaurants".to_string(),
                lines: dashboard
                    .top_rated
                    .iter()
                    .map(|r| {
                        format!(
                            "{}. {} ({}) - {} / 5, {} votes",
                            r.rank,
                            r.name,
                            r.location,
                            fmt_opt(r.rate, 1),
                            fmt_opt(r.votes, 0)
                        )
                    })
                    .collect(),
            });
        }

        Ok(slides)
    }

    /// Build and write the report. Returns the number of slides.
    pub fn generate(dashboard: &Dashboard, output_path: &Path) -> Result<usize, ReportError> {
        let slides = Self::build_slides(dashboard)?;
        Self::write_pptx(&slides, output_path, REPORT_TITLE)
    }

    /// Write `slides` as a .pptx file, replacing any existing file.
    pub fn write_pptx(slides: &[Slide], output_path: &Path, title: &str) -> Result<usize, ReportError> {
        let file = File::create(output_path)?;
        let mut zip = ZipWriter::new(file);
        Self::write_package(&mut zip, slides, title)?;
        zip.finish()?;

        log::info!(
            "Report written: {} ({} slides)",
            output_path.display(),
            slides.len()
        );
        Ok(slides.len())
    }

    fn write_package<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        slides: &[Slide],
        title: &str,
    ) -> Result<(), ReportError> {
        let options = FileOptions::default();
        let count = slides.len();

        let parts: [(&str, String); 9] = [
            ("[Content_Types].xml", Self::content_types_xml(count)),
            ("_rels/.rels", Self::package_rels_xml().to_string()),
            ("ppt/_rels/presentation.xml.rels", Self::presentation_rels_xml(count)),
            ("ppt/presentation.xml", Self::presentation_xml(count)),
            ("ppt/slideLayouts/slideLayout1.xml", Self::layout_xml().to_string()),
            ("ppt/slideLayouts/_rels/slideLayout1.xml.rels", Self::layout_rels_xml().to_string()),
            ("ppt/slideMasters/slideMaster1.xml", Self::master_xml().to_string()),
            ("ppt/slideMasters/_rels/slideMaster1.xml.rels", Self::master_rels_xml().to_string()),
            ("ppt/theme/theme1.xml", Self::theme_xml()),
        ];
        for (name, body) in parts {
            zip.start_file(name, options)?;
            zip.write_all(body.as_bytes())?;
        }

        zip.start_file("docProps/core.xml", options)?;
        zip.write_all(Self::core_props_xml(title).as_bytes())?;
        zip.start_file("docProps/app.xml", options)?;
        zip.write_all(Self::app_props_xml(count).as_bytes())?;

        let mut next_image = 1;
        for (idx, slide) in slides.iter().enumerate() {
            let number = idx + 1;
            let (body, images) = match slide {
                Slide::Text { title, lines } => (Self::text_slide_xml(title, lines), Vec::new()),
                Slide::Figures { title, figures } => {
                    let ids: Vec<usize> = (next_image..next_image + figures.len()).collect();
                    next_image += figures.len();
                    for (id, figure) in ids.iter().zip(figures) {
                        zip.start_file(format!("ppt/media/image{}.png", id), options)?;
                        zip.write_all(&figure.png)?;
                    }
                    (Self::figure_slide_xml(title, figures), ids)
                }
            };

            zip.start_file(format!("ppt/slides/slide{}.xml", number), options)?;
            zip.write_all(body.as_bytes())?;
            zip.start_file(format!("ppt/slides/_rels/slide{}.xml.rels", number), options)?;
            zip.write_all(Self::slide_rels_xml(&images).as_bytes())?;
        }
        Ok(())
    }

    fn content_types_xml(slide_count: usize) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#,
        );
        for i in 1..=slide_count {
            xml.push_str(&format!(
                "<Override PartName=\"/ppt/slides/slide{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>\n",
                i
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn package_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#
    }

    /// rId1 master, rId2 theme, slides from rId3.
    fn presentation_rels_xml(slide_count: usize) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>
"#,
        );
        for i in 1..=slide_count {
            xml.push_str(&format!(
                "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" Target=\"slides/slide{}.xml\"/>\n",
                i + 2,
                i
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn presentation_xml(slide_count: usize) -> String {
        let ids: String = (1..=slide_count)
            .map(|i| format!("<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 255 + i, i + 2))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
<p:sldIdLst>{ids}</p:sldIdLst>
<p:sldSz cx="{SLIDE_WIDTH}" cy="{SLIDE_HEIGHT}"/>
<p:notesSz cx="{SLIDE_HEIGHT}" cy="{SLIDE_WIDTH}"/>
</p:presentation>"#
        )
    }

    /// rId1 is the layout, images follow from rId2.
    fn slide_rels_xml(image_ids: &[usize]) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
"#,
        );
        for (idx, id) in image_ids.iter().enumerate() {
            xml.push_str(&format!(
                "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"../media/image{}.png\"/>\n",
                idx + 2,
                id
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn paragraph(text: &str, size_pt: u32, bold: bool, color: Option<&str>) -> String {
        let fill = color
            .map(|c| format!("<a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>", c))
            .unwrap_or_default();
        format!(
            "<a:p><a:r><a:rPr lang=\"en-US\" sz=\"{}\" b=\"{}\">{}</a:rPr><a:t>{}</a:t></a:r></a:p>",
            size_pt * 100,
            u8::from(bold),
            fill,
            escape(text)
        )
    }

    fn text_box(id: usize, (x, y, w, h): (i64, i64, i64, i64), paragraphs: &str) -> String {
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Text {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{w}" cy="{h}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="square"/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
        )
    }

    fn picture(id: usize, rel: usize, (x, y, w, h): (i64, i64, i64, i64)) -> String {
        format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Chart {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{w}" cy="{h}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
        )
    }

    fn title_box(title: &str) -> String {
        let margin = EMU_PER_INCH / 2;
        Self::text_box(
            2,
            (margin, margin / 2, SLIDE_WIDTH - 2 * margin, EMU_PER_INCH * 3 / 4),
            &Self::paragraph(title, 28, true, Some(BRAND_HEX)),
        )
    }

    fn text_slide_xml(title: &str, lines: &[String]) -> String {
        let margin = EMU_PER_INCH / 2;
        let body: String = lines.iter().map(|l| Self::paragraph(l, 18, false, None)).collect();
        let shapes = format!(
            "{}{}",
            Self::title_box(title),
            Self::text_box(
                3,
                (margin, EMU_PER_INCH * 3 / 2, SLIDE_WIDTH - 2 * margin, SLIDE_HEIGHT - 2 * EMU_PER_INCH),
                &body
            )
        );
        Self::slide_xml(&shapes)
    }

    /// Figures side by side under the title, caption under each.
    fn figure_slide_xml(title: &str, figures: &[Figure]) -> String {
        let margin = EMU_PER_INCH / 2;
        let gap = EMU_PER_INCH / 4;
        let top = EMU_PER_INCH * 3 / 2;
        let width = (SLIDE_WIDTH - 2 * margin - gap) / FIGURES_PER_SLIDE as i64;
        let (fig_w, fig_h) = FIGURE_SIZE;
        let height = width * fig_h as i64 / fig_w as i64;

        let mut shapes = Self::title_box(title);
        for (i, figure) in figures.iter().enumerate() {
            let x = margin + i as i64 * (width + gap);
            shapes.push_str(&Self::picture(10 + 2 * i, i + 2, (x, top, width, height)));
            shapes.push_str(&Self::text_box(
                11 + 2 * i,
                (x, top + height + gap / 2, width, EMU_PER_INCH / 2),
                &Self::paragraph(&figure.caption, 14, false, Some("404040")),
            ));
        }
        Self::slide_xml(&shapes)
    }

    fn slide_xml(shapes: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#
        )
    }

    fn layout_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">
<p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#
    }

    fn layout_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>
</Relationships>"#
    }

    fn master_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld>
<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>
</p:sldMaster>"#
    }

    fn master_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/>
</Relationships>"#
    }

    fn theme_xml() -> String {
        let solid = "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>";
        let line = |w: u32| {
            format!("<a:ln w=\"{}\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>", w)
        };
        let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Zomato">
<a:themeElements>
<a:clrScheme name="Zomato"><a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="2D2D2D"/></a:dk2><a:lt2><a:srgbClr val="F4F4F4"/></a:lt2><a:accent1><a:srgbClr val="{BRAND_HEX}"/></a:accent1><a:accent2><a:srgbClr val="3498DB"/></a:accent2><a:accent3><a:srgbClr val="2ECC71"/></a:accent3><a:accent4><a:srgbClr val="9B59B6"/></a:accent4><a:accent5><a:srgbClr val="F39C12"/></a:accent5><a:accent6><a:srgbClr val="1ABC9C"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme>
<a:fontScheme name="Zomato"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>
<a:fmtScheme name="Zomato"><a:fillStyleLst>{solid}{solid}{solid}</a:fillStyleLst><a:lnStyleLst>{l1}{l2}{l3}</a:lnStyleLst><a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst><a:bgFillStyleLst>{solid}{solid}{solid}</a:bgFillStyleLst></a:fmtScheme>
</a:themeElements>
</a:theme>"#,
            l1 = line(6350),
            l2 = line(12700),
            l3 = line(19050),
        )
    }

    fn core_props_xml(title: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:title>{}</dc:title>
<dc:creator>Zomato Explorer</dc:creator>
<cp:revision>1</cp:revision>
</cp:coreProperties>"#,
            escape(title)
        )
    }

    fn app_props_xml(slide_count: usize) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
<Application>Zomato Explorer</Application>
<PresentationFormat>Widescreen</PresentationFormat>
<Slides>{}</Slides>
</Properties>"#,
            slide_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn tiny_png() -> Vec<u8> {
        StaticChartRenderer::encode_png(2, 2, vec![200u8; 12]).unwrap()
    }

    fn read_part(archive: &mut zip::ZipArchive<File>, name: &str) -> String {
        let mut s = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("Fish & <Chips> \"R\" 'n'"), "Fish &amp; &lt;Chips&gt; &quot;R&quot; &apos;n&apos;");
    }

    #[test]
    fn test_write_pptx_parts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pptx");
        let slides = vec![
            Slide::Text {
                title: "Overview".into(),
                lines: vec!["Location: BTM & HSR".into()],
            },
            Slide::Figures {
                title: "Charts".into(),
                figures: vec![
                    Figure { caption: "One".into(), png: tiny_png() },
                    Figure { caption: "Two".into(), png: tiny_png() },
                ],
            },
            Slide::Figures {
                title: "More".into(),
                figures: vec![Figure { caption: "Three".into(), png: tiny_png() }],
            },
        ];

        let count = ReportGenerator::write_pptx(&slides, &path, "Test deck").unwrap();
        assert_eq!(count, 3);

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        for name in [
            "ppt/presentation.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide3.xml",
            "ppt/media/image1.png",
            "ppt/media/image3.png",
            "ppt/theme/theme1.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {}", name);
        }
        assert!(archive.by_name("ppt/media/image4.png").is_err());

        let first = read_part(&mut archive, "ppt/slides/slide1.xml");
        assert!(first.contains("Location: BTM &amp; HSR"));

        let rels = read_part(&mut archive, "ppt/slides/_rels/slide3.xml.rels");
        assert!(rels.contains("../media/image3.png"));

        let presentation = read_part(&mut archive, "ppt/presentation.xml");
        assert_eq!(presentation.matches("<p:sldId ").count(), 3);
    }

    #[test]
    fn test_write_pptx_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pptx");
        std::fs::write(&path, b"not a zip").unwrap();

        let slides = vec![Slide::Text { title: "Only".into(), lines: vec![] }];
        assert_eq!(ReportGenerator::write_pptx(&slides, &path, "t").unwrap(), 1);
        assert!(zip::ZipArchive::new(File::open(&path).unwrap()).is_ok());
    }

    #[test]
    fn test_empty_dashboard_yields_text_slide_only() {
        let dashboard = Dashboard::compute(0, &[], &crate::data::Filters::default());
        let slides = ReportGenerator::build_slides(&dashboard).unwrap();
        assert_eq!(slides.len(), 1);
        match &slides[0] {
            Slide::Text { lines, .. } => assert!(lines[0].contains("All restaurants")),
            Slide::Figures { .. } => panic!("expected title slide"),
        }
    }

    fn listing(i: usize) -> crate::data::Restaurant {
        const LOCATIONS: [&str; 4] = ["BTM", "HSR", "Indiranagar", "Jayanagar"];
        const CITIES: [&str; 3] = ["BTM", "Koramangala 5th Block", "Old Airport Road"];
        const TYPES: [&str; 3] = ["Casual Dining", "Quick Bites", "Cafe"];
        let cost = 150.0 + 110.0 * i as f64;
        crate::data::Restaurant {
            name: Some(format!("Place {}", i)),
            location: Some(LOCATIONS[i % LOCATIONS.len()].into()),
            city: Some(CITIES[i % CITIES.len()].into()),
            rest_type: Some(TYPES[i % TYPES.len()].into()),
            cuisines: vec!["North Indian".into(), if i % 2 == 0 { "Chinese".into() } else { "Cafe".into() }],
            rate: Some(2.8 + (i % 10) as f64 * 0.2),
            votes: Some((i * i * 7 + 3) as f64),
            cost_for_two: Some(cost),
            online_order: Some(i % 2 == 0),
            book_table: Some(i % 3 == 0),
            price_category: crate::data::categorize_price(Some(cost)),
            ..Default::default()
        }
    }

    #[test]
    fn test_dashboard_report_pairs_charts_per_slide() {
        let rows: Vec<crate::data::Restaurant> = (0..20).map(listing).collect();
        let refs: Vec<&crate::data::Restaurant> = rows.iter().collect();
        let dashboard = Dashboard::compute(rows.len(), &refs, &crate::data::Filters::default());

        let slides = ReportGenerator::build_slides(&dashboard).unwrap();
        // title, five chart groups, top rated
        assert_eq!(slides.len(), 7);
        assert!(matches!(slides.first(), Some(Slide::Text { .. })));
        assert!(matches!(slides.last(), Some(Slide::Text { title, .. }) if title == "Top rated restaurants"));
        for slide in &slides[1..6] {
            match slide {
                Slide::Figures { figures, .. } => {
                    assert_eq!(figures.len(), FIGURES_PER_SLIDE);
                    for f in figures {
                        assert_eq!(&f.png[..4], &[0x89, b'P', b'N', b'G']);
                    }
                }
                Slide::Text { title, .. } => panic!("unexpected text slide {}", title),
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.pptx");
        assert_eq!(ReportGenerator::generate(&dashboard, &path).unwrap(), 7);
    }

    #[test]
    fn test_service_line_without_ratings_shows_dash() {
        let rows: Vec<crate::data::Restaurant> = (0..20)
            .map(|i| crate::data::Restaurant {
                online_order: Some(true),
                ..listing(i)
            })
            .collect();
        let refs: Vec<&crate::data::Restaurant> = rows.iter().collect();
        let dashboard = Dashboard::compute(rows.len(), &refs, &crate::data::Filters::default());

        let online = &dashboard.services[0];
        assert_eq!(online.without.count, 0);
        let line = service_line(online);
        assert!(line.contains("- without"), "{}", line);
        assert!(!line.contains("NaN"), "{}", line);

        let slides = ReportGenerator::build_slides(&dashboard).unwrap();
        match &slides[0] {
            Slide::Text { lines, .. } => assert!(lines.iter().all(|l| !l.contains("NaN"))),
            Slide::Figures { .. } => panic!("expected title slide"),
        }
    }
}
