//! WordprocessingML paragraph and run views.
//!
//! A [`WmlParagraph`] borrows a `w:p` element and exposes its direct `w:r`
//! children through [`RunSequence`]. Runs nested in hyperlinks, fields or
//! content controls are not part of the run list.

use std::ops::Range;

use super::xml::{XmlElement, XmlNode};
use crate::model::{RunSequence, RunStyle, Underline};

pub(crate) const W_P: &str = "w:p";
pub(crate) const W_R: &str = "w:r";
pub(crate) const W_RPR: &str = "w:rPr";
pub(crate) const W_T: &str = "w:t";
pub(crate) const W_TBL: &str = "w:tbl";
pub(crate) const W_TR: &str = "w:tr";
pub(crate) const W_TC: &str = "w:tc";

/// Schema order of the `w:rPr` children this module writes, interleaved
/// with the neighbours that may already be present.
const RPR_ORDER: &[&str] = &[
    "w:rStyle",
    "w:rFonts",
    "w:b",
    "w:bCs",
    "w:i",
    "w:iCs",
    "w:caps",
    "w:smallCaps",
    "w:strike",
    "w:dstrike",
    "w:outline",
    "w:shadow",
    "w:emboss",
    "w:imprint",
    "w:noProof",
    "w:snapToGrid",
    "w:vanish",
    "w:webHidden",
    "w:color",
    "w:spacing",
    "w:w",
    "w:kern",
    "w:position",
    "w:sz",
    "w:szCs",
    "w:highlight",
    "w:u",
    "w:effect",
    "w:bdr",
    "w:shd",
    "w:fitText",
    "w:vertAlign",
    "w:rtl",
    "w:cs",
    "w:em",
    "w:lang",
    "w:eastAsianLayout",
    "w:specVanish",
    "w:oMath",
];

/// Paragraph children that carry no visible content. Runs on either side of
/// them still read as contiguous text.
const INVISIBLE_MARKERS: &[&str] = &[
    "w:pPr",
    "w:bookmarkStart",
    "w:bookmarkEnd",
    "w:proofErr",
    "w:commentRangeStart",
    "w:commentRangeEnd",
    "w:permStart",
    "w:permEnd",
];

/// Mutable view over one `w:p` element.
pub struct WmlParagraph<'a> {
    element: &'a mut XmlElement,
}

impl<'a> WmlParagraph<'a> {
    /// Wrap a `w:p` element.
    pub fn new(element: &'a mut XmlElement) -> Self {
        Self { element }
    }

    fn run_positions(&self) -> Vec<usize> {
        self.element.positions_of(W_R)
    }

    fn run(&self, index: usize) -> &XmlElement {
        let pos = self.run_positions()[index];
        match &self.element.children[pos] {
            XmlNode::Element(e) => e,
            _ => unreachable!("run position always points at an element"),
        }
    }

    fn run_mut(&mut self, index: usize) -> &mut XmlElement {
        let pos = self.run_positions()[index];
        match &mut self.element.children[pos] {
            XmlNode::Element(e) => e,
            _ => unreachable!("run position always points at an element"),
        }
    }
}

impl RunSequence for WmlParagraph<'_> {
    fn run_count(&self) -> usize {
        self.element.children_named(W_R).count()
    }

    fn run_text(&self, index: usize) -> String {
        run_text(self.run(index))
    }

    fn set_run_text(&mut self, index: usize, text: &str) {
        set_run_text(self.run_mut(index), text);
    }

    fn run_style(&self, index: usize) -> RunStyle {
        read_style(self.run(index))
    }

    fn set_run_style(&mut self, index: usize, style: &RunStyle) {
        write_style(self.run_mut(index), style);
    }

    fn insert_run(&mut self, index: usize, text: &str, style: &RunStyle) {
        // Directly after the preceding run, ahead of any bookmark that follows it.
        let positions = self.run_positions();
        let prev = index.checked_sub(1).and_then(|prev| positions.get(prev)).copied();
        let at = match prev {
            Some(pos) => pos + 1,
            None => positions
                .first()
                .copied()
                .unwrap_or(self.element.children.len()),
        };

        // A piece split off the preceding run takes its whole w:rPr,
        // including properties RunStyle does not model.
        let run = match prev.and_then(|pos| match &self.element.children[pos] {
            XmlNode::Element(e) if read_style(e) == *style => Some(e),
            _ => None,
        }) {
            Some(source) => {
                let mut run = XmlElement::new(W_R);
                if let Some(rpr) = source.child(W_RPR) {
                    run.push_child(rpr.clone());
                }
                set_run_text(&mut run, text);
                run
            }
            None => new_run(text, style),
        };
        self.element.children.insert(at, XmlNode::Element(run));
    }

    fn remove_run(&mut self, index: usize) {
        let pos = self.run_positions()[index];
        self.element.children.remove(pos);
    }

    fn push_run(&mut self, text: &str) {
        self.element.push_child(new_run(text, &RunStyle::default()));
    }

    fn run_groups(&self) -> Vec<Range<usize>> {
        let mut groups = Vec::new();
        let mut start = None;
        let mut index = 0;
        for child in self.element.elements() {
            if child.name == W_R {
                start.get_or_insert(index);
                index += 1;
            } else if !INVISIBLE_MARKERS.contains(&child.name.as_str()) {
                // Hyperlinks, fields, revisions and content controls.
                if let Some(start) = start.take() {
                    groups.push(start..index);
                }
            }
        }
        if let Some(start) = start {
            groups.push(start..index);
        }
        groups
    }

    fn replace_runs(&mut self, range: Range<usize>, text: &str) {
        let positions = self.run_positions();
        let at = positions
            .get(range.start)
            .copied()
            .unwrap_or(self.element.children.len());
        for index in range.rev() {
            self.element.children.remove(positions[index]);
        }
        self.element
            .children
            .insert(at, XmlNode::Element(new_run(text, &RunStyle::default())));
    }
}

/// Build a `w:r` element carrying `text` and `style`.
pub(crate) fn new_run(text: &str, style: &RunStyle) -> XmlElement {
    let mut run = XmlElement::new(W_R);
    write_style(&mut run, style);
    set_run_text(&mut run, text);
    run
}

/// Visible text of a `w:r` element.
pub(crate) fn run_text(run: &XmlElement) -> String {
    let mut text = String::new();
    for child in run.elements() {
        match child.name.as_str() {
            W_T => text.push_str(&child.text_content()),
            "w:tab" => text.push('\t'),
            "w:cr" => text.push('\n'),
            "w:br" if is_text_content(child) => text.push('\n'),
            "w:noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }
    text
}

/// Whether a run child contributes to [`run_text`].
fn is_text_content(child: &XmlElement) -> bool {
    match child.name.as_str() {
        W_T | "w:tab" | "w:cr" | "w:noBreakHyphen" => true,
        "w:br" => matches!(child.attr("w:type"), None | Some("textWrapping")),
        _ => false,
    }
}

/// Replace the text of a `w:r` element with `text`, keeping `w:rPr`.
///
/// Tabs and line feeds become `w:tab` and `w:br` so the text reads back
/// unchanged. Other content (page breaks, symbols, drawings, field
/// characters) stays in the run: what came before the first text node
/// stays ahead of the new text, everything else follows it.
pub(crate) fn set_run_text(run: &mut XmlElement, text: &str) {
    let mut properties = None;
    let mut leading = Vec::new();
    let mut trailing = Vec::new();
    let mut seen_text = false;
    for node in std::mem::take(&mut run.children) {
        match node {
            XmlNode::Element(e) if e.name == W_RPR => properties = Some(e),
            XmlNode::Element(e) if is_text_content(&e) => seen_text = true,
            other if seen_text => trailing.push(other),
            other => leading.push(other),
        }
    }
    if let Some(properties) = properties {
        run.children.push(XmlNode::Element(properties));
    }
    run.children.extend(leading);

    let mut pending = String::new();
    for ch in text.chars() {
        match ch {
            '\t' | '\n' => {
                flush_text(run, &mut pending);
                let name = if ch == '\t' { "w:tab" } else { "w:br" };
                run.push_child(XmlElement::new(name));
            }
            '\r' => {}
            _ => pending.push(ch),
        }
    }
    flush_text(run, &mut pending);
    run.children.extend(trailing);
}

fn flush_text(run: &mut XmlElement, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let text = std::mem::take(pending);
    let mut t = XmlElement::new(W_T);
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        t.set_attr("xml:space", "preserve");
    }
    run.push_child(t.with_text(text));
}

/// Read the direct formatting of a `w:r` element.
pub(crate) fn read_style(run: &XmlElement) -> RunStyle {
    let Some(rpr) = run.child(W_RPR) else {
        return RunStyle::default();
    };

    RunStyle {
        bold: rpr.child("w:b").map(on_off),
        italic: rpr.child("w:i").map(on_off),
        underline: rpr
            .child("w:u")
            .map(|u| Underline::from_wml(u.attr("w:val").unwrap_or("single"))),
        font_name: rpr
            .child("w:rFonts")
            .and_then(|f| f.attr("w:ascii").or_else(|| f.attr("w:hAnsi")))
            .map(str::to_string),
        font_size: rpr
            .child("w:sz")
            .and_then(|sz| sz.attr("w:val"))
            .and_then(|v| v.parse::<f32>().ok())
            .map(|half_points| half_points / 2.0),
        style_id: rpr
            .child("w:rStyle")
            .and_then(|s| s.attr("w:val"))
            .map(str::to_string),
        color: rpr
            .child("w:color")
            .and_then(|c| c.attr("w:val"))
            .map(str::to_string),
    }
}

fn on_off(element: &XmlElement) -> bool {
    !matches!(element.attr("w:val"), Some("0" | "false" | "off"))
}

/// Apply `style` to a `w:r` element, touching only fields that differ.
pub(crate) fn write_style(run: &mut XmlElement, style: &RunStyle) {
    let current = read_style(run);
    if current == *style {
        return;
    }

    if run.child(W_RPR).is_none() {
        run.children.insert(0, XmlNode::Element(XmlElement::new(W_RPR)));
    }
    let Some(rpr) = run.child_mut(W_RPR) else {
        return;
    };

    if current.style_id != style.style_id {
        set_property(rpr, "w:rStyle", style.style_id.as_deref().map(val_attr));
    }
    if current.font_name != style.font_name {
        set_property(
            rpr,
            "w:rFonts",
            style.font_name.as_deref().map(|name| {
                XmlElement::new("w:rFonts")
                    .with_attr("w:ascii", name)
                    .with_attr("w:hAnsi", name)
            }),
        );
    }
    if current.bold != style.bold {
        set_property(rpr, "w:b", style.bold.map(on_off_element));
    }
    if current.italic != style.italic {
        set_property(rpr, "w:i", style.italic.map(on_off_element));
    }
    if current.color != style.color {
        set_property(rpr, "w:color", style.color.as_deref().map(val_attr));
    }
    if current.font_size != style.font_size {
        set_property(
            rpr,
            "w:sz",
            style
                .font_size
                .map(|pt| val_attr(&half_points(pt).to_string())),
        );
    }
    if current.underline != style.underline {
        set_property(rpr, "w:u", style.underline.as_ref().map(|u| val_attr(u.as_wml())));
    }

    if rpr.children.is_empty() {
        run.remove_children_named(W_RPR);
    }
}

/// Convert points to WordprocessingML half points.
pub(crate) fn half_points(pt: f32) -> u32 {
    (pt * 2.0).round().max(0.0) as u32
}

fn val_attr(value: &str) -> XmlElement {
    XmlElement::new("").with_attr("w:val", value)
}

fn on_off_element(value: bool) -> XmlElement {
    let element = XmlElement::new("");
    if value {
        element
    } else {
        element.with_attr("w:val", "0")
    }
}

/// Set, replace or remove one `w:rPr` property, keeping schema order.
fn set_property(rpr: &mut XmlElement, name: &str, value: Option<XmlElement>) {
    let Some(mut element) = value else {
        rpr.remove_children_named(name);
        return;
    };
    element.name = name.to_string();

    if name == "w:rFonts" {
        // Keep east-asian and complex-script font slots already present.
        if let Some(existing) = rpr.child(name) {
            for (key, value) in &existing.attributes {
                if element.attr(key).is_none() && key != "w:asciiTheme" && key != "w:hAnsiTheme" {
                    element.attributes.push((key.clone(), value.clone()));
                }
            }
        }
    }

    if let Some(existing) = rpr.child_mut(name) {
        *existing = element;
        return;
    }

    let rank = rank_of(name);
    let at = rpr
        .children
        .iter()
        .position(|n| matches!(n, XmlNode::Element(e) if rank_of(&e.name) > rank))
        .unwrap_or(rpr.children.len());
    rpr.children.insert(at, XmlNode::Element(element));
}

fn rank_of(name: &str) -> usize {
    RPR_ORDER
        .iter()
        .position(|n| *n == name)
        .unwrap_or(RPR_ORDER.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::xml::XmlDocument;

    fn paragraph(xml: &str) -> XmlElement {
        XmlDocument::parse(xml.as_bytes()).unwrap().root
    }

    #[test]
    fn test_run_text_and_style() {
        let mut p = paragraph(
            r#"<w:p><w:pPr/><w:r><w:rPr><w:b/><w:sz w:val="24"/><w:rFonts w:ascii="Times New Roman"/></w:rPr><w:t>Hello</w:t><w:tab/><w:t xml:space="preserve"> world</w:t></w:r></w:p>"#,
        );
        let view = WmlParagraph::new(&mut p);

        assert_eq!(view.run_count(), 1);
        assert_eq!(view.run_text(0), "Hello\t world");
        let style = view.run_style(0);
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.font_size, Some(12.0));
        assert_eq!(style.font_name.as_deref(), Some("Times New Roman"));
        assert_eq!(style.italic, None);
    }

    #[test]
    fn test_bold_off_value() {
        let p = paragraph(r#"<w:p><w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t>x</w:t></w:r></w:p>"#);
        let run = p.child(W_R).unwrap();
        assert_eq!(read_style(run).bold, Some(false));
    }

    #[test]
    fn test_set_run_text_keeps_properties() {
        let mut p = paragraph(
            r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>old</w:t></w:r></w:p>"#,
        );
        let mut view = WmlParagraph::new(&mut p);
        view.set_run_text(0, " a\tb ");

        assert_eq!(view.run_text(0), " a\tb ");
        assert_eq!(view.run_style(0).italic, Some(true));

        let run = p.child(W_R).unwrap();
        let first_t = run.child(W_T).unwrap();
        assert_eq!(first_t.attr("xml:space"), Some("preserve"));
    }

    #[test]
    fn test_set_run_text_keeps_non_text_content() {
        let mut p = paragraph(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:lastRenderedPageBreak/><w:t>Draft</w:t><w:br w:type="page"/><w:t>x</w:t><w:sym w:char="F0E0"/></w:r></w:p>"#,
        );
        let mut view = WmlParagraph::new(&mut p);
        view.set_run_text(0, "Final\ty");
        assert_eq!(view.run_text(0), "Final\ty");

        let names: Vec<_> = p
            .child(W_R)
            .unwrap()
            .elements()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["w:rPr", "w:lastRenderedPageBreak", "w:t", "w:tab", "w:t", "w:br", "w:sym"]
        );
    }

    #[test]
    fn test_insert_and_remove_runs_around_other_content() {
        let mut p = paragraph(
            r#"<w:p><w:pPr/><w:r><w:t>a</w:t></w:r><w:bookmarkStart w:id="0"/><w:r><w:t>c</w:t></w:r></w:p>"#,
        );
        let mut view = WmlParagraph::new(&mut p);
        let bold = RunStyle::new().with_bold(true);

        view.insert_run(1, "b", &bold);
        view.insert_run(3, "d", &RunStyle::default());
        assert_eq!(view.text(), "abcd");
        assert_eq!(view.run_style(1), bold);

        view.remove_run(0);
        assert_eq!(view.text(), "bcd");

        view.clear_runs();
        assert_eq!(view.run_count(), 0);
        assert!(p.child("w:pPr").is_some());
        assert!(p.child("w:bookmarkStart").is_some());
    }

    #[test]
    fn test_run_groups_break_at_content() {
        let mut p = paragraph(
            r#"<w:p><w:pPr/><w:r><w:t>a</w:t></w:r><w:bookmarkStart w:id="0"/><w:proofErr/><w:r><w:t>b</w:t></w:r><w:hyperlink><w:r><w:t>L</w:t></w:r></w:hyperlink><w:r><w:t>c</w:t></w:r><w:ins><w:r><w:t>i</w:t></w:r></w:ins></w:p>"#,
        );
        let view = WmlParagraph::new(&mut p);
        assert_eq!(view.run_groups(), vec![0..2, 2..3]);

        let mut empty = paragraph("<w:p><w:pPr/></w:p>");
        assert!(WmlParagraph::new(&mut empty).run_groups().is_empty());
    }

    #[test]
    fn test_replace_runs_in_place() {
        let mut p = paragraph(
            r#"<w:p><w:r><w:t>x</w:t></w:r><w:hyperlink><w:r><w:t>L</w:t></w:r></w:hyperlink><w:r><w:rPr><w:b/></w:rPr><w:t>D</w:t></w:r><w:r><w:t>raft</w:t></w:r><w:bookmarkEnd w:id="0"/></w:p>"#,
        );
        let mut view = WmlParagraph::new(&mut p);
        view.replace_runs(1..3, "Final");
        assert_eq!(view.text(), "xFinal");

        let names: Vec<_> = p.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:r", "w:hyperlink", "w:r", "w:bookmarkEnd"]);
        let last = p.children_named(W_R).last().unwrap();
        assert!(last.child(W_RPR).is_none());
    }

    #[test]
    fn test_insert_into_empty_paragraph() {
        let mut p = paragraph("<w:p><w:pPr/></w:p>");
        let mut view = WmlParagraph::new(&mut p);
        view.insert_run(0, "x", &RunStyle::default());
        view.push_run("y");
        assert_eq!(view.text(), "xy");
    }

    #[test]
    fn test_write_style_respects_schema_order() {
        let mut run = new_run("x", &RunStyle::default());
        assert!(run.child(W_RPR).is_none());

        let style = RunStyle::new()
            .with_underline(Underline::Double)
            .with_bold(true)
            .with_font("Calibri", 11.0)
            .with_style_id("Strong");
        write_style(&mut run, &style);

        let names: Vec<_> = run
            .child(W_RPR)
            .unwrap()
            .elements()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(names, vec!["w:rStyle", "w:rFonts", "w:b", "w:sz", "w:u"]);
        assert_eq!(read_style(&run), style);
    }

    #[test]
    fn test_write_style_preserves_unmanaged_properties() {
        let mut p = paragraph(
            r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Arial" w:eastAsia="MS Mincho"/><w:highlight w:val="yellow"/></w:rPr><w:t>x</w:t></w:r></w:p>"#,
        );
        let mut view = WmlParagraph::new(&mut p);
        let mut style = view.run_style(0);
        style.font_name = Some("Calibri".to_string());
        style.font_size = Some(8.0);
        view.set_run_style(0, &style);

        let rpr = p.child(W_R).unwrap().child(W_RPR).unwrap();
        let fonts = rpr.child("w:rFonts").unwrap();
        assert_eq!(fonts.attr("w:ascii"), Some("Calibri"));
        assert_eq!(fonts.attr("w:hAnsi"), Some("Calibri"));
        assert_eq!(fonts.attr("w:eastAsia"), Some("MS Mincho"));
        assert_eq!(rpr.child("w:sz").unwrap().attr("w:val"), Some("16"));
        assert!(rpr.child("w:highlight").is_some());

        let names: Vec<_> = rpr.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:rFonts", "w:sz", "w:highlight"]);
    }

    #[test]
    fn test_half_points() {
        assert_eq!(half_points(12.0), 24);
        assert_eq!(half_points(10.5), 21);
        assert_eq!(half_points(8.0), 16);
    }

    #[test]
    fn test_inserted_piece_copies_full_run_properties() {
        let mut p = paragraph(
            r#"<w:p><w:r><w:rPr><w:b/><w:highlight w:val="yellow"/></w:rPr><w:t>ab</w:t></w:r></w:p>"#,
        );
        let mut view = WmlParagraph::new(&mut p);
        let style = view.run_style(0);
        view.set_run_text(0, "a");
        view.insert_run(1, "b", &style);

        let runs: Vec<_> = p.children_named(W_R).collect();
        assert_eq!(runs.len(), 2);
        let rpr = runs[1].child(W_RPR).unwrap();
        assert!(rpr.child("w:b").is_some());
        assert_eq!(rpr.child("w:highlight").unwrap().attr("w:val"), Some("yellow"));
    }
}
