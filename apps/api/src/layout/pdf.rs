//! Minimal single-page PDF 1.4 writer for a computed `PageLayout`.
//!
//! Object layout is fixed:
//! ```text
//! 1 Catalog   2 Pages   3 Page   4..=6 Type1 fonts (F1 F2 F3)   7 content stream
//! ```
//! Text uses the base-14 Helvetica faces with WinAnsiEncoding, so no font data
//! is embedded. Bytes above 0x7E are written as octal escapes and the file body
//! stays 7-bit clean apart from the binary marker comment.

use std::fmt::Write as _;

use crate::layout::engine::PageLayout;
use crate::layout::font_metrics::FontFace;

const FONT_OBJECT_BASE: usize = 4;
const CONTENT_OBJECT: usize = 7;
const OBJECT_COUNT: usize = 7;

/// Stroke width of the section divider rules.
const RULE_WIDTH_PT: f32 = 0.5;

/// Serializes `layout` into a complete PDF document.
pub fn write_pdf(layout: &PageLayout) -> Vec<u8> {
    let content = content_stream(layout);

    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let mut offsets = Vec::with_capacity(OBJECT_COUNT);

    let mut objects: Vec<Vec<u8>> = Vec::with_capacity(OBJECT_COUNT);
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    objects.push(b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec());

    let mut fonts = String::new();
    for (i, face) in FontFace::ALL.iter().enumerate() {
        let _ = write!(fonts, "/{} {} 0 R ", face.resource_name(), FONT_OBJECT_BASE + i);
    }
    objects.push(
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << {}>> >> /Contents {} 0 R >>",
            num(layout.width),
            num(layout.height),
            fonts,
            CONTENT_OBJECT
        )
        .into_bytes(),
    );

    for face in FontFace::ALL {
        objects.push(
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                face.base_font()
            )
            .into_bytes(),
        );
    }

    let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
    stream.extend_from_slice(&content);
    stream.extend_from_slice(b"\nendstream");
    objects.push(stream);

    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", OBJECT_COUNT + 1);
    for offset in &offsets {
        let _ = write!(xref, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        OBJECT_COUNT + 1,
        xref_offset
    );
    out.extend_from_slice(xref.as_bytes());
    out
}

fn content_stream(layout: &PageLayout) -> Vec<u8> {
    let mut ops: Vec<u8> = Vec::new();

    if !layout.rules.is_empty() {
        ops.extend_from_slice(format!("{} w\n", num(RULE_WIDTH_PT)).as_bytes());
        for rule in &layout.rules {
            ops.extend_from_slice(
                format!(
                    "{} {} m {} {} l S\n",
                    num(rule.x1),
                    num(rule.y),
                    num(rule.x2),
                    num(rule.y)
                )
                .as_bytes(),
            );
        }
    }

    for line in &layout.lines {
        for run in &line.runs {
            ops.extend_from_slice(
                format!(
                    "BT /{} {} Tf {} {} Td (",
                    run.face.resource_name(),
                    num(run.size),
                    num(run.x),
                    num(line.y)
                )
                .as_bytes(),
            );
            ops.extend_from_slice(&escape_text(&run.text));
            ops.extend_from_slice(b") Tj ET\n");
        }
    }
    ops
}

/// Encodes `text` as the body of a PDF literal string in WinAnsiEncoding.
pub fn escape_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            ' '..='~' => out.push(c as u8),
            _ => {
                let byte = win_ansi_byte(c).unwrap_or(b'?');
                if byte.is_ascii() {
                    out.push(byte);
                } else {
                    out.extend_from_slice(format!("\\{byte:03o}").as_bytes());
                }
            }
        }
    }
    out
}

/// Maps a character outside printable ASCII to its WinAnsiEncoding code.
fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        '\t' | '\n' | '\r' => b' ',
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        _ => return None,
    };
    Some(byte)
}

/// Formats a coordinate with at most two decimals.
fn num(value: f32) -> String {
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::engine::{PlacedLine, Rule, TextRun};

    fn sample_layout() -> PageLayout {
        PageLayout {
            width: 612.0,
            height: 792.0,
            lines: vec![
                PlacedLine {
                    y: 742.0,
                    runs: vec![TextRun {
                        x: 250.5,
                        text: "Jane Doe".to_string(),
                        face: FontFace::Bold,
                        size: 18.0,
                    }],
                },
                PlacedLine {
                    y: 700.0,
                    runs: vec![
                        TextRun {
                            x: 50.0,
                            text: "Engineer, Acme (R&D), ".to_string(),
                            face: FontFace::Bold,
                            size: 10.0,
                        },
                        TextRun {
                            x: 160.25,
                            text: "Jan 2020 – Present".to_string(),
                            face: FontFace::Oblique,
                            size: 10.0,
                        },
                    ],
                },
            ],
            rules: vec![Rule {
                y: 716.0,
                x1: 50.0,
                x2: 562.0,
            }],
            final_cursor: 687.0,
            overflowed: false,
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn startxref(pdf: &[u8]) -> usize {
        let text = String::from_utf8_lossy(pdf);
        let tail = text.rsplit("startxref\n").next().unwrap();
        tail.lines().next().unwrap().trim().parse().unwrap()
    }

    #[test]
    fn test_document_framing() {
        let pdf = write_pdf(&sample_layout());
        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert!(find(&pdf, b"/MediaBox [0 0 612 792]").is_some());
        assert!(find(&pdf, b"/BaseFont /Helvetica-Oblique").is_some());
    }

    #[test]
    fn test_startxref_points_at_xref_table() {
        let pdf = write_pdf(&sample_layout());
        let offset = startxref(&pdf);
        assert!(pdf[offset..].starts_with(b"xref\n0 8\n"));
    }

    #[test]
    fn test_xref_entries_point_at_objects() {
        let pdf = write_pdf(&sample_layout());
        let xref = startxref(&pdf);
        let table = String::from_utf8_lossy(&pdf[xref..]).to_string();
        let entries: Vec<&str> = table.lines().skip(3).take(OBJECT_COUNT).collect();
        assert_eq!(entries.len(), OBJECT_COUNT);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.len(), 19, "entry {entry:?} must be 20 bytes with LF");
            let offset: usize = entry[..10].parse().unwrap();
            let header = format!("{} 0 obj\n", i + 1);
            assert!(pdf[offset..].starts_with(header.as_bytes()), "object {}", i + 1);
        }
    }

    #[test]
    fn test_stream_length_matches_content() {
        let layout = sample_layout();
        let pdf = write_pdf(&layout);
        let content = content_stream(&layout);
        let declared = format!("<< /Length {} >>\nstream\n", content.len());
        let start = find(&pdf, declared.as_bytes()).unwrap() + declared.len();
        assert_eq!(&pdf[start..start + content.len()], content.as_slice());
        assert!(pdf[start + content.len()..].starts_with(b"\nendstream"));
    }

    #[test]
    fn test_runs_and_rules_are_drawn() {
        let pdf = write_pdf(&sample_layout());
        assert!(find(&pdf, b"BT /F2 18 Tf 250.5 742 Td (Jane Doe) Tj ET").is_some());
        assert!(find(&pdf, b"BT /F3 10 Tf 160.25 700 Td (Jan 2020 \\226 Present) Tj ET").is_some());
        assert!(find(&pdf, b"50 716 m 562 716 l S").is_some());
    }

    #[test]
    fn test_escape_text_handles_delimiters_and_win_ansi() {
        assert_eq!(escape_text("a(b)c\\"), b"a\\(b\\)c\\\\".to_vec());
        assert_eq!(escape_text("x • y"), b"x \\225 y".to_vec());
        assert_eq!(escape_text("café"), b"caf\\351".to_vec());
        assert_eq!(escape_text("日本"), b"??".to_vec());
    }

    #[test]
    fn test_num_trims_trailing_zeros() {
        assert_eq!(num(50.0), "50");
        assert_eq!(num(160.25), "160.25");
        assert_eq!(num(12.5), "12.5");
        assert_eq!(num(-0.001), "0");
    }
}
