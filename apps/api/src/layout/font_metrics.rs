//! Static font-metric tables for the three base-14 faces the CV uses.
//!
//! Widths are in em units (relative to font size), taken from the Adobe AFM files
//! for Helvetica and Helvetica-Bold. Helvetica-Oblique shares the upright widths.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font faces
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    Regular,
    Bold,
    Oblique,
}

impl FontFace {
    /// PostScript name used in the PDF font dictionary.
    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
            FontFace::Oblique => "Helvetica-Oblique",
        }
    }

    /// Resource name inside the page's font dictionary.
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
            FontFace::Oblique => "F3",
        }
    }

    pub const ALL: [FontFace; 3] = [FontFace::Regular, FontFace::Bold, FontFace::Oblique];
}

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

/// Geometry and typography of the single CV page. All lengths are in PostScript points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    /// Applied on all four sides.
    pub margin_pt: f32,
    pub name_size_pt: f32,
    pub heading_size_pt: f32,
    pub body_size_pt: f32,
    /// Advance after the name line.
    pub title_line_height_pt: f32,
    /// Advance after every body line.
    pub line_height_pt: f32,
    /// Advance from a section heading to its first body line.
    pub heading_advance_pt: f32,
    /// Total advance of a section with no body lines. The space left after a
    /// non-empty section body is `section_gap_pt - heading_advance_pt`.
    pub section_gap_pt: f32,
    /// Extra advance after each project.
    pub entry_gap_pt: f32,
    /// Left indent of work-experience descriptions.
    pub indent_pt: f32,
    /// Distance from a heading baseline down to its divider rule.
    pub rule_drop_pt: f32,
    /// Empirical average glyph width as a fraction of font size, used to turn
    /// the content width into a wrap width in characters.
    pub glyph_width_factor: f32,
}

/// US letter (612 × 792pt), 50pt margins, 10pt body text.
pub fn default_page_config(glyph_width_factor: f32) -> PageConfig {
    PageConfig {
        page_width_pt: 612.0,
        page_height_pt: 792.0,
        margin_pt: 50.0,
        name_size_pt: 18.0,
        heading_size_pt: 12.0,
        body_size_pt: 10.0,
        title_line_height_pt: 22.0,
        line_height_pt: 13.0,
        heading_advance_pt: 16.0,
        section_gap_pt: 24.0,
        entry_gap_pt: 4.0,
        indent_pt: 12.0,
        rule_drop_pt: 4.0,
        glyph_width_factor,
    }
}

impl PageConfig {
    pub fn content_width_pt(&self) -> f32 {
        self.page_width_pt - 2.0 * self.margin_pt
    }

    /// Characters per line for body text starting `indent_pt` right of the margin.
    pub fn wrap_width_chars(&self, indent_pt: f32) -> usize {
        let glyph = self.body_size_pt * self.glyph_width_factor;
        let usable = (self.content_width_pt() - indent_pt).max(0.0);
        ((usable / glyph).floor() as usize).max(1)
    }

    /// Checks the invariants the layout relies on for strictly descending lines.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.glyph_width_factor > 0.0) {
            return Err("glyph_width_factor must be positive".to_string());
        }
        if !(self.line_height_pt > 0.0 && self.title_line_height_pt > 0.0) {
            return Err("line heights must be positive".to_string());
        }
        if !(self.heading_advance_pt > self.rule_drop_pt && self.rule_drop_pt > 0.0) {
            return Err("heading_advance_pt must exceed rule_drop_pt > 0".to_string());
        }
        if !(self.section_gap_pt > self.heading_advance_pt) {
            return Err("section_gap_pt must exceed heading_advance_pt".to_string());
        }
        if self.entry_gap_pt < 0.0 || self.indent_pt < 0.0 {
            return Err("entry_gap_pt and indent_pt cannot be negative".to_string());
        }
        if self.content_width_pt() <= self.indent_pt {
            return Err("margins leave no room for text".to_string());
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font face.
///
/// `widths[i]` = width of ASCII character `(i + 32)`, covering 0x20 (space) through 0x7E (~).
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for characters outside ASCII without an explicit entry.
    pub average_char_width: f32,
    pub en_dash_width: f32,
    pub bullet_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    match c {
                        '–' => self.en_dash_width,
                        '•' => self.bullet_width,
                        _ => self.average_char_width,
                    }
                }
            })
            .sum()
    }

    /// Rendered width in points at `size_pt`.
    pub fn width_pt(&self, s: &str, size_pt: f32) -> f32 {
        self.measure_str(s) * size_pt
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    en_dash_width: 0.556,
    bullet_width: 0.350,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    en_dash_width: 0.556,
    bullet_width: 0.350,
};

/// Returns the static metric table for a face.
pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Regular | FontFace::Oblique => &HELVETICA_TABLE,
        FontFace::Bold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(get_metrics(FontFace::Regular).measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        // "Rust" = R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = get_metrics(FontFace::Regular).measure_str("Rust");
        assert!((width - 2.056).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let text = "Senior Engineer, Acme, ";
        assert!(
            get_metrics(FontFace::Bold).measure_str(text)
                > get_metrics(FontFace::Regular).measure_str(text)
        );
    }

    #[test]
    fn test_separators_have_explicit_widths() {
        let metrics = get_metrics(FontFace::Regular);
        assert!((metrics.measure_str("–") - 0.556).abs() < 1e-4);
        assert!((metrics.measure_str("•") - 0.350).abs() < 1e-4);
        assert!((metrics.measure_str("é") - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_width_pt_scales_with_size() {
        let metrics = get_metrics(FontFace::Regular);
        let at_10 = metrics.width_pt("Profile", 10.0);
        let at_20 = metrics.width_pt("Profile", 20.0);
        assert!((at_20 - 2.0 * at_10).abs() < 1e-3);
    }

    #[test]
    fn test_wrap_width_from_glyph_factor() {
        // (612 - 100) / (10 * 0.5) = 102.4 → 102 chars
        let config = default_page_config(0.5);
        assert_eq!(config.wrap_width_chars(0.0), 102);
        // indent 12pt → 500 / 5 = 100
        assert_eq!(config.wrap_width_chars(12.0), 100);
    }

    #[test]
    fn test_default_page_config_is_valid() {
        assert!(default_page_config(0.5).validate().is_ok());
    }

    #[test]
    fn test_non_positive_glyph_factor_is_invalid() {
        assert!(default_page_config(0.0).validate().is_err());
        assert!(default_page_config(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_section_gap_must_exceed_heading_advance() {
        let mut config = default_page_config(0.5);
        config.section_gap_pt = config.heading_advance_pt;
        assert!(config.validate().is_err());
    }
}
