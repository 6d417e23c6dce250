//! Text measurement for the standard Helvetica faces.
//!
//! Widths come from the Adobe Helvetica / Helvetica-Bold AFM files, in units
//! of 1/1000 em. Accented Latin-1 letters share the width of their base
//! letter, which holds for every glyph the report uses.

use acs_report_types::Font;

const FIRST_CHAR: u32 = 32;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn base_letter(c: char) -> Option<char> {
    let base = match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    };
    Some(base)
}

/// Advance width of one character in 1/1000 em.
pub fn char_width(c: char, font: Font) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
    };
    let lookup = |ch: char| {
        let code = ch as u32;
        (FIRST_CHAR..FIRST_CHAR + table.len() as u32)
            .contains(&code)
            .then(|| table[(code - FIRST_CHAR) as usize])
    };

    if let Some(w) = lookup(c) {
        return w;
    }
    if let Some(w) = base_letter(c).and_then(lookup) {
        return w;
    }
    match c {
        '©' | '®' => 737,
        'º' => 365,
        'ª' => 370,
        '°' => 400,
        '\u{a0}' => 278,
        _ => 556,
    }
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c, font) as u32).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap. A word wider than `max_width` gets a line of its own.
pub fn wrap_text(text: &str, max_width: f32, font: Font, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if text_width(&candidate, font, size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wraps and keeps at most `max_lines`, marking a cut with a trailing ellipsis.
pub fn wrap_text_limited(text: &str, max_width: f32, font: Font, size: f32, max_lines: usize) -> Vec<String> {
    let mut lines = wrap_text(text, max_width, font, size);
    if max_lines > 0 && lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push_str("...");
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        assert_eq!(char_width('A', Font::Regular), 667);
        assert_eq!(char_width('A', Font::Bold), 722);
        assert_eq!(char_width(' ', Font::Regular), 278);
        assert_eq!(char_width('~', Font::Bold), 584);
    }

    #[test]
    fn test_accented_letters_use_base_width() {
        assert_eq!(char_width('ç', Font::Regular), char_width('c', Font::Regular));
        assert_eq!(char_width('Ã', Font::Bold), char_width('A', Font::Bold));
        assert_eq!(char_width('º', Font::Regular), 365);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let w10 = text_width("Hello", Font::Regular, 10.0);
        let w20 = text_width("Hello", Font::Regular, 20.0);
        assert!((w20 - 2.0 * w10).abs() < 1e-4);
        // H(722) e(556) l(222) l(222) o(556) = 2278
        assert!((w10 - 22.78).abs() < 1e-3);
        assert_eq!(text_width("", Font::Bold, 12.0), 0.0);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "O municipio deve manter o envio regular das informacoes de producao";
        let lines = wrap_text(text, 120.0, Font::Regular, 10.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::Regular, 10.0) <= 120.0);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_long_word_gets_its_own_line() {
        let lines = wrap_text("a supercalifragilistic b", 30.0, Font::Regular, 10.0);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_wrap_limited_marks_truncation() {
        let lines = wrap_text_limited("one two three four five six", 30.0, Font::Regular, 10.0, 2);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("..."));
        assert!(wrap_text("   ", 100.0, Font::Regular, 10.0).is_empty());
    }
}
