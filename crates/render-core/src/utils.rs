/// Encodes text for a WinAnsi (Latin-1 range) standard font.
///
/// Characters outside the single-byte range become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2022}' => 0x95,
            '\u{20AC}' => 0x80,
            c if (c as u32) <= 0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_passes_through() {
        assert_eq!(to_win_ansi("Município"), vec![b'M', b'u', b'n', b'i', b'c', 0xED, b'p', b'i', b'o']);
        assert_eq!(to_win_ansi("© 2025"), vec![0xA9, b' ', b'2', b'0', b'2', b'5']);
    }

    #[test]
    fn test_special_and_unmappable() {
        assert_eq!(to_win_ansi("€ – 漢"), vec![0x80, b' ', 0x96, b' ', b'?']);
    }
}
