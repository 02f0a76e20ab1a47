//! CP866 encoding utilities for Cyrillic thermal printers
//!
//! Receipts mix Russian (Cyrillic) and Uzbek (Latin) text. Most cheap
//! 80mm printers ship with code page 866 on slot 17, so text is converted
//! from UTF-8 to CP866 right before it goes on the wire.
//!
//! Every CP866 character is exactly one byte, so the printed width of a
//! string equals its character count after normalization.

use tracing::instrument;

/// ESC t n - select character code table (17 = PC866 Cyrillic #2)
const SELECT_CP866: [u8; 3] = [0x1B, 0x74, 17];

/// Replace characters CP866 cannot represent with a printable fallback
fn normalize_char(c: char) -> char {
    match c {
        // Uzbek Latin okina/tutuq belgisi and typographic quotes
        'ʻ' | 'ʼ' | '‘' | '’' | '`' => '\'',
        '“' | '”' | '«' | '»' => '"',
        '–' | '—' => '-',
        'Ў' => 'У',
        'ў' => 'у',
        'Қ' => 'К',
        'қ' => 'к',
        'Ғ' => 'Г',
        'ғ' => 'г',
        'Ҳ' => 'Х',
        'ҳ' => 'х',
        _ => c,
    }
}

/// Printed width of a string in CP866 cells
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Truncate a string to fit within `max_width` printed cells
pub fn truncate_text(s: &str, max_width: usize) -> String {
    s.chars().take(max_width).collect()
}

/// Pad a string to a specific printed width
///
/// If the string is longer than the width, it will be truncated.
pub fn pad_text(s: &str, width: usize, align_right: bool) -> String {
    let current_width = text_width(s);
    if current_width >= width {
        return truncate_text(s, width);
    }
    let spaces = width - current_width;
    if align_right {
        format!("{}{}", " ".repeat(spaces), s)
    } else {
        format!("{}{}", s, " ".repeat(spaces))
    }
}

/// Convert mixed UTF-8 content (with ESC/POS commands) to CP866
///
/// ASCII bytes (0x00-0x7F) are passed through untouched so ESC/POS
/// commands survive. Runs of non-ASCII bytes are decoded as UTF-8 and
/// re-encoded one character at a time; anything unmappable prints as `?`.
///
/// The code table is selected at the start and again after every INIT
/// (ESC @), because INIT resets it.
#[instrument(skip(bytes))]
pub fn convert_to_cp866(bytes: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(bytes.len() + 8);
    result.extend_from_slice(&SELECT_CP866);

    let mut buffer = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b == 0x1B && i + 1 < bytes.len() && bytes[i + 1] == 0x40 {
            flush_buffer(&mut buffer, &mut result);
            result.extend_from_slice(&[0x1B, 0x40]);
            result.extend_from_slice(&SELECT_CP866);
            i += 2;
            continue;
        }

        if b < 128 {
            flush_buffer(&mut buffer, &mut result);
            result.push(b);
        } else {
            buffer.push(b);
        }
        i += 1;
    }

    flush_buffer(&mut buffer, &mut result);
    result
}

/// Flush the non-ASCII buffer, converting UTF-8 to CP866
fn flush_buffer(buffer: &mut Vec<u8>, result: &mut Vec<u8>) {
    if buffer.is_empty() {
        return;
    }

    let s = String::from_utf8_lossy(buffer);
    let mut tmp = [0u8; 4];
    for c in s.chars().map(normalize_char) {
        let (encoded, _, had_errors) = encoding_rs::IBM866.encode(c.encode_utf8(&mut tmp));
        if had_errors || encoded.len() != 1 {
            result.push(b'?');
        } else {
            result.extend_from_slice(&encoded);
        }
    }
    buffer.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("hello"), 5);
        assert_eq!(text_width("Чай"), 3);
        assert_eq!(text_width("Lagʻmon"), 7);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello world", 5), "hello");
        assert_eq!(truncate_text("Шашлык", 4), "Шашл");
    }

    #[test]
    fn test_pad_text() {
        assert_eq!(pad_text("hi", 5, false), "hi   ");
        assert_eq!(pad_text("hi", 5, true), "   hi");
        assert_eq!(pad_text("hello world", 5, false), "hello");
    }

    #[test]
    fn test_convert_preserves_commands_and_encodes_cyrillic() {
        let mut input = vec![0x1B, 0x40];
        input.extend_from_slice("Чай".as_bytes());
        let out = convert_to_cp866(&input);

        assert_eq!(&out[..3], &SELECT_CP866);
        assert_eq!(&out[3..5], &[0x1B, 0x40]);
        assert_eq!(&out[5..8], &SELECT_CP866);
        // Ч = 0x97, а = 0xA0, й = 0xA9 in CP866
        assert_eq!(&out[8..], &[0x97, 0xA0, 0xA9]);
    }

    #[test]
    fn test_unmappable_becomes_question_mark() {
        let out = convert_to_cp866("€".as_bytes());
        assert_eq!(&out[3..], b"?");
    }

    #[test]
    fn test_uzbek_apostrophe_normalized() {
        let out = convert_to_cp866("oʻ".as_bytes());
        assert_eq!(&out[3..], b"o'");
    }
}
