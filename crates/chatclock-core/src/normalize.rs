//! Line canonicalization applied before timestamp matching.
//!
//! Exports produced on phones with a non-Latin locale write timestamps in
//! the locale's digit script, and most exports sprinkle directional marks
//! and narrow no-break spaces around the time. Both are folded to plain
//! ASCII here so the line grammar only has to deal with one shape.

/// Zero points of the digit blocks folded to ASCII.
const DIGIT_BLOCKS: [u32; 5] = [
    0x0660, // Arabic-Indic
    0x06F0, // Extended Arabic-Indic (Persian, Urdu)
    0x0966, // Devanagari
    0x09E6, // Bengali
    0xFF10, // Fullwidth
];

/// Directional marks and non-standard spaces replaced by `' '`.
const SPACE_LIKE: [char; 18] = [
    '\u{00A0}', // no-break space
    '\u{2007}', // figure space
    '\u{2009}', // thin space
    '\u{200A}', // hair space
    '\u{202F}', // narrow no-break space
    '\u{200E}', // left-to-right mark
    '\u{200F}', // right-to-left mark
    '\u{061C}', // arabic letter mark
    '\u{202A}',
    '\u{202B}',
    '\u{202C}',
    '\u{202D}',
    '\u{202E}',
    '\u{2066}',
    '\u{2067}',
    '\u{2068}',
    '\u{2069}',
    '\u{FEFF}', // byte order mark
];

fn ascii_digit(c: char) -> Option<char> {
    let code = c as u32;
    DIGIT_BLOCKS
        .iter()
        .find(|&&zero| (zero..zero + 10).contains(&code))
        .and_then(|&zero| char::from_digit(code - zero, 10))
}

fn normalize_char(c: char) -> char {
    if let Some(digit) = ascii_digit(c) {
        return digit;
    }
    match c {
        '\u{066B}' => '.',              // arabic decimal separator
        '\u{066C}' | '\u{060C}' => ',', // arabic thousands separator, arabic comma
        c if SPACE_LIKE.contains(&c) => ' ',
        c => c,
    }
}

/// Fold alternate digits and separators to ASCII and invisible/narrow
/// spaces to `' '`. Everything else passes through unchanged.
pub fn normalize_line(line: &str) -> String {
    line.chars().map(normalize_char).collect()
}
