use unicode_width::UnicodeWidthStr;

const ROWS: usize = 5;

// 3x5 block glyphs for 0-9 and ':'
const GLYPHS: [[&str; ROWS]; 11] = [
    ["███", "█ █", "█ █", "█ █", "███"],
    ["  █", "  █", "  █", "  █", "  █"],
    ["███", "  █", "███", "█  ", "███"],
    ["███", "  █", "███", "  █", "███"],
    ["█ █", "█ █", "███", "  █", "  █"],
    ["███", "█  ", "███", "  █", "███"],
    ["███", "█  ", "███", "█ █", "███"],
    ["███", "  █", "  █", "  █", "  █"],
    ["███", "█ █", "███", "█ █", "███"],
    ["███", "█ █", "███", "  █", "███"],
    ["   ", " █ ", "   ", " █ ", "   "],
];

fn glyph(c: char) -> Option<&'static [&'static str; ROWS]> {
    match c {
        '0'..='9' => GLYPHS.get(c as usize - '0' as usize),
        ':' => GLYPHS.get(10),
        _ => None,
    }
}

/// Renders digits and colons as five rows of block characters. Other
/// characters are skipped.
pub fn big_lines(text: &str) -> Vec<String> {
    let glyphs: Vec<_> = text.chars().filter_map(glyph).collect();
    (0..ROWS)
        .map(|row| {
            glyphs
                .iter()
                .map(|g| g[row])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Display width of the widest rendered row
pub fn big_width(lines: &[String]) -> usize {
    lines.iter().map(|l| l.width()).max().unwrap_or(0)
}

pub fn big_height() -> u16 {
    ROWS as u16
}
