//! Text shaping for the display: character encoding, line wrapping and row layout.

/// ROM code of the degree sign in the A00 character set.
pub const DEGREE_GLYPH: u8 = 0xDF;
/// Substitute for characters the controller ROM cannot show.
pub const REPLACEMENT: u8 = b'?';

/// Maps a Unicode scalar onto a controller character code.
pub fn encode_char(c: char) -> u8 {
    match c {
        '°' => DEGREE_GLYPH,
        c if c.is_ascii() => c as u8,
        _ => REPLACEMENT,
    }
}

/// Splits `text` for a display `columns` wide.
///
/// Returns `None` when the text fits on one line. Otherwise returns the byte
/// ranges `(first_end, rest_start)`: the first line ends at the last whitespace
/// within the first `columns` characters, or hard at `columns` when there is
/// none. The whitespace at the break is dropped.
pub fn wrap_point(text: &str, columns: usize) -> Option<(usize, usize)> {
    let (hard_break, _) = text.char_indices().nth(columns)?;

    let soft_break = text[..hard_break]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace());

    match soft_break {
        Some((index, c)) => Some((index, index + c.len_utf8())),
        None => Some((hard_break, hard_break)),
    }
}

/// Encodes `text` into exactly `columns` character codes, truncating or
/// padding with spaces.
pub fn fit_line(text: &str, columns: usize) -> impl Iterator<Item = u8> + '_ {
    text.chars()
        .map(encode_char)
        .chain(core::iter::repeat(b' '))
        .take(columns)
}

/// Lays `cells` out across one line `columns` wide.
///
/// The first cell is left-aligned, the last right-aligned, and the spare width
/// is shared between the gaps, with any remainder going to the rightmost gaps.
/// A single cell is right-aligned. When the cells are wider than the line they
/// are run together and truncated.
pub fn justify<'a>(cells: &'a [&'a str], columns: usize) -> impl Iterator<Item = u8> + 'a {
    let width: usize = cells.iter().map(|cell| cell.chars().count()).sum();
    let fits = width <= columns;
    let spare = columns.saturating_sub(width);
    let gaps = cells.len().saturating_sub(1);
    let (share, extra) = match gaps {
        0 => (0, 0),
        gaps => (spare / gaps, spare % gaps),
    };

    cells
        .iter()
        .copied()
        .enumerate()
        .flat_map(move |(index, cell)| {
            let pad = match index {
                _ if !fits => 0,
                0 if gaps == 0 => spare,
                0 => 0,
                index => share + usize::from(index > gaps - extra),
            };
            core::iter::repeat(b' ')
                .take(pad)
                .chain(cell.chars().map(encode_char))
        })
        .chain(core::iter::repeat(b' '))
        .take(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_ascii_and_degree_sign() {
        assert_eq!(encode_char('A'), 0x41);
        assert_eq!(encode_char('°'), 0xDF);
        assert_eq!(encode_char('€'), b'?');
    }

    #[test]
    fn short_text_does_not_wrap() {
        assert_eq!(wrap_point("Stove 21.5°C", 16), None);
        assert_eq!(wrap_point("exactly sixteen!", 16), None);
    }

    #[test]
    fn wraps_at_last_whitespace() {
        let text = "THIS IS A TEST! SEE THIS MESSAGE?";
        let (end, start) = wrap_point(text, 16).unwrap();
        assert_eq!(&text[..end], "THIS IS A TEST!");
        assert_eq!(&text[start..], "SEE THIS MESSAGE?");
    }

    #[test]
    fn hard_wraps_without_whitespace() {
        let text = "ABCDEFGHIJKLMNOPQRS";
        let (end, start) = wrap_point(text, 16).unwrap();
        assert_eq!(&text[..end], "ABCDEFGHIJKLMNOP");
        assert_eq!(&text[start..], "QRS");
    }

    #[test]
    fn wrap_counts_characters_not_bytes() {
        let text = "°°°°°°°°°°°°°°°°X";
        let (end, start) = wrap_point(text, 16).unwrap();
        assert_eq!(text[..end].chars().count(), 16);
        assert_eq!(&text[start..], "X");
    }

    #[test]
    fn fit_line_pads_and_truncates() {
        let padded: Vec<u8> = fit_line("Hi", 4).collect();
        assert_eq!(padded, b"Hi  ");

        let truncated: Vec<u8> = fit_line("Hello", 4).collect();
        assert_eq!(truncated, b"Hell");
    }

    #[test]
    fn justify_spreads_cells_across_the_line() {
        let row: Vec<u8> = justify(&["19", "51", "7"], 16).collect();
        assert_eq!(row, b"19     51      7");
    }

    #[test]
    fn justify_gives_remainder_to_rightmost_gaps() {
        let row: Vec<u8> = justify(&["12°", "19°", "851°", "185°"], 16).collect();
        assert_eq!(
            row,
            [b'1', b'2', 0xDF, b'1', b'9', 0xDF, b' ', b'8', b'5', b'1', 0xDF, b' ', b'1', b'8', b'5', 0xDF]
        );
    }

    #[test]
    fn justify_right_aligns_a_single_cell() {
        let row: Vec<u8> = justify(&["42"], 6).collect();
        assert_eq!(row, b"    42");
    }

    #[test]
    fn justify_runs_overlong_cells_together() {
        let row: Vec<u8> = justify(&["closing", "valve", "now"], 12).collect();
        assert_eq!(row, b"closingvalve");
    }

    #[test]
    fn justify_blanks_the_line_without_cells() {
        let row: Vec<u8> = justify(&[], 4).collect();
        assert_eq!(row, b"    ");
    }
}
