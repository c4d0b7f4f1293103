use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: char = '\u{2026}';

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Clip `s` to at most `max_cells` terminal cells, never splitting a
/// grapheme. A clipped string ends in `…`.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    let Some(budget) = max_cells.checked_sub(1) else {
        return String::new();
    };
    let mut used = 0;
    let mut clipped: String = s
        .graphemes(true)
        .take_while(|g| {
            used += display_width(g);
            used <= budget
        })
        .collect();
    clipped.push(ELLIPSIS);
    clipped
}

/// Clip or right-pad with spaces to `cells` terminal cells (one short
/// when a wide character straddles the edge).
pub fn fit_to_width(s: &str, cells: usize) -> String {
    let mut out = truncate_to_width(s, cells);
    let pad = cells.saturating_sub(display_width(&out));
    out.extend(std::iter::repeat_n(' ', pad));
    out
}
