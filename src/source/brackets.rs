//! Bracket-depth scanner
//!
//! Regular expressions cannot balance nested brackets, so method bodies and attribute
//! argument lists are cut out with this small state machine instead.

/// Returns `text[start..=end]`, where `end` is the first closing bracket that brings
/// the depth back to zero after at least one of `required` was seen inside brackets.
///
/// - A required character only counts while the depth is above zero.
/// - With an empty `required`, the first balancing close bracket ends the span.
/// - A close bracket seen before any open one drives the depth negative; the next
///   open bracket starts counting from there.
///
/// Returns `None` when `start` is not a char boundary inside `text`, or when the
/// text ends before the span closes.
pub fn scan_balanced<'a>(
    text: &'a str,
    start: usize,
    open: char,
    close: char,
    required: &[char],
) -> Option<&'a str> {
    let tail = text.get(start..)?;

    let mut depth: i32 = 0;
    let mut required_seen = required.is_empty();

    for (i, ch) in tail.char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth <= 0 && required_seen {
                return tail.get(..i + ch.len_utf8());
            }
        }

        if depth > 0 && required.contains(&ch) {
            required_seen = true;
        }
    }

    None
}
