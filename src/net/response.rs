//! Response body handling.
//!
//! The executor reads a response body **line by line** into a fresh
//! accumulator, joins the lines with `\n` and removes the bracket wrapping
//! some APIs put around their payload (`[payload]`, `[[payload]]`, ...).
//!
//! ## Notes
//! - Line terminators (`\n`, `\r\n`) are not part of the accumulated lines.
//! - Unwrapping only looks at the first and last character. It does not check
//!   that the brackets are balanced, so a body that is a JSON array such as
//!   `[1,2]` comes back as `1,2`.
//! - Bytes that are not valid UTF-8 are decoded lossily (`U+FFFD`); a body in
//!   another encoding still comes back, it is never turned into an error.
//!
use std::io::{self, BufRead};

pub const OPENING_BOX_BRACKET: char = '[';
pub const CLOSING_BOX_BRACKET: char = ']';

/// Reads every line of `reader` into a new accumulator.
///
/// Nothing is returned on failure; partial reads are discarded together with
/// the accumulator.
pub fn read_lines<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        lines.push(String::from_utf8_lossy(line).into_owned());
    }
    Ok(lines)
}

/// Strips one `[` / `]` pair at a time for as long as both ends carry one.
pub fn unwrap_delimiters(mut body: &str) -> &str {
    while body.len() >= 2
        && body.starts_with(OPENING_BOX_BRACKET)
        && body.ends_with(CLOSING_BOX_BRACKET)
    {
        body = &body[1..body.len() - 1];
    }
    body
}

/// Joins the accumulated lines and unwraps the result.
pub fn into_result(lines: Vec<String>) -> String {
    let joined = lines.join("\n");
    unwrap_delimiters(&joined).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn plain_body_is_unchanged() {
        assert_eq!(unwrap_delimiters("response"), "response");
        assert_eq!(unwrap_delimiters(""), "");
        assert_eq!(unwrap_delimiters("[response"), "[response");
        assert_eq!(unwrap_delimiters("response]"), "response]");
    }

    #[test]
    fn strips_every_wrapping_layer() {
        assert_eq!(unwrap_delimiters("[response]"), "response");
        assert_eq!(unwrap_delimiters("[[response]]"), "response");
        assert_eq!(unwrap_delimiters("[[[a] [b]]]"), "a] [b");
        assert_eq!(unwrap_delimiters("[]"), "");
        assert_eq!(unwrap_delimiters("[[]]"), "");
    }

    #[test]
    fn single_bracket_is_left_alone() {
        assert_eq!(unwrap_delimiters("["), "[");
        assert_eq!(unwrap_delimiters("]"), "]");
    }

    #[test]
    fn json_array_gets_unwrapped_too() {
        assert_eq!(unwrap_delimiters("[1,2,3]"), "1,2,3");
    }

    #[test]
    fn read_lines_drops_terminators() {
        let mut r = Cursor::new("one\r\ntwo\nthree");
        let lines = read_lines(&mut r).unwrap();
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn read_lines_on_empty_body() {
        let mut r = Cursor::new("");
        assert!(read_lines(&mut r).unwrap().is_empty());
        assert_eq!(into_result(Vec::new()), "");
    }

    #[test]
    fn read_lines_decodes_invalid_utf8_lossily() {
        let mut r = Cursor::new(b"ok\r\ncaf\xe9 ok\n\xff".to_vec());
        let lines = read_lines(&mut r).unwrap();
        assert_eq!(lines, vec!["ok", "caf\u{FFFD} ok", "\u{FFFD}"]);
    }

    #[test]
    fn multi_line_body_is_joined_before_unwrapping() {
        let lines = vec!["[first".to_string(), "second]".to_string()];
        assert_eq!(into_result(lines), "first\nsecond");
    }
}
