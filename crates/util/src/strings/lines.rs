/// Splits a multi-line string into lines, keeping each line's terminator.
///
/// `\r\n`, `\r` and `\n` all end a line. The text after the last terminator
/// is always returned as a final line, so the result is never empty and a
/// trailing newline yields a trailing empty line.
///
/// # Examples
///
/// ```
/// use nbdiff_util::strings::split_lines;
///
/// assert_eq!(split_lines("a\nb"), vec!["a\n", "b"]);
/// assert_eq!(split_lines("a\r\nb\n"), vec!["a\r\n", "b\n", ""]);
/// assert_eq!(split_lines(""), vec![""]);
/// ```
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..=i]);
                start = i + 1;
            }
            b'\r' => {
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                lines.push(&text[start..=i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&text[start..]);
    lines
}

/// Number of characters (Unicode scalar values) in `s`.
///
/// All diff offsets count characters, not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Cumulative character lengths of a list of strings.
///
/// For `["ab", "123", "y"]` the result is `[2, 5, 6]`.
///
/// # Examples
///
/// ```
/// use nbdiff_util::strings::accumulate_lengths;
///
/// assert_eq!(accumulate_lengths(&["ab", "123", "y", "\t\nfoo"]), vec![2, 5, 6, 11]);
/// assert!(accumulate_lengths::<&str>(&[]).is_empty());
/// ```
pub fn accumulate_lengths<S: AsRef<str>>(parts: &[S]) -> Vec<usize> {
    let mut total = 0;
    parts
        .iter()
        .map(|part| {
            total += char_len(part.as_ref());
            total
        })
        .collect()
}
