//! Cleanup of raw ID-card OCR text before field extraction

/// Punctuation that survives cleaning besides letters, digits and whitespace
const ALLOWED_PUNCTUATION: &[char] = &['.', '(', ')', '/', '-'];

/// Normalize OCR output for the field extractors.
///
/// Uppercases, reads `|` and `\` as `I`, replaces anything outside `A-Z 0-9` and
/// the punctuation allow-list with a space, collapses whitespace within each line
/// and drops blank lines. Line breaks are kept because card fields sit on separate
/// lines. `0` and `O` are left alone: only the ID-number extractor may rewrite
/// `O` to `0`, and only inside digit runs.
pub fn clean_text(raw: &str) -> String {
    raw.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn clean_line(line: &str) -> String {
    let mapped: String = line
        .chars()
        .flat_map(char::to_uppercase)
        .map(|c| match c {
            '|' | '\\' => 'I',
            c if c.is_ascii_uppercase() || c.is_ascii_digit() => c,
            c if ALLOWED_PUNCTUATION.contains(&c) => c,
            _ => ' ',
        })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}
