/// Splits `text` into words and single whitespace characters.
///
/// Every whitespace character becomes its own token, so two spaces yield two
/// tokens. Joining the result gives back `text` unchanged.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;

    for (index, ch) in text.char_indices() {
        if is_breaking_whitespace(ch) {
            if let Some(start) = word_start.take() {
                tokens.push(&text[start..index]);
            }
            tokens.push(&text[index..index + ch.len_utf8()]);
        } else if word_start.is_none() {
            word_start = Some(index);
        }
    }

    if let Some(start) = word_start {
        tokens.push(&text[start..]);
    }

    tokens
}

/// Escapes line breaks and tabs so a token fits on one log line.
pub fn printable(token: &str) -> String {
    token.replace('\n', "\\n").replace('\t', "\\t")
}

// Non-breaking spaces and NEL stay inside words; the ASCII separators 0x1C..0x1F split.
fn is_breaking_whitespace(ch: char) -> bool {
    match ch {
        '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{0085}' => false,
        '\u{001C}'..='\u{001F}' => true,
        _ => ch.is_whitespace(),
    }
}
