pub fn wrap_word(text: &str, width: u16) -> Vec<String> {
    let width = width.max(1);
    let chars: Vec<char> = text.chars().collect();
    let mut lines = vec![String::new()];
    let mut col = 0u16;

    for (idx, ch) in chars.iter().copied().enumerate() {
        if ch == '\n' {
            lines.push(String::new());
            col = 0;
            continue;
        }

        if col >= width || should_wrap_before_word(&chars, idx, col, width) {
            lines.push(String::new());
            col = 0;
        }

        lines
            .last_mut()
            .expect("lines always holds at least one line")
            .push(ch);
        col = col.saturating_add(1);
    }

    lines
}

fn should_wrap_before_word(chars: &[char], idx: usize, col: u16, width: u16) -> bool {
    if col == 0 {
        return false;
    }
    let ch = chars[idx];
    if ch.is_whitespace() {
        return false;
    }
    if idx > 0 {
        let prev = chars[idx - 1];
        if !prev.is_whitespace() && prev != '\n' {
            return false;
        }
    }

    let word_len = chars[idx..]
        .iter()
        .take_while(|c| !c.is_whitespace() && **c != '\n')
        .count() as u16;

    word_len <= width && col.saturating_add(word_len) > width
}
