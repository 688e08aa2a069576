use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.split('\t')
        .enumerate()
        .map(|(i, part)| {
            let w = UnicodeWidthStr::width(part);
            if i > 0 { w + 4 } else { w }
        })
        .sum()
}

/// Pad `s` with spaces on the right until it is `width` cells wide.
/// Strings already at or past `width` are returned unchanged.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let w = display_width(s);
    if w >= width {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + width - w);
    out.push_str(s);
    out.extend(std::iter::repeat_n(' ', width - w));
    out
}

/// Widest display width among `items`, or 0 if there are none
pub fn max_width<'a, I>(items: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    items.into_iter().map(display_width).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_of_ascii_and_wide_chars() {
        assert_eq!(display_width("Work"), 4);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width("a\tb"), 6);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn pad_uses_display_width() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("日本", 6), "日本  ");
        assert_eq!(pad_to_width("toolong", 3), "toolong");
    }

    #[test]
    fn max_width_over_names() {
        assert_eq!(max_width(["a", "日本語", "abcd"]), 6);
        assert_eq!(max_width(Vec::<&str>::new()), 0);
    }
}
