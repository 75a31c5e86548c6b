//! Text measurement. Canvases differ in how they render fonts, so layout uses a fixed
//! per-character estimate.

/// Estimated advance width of `text` at `font_px`.
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Estimated line height of `font_px` text (also the width of rotated text).
pub fn estimate_text_height_px(font_px: u32) -> u32 {
    ((font_px as f32) * 1.2).ceil() as u32
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if estimate_text_width_px(&out, font_px) + estimate_text_width_px("…", font_px) > max_px {
            out.pop();
            break;
        }
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_scales_with_length_and_font() {
        assert_eq!(estimate_text_width_px("", 9), 0);
        assert_eq!(estimate_text_width_px("abcd", 10), 24);
        assert_eq!(estimate_text_height_px(8), 10);
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate_to_width("short", 9, 200), "short");
        let t = truncate_to_width("a rather long series name", 10, 60);
        assert!(t.ends_with('…'));
        assert!(estimate_text_width_px(&t, 10) <= 60);
    }
}
