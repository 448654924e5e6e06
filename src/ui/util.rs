use ratatui::layout::Rect;
use ratatui::style::Color;
use std::cmp::min;

pub fn short_hex(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() <= 10 {
        return trimmed.to_string();
    }
    let prefix_len = 6.min(trimmed.len());
    let suffix_len = 4.min(trimmed.len().saturating_sub(prefix_len));
    let prefix = &trimmed[..prefix_len];
    let suffix = &trimmed[trimmed.len() - suffix_len..];
    format!("{}...{}", prefix, suffix)
}

/// Deterministic accent color for a token glyph, hashed from its address.
/// Stands in for the icon artwork a graphical UI would show.
pub fn token_color(address: &str) -> Color {
    const PALETTE: [Color; 8] = [
        Color::Cyan,
        Color::Magenta,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::LightRed,
        Color::LightCyan,
        Color::LightMagenta,
    ];
    let mut acc: u32 = 7;
    for byte in address.as_bytes() {
        acc = acc.wrapping_mul(31).wrapping_add(*byte as u32);
    }
    PALETTE[acc as usize % PALETTE.len()]
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = min(width, area.width);
    let height = min(height, area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hex_elides_the_middle() {
        assert_eq!(
            short_hex("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
            "0xC02a...6Cc2"
        );
        assert_eq!(short_hex("0xabc"), "0xabc");
    }

    #[test]
    fn token_color_is_stable() {
        let address = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
        assert_eq!(token_color(address), token_color(address));
    }

    #[test]
    fn centered_rect_clamps_to_the_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect(100, 100, area);
        assert_eq!(rect, area);
    }
}
