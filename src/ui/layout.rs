use ratatui::layout::{Constraint, Direction, Layout, Rect};

const SIDEBAR_WIDTH: u16 = 26;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥90 cols: sidebar + main view
    Narrow, // <90 cols: main view only, view name in the header
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 90 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn show_sidebar(&self) -> bool {
        *self == LayoutTier::Wide
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub sidebar: Option<Rect>,
    pub main: Rect,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    /// `footer_lines` is the number of packed hint lines to reserve.
    pub fn new(area: Rect, footer_lines: u16) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(footer_lines.max(1)),
            ])
            .split(area);

        let (sidebar, main) = if tier.show_sidebar() {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(40)])
                .split(vertical[1]);
            (Some(horizontal[0]), horizontal[1])
        } else {
            (None, vertical[1])
        };

        Self {
            header: vertical[0],
            sidebar,
            main,
            footer: vertical[2],
            tier,
        }
    }
}

pub fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    text.split('\n')
        .map(|line| line.chars().count().max(1).div_ceil(width))
        .sum()
}

/// Greedily pack key hints into lines no wider than `width`.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    for hint in hints.iter().filter(|h| !h.is_empty()) {
        if current.is_empty() {
            current = format!(" {hint}");
        } else if current.chars().count() + 2 + hint.chars().count() <= width {
            current = format!("{current}  {hint}");
        } else {
            out.push(std::mem::take(&mut current));
            current = format!(" {hint}");
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Popup rect of the given percentage, grown to a usable minimum and shrunk
/// to fit the terminal.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 48;
    const MIN_POPUP_HEIGHT: u16 = 9;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area.x + area.width.saturating_sub(target_w) / 2;
    let top = area.y + area.height.saturating_sub(target_h) / 2;

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidebar_only_when_wide() {
        let wide = AppLayout::new(Rect::new(0, 0, 120, 40), 1);
        assert_eq!(wide.tier, LayoutTier::Wide);
        assert_eq!(wide.sidebar.map(|r| r.width), Some(SIDEBAR_WIDTH));
        assert_eq!(wide.main.width, 120 - SIDEBAR_WIDTH);

        let narrow = AppLayout::new(Rect::new(0, 0, 80, 24), 2);
        assert!(narrow.sidebar.is_none());
        assert_eq!(narrow.main.width, 80);
        assert_eq!(narrow.footer.height, 2);
    }

    #[test]
    fn test_wrapped_line_count() {
        assert_eq!(wrapped_line_count("", 10), 1);
        assert_eq!(wrapped_line_count("abcdefghij", 10), 1);
        assert_eq!(wrapped_line_count("abcdefghijk", 10), 2);
        assert_eq!(wrapped_line_count("ab\ncd", 10), 2);
        assert_eq!(wrapped_line_count("abc", 0), 0);
    }

    #[test]
    fn test_pack_hint_lines() {
        let hints = ["[Tab] Next view", "[f] Feedback", "", "[q] Quit"];
        assert_eq!(
            pack_hint_lines(&hints, 80),
            vec![" [Tab] Next view  [f] Feedback  [q] Quit".to_string()]
        );
        assert_eq!(
            pack_hint_lines(&hints, 20),
            vec![
                " [Tab] Next view".to_string(),
                " [f] Feedback".to_string(),
                " [q] Quit".to_string()
            ]
        );
        assert!(pack_hint_lines(&hints, 0).is_empty());
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 8);
        let r = centered_rect(50, 50, area);
        assert_eq!((r.width, r.height), (40, 8));

        let big = Rect::new(0, 0, 200, 60);
        let r = centered_rect(50, 50, big);
        assert_eq!((r.x, r.y, r.width, r.height), (50, 15, 100, 30));
    }
}
