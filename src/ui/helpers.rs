use std::cmp::min;
use std::ops::Range;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Indices of the cards to draw so that `selected` stays visible when only
/// `capacity` cards fit.
pub(crate) fn visible_window(selected: usize, capacity: usize, len: usize) -> Range<usize> {
    let capacity = capacity.max(1);
    let mut start = if selected >= capacity {
        selected + 1 - capacity
    } else {
        0
    };
    if start + capacity > len {
        start = len.saturating_sub(capacity);
    }
    start..min(start + capacity, len)
}

/// `[key] label` pair for the footer.
pub(crate) fn key_hint(key: &'static str, label: &'static str) -> [Span<'static>; 2] {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    [
        Span::styled(format!("[{key}]"), key_style),
        Span::raw(format!(" {label}   ")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_follows_selection() {
        assert_eq!(visible_window(0, 3, 10), 0..3);
        assert_eq!(visible_window(4, 3, 10), 2..5);
        assert_eq!(visible_window(9, 3, 10), 7..10);
    }

    #[test]
    fn window_handles_short_lists() {
        assert_eq!(visible_window(0, 5, 2), 0..2);
        assert_eq!(visible_window(0, 0, 2), 0..1);
        assert_eq!(visible_window(0, 4, 0), 0..0);
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert!((59..=61).contains(&popup.width));
        assert!((19..=21).contains(&popup.height));
        assert!(popup.x >= area.x && popup.right() <= area.right());
    }
}
