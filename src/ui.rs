//! Theme and layout helpers shared by every screen.

use ratatui::{
    prelude::*,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const COLOR_SAND: Color = Color::Rgb(0xEB, 0xDB, 0xB2);
pub const COLOR_OLIVE: Color = Color::Rgb(0x98, 0x97, 0x1A);
pub const COLOR_MOSS: Color = Color::Rgb(0x67, 0x67, 0x1C);
pub const COLOR_BLUE: Color = Color::Rgb(0x45, 0x85, 0x88);
pub const COLOR_MUTED: Color = Color::Rgb(0x92, 0x83, 0x74);
pub const COLOR_ERROR: Color = Color::Rgb(0xFB, 0x49, 0x34);

pub const MASK: &str = "•••";
pub const LOGO: &str = "bw";

const BANNER: [&str; 3] = [
    "╔╗ ╦ ╦  ╔╦╗╦ ╦╦",
    "╠╩╗║║║   ║ ║ ║║",
    "╚═╝╚╩╝   ╩ ╚═╝╩",
];

pub fn focused() -> Style {
    Style::default().fg(COLOR_BLUE).add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(COLOR_MUTED)
}

pub fn selected_row() -> Style {
    Style::default()
        .fg(COLOR_SAND)
        .bg(Color::Rgb(40, 40, 40))
        .add_modifier(Modifier::BOLD)
}

pub fn title(text: &str) -> Span<'static> {
    Span::styled(
        format!(" {LOGO} {text} "),
        Style::default()
            .fg(Color::Black)
            .bg(COLOR_BLUE)
            .add_modifier(Modifier::BOLD),
    )
}

pub fn banner() -> Vec<Line<'static>> {
    BANNER
        .iter()
        .map(|l| {
            let spans: Vec<Span> = l
                .chars()
                .map(|ch| {
                    let color = match ch {
                        '═' | '╦' | '╩' => COLOR_OLIVE,
                        '║' | '╠' | '╣' => COLOR_MOSS,
                        _ => COLOR_SAND,
                    };
                    Span::styled(
                        ch.to_string(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Rect of at most `width` x `height`, centred in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + area.width.saturating_sub(w) / 2,
        area.y + area.height.saturating_sub(h) / 2,
        w,
        h,
    )
}

/// `key desc • key desc` footer in the muted style.
pub fn help_line(bindings: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(bindings.len() * 3);
    for (idx, (key, desc)) in bindings.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" • ", muted()));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(COLOR_SAND),
        ));
        spans.push(Span::styled(format!(" {desc}"), muted()));
    }
    Line::from(spans)
}

pub fn render_footer(f: &mut Frame<'_>, area: Rect, line: Line<'static>) {
    let footer = Paragraph::new(line).block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, area);
}

/// Splits the frame into a body and a two-line footer.
pub fn body_and_footer(area: Rect) -> (Rect, Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(area);
    (layout[0], layout[1])
}

#[cfg(test)]
pub(crate) mod testing {
    use ratatui::{backend::TestBackend, buffer::Buffer, Frame, Terminal};

    pub fn render_to_string(width: u16, height: u16, draw: impl FnOnce(&mut Frame<'_>)) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(draw).expect("render");
        buffer_to_string(terminal.backend().buffer())
    }

    pub fn buffer_to_string(buffer: &Buffer) -> String {
        let mut lines = Vec::new();
        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer.get(x, y).symbol());
            }
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered(area, 10, 4), Rect::new(5, 3, 10, 4));
        assert_eq!(centered(area, 50, 50), area);
    }

    #[test]
    fn help_line_joins_bindings() {
        let line = help_line(&[("q", "quit"), ("enter", "copy")]);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "q quit • enter copy");
    }
}
