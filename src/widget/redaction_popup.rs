use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::theme::Base16Palette;

// Preview is capped; redacting hundreds of pages still lists only the head.
const MAX_PREVIEW_PAGES: usize = 10;

pub enum RedactionAction {
    Close,
    /// Create redaction marks on the given pages.
    Mark(Vec<u32>),
    /// Apply redactions to the given pages.
    Redact(Vec<u32>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelection {
    Current,
    Specify,
    Even,
    Odd,
}

impl PageSelection {
    fn label(self) -> &'static str {
        match self {
            PageSelection::Current => "Current page",
            PageSelection::Specify => "Specify pages",
            PageSelection::Even => "Even pages",
            PageSelection::Odd => "Odd pages",
        }
    }
}

/// Row the cursor can sit on: the four selection modes, then Mark/Redact.
const ROWS: usize = 6;

/// Modal for marking or redacting whole pages.
pub struct RedactionPopup {
    selection: PageSelection,
    range_input: String,
    focused_row: usize,
    current_page: u32,
    page_count: Option<u32>,
    last_popup_area: Option<Rect>,
}

impl RedactionPopup {
    /// `page_count` is `None` until the engine reports the document fully
    /// loaded; the even/odd options stay disabled until then, and the even
    /// option additionally needs at least two pages.
    pub fn new(current_page: u32, page_count: Option<u32>) -> Self {
        RedactionPopup {
            selection: PageSelection::Current,
            range_input: String::new(),
            focused_row: 0,
            current_page,
            page_count,
            last_popup_area: None,
        }
    }

    pub fn even_disabled(&self) -> bool {
        self.page_count.is_none_or(|pages| pages < 2)
    }

    fn row_disabled(&self, row: usize) -> bool {
        match row {
            2 => self.even_disabled(),
            3 => self.page_count.is_none(),
            _ => false,
        }
    }

    /// The resolved page list for the current selection.
    pub fn pages(&self) -> Vec<u32> {
        let last_page = self.page_count.unwrap_or(self.current_page);
        match self.selection {
            PageSelection::Current => vec![self.current_page],
            PageSelection::Specify => parse_page_ranges(&self.range_input, last_page),
            PageSelection::Even => (1..=last_page).filter(|p| p % 2 == 0).collect(),
            PageSelection::Odd => (1..=last_page).filter(|p| p % 2 == 1).collect(),
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let popup_area = centered_rect(50, 60, area);
        self.last_popup_area = Some(popup_area);

        f.render_widget(Clear, popup_area);

        let hints = " j/k navigate  Enter select  Esc close ";
        let block = Block::default()
            .title(" Redact pages ")
            .title_bottom(Line::from(hints).right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.popup_border_color()))
            .style(Style::default().bg(palette.base_00));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let padded = Rect {
            x: inner.x + 2,
            y: inner.y + 1,
            width: inner.width.saturating_sub(4),
            height: inner.height.saturating_sub(2),
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // selection modes
                Constraint::Length(1), // range input
                Constraint::Length(1), // spacer
                Constraint::Length(2), // preview
                Constraint::Length(1), // spacer
                Constraint::Min(1),    // buttons
            ])
            .split(padded);

        let modes = [
            PageSelection::Current,
            PageSelection::Specify,
            PageSelection::Even,
            PageSelection::Odd,
        ];
        for (idx, mode) in modes.iter().enumerate() {
            let line_area = Rect {
                x: chunks[0].x,
                y: chunks[0].y + idx as u16,
                width: chunks[0].width,
                height: 1,
            };
            let radio = if self.selection == *mode { "●" } else { "○" };
            let style = if self.row_disabled(idx) {
                Style::default().fg(palette.base_03)
            } else {
                Style::default().fg(palette.base_06)
            };
            let prefix = if self.focused_row == idx { "» " } else { "  " };
            let line = Line::from(vec![
                Span::styled(
                    prefix,
                    Style::default().fg(palette.base_0a).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{radio} "), style),
                Span::styled(mode.label(), style),
            ]);
            f.render_widget(Paragraph::new(line), line_area);
        }

        let input_line = Line::from(vec![
            Span::styled("    Pages: ", Style::default().fg(palette.base_04)),
            Span::styled(
                if self.range_input.is_empty() && self.selection != PageSelection::Specify {
                    "e.g. 1,3-5".to_string()
                } else {
                    self.range_input.clone()
                },
                Style::default().fg(palette.base_05),
            ),
        ]);
        f.render_widget(Paragraph::new(input_line), chunks[1]);

        let pages = self.pages();
        let preview: Vec<String> = pages
            .iter()
            .take(MAX_PREVIEW_PAGES)
            .map(u32::to_string)
            .collect();
        let mut preview_text = format!("Will affect: {}", preview.join(", "));
        if pages.len() > MAX_PREVIEW_PAGES {
            preview_text.push_str(&format!(" (+{} more)", pages.len() - MAX_PREVIEW_PAGES));
        }
        f.render_widget(
            Paragraph::new(Line::styled(
                preview_text,
                Style::default().fg(palette.base_04),
            )),
            chunks[3],
        );

        let buttons = Line::from(vec![
            button_span("Mark", self.focused_row == 4, palette),
            Span::raw("   "),
            button_span("Redact", self.focused_row == 5, palette),
        ]);
        f.render_widget(Paragraph::new(buttons), chunks[5]);
    }

    pub fn is_outside_popup_area(&self, x: u16, y: u16) -> bool {
        if let Some(popup_area) = self.last_popup_area {
            x < popup_area.x
                || x >= popup_area.x + popup_area.width
                || y < popup_area.y
                || y >= popup_area.y + popup_area.height
        } else {
            true
        }
    }

    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> Option<RedactionAction> {
        use crossterm::event::KeyCode;

        if self.selection == PageSelection::Specify && self.focused_row == 1 {
            match key.code {
                KeyCode::Char(c @ ('0'..='9' | ',' | '-')) => {
                    self.range_input.push(c);
                    return None;
                }
                KeyCode::Backspace => {
                    self.range_input.pop();
                    return None;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_focus(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_focus(-1);
                None
            }
            KeyCode::Esc => Some(RedactionAction::Close),
            KeyCode::Enter | KeyCode::Char(' ') => self.apply_focused(),
            _ => None,
        }
    }

    fn move_focus(&mut self, delta: isize) {
        let mut row = self.focused_row;
        for _ in 0..ROWS {
            row = (row as isize + delta).rem_euclid(ROWS as isize) as usize;
            if !self.row_disabled(row) {
                break;
            }
        }
        self.focused_row = row;
    }

    fn apply_focused(&mut self) -> Option<RedactionAction> {
        match self.focused_row {
            0 => {
                self.selection = PageSelection::Current;
                None
            }
            1 => {
                self.selection = PageSelection::Specify;
                None
            }
            2 if !self.even_disabled() => {
                self.selection = PageSelection::Even;
                None
            }
            3 if self.page_count.is_some() => {
                self.selection = PageSelection::Odd;
                None
            }
            4 => Some(RedactionAction::Mark(self.pages())),
            5 => Some(RedactionAction::Redact(self.pages())),
            _ => None,
        }
    }
}

fn button_span(label: &str, focused: bool, palette: &Base16Palette) -> Span<'static> {
    let style = if focused {
        Style::default()
            .fg(palette.base_00)
            .bg(palette.base_0a)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.base_06)
    };
    Span::styled(format!("[ {label} ]"), style)
}

/// Parse "1,3-5" style page lists, clamped to the document, deduplicated
/// and sorted. Malformed chunks are skipped rather than failing the input.
pub fn parse_page_ranges(input: &str, last_page: u32) -> Vec<u32> {
    let mut pages: Vec<u32> = Vec::new();
    for chunk in input.split(',') {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        if let Some((from, to)) = chunk.split_once('-') {
            if let (Ok(from), Ok(to)) = (from.trim().parse::<u32>(), to.trim().parse::<u32>()) {
                for page in from..=to.min(last_page) {
                    if page >= 1 {
                        pages.push(page);
                    }
                }
            }
        } else if let Ok(page) = chunk.parse::<u32>() {
            if (1..=last_page).contains(&page) {
                pages.push(page);
            }
        }
    }
    pages.sort_unstable();
    pages.dedup();
    pages
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
