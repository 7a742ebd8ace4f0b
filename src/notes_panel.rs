use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::engine::{Annotation, DocumentEngine};
use crate::overlay::ElementRegistry;
use crate::read_state::ReadState;
use crate::theme::{Base16Palette, NoteAccent};
use crate::workflow::{
    ActionDescriptor, ActionSet, ActionToken, SelectorClick, StatusTransition, TypeSelector,
    UserRole, WorkflowCallbacks, dispatch, project, status_icon,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Position,
    Newest,
}

impl SortMode {
    pub fn label(self) -> &'static str {
        match self {
            SortMode::Position => "Position",
            SortMode::Newest => "Newest",
        }
    }

    fn toggled(self) -> Self {
        match self {
            SortMode::Position => SortMode::Newest,
            SortMode::Newest => SortMode::Position,
        }
    }
}

/// One workflow activation as observed through the dual-callback contract:
/// the optional status transition and the optional action token, bound to
/// the annotation they were dispatched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowEffect {
    pub annotation_id: String,
    pub transition: Option<StatusTransition>,
    pub token: Option<ActionToken>,
}

/// What an input event did: whether the panel consumed it, and which
/// workflow effects it produced for the host to apply.
#[derive(Debug, Default)]
pub struct PanelOutcome {
    pub handled: bool,
    pub effects: Vec<WorkflowEffect>,
}

impl PanelOutcome {
    fn consumed() -> Self {
        PanelOutcome {
            handled: true,
            effects: Vec::new(),
        }
    }

    fn ignored() -> Self {
        PanelOutcome::default()
    }
}

/// Collect one action activation through the real dispatch contract.
fn effect_for(annotation_id: &str, action: &ActionDescriptor) -> WorkflowEffect {
    let mut transition = None;
    let mut token = None;
    {
        let mut on_status = |status, kind| transition = Some(StatusTransition { status, kind });
        let mut on_action = |_: &str, t| token = Some(t);
        let mut callbacks = WorkflowCallbacks {
            on_status_change: Some(&mut on_status),
            on_action: Some(&mut on_action),
        };
        dispatch(action, annotation_id, &mut callbacks);
    }
    WorkflowEffect {
        annotation_id: annotation_id.to_string(),
        transition,
        token,
    }
}

/// The review notes panel: thread list with header, per-note workflow
/// widgets and the floating type popup.
pub struct NotesPanel {
    pub role: UserRole,
    selected: usize,
    expanded: bool,
    search: String,
    search_active: bool,
    sort: SortMode,
    scroll_offset: usize,
    compact: bool,
    read_state: ReadState,
    type_selector: TypeSelector,
    registry: ElementRegistry,
    last_area: Option<Rect>,
}

impl NotesPanel {
    pub fn new(role: UserRole, read_state: ReadState, compact: bool, open_type_popup: bool) -> Self {
        NotesPanel {
            role,
            selected: 0,
            expanded: false,
            search: String::new(),
            search_active: false,
            sort: SortMode::Position,
            scroll_offset: 0,
            compact,
            read_state,
            type_selector: TypeSelector::new(open_type_popup),
            registry: ElementRegistry::new(),
            last_area: None,
        }
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    pub fn search_query(&self) -> &str {
        &self.search
    }

    pub fn type_popup_open(&self) -> bool {
        self.type_selector.is_open()
    }

    /// Roots matching the search filter, in the current sort order.
    pub fn visible_notes<'a>(&self, engine: &'a DocumentEngine) -> Vec<&'a Annotation> {
        let needle = self.search.to_lowercase();
        let mut notes: Vec<&Annotation> = engine
            .roots()
            .into_iter()
            .filter(|a| {
                needle.is_empty()
                    || a.contents.to_lowercase().contains(&needle)
                    || a.author.to_lowercase().contains(&needle)
                    || a.panel_text().to_lowercase().contains(&needle)
                    || a.workflow_number().contains(needle.as_str())
            })
            .collect();
        if self.sort == SortMode::Newest {
            notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        notes
    }

    pub fn selected_annotation_id(&self, engine: &DocumentEngine) -> Option<String> {
        self.visible_notes(engine)
            .get(self.selected)
            .map(|a| a.id.clone())
    }

    fn clamp_selection(&mut self, visible: usize) {
        if visible == 0 {
            self.selected = 0;
        } else if self.selected >= visible {
            self.selected = visible - 1;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        }
    }

    fn move_selection(&mut self, engine: &DocumentEngine, delta: isize) {
        let visible = self.visible_notes(engine).len();
        if visible == 0 {
            return;
        }
        let next = self.selected.saturating_add_signed(delta).min(visible - 1);
        if next != self.selected {
            self.selected = next;
            self.type_selector.close();
            self.mark_selected_root_read(engine);
        }
        // keep the cursor inside the window; the renderer trims the bottom
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if let Some(area) = self.last_area {
            let rough_rows_per_note = 6usize;
            let fit = (area.height as usize / rough_rows_per_note).max(1);
            if self.selected >= self.scroll_offset + fit {
                self.scroll_offset = self.selected + 1 - fit;
            }
        }
    }

    fn mark_selected_root_read(&mut self, engine: &DocumentEngine) {
        if let Some(id) = self.selected_annotation_id(engine) {
            if let Err(err) = self.read_state.mark_read(&id) {
                log::warn!("failed to persist read state: {err:#}");
            }
        }
    }

    fn mark_replies_read(&mut self, engine: &DocumentEngine, root_id: &str) {
        let unread = self.unread_reply_ids(engine, root_id);
        if let Err(err) = self
            .read_state
            .mark_all_read(unread.iter().map(String::as_str))
        {
            log::warn!("failed to persist read state: {err:#}");
        }
    }

    fn unread_reply_ids(&self, engine: &DocumentEngine, root_id: &str) -> Vec<String> {
        engine
            .replies_of(root_id)
            .iter()
            .filter(|r| !self.read_state.is_read(&r.id))
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        engine: &DocumentEngine,
        palette: &Base16Palette,
    ) {
        self.last_area = Some(area);
        self.registry.clear();

        let notes = self.visible_notes(engine);
        self.clamp_selection(notes.len());

        let (text_color, border_color, bg) = palette.get_panel_colors(true);
        let block = Block::default()
            .title(format!(" Notes · {} ", engine.document_name()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(bg));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let mut y = inner.y;
        let bottom = inner.y + inner.height;

        // header: count + sort, then the search row
        if y < bottom {
            let header = Line::from(vec![
                Span::styled(
                    format!("Comments ({})", notes.len()),
                    Style::default().fg(text_color).add_modifier(Modifier::BOLD),
                ),
                Span::raw("   "),
                Span::styled(
                    format!("Sort: {}", self.sort.label()),
                    Style::default().fg(palette.base_04),
                ),
            ]);
            f.render_widget(Paragraph::new(header), row(inner, y));
            y += 1;
        }
        if y < bottom {
            let cursor = if self.search_active { "▌" } else { "" };
            let search = Line::from(vec![
                Span::styled("Search: ", Style::default().fg(palette.base_04)),
                Span::styled(
                    format!("{}{}", self.search, cursor),
                    Style::default().fg(text_color),
                ),
            ]);
            f.render_widget(Paragraph::new(search), row(inner, y));
            y += 2;
        }

        for (idx, note) in notes.iter().enumerate().skip(self.scroll_offset) {
            if y >= bottom {
                break;
            }
            y = self.render_note(f, inner, y, bottom, note, idx == self.selected, palette, engine);
            y += 1; // separator
        }

        // the floating type popup is positioned against the whole frame,
        // like a browser overlay against the window
        if let Some(id) = self.selected_annotation_id(engine) {
            if let Some(annotation) = engine.annotation(&id) {
                let frame_area = f.area();
                let kind = annotation.workflow_kind();
                let status = annotation.workflow_status();
                self.type_selector.render_popup(
                    f,
                    frame_area,
                    &self.registry,
                    &format!("type_trigger_{id}"),
                    self.role,
                    kind,
                    status,
                    self.compact,
                    palette,
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_note(
        &mut self,
        f: &mut Frame,
        inner: Rect,
        mut y: u16,
        bottom: u16,
        note: &Annotation,
        is_selected: bool,
        palette: &Base16Palette,
        engine: &DocumentEngine,
    ) -> u16 {
        let note_top = y;
        let kind = note.workflow_kind();
        let status = note.workflow_status();
        let accent = NoteAccent::of(kind, status).map(|a| palette.accent_color(a));
        let unread = !self.read_state.is_read(&note.id);

        // headline: cursor, unread marker, author, panel text verbatim, page
        let prefix = if is_selected { "» " } else { "  " };
        let marker = if unread { "● " } else { "  " };
        let mut spans = vec![
            Span::styled(
                prefix,
                Style::default().fg(palette.base_0a).add_modifier(Modifier::BOLD),
            ),
            Span::styled(marker, Style::default().fg(palette.base_08)),
            Span::styled(
                note.author.clone(),
                Style::default()
                    .fg(accent.unwrap_or(palette.base_06))
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if !note.panel_text().is_empty() {
            spans.push(Span::raw(" · "));
            spans.push(Span::styled(
                note.panel_text().to_string(),
                Style::default().fg(palette.base_05),
            ));
        }
        if let Some(document_name) = note.workflow_document_name() {
            spans.push(Span::styled(
                format!(" · {document_name}"),
                Style::default().fg(palette.base_03),
            ));
        }
        spans.push(Span::styled(
            format!(" · p.{}", note.page),
            Style::default().fg(palette.base_03),
        ));
        if y < bottom {
            f.render_widget(Paragraph::new(Line::from(spans)), row(inner, y));
            y += 1;
        }

        // contents, wrapped; collapsed notes show at most two lines
        let width = inner.width.saturating_sub(4).max(8) as usize;
        let wrapped = wrap(&note.contents, width);
        let max_lines = if is_selected { wrapped.len() } else { 2 };
        for part in wrapped.iter().take(max_lines) {
            if y >= bottom {
                break;
            }
            let line = Line::from(vec![
                Span::raw("    "),
                Span::styled(part.to_string(), Style::default().fg(palette.base_05)),
            ]);
            f.render_widget(Paragraph::new(line), row(inner, y));
            y += 1;
        }

        // type trigger (absent entirely when the annotation has no type)
        if let Some(kind_value) = kind {
            if y < bottom {
                let icon = status_icon(kind, status).map(|i| i.glyph()).unwrap_or(" ");
                let text = format!("{icon} {} ▾", kind_value.display_name());
                let line = Line::from(vec![
                    Span::raw("    "),
                    Span::styled(
                        text.clone(),
                        Style::default().fg(palette.base_0c).add_modifier(Modifier::BOLD),
                    ),
                ]);
                f.render_widget(Paragraph::new(line), row(inner, y));
                let trigger_area = Rect {
                    x: inner.x + 4,
                    y,
                    width: (text.width() as u16).min(inner.width.saturating_sub(4)),
                    height: 1,
                };
                self.registry
                    .record_rect(format!("type_trigger_{}", note.id), trigger_area);
                y += 1;
            }
        }

        // workflow action rows
        let set = project(self.role, kind, status, note.workflow_number());
        y = self.render_action_rows(f, inner, y, bottom, note, &set, palette);

        // replies, only on the expanded note
        if is_selected && self.expanded {
            let replies = engine.replies_of(&note.id);
            let unread_replies = self.unread_reply_ids(engine, &note.id);
            if !unread_replies.is_empty() && y < bottom {
                let label = "[ Mark all read ]";
                let line = Line::from(vec![
                    Span::raw("    "),
                    Span::styled(label, Style::default().fg(palette.base_0a)),
                ]);
                f.render_widget(Paragraph::new(line), row(inner, y));
                self.registry.record_rect(
                    format!("mark_read_{}", note.id),
                    Rect {
                        x: inner.x + 4,
                        y,
                        width: label.width() as u16,
                        height: 1,
                    },
                );
                y += 1;
            }
            for reply in replies {
                if y >= bottom {
                    break;
                }
                let marker = if self.read_state.is_read(&reply.id) {
                    "  "
                } else {
                    "● "
                };
                let line = Line::from(vec![
                    Span::raw("      ↳ "),
                    Span::styled(marker, Style::default().fg(palette.base_08)),
                    Span::styled(
                        format!("{}: ", reply.author),
                        Style::default().fg(palette.base_04),
                    ),
                    Span::styled(reply.contents.clone(), Style::default().fg(palette.base_05)),
                ]);
                f.render_widget(Paragraph::new(line), row(inner, y));
                y += 1;
            }
        }

        // the whole note block is clickable for selection
        self.registry.record_rect(
            format!("note_{}", note.id),
            Rect {
                x: inner.x,
                y: note_top,
                width: inner.width,
                height: y.saturating_sub(note_top).max(1),
            },
        );
        y
    }

    fn render_action_rows(
        &mut self,
        f: &mut Frame,
        inner: Rect,
        mut y: u16,
        bottom: u16,
        note: &Annotation,
        set: &ActionSet,
        palette: &Base16Palette,
    ) -> u16 {
        if !set.renders() {
            return y;
        }
        if set.placeholder {
            // contentless container: one styled but empty row
            if y < bottom {
                f.render_widget(
                    Paragraph::new(Line::raw("")).style(Style::default().bg(palette.base_01)),
                    row(inner, y),
                );
                y += 1;
            }
            return y;
        }

        let mut x = inner.x + 4;
        if y >= bottom {
            return y;
        }
        for (idx, action) in set.actions.iter().enumerate() {
            let text = format!("[ {} ]", action.label);
            let button_width = text.width() as u16;
            let wraps_row = x + button_width > inner.x + inner.width
                || set.break_after.is_some_and(|b| idx == b + 1);
            if wraps_row {
                y += 1;
                x = inner.x + 4;
                if y >= bottom {
                    return y;
                }
            }
            let button_area = Rect {
                x,
                y,
                width: button_width.min((inner.x + inner.width).saturating_sub(x)),
                height: 1,
            };
            f.render_widget(
                Paragraph::new(Line::styled(text, palette.action_style(action.style))),
                button_area,
            );
            self.registry
                .record_rect(format!("action_{}_{idx}", note.id), button_area);
            x += button_width + 1;
        }
        y + 1
    }

    /// Keyboard input.
    pub fn handle_key(
        &mut self,
        key: crossterm::event::KeyEvent,
        engine: &DocumentEngine,
    ) -> PanelOutcome {
        use crossterm::event::KeyCode;

        if self.search_active {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.search_active = false,
                KeyCode::Backspace => {
                    self.search.pop();
                }
                KeyCode::Char(c) => self.search.push(c),
                _ => return PanelOutcome::ignored(),
            }
            return PanelOutcome::consumed();
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(engine, 1);
                PanelOutcome::consumed()
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(engine, -1);
                PanelOutcome::consumed()
            }
            KeyCode::Enter => {
                self.expanded = !self.expanded;
                self.mark_selected_root_read(engine);
                PanelOutcome::consumed()
            }
            KeyCode::Char('/') => {
                self.search_active = true;
                PanelOutcome::consumed()
            }
            KeyCode::Char('s') => {
                self.sort = self.sort.toggled();
                PanelOutcome::consumed()
            }
            KeyCode::Char('t') => {
                self.type_selector.activate();
                PanelOutcome::consumed()
            }
            KeyCode::Char('m') => {
                if let Some(id) = self.selected_annotation_id(engine) {
                    self.mark_replies_read(engine, &id);
                }
                PanelOutcome::consumed()
            }
            KeyCode::Esc => {
                // keyboard stand-in for a pointer interaction outside the popup
                if self.type_selector.is_open() {
                    self.type_selector.close();
                    PanelOutcome::consumed()
                } else {
                    PanelOutcome::ignored()
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                let slot = (c as usize) - ('1' as usize);
                self.activate_slot(slot, engine)
            }
            _ => PanelOutcome::ignored(),
        }
    }

    /// Digit activation: popup options when the popup is open, otherwise the
    /// selected note's workflow actions.
    fn activate_slot(&mut self, slot: usize, engine: &DocumentEngine) -> PanelOutcome {
        let Some(id) = self.selected_annotation_id(engine) else {
            return PanelOutcome::consumed();
        };
        let Some(annotation) = engine.annotation(&id) else {
            return PanelOutcome::consumed();
        };
        let kind = annotation.workflow_kind();
        let status = annotation.workflow_status();

        if self.type_selector.is_open() && TypeSelector::offers_popup(self.role, kind, status) {
            let mut outcome = PanelOutcome::consumed();
            if let Some(kind) = kind {
                let options = TypeSelector::options(self.role, kind);
                if let Some(option) = options.get(slot) {
                    outcome
                        .effects
                        .push(self.select_popup_option(*option, &id));
                }
            }
            return outcome;
        }

        let set = project(self.role, kind, status, annotation.workflow_number());
        let mut outcome = PanelOutcome::consumed();
        if let Some(action) = set.actions.get(slot) {
            outcome.effects.push(effect_for(&id, action));
        }
        outcome
    }

    fn select_popup_option(
        &mut self,
        option: crate::workflow::TypeOption,
        annotation_id: &str,
    ) -> WorkflowEffect {
        let mut transition = None;
        let mut token = None;
        {
            let mut on_status = |status, kind| transition = Some(StatusTransition { status, kind });
            let mut on_action = |_: &str, t| token = Some(t);
            let mut callbacks = WorkflowCallbacks {
                on_status_change: Some(&mut on_status),
                on_action: Some(&mut on_action),
            };
            self.type_selector
                .select(option, annotation_id, &mut callbacks);
        }
        WorkflowEffect {
            annotation_id: annotation_id.to_string(),
            transition,
            token,
        }
    }

    /// Pointer input.
    pub fn handle_mouse(
        &mut self,
        mouse: crossterm::event::MouseEvent,
        engine: &DocumentEngine,
    ) -> PanelOutcome {
        use crossterm::event::{MouseButton, MouseEventKind};
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return PanelOutcome::ignored();
        }
        let (x, y) = (mouse.column, mouse.row);

        if let Some(id) = self.selected_annotation_id(engine) {
            let mut transition = None;
            let mut token = None;
            let click;
            {
                let mut on_status =
                    |status, kind| transition = Some(StatusTransition { status, kind });
                let mut on_action = |_: &str, t| token = Some(t);
                let mut callbacks = WorkflowCallbacks {
                    on_status_change: Some(&mut on_status),
                    on_action: Some(&mut on_action),
                };
                click = self.type_selector.handle_click(x, y, &id, &mut callbacks);
            }
            match click {
                SelectorClick::Consumed => {
                    let mut outcome = PanelOutcome::consumed();
                    if transition.is_some() || token.is_some() {
                        outcome.effects.push(WorkflowEffect {
                            annotation_id: id,
                            transition,
                            token,
                        });
                    }
                    return outcome;
                }
                SelectorClick::ClosedOutside | SelectorClick::Ignored => {}
            }
        }

        let hit = self
            .registry
            .hit(i32::from(x), i32::from(y))
            .map(str::to_string);
        let Some(element) = hit else {
            return PanelOutcome::ignored();
        };

        if let Some(id) = element.strip_prefix("type_trigger_") {
            self.select_note_by_id(engine, id);
            self.type_selector.activate();
            return PanelOutcome::consumed();
        }
        if let Some(rest) = element.strip_prefix("action_") {
            // action_{annotation_id}_{index}
            let mut outcome = PanelOutcome::consumed();
            if let Some((id, idx)) = rest.rsplit_once('_') {
                if let (Some(annotation), Ok(idx)) = (engine.annotation(id), idx.parse::<usize>())
                {
                    let set = project(
                        self.role,
                        annotation.workflow_kind(),
                        annotation.workflow_status(),
                        annotation.workflow_number(),
                    );
                    if let Some(action) = set.actions.get(idx) {
                        // the button swallows the click; the note row below
                        // it must not also change the selection
                        outcome.effects.push(effect_for(id, action));
                    }
                }
            }
            return outcome;
        }
        if let Some(id) = element.strip_prefix("mark_read_") {
            let id = id.to_string();
            self.mark_replies_read(engine, &id);
            return PanelOutcome::consumed();
        }
        if let Some(id) = element.strip_prefix("note_") {
            self.select_note_by_id(engine, id);
            self.expanded = true;
            return PanelOutcome::consumed();
        }
        PanelOutcome::ignored()
    }

    fn select_note_by_id(&mut self, engine: &DocumentEngine, id: &str) {
        let notes = self.visible_notes(engine);
        if let Some(idx) = notes.iter().position(|a| a.id == id) {
            if idx != self.selected {
                self.type_selector.close();
            }
            self.selected = idx;
            self.mark_selected_root_read(engine);
        }
    }
}

fn row(inner: Rect, y: u16) -> Rect {
    Rect {
        x: inner.x,
        y,
        width: inner.width,
        height: 1,
    }
}
