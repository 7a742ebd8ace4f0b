use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::overlay::{ElementRegistry, OverlayPosition, RightEdge, Size, overlay_position_for};
use crate::theme::Base16Palette;

use super::action::{ActionDescriptor, ActionStyle, ActionToken, StatusTransition, WorkflowCallbacks, dispatch};
use super::role::UserRole;
use super::status::{WorkflowKind, WorkflowStatus};

/// Icon shown on the type trigger, derived from (kind, status).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Cancelled,
    Completed,
    Edit,
    Close,
}

impl StatusIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            StatusIcon::Cancelled => "✘",
            StatusIcon::Completed => "✔",
            StatusIcon::Edit => "✎",
            StatusIcon::Close => "✕",
        }
    }
}

/// Pure icon selection for the trigger surface.
pub fn status_icon(
    kind: Option<WorkflowKind>,
    status: Option<WorkflowStatus>,
) -> Option<StatusIcon> {
    let is_change_notice = kind == Some(WorkflowKind::Modification);
    if status == Some(WorkflowStatus::Rejected) {
        return Some(StatusIcon::Cancelled);
    }
    if !is_change_notice && status == Some(WorkflowStatus::Closed) {
        return Some(StatusIcon::Cancelled);
    }
    if is_change_notice && status == Some(WorkflowStatus::Closed) {
        return Some(StatusIcon::Completed);
    }
    if !is_change_notice
        && matches!(
            status,
            Some(WorkflowStatus::WorkedLegacy) | Some(WorkflowStatus::Worked)
        )
    {
        return Some(StatusIcon::Edit);
    }
    if status == Some(WorkflowStatus::Irrelevant) {
        return Some(StatusIcon::Close);
    }
    None
}

/// A selectable target type in the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOption {
    Revision,
    Clarification,
    Modification,
}

impl TypeOption {
    pub fn kind(self) -> WorkflowKind {
        match self {
            TypeOption::Revision => WorkflowKind::Revision,
            TypeOption::Clarification => WorkflowKind::Clarification,
            TypeOption::Modification => WorkflowKind::Modification,
        }
    }

    pub fn token(self) -> ActionToken {
        match self {
            TypeOption::Revision => ActionToken::RevisionCreate,
            TypeOption::Clarification => ActionToken::ClarifyCreate,
            TypeOption::Modification => ActionToken::ModifyCreate,
        }
    }

    pub fn label(self) -> &'static str {
        self.kind().display_name()
    }

    fn descriptor(self) -> ActionDescriptor {
        // clarify-create never carries a status transition; the other two
        // reset the annotation to ("none", selected kind).
        let transition = match self {
            TypeOption::Clarification => None,
            TypeOption::Revision | TypeOption::Modification => Some(StatusTransition {
                status: WorkflowStatus::None,
                kind: self.kind(),
            }),
        };
        ActionDescriptor {
            label: self.label().to_string(),
            title: None,
            token: Some(self.token()),
            transition,
            style: ActionStyle::ChangeType,
        }
    }
}

/// Outcome of routing a pointer event through the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorClick {
    /// The popup swallowed the click (an option may have been selected).
    Consumed,
    /// The click landed outside the popup; it closed and the click should
    /// keep propagating.
    ClosedOutside,
    /// The selector was not open; nothing happened.
    Ignored,
}

/// The two-state type popup: Closed ⇄ Open.
///
/// Closed → Open on trigger activation. Open → Closed on a pointer event
/// outside the popup bounds or on selecting an option. There is no
/// timeout-based close.
pub struct TypeSelector {
    is_open: bool,
    last_popup_area: Option<Rect>,
    option_areas: Vec<(TypeOption, Rect)>,
}

impl TypeSelector {
    pub fn new(open_on_initial_load: bool) -> Self {
        TypeSelector {
            is_open: open_on_initial_load,
            last_popup_area: None,
            option_areas: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Trigger activation. Opening is the only transition a trigger causes;
    /// while open, the trigger sits outside the popup bounds so a second
    /// activation closes through the outside-pointer rule instead.
    pub fn activate(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.last_popup_area = None;
        self.option_areas.clear();
    }

    /// Option list for the popup. Role 1 may switch to any other type; roles
    /// 3/4/5 may only switch to clarification; role 2 never gets a popup
    /// (kept as shipped, pinned by tests).
    pub fn options(role: UserRole, kind: WorkflowKind) -> Vec<TypeOption> {
        let candidates: &[TypeOption] = match role {
            UserRole::Role1 => &[
                TypeOption::Revision,
                TypeOption::Clarification,
                TypeOption::Modification,
            ],
            UserRole::Role3 | UserRole::Role4 | UserRole::Role5 => &[TypeOption::Clarification],
            UserRole::Role2 => &[],
        };
        candidates
            .iter()
            .copied()
            .filter(|option| option.kind() != kind)
            .collect()
    }

    /// Whether an open selector has anything to show for this annotation.
    pub fn offers_popup(
        role: UserRole,
        kind: Option<WorkflowKind>,
        status: Option<WorkflowStatus>,
    ) -> bool {
        let Some(kind) = kind else { return false };
        kind != WorkflowKind::Modification
            && status != Some(WorkflowStatus::Rejected)
            && !Self::options(role, kind).is_empty()
    }

    /// Select an option: fire the dual callbacks and force Closed.
    pub fn select(
        &mut self,
        option: TypeOption,
        annotation_id: &str,
        callbacks: &mut WorkflowCallbacks,
    ) {
        dispatch(&option.descriptor(), annotation_id, callbacks);
        self.close();
    }

    /// Route a pointer press at (x, y) through the open popup.
    pub fn handle_click(
        &mut self,
        x: u16,
        y: u16,
        annotation_id: &str,
        callbacks: &mut WorkflowCallbacks,
    ) -> SelectorClick {
        if !self.is_open {
            return SelectorClick::Ignored;
        }
        let Some(area) = self.last_popup_area else {
            // open but never rendered (e.g. popup suppressed for this
            // annotation); any pointer interaction closes it
            self.close();
            return SelectorClick::ClosedOutside;
        };
        if !contains(area, x, y) {
            self.close();
            return SelectorClick::ClosedOutside;
        }
        if let Some((option, _)) = self
            .option_areas
            .iter()
            .copied()
            .find(|(_, rect)| contains(*rect, x, y))
        {
            self.select(option, annotation_id, callbacks);
        } else {
            // a click anywhere within the popup frame closes it
            self.close();
        }
        SelectorClick::Consumed
    }

    /// Render the popup anchored below the recorded trigger element.
    #[allow(clippy::too_many_arguments)]
    pub fn render_popup(
        &mut self,
        f: &mut Frame,
        viewport: Rect,
        registry: &ElementRegistry,
        trigger_element: &str,
        role: UserRole,
        kind: Option<WorkflowKind>,
        status: Option<WorkflowStatus>,
        compact: bool,
        palette: &Base16Palette,
    ) {
        self.option_areas.clear();
        self.last_popup_area = None;
        let Some(kind) = kind else { return };
        if !self.is_open || !Self::offers_popup(role, Some(kind), status) {
            return;
        }
        let options = Self::options(role, kind);

        let width = options
            .iter()
            .map(|o| o.label().width())
            .max()
            .unwrap_or(0) as u16
            + 4;
        let height = options.len() as u16 + 2;

        let position = overlay_position_for(
            registry,
            trigger_element,
            Some(Size {
                width: i32::from(width),
                height: i32::from(height),
            }),
            Size {
                width: i32::from(viewport.width),
                height: i32::from(viewport.height),
            },
            compact,
        );
        let Some(popup_area) = popup_rect(position, width, height, viewport) else {
            return;
        };

        f.render_widget(Clear, popup_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.base_04))
            .style(Style::default().bg(palette.base_01));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        for (idx, option) in options.iter().enumerate() {
            let line_area = Rect {
                x: inner.x,
                y: inner.y + idx as u16,
                width: inner.width,
                height: 1,
            };
            let line = Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    option.label(),
                    Style::default()
                        .fg(palette.base_06)
                        .add_modifier(Modifier::BOLD),
                ),
            ]);
            f.render_widget(Paragraph::new(line), line_area);
            self.option_areas.push((*option, line_area));
        }
        self.last_popup_area = Some(popup_area);
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

/// Clip the computed overlay position into the terminal viewport; an
/// off-screen sentinel yields no rectangle at all.
fn popup_rect(position: OverlayPosition, width: u16, height: u16, viewport: Rect) -> Option<Rect> {
    if position.left < 0 || position.right != RightEdge::Auto {
        return None;
    }
    let x = viewport.x + u16::try_from(position.left).ok()?;
    let y = viewport.y + u16::try_from(position.top.max(0)).ok()?;
    if x >= viewport.x + viewport.width || y >= viewport.y + viewport.height {
        return None;
    }
    let width = width.min(viewport.x + viewport.width - x);
    let height = height.min(viewport.y + viewport.height - y);
    Some(Rect {
        x,
        y,
        width,
        height,
    })
}
