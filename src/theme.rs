use ratatui::style::{Color, Modifier, Style};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::workflow::{ActionStyle, WorkflowKind, WorkflowStatus};

// Color palette structure
#[derive(Clone)]
pub struct Base16Palette {
    pub base_00: Color, // Background
    pub base_01: Color, // Lighter background
    pub base_02: Color, // Selection background
    pub base_03: Color, // Comments, invisibles
    pub base_04: Color, // Dark foreground
    pub base_05: Color, // Default foreground
    pub base_06: Color, // Light foreground
    pub base_07: Color, // Light background
    pub base_08: Color, // Red
    pub base_09: Color, // Orange
    pub base_0a: Color, // Yellow
    pub base_0b: Color, // Green
    pub base_0c: Color, // Cyan
    pub base_0d: Color, // Blue
    pub base_0e: Color, // Purple
    pub base_0f: Color, // Brown
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ThemeId {
    OceanicNext = 0,
    CatppuccinMocha = 1,
}

impl ThemeId {
    pub fn name(&self) -> &'static str {
        match self {
            ThemeId::OceanicNext => "Oceanic Next",
            ThemeId::CatppuccinMocha => "Catppuccin Mocha",
        }
    }

    pub fn all() -> &'static [ThemeId] {
        &[ThemeId::OceanicNext, ThemeId::CatppuccinMocha]
    }

    pub fn from_name(name: &str) -> Option<ThemeId> {
        ThemeId::all().iter().copied().find(|t| t.name() == name)
    }

    fn from_index(idx: usize) -> Self {
        match idx {
            1 => ThemeId::CatppuccinMocha,
            _ => ThemeId::OceanicNext,
        }
    }
}

static CURRENT_THEME_INDEX: AtomicUsize = AtomicUsize::new(0);

pub fn current_theme_id() -> ThemeId {
    ThemeId::from_index(CURRENT_THEME_INDEX.load(Ordering::Relaxed))
}

pub fn set_theme(theme: ThemeId) {
    CURRENT_THEME_INDEX.store(theme as usize, Ordering::Relaxed);
}

pub fn current_theme() -> &'static Base16Palette {
    match current_theme_id() {
        ThemeId::OceanicNext => &OCEANIC_NEXT_PALETTE,
        ThemeId::CatppuccinMocha => &CATPPUCCIN_MOCHA_PALETTE,
    }
}

fn rgb(hex: u32) -> Color {
    Color::Rgb(
        ((hex >> 16) & 0xff) as u8,
        ((hex >> 8) & 0xff) as u8,
        (hex & 0xff) as u8,
    )
}

// Oceanic Next theme
static OCEANIC_NEXT_PALETTE: LazyLock<Base16Palette> = LazyLock::new(|| Base16Palette {
    base_00: rgb(0x1B2B34),
    base_01: rgb(0x343D46),
    base_02: rgb(0x4F5B66),
    base_03: rgb(0x65737E),
    base_04: rgb(0xA7ADBA),
    base_05: rgb(0xC0C5CE),
    base_06: rgb(0xCDD3DE),
    base_07: rgb(0xF0F4F8),
    base_08: rgb(0xEC5F67),
    base_09: rgb(0xF99157),
    base_0a: rgb(0xFAC863),
    base_0b: rgb(0x99C794),
    base_0c: rgb(0x5FB3B3),
    base_0d: rgb(0x6699CC),
    base_0e: rgb(0xC594C5),
    base_0f: rgb(0xAB7967),
});

// Catppuccin Mocha theme
static CATPPUCCIN_MOCHA_PALETTE: LazyLock<Base16Palette> = LazyLock::new(|| Base16Palette {
    base_00: rgb(0x1E1E2E),
    base_01: rgb(0x313244),
    base_02: rgb(0x45475A),
    base_03: rgb(0x6C7086),
    base_04: rgb(0x7F849C),
    base_05: rgb(0xA6ADC8),
    base_06: rgb(0xCDD6F4),
    base_07: rgb(0xF5E0DC),
    base_08: rgb(0xF38BA8),
    base_09: rgb(0xFAB387),
    base_0a: rgb(0xF9E2AF),
    base_0b: rgb(0xA6E3A1),
    base_0c: rgb(0x94E2D5),
    base_0d: rgb(0x89B4FA),
    base_0e: rgb(0xCBA6F7),
    base_0f: rgb(0xEBA0AC),
});

/// Row accent for a note, derived from its workflow state. Only
/// clarifications and change notices carry an accent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteAccent {
    Open,
    Worked,
    Done,
}

impl NoteAccent {
    pub fn of(kind: Option<WorkflowKind>, status: Option<WorkflowStatus>) -> Option<NoteAccent> {
        match kind {
            Some(WorkflowKind::Clarification) | Some(WorkflowKind::Modification) => match status {
                Some(WorkflowStatus::Open) => Some(NoteAccent::Open),
                Some(WorkflowStatus::Worked) => Some(NoteAccent::Worked),
                Some(WorkflowStatus::Closed) => Some(NoteAccent::Done),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Base16Palette {
    // Get colors for focused/unfocused panels
    pub fn get_panel_colors(&self, is_focused: bool) -> (Color, Color, Color) {
        if is_focused {
            (self.base_07, self.base_04, self.base_00)
        } else {
            (self.base_03, self.base_03, self.base_00)
        }
    }

    pub fn accent_color(&self, accent: NoteAccent) -> Color {
        match accent {
            NoteAccent::Open => self.base_0a,
            NoteAccent::Worked => self.base_0d,
            NoteAccent::Done => self.base_0b,
        }
    }

    /// Style for one workflow action button variant.
    pub fn action_style(&self, style: ActionStyle) -> Style {
        let fg = match style {
            ActionStyle::Agree => self.base_0b,
            ActionStyle::Disagree => self.base_08,
            ActionStyle::ChangeType => self.base_0e,
            ActionStyle::Clarification => self.base_0d,
            ActionStyle::Modification => self.base_09,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }

    pub fn popup_border_color(&self) -> Color {
        self.base_04
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_only_for_clarifications_and_change_notices() {
        assert_eq!(
            NoteAccent::of(Some(WorkflowKind::Clarification), Some(WorkflowStatus::Open)),
            Some(NoteAccent::Open)
        );
        assert_eq!(
            NoteAccent::of(Some(WorkflowKind::Modification), Some(WorkflowStatus::Closed)),
            Some(NoteAccent::Done)
        );
        assert_eq!(
            NoteAccent::of(Some(WorkflowKind::Revision), Some(WorkflowStatus::Open)),
            None
        );
        assert_eq!(
            NoteAccent::of(
                Some(WorkflowKind::Clarification),
                Some(WorkflowStatus::Rejected)
            ),
            None
        );
        assert_eq!(NoteAccent::of(None, Some(WorkflowStatus::Open)), None);
    }

    #[test]
    fn theme_names_resolve() {
        for theme in ThemeId::all() {
            assert_eq!(ThemeId::from_name(theme.name()), Some(*theme));
        }
        assert_eq!(ThemeId::from_name("nope"), None);
    }
}
