use std::time::Duration;

use anyhow::Result;
use crossterm::event::Event;
use log::info;
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::engine::DocumentEngine;
use crate::event_source::EventSource;
use crate::events::on_annotation_changed;
use crate::notes_panel::{NotesPanel, WorkflowEffect};
use crate::notification::{NotificationLevel, NotificationManager};
use crate::read_state::ReadState;
use crate::settings::Settings;
use crate::theme::{ThemeId, current_theme, set_theme};
use crate::widget::redaction_popup::{RedactionAction, RedactionPopup};
use crate::workflow::{ActionToken, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

pub struct App {
    pub engine: DocumentEngine,
    pub panel: NotesPanel,
    pub notifications: NotificationManager,
    redaction: Option<RedactionPopup>,
    settings: Settings,
    role: UserRole,
}

impl App {
    pub fn new(engine: DocumentEngine, settings: Settings, role: UserRole) -> Result<Self> {
        if let Some(theme) = ThemeId::from_name(&settings.theme) {
            set_theme(theme);
        }
        let read_state = ReadState::new(engine.document_name(), None)?;
        let panel = NotesPanel::new(role, read_state, settings.compact_layout, false);
        Ok(App {
            engine,
            panel,
            notifications: NotificationManager::new(),
            redaction: None,
            settings,
            role,
        })
    }

    /// Test/embedding constructor with an ephemeral read state.
    pub fn new_ephemeral(engine: DocumentEngine, settings: Settings, role: UserRole) -> Self {
        let panel = NotesPanel::new(role, ReadState::ephemeral(), settings.compact_layout, false);
        App {
            engine,
            panel,
            notifications: NotificationManager::new(),
            redaction: None,
            settings,
            role,
        }
    }

    pub fn render(&mut self, f: &mut Frame) {
        let palette = current_theme();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(f.area());

        self.panel.render(f, chunks[0], &self.engine, palette);
        self.render_footer(f, chunks[1]);

        if let Some(redaction) = self.redaction.as_mut() {
            let area = f.area();
            redaction.render(f, area, palette);
        }
    }

    fn render_footer(&self, f: &mut Frame, area: Rect) {
        let palette = current_theme();
        let line = if let Some(notification) = self.notifications.current() {
            let color = match notification.level {
                NotificationLevel::Info => palette.base_0b,
                NotificationLevel::Warning => palette.base_09,
                NotificationLevel::Error => palette.base_08,
            };
            Line::from(Span::styled(
                format!(" {} ", notification.message),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(
                format!(
                    " role {}  j/k move  Enter expand  t type  1-9 actions  R redact  q quit ",
                    self.role.id()
                ),
                Style::default().fg(palette.base_03),
            ))
        };
        f.render_widget(Paragraph::new(line), area);
    }

    pub fn handle_event(&mut self, event: Event) -> Option<AppAction> {
        let action = match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                None
            }
            _ => None,
        };
        self.pump_engine_events();
        action
    }

    fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> Option<AppAction> {
        use crossterm::event::KeyCode;

        if let Some(redaction) = self.redaction.as_mut() {
            if let Some(action) = redaction.handle_key(key) {
                self.apply_redaction_action(action);
            }
            return None;
        }

        let outcome = self.panel.handle_key(key, &self.engine);
        let handled = outcome.handled;
        self.apply_effects(outcome.effects);
        if handled {
            return None;
        }

        match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::Char('R') => {
                self.redaction = Some(RedactionPopup::new(
                    self.current_page(),
                    self.engine.page_count(),
                ));
                None
            }
            _ => None,
        }
    }

    fn handle_mouse(&mut self, mouse: crossterm::event::MouseEvent) {
        use crossterm::event::{MouseButton, MouseEventKind};

        if let Some(redaction) = self.redaction.as_ref() {
            if mouse.kind == MouseEventKind::Down(MouseButton::Left)
                && redaction.is_outside_popup_area(mouse.column, mouse.row)
            {
                self.redaction = None;
            }
            return;
        }

        let outcome = self.panel.handle_mouse(mouse, &self.engine);
        self.apply_effects(outcome.effects);
    }

    /// Apply the workflow effects the panel collected through the dispatch
    /// contract: status transitions are written back through the engine's
    /// update call, action tokens go to the in-process consumer.
    fn apply_effects(&mut self, effects: Vec<WorkflowEffect>) {
        for effect in effects {
            if let Some(transition) = effect.transition {
                if let Some(annotation) = self.engine.annotation(&effect.annotation_id) {
                    let mut updated = annotation.clone();
                    updated.apply_transition(transition);
                    self.engine.update_annotation(updated);
                }
            }
            if let Some(token) = effect.token {
                self.handle_action_token(&effect.annotation_id, token);
            }
        }
    }

    /// The in-process consumer of action tokens: show actions select the
    /// annotation, everything else is forwarded to the log for the host.
    fn handle_action_token(&mut self, annotation_id: &str, token: ActionToken) {
        info!("workflow action {} on {annotation_id}", token.as_str());
        match token {
            ActionToken::ClarifyShow | ActionToken::ModifyShow => {
                self.engine.select_annotation(annotation_id);
                if let Some(annotation) = self.engine.annotation(annotation_id) {
                    self.notifications
                        .info(format!("Showing page {}", annotation.page));
                }
            }
            _ => {}
        }
    }

    fn apply_redaction_action(&mut self, action: RedactionAction) {
        match action {
            RedactionAction::Close => self.redaction = None,
            RedactionAction::Mark(pages) => {
                self.engine.mark_pages_for_redaction(&pages);
                self.notifications
                    .info(format!("Marked {} pages for redaction", pages.len()));
                self.redaction = None;
            }
            RedactionAction::Redact(pages) => {
                self.engine.redact_pages(&pages);
                self.notifications
                    .info(format!("Redacted {} pages", pages.len()));
                self.redaction = None;
            }
        }
    }

    fn current_page(&self) -> u32 {
        self.panel
            .selected_annotation_id(&self.engine)
            .and_then(|id| self.engine.annotation(&id))
            .map(|a| a.page)
            .unwrap_or(1)
    }

    /// Drain engine notifications and run the annotation-changed policies.
    fn pump_engine_events(&mut self) {
        let events = self.engine.take_events();
        for event in &events {
            on_annotation_changed(
                event,
                &mut self.engine,
                &mut self.notifications,
                self.settings.select_annotation_on_creation,
            );
        }
    }
}

/// Main loop: render, poll, route. The event source is abstract so tests
/// can drive the full app with scripted input.
pub fn run_app_with_event_source<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mut dyn EventSource,
) -> Result<()>
where
    <B as Backend>::Error: std::error::Error + Send + Sync + 'static,
{
    loop {
        app.notifications.update();
        terminal.draw(|f| app.render(f))?;

        if events.poll(Duration::from_millis(100))? {
            let event = events.read()?;
            if let Some(AppAction::Quit) = app.handle_event(event) {
                info!("quit requested");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Annotation, KEY_NUMBER, KEY_STATUS, KEY_TYPE};
    use crate::workflow::WorkflowStatus;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use serde_json::json;

    fn sample_app(role: UserRole) -> App {
        let mut engine = DocumentEngine::new("spec-47.pdf");
        engine.add_annotations(
            vec![
                Annotation::new("a1", "mk", 3, "check tolerances")
                    .with_custom_data(KEY_TYPE, json!("clarification"))
                    .with_custom_data(KEY_STATUS, json!(1))
                    .with_custom_data(KEY_NUMBER, json!("12")),
            ],
            true,
        );
        engine.finish_loading(9);
        engine.take_events();
        App::new_ephemeral(engine, Settings::default(), role)
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty()))
    }

    #[test]
    fn agree_key_applies_the_status_transition_to_the_engine() {
        let mut app = sample_app(UserRole::Role2);
        app.handle_event(key('1'));
        let annotation = app.engine.annotation("a1").unwrap();
        assert_eq!(annotation.workflow_status(), Some(WorkflowStatus::Worked));
        assert_eq!(annotation.get_custom_data(KEY_STATUS), Some(&json!(2)));
    }

    #[test]
    fn show_action_selects_the_annotation() {
        let mut app = sample_app(UserRole::Role3);
        // the single role-3 action is clarify-show
        app.handle_event(key('1'));
        assert_eq!(app.engine.selected_annotation(), Some("a1"));
        assert!(app.notifications.current().is_some());
    }

    #[test]
    fn quit_key_returns_the_quit_action() {
        let mut app = sample_app(UserRole::Role3);
        assert_eq!(app.handle_event(key('q')), Some(AppAction::Quit));
    }

    #[test]
    fn typing_q_into_the_search_does_not_quit() {
        let mut app = sample_app(UserRole::Role3);
        app.handle_event(key('/'));
        assert_eq!(app.handle_event(key('q')), None);
        assert_eq!(app.panel.search_query(), "q");
    }

    #[test]
    fn redaction_flow_marks_pages() {
        let mut app = sample_app(UserRole::Role2);
        app.handle_event(key('R'));
        assert!(app.redaction.is_some());

        // default selection is the current page; jump focus to Mark
        for _ in 0..4 {
            app.handle_event(key('j'));
        }
        app.handle_event(Event::Key(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::empty(),
        )));
        assert!(app.redaction.is_none());
        // one redaction mark landed in the engine on the note's page
        assert!(app.engine.annotation("redaction-p3-1").is_some());
        assert!(app.notifications.current().is_some());
    }
}
