pub mod test_helpers {
    use crate::event_source::{Event, KeyCode, KeyEvent, KeyModifiers, SimulatedEventSource};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Builder for creating test scenarios with simulated user input
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl Default for TestScenarioBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        /// Add a character key press
        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        /// Press Enter
        pub fn press_enter(mut self) -> Self {
            self.events.push(SimulatedEventSource::key_event(
                KeyCode::Enter,
                KeyModifiers::empty(),
            ));
            self
        }

        /// Press Escape
        pub fn press_esc(mut self) -> Self {
            self.events.push(SimulatedEventSource::key_event(
                KeyCode::Esc,
                KeyModifiers::empty(),
            ));
            self
        }

        /// Left-click at (column, row)
        pub fn click(mut self, column: u16, row: u16) -> Self {
            self.events.push(SimulatedEventSource::left_click(column, row));
            self
        }

        pub fn key_event(mut self, event: KeyEvent) -> Self {
            self.events.push(Event::Key(event));
            self
        }

        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    /// Fixed-size terminal over the test backend.
    pub fn test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(width, height)).expect("test terminal")
    }

    /// Flatten the test backend's buffer into one string, row per line.
    pub fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let Some(cell) = buffer.cell((x, y)) {
                    out.push_str(cell.symbol());
                }
            }
            out.push('\n');
        }
        out
    }
}
