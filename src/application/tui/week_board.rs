use super::theme::Theme;
use crate::domain::calendar::{week_days, week_start};
use crate::domain::{HabitId, Tracker};
use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::tty::IsTty;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::io::{self, Stdout, stdout};

/// One habit's line on the board for the focused week
#[derive(Debug, Clone, PartialEq)]
pub struct BoardRow {
    pub habit_id: HabitId,
    pub name: String,
    pub frequency: String,
    pub streak: u32,
    /// Logged flags, Sunday..Saturday
    pub logged: [bool; 7],
}

/// Load the rows shown for the week containing `week_of`
pub fn load_board_rows(
    tracker: &Tracker,
    week_of: NaiveDate,
    today: NaiveDate,
) -> Result<Vec<BoardRow>> {
    let days = week_days(week_of);
    let (first, last) = (days[0], days[6]);

    tracker
        .summaries(today)?
        .into_iter()
        .map(|summary| {
            let done = tracker.completions_between(summary.habit.id, first, last)?;
            let mut logged = [false; 7];
            for (slot, day) in logged.iter_mut().zip(&days) {
                *slot = done.contains(day);
            }

            Ok(BoardRow {
                habit_id: summary.habit.id,
                name: summary.habit.name,
                frequency: summary.habit.policy.to_string(),
                streak: summary.status.streak,
                logged,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    /// Flip the log of the selected habit on the selected day
    Toggle { row: usize, date: NaiveDate },
}

/// Cursor and mode state of the board, independent of the terminal
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    pub today: NaiveDate,
    pub selected_date: NaiveDate,
    pub selected_row: usize,
    pub show_help: bool,
    pub should_exit: bool,
    pub message: Option<String>,
}

impl BoardState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            selected_date: today,
            selected_row: 0,
            show_help: false,
            should_exit: false,
            message: None,
        }
    }

    pub fn week_start(&self) -> NaiveDate {
        week_start(self.selected_date)
    }

    /// Handle keyboard input
    pub fn handle_key_event(&mut self, key: KeyEvent, row_count: usize) -> Option<BoardAction> {
        self.message = None;

        match (key.code, key.modifiers) {
            // Exit
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => {
                self.should_exit = true;
            }

            // Ctrl+C and Ctrl+D
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
                self.should_exit = true;
            }

            // Day navigation
            (KeyCode::Left, _) | (KeyCode::Char('h'), _) => {
                self.selected_date = self.selected_date - Duration::days(1);
            }
            (KeyCode::Right, _) | (KeyCode::Char('l'), _) => {
                self.selected_date = self.selected_date + Duration::days(1);
            }

            // Habit navigation
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
                if self.selected_row + 1 < row_count {
                    self.selected_row += 1;
                }
            }

            // Week navigation
            (KeyCode::PageUp, _) | (KeyCode::Char('['), _) => {
                self.selected_date = self.selected_date - Duration::weeks(1);
            }
            (KeyCode::PageDown, _) | (KeyCode::Char(']'), _) => {
                self.selected_date = self.selected_date + Duration::weeks(1);
            }

            // Jump to today
            (KeyCode::Char('t'), _) => {
                self.selected_date = self.today;
            }

            // Mark/unmark
            (KeyCode::Char(' '), _) | (KeyCode::Enter, _) => {
                if row_count == 0 {
                    self.message = Some("No habits yet".to_string());
                } else if self.selected_date > self.today {
                    self.message = Some("Cannot log a day in the future".to_string());
                } else {
                    return Some(BoardAction::Toggle {
                        row: self.selected_row,
                        date: self.selected_date,
                    });
                }
            }

            // Toggle help
            (KeyCode::Char('?'), _) => {
                self.show_help = !self.show_help;
            }

            _ => {}
        }

        None
    }

    /// Keep the row cursor valid after habits were added or removed
    pub fn clamp_row(&mut self, row_count: usize) {
        self.selected_row = self.selected_row.min(row_count.saturating_sub(1));
    }
}

pub struct WeekBoard<'a> {
    state: BoardState,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: Theme,
    tracker: &'a Tracker,
}

impl<'a> WeekBoard<'a> {
    pub fn new(today: NaiveDate, tracker: &'a Tracker, theme: Theme) -> io::Result<Self> {
        // First check if we're in a proper terminal
        if !IsTty::is_tty(&std::io::stdout()) {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "Not running in a TTY, cannot initialize terminal interface",
            ));
        }

        enable_raw_mode()
            .map_err(|e| io::Error::other(format!("Failed to enable raw mode: {}", e)))?;

        stdout().execute(EnterAlternateScreen).map_err(|e| {
            let _ = disable_raw_mode(); // Clean up on failure
            io::Error::other(format!("Failed to enter alternate screen: {}", e))
        })?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend).map_err(|e| {
            let _ = disable_raw_mode();
            let _ = stdout().execute(LeaveAlternateScreen);
            io::Error::other(format!("Failed to create terminal: {}", e))
        })?;

        Ok(Self {
            state: BoardState::new(today),
            terminal,
            theme,
            tracker,
        })
    }

    /// Calculate centered area with both horizontal and vertical centering
    fn calculate_centered_area(available: Rect, needed_width: u16, needed_height: u16) -> Rect {
        let width = std::cmp::min(available.width, needed_width);
        let height = std::cmp::min(available.height, needed_height);

        Rect {
            x: available.x + available.width.saturating_sub(width) / 2,
            y: available.y + available.height.saturating_sub(height) / 2,
            width,
            height,
        }
    }

    fn day_header_style(day: NaiveDate, state: &BoardState, theme: &Theme) -> Style {
        if day == state.today {
            theme.colors.today.to_ratatui_with_modifier(Modifier::BOLD)
        } else if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            theme.colors.weekend.to_ratatui()
        } else {
            theme.colors.header.to_ratatui()
        }
    }

    fn create_board_table(rows: &[BoardRow], state: &BoardState, theme: &Theme) -> Table<'static> {
        let days = week_days(state.selected_date);

        let mut header_cells = vec![Cell::from("Habit").style(theme.colors.header.to_ratatui())];
        header_cells.extend(days.iter().map(|&day| {
            Cell::from(format!("{} {}", day.format("%a"), day.day()))
                .style(Self::day_header_style(day, state, theme))
        }));
        header_cells.push(Cell::from("Streak").style(theme.colors.header.to_ratatui()));
        let header = Row::new(header_cells).height(1);

        let table_rows: Vec<Row> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let is_selected_row = i == state.selected_row;
                let name_style = if is_selected_row {
                    theme.colors.focused.to_ratatui_with_modifier(Modifier::BOLD)
                } else {
                    theme.colors.focused.to_ratatui()
                };

                let mut cells = vec![Cell::from(format!("{} ({})", row.name, row.frequency))
                    .style(name_style)];

                cells.extend(days.iter().zip(row.logged).map(|(&day, logged)| {
                    let (symbol, mut style) = if logged {
                        ("●", theme.colors.done.to_ratatui())
                    } else if day > state.today {
                        (" ", theme.colors.dimmed.to_ratatui())
                    } else {
                        ("·", theme.colors.missed.to_ratatui())
                    };
                    if is_selected_row && day == state.selected_date {
                        style = style.patch(theme.colors.selected.to_ratatui());
                    }
                    Cell::from(format!("  {}", symbol)).style(style)
                }));

                let streak_style = if row.streak > 0 {
                    theme.colors.streak.to_ratatui_with_modifier(Modifier::BOLD)
                } else {
                    theme.colors.dimmed.to_ratatui()
                };
                cells.push(Cell::from(row.streak.to_string()).style(streak_style));

                Row::new(cells)
            })
            .collect();

        let mut widths = vec![Constraint::Min(18)];
        widths.extend(std::iter::repeat_n(Constraint::Length(7), 7));
        widths.push(Constraint::Length(6));

        Table::new(table_rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::NONE)
                    .title(format!(
                        "Week of {}",
                        state.week_start().format("%B %d, %Y")
                    ))
                    .title_style(theme.colors.header.to_ratatui())
                    .title_alignment(Alignment::Center),
            )
            .column_spacing(1)
    }

    fn create_footer(state: &BoardState, theme: &Theme) -> Paragraph<'static> {
        let mut lines = Vec::new();

        if let Some(message) = &state.message {
            lines.push(Line::from(Span::styled(
                message.clone(),
                theme.colors.error_text.to_ratatui(),
            )));
        }

        if state.show_help {
            lines.push(Line::from(Span::styled(
                "↑↓/jk=Habit • ←→/hl=Day • [ ]/PgUp/PgDn=Week • t=Today • Space=Mark • ?=Help • q=Quit",
                theme.colors.help_text.to_ratatui(),
            )));
        }

        lines.push(Line::from(Span::styled(
            format!("{}", state.selected_date.format("%A, %B %d, %Y")),
            theme.colors.focused.to_ratatui(),
        )));

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::NONE))
            .alignment(Alignment::Center)
    }

    fn apply(&mut self, action: BoardAction, rows: &[BoardRow]) {
        match action {
            BoardAction::Toggle { row, date } => {
                let Some(board_row) = rows.get(row) else {
                    return;
                };
                match self.tracker.toggle(board_row.habit_id, date, self.state.today) {
                    Ok(true) => {
                        self.state.message = Some(format!("Marked '{}' for {}", board_row.name, date))
                    }
                    Ok(false) => {
                        self.state.message =
                            Some(format!("Unmarked '{}' for {}", board_row.name, date))
                    }
                    Err(e) => {
                        log::warn!("Failed to toggle habit #{}: {:#}", board_row.habit_id, e);
                        self.state.message = Some(format!("Error: {}", e));
                    }
                }
            }
        }
    }

    /// Run the board loop until the user quits
    pub fn run(&mut self) -> Result<()> {
        while !self.state.should_exit {
            let rows = load_board_rows(self.tracker, self.state.selected_date, self.state.today)?;
            self.state.clamp_row(rows.len());

            let state = &self.state;
            let theme = &self.theme;

            self.terminal.draw(|frame| {
                const FOOTER_HEIGHT: u16 = 3;
                const MAX_WIDTH: u16 = 100;

                let size = frame.area();
                let table_height = rows.len() as u16 + 3;
                let centered_area = Self::calculate_centered_area(
                    size,
                    std::cmp::min(size.width, MAX_WIDTH),
                    table_height + FOOTER_HEIGHT,
                );

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(table_height),
                        Constraint::Length(FOOTER_HEIGHT),
                    ])
                    .split(centered_area);

                frame.render_widget(Self::create_board_table(&rows, state, theme), chunks[0]);
                frame.render_widget(Self::create_footer(state, theme), chunks[1]);
            })?;

            // Handle events with timeout to prevent blocking indefinitely
            if !poll(std::time::Duration::from_millis(100))? {
                continue;
            }

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = self.state.handle_key_event(key, rows.len()) {
                    self.apply(action, &rows);
                }
            }
        }

        self.cleanup()?;
        Ok(())
    }

    /// Explicit cleanup method
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        Ok(())
    }
}

impl<'a> Drop for WeekBoard<'a> {
    fn drop(&mut self) {
        // Fallback cleanup if explicit cleanup wasn't called
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FrequencyPolicy;
    use crate::infrastructure::DuckDbStorage;

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_load_board_rows_marks_logged_days() {
        let tracker = Tracker::new(Box::new(DuckDbStorage::in_memory().unwrap()));
        let today = wednesday();
        let habit = tracker.create_habit("Walk", FrequencyPolicy::Daily).unwrap();
        for offset in [0, 1, 3, 7] {
            tracker
                .mark_done(habit.id, today - Duration::days(offset), today)
                .unwrap();
        }

        let rows = load_board_rows(&tracker, today, today).unwrap();
        assert_eq!(rows.len(), 1);
        // Sun 12 .. Sat 18: Sun, Tue and Wed are logged; the 8th is last week.
        assert_eq!(rows[0].logged, [true, false, true, true, false, false, false]);
        assert_eq!(rows[0].streak, 2);
        assert_eq!(rows[0].frequency, "daily");
    }

    #[test]
    fn test_navigation_moves_cursor() {
        let mut state = BoardState::new(wednesday());

        state.handle_key_event(key(KeyCode::Left), 3);
        assert_eq!(state.selected_date, wednesday() - Duration::days(1));

        state.handle_key_event(key(KeyCode::Char(']')), 3);
        assert_eq!(state.selected_date, wednesday() + Duration::days(6));
        assert_eq!(state.week_start(), NaiveDate::from_ymd_opt(2025, 1, 19).unwrap());

        state.handle_key_event(key(KeyCode::Char('t')), 3);
        assert_eq!(state.selected_date, wednesday());

        state.handle_key_event(key(KeyCode::Down), 3);
        state.handle_key_event(key(KeyCode::Down), 3);
        state.handle_key_event(key(KeyCode::Down), 3);
        assert_eq!(state.selected_row, 2);
        state.handle_key_event(key(KeyCode::Up), 3);
        assert_eq!(state.selected_row, 1);
    }

    #[test]
    fn test_space_toggles_but_not_in_the_future() {
        let mut state = BoardState::new(wednesday());

        assert_eq!(
            state.handle_key_event(key(KeyCode::Char(' ')), 1),
            Some(BoardAction::Toggle {
                row: 0,
                date: wednesday()
            })
        );

        state.handle_key_event(key(KeyCode::Right), 1);
        assert_eq!(state.handle_key_event(key(KeyCode::Enter), 1), None);
        assert!(state.message.is_some());

        assert_eq!(state.handle_key_event(key(KeyCode::Char(' ')), 0), None);
    }

    #[test]
    fn test_quit_keys() {
        let mut state = BoardState::new(wednesday());
        state.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), 0);
        assert!(state.should_exit);

        let mut state = BoardState::new(wednesday());
        state.handle_key_event(key(KeyCode::Char('q')), 0);
        assert!(state.should_exit);
    }

    #[test]
    fn test_clamp_row_after_removal() {
        let mut state = BoardState::new(wednesday());
        state.selected_row = 4;
        state.clamp_row(2);
        assert_eq!(state.selected_row, 1);
        state.clamp_row(0);
        assert_eq!(state.selected_row, 0);
    }
}
