//! Main TUI application state and logic

use super::panes::{render_status_bar, render_structure_pane, StructureScrollState};
use crate::render::RenderedLine;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// A scene whose structures have already been rendered to lines
#[derive(Debug, Clone)]
pub struct RenderedScene {
    pub name: String,
    pub description: String,
    pub lines: Vec<RenderedLine>,
}

/// The main application state
pub struct App {
    /// Pre-rendered scenes, in display order
    pub scenes: Vec<RenderedScene>,

    /// Index of the scene on screen
    pub current: usize,

    /// Scroll offset of the structure pane
    pub scroll: StructureScrollState,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    pub fn new(scenes: Vec<RenderedScene>) -> Self {
        App {
            scenes,
            current: 0,
            scroll: StructureScrollState::default(),
            should_quit: false,
            status_message: String::from("Ready!"),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        if let Some(scene) = self.scenes.get(self.current) {
            render_structure_pane(frame, chunks[0], scene, &mut self.scroll);
        }

        render_status_bar(
            frame,
            chunks[1],
            &self.status_message,
            self.current,
            self.scenes.len(),
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab | KeyCode::Right => self.select(self.current + 1),
            KeyCode::BackTab | KeyCode::Left => {
                if self.current > 0 {
                    self.select(self.current - 1);
                }
            }
            KeyCode::Up => {
                self.scroll.offset = self.scroll.offset.saturating_sub(1);
            }
            KeyCode::Down => {
                self.scroll.offset = self.scroll.offset.saturating_add(1);
            }
            KeyCode::PageUp => {
                self.scroll.offset = self.scroll.offset.saturating_sub(10);
            }
            KeyCode::PageDown => {
                self.scroll.offset = self.scroll.offset.saturating_add(10);
            }
            KeyCode::Home => {
                self.scroll.offset = 0;
            }
            _ => {}
        }
    }

    fn select(&mut self, index: usize) {
        if index >= self.scenes.len() {
            self.status_message = "Already at the last scene".to_string();
            return;
        }
        self.current = index;
        self.scroll.offset = 0;
        self.status_message = format!("Showing {}", self.scenes[index].name);
    }
}
