use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::controller::Controller;
use crate::db::{EntryStore, StoreState};
use crate::listing::{ListView, Listing, RenderedEntry, SortMode};
use crate::models::FieldSet;

use super::forms::{ConfirmDelete, EntryForm};
use super::helpers::{centered_rect, key_hint, visible_window};
use super::screens::ListScreen;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Header space for the title and the active view.
const HEADER_HEIGHT: u16 = 3;

/// Fine-grained modes layered over the entry list.
enum Mode {
    Normal,
    Entering(EntryForm),
    ConfirmDelete(ConfirmDelete),
    ConfirmClear,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
///
/// Storage work never runs on the draw loop: key handlers spawn controller
/// tasks, and finished refreshes come back through `listings`.
pub struct App<S> {
    controller: Option<Controller<S>>,
    listings: Option<UnboundedReceiver<Listing>>,
    store_state: StoreState,
    field_set: FieldSet,
    screen: ListScreen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl<S: EntryStore + 'static> App<S> {
    pub fn new(controller: Controller<S>, listings: UnboundedReceiver<Listing>) -> Self {
        Self {
            field_set: controller.field_set(),
            controller: Some(controller),
            listings: Some(listings),
            store_state: StoreState::Open,
            screen: ListScreen::default(),
            mode: Mode::Normal,
            status: None,
        }
    }

    /// An app whose store failed to open. It renders, but every storage
    /// trigger is ignored.
    pub fn unavailable(field_set: FieldSet, reason: String) -> Self {
        let mut app = Self {
            controller: None,
            listings: None,
            store_state: StoreState::Unavailable(reason.clone()),
            field_set,
            screen: ListScreen::default(),
            mode: Mode::Normal,
            status: None,
        };
        app.set_status(format!("Error opening database: {reason}"), StatusKind::Error);
        app
    }

    /// Kick off the initial load.
    pub fn start(&self) {
        if let Some(controller) = &self.controller {
            controller.spawn_refresh(ListView::default());
        }
    }

    /// Apply every listing that finished since the last call. Returns how many
    /// arrived.
    pub fn poll_listings(&mut self) -> usize {
        let Some(rx) = self.listings.as_mut() else {
            return 0;
        };
        let mut received = 0;
        while let Ok(listing) = rx.try_recv() {
            self.screen.set_listing(listing);
            received += 1;
        }
        received
    }

    /// Handle a key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Entering(form) => self.handle_form_key(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::ConfirmClear => self.handle_confirm_clear(code),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
                return Mode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => self.screen.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.screen.move_selection(1),
            KeyCode::Home => self.screen.select_first(),
            KeyCode::End => self.screen.select_last(),
            _ => {}
        }

        if self.controller.is_none() {
            if matches!(
                code,
                KeyCode::Char('a' | 'e' | 'o' | 'f' | 'd' | 'D') | KeyCode::Enter
            ) {
                self.set_status("Storage is unavailable.", StatusKind::Error);
            }
            return Mode::Normal;
        }

        match code {
            KeyCode::Char('a') | KeyCode::Enter => {
                self.clear_status();
                return Mode::Entering(EntryForm::new(self.field_set));
            }
            KeyCode::Char('e') => {
                self.request_view(ListView::sorted(SortMode::Even));
                self.set_status("Showing even address numbers first.", StatusKind::Info);
            }
            KeyCode::Char('o') => {
                self.request_view(ListView::sorted(SortMode::Odd));
                self.set_status("Showing odd address numbers first.", StatusKind::Info);
            }
            KeyCode::Char('f') => {
                let filter = self.screen.listing.next_filter();
                let message = format!("Filter: {}", filter.selector());
                self.request_view(ListView::filtered(filter));
                self.set_status(message, StatusKind::Info);
            }
            KeyCode::Char('d') if self.field_set.supports_delete() => {
                if let Some(entry) = self.screen.current_entry() {
                    return Mode::ConfirmDelete(ConfirmDelete::from(entry));
                }
                self.set_status("No entry selected.", StatusKind::Error);
            }
            KeyCode::Char('D') if self.field_set.supports_delete() => {
                return Mode::ConfirmClear;
            }
            _ => {}
        }

        Mode::Normal
    }

    fn handle_form_key(&mut self, code: KeyCode, mut form: EntryForm) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                if let Some(controller) = &self.controller {
                    controller.spawn_submit(form.to_fields());
                }
                // The form clears straight away; the insert finishes on its own.
                form.reset();
                self.set_status("Entry submitted.", StatusKind::Info);
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Mode::Entering(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(controller) = &self.controller {
                    controller.spawn_delete(confirm.id);
                }
                self.set_status(format!("Deleting entry #{}.", confirm.id), StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Mode::Normal,
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_confirm_clear(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(controller) = &self.controller {
                    controller.spawn_clear();
                }
                self.set_status("Deleting all entries.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Mode::Normal,
            _ => Mode::ConfirmClear,
        }
    }

    fn request_view(&self, view: ListView) {
        debug!(?view, "refresh requested");
        if let Some(controller) = &self.controller {
            controller.spawn_refresh(view);
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT.min(area.height)),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        self.draw_entries(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Entering(form) => self.draw_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::ConfirmClear => self.draw_confirm_clear(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let view = self.screen.view();
        let state_style = if self.store_state.is_open() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };
        let line = Line::from(vec![
            Span::raw(format!("Order: {}   ", view.sort)),
            Span::raw(format!("Filter: {}   ", view.filter.selector())),
            Span::raw(format!("Shown: {}   ", self.screen.entries().len())),
            Span::raw("Store: "),
            Span::styled(self.store_state.to_string(), state_style),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Data Collection ({})", self.field_set));
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn draw_entries(&self, frame: &mut Frame, area: Rect) {
        let entries = self.screen.entries();
        if entries.is_empty() {
            let message = match self.store_state {
                StoreState::Open => "No entries yet. Press 'a' to add one.",
                _ => "Entries cannot be loaded.",
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(paragraph, area);
            return;
        }

        let card_height = self.field_set.fields().len() as u16 + 2;
        if area.height == 0 {
            return;
        }
        let capacity = (area.height / card_height).max(1) as usize;
        let window = visible_window(self.screen.selected, capacity, entries.len());

        let constraints: Vec<Constraint> = window
            .clone()
            .map(|_| Constraint::Length(card_height))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (chunk, index) in rows.iter().zip(window) {
            if chunk.height == 0 {
                continue;
            }
            let selected = index == self.screen.selected;
            self.render_entry_card(frame, *chunk, &entries[index], selected);
        }
    }

    fn render_entry_card(&self, frame: &mut Frame, area: Rect, entry: &RenderedEntry, selected: bool) {
        let mut title = vec![Span::styled(
            format!(" #{} ", entry.id),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if selected && self.field_set.supports_delete() {
            title.push(Span::styled("[d] Delete ", Style::default().fg(Color::Red)));
        }

        let mut block = Block::default().borders(Borders::ALL).title(Line::from(title));
        let mut paragraph_style = Style::default();
        if selected {
            block = block.style(Style::default().fg(Color::Yellow));
            paragraph_style = Style::default().fg(Color::Yellow);
        }

        let lines: Vec<Line> = entry
            .lines
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(
                        format!("{label}: "),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(value.clone()),
                ])
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .style(paragraph_style);
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let mut spans = Vec::new();
        match &self.mode {
            Mode::Entering(_) => {
                spans.extend(key_hint("Tab", "Next field"));
                spans.extend(key_hint("Shift+Tab", "Previous field"));
                spans.extend(key_hint("Enter", "Submit"));
                spans.extend(key_hint("Esc", "Close"));
            }
            Mode::ConfirmDelete(_) | Mode::ConfirmClear => {
                spans.extend(key_hint("y", "Confirm"));
                spans.extend(key_hint("n/Esc", "Cancel"));
            }
            Mode::Normal => {
                spans.extend(key_hint("a", "New entry"));
                spans.extend(key_hint("↑↓", "Select"));
                spans.extend(key_hint("e", "Even first"));
                spans.extend(key_hint("o", "Odd first"));
                spans.extend(key_hint("f", "Filter"));
                if self.field_set.supports_delete() {
                    spans.extend(key_hint("d", "Delete"));
                    spans.extend(key_hint("D", "Delete all"));
                }
                spans.extend(key_hint("q", "Quit"));
            }
        }
        Line::from(spans)
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &EntryForm) {
        let popup_area = centered_rect(70, 80, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("New Entry").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = (0..form.field_set.fields().len())
            .map(|index| form.build_line(index))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter to submit • Tab to switch • Esc to close",
            Style::default().fg(Color::Gray),
        )));

        frame.render_widget(Paragraph::new(lines), inner);

        let cursor_x = inner.x + form.cursor_offset() as u16;
        let cursor_y = inner.y + form.active_index() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right()), cursor_y.min(inner.bottom())));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let name = if confirm.name.is_empty() {
            "this entry"
        } else {
            confirm.name.as_str()
        };
        self.draw_confirm(
            frame,
            area,
            "Delete Entry",
            format!("Delete entry #{} ({name})?", confirm.id),
        );
    }

    fn draw_confirm_clear(&self, frame: &mut Frame, area: Rect) {
        self.draw_confirm(
            frame,
            area,
            "Delete All Entries",
            "Delete every stored entry?".to_string(),
        );
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, title: &str, question: String) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(question),
            Line::from("This cannot be undone."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<T: Into<String>>(&mut self, text: T, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::db::MemoryEntryStore;
    use crate::listing::ResultFilter;
    use crate::models::Field;

    fn app(field_set: FieldSet) -> App<MemoryEntryStore> {
        let (controller, rx) = Controller::new(Arc::new(MemoryEntryStore::new()), field_set);
        App::new(controller, rx)
    }

    /// Wait for the next published listing and apply it.
    async fn settle(app: &mut App<MemoryEntryStore>) {
        let listing = app
            .listings
            .as_mut()
            .unwrap()
            .recv()
            .await
            .expect("controller dropped");
        app.screen.set_listing(listing);
    }

    fn type_str(app: &mut App<MemoryEntryStore>, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    async fn add_entry(app: &mut App<MemoryEntryStore>, name: &str, address: &str, result: &str) {
        app.handle_key(KeyCode::Char('a'));
        type_str(app, name);
        app.handle_key(KeyCode::Tab);
        type_str(app, address);
        app.handle_key(KeyCode::BackTab);
        app.handle_key(KeyCode::BackTab);
        type_str(app, result);
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Esc);
        settle(app).await;
    }

    fn rendered_text(app: &App<MemoryEntryStore>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn submitting_resets_the_form_and_lists_the_entry() {
        let mut app = app(FieldSet::Extended);
        app.handle_key(KeyCode::Char('a'));
        type_str(&mut app, "Ada");
        app.handle_key(KeyCode::Enter);

        match &app.mode {
            Mode::Entering(form) => {
                assert_eq!(form.value(Field::Name), Some(""));
                assert_eq!(form.active_index(), 0);
            }
            _ => panic!("form should stay open after submit"),
        }

        settle(&mut app).await;
        let entry = app.screen.current_entry().unwrap();
        assert_eq!(entry.value(Field::Name), Some("Ada"));
        assert_eq!(entry.value(Field::Phone), Some("N/A"));
        assert_eq!(entry.value(Field::Address), Some(""));
    }

    #[tokio::test]
    async fn sort_and_filter_triggers_reset_each_other() {
        let mut app = app(FieldSet::Basic);
        add_entry(&mut app, "Odd", "3 Elm St", "Pass").await;
        add_entry(&mut app, "Even", "4 Oak St", "Fail").await;

        app.handle_key(KeyCode::Char('e'));
        settle(&mut app).await;
        assert_eq!(*app.screen.view(), ListView::sorted(SortMode::Even));
        assert_eq!(app.screen.entries()[0].value(Field::Name), Some("Even"));

        app.handle_key(KeyCode::Char('f'));
        settle(&mut app).await;
        assert_eq!(
            *app.screen.view(),
            ListView::filtered(ResultFilter::Exact("Pass".into()))
        );
        assert_eq!(app.screen.entries().len(), 1);
        assert_eq!(app.screen.entries()[0].value(Field::Name), Some("Odd"));

        app.handle_key(KeyCode::Char('o'));
        settle(&mut app).await;
        assert_eq!(app.screen.view().filter, ResultFilter::All);
        assert_eq!(app.screen.entries().len(), 2);
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let mut app = app(FieldSet::Extended);
        add_entry(&mut app, "Ada", "1 A St", "Pass").await;
        add_entry(&mut app, "Bob", "2 B St", "Pass").await;

        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Char('n'));
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.poll_listings(), 0);

        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Char('y'));
        settle(&mut app).await;
        let names: Vec<_> = app
            .screen
            .entries()
            .iter()
            .filter_map(|e| e.value(Field::Name))
            .collect();
        assert_eq!(names, vec!["Bob"]);
    }

    #[tokio::test]
    async fn delete_all_clears_the_list() {
        let mut app = app(FieldSet::Extended);
        add_entry(&mut app, "Ada", "1 A St", "Pass").await;

        app.handle_key(KeyCode::Char('D'));
        app.handle_key(KeyCode::Char('y'));
        settle(&mut app).await;
        assert!(app.screen.entries().is_empty());
    }

    #[tokio::test]
    async fn basic_variant_has_no_delete_controls() {
        let mut app = app(FieldSet::Basic);
        add_entry(&mut app, "Ada", "1 A St", "Pass").await;

        app.handle_key(KeyCode::Char('d'));
        assert!(matches!(app.mode, Mode::Normal));
        app.handle_key(KeyCode::Char('D'));
        assert!(matches!(app.mode, Mode::Normal));
        assert!(!rendered_text(&app).contains("Delete all"));
    }

    #[tokio::test]
    async fn cards_render_every_field() {
        let mut app = app(FieldSet::Basic);
        add_entry(&mut app, "Ada", "12 Main St", "Pass").await;

        let text = rendered_text(&app);
        assert!(text.contains("Name: Ada"));
        assert!(text.contains("Address: 12 Main St"));
        assert!(text.contains("Result: Pass"));
        assert!(text.contains("Store: open"));
    }

    #[test]
    fn unavailable_app_ignores_storage_triggers() {
        let mut app = App::<MemoryEntryStore>::unavailable(FieldSet::Extended, "disk gone".into());
        app.handle_key(KeyCode::Char('a'));
        assert!(matches!(app.mode, Mode::Normal));
        app.handle_key(KeyCode::Char('D'));
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.poll_listings(), 0);
        assert!(rendered_text(&app).contains("unavailable"));
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
