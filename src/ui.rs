// 📋 Terminal Form - member table, filter box, modal dialogs
//
// All key handling goes through App::handle_key so it can be driven
// without a terminal.

use crate::codec;
use crate::config::Settings;
use crate::entities::{KindTag, Member, MemberKind, MemberRegistry, MembershipStatus, PerformanceRecord};
use crate::storage;
use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    JoinDate,
}

impl SortField {
    pub fn next(&self) -> Self {
        match self {
            SortField::Id => SortField::Name,
            SortField::Name => SortField::JoinDate,
            SortField::JoinDate => SortField::Id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SortField::Id => "ID",
            SortField::Name => "Name",
            SortField::JoinDate => "Join Date",
        }
    }
}

// ============================================================================
// DIALOGS
// ============================================================================

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
}

/// Small modal form: one text input per field, Tab moves focus
#[derive(Debug, Clone)]
pub struct Form {
    pub title: String,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl Form {
    fn new(title: impl Into<String>, fields: Vec<(&'static str, String)>) -> Self {
        Form {
            title: title.into(),
            fields: fields
                .into_iter()
                .map(|(label, value)| FormField { label, value })
                .collect(),
            focus: 0,
        }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.trim()).unwrap_or("")
    }

    fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    fn previous_field(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    fn push(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    fn pop(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPurpose {
    AddMember,
    AddPerformance { id: String },
    SaveAs,
    ExportTable,
}

#[derive(Debug, Clone)]
pub enum Dialog {
    Form { purpose: FormPurpose, form: Form },
    ConfirmDelete { id: String, name: String },
    UpdateStatus { id: String, name: String, status: MembershipStatus },
    ConfirmExit,
}

#[derive(Debug, Clone)]
pub enum Mode {
    Browse,
    /// Typing into the filter box
    Filter,
    Dialog(Dialog),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub registry: MemberRegistry,
    pub settings: Settings,
    /// IDs of the rows currently shown, in registry order
    pub visible: Vec<String>,
    pub state: TableState,
    pub filter: String,
    pub sort: Option<SortField>,
    pub mode: Mode,
    pub show_detail: bool,
    pub message: Option<StatusMessage>,
    pub should_quit: bool,
    today: NaiveDate,
}

impl App {
    pub fn new(registry: MemberRegistry, settings: Settings) -> Self {
        let mut app = Self {
            registry,
            settings,
            visible: Vec::new(),
            state: TableState::default(),
            filter: String::new(),
            sort: None,
            mode: Mode::Browse,
            show_detail: false,
            message: None,
            should_quit: false,
            today: Local::now().date_naive(),
        };
        app.refresh();
        app
    }

    /// Rebuild the visible rows from the registry and the filter text
    pub fn refresh(&mut self) {
        let needle = self.filter.trim().to_lowercase();
        self.visible = self
            .registry
            .iter()
            .filter(|m| {
                needle.is_empty()
                    || m.id().to_lowercase().contains(&needle)
                    || m.name().to_lowercase().contains(&needle)
            })
            .map(|m| m.id().to_string())
            .collect();

        let selected = match self.state.selected() {
            _ if self.visible.is_empty() => None,
            Some(i) => Some(i.min(self.visible.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
    }

    pub fn selected_member(&self) -> Option<&Member> {
        self.state
            .selected()
            .and_then(|i| self.visible.get(i))
            .and_then(|id| self.registry.find_by_id(id))
    }

    fn select_id(&mut self, id: &str) {
        if let Some(pos) = self.visible.iter().position(|v| v.eq_ignore_ascii_case(id)) {
            self.state.select(Some(pos));
        }
    }

    fn info(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        warn!("{}", text);
        self.message = Some(StatusMessage {
            text,
            is_error: true,
        });
    }

    // ========================================================================
    // KEY HANDLING
    // ========================================================================

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match std::mem::replace(&mut self.mode, Mode::Browse) {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Filter => self.handle_filter_key(key),
            Mode::Dialog(dialog) => self.handle_dialog_key(dialog, key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.mode = Mode::Dialog(Dialog::ConfirmExit),
            KeyCode::Enter => self.show_detail = !self.show_detail,
            KeyCode::Char('/') => self.mode = Mode::Filter,
            KeyCode::Char('s') => self.cycle_sort(),
            KeyCode::Char('a') => self.open_add_member(),
            KeyCode::Char('d') => self.open_delete(),
            KeyCode::Char('f') => self.open_update_status(),
            KeyCode::Char('p') => self.open_add_performance(),
            KeyCode::Char('w') => {
                let form = Form::new("Save Member Data As", vec![("File", "members_backup.csv".to_string())]);
                self.mode = Mode::Dialog(Dialog::Form {
                    purpose: FormPurpose::SaveAs,
                    form,
                });
            }
            KeyCode::Char('x') => {
                let form = Form::new("Export Table", vec![("File", "members_table.csv".to_string())]);
                self.mode = Mode::Dialog(Dialog::Form {
                    purpose: FormPurpose::ExportTable,
                    form,
                });
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home => {
                if !self.visible.is_empty() {
                    self.state.select(Some(0));
                }
            }
            KeyCode::End => {
                if !self.visible.is_empty() {
                    self.state.select(Some(self.visible.len() - 1));
                }
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {}
            KeyCode::Esc => {
                self.filter.clear();
                self.refresh();
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.refresh();
                self.mode = Mode::Filter;
            }
            KeyCode::Char(c) => {
                self.filter.push(c);
                self.refresh();
                self.mode = Mode::Filter;
            }
            _ => self.mode = Mode::Filter,
        }
    }

    fn handle_dialog_key(&mut self, dialog: Dialog, key: KeyEvent) {
        match dialog {
            Dialog::Form { purpose, mut form } => match key.code {
                KeyCode::Esc => {}
                KeyCode::Enter => {
                    if !self.submit_form(&purpose, &form) {
                        self.mode = Mode::Dialog(Dialog::Form { purpose, form });
                    }
                }
                code => {
                    match code {
                        KeyCode::Tab | KeyCode::Down => form.next_field(),
                        KeyCode::BackTab | KeyCode::Up => form.previous_field(),
                        KeyCode::Backspace => form.pop(),
                        KeyCode::Char(c) => form.push(c),
                        _ => {}
                    }
                    self.mode = Mode::Dialog(Dialog::Form { purpose, form });
                }
            },
            Dialog::ConfirmDelete { id, name } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    if self.registry.delete(&id) {
                        info!(id = id.as_str(), "member deleted from form");
                        self.refresh();
                        self.info(format!("Member {} deleted successfully.", name));
                    } else {
                        self.error(format!("Member with ID {} not found.", id));
                    }
                }
                KeyCode::Char('n') | KeyCode::Esc => {}
                _ => self.mode = Mode::Dialog(Dialog::ConfirmDelete { id, name }),
            },
            Dialog::UpdateStatus { id, name, status } => match key.code {
                KeyCode::Enter => match self.registry.set_status(&id, status) {
                    Ok(()) => self.info(format!("Status for {} updated to {}.", name, status)),
                    Err(e) => self.error(e.to_string()),
                },
                KeyCode::Esc => {}
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') | KeyCode::Tab => {
                    self.mode = Mode::Dialog(Dialog::UpdateStatus {
                        id,
                        name,
                        status: status.toggled(),
                    });
                }
                _ => self.mode = Mode::Dialog(Dialog::UpdateStatus { id, name, status }),
            },
            Dialog::ConfirmExit => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    let path = self.settings.data_file.clone();
                    match storage::save_file(&path, &self.registry) {
                        Ok(_) => self.should_quit = true,
                        Err(e) => self.error(e.to_string()),
                    }
                }
                KeyCode::Char('n') | KeyCode::Esc => {}
                _ => self.mode = Mode::Dialog(Dialog::ConfirmExit),
            },
        }
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    fn cycle_sort(&mut self) {
        let field = self.sort.map(|s| s.next()).unwrap_or(SortField::Id);
        let selected = self.selected_member().map(|m| m.id().to_string());

        match field {
            SortField::Id => self.registry.sort_by_id(),
            SortField::Name => self.registry.sort_by_name(),
            SortField::JoinDate => self.registry.sort_by_join_date(),
        }
        self.sort = Some(field);
        self.refresh();
        if let Some(id) = selected {
            self.select_id(&id);
        }
        self.info(format!("Sorted by {}.", field.title()));
    }

    fn require_selection(&mut self) -> Option<(String, String)> {
        let selected = self
            .selected_member()
            .map(|m| (m.id().to_string(), m.name().to_string()));
        if selected.is_none() {
            self.error("Please select a member from the table first.");
        }
        selected
    }

    fn open_add_member(&mut self) {
        let form = Form::new(
            "Add New Member",
            vec![
                ("Member ID", String::new()),
                ("Full Name", String::new()),
                ("Member Type (Regular/Premium)", "Regular".to_string()),
                ("Personal Trainer Fee", "0.0".to_string()),
            ],
        );
        self.mode = Mode::Dialog(Dialog::Form {
            purpose: FormPurpose::AddMember,
            form,
        });
    }

    fn open_delete(&mut self) {
        if let Some((id, name)) = self.require_selection() {
            self.mode = Mode::Dialog(Dialog::ConfirmDelete { id, name });
        }
    }

    fn open_update_status(&mut self) {
        if let Some((id, name)) = self.require_selection() {
            let status = self
                .registry
                .find_by_id(&id)
                .map(|m| m.status())
                .unwrap_or_default();
            self.mode = Mode::Dialog(Dialog::UpdateStatus { id, name, status });
        }
    }

    fn open_add_performance(&mut self) {
        if let Some((id, name)) = self.require_selection() {
            let form = Form::new(
                format!("Add Performance for {}", name),
                vec![
                    ("Month (1-12)", self.today.month().to_string()),
                    ("Year", self.today.year().to_string()),
                    ("Goal Achieved (true/false)", "true".to_string()),
                ],
            );
            self.mode = Mode::Dialog(Dialog::Form {
                purpose: FormPurpose::AddPerformance { id },
                form,
            });
        }
    }

    /// Returns true when the dialog can close
    fn submit_form(&mut self, purpose: &FormPurpose, form: &Form) -> bool {
        match purpose {
            FormPurpose::AddMember => self.submit_add_member(form),
            FormPurpose::AddPerformance { id } => self.submit_performance(id, form),
            FormPurpose::SaveAs => {
                let path = form.value(0).to_string();
                if path.is_empty() {
                    self.error("Filename cannot be empty. Save cancelled.");
                    return false;
                }
                match storage::save_file(Path::new(&path), &self.registry) {
                    Ok(count) => {
                        self.info(format!("Saved {} members to {}", count, path));
                        true
                    }
                    Err(e) => {
                        self.error(e.to_string());
                        false
                    }
                }
            }
            FormPurpose::ExportTable => {
                let path = form.value(0).to_string();
                if path.is_empty() {
                    self.error("Filename cannot be empty. Export cancelled.");
                    return false;
                }
                match storage::export_table(Path::new(&path), &self.registry, &self.settings.fees) {
                    Ok(count) => {
                        self.info(format!("Exported {} rows to {}", count, path));
                        true
                    }
                    Err(e) => {
                        self.error(e.to_string());
                        false
                    }
                }
            }
        }
    }

    fn submit_add_member(&mut self, form: &Form) -> bool {
        let (id, name) = (form.value(0), form.value(1));
        if id.is_empty() || name.is_empty() {
            self.error("ID and Name cannot be empty.");
            return false;
        }

        let kind = match form.value(2).parse::<KindTag>() {
            Ok(KindTag::Regular) => MemberKind::Regular,
            Ok(KindTag::Premium) => match form.value(3).parse::<f64>() {
                Ok(fee) => MemberKind::Premium { trainer_fee: fee },
                Err(_) => {
                    self.error("Invalid fee format. Please enter a number.");
                    return false;
                }
            },
            Err(e) => {
                self.error(e.to_string());
                return false;
            }
        };

        let result =
            Member::new(id, name, self.today, kind).and_then(|member| self.registry.add(member));
        match result {
            Ok(()) => {
                self.refresh();
                self.select_id(id);
                self.info("Member added successfully!");
                true
            }
            Err(e) => {
                self.error(e.to_string());
                false
            }
        }
    }

    fn submit_performance(&mut self, id: &str, form: &Form) -> bool {
        let month = form.value(0).parse::<u32>();
        let year = form.value(1).parse::<i32>();
        let (Ok(month), Ok(year)) = (month, year) else {
            self.error("Invalid month or year.");
            return false;
        };
        let achieved = match form.value(2).to_lowercase().as_str() {
            "true" | "yes" | "y" => true,
            "false" | "no" | "n" => false,
            _ => {
                self.error("Goal achieved must be true or false.");
                return false;
            }
        };

        let result = PerformanceRecord::new(month, year, achieved)
            .and_then(|record| self.registry.add_performance(id, record));
        match result {
            Ok(()) => {
                self.info("Performance record added.");
                true
            }
            Err(e) => {
                self.error(e.to_string());
                false
            }
        }
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub fn next(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = self
            .state
            .selected()
            .map(|i| (i + 20).min(len - 1))
            .unwrap_or(0);
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = self.state.selected().map(|i| i.saturating_sub(20)).unwrap_or(0);
        self.state.select(Some(i));
    }
}

// ============================================================================
// TERMINAL LOOP
// ============================================================================

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table (+ detail)
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);

    if let Mode::Dialog(dialog) = &app.mode {
        render_dialog(f, dialog);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let (regular, premium) = app.registry.kind_counts();

    let mut spans = vec![
        Span::styled(
            "Gym Member Management",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Total: {}", app.registry.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(format!("Regular: {}", regular), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled(format!("Premium: {}", premium), Style::default().fg(Color::Magenta)),
    ];

    if let Some(sort) = app.sort {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("Sort: {}", sort.title()),
            Style::default().fg(Color::Cyan),
        ));
    }

    let filter_style = if matches!(app.mode, Mode::Filter) {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    if !app.filter.is_empty() || matches!(app.mode, Mode::Filter) {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(format!("Filter: {}_", app.filter), filter_style));
    }

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = codec::TABLE_COLUMNS.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let fees = app.settings.fees;
    let rows: Vec<Row> = app
        .visible
        .iter()
        .filter_map(|id| app.registry.find_by_id(id))
        .map(|member| {
            let [id, name, kind, joined, status, fee, details] = codec::table_row(member, &fees);
            let status_color = match member.status() {
                MembershipStatus::Active => Color::Green,
                MembershipStatus::Frozen => Color::Blue,
            };
            let kind_color = match member.kind().tag() {
                KindTag::Regular => Color::White,
                KindTag::Premium => Color::Magenta,
            };

            Row::new(vec![
                Cell::from(id),
                Cell::from(truncate(&name, 28)),
                Cell::from(kind).style(Style::default().fg(kind_color)),
                Cell::from(joined),
                Cell::from(status).style(Style::default().fg(status_color)),
                Cell::from(fee),
                Cell::from(details),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(30),
            Constraint::Length(9),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(16),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Members "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Member Details ");

    let Some(member) = app.selected_member() else {
        f.render_widget(Paragraph::new("No member selected").block(block), area);
        return;
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut content = vec![
        Line::from(""),
        Line::from(vec![Span::styled("  ID: ", label), Span::raw(member.id().to_string())]),
        Line::from(vec![Span::styled("  Name: ", label), Span::raw(member.name().to_string())]),
        Line::from(vec![
            Span::styled("  Type: ", label),
            Span::raw(member.kind().tag().to_string()),
        ]),
        Line::from(vec![
            Span::styled("  Joined: ", label),
            Span::raw(member.join_date().to_string()),
        ]),
        Line::from(vec![
            Span::styled("  Status: ", label),
            Span::raw(member.status().to_string()),
        ]),
        Line::from(vec![
            Span::styled("  Monthly Fee: ", label),
            Span::raw(format!("${:.2}", app.settings.fees.monthly_fee(member))),
        ]),
    ];
    if let Some(fee) = member.kind().trainer_fee() {
        content.push(Line::from(vec![
            Span::styled("  Trainer Fee: ", label),
            Span::raw(format!("${:.2}", fee)),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![Span::styled(
        "  PERFORMANCE",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    )]));
    if member.history().is_empty() {
        content.push(Line::from("  None"));
    }
    for record in member.history() {
        let color = if record.goal_achieved() { Color::Green } else { Color::Red };
        content.push(Line::from(Span::styled(
            format!("  {}", record),
            Style::default().fg(color),
        )));
    }

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let mut spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.visible.len()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(message) = &app.message {
        let color = if message.is_error { Color::Red } else { Color::Green };
        spans.push(Span::raw("| "));
        spans.push(Span::styled(message.text.clone(), Style::default().fg(color)));
        spans.push(Span::raw(" "));
    }

    for (key, action) in [
        ("a", "Add"),
        ("d", "Delete"),
        ("f", "Status"),
        ("p", "Perf"),
        ("/", "Filter"),
        ("s", "Sort"),
        ("w", "Save as"),
        ("x", "Export"),
        ("q", "Exit"),
    ] {
        spans.push(Span::raw("| "));
        spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {} ", action)));
    }

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_dialog(f: &mut Frame, dialog: &Dialog) {
    let hint = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);

    let (title, lines): (String, Vec<Line>) = match dialog {
        Dialog::Form { form, .. } => {
            let mut lines = vec![Line::from("")];
            for (i, field) in form.fields.iter().enumerate() {
                let focused = i == form.focus;
                let value_style = if focused {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}: ", field.label), Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!("{}{}", field.value, if focused { "_" } else { "" }),
                        value_style,
                    ),
                ]));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  Tab next field | Enter OK | Esc cancel",
                hint,
            )));
            (form.title.clone(), lines)
        }
        Dialog::ConfirmDelete { name, .. } => (
            "Confirm Deletion".to_string(),
            vec![
                Line::from(""),
                Line::from(format!("  Are you sure you want to delete {}?", name)),
                Line::from(""),
                Line::from(Span::styled("  y delete | n cancel", hint)),
            ],
        ),
        Dialog::UpdateStatus { name, status, .. } => (
            format!("Update Status for {}", name),
            vec![
                Line::from(""),
                Line::from(vec![
                    Span::raw("  New status: "),
                    Span::styled(
                        format!("< {} >", status),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(""),
                Line::from(Span::styled("  ←/→ change | Enter OK | Esc cancel", hint)),
            ],
        ),
        Dialog::ConfirmExit => (
            "Exit".to_string(),
            vec![
                Line::from(""),
                Line::from("  Save to the default file and exit?"),
                Line::from(""),
                Line::from(Span::styled("  y save & exit | n cancel", hint)),
            ],
        ),
    };

    let area = centered_rect(60, 40, f.size());
    let dialog = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(format!(" {} ", title)),
        );

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
