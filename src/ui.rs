use anyhow::Result;
use bills_manager::bill::{DATE_FORMAT, FALLBACK_CATEGORY};
use bills_manager::{
    export_to_csv, import_from_csv, spawn_query, AiClient, AiReply, BillDraft, BillStore,
    Settings, StoreError, Summary,
};
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
    widgets::{BarChart, Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::cell::RefCell;
use std::io;
use std::path::Path;
use std::rc::Rc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;
use tracing::{error, info};

const TICK: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Bills,
    Analysis,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Bills => Page::Analysis,
            Page::Analysis => Page::Bills,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Bills => "Bills",
            Page::Analysis => "Analysis",
        }
    }
}

// ============================================================================
// DIALOG STATE
// ============================================================================

const FORM_FIELDS: usize = 5;
const TYPE_FIELD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Add,
    Edit(usize),
}

/// Add/Edit dialog. Add picks the type from the category list;
/// Edit keeps it as free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillForm {
    pub target: FormTarget,
    /// date, name, details, cost, type
    pub fields: [String; FORM_FIELDS],
    pub focus: usize,
    pub category: usize,
}

impl BillForm {
    fn add() -> Self {
        let now = chrono::Local::now().format(DATE_FORMAT).to_string();
        BillForm {
            target: FormTarget::Add,
            fields: [now, String::new(), String::new(), String::new(), String::new()],
            focus: 1,
            category: 0,
        }
    }

    fn edit(index: usize, draft: BillDraft) -> Self {
        BillForm {
            target: FormTarget::Edit(index),
            fields: [draft.date, draft.name, draft.details, draft.cost, draft.kind],
            focus: 0,
            category: 0,
        }
    }

    fn picks_category(&self) -> bool {
        self.target == FormTarget::Add
    }

    fn labels(&self) -> [&'static str; FORM_FIELDS] {
        match self.target {
            FormTarget::Add => ["Date", "Name", "Details", "Cost (number only)", "Type"],
            FormTarget::Edit(_) => ["Date", "Name", "Details", "Cost", "Type"],
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        if self.picks_category() && self.focus == TYPE_FIELD {
            None
        } else {
            self.fields.get_mut(self.focus)
        }
    }

    fn draft(&self, categories: &[String]) -> BillDraft {
        let kind = if self.picks_category() {
            categories
                .get(self.category)
                .cloned()
                .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
        } else {
            self.fields[TYPE_FIELD].clone()
        };

        BillDraft {
            date: self.fields[0].clone(),
            name: self.fields[1].clone(),
            details: self.fields[2].clone(),
            cost: self.fields[3].trim().to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathAction {
    Import,
    Export,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrompt {
    pub action: PathAction,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Form(BillForm),
    Path(PathPrompt),
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub from_user: bool,
    pub text: String,
}

#[derive(Default)]
pub struct ChatState {
    pub lines: Vec<ChatLine>,
    pub input: String,
    pending: Vec<Receiver<AiReply>>,
}

impl ChatState {
    pub fn waiting(&self) -> usize {
        self.pending.len()
    }
}

// ============================================================================
// APP
// ============================================================================

pub struct App {
    pub store: BillStore,
    summary: Rc<RefCell<Summary>>,
    pub state: TableState,
    pub current_page: Page,
    pub mode: Mode,
    pub error_popup: Option<String>,
    pub status: Option<String>,
    pub chat: ChatState,
    settings: Settings,
    ai: Option<AiClient>,
}

impl App {
    pub fn new(mut store: BillStore, settings: Settings) -> Self {
        // Charts and the total label are rebuilt on every store change
        let summary = Rc::new(RefCell::new(Summary::compute(store.bills())));
        let sink = Rc::clone(&summary);
        store.subscribe(move |bills| *sink.borrow_mut() = Summary::compute(bills));

        let ai = match AiClient::new(&settings.ai) {
            Ok(client) => {
                if client.is_enabled() {
                    info!("AI queries go to {}", client.endpoint());
                }
                Some(client)
            }
            Err(e) => {
                error!("AI client unavailable: {}", e);
                None
            }
        };

        let mut state = TableState::default();
        if !store.is_empty() {
            state.select(Some(0));
        }

        Self {
            store,
            summary,
            state,
            current_page: Page::Bills,
            mode: Mode::Normal,
            error_popup: None,
            status: None,
            chat: ChatState::default(),
            settings,
            ai,
        }
    }

    /// Chat panel title: where questions go, or that they go nowhere.
    pub fn chat_title(&self) -> String {
        match self.ai.as_ref().filter(|client| client.is_enabled()) {
            Some(client) => format!(" Ask AI ({}) ", client.endpoint()),
            None => " Ask AI (disabled) ".to_string(),
        }
    }

    pub fn summary(&self) -> Summary {
        self.summary.borrow().clone()
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected().filter(|i| *i < self.store.len())
    }

    pub fn next(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn clamp_selection(&mut self) {
        let len = self.store.len();
        if len == 0 {
            self.state.select(None);
        } else {
            let i = self.state.selected().unwrap_or(0).min(len - 1);
            self.state.select(Some(i));
        }
    }

    // ========================================================================
    // KEY HANDLING
    // ========================================================================

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Error popup is modal: any key dismisses it, the dialog under it stays
        if self.error_popup.take().is_some() {
            return false;
        }

        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => return self.handle_normal_key(key),
            Mode::Form(form) => self.handle_form_key(form, key),
            Mode::Path(prompt) => self.handle_path_key(prompt, key),
            Mode::Chat => self.handle_chat_key(key),
        }
        false
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::BackTab => self.current_page = self.current_page.next(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => self.clamp_to(0),
            KeyCode::End => self.clamp_to(usize::MAX),
            KeyCode::Char('a') => self.mode = Mode::Form(BillForm::add()),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(index) = self.selected() {
                    let draft = BillDraft::from_bill(&self.store.bills()[index]);
                    self.mode = Mode::Form(BillForm::edit(index, draft));
                }
            }
            KeyCode::Char('d') => {
                if let Some(index) = self.selected() {
                    self.delete(index);
                }
            }
            KeyCode::Char('i') => {
                self.mode = Mode::Path(PathPrompt {
                    action: PathAction::Import,
                    input: String::new(),
                })
            }
            KeyCode::Char('x') => {
                self.mode = Mode::Path(PathPrompt {
                    action: PathAction::Export,
                    input: String::new(),
                })
            }
            KeyCode::Char('/') => {
                self.current_page = Page::Analysis;
                self.mode = Mode::Chat;
            }
            _ => {}
        }
        false
    }

    fn clamp_to(&mut self, index: usize) {
        if !self.store.is_empty() {
            self.state.select(Some(index.min(self.store.len() - 1)));
        }
    }

    fn handle_form_key(&mut self, mut form: BillForm, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                self.submit_form(form);
                return;
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let FormTarget::Edit(index) = form.target {
                    self.delete(index);
                    return;
                }
            }
            KeyCode::Tab | KeyCode::Down => form.focus = (form.focus + 1) % FORM_FIELDS,
            KeyCode::BackTab | KeyCode::Up => {
                form.focus = (form.focus + FORM_FIELDS - 1) % FORM_FIELDS
            }
            KeyCode::Left | KeyCode::Right
                if form.picks_category() && form.focus == TYPE_FIELD =>
            {
                let count = self.settings.categories.len().max(1);
                form.category = if key.code == KeyCode::Right {
                    (form.category + 1) % count
                } else {
                    (form.category + count - 1) % count
                };
            }
            KeyCode::Backspace => {
                if let Some(text) = form.focused_text() {
                    text.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(text) = form.focused_text() {
                    text.push(c);
                }
            }
            _ => {}
        }
        self.mode = Mode::Form(form);
    }

    fn submit_form(&mut self, form: BillForm) {
        let draft = form.draft(&self.settings.categories);

        let result = match form.target {
            FormTarget::Add => self.store.add(&draft).map(|index| {
                self.state.select(Some(index));
                "Bill added".to_string()
            }),
            FormTarget::Edit(index) => match self.store.update(index, &draft) {
                Ok(()) => Ok("Bill updated".to_string()),
                Err(StoreError::Invalid(e)) => Err(e),
                Err(e @ StoreError::OutOfRange { .. }) => {
                    self.status = Some(e.to_string());
                    return;
                }
            },
        };

        match result {
            Ok(message) => self.status = Some(message),
            Err(e) => {
                // Keep the dialog open for correction
                self.error_popup = Some(e.to_string());
                self.mode = Mode::Form(form);
            }
        }
    }

    fn delete(&mut self, index: usize) {
        if let Some(bill) = self.store.remove(index) {
            self.status = Some(format!("Deleted \"{}\"", bill.name));
            self.clamp_selection();
        }
    }

    fn handle_path_key(&mut self, mut prompt: PathPrompt, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                let input = prompt.input.trim().to_string();
                if !input.is_empty() {
                    match prompt.action {
                        PathAction::Import => self.import(Path::new(&input)),
                        PathAction::Export => self.export(Path::new(&input)),
                    }
                }
                return;
            }
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Char(c) => prompt.input.push(c),
            _ => {}
        }
        self.mode = Mode::Path(prompt);
    }

    /// Replace the store with the file's bills. A file that cannot be read
    /// leaves the current bills in place.
    pub fn import(&mut self, path: &Path) {
        match import_from_csv(path, self.settings.header_mode) {
            Ok(report) => {
                let count = report.bills.len();
                self.store.replace_all(report.bills);
                self.state.select(if count == 0 { None } else { Some(0) });

                self.status = Some(if report.rejected.is_empty() {
                    format!("Imported {} bills", count)
                } else {
                    let lines: Vec<String> =
                        report.rejected.iter().map(|r| r.line().to_string()).collect();
                    format!(
                        "Imported {} bills, rejected {} malformed rows (lines {})",
                        count,
                        report.rejected.len(),
                        lines.join(", ")
                    )
                });
            }
            Err(e) => {
                error!("import failed: {:#}", e);
                self.status = Some(format!("Import failed: {:#}", e));
            }
        }
    }

    pub fn export(&mut self, path: &Path) {
        match export_to_csv(self.store.bills(), path) {
            Ok(written) => {
                self.status = Some(format!(
                    "Exported {} bills to {}",
                    self.store.len(),
                    written.display()
                ))
            }
            Err(e) => {
                error!("export failed: {:#}", e);
                self.status = Some(format!("Export failed: {:#}", e));
            }
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => self.send_question(),
            KeyCode::Backspace => {
                self.chat.input.pop();
            }
            KeyCode::Char(c) => self.chat.input.push(c),
            _ => {}
        }
        self.mode = Mode::Chat;
    }

    fn send_question(&mut self) {
        let question = self.chat.input.trim().to_string();
        if question.is_empty() {
            return;
        }
        self.chat.input.clear();
        self.chat.lines.push(ChatLine {
            from_user: true,
            text: format!("You: {}", question),
        });

        match self.ai.as_ref().filter(|client| client.is_enabled()) {
            Some(client) => {
                info!("queued AI question");
                let rx = spawn_query(client.clone(), self.store.bills().to_vec(), question);
                self.chat.pending.push(rx);
            }
            None => {
                let reply = AiReply {
                    question,
                    reply: None,
                };
                self.push_reply(&reply);
            }
        }
    }

    fn push_reply(&mut self, reply: &AiReply) {
        self.chat.lines.push(ChatLine {
            from_user: false,
            text: reply.display_text(),
        });
    }

    /// Move finished background replies into the transcript.
    pub fn poll_replies(&mut self) {
        let mut waiting = Vec::new();
        let mut done = Vec::new();

        for rx in self.chat.pending.drain(..) {
            match rx.try_recv() {
                Ok(reply) => done.push(reply),
                Err(TryRecvError::Empty) => waiting.push(rx),
                Err(TryRecvError::Disconnected) => done.push(AiReply {
                    question: String::new(),
                    reply: None,
                }),
            }
        }

        self.chat.pending = waiting;
        for reply in done {
            self.push_reply(&reply);
        }
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
        error!("UI loop failed: {}", err);
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.poll_replies();
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Bills => render_table(f, chunks[1], app),
        Page::Analysis => render_analysis(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);

    match &app.mode {
        Mode::Form(form) => render_form(f, form, &app.settings.categories),
        Mode::Path(prompt) => render_path_prompt(f, prompt),
        Mode::Normal | Mode::Chat => {}
    }

    if let Some(message) = &app.error_popup {
        render_error(f, message);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, page) in [Page::Bills, Page::Analysis].iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title().to_string(), style));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("{} bills", app.store.len()),
        Style::default().fg(Color::White),
    ));
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        app.summary.borrow().total_label(),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Bills Manager "),
    );

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Date", "Name", "Details", "Cost", "Type"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = app
        .store
        .bills()
        .iter()
        .map(|bill| {
            Row::new(vec![
                Cell::from(bill.date.clone()),
                Cell::from(truncate(&bill.name, 24)),
                Cell::from(truncate(&bill.details, 32)),
                Cell::from(bill.cost.clone()).style(Style::default().fg(Color::Red)),
                Cell::from(truncate(&bill.kind, 16)),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(17),
            Constraint::Length(26),
            Constraint::Length(34),
            Constraint::Length(14),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Bills "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_analysis(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[0]);

    let summary = app.summary.borrow();
    render_date_chart(f, charts[0], &summary);
    render_categories(f, charts[1], &summary);
    render_chat(f, columns[1], app);
}

fn render_date_chart(f: &mut Frame, area: Rect, summary: &Summary) {
    // Bars are whole units; refunds below zero render as empty bars
    let data: Vec<(&str, u64)> = summary
        .by_date
        .iter()
        .map(|(day, amount)| (day.as_str(), amount.max(0.0).round() as u64))
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Total Cost by Date "),
        )
        .data(data.as_slice())
        .bar_width(10)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::LightGreen))
        .value_style(Style::default().fg(Color::Black).bg(Color::LightGreen));

    f.render_widget(chart, area);
}

fn render_categories(f: &mut Frame, area: Rect, summary: &Summary) {
    let header = Row::new(["Category", "Cost", "Share", ""].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }));

    let rows: Vec<Row> = summary
        .category_shares()
        .into_iter()
        .map(|(category, amount, share)| {
            let bar = "█".repeat((share.clamp(0.0, 100.0) / 5.0).round() as usize);
            Row::new(vec![
                Cell::from(truncate(&category, 16)),
                Cell::from(format!("{:.2}", amount)),
                Cell::from(format!("{:.1}%", share)),
                Cell::from(bar).style(Style::default().fg(Color::Magenta)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Total Cost by Category "),
    );

    f.render_widget(table, area);
}

fn render_chat(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let width = chunks[0].width.saturating_sub(2).max(10) as usize;
    let mut lines: Vec<Line> = Vec::new();
    for message in &app.chat.lines {
        let style = if message.from_user {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::White)
        };
        for piece in wrap_text(&message.text, width).lines() {
            lines.push(Line::from(Span::styled(piece.to_string(), style)));
        }
        lines.push(Line::from(""));
    }
    if app.chat.waiting() > 0 {
        lines.push(Line::from(Span::styled(
            "AI is thinking...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Keep the newest lines in view
    let visible = chunks[0].height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let transcript = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.chat_title()),
        )
        .scroll((scroll, 0));
    f.render_widget(transcript, chunks[0]);

    let focused = app.mode == Mode::Chat;
    let input_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input_text = if focused || !app.chat.input.is_empty() {
        format!("{}▏", app.chat.input)
    } else {
        "Press / to ask (e.g. Which day had the highest spending?)".to_string()
    };
    let input = Paragraph::new(input_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(input_style)
            .title(" Question "),
    );
    f.render_widget(input, chunks[1]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.selected().map(|i| i + 1).unwrap_or(0);

    let mut spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.store.len()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(status) = &app.status {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Green)));
    }

    let keys: &[(&str, &str)] = match app.mode {
        Mode::Chat => &[("Enter", "Send"), ("Esc", "Back")],
        _ => &[
            ("a", "Add"),
            ("e", "Edit"),
            ("d", "Delete"),
            ("i", "Import"),
            ("x", "Export"),
            ("/", "Ask AI"),
            ("Tab", "Page"),
        ],
    };
    for (key, label) in keys {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {}", label)));
    }
    spans.push(Span::raw(" | "));
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_form(f: &mut Frame, form: &BillForm, categories: &[String]) {
    let area = centered_rect(60, 14, f.size());
    f.render_widget(Clear, area);

    let title = match form.target {
        FormTarget::Add => " Add Bill ",
        FormTarget::Edit(_) => " Edit Bill ",
    };

    let mut lines = vec![Line::from("")];
    for (i, label) in form.labels().iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let mut spans = vec![Span::styled(format!(" {:<20}", format!("{}:", label)), label_style)];
        if i == TYPE_FIELD && form.picks_category() {
            for (c, category) in categories.iter().enumerate() {
                let mark = if c == form.category { "(•)" } else { "( )" };
                spans.push(Span::raw(format!("{} {}  ", mark, category)));
            }
        } else {
            let cursor = if focused { "▏" } else { "" };
            spans.push(Span::raw(format!("{}{}", form.fields[i], cursor)));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    let mut help = vec![
        Span::styled(" Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Save | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Next field | "),
    ];
    if form.picks_category() {
        help.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
        help.push(Span::raw(" Type | "));
    } else {
        help.push(Span::styled("Ctrl+D", Style::default().fg(Color::Red)));
        help.push(Span::raw(" Delete Bill | "));
    }
    help.push(Span::styled("Esc", Style::default().fg(Color::Yellow)));
    help.push(Span::raw(" Cancel"));
    lines.push(Line::from(help));

    let dialog = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );
    f.render_widget(dialog, area);
}

fn render_path_prompt(f: &mut Frame, prompt: &PathPrompt) {
    let area = centered_rect(60, 5, f.size());
    f.render_widget(Clear, area);

    let title = match prompt.action {
        PathAction::Import => " Open CSV file ",
        PathAction::Export => " Save CSV file ",
    };

    let dialog = Paragraph::new(vec![
        Line::from(format!(" {}▏", prompt.input)),
        Line::from(Span::styled(
            " Enter to confirm, Esc to cancel (*.csv)",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );
    f.render_widget(dialog, area);
}

fn render_error(f: &mut Frame, message: &str) {
    let area = centered_rect(50, 6, f.size());
    f.render_widget(Clear, area);

    let width = area.width.saturating_sub(4).max(10) as usize;
    let mut lines: Vec<Line> = wrap_text(message, width)
        .lines()
        .map(|l| Line::from(format!(" {}", l)))
        .collect();
    lines.push(Line::from(Span::styled(
        " Press any key",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Error "),
    );
    f.render_widget(popup, area);
}

/// Rectangle of `percent_x` width and fixed `height`, centered in `r`.
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = r.width * percent_x / 100;
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width.saturating_sub(width)) / 2,
        y: r.y + (r.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > width {
                result.push_str(&current);
                result.push('\n');
                current.clear();
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        result.push_str(&current);
        result.push('\n');
    }
    result
}

// ============================================================================
// TESTS
// ============================================================================
