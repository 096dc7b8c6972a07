use anyhow::Result;
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
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use wastewise::render::{count_label, tab_label, APP_NAME};
use wastewise::{
    category_counts, confusing_items, query, AdviceBook, Catalogue, CategoryCounts, CategoryKey,
    Category, Item,
};

const TOAST_DURATION: Duration = Duration::from_millis(1600);
const PAGE_STEP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Search,
    Confusing,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Search => Page::Confusing,
            Page::Confusing => Page::Search,
        }
    }

    pub fn previous(&self) -> Self {
        // Only two pages
        self.next()
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Search => "Search",
            Page::Confusing => "Commonly confusing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Short-lived status message
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub shown_at: Instant,
}

pub struct App {
    pub catalogue: Catalogue,
    pub advice: AdviceBook,
    pub counts: CategoryCounts,
    pub confusing: Vec<Item>,
    pub results: Vec<Item>,
    pub search: String,
    pub category: CategoryKey,
    pub state: TableState,
    pub confusing_state: TableState,
    pub current_page: Page,
    pub input_mode: InputMode,
    pub show_detail: bool,
    pub toast: Option<Toast>,
}

impl App {
    pub fn new(catalogue: Catalogue, advice: AdviceBook) -> Self {
        let counts = category_counts(&catalogue);
        let confusing: Vec<Item> = confusing_items(&catalogue).into_iter().cloned().collect();

        let mut confusing_state = TableState::default();
        if !confusing.is_empty() {
            confusing_state.select(Some(0));
        }

        let mut app = Self {
            catalogue,
            advice,
            counts,
            confusing,
            results: Vec::new(),
            search: String::new(),
            category: CategoryKey::All,
            state: TableState::default(),
            confusing_state,
            current_page: Page::Search,
            input_mode: InputMode::Normal,
            show_detail: false,
            toast: None,
        };
        app.refresh();
        app
    }

    /// Re-run the query for the current search text and category
    pub fn refresh(&mut self) {
        self.results = query(&self.catalogue, &self.search, &self.category)
            .into_iter()
            .cloned()
            .collect();

        // Reset selection to first item
        if self.results.is_empty() {
            self.state.select(None);
            self.show_toast("No items match");
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn show_toast(&mut self, message: &str) {
        self.toast = Some(Toast {
            message: message.to_string(),
            shown_at: Instant::now(),
        });
    }

    pub fn active_toast(&self) -> Option<&str> {
        self.toast
            .as_ref()
            .filter(|t| t.shown_at.elapsed() < TOAST_DURATION)
            .map(|t| t.message.as_str())
    }

    pub fn push_char(&mut self, c: char) {
        self.search.push(c);
        self.refresh();
    }

    pub fn pop_char(&mut self) {
        if self.search.pop().is_some() {
            self.refresh();
        }
    }

    pub fn set_category(&mut self, key: CategoryKey) {
        self.category = key;
        self.current_page = Page::Search;
        self.refresh();
    }

    /// Select the n-th tab (0 = all)
    pub fn select_tab(&mut self, index: usize) {
        if let Some(key) = CategoryKey::tabs().into_iter().nth(index) {
            self.set_category(key);
        }
    }

    fn tab_index(&self) -> usize {
        CategoryKey::tabs()
            .iter()
            .position(|k| *k == self.category)
            .unwrap_or(0)
    }

    pub fn next_category(&mut self) {
        let len = CategoryKey::tabs().len();
        self.select_tab((self.tab_index() + 1) % len);
    }

    pub fn previous_category(&mut self) {
        let len = CategoryKey::tabs().len();
        self.select_tab((self.tab_index() + len - 1) % len);
    }

    pub fn clear_filter(&mut self) {
        self.search.clear();
        self.category = CategoryKey::All;
        self.refresh();
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    fn visible(&self) -> &[Item] {
        match self.current_page {
            Page::Search => &self.results,
            Page::Confusing => &self.confusing,
        }
    }

    fn visible_state(&mut self) -> &mut TableState {
        match self.current_page {
            Page::Search => &mut self.state,
            Page::Confusing => &mut self.confusing_state,
        }
    }

    pub fn selected_item(&self) -> Option<&Item> {
        let state = match self.current_page {
            Page::Search => &self.state,
            Page::Confusing => &self.confusing_state,
        };
        state.selected().and_then(|i| self.visible().get(i))
    }

    pub fn next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let state = self.visible_state();
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let state = self.visible_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let state = self.visible_state();
        let i = state.selected().map(|i| (i + PAGE_STEP).min(len - 1)).unwrap_or(0);
        state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.visible().is_empty() {
            return;
        }
        let state = self.visible_state();
        let i = state.selected().map(|i| i.saturating_sub(PAGE_STEP)).unwrap_or(0);
        state.select(Some(i));
    }

    pub fn first(&mut self) {
        if !self.visible().is_empty() {
            self.visible_state().select(Some(0));
        }
    }

    pub fn last(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.visible_state().select(Some(len - 1));
        }
    }

    /// Apply one key press. Returns true when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.input_mode == InputMode::Editing {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Normal,
                KeyCode::Backspace => self.pop_char(),
                KeyCode::Char(c) => self.push_char(c),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('/') => {
                self.current_page = Page::Search;
                self.input_mode = InputMode::Editing;
            }
            KeyCode::Enter => self.toggle_detail(),
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.next_category(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => self.previous_category(),
            KeyCode::Char('p') => self.next_page(),
            KeyCode::Char('P') => self.previous_page(),
            KeyCode::Char('c') => self.clear_filter(),
            KeyCode::Char(c @ '1'..='6') => self.select_tab(c as usize - '1' as usize),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home => self.first(),
            KeyCode::End => self.last(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search.clear();
                self.refresh();
            }
            _ => {}
        }

        false
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal UI failed");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Poll so an expired toast disappears without a key press
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }

        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            _ => continue,
        };

        if app.handle_key(key) {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with category tabs
            Constraint::Length(3), // Search line
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_search(f, chunks[1], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(50), // Item list
                Constraint::Percentage(50), // Detail panel
            ])
            .split(chunks[2]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[2], app);
    }

    render_status_bar(f, chunks[3], app);
}

fn category_color(category: &Category) -> Color {
    match category {
        Category::Wet => Color::Green,
        Category::DryRecyclable => Color::Cyan,
        Category::DryNonRecyclable => Color::Yellow,
        Category::EWaste => Color::Magenta,
        Category::Biomedical => Color::Red,
        Category::Other(_) => Color::White,
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![Span::styled(
        format!("{} ", APP_NAME),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )];

    for (i, (key, count)) in app.counts.entries().iter().enumerate() {
        tab_spans.push(Span::raw(if i == 0 { " " } else { " │ " }));

        let style = if *key == app.category {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(
            format!("{} {} ({})", i + 1, tab_label(key), count),
            style,
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_search(f: &mut Frame, area: Rect, app: &App) {
    let editing = app.input_mode == InputMode::Editing;

    let mut spans = vec![
        Span::styled("Search: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(app.search.as_str()),
    ];
    if editing {
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    } else if app.search.is_empty() {
        spans.push(Span::styled(
            "press / to search (e.g. pizza box)",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ));
    }

    let border = if editing { Color::Yellow } else { Color::White };
    let search = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );

    f.render_widget(search, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["#", "Item", "Category"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.visible().iter().map(|it| {
        let color = category_color(&it.category);
        let cells = vec![
            Cell::from(it.id.to_string()),
            Cell::from(truncate(&it.name, 40)),
            Cell::from(it.category.to_string()).style(Style::default().fg(color)),
        ];

        Row::new(cells).height(1)
    });

    let title = match app.current_page {
        Page::Search => format!(" {} - {} ", app.current_page.title(), count_label(app.results.len())),
        Page::Confusing => format!(" {} ", app.current_page.title()),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(42),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    match app.current_page {
        Page::Search => f.render_stateful_widget(table, area, &mut app.state),
        Page::Confusing => f.render_stateful_widget(table, area, &mut app.confusing_state),
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = match app.current_page {
        Page::Search => app.state.selected(),
        Page::Confusing => app.confusing_state.selected(),
    };
    let position = selected.map(|i| i + 1).unwrap_or(0);
    let total = app.visible().len();

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", position, total),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(message) = app.active_toast() {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }

    let keys = [
        ("/", " Search | "),
        ("Tab/←/→", " Category | "),
        ("Enter", " Details | "),
        ("p", " Page | "),
        ("c", " Clear | "),
    ];
    status_spans.push(Span::raw(" | "));
    for (key, label) in keys {
        status_spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(label));
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn section(title: &str) -> Line<'static> {
    Line::from(vec![Span::styled(
        format!("  {}", title),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    )])
}

fn field<'a>(label: &'a str, value: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("  {}: ", label),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ])
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let it = match app.selected_item() {
        Some(it) => it,
        None => {
            let no_selection = Paragraph::new("No item selected").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Item Details "),
            );
            f.render_widget(no_selection, area);
            return;
        }
    };

    let advice = app.advice.resolve(it);

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("  {}", it.name),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                it.category.to_string(),
                Style::default().fg(category_color(&it.category)),
            ),
        ]),
        Line::from(""),
        field("Verdict", &advice.verdict),
        field("Where", &advice.destination),
    ];

    if !advice.do_message.is_empty() {
        content.push(Line::from(""));
        content.push(field("Do", &advice.do_message));
        content.push(field("Avoid", &advice.avoid_message));
    }

    content.push(Line::from(""));
    content.push(section("RULES"));
    for rule in &it.rules {
        content.push(Line::from(format!("  • {}", rule)));
    }

    content.push(Line::from(""));
    content.push(section("COMMON MISTAKES"));
    for mistake in &it.mistakes {
        content.push(Line::from(format!("  • {}", mistake)));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![Span::styled(
        "  Press Enter to close",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )]));

    let detail_panel = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Item Details "),
        );

    f.render_widget(detail_panel, area);
}
