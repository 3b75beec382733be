use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use epiweek_calendar::epiweek::validate_year;
use epiweek_calendar::{
    build_year_grid, date_to_epiweek, Epiweek, MonthGrid, YearGrid, MAX_YEAR, MIN_YEAR,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;

const MONTHS_PER_ROW: u32 = 3;

pub struct App {
    pub grid: YearGrid,
    /// 1-12
    pub selected_month: u32,
    pub today: NaiveDate,
    pub timezone: String,
}

impl App {
    pub fn new(year: i32, today: NaiveDate, timezone: impl Into<String>) -> Result<Self> {
        let year = validate_year(i64::from(year))?;
        let grid = build_year_grid(year, today)?;
        let selected_month = if year == today.year() { today.month() } else { 1 };

        Ok(Self {
            grid,
            selected_month,
            today,
            timezone: timezone.into(),
        })
    }

    pub fn year(&self) -> i32 {
        self.grid.year
    }

    pub fn selected(&self) -> Option<&MonthGrid> {
        self.grid.month(self.selected_month)
    }

    /// Move the month selection by `delta` months, crossing into the
    /// neighbouring year when needed. Stops at the supported year range.
    pub fn move_selection(&mut self, delta: i32) -> Result<()> {
        let index = self.year() * 12 + self.selected_month as i32 - 1 + delta;
        let year = index.div_euclid(12);
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Ok(());
        }
        if year != self.year() {
            self.grid = build_year_grid(year, self.today)?;
        }
        self.selected_month = index.rem_euclid(12) as u32 + 1;
        Ok(())
    }

    pub fn next_year(&mut self) -> Result<()> {
        self.move_selection(12)
    }

    pub fn previous_year(&mut self) -> Result<()> {
        self.move_selection(-12)
    }

    pub fn jump_to_today(&mut self) -> Result<()> {
        if self.year() != self.today.year() {
            self.grid = build_year_grid(self.today.year(), self.today)?;
        }
        self.selected_month = self.today.month();
        Ok(())
    }

    pub fn current_epiweek(&self) -> Epiweek {
        date_to_epiweek(self.today)
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

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Left | KeyCode::Char('h') => app.move_selection(-1)?,
                KeyCode::Right | KeyCode::Char('l') => app.move_selection(1)?,
                KeyCode::Up | KeyCode::Char('k') => app.move_selection(-(MONTHS_PER_ROW as i32))?,
                KeyCode::Down | KeyCode::Char('j') => app.move_selection(MONTHS_PER_ROW as i32)?,
                KeyCode::Char('n') => app.next_year()?,
                KeyCode::Char('p') => app.previous_year()?,
                KeyCode::Char('t') => app.jump_to_today()?,
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Calendar + detail
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(70), // Month cards
            Constraint::Percentage(30), // Detail panel
        ])
        .split(chunks[1]);

    render_months(f, content_chunks[0], app);
    render_detail_panel(f, content_chunks[1], app);
    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let header_spans = vec![
        Span::styled(
            "Epiweek Calendar",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("{}", app.year()),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("{} epiweeks", app.grid.total_distinct_epiweeks),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Today {} (week {})", app.today.format("%Y-%m-%d"), app.current_epiweek()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(app.timezone.as_str(), Style::default().fg(Color::DarkGray)),
    ];

    let header = Paragraph::new(vec![Line::from(header_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_months(f: &mut Frame, area: Rect, app: &App) {
    let row_count = 12 / MONTHS_PER_ROW;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, row_count); row_count as usize])
        .split(area);

    for (row_index, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, MONTHS_PER_ROW); MONTHS_PER_ROW as usize])
            .split(*row_area);

        for (col_index, card_area) in cols.iter().enumerate() {
            let month = row_index as u32 * MONTHS_PER_ROW + col_index as u32 + 1;
            if let Some(grid) = app.grid.month(month) {
                render_month_card(f, *card_area, grid, month == app.selected_month);
            }
        }
    }
}

fn render_month_card(f: &mut Frame, area: Rect, month: &MonthGrid, selected: bool) {
    let header_style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(
        ["Wk", "Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"]
            .iter()
            .map(|h| Span::styled(format!("{:>3}", h), header_style))
            .collect::<Vec<_>>(),
    )];

    for week in &month.weeks {
        let mut spans = vec![Span::styled(
            format!("{:>3}", week.epiweek.week()),
            Style::default().fg(Color::Cyan),
        )];
        for day in &week.days {
            let style = if day.is_today {
                Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
            } else if day.is_current_month {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(format!("{:>2}", day.day_number), style));
        }
        lines.push(Line::from(spans));
    }

    let border_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", month.name)),
    );

    f.render_widget(card, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let month = match app.selected() {
        Some(m) => m,
        None => {
            let no_selection = Paragraph::new("No month selected").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Epiweeks "),
            );
            f.render_widget(no_selection, area);
            return;
        }
    };

    let current = app.current_epiweek();
    let mut content = vec![Line::from("")];
    for week in &month.weeks {
        let first = week.days[0].date;
        let last = week.days[6].date;
        let style = if week.epiweek == current {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        content.push(Line::from(vec![
            Span::styled(format!("  {}", week.epiweek), style),
            Span::raw(format!(
                "  {} .. {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            )),
        ]));
    }

    let detail_panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {} {} ", month.name, app.year())),
    );

    f.render_widget(detail_panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, _app: &App) {
    let key = Style::default().fg(Color::Yellow);
    let status_spans = vec![
        Span::styled(" ←/→/↑/↓", key),
        Span::raw(" Month | "),
        Span::styled("n/p", key),
        Span::raw(" Year | "),
        Span::styled("t", key),
        Span::raw(" Today | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}
