mod app;
mod config;
mod event;
mod gateway;
mod logging;
mod router;
mod session;
mod store;
mod telemetry;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use app::{App, BannerKind, DASHBOARD_CARDS, ProfileField};
use config::Config;
use event::{AppEvent, EventHandler};
use router::View;
use session::quiz::QuizPhase;
use ui::components::chat::ChatView;
use ui::components::dashboard::Dashboard;
use ui::components::feedback::FeedbackPopup;
use ui::components::login::LoginView;
use ui::components::profile::ProfileView;
use ui::components::progress_view::ProgressView;
use ui::components::quiz::QuizView;
use ui::components::sidebar::Sidebar;
use ui::components::simulator::SimulatorView;
use ui::layout::{AppLayout, pack_hint_lines};
use ui::line_input::InputResult;

#[derive(Parser)]
#[command(
    name = "k53prep",
    version,
    about = "K53 learner's and driver's licence test preparation with an AI tutor"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Use the offline mock AI backend")]
    mock: bool,

    #[arg(short = 'n', long, help = "Number of questions per practice test")]
    questions: Option<usize>,

    #[arg(long, help = "Directory for the profile, feedback and log files")]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|err| {
        eprintln!("warning: ignoring unreadable config file: {err:#}");
        Config::default()
    });
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(count) = cli.questions {
        config.quiz.question_count = count;
    }
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir;
    }
    config.validate();

    if let Err(err) = logging::init(&config.data_dir(), &config.log.level) {
        eprintln!("warning: logging disabled: {err:#}");
    }

    let gateway = gateway::from_config(&config, cli.mock)?;
    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, gateway, events.sender())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(%err, "event loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize(_, _) => {}
            AppEvent::Gateway { generation, reply } => app.handle_gateway_reply(generation, reply),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Text entry owns the keyboard until it is submitted or cancelled
    if !app.router.is_authenticated() {
        handle_login_key(app, key);
        return;
    }
    if app.feedback.is_some() {
        handle_feedback_key(app, key);
        return;
    }
    if app.chat_editing {
        handle_chat_input_key(app, key);
        return;
    }
    if app.profile_form.editing {
        handle_profile_input_key(app, key);
        return;
    }

    if let KeyCode::Char(ch) = key.code
        && let Some(view) = View::from_digit(ch)
    {
        app.navigate(view);
        return;
    }

    match key.code {
        KeyCode::Tab => app.navigate(app.view().next()),
        KeyCode::BackTab => app.navigate(app.view().prev()),
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('f') => app.open_feedback(),
        KeyCode::Esc if app.view() != View::Dashboard => app.navigate(View::Dashboard),
        _ => match app.view() {
            View::Dashboard => handle_dashboard_key(app, key),
            View::Learners => handle_quiz_key(app, key),
            View::Drivers => handle_simulator_key(app, key),
            View::Chatbot => handle_chat_key(app, key),
            View::Progress => {}
            View::Profile => handle_profile_key(app, key),
        },
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    match app.login_input.handle(key) {
        InputResult::Submit => app.submit_login(),
        InputResult::Cancel => app.should_quit = true,
        InputResult::Continue => {}
    }
}

fn handle_feedback_key(app: &mut App, key: KeyEvent) {
    let Some(modal) = app.feedback.as_mut() else {
        return;
    };
    match modal.input.handle(key) {
        InputResult::Submit => app.submit_feedback(),
        InputResult::Cancel => app.feedback = None,
        InputResult::Continue => {}
    }
}

fn handle_dashboard_key(app: &mut App, key: KeyEvent) {
    let count = DASHBOARD_CARDS.len();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.dashboard_selected = (app.dashboard_selected + count - 1) % count;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.dashboard_selected = (app.dashboard_selected + 1) % count;
        }
        KeyCode::Enter => app.open_dashboard_card(),
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    match app.quiz.phase {
        QuizPhase::Idle => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char('s')) {
                app.start_quiz();
            }
        }
        QuizPhase::Loading => {}
        QuizPhase::Active => match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.quiz.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.quiz.select_next(),
            KeyCode::Enter | KeyCode::Char(' ') => app.answer_quiz(None),
            KeyCode::Char(ch @ 'a'..='d') => app.answer_quiz(Some((ch as u8 - b'a') as usize)),
            _ => {}
        },
        QuizPhase::Results => match key.code {
            KeyCode::Enter | KeyCode::Char('s') => app.start_quiz(),
            KeyCode::Char('r') => app.restart_quiz(),
            KeyCode::Up | KeyCode::Char('k') => app.quiz_scroll = app.quiz_scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => app.quiz_scroll = app.quiz_scroll.saturating_add(1),
            _ => {}
        },
    }
}

fn handle_simulator_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('a') | KeyCode::Enter => app.request_analysis(),
        KeyCode::Char('n') => app.regenerate_session(),
        KeyCode::Up | KeyCode::Char('k') => app.analysis_scroll = app.analysis_scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => {
            app.analysis_scroll = app.analysis_scroll.saturating_add(1)
        }
        _ => {}
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Enter | KeyCode::Char('i')) {
        app.chat_editing = true;
    }
}

fn handle_chat_input_key(app: &mut App, key: KeyEvent) {
    match app.chat_input.handle(key) {
        InputResult::Submit => app.send_chat(),
        InputResult::Cancel => app.chat_editing = false,
        InputResult::Continue => {}
    }
}

fn handle_profile_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.profile_form.prev_field(),
        KeyCode::Down | KeyCode::Char('j') => app.profile_form.next_field(),
        KeyCode::Enter => {
            app.profile_form.editing = true;
            app.profile_form.error = None;
        }
        KeyCode::Char('s') => app.save_profile_edits(),
        KeyCode::Char('x') => app.toggle_remove_picture(),
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Char('L') => app.logout(),
        _ => {}
    }
}

fn handle_profile_input_key(app: &mut App, key: KeyEvent) {
    let form = &mut app.profile_form;
    match form.input_mut().handle(key) {
        InputResult::Submit | InputResult::Cancel => form.editing = false,
        InputResult::Continue => {}
    }
    if form.field() == ProfileField::Picture && !form.picture_path.is_blank() {
        form.remove_picture = false;
    }
}

fn footer_hints(app: &App) -> Vec<&'static str> {
    if app.feedback.is_some() {
        return vec!["[Enter] Submit feedback", "[Esc] Cancel"];
    }
    if app.chat_editing {
        return vec!["[Enter] Send", "[Esc] Stop typing", "[Ctrl+W] Delete word"];
    }
    if app.profile_form.editing {
        return vec!["[Enter/Esc] Finish field", "[Tab] Complete path"];
    }

    let mut hints = match app.view() {
        View::Dashboard => vec!["[Up/Down] Select", "[Enter] Open"],
        View::Learners => match app.quiz.phase {
            QuizPhase::Idle => vec!["[Enter] Start test"],
            QuizPhase::Loading => vec![],
            QuizPhase::Active => vec!["[Up/Down] Select", "[Enter] Answer", "[a-d] Answer directly"],
            QuizPhase::Results => vec!["[Enter] New test", "[r] Back", "[Up/Down] Scroll review"],
        },
        View::Drivers => vec!["[a] AI feedback", "[n] New session", "[Up/Down] Scroll"],
        View::Chatbot => vec!["[Enter] Type a message"],
        View::Progress => vec![],
        View::Profile => vec!["[s] Save", "[L] Log out"],
    };
    hints.extend(["[Tab/1-6] Views", "[f] Feedback", "[q] Quit"]);
    hints
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    if !app.router.is_authenticated() {
        let login = LoginView::new(&app.login_input, app.login_error.as_deref(), app.theme);
        frame.render_widget(login, area);
        return;
    }

    let hints = footer_hints(app);
    let hint_lines = pack_hint_lines(&hints, area.width as usize);
    let layout = AppLayout::new(area, hint_lines.len() as u16);

    render_header(frame, app, &layout);

    if let Some(sidebar_area) = layout.sidebar {
        let sidebar = Sidebar::new(
            app.view(),
            app.profile.as_ref().map(|p| p.name.as_str()),
            app.backend_name(),
            app.theme,
        );
        frame.render_widget(sidebar, sidebar_area);
    }

    let main = layout.main;
    match app.view() {
        View::Dashboard => {
            let name = app.profile.as_ref().map_or("learner", |p| p.name.as_str());
            let dashboard = Dashboard::new(
                name,
                app.days_to_target(),
                &DASHBOARD_CARDS,
                app.dashboard_selected,
                &app.progress,
                app.theme,
            );
            frame.render_widget(dashboard, main);
        }
        View::Learners => {
            let quiz = QuizView::new(&app.quiz, app.config.quiz.question_count, app.quiz_scroll, app.theme);
            frame.render_widget(quiz, main);
        }
        View::Drivers => {
            let simulator = SimulatorView::new(&app.simulator, app.analysis_scroll, app.theme);
            frame.render_widget(simulator, main);
        }
        View::Chatbot => {
            let chat = ChatView::new(&app.chat, &app.chat_input, app.chat_editing, app.theme);
            frame.render_widget(chat, main);
        }
        View::Progress => {
            let readiness = app.profile.as_ref().map_or(0, |p| p.progress);
            frame.render_widget(ProgressView::new(readiness, &app.progress, app.theme), main);
        }
        View::Profile => {
            let profile = ProfileView::new(
                &app.profile_form,
                app.profile.as_ref(),
                &app.config.theme,
                app.theme,
            );
            frame.render_widget(profile, main);
        }
    }

    let footer_lines: Vec<Line> = hint_lines
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(footer_lines), layout.footer);

    if let Some(ref modal) = app.feedback {
        let popup = FeedbackPopup::new(&modal.input, modal.error.as_deref(), app.theme);
        frame.render_widget(popup, area);
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let header_style = Style::default().bg(colors.header_bg());

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(layout.header);

    let mut title = vec![Span::styled(
        " K53 Prep ",
        Style::default()
            .fg(colors.header_fg())
            .bg(colors.header_bg())
            .add_modifier(Modifier::BOLD),
    )];
    if !layout.tier.show_sidebar() {
        title.push(Span::styled(
            format!("| {} ", app.view().label()),
            Style::default().fg(colors.accent()).bg(colors.header_bg()),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(title)).style(header_style), halves[0]);

    let right = match app.banner {
        Some(ref banner) => {
            let color = match banner.kind {
                BannerKind::Success => colors.success(),
                BannerKind::Error => colors.error(),
            };
            Span::styled(
                format!("{} ", banner.text),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )
        }
        None => Span::styled(
            format!("AI: {} ", app.backend_name()),
            Style::default().fg(colors.header_fg()),
        ),
    };
    frame.render_widget(
        Paragraph::new(Line::from(right))
            .alignment(Alignment::Right)
            .style(header_style),
        halves[1],
    );
}
