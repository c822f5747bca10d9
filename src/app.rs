use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::event::{AppEvent, GatewayReply};
use crate::gateway::AiGateway;
use crate::router::{Router, View};
use crate::session::chat::ChatSession;
use crate::session::profile::{self, ProfileDraft, SAVED_MESSAGE};
use crate::session::progress::ProgressLog;
use crate::session::quiz::{QuizPhase, QuizSession};
use crate::session::simulator::SimulatorSession;
use crate::store::json_store::JsonStore;
use crate::store::schema::{ProfileUpdate, UserProfile};
use crate::store::{self, Storage};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

pub const FEEDBACK_THANKS: &str = "Thank you for your feedback!";
pub const FEEDBACK_FAILED: &str = "Could not save your feedback. Please try again.";
pub const LOGOUT_FAILED: &str = "Signed out, but the saved profile could not be removed.";
const PROFILE_BANNER: Duration = Duration::from_secs(3);
const FEEDBACK_BANNER: Duration = Duration::from_secs(2);
const CHAT_INPUT_LIMIT: usize = 1000;
const FEEDBACK_INPUT_LIMIT: usize = 2000;

/// Dashboard shortcut cards, in display order.
pub const DASHBOARD_CARDS: [View; 4] = [View::Learners, View::Drivers, View::Progress, View::Chatbot];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    TargetDate,
    Picture,
}

impl ProfileField {
    pub const ALL: [ProfileField; 3] = [ProfileField::Name, ProfileField::TargetDate, ProfileField::Picture];

    pub fn label(self) -> &'static str {
        match self {
            ProfileField::Name => "Name",
            ProfileField::TargetDate => "Target test date (YYYY-MM-DD)",
            ProfileField::Picture => "Profile picture (path to image)",
        }
    }
}

pub struct ProfileForm {
    pub name: LineInput,
    pub target_date: LineInput,
    pub picture_path: LineInput,
    pub remove_picture: bool,
    pub selected: usize,
    pub editing: bool,
    pub error: Option<String>,
}

impl ProfileForm {
    fn from_profile(profile: Option<&UserProfile>) -> Self {
        Self {
            name: LineInput::new(profile.map_or("", |p| p.name.as_str())),
            target_date: LineInput::new(profile.and_then(|p| p.target_date.as_deref()).unwrap_or("")),
            picture_path: LineInput::path(""),
            remove_picture: false,
            selected: 0,
            editing: false,
            error: None,
        }
    }

    pub fn field(&self) -> ProfileField {
        ProfileField::ALL[self.selected]
    }

    pub fn input(&self, field: ProfileField) -> &LineInput {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::TargetDate => &self.target_date,
            ProfileField::Picture => &self.picture_path,
        }
    }

    pub fn input_mut(&mut self) -> &mut LineInput {
        match self.field() {
            ProfileField::Name => &mut self.name,
            ProfileField::TargetDate => &mut self.target_date,
            ProfileField::Picture => &mut self.picture_path,
        }
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % ProfileField::ALL.len();
    }

    pub fn prev_field(&mut self) {
        self.selected = self.selected.checked_sub(1).unwrap_or(ProfileField::ALL.len() - 1);
    }
}

pub struct FeedbackModal {
    pub input: LineInput,
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Transient status line, cleared on the first tick after `expires`.
pub struct Banner {
    pub text: String,
    pub kind: BannerKind,
    expires: Instant,
}

pub struct App {
    pub router: Router,
    pub profile: Option<UserProfile>,
    pub config: Config,
    pub theme: &'static Theme,
    pub quiz: QuizSession,
    pub chat: ChatSession,
    pub simulator: SimulatorSession,
    pub progress: ProgressLog,
    pub login_input: LineInput,
    pub login_error: Option<String>,
    pub chat_input: LineInput,
    pub chat_editing: bool,
    pub profile_form: ProfileForm,
    pub feedback: Option<FeedbackModal>,
    pub banner: Option<Banner>,
    pub dashboard_selected: usize,
    pub quiz_scroll: u16,
    pub analysis_scroll: u16,
    pub should_quit: bool,
    store: Box<dyn Storage>,
    gateway: Arc<dyn AiGateway>,
    events: Option<Sender<AppEvent>>,
    /// Where theme choices are saved; None keeps them in memory.
    config_file: Option<PathBuf>,
    /// Bumped on logout so replies to the previous user's requests are dropped.
    generation: u64,
    rng: SmallRng,
}

impl App {
    /// Production wiring: JSON files under the data dir, gateway replies
    /// delivered on `events`.
    pub fn new(config: Config, gateway: Arc<dyn AiGateway>, events: Sender<AppEvent>) -> Result<Self> {
        let store = JsonStore::with_base_dir(config.data_dir())?;
        let theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(theme));
        let mut app = Self::with_parts(config, Box::new(store), gateway, theme, SmallRng::from_entropy());
        app.events = Some(events);
        app.config_file = Some(Config::config_path());
        Ok(app)
    }

    /// Gateway calls run inline until an event sender is attached.
    pub fn with_parts(
        config: Config,
        store: Box<dyn Storage>,
        gateway: Arc<dyn AiGateway>,
        theme: &'static Theme,
        mut rng: SmallRng,
    ) -> Self {
        let (router, profile) = Router::from_store(store.as_ref());
        tracing::info!(
            backend = gateway.name(),
            authenticated = router.is_authenticated(),
            "app started"
        );
        let simulator = SimulatorSession::new(&mut rng);
        let profile_form = ProfileForm::from_profile(profile.as_ref());

        Self {
            router,
            profile,
            config,
            theme,
            quiz: QuizSession::new(),
            chat: ChatSession::new(),
            simulator,
            progress: ProgressLog::default(),
            login_input: LineInput::new(""),
            login_error: None,
            chat_input: LineInput::new("").with_limit(CHAT_INPUT_LIMIT),
            chat_editing: false,
            profile_form,
            feedback: None,
            banner: None,
            dashboard_selected: 0,
            quiz_scroll: 0,
            analysis_scroll: 0,
            should_quit: false,
            store,
            gateway,
            events: None,
            config_file: None,
            generation: 0,
            rng,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.gateway.name()
    }

    pub fn view(&self) -> View {
        self.router.current()
    }

    pub fn on_tick(&mut self) {
        if self.banner.as_ref().is_some_and(|b| Instant::now() >= b.expires) {
            self.banner = None;
        }
    }

    fn show_banner(&mut self, text: &str, kind: BannerKind, ttl: Duration) {
        self.banner = Some(Banner {
            text: text.to_string(),
            kind,
            expires: Instant::now() + ttl,
        });
    }

    // --- View controller ---

    pub fn submit_login(&mut self) {
        match self.router.login(self.store.as_ref(), self.login_input.value()) {
            Ok(profile) => {
                self.profile_form = ProfileForm::from_profile(Some(&profile));
                self.profile = Some(profile);
                self.login_input.clear();
                self.login_error = None;
            }
            Err(err) => self.login_error = Some(err.to_string()),
        }
    }

    /// Sessions belong to whoever was signed in, so they are reset too.
    pub fn logout(&mut self) {
        let result = self.router.logout(self.store.as_ref());
        self.generation += 1;
        self.profile = None;
        self.quiz = QuizSession::new();
        self.chat = ChatSession::new();
        self.chat_input.clear();
        self.chat_editing = false;
        self.simulator = SimulatorSession::new(&mut self.rng);
        self.progress = ProgressLog::default();
        self.profile_form = ProfileForm::from_profile(None);
        self.feedback = None;
        self.banner = None;
        self.dashboard_selected = 0;
        self.quiz_scroll = 0;
        self.analysis_scroll = 0;
        if let Err(err) = result {
            tracing::error!(%err, "failed to remove stored profile");
            self.show_banner(LOGOUT_FAILED, BannerKind::Error, PROFILE_BANNER);
        }
    }

    pub fn navigate(&mut self, view: View) {
        if view == View::Profile && self.view() != View::Profile {
            self.profile = self.store.load_profile().or(self.profile.take());
            self.profile_form = ProfileForm::from_profile(self.profile.as_ref());
        }
        self.chat_editing = false;
        self.router.navigate(view);
    }

    pub fn open_dashboard_card(&mut self) {
        if let Some(&view) = DASHBOARD_CARDS.get(self.dashboard_selected) {
            self.navigate(view);
        }
    }

    pub fn days_to_target(&self) -> Option<i64> {
        let target = self.profile.as_ref()?.target_date.as_deref()?;
        profile::days_until(target, Local::now().date_naive())
    }

    // --- Gateway dispatch ---

    fn dispatch<F>(&mut self, job: F)
    where
        F: FnOnce(&dyn AiGateway) -> GatewayReply + Send + 'static,
    {
        let gateway = Arc::clone(&self.gateway);
        let generation = self.generation;
        match self.events.clone() {
            Some(tx) => {
                thread::spawn(move || {
                    let reply = job(gateway.as_ref());
                    let _ = tx.send(AppEvent::Gateway { generation, reply });
                });
            }
            None => {
                let reply = job(gateway.as_ref());
                self.handle_gateway_reply(generation, reply);
            }
        }
    }

    pub fn handle_gateway_reply(&mut self, generation: u64, reply: GatewayReply) {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping reply from before logout");
            return;
        }
        match reply {
            GatewayReply::Questions(result) => self.quiz.finish_start(result),
            GatewayReply::Analysis(result) => {
                let summary = *self.simulator.summary();
                if let Some(feedback) = self.simulator.finish_analysis(result) {
                    self.progress.record_analysis(summary, feedback);
                }
            }
            GatewayReply::Chat(result) => self.chat.finish_send(result),
        }
    }

    // --- Learner's test ---

    pub fn start_quiz(&mut self) {
        if !self.quiz.begin_start() {
            return;
        }
        self.quiz_scroll = 0;
        let count = self.config.quiz.question_count;
        tracing::info!(count, backend = self.gateway.name(), "requesting questions");
        self.dispatch(move |gateway| GatewayReply::Questions(gateway.generate_questions(count)));
    }

    pub fn answer_quiz(&mut self, choice: Option<usize>) {
        if let Some(idx) = choice {
            if idx >= self.quiz.current_question().map_or(0, |q| q.options.len()) {
                return;
            }
            self.quiz.selected = idx;
        }
        if self.quiz.answer_selected() {
            self.finish_quiz();
        }
    }

    fn finish_quiz(&mut self) {
        let percentage = self.progress.record_quiz(&self.quiz).percentage;
        tracing::info!(score = self.quiz.score, percentage, "quiz finished");
        let update = ProfileUpdate {
            progress: Some(percentage),
            ..ProfileUpdate::default()
        };
        match store::save_profile(self.store.as_ref(), &update) {
            Ok(profile) => self.profile = Some(profile),
            Err(err) => tracing::error!(%err, "failed to record quiz progress"),
        }
    }

    pub fn restart_quiz(&mut self) {
        if self.quiz.phase != QuizPhase::Loading {
            self.quiz.restart();
        }
    }

    // --- Driver's simulator ---

    pub fn regenerate_session(&mut self) {
        if self.simulator.regenerate(&mut self.rng) {
            self.analysis_scroll = 0;
        } else {
            tracing::debug!("regenerate ignored while analysis is pending");
        }
    }

    pub fn request_analysis(&mut self) {
        let Some(telemetry) = self.simulator.begin_analysis() else {
            return;
        };
        self.analysis_scroll = 0;
        tracing::info!(samples = telemetry.len(), "requesting session analysis");
        self.dispatch(move |gateway| GatewayReply::Analysis(gateway.analyze_session(&telemetry)));
    }

    // --- AI tutor ---

    pub fn send_chat(&mut self) {
        let text = self.chat_input.value().to_string();
        let Some(request) = self.chat.begin_send(&text) else {
            return;
        };
        self.chat_input.clear();
        self.dispatch(move |gateway| {
            GatewayReply::Chat(gateway.converse(&request.history, &request.message))
        });
    }

    // --- Profile ---

    pub fn save_profile_edits(&mut self) {
        let form = &self.profile_form;
        let draft = ProfileDraft {
            name: form.name.value(),
            target_date: form.target_date.value(),
            picture_path: form.picture_path.value(),
            remove_picture: form.remove_picture,
        };
        let update = match draft.to_update() {
            Ok(update) => update,
            Err(err) => {
                self.profile_form.error = Some(err.to_string());
                return;
            }
        };

        match store::save_profile(self.store.as_ref(), &update) {
            Ok(profile) => {
                tracing::info!("profile saved");
                self.profile_form = ProfileForm::from_profile(Some(&profile));
                self.profile = Some(profile);
                self.show_banner(SAVED_MESSAGE, BannerKind::Success, PROFILE_BANNER);
            }
            Err(err) => {
                tracing::error!(%err, "failed to save profile");
                self.profile_form.error = Some(format!("Could not save your profile: {err}"));
            }
        }
    }

    pub fn toggle_remove_picture(&mut self) {
        let form = &mut self.profile_form;
        form.remove_picture = !form.remove_picture;
        if form.remove_picture {
            form.picture_path.clear();
        }
    }

    pub fn cycle_theme(&mut self) {
        let Some(name) = Theme::next_name(&self.config.theme) else {
            return;
        };
        if let Some(theme) = Theme::load(&name) {
            self.theme = Box::leak(Box::new(theme));
            if let Some(ref path) = self.config_file
                && let Err(err) = Config::persist_theme(path, &name)
            {
                tracing::warn!(%err, "failed to persist theme choice");
            }
            self.config.theme = name;
        }
    }

    // --- Feedback ---

    pub fn open_feedback(&mut self) {
        self.feedback = Some(FeedbackModal {
            input: LineInput::new("").with_limit(FEEDBACK_INPUT_LIMIT),
            error: None,
        });
    }

    pub fn submit_feedback(&mut self) {
        let Some(modal) = self.feedback.as_mut() else {
            return;
        };
        if modal.input.is_blank() {
            return;
        }
        if store::submit_feedback(self.store.as_ref(), modal.input.value()) {
            self.feedback = None;
            self.show_banner(FEEDBACK_THANKS, BannerKind::Success, FEEDBACK_BANNER);
        } else {
            modal.error = Some(FEEDBACK_FAILED.to_string());
        }
    }
}
