//! Application state wiring config, persona and model gateway together.
//!
//! AppState is built once at startup and shared by the terminal chat and the
//! REST API. Everything that can fail (config, persona, credential) fails
//! here, before any gateway call is made.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use gupshup_core::chat::{ChatSession, ExitKeywords, TurnController};
use gupshup_core::persona;
use gupshup_core::prompt::PromptAssembler;
use gupshup_infra::config::{load_config, resolve_data_dir, ConfigOverrides};
use gupshup_infra::llm::create_provider;
use gupshup_infra::persona::load_persona_file;
use gupshup_infra::secret::resolve_api_key;
use gupshup_types::config::AppConfig;
use gupshup_types::persona::Persona;

/// Sessions kept in memory before the oldest is dropped.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// A session shared between concurrent requests.
pub type SharedSession = Arc<Mutex<ChatSession>>;

/// Startup choices taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub overrides: ConfigOverrides,
    pub persona_file: Option<PathBuf>,
}

/// Shared application state.
///
/// Cloning is cheap; the controller and session map are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<TurnController>,
    pub sessions: Arc<DashMap<Uuid, SharedSession>>,
    pub memory_window: usize,
    pub seed_welcome: bool,
    pub max_sessions: usize,
}

impl AppState {
    pub fn new(controller: TurnController, memory_window: usize, seed_welcome: bool) -> Self {
        Self {
            controller: Arc::new(controller),
            sessions: Arc::new(DashMap::new()),
            memory_window,
            seed_welcome,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// Cap the session map. Zero is treated as one.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Load config, resolve the persona and credential, build the gateway.
    pub async fn init(options: &StartupOptions) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = options.overrides.apply(load_config(&data_dir).await?);
        config.validate()?;

        let persona = match &options.persona_file {
            Some(path) => load_persona_file(path).await?,
            None => persona::resolve(&config.persona)?,
        };

        let api_key = resolve_api_key()?;
        let provider = create_provider(&config.model, api_key)?;

        tracing::info!(
            persona = %persona.slug,
            model = %config.model.name,
            memory_window = config.memory_window,
            "Application state initialized"
        );

        Ok(Self::from_parts(&config, persona, provider))
    }

    /// Assemble state from already-resolved pieces.
    pub fn from_parts(
        config: &AppConfig,
        persona: Persona,
        provider: gupshup_core::llm::BoxLlmProvider,
    ) -> Self {
        let controller = TurnController::new(
            persona,
            PromptAssembler::new(config.model.clone()),
            ExitKeywords::new(&config.exit_keywords),
            provider,
        );
        Self::new(controller, config.memory_window, config.seed_welcome)
    }

    /// Start a session for the configured persona without registering it.
    pub fn start_session(&self) -> ChatSession {
        ChatSession::start(
            self.controller.persona(),
            self.memory_window,
            self.seed_welcome,
        )
    }

    /// Start a session and register it in the session map.
    ///
    /// When the map is full the oldest session is dropped first. Ids are
    /// UUID v7, so the smallest id is the oldest.
    pub fn open_session(&self) -> (Uuid, SharedSession) {
        while self.sessions.len() >= self.max_sessions {
            let Some(oldest) = self.sessions.iter().map(|entry| *entry.key()).min() else {
                break;
            };
            if self.sessions.remove(&oldest).is_some() {
                tracing::debug!(session_id = %oldest, "Oldest session evicted");
            }
        }

        let session = self.start_session();
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.insert(id, Arc::clone(&shared));
        tracing::debug!(session_id = %id, "Session opened");
        (id, shared)
    }

    pub fn session(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove a session. Returns false if it did not exist.
    pub fn close_session(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }
}
