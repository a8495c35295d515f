//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API. Services are generic over repository/backend traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use kindred_core::chat::engine::{ChatEngine, GenerateOptions};
use kindred_core::image::service::ImageService;
use kindred_core::profile::service::ProfileService;
use kindred_infra::image::SdWebuiBackend;
use kindred_infra::llm::OpenAiCompatGenerator;
use kindred_infra::paths::resolve_data_dir;
use kindred_infra::sqlite::image::SqliteImageRepository;
use kindred_infra::sqlite::pool::DatabasePool;
use kindred_infra::sqlite::profile::SqliteProfileRepository;
use kindred_infra::sqlite::session::SqliteSessionRepository;
use kindred_types::config::KindredConfig;
use kindred_types::profile::SessionContext;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteProfileService =
    ProfileService<SqliteProfileRepository, SqliteSessionRepository>;

pub type ConcreteImageService = ImageService<SdWebuiBackend, SqliteImageRepository>;

pub type ConcreteChatEngine = ChatEngine<Arc<OpenAiCompatGenerator>>;

/// One server-side conversation: an engine plus the context it runs under.
pub struct Conversation {
    pub engine: ConcreteChatEngine,
    pub ctx: SessionContext,
}

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub profile_service: Arc<ConcreteProfileService>,
    pub image_service: Arc<ConcreteImageService>,
    pub generator: Arc<OpenAiCompatGenerator>,
    pub config: Arc<KindredConfig>,
    /// Server-side conversations keyed by id. Entries are Arc'd so handlers
    /// can drop the map guard before awaiting on the engine lock.
    pub conversations: Arc<DashMap<Uuid, Arc<Mutex<Conversation>>>>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire
    /// services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await?;

        // Initialize database
        let db_url = kindred_infra::sqlite::pool::database_url(&data_dir);
        let db_pool = DatabasePool::new(&db_url).await?;

        let profile_service = ProfileService::new(
            SqliteProfileRepository::new(db_pool.clone()),
            SqliteSessionRepository::new(db_pool.clone()),
        );

        // Output dir is relative to the data dir unless absolute
        let output_dir = {
            let configured = PathBuf::from(&config.image.output_dir);
            if configured.is_absolute() {
                configured
            } else {
                data_dir.join(configured)
            }
        };

        let image_service = ImageService::new(
            SdWebuiBackend::new(&config.image),
            SqliteImageRepository::new(db_pool.clone()),
            output_dir,
        );

        let generator = Arc::new(OpenAiCompatGenerator::new(&config.chat));

        Ok(Self {
            profile_service: Arc::new(profile_service),
            image_service: Arc::new(image_service),
            generator,
            config: Arc::new(config),
            conversations: Arc::new(DashMap::new()),
            data_dir,
            db_pool,
        })
    }

    /// Generation bounds from the configured timeout. Zero disables it.
    pub fn generate_options(&self) -> GenerateOptions {
        match self.config.chat.timeout_secs {
            0 => GenerateOptions::default(),
            secs => GenerateOptions::with_timeout(Duration::from_secs(secs)),
        }
    }
}

/// Load `config.toml` from the data dir, falling back to defaults when the
/// file does not exist.
async fn load_config(data_dir: &std::path::Path) -> anyhow::Result<KindredConfig> {
    let path = data_dir.join("config.toml");
    match tokio::fs::read_to_string(&path).await {
        Ok(contents) => {
            let config = toml::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("invalid config at {}: {e}", path.display()))?;
            tracing::info!(path = %path.display(), "Config loaded");
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(KindredConfig::default()),
        Err(e) => Err(anyhow::anyhow!("failed to read {}: {e}", path.display())),
    }
}
