use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub backend: BackendConfig,
    pub geocoding: GeocodingConfig,
    pub wizard: WizardConfig,
    pub map: MapSettings,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

/// How the nested `location` object is encoded in the multipart body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationEncoding {
    /// `location[address]`, `location[coordinates][lat]`, ...
    #[default]
    Bracketed,
    /// A single `location` field holding the JSON-encoded object
    Json,
}

impl std::str::FromStr for LocationEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bracketed" => Ok(LocationEncoding::Bracketed),
            "json" => Ok(LocationEncoding::Json),
            other => Err(format!(
                "BACKEND_LOCATION_ENCODING must be 'bracketed' or 'json', got '{}'",
                other
            )),
        }
    }
}

/// Municipal backend REST API
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub location_encoding: LocationEncoding,
}

/// Reverse geocoding (Nominatim) and place search (LocationIQ)
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub nominatim_base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub locationiq_base_url: String,
    pub locationiq_api_key: Option<String>,
}

/// Draft session behaviour
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Where the client should navigate after a successful submission
    pub redirect_path: String,
    /// How long the client should wait before navigating
    pub redirect_delay_ms: u64,
    /// Drafts untouched for this long are discarded by the sweeper
    pub draft_idle_ttl: Duration,
    pub sweep_interval: Duration,
    /// Upper bound on drafts held in memory at once
    pub max_active_drafts: usize,
}

/// Map settings handed to the client once the location step is first shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MapSettings {
    pub tile_url: String,
    pub attribution: String,
    pub default_lat: f64,
    pub default_lng: f64,
    pub default_zoom: u8,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            backend: BackendConfig::from_env()?,
            geocoding: GeocodingConfig::from_env()?,
            wizard: WizardConfig::from_env()?,
            map: MapSettings::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid value", name)),
        _ => Ok(default),
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 120 * 1024 * 1024; // 120MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size =
            parse_var("MAX_REQUEST_BODY_SIZE", Self::DEFAULT_MAX_REQUEST_BODY_SIZE)?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl BackendConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("BACKEND_BASE_URL")
            .map_err(|_| "BACKEND_BASE_URL environment variable is required".to_string())?
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = parse_var("BACKEND_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;
        let location_encoding = match env::var("BACKEND_LOCATION_ENCODING") {
            Ok(raw) => raw.parse::<LocationEncoding>()?,
            Err(_) => LocationEncoding::default(),
        };

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            location_encoding,
        })
    }
}

impl GeocodingConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 10;

    pub fn from_env() -> Result<Self, String> {
        let nominatim_base_url = env::var("NOMINATIM_BASE_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string())
            .trim_end_matches('/')
            .to_string();
        let user_agent = env::var("GEOCODING_USER_AGENT")
            .unwrap_or_else(|_| "CivicReportGateway/0.1 (municipal-issue-reporting)".to_string());
        let timeout_secs = parse_var("GEOCODING_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;
        let locationiq_base_url = env::var("LOCATIONIQ_BASE_URL")
            .unwrap_or_else(|_| "https://api.locationiq.com".to_string())
            .trim_end_matches('/')
            .to_string();
        let locationiq_api_key = env::var("LOCATIONIQ_API_KEY")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            nominatim_base_url,
            user_agent,
            timeout: Duration::from_secs(timeout_secs),
            locationiq_base_url,
            locationiq_api_key,
        })
    }
}

impl WizardConfig {
    const DEFAULT_REDIRECT_DELAY_MS: u64 = 2000;
    const DEFAULT_DRAFT_IDLE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
    const DEFAULT_MAX_ACTIVE_DRAFTS: usize = 1000;

    pub fn from_env() -> Result<Self, String> {
        let redirect_path =
            env::var("WIZARD_REDIRECT_PATH").unwrap_or_else(|_| "/reports".to_string());
        let redirect_delay_ms =
            parse_var("WIZARD_REDIRECT_DELAY_MS", Self::DEFAULT_REDIRECT_DELAY_MS)?;
        let ttl_secs = parse_var("DRAFT_IDLE_TTL_SECS", Self::DEFAULT_DRAFT_IDLE_TTL_SECS)?;
        let sweep_secs = parse_var(
            "DRAFT_SWEEP_INTERVAL_SECS",
            Self::DEFAULT_SWEEP_INTERVAL_SECS,
        )?;
        let max_active_drafts = parse_var("MAX_ACTIVE_DRAFTS", Self::DEFAULT_MAX_ACTIVE_DRAFTS)?;

        Ok(Self {
            redirect_path,
            redirect_delay_ms,
            draft_idle_ttl: Duration::from_secs(ttl_secs),
            sweep_interval: Duration::from_secs(sweep_secs.max(1)),
            max_active_drafts: max_active_drafts.max(1),
        })
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            redirect_path: "/reports".to_string(),
            redirect_delay_ms: Self::DEFAULT_REDIRECT_DELAY_MS,
            draft_idle_ttl: Duration::from_secs(Self::DEFAULT_DRAFT_IDLE_TTL_SECS),
            sweep_interval: Duration::from_secs(Self::DEFAULT_SWEEP_INTERVAL_SECS),
            max_active_drafts: Self::DEFAULT_MAX_ACTIVE_DRAFTS,
        }
    }
}

impl MapSettings {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        let tile_url = env::var("MAP_TILE_URL").unwrap_or(defaults.tile_url);
        let attribution = env::var("MAP_ATTRIBUTION").unwrap_or(defaults.attribution);
        let default_lat = parse_var("MAP_DEFAULT_LAT", defaults.default_lat)?;
        let default_lng = parse_var("MAP_DEFAULT_LNG", defaults.default_lng)?;
        let default_zoom = parse_var("MAP_DEFAULT_ZOOM", defaults.default_zoom)?;

        Ok(Self {
            tile_url,
            attribution,
            default_lat,
            default_lng,
            default_zoom,
        })
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            default_lat: 27.7172,
            default_lng: 85.3240,
            default_zoom: 13,
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Civic Report Gateway API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Report wizard and municipal backend gateway for civic issue reporting".to_string()
        });

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
