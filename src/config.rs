use serde::Deserialize;

/// Default origins allowed to call the API from a browser.
const DEFAULT_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:5000",
    "http://127.0.0.1:5000",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Origins granted CORS access. Populated from ALLOWED_ORIGINS
    /// (comma-separated) or the localhost development defaults.
    pub allowed_origins: Vec<String>,
    /// Artifact directory override from LEAD_MODEL_DIR. When unset the
    /// loader searches its candidate directories instead.
    pub model_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|raw| {
                    raw.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect()),
            model_dir: std::env::var("LEAD_MODEL_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Allowed Origins: {:?}", config.allowed_origins);
        if let Some(ref dir) = config.model_dir {
            tracing::info!("Artifact directory override: {}", dir);
        }

        Ok(config)
    }
}
