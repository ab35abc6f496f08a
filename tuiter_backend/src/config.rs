use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct TuiterConfig {
    pub api_port: u16,
    pub paths: TuiterPaths,
    pub http: HttpConfig,
}

impl TuiterConfig {
    pub fn from_env() -> Result<Self> {
        let paths = TuiterPaths::discover()?;
        let api_port = env::var("TUITER_API_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(4000);
        let http = HttpConfig::from_env();
        Ok(Self {
            api_port,
            paths,
            http,
        })
    }

    pub fn new(api_port: u16, paths: TuiterPaths, http: HttpConfig) -> Self {
        Self {
            api_port,
            paths,
            http,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Origins allowed to make credentialed cross-origin requests.
    pub allowed_origins: Vec<String>,
    /// Marks the session cookie `Secure`; enabled when running in production.
    pub secure_cookies: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".into()],
            secure_cookies: false,
        }
    }
}

impl HttpConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let allowed_origins = env::var("TUITER_CORS_ORIGINS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        let secure_cookies = env::var("TUITER_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Self {
            allowed_origins,
            secure_cookies,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TuiterPaths {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
}

impl TuiterPaths {
    pub fn discover() -> Result<Self> {
        if let Ok(dir) = env::var("TUITER_DATA_DIR") {
            if !dir.trim().is_empty() {
                return Self::from_data_dir(dir);
            }
        }
        let cwd = env::current_dir()
            .map_err(|err| anyhow!("failed to resolve working directory: {err}"))?;
        Self::from_data_dir(cwd.join("data"))
    }

    pub fn from_data_dir<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let db_path = data_dir.join("tuiter.db");
        Ok(Self { data_dir, db_path })
    }
}
