use config::{Config, Environment, File, Source};
use tickwatch_core::config::{AppConfig, ConfigError};

/// Config file used when `TICKWATCH_CONFIG` is not set. Missing is fine.
pub const DEFAULT_CONFIG_PATH: &str = "config/tickwatch.toml";

/// # Summary
/// Loads and validates the application configuration.
///
/// # Logic
/// 1. Optional TOML file at `$TICKWATCH_CONFIG` (default `config/tickwatch.toml`).
/// 2. Overlaid by `TICKWATCH__SECTION__KEY` environment variables.
/// 3. Defaults fill every missing key; the result is validated.
pub fn load() -> Result<AppConfig, ConfigError> {
    let path =
        std::env::var("TICKWATCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    from_sources(File::with_name(&path).required(false), environment())
}

fn environment() -> Environment {
    Environment::with_prefix("TICKWATCH")
        .separator("__")
        .try_parsing(true)
}

fn from_sources<S>(file: S, env: Environment) -> Result<AppConfig, ConfigError>
where
    S: Source + Send + Sync + 'static,
{
    let settings = Config::builder()
        .add_source(file)
        .add_source(env)
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app: AppConfig = settings
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;
    app.validate()?;
    Ok(app)
}
