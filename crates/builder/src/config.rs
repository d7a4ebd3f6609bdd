use folio_core::portfolio::{TemplateKind, DEFAULT_THEME};

/// Default public slug length.
pub const DEFAULT_SLUG_LENGTH: usize = 10;

/// Accepted public slug lengths.
pub const SLUG_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 6..=32;

/// Default number of attempts when minting ids and slugs.
pub const DEFAULT_MAX_ID_ATTEMPTS: u32 = 5;

/// Errors raised while reading [`BuilderConfig`] from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Builder configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Length of minted public slugs (default: `10`).
    pub slug_length: usize,
    /// Attempts before an id or slug collision surfaces as a conflict (default: `5`).
    pub max_id_attempts: u32,
    /// Theme given to new portfolios that do not name one (default: `default`).
    pub default_theme: String,
    /// Template given to new portfolios that do not name one (default: `gallery`).
    pub default_template: TemplateKind,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            slug_length: DEFAULT_SLUG_LENGTH,
            max_id_attempts: DEFAULT_MAX_ID_ATTEMPTS,
            default_theme: DEFAULT_THEME.to_string(),
            default_template: TemplateKind::default(),
        }
    }
}

impl BuilderConfig {
    /// Load configuration from environment variables with defaults. A `.env`
    /// file in the working directory is read first, if present.
    ///
    /// | Env Var                  | Default   |
    /// |--------------------------|-----------|
    /// | `FOLIO_SLUG_LENGTH`      | `10`      |
    /// | `FOLIO_MAX_ID_ATTEMPTS`  | `5`       |
    /// | `FOLIO_DEFAULT_THEME`    | `default` |
    /// | `FOLIO_DEFAULT_TEMPLATE` | `gallery` |
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let slug_length = match lookup("FOLIO_SLUG_LENGTH") {
            Some(raw) => {
                let len: usize = raw.trim().parse().map_err(|_| {
                    ConfigError::invalid("FOLIO_SLUG_LENGTH", &raw, "must be an integer")
                })?;
                if !SLUG_LENGTH_RANGE.contains(&len) {
                    return Err(ConfigError::invalid(
                        "FOLIO_SLUG_LENGTH",
                        &raw,
                        format!(
                            "must be between {} and {}",
                            SLUG_LENGTH_RANGE.start(),
                            SLUG_LENGTH_RANGE.end()
                        ),
                    ));
                }
                len
            }
            None => defaults.slug_length,
        };

        let max_id_attempts = match lookup("FOLIO_MAX_ID_ATTEMPTS") {
            Some(raw) => {
                let attempts: u32 = raw.trim().parse().map_err(|_| {
                    ConfigError::invalid("FOLIO_MAX_ID_ATTEMPTS", &raw, "must be an integer")
                })?;
                if attempts == 0 {
                    return Err(ConfigError::invalid(
                        "FOLIO_MAX_ID_ATTEMPTS",
                        &raw,
                        "must be at least 1",
                    ));
                }
                attempts
            }
            None => defaults.max_id_attempts,
        };

        let default_theme = match lookup("FOLIO_DEFAULT_THEME") {
            Some(raw) if raw.trim().is_empty() => {
                tracing::warn!("FOLIO_DEFAULT_THEME is blank, using '{DEFAULT_THEME}'");
                defaults.default_theme
            }
            Some(raw) => raw.trim().to_string(),
            None => defaults.default_theme,
        };

        let default_template = match lookup("FOLIO_DEFAULT_TEMPLATE") {
            Some(raw) => TemplateKind::from_name(raw.trim()).map_err(|err| {
                ConfigError::invalid("FOLIO_DEFAULT_TEMPLATE", &raw, err.to_string())
            })?,
            None => defaults.default_template,
        };

        Ok(Self {
            slug_length,
            max_id_attempts,
            default_theme,
            default_template,
        })
    }
}
