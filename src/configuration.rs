use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub password: PasswordSettings,
    #[serde(default)]
    pub refresh_tokens: RefreshTokenSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Access token signing settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64, // seconds, 86400 = 24 hours
}

// Keep the secret out of debug output and logs.
impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[redacted]")
            .field("access_token_expiry", &self.access_token_expiry)
            .finish()
    }
}

impl JwtSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }
        if self.access_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt.access_token_expiry must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// bcrypt work factor
#[derive(serde::Deserialize, Clone, Debug)]
pub struct PasswordSettings {
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            hash_cost: default_hash_cost(),
        }
    }
}

impl PasswordSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(4..=31).contains(&self.hash_cost) {
            return Err(ConfigError::InvalidValue(format!(
                "password.hash_cost must be within 4..=31, got {}",
                self.hash_cost
            )));
        }
        Ok(())
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct RefreshTokenSettings {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for RefreshTokenSettings {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Settings {
    /// Rejects settings the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate()?;
        self.password.validate()?;
        if self.refresh_tokens.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "refresh_tokens.queue_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_token_expiry() -> i64 {
    24 * 60 * 60
}

fn default_hash_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_queue_capacity() -> usize {
    1024
}

/// Reads `configuration.{yaml,toml,json}` from the working directory, then
/// applies `APP_`-prefixed environment overrides such as `APP_JWT__SECRET`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(secret: &str) -> JwtSettings {
        JwtSettings {
            secret: secret.to_string(),
            access_token_expiry: default_access_token_expiry(),
        }
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert_eq!(
            jwt("").validate(),
            Err(ConfigError::MissingRequired("jwt.secret".to_string()))
        );
        assert!(jwt("   ").validate().is_err());
    }

    #[test]
    fn test_non_positive_expiry_is_rejected() {
        let mut settings = jwt("test-secret");
        settings.access_token_expiry = 0;
        assert!(matches!(settings.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_default_expiry_is_one_day() {
        assert_eq!(default_access_token_expiry(), 86_400);
    }

    #[test]
    fn test_hash_cost_bounds() {
        assert!(PasswordSettings { hash_cost: 3 }.validate().is_err());
        assert!(PasswordSettings { hash_cost: 32 }.validate().is_err());
        assert!(PasswordSettings { hash_cost: 4 }.validate().is_ok());
        assert!(PasswordSettings::default().validate().is_ok());
    }

    #[test]
    fn test_debug_output_redacts_secret() {
        let rendered = format!("{:?}", jwt("super-secret-value"));
        assert!(!rendered.contains("super-secret-value"));
    }
}
