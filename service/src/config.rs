use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// Ten years; keeps expiry arithmetic inside chrono's date range.
const MAX_DURATION_SECS: u64 = 315_360_000;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Public base URL of this server. OAuth callback URLs are built under it.
    #[arg(long, env, default_value = "http://localhost:4000/")]
    pub host_url: String,

    /// Path of the YAML file describing the OAuth providers
    #[arg(long, env, default_value = "conf/oauth_config.yaml")]
    pub oauth_config_path: PathBuf,

    /// Timeout in seconds for every call to an OAuth provider
    #[arg(long, env, default_value_t = 10)]
    pub http_timeout_secs: u64,

    /// Seconds a started OAuth login stays valid. Unset keeps pending logins until their callback arrives.
    #[arg(long, env, value_parser = clap::value_parser!(u64).range(1..=MAX_DURATION_SECS))]
    pub pending_state_ttl_secs: Option<u64>,

    /// Seconds of inactivity after which a session is no longer valid
    #[arg(long, env, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..=MAX_DURATION_SECS))]
    pub session_timeout_secs: u64,

    /// Seconds between purges of expired sessions
    #[arg(long, env, default_value_t = 300)]
    pub session_purge_interval_secs: u64,

    /// Directory of static files served for any path not matched by a route
    #[arg(long, env, default_value = "./public")]
    pub static_dir: PathBuf,

    /// Password given to the `admin` user when the account store is first created
    #[arg(long, env, default_value = "admin", hide_env_values = true)]
    admin_password: String,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn admin_password(&self) -> &str {
        &self.admin_password
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn pending_state_ttl(&self) -> Option<Duration> {
        self.pending_state_ttl_secs.map(Duration::from_secs)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    pub fn session_purge_interval(&self) -> Duration {
        Duration::from_secs(self.session_purge_interval_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_explicit_arguments() {
        let config = Config::try_parse_from([
            "localiday",
            "--port",
            "8080",
            "--host-url",
            "https://localiday.com",
            "--oauth-config-path",
            "/etc/localiday/oauth.yaml",
            "--http-timeout-secs",
            "3",
            "--pending-state-ttl-secs",
            "600",
            "--log-level-filter",
            "DEBUG",
            "--runtime-env",
            "production",
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host_url, "https://localiday.com");
        assert_eq!(
            config.oauth_config_path,
            PathBuf::from("/etc/localiday/oauth.yaml")
        );
        assert_eq!(config.http_timeout(), Duration::from_secs(3));
        assert_eq!(config.pending_state_ttl(), Some(Duration::from_secs(600)));
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
        assert!(config.is_production());
    }

    #[test]
    fn test_runtime_env_parsing() {
        assert_eq!("Staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
        assert_eq!(RustEnv::Development.to_string(), "development");
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        assert!(Config::try_parse_from(["localiday", "--log-level-filter", "LOUD"]).is_err());
    }

    #[test]
    fn test_durations_beyond_ten_years_are_rejected() {
        assert!(
            Config::try_parse_from(["localiday", "--session-timeout-secs", "10000000000000"])
                .is_err()
        );
        assert!(
            Config::try_parse_from(["localiday", "--pending-state-ttl-secs", "10000000000000"])
                .is_err()
        );
        assert!(Config::try_parse_from(["localiday", "--session-timeout-secs", "0"]).is_err());

        let config =
            Config::try_parse_from(["localiday", "--session-timeout-secs", "315360000"]).unwrap();
        assert_eq!(config.session_timeout(), Duration::from_secs(315_360_000));
    }
}
