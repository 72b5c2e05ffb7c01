use clap::{Parser, ValueEnum, builder::BoolishValueParser};
use codealive_client::DEFAULT_BASE_URL;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8000";

#[derive(Parser, Debug)]
#[command(name = "codealive-mcpd", version, about = "CodeAlive MCP server daemon.")]
struct CliArgs {
    #[arg(long, env = "CODEALIVE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "CODEALIVE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "CODEALIVE_TRANSPORT", value_enum, default_value = "stdio")]
    transport: Transport,

    #[arg(long, env = "CODEALIVE_HTTP_ADDR", default_value = DEFAULT_HTTP_ADDR)]
    http_addr: SocketAddr,

    #[arg(
        long,
        env = "CODEALIVE_IGNORE_SSL",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    ignore_ssl: bool,

    #[arg(
        long,
        env = "CODEALIVE_DEBUG",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    debug: bool,
}

/// Transport the MCP protocol is served over.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}

/// Runtime configuration resolved once from CLI arguments and environment
/// variables; flags take precedence over environment, environment over
/// built-in defaults.
#[derive(Clone)]
pub struct ServerConfig {
    pub api_key: String,
    pub base_url: String,
    pub transport: Transport,
    pub http_addr: SocketAddr,
    pub verify_ssl: bool,
    pub debug: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl ServerConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    /// Masked key suffix safe for startup logs.
    pub fn api_key_hint(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() > 4 {
            let suffix: String = chars[chars.len() - 4..].iter().collect();
            format!("...{suffix}")
        } else {
            "****".to_string()
        }
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let api_key = args
            .api_key
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingSetting("CODEALIVE_API_KEY"))?;

        if args.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "CODEALIVE_BASE_URL",
                value: args.base_url,
            });
        }

        // --debug implies accepting self-signed endpoints, for debugging
        // against local service instances.
        let verify_ssl = !(args.ignore_ssl || args.debug);

        Ok(Self {
            api_key,
            base_url: args.base_url,
            transport: args.transport,
            http_addr: args.http_addr,
            verify_ssl,
            debug: args.debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            api_key: Some("sk-test-key".to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: Transport::Stdio,
            http_addr: DEFAULT_HTTP_ADDR.parse().expect("valid HTTP addr"),
            ignore_ssl: false,
            debug: false,
        }
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let mut args = base_args();
        args.api_key = None;
        assert!(matches!(
            ServerConfig::try_from(args),
            Err(ConfigError::MissingSetting("CODEALIVE_API_KEY"))
        ));

        let mut args = base_args();
        args.api_key = Some("   ".to_string());
        assert!(ServerConfig::try_from(args).is_err());
    }

    #[test]
    fn ssl_verification_defaults_on_and_debug_disables_it() {
        let config = ServerConfig::try_from(base_args()).expect("config should parse");
        assert!(config.verify_ssl);

        let mut args = base_args();
        args.ignore_ssl = true;
        let config = ServerConfig::try_from(args).expect("config should parse");
        assert!(!config.verify_ssl);

        let mut args = base_args();
        args.debug = true;
        let config = ServerConfig::try_from(args).expect("config should parse");
        assert!(!config.verify_ssl);
    }

    #[test]
    fn blank_base_url_is_rejected() {
        let mut args = base_args();
        args.base_url = "  ".to_string();
        assert!(matches!(
            ServerConfig::try_from(args),
            Err(ConfigError::InvalidSetting {
                name: "CODEALIVE_BASE_URL",
                ..
            })
        ));
    }

    #[test]
    fn api_key_hint_masks_all_but_the_suffix() {
        let config = ServerConfig::try_from(base_args()).expect("config should parse");
        assert_eq!(config.api_key_hint(), "...-key");

        let mut args = base_args();
        args.api_key = Some("abc".to_string());
        let config = ServerConfig::try_from(args).expect("config should parse");
        assert_eq!(config.api_key_hint(), "****");
    }
}
