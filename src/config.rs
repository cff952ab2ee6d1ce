use clap::Parser;

use crate::gemini;

/// Command line arguments for imgstudio-server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Hostname/IP to bind the server to.
    /// If this option is specified without value, it will default to "*", meaning the server will listen on all interfaces.
    #[arg(long, env = "IMGSTUDIO_SERVER_HOST", default_value = "localhost", num_args = 0..=1, default_missing_value = "*")]
    pub host: String,

    /// Port number to listen on.
    #[arg(short, long, env = "IMGSTUDIO_SERVER_PORT", default_value_t = 6890)]
    pub port: u16,

    /// API key for the Google Generative Language API.
    /// Without it the server starts, but generation and enhancement requests fail.
    #[arg(long, env = "GOOGLE_GENERATIVE_AI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the generative model API.
    #[arg(long, env = "IMGSTUDIO_GEMINI_BASE_URL", default_value = gemini::DEFAULT_BASE_URL)]
    pub gemini_base_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::parse_from(["imgstudio-server"]);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 6890);
        assert_eq!(config.gemini_base_url, gemini::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_host_flag_without_value_means_wildcard() {
        let config = AppConfig::parse_from(["imgstudio-server", "--host"]);
        assert_eq!(config.host, "*");
    }

    #[test]
    fn test_explicit_values() {
        let config = AppConfig::parse_from([
            "imgstudio-server",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--api-key",
            "k",
        ]);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_key.as_deref(), Some("k"));
    }
}
