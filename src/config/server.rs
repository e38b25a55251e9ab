use serde::Deserialize;

/// Configuration for the status HTTP server.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Whether the status server is started.
    #[serde(default)]
    pub enabled: bool,

    /// Address and port for the HTTP server to listen on.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { enabled: false, listen_address: default_listen_address() }
    }
}

/// Provides the default value for listen_address.
fn default_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

#[cfg(test)]
mod tests {
    use config::Config;

    use super::*;

    #[test]
    fn test_default_server_config() {
        let yaml = r#""#; // Empty YAML should use defaults
        let config = Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize::<ServerConfig>()
            .unwrap();
        assert!(!config.enabled);
        assert_eq!(config.listen_address, default_listen_address());
    }

    #[test]
    fn test_custom_server_config() {
        let yaml = r#"
          enabled: true
          listen_address: "127.0.0.1:3333"
        "#;
        let config = Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize::<ServerConfig>()
            .unwrap();
        assert!(config.enabled);
        assert_eq!(config.listen_address, "127.0.0.1:3333");
    }
}
