//! Configuration loading

use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;

use metamoney_core::AppConfig;

/// Env var naming the config file (without extension)
pub const CONFIG_FILE_VAR: &str = "METAMONEY_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "metamoney";

/// Optional config file, overridden by `METAMONEY__SECTION__KEY` variables
pub fn load(file: &str) -> anyhow::Result<AppConfig> {
    let builder = Config::builder()
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix("METAMONEY")
                .prefix_separator("__")
                .separator("__"),
        );
    build(builder)
}

fn build(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<AppConfig> {
    let config: AppConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use metamoney_core::{Connector, NetworkId};

    fn from_toml(text: &str) -> anyhow::Result<AppConfig> {
        build(Config::builder().add_source(File::from_str(text, FileFormat::Toml)))
    }

    #[test]
    fn test_full_file() {
        let config = from_toml(
            r#"
            connector = "metamask"
            account = "0x2222222222222222222222222222222222222222"

            [network]
            rpc_url = "http://127.0.0.1:8545"
            network_id = 42
            money_market = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"

            [prices]
            api_key = "demo"
            cache_ttl_secs = 120

            [refresh]
            interval_secs = 15

            [[symbols]]
            network_id = 42
            address = "0x1111111111111111111111111111111111111111"
            symbol = "DAI"
            "#,
        )
        .unwrap();

        assert_eq!(config.connector, Connector::MetaMask);
        assert_eq!(config.network.network_id, Some(NetworkId::KOVAN));
        assert_eq!(config.prices.api_key.as_deref(), Some("demo"));
        assert_eq!(config.prices.timeout_ms, 5_000);
        assert_eq!(config.refresh.interval_secs, 15);
        assert_eq!(config.symbols.len(), 1);
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config = from_toml(
            r#"
            [network]
            rpc_url = "http://127.0.0.1:8545"
            money_market = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
            "#,
        )
        .unwrap();

        assert_eq!(config.connector, Connector::Infura);
        assert_eq!(config.account, None);
        assert_eq!(config.refresh.interval_secs, 30);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let result = from_toml(
            r#"
            [network]
            rpc_url = ""
            money_market = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
            "#,
        );
        assert!(result.is_err());
    }
}
