//! 服务配置
//!
//! 分层加载，优先级从低到高：内置默认值 → TOML 文件 → `HASHRS_` 环境变量。
//! 命令行参数在此之后由调用方覆盖。
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [defaults]
//! cost = 14
//! n = 14
//!
//! [limits]
//! max_cost = 20
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};
use crate::password::{HashLimits, HashOptions};
use crate::service::Dispatcher;

/// 未指定配置文件时在工作目录中查找的文件名
pub const DEFAULT_CONFIG_FILE: &str = "hashrs.toml";

/// 环境变量前缀
pub const ENV_PREFIX: &str = "HASHRS_";

/// 完整的服务配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// 进程级默认哈希参数
    #[serde(default)]
    pub defaults: HashOptions,

    #[serde(default)]
    pub limits: HashLimits,
}

/// HTTP 监听配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// 监听地址
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| {
                Error::Config(ConfigError::InvalidValue {
                    key: "server.host".to_string(),
                    message: format!("'{}' is not a valid IP address", self.host),
                })
            })
    }
}

impl ServiceConfig {
    /// 构造分层配置源
    ///
    /// `path` 为 `None` 时，如果工作目录下存在 [`DEFAULT_CONFIG_FILE`] 则读取它。
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(ServiceConfig::default()));

        let file = path
            .map(Path::to_path_buf)
            .or_else(|| Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// 加载并校验配置
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(&Self::figment(path))
    }

    /// 从给定的配置源提取并校验配置
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: ServiceConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// 校验默认参数
    ///
    /// 默认值不能为 0（0 在合并时表示"未设置"），也不能超过参数上限。
    pub fn validate(&self) -> Result<()> {
        let defaults = &self.defaults;
        for (key, value) in [
            ("defaults.cost", u64::from(defaults.cost)),
            ("defaults.n", u64::from(defaults.n)),
            ("defaults.r", u64::from(defaults.r)),
            ("defaults.p", u64::from(defaults.p)),
            ("defaults.salt_size", defaults.salt_size as u64),
            ("defaults.hash_size", defaults.hash_size as u64),
        ] {
            if value == 0 {
                return Err(invalid_value(key, "must be non-zero"));
            }
        }

        for algorithm in crate::password::Algorithm::ALL {
            self.limits
                .check(algorithm, defaults)
                .map_err(|e| invalid_value("defaults", &e.message()))?;
        }
        Ok(())
    }

    /// 使用该配置构建分发器
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::builder()
            .with_defaults(self.defaults)
            .with_limits(self.limits)
            .build()
    }
}

fn invalid_value(key: &str, message: &str) -> Error {
    Error::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.defaults, HashOptions::recommended());
    }

    #[test]
    fn test_validate_rejects_zero_default() {
        let mut config = ServiceConfig::default();
        config.defaults.salt_size = 0;

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { ref key, .. }) if key == "defaults.salt_size"
        ));
    }

    #[test]
    fn test_validate_rejects_defaults_above_limits() {
        let mut config = ServiceConfig::default();
        config.defaults.cost = 25;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
        };
        assert_eq!(server.socket_addr().unwrap().port(), 9000);

        let server = ServerConfig {
            host: "not an ip".to_string(),
            port: 9000,
        };
        assert!(server.socket_addr().is_err());
    }

    #[test]
    fn test_layered_loading() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                [server]
                port = 9090

                [defaults]
                cost = 10
                "#,
            )?;
            jail.set_env("HASHRS_DEFAULTS__SALT_SIZE", "16");

            let config = ServiceConfig::load(Some(Path::new("custom.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.defaults.cost, 10);
            assert_eq!(config.defaults.salt_size, 16);
            assert_eq!(config.defaults.n, 14);
            Ok(())
        });
    }

    #[test]
    fn test_picks_up_default_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "[limits]\nmax_cost = 16\n")?;

            let config = ServiceConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.limits.max_cost, 16);
            assert_eq!(config.limits.max_n, HashLimits::default().max_n);
            Ok(())
        });
    }
}
