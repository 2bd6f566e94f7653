//! 统一错误类型模块
//!
//! 提供 hashrs 中所有操作的错误类型定义，以及错误到调用方可见状态的归类。

use std::fmt;

/// hashrs 的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// hashrs 的错误类型
#[derive(Debug)]
pub enum Error {
    /// 请求无效（缺少字段、未知算法、无法解码的载荷）
    BadRequest(String),

    /// 调优参数无法合并或超出允许范围
    InvalidOptions(String),

    /// 密码哈希错误
    PasswordHash(PasswordHashError),

    /// 加密错误
    Crypto(CryptoError),

    /// 配置错误
    Config(ConfigError),

    /// 内部错误
    Internal(String),
}

/// 调用方可见的错误状态
///
/// 传输层据此选择 4xx 或 5xx 状态码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorStatus {
    /// 调用方输入有误
    BadRequest,
    /// 服务端计算失败
    InternalError,
}

impl Error {
    /// 创建一个请求无效错误
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Error::BadRequest(msg.into())
    }

    /// 创建一个参数无效错误
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Error::InvalidOptions(msg.into())
    }

    /// 创建一个哈希计算失败错误
    pub fn hash_failed(msg: impl Into<String>) -> Self {
        Error::PasswordHash(PasswordHashError::HashFailed(msg.into()))
    }

    /// 创建一个内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// 将错误归类为调用方可见的状态
    pub fn status(&self) -> ErrorStatus {
        match self {
            Error::BadRequest(_)
            | Error::InvalidOptions(_)
            | Error::PasswordHash(PasswordHashError::InvalidFormat(_)) => ErrorStatus::BadRequest,
            Error::PasswordHash(PasswordHashError::HashFailed(_))
            | Error::Crypto(_)
            | Error::Config(_)
            | Error::Internal(_) => ErrorStatus::InternalError,
        }
    }

    /// 返回给调用方的简短描述
    ///
    /// 与 `Display` 不同，不带错误类别前缀。
    pub fn message(&self) -> String {
        match self {
            Error::BadRequest(msg) | Error::InvalidOptions(msg) | Error::Internal(msg) => {
                msg.clone()
            }
            Error::PasswordHash(e) => e.to_string(),
            Error::Crypto(e) => e.to_string(),
            Error::Config(e) => e.to_string(),
        }
    }
}

/// 密码哈希相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordHashError {
    /// 哈希生成失败
    HashFailed(String),
    /// 无效的哈希格式
    InvalidFormat(String),
}

/// 配置相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 配置加载失败
    LoadFailed(String),
    /// 无效的配置值
    InvalidValue { key: String, message: String },
}

/// 加密相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// 随机数生成失败
    RngFailed(String),
}

// ============================================================================
// Display 实现
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Error::InvalidOptions(msg) => write!(f, "Invalid options: {}", msg),
            Error::PasswordHash(e) => write!(f, "Password hash error: {}", e),
            Error::Crypto(e) => write!(f, "Crypto error: {}", e),
            Error::Config(e) => write!(f, "Config error: {}", e),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl fmt::Display for PasswordHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordHashError::HashFailed(msg) => write!(f, "hash generation failed: {}", msg),
            PasswordHashError::InvalidFormat(msg) => write!(f, "invalid hash format: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed(msg) => write!(f, "failed to load configuration: {}", msg),
            ConfigError::InvalidValue { key, message } => {
                write!(f, "invalid configuration value for '{}': {}", key, message)
            }
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::RngFailed(msg) => write!(f, "random number generation failed: {}", msg),
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorStatus::BadRequest => write!(f, "BadRequest"),
            ErrorStatus::InternalError => write!(f, "InternalError"),
        }
    }
}

// ============================================================================
// std::error::Error 实现
// ============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::PasswordHash(e) => Some(e),
            Error::Crypto(e) => Some(e),
            Error::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for PasswordHashError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CryptoError {}

// ============================================================================
// From 实现 - 方便错误转换
// ============================================================================

impl From<PasswordHashError> for Error {
    fn from(err: PasswordHashError) -> Self {
        Error::PasswordHash(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<CryptoError> for Error {
    fn from(err: CryptoError) -> Self {
        Error::Crypto(err)
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(ConfigError::LoadFailed(err.to_string()))
    }
}
