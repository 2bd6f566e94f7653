//! 请求与响应类型
//!
//! 这些类型就是传输层与核心之间的边界：传输层负责把线上的 JSON
//! 解码成 [`HashRequest`]，再把 [`HashResponse`] 编码回去。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::password::HashOverrides;

/// 哈希请求
///
/// `Debug` 输出中不包含明文密码。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRequest {
    /// 算法标识符（线上字段名为 `type`，也接受 `algorithm`）
    #[serde(rename = "type", alias = "algorithm", default)]
    pub algorithm: String,

    /// 明文密码
    #[serde(default)]
    pub password: String,

    /// 可选的调优参数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<HashOverrides>,
}

impl HashRequest {
    /// 创建不带调优参数的请求
    pub fn new(algorithm: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            password: password.into(),
            options: None,
        }
    }

    /// 设置调优参数
    pub fn with_options(mut self, options: HashOverrides) -> Self {
        self.options = Some(options);
        self
    }

    /// 检查必填字段
    ///
    /// 只检查算法和密码非空，参数值由合并和驱动阶段检查。无副作用。
    pub fn validate(&self) -> Result<()> {
        if self.algorithm.is_empty() {
            return Err(Error::bad_request("the type field is required"));
        }
        if self.password.is_empty() {
            return Err(Error::bad_request("the password field is required"));
        }
        Ok(())
    }
}

impl fmt::Debug for HashRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRequest")
            .field("algorithm", &self.algorithm)
            .field("password", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

/// 哈希响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashResponse {
    /// 自描述的哈希字符串
    pub hash: String,
}

/// 验证请求
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub hash: String,
}

impl VerifyRequest {
    pub fn new(password: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            hash: hash.into(),
        }
    }

    /// 检查必填字段
    pub fn validate(&self) -> Result<()> {
        if self.password.is_empty() {
            return Err(Error::bad_request("the password field is required"));
        }
        if self.hash.is_empty() {
            return Err(Error::bad_request("the hash field is required"));
        }
        Ok(())
    }
}

impl fmt::Debug for VerifyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyRequest")
            .field("password", &"<redacted>")
            .field("hash", &self.hash)
            .finish()
    }
}

/// 验证响应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
}
