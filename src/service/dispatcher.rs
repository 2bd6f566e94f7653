//! 请求分发
//!
//! [`Dispatcher`] 持有进程级只读的默认参数、参数上限和按算法标识符索引的驱动表。
//! 每个请求依次经过：
//!
//! ```text
//! Received -> Validated -> OptionsResolved -> Dispatched -> Succeeded
//!                                                        \-> Failed
//! ```
//!
//! 任一阶段失败都直接进入 `Failed`，不做重试。
//!
//! ## 示例
//!
//! ```rust
//! use hashrs::password::HashOverrides;
//! use hashrs::service::{Dispatcher, HashRequest};
//!
//! let dispatcher = Dispatcher::default();
//! let request = HashRequest::new("scrypt", "hunter2")
//!     .with_options(HashOverrides::new().with_n(10));
//!
//! let response = dispatcher.dispatch(&request).unwrap();
//! assert!(response.hash.starts_with("$scrypt$ln=10,"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use super::request::{HashRequest, HashResponse, VerifyRequest, VerifyResponse};
use crate::error::{Error, PasswordHashError, Result};
use crate::password::{
    Algorithm, BcryptDriver, HashDriver, HashLimits, HashOptions, ScryptDriver, resolve_options,
};

/// 请求处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    OptionsResolved,
    Dispatched,
    Succeeded,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::OptionsResolved => "options_resolved",
            Stage::Dispatched => "dispatched",
            Stage::Succeeded => "succeeded",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// 哈希请求分发器
///
/// 构造后不可变，可以通过 `Arc` 在并发请求之间共享而无需加锁。
#[derive(Clone)]
pub struct Dispatcher {
    defaults: HashOptions,
    limits: HashLimits,
    drivers: HashMap<&'static str, Arc<dyn HashDriver>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("defaults", &self.defaults)
            .field("limits", &self.limits)
            .field("algorithms", &self.algorithms())
            .finish()
    }
}

impl Dispatcher {
    /// 使用给定的默认参数和内置驱动创建分发器
    pub fn new(defaults: HashOptions) -> Self {
        Self::builder().with_defaults(defaults).build()
    }

    /// 创建构建器（已注册内置的 bcrypt 和 scrypt 驱动）
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// 进程级默认参数
    pub fn defaults(&self) -> &HashOptions {
        &self.defaults
    }

    /// 参数上限
    pub fn limits(&self) -> &HashLimits {
        &self.limits
    }

    /// 已注册的算法标识符（按字母排序）
    pub fn algorithms(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.drivers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// 处理一个哈希请求
    ///
    /// # Errors
    ///
    /// - 缺少字段或算法未知：[`Error::BadRequest`]
    /// - 参数无法合并或超出上限：[`Error::InvalidOptions`]
    /// - 底层原语失败：[`PasswordHashError::HashFailed`]
    #[instrument(level = "debug", skip_all, fields(algorithm = %request.algorithm))]
    pub fn dispatch(&self, request: &HashRequest) -> Result<HashResponse> {
        let mut stage = Stage::Received;
        let result = self.run(request, &mut stage);

        match &result {
            Ok(_) => debug!(stage = %Stage::Succeeded, "hash request completed"),
            Err(e) => debug!(
                stage = %Stage::Failed,
                last_stage = %stage,
                error = %e,
                "hash request failed"
            ),
        }
        result
    }

    fn run(&self, request: &HashRequest, stage: &mut Stage) -> Result<HashResponse> {
        request.validate()?;
        advance(stage, Stage::Validated);

        let driver = self
            .drivers
            .get(request.algorithm.as_str())
            .ok_or_else(|| Error::bad_request("invalid algorithm"))?;

        let options = resolve_options(request.options.as_ref(), &self.defaults)?;
        advance(stage, Stage::OptionsResolved);

        self.limits.check(driver.algorithm(), &options)?;
        advance(stage, Stage::Dispatched);

        let hash = driver.hash(request.password.as_bytes(), &options)?;
        Ok(HashResponse { hash })
    }

    /// 验证密码是否匹配哈希
    ///
    /// 根据哈希前缀选择已注册的驱动。哈希中携带的参数同样受参数上限约束。
    #[instrument(level = "debug", skip_all)]
    pub fn verify(&self, request: &VerifyRequest) -> Result<VerifyResponse> {
        request.validate()?;

        let driver = self
            .drivers
            .values()
            .find(|driver| driver.recognizes(&request.hash))
            .ok_or_else(|| {
                Error::PasswordHash(PasswordHashError::InvalidFormat(
                    "unknown hash format".to_string(),
                ))
            })?;
        self.limits
            .check(driver.algorithm(), &driver.parameters(&request.hash)?)?;

        let valid = driver.verify(request.password.as_bytes(), &request.hash)?;
        debug!(algorithm = %driver.algorithm(), valid, "verify request completed");
        Ok(VerifyResponse { valid })
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = %stage, to = %next, "hash request stage");
    *stage = next;
}

/// [`Dispatcher`] 构建器
pub struct DispatcherBuilder {
    defaults: HashOptions,
    limits: HashLimits,
    drivers: HashMap<&'static str, Arc<dyn HashDriver>>,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self {
            defaults: HashOptions::recommended(),
            limits: HashLimits::default(),
            drivers: HashMap::new(),
        }
        .with_driver(Arc::new(BcryptDriver))
        .with_driver(Arc::new(ScryptDriver))
    }
}

impl DispatcherBuilder {
    /// 设置默认参数
    pub fn with_defaults(mut self, defaults: HashOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// 设置参数上限
    pub fn with_limits(mut self, limits: HashLimits) -> Self {
        self.limits = limits;
        self
    }

    /// 注册驱动，替换同一算法已有的驱动
    pub fn with_driver(mut self, driver: Arc<dyn HashDriver>) -> Self {
        self.drivers.insert(driver.algorithm().id(), driver);
        self
    }

    /// 移除某个算法的驱动
    pub fn without(mut self, algorithm: Algorithm) -> Self {
        self.drivers.remove(algorithm.id());
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            defaults: self.defaults,
            limits: self.limits,
            drivers: self.drivers,
        }
    }
}
