//! 哈希参数模块
//!
//! 定义算法无关的参数全集 [`HashOptions`]、调用方提交的可选覆盖项
//! [`HashOverrides`]，以及将两者逐字段合并的 [`resolve_options`]。
//!
//! ## 示例
//!
//! ```rust
//! use hashrs::password::{HashOptions, HashOverrides, resolve_options};
//!
//! let defaults = HashOptions::recommended();
//! let overrides = HashOverrides::new().with_salt_size(16);
//!
//! let resolved = resolve_options(Some(&overrides), &defaults).unwrap();
//! assert_eq!(resolved.salt_size, 16);
//! assert_eq!(resolved.hash_size, defaults.hash_size);
//! ```

use serde::{Deserialize, Serialize};

use super::hasher::Algorithm;
use crate::error::{Error, Result};

/// 默认 bcrypt cost
pub const DEFAULT_COST: u32 = 14;
/// 默认 scrypt CPU/内存开销指数 (log2 N)
pub const DEFAULT_LOG_N: u8 = 14;
/// 默认 scrypt 块大小
pub const DEFAULT_BLOCK_SIZE: u32 = 8;
/// 默认 scrypt 并行度
pub const DEFAULT_PARALLELISM: u32 = 1;
/// 默认盐值长度（字节）
pub const DEFAULT_SALT_SIZE: usize = 32;
/// 默认输出长度（字节）
pub const DEFAULT_HASH_SIZE: usize = 32;

/// 完整的哈希参数
///
/// 每个请求在合并后得到一份独立的副本，合并后不再修改。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashOptions {
    /// bcrypt 工作因子
    pub cost: u32,
    /// scrypt CPU/内存开销指数 (log2 N)
    pub n: u8,
    /// scrypt 块大小
    pub r: u32,
    /// scrypt 并行度
    pub p: u32,
    /// 随机盐值长度（字节）
    pub salt_size: usize,
    /// 派生输出长度（字节）
    pub hash_size: usize,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self::recommended()
    }
}

impl HashOptions {
    /// 推荐参数
    pub fn recommended() -> Self {
        Self {
            cost: DEFAULT_COST,
            n: DEFAULT_LOG_N,
            r: DEFAULT_BLOCK_SIZE,
            p: DEFAULT_PARALLELISM,
            salt_size: DEFAULT_SALT_SIZE,
            hash_size: DEFAULT_HASH_SIZE,
        }
    }

    /// 设置 bcrypt cost
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// 设置 scrypt 参数（log_n、r、p）
    pub fn with_scrypt(mut self, n: u8, r: u32, p: u32) -> Self {
        self.n = n;
        self.r = r;
        self.p = p;
        self
    }

    /// 设置盐值长度
    pub fn with_salt_size(mut self, salt_size: usize) -> Self {
        self.salt_size = salt_size;
        self
    }

    /// 设置输出长度
    pub fn with_hash_size(mut self, hash_size: usize) -> Self {
        self.hash_size = hash_size;
        self
    }
}

/// 调用方提交的参数覆盖项
///
/// 所有字段均可省略。省略的字段以及值为 0 的字段都会回退到默认值。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_size: Option<u64>,
}

impl HashOverrides {
    /// 创建空的覆盖项
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cost(mut self, cost: u64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_n(mut self, n: u64) -> Self {
        self.n = Some(n);
        self
    }

    pub fn with_r(mut self, r: u64) -> Self {
        self.r = Some(r);
        self
    }

    pub fn with_p(mut self, p: u64) -> Self {
        self.p = Some(p);
        self
    }

    pub fn with_salt_size(mut self, salt_size: u64) -> Self {
        self.salt_size = Some(salt_size);
        self
    }

    pub fn with_hash_size(mut self, hash_size: u64) -> Self {
        self.hash_size = Some(hash_size);
        self
    }
}

/// 将调用方的覆盖项逐字段合并到默认参数之上
///
/// 非零的字段覆盖默认值；缺省或为 0 的字段保留默认值。
///
/// # Errors
///
/// 如果某个覆盖值无法放入目标字段类型（例如 `n` 大于 255），
/// 返回 [`Error::InvalidOptions`]。
pub fn resolve_options(
    overrides: Option<&HashOverrides>,
    defaults: &HashOptions,
) -> Result<HashOptions> {
    let Some(overrides) = overrides else {
        return Ok(*defaults);
    };

    Ok(HashOptions {
        cost: pick("cost", overrides.cost, defaults.cost)?,
        n: pick("n", overrides.n, defaults.n)?,
        r: pick("r", overrides.r, defaults.r)?,
        p: pick("p", overrides.p, defaults.p)?,
        salt_size: pick("salt_size", overrides.salt_size, defaults.salt_size)?,
        hash_size: pick("hash_size", overrides.hash_size, defaults.hash_size)?,
    })
}

fn pick<T: TryFrom<u64>>(field: &str, value: Option<u64>, default: T) -> Result<T> {
    match value {
        None | Some(0) => Ok(default),
        Some(v) => T::try_from(v)
            .map_err(|_| Error::invalid_options(format!("option '{}' is out of range", field))),
    }
}

/// 参数上限（准入控制）
///
/// 只检查所选算法实际使用的字段，其余字段被忽略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashLimits {
    pub max_cost: u32,
    pub max_n: u8,
    pub max_r: u32,
    pub max_p: u32,
    pub max_salt_size: usize,
    pub max_hash_size: usize,
    /// scrypt 工作内存上限（字节），按 128 * r * 2^n 估算
    pub max_memory: u64,
}

impl Default for HashLimits {
    fn default() -> Self {
        Self {
            max_cost: 20,
            max_n: 20,
            max_r: 32,
            max_p: 16,
            max_salt_size: 1024,
            max_hash_size: 1024,
            max_memory: 1 << 30,
        }
    }
}

impl HashLimits {
    /// 不做任何限制（仅受底层原语自身范围约束）
    pub fn unbounded() -> Self {
        Self {
            max_cost: u32::MAX,
            max_n: u8::MAX,
            max_r: u32::MAX,
            max_p: u32::MAX,
            max_salt_size: usize::MAX,
            max_hash_size: usize::MAX,
            max_memory: u64::MAX,
        }
    }

    /// 检查合并后的参数是否在上限之内
    pub fn check(&self, algorithm: Algorithm, options: &HashOptions) -> Result<()> {
        match algorithm {
            Algorithm::Bcrypt => ensure_within("cost", options.cost, self.max_cost),
            Algorithm::Scrypt => {
                ensure_within("n", options.n, self.max_n)?;
                ensure_within("r", options.r, self.max_r)?;
                ensure_within("p", options.p, self.max_p)?;
                ensure_within("salt_size", options.salt_size, self.max_salt_size)?;
                ensure_within("hash_size", options.hash_size, self.max_hash_size)?;
                self.check_memory(options)
            }
        }
    }

    fn check_memory(&self, options: &HashOptions) -> Result<()> {
        let required = 1u128
            .checked_shl(u32::from(options.n))
            .and_then(|n| n.checked_mul(128 * u128::from(options.r)));
        match required {
            Some(bytes) if bytes <= u128::from(self.max_memory) => Ok(()),
            _ => Err(Error::invalid_options(format!(
                "scrypt parameters exceed the memory limit of {} bytes",
                self.max_memory
            ))),
        }
    }
}

fn ensure_within<T: PartialOrd + std::fmt::Display>(field: &str, value: T, max: T) -> Result<()> {
    if value > max {
        return Err(Error::invalid_options(format!(
            "option '{}' exceeds the maximum of {}",
            field, max
        )));
    }
    Ok(())
}
