//! 密码哈希驱动
//!
//! 每个受支持的密钥派生算法对应一个实现了 [`HashDriver`] 的驱动。
//! 驱动接收已合并的 [`HashOptions`]，生成自描述的哈希字符串，
//! 并能根据该字符串验证密码。

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use scrypt::Params as ScryptParams;
use tracing::debug;

use super::options::HashOptions;
use crate::error::{Error, PasswordHashError, Result};
use crate::random::{constant_time_compare, generate_random_bytes};

/// bcrypt 允许的最小 cost
pub const BCRYPT_MIN_COST: u32 = 4;

/// cost 低于最小值时使用的推荐 cost
pub const BCRYPT_DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

const SCRYPT_PREFIX: &str = "$scrypt$";

// `scrypt::scrypt` 的输出长度由输出缓冲区决定，这里只用于构造 Params
const SCRYPT_PARAMS_LEN: usize = 32;

/// 支持的哈希算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// bcrypt - 单一 cost 参数，适合在线交互场景
    Bcrypt,

    /// scrypt - 内存硬函数，抵抗 GPU/ASIC 攻击
    Scrypt,
}

impl Algorithm {
    /// 所有受支持的算法
    pub const ALL: [Algorithm; 2] = [Algorithm::Bcrypt, Algorithm::Scrypt];

    /// 算法标识符（请求中 `type` 字段的取值）
    pub fn id(&self) -> &'static str {
        match self {
            Algorithm::Bcrypt => "bcrypt",
            Algorithm::Scrypt => "scrypt",
        }
    }

    /// 根据标识符查找算法
    ///
    /// 大小写敏感的精确匹配：`"BCRYPT"` 不会被识别。
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.id() == id)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// 密钥派生驱动
///
/// 驱动只读取其算法使用的字段，其余字段被忽略。
/// 实现不得记录或保存明文密码。
pub trait HashDriver: Send + Sync {
    /// 驱动实现的算法
    fn algorithm(&self) -> Algorithm;

    /// 使用随机盐值派生密码哈希，返回自描述的编码字符串
    fn hash(&self, password: &[u8], options: &HashOptions) -> Result<String>;

    /// 验证密码是否与编码后的哈希匹配
    fn verify(&self, password: &[u8], encoded: &str) -> Result<bool>;

    /// 编码字符串是否属于本算法
    fn recognizes(&self, encoded: &str) -> bool;

    /// 读取编码字符串中携带的参数
    ///
    /// 本算法不使用的字段保持推荐值。
    fn parameters(&self, encoded: &str) -> Result<HashOptions>;
}

/// 返回算法的内置驱动
pub fn driver_for(algorithm: Algorithm) -> &'static dyn HashDriver {
    match algorithm {
        Algorithm::Bcrypt => &BcryptDriver,
        Algorithm::Scrypt => &ScryptDriver,
    }
}

// ============================================================================
// bcrypt 实现
// ============================================================================

/// bcrypt 驱动
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptDriver;

impl BcryptDriver {
    /// 实际使用的 cost
    ///
    /// 低于 [`BCRYPT_MIN_COST`] 时提升为 [`BCRYPT_DEFAULT_COST`]，而不是最小值。
    pub fn effective_cost(cost: u32) -> u32 {
        if cost < BCRYPT_MIN_COST {
            BCRYPT_DEFAULT_COST
        } else {
            cost
        }
    }
}

impl HashDriver for BcryptDriver {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bcrypt
    }

    fn hash(&self, password: &[u8], options: &HashOptions) -> Result<String> {
        let cost = Self::effective_cost(options.cost);
        if cost != options.cost {
            debug!(
                requested = options.cost,
                effective = cost,
                "bcrypt cost below minimum, using recommended cost"
            );
        }

        // 超过 bcrypt 缓冲区的密码直接报错，不静默截断
        bcrypt::non_truncating_hash(password, cost).map_err(|e| {
            debug!(error = %e, cost, "bcrypt primitive failed");
            Error::hash_failed("could not compute the bcrypt password hash")
        })
    }

    fn verify(&self, password: &[u8], encoded: &str) -> Result<bool> {
        bcrypt::non_truncating_verify(password, encoded).map_err(|e| {
            debug!(error = %e, "bcrypt verify failed");
            Error::PasswordHash(PasswordHashError::InvalidFormat(
                "bcrypt verify failed".to_string(),
            ))
        })
    }

    fn recognizes(&self, encoded: &str) -> bool {
        encoded.starts_with("$2")
    }

    fn parameters(&self, encoded: &str) -> Result<HashOptions> {
        // $2b$<cost>$...
        let cost = encoded
            .get(4..6)
            .and_then(|cost| cost.parse::<u32>().ok())
            .ok_or_else(|| invalid_format("missing bcrypt cost"))?;
        Ok(HashOptions::recommended().with_cost(cost))
    }
}

// ============================================================================
// scrypt 实现
// ============================================================================

/// scrypt 驱动
///
/// 输出为 PHC 字符串格式：`$scrypt$ln=<n>,r=<r>,p=<p>$<salt>$<hash>`，
/// 盐值与摘要使用不带填充的标准 Base64 编码。
#[derive(Debug, Clone, Copy, Default)]
pub struct ScryptDriver;

impl HashDriver for ScryptDriver {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Scrypt
    }

    fn hash(&self, password: &[u8], options: &HashOptions) -> Result<String> {
        let params = scrypt_params(options.n, options.r, options.p)?;
        let salt = generate_random_bytes(options.salt_size)?;

        let mut output = vec![0u8; options.hash_size];
        scrypt::scrypt(password, &salt, &params, &mut output).map_err(|e| {
            debug!(error = %e, hash_size = options.hash_size, "scrypt primitive failed");
            Error::hash_failed("could not compute the scrypt password hash")
        })?;

        let encoded = ScryptHash {
            log_n: options.n,
            r: options.r,
            p: options.p,
            salt,
            digest: output,
        };
        Ok(encoded.to_string())
    }

    fn verify(&self, password: &[u8], encoded: &str) -> Result<bool> {
        let parsed = ScryptHash::parse(encoded)?;
        let params = scrypt_params(parsed.log_n, parsed.r, parsed.p)?;

        let mut output = vec![0u8; parsed.digest.len()];
        scrypt::scrypt(password, &parsed.salt, &params, &mut output).map_err(|e| {
            debug!(error = %e, "scrypt primitive failed during verification");
            Error::hash_failed("could not compute the scrypt password hash")
        })?;

        Ok(constant_time_compare(&output, &parsed.digest))
    }

    fn recognizes(&self, encoded: &str) -> bool {
        encoded.starts_with(SCRYPT_PREFIX)
    }

    fn parameters(&self, encoded: &str) -> Result<HashOptions> {
        let parsed = ScryptHash::parse(encoded)?;
        Ok(HashOptions::recommended()
            .with_scrypt(parsed.log_n, parsed.r, parsed.p)
            .with_salt_size(parsed.salt.len())
            .with_hash_size(parsed.digest.len()))
    }
}

fn scrypt_params(log_n: u8, r: u32, p: u32) -> Result<ScryptParams> {
    ScryptParams::new(log_n, r, p, SCRYPT_PARAMS_LEN).map_err(|e| {
        debug!(error = %e, log_n, r, p, "invalid scrypt parameters");
        Error::hash_failed("invalid scrypt parameters")
    })
}

/// 解析后的 scrypt PHC 字符串
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScryptHash {
    log_n: u8,
    r: u32,
    p: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

impl ScryptHash {
    fn parse(encoded: &str) -> Result<Self> {
        let rest = encoded
            .strip_prefix(SCRYPT_PREFIX)
            .ok_or_else(|| invalid_format("missing scrypt prefix"))?;

        let mut parts = rest.split('$');
        let (Some(params), Some(salt), Some(digest), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid_format("expected parameters, salt and hash"));
        };

        let (mut log_n, mut r, mut p): (Option<u8>, Option<u32>, Option<u32>) = (None, None, None);
        for pair in params.split(',') {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid_format("malformed scrypt parameter"))?;
            match key {
                "ln" => log_n = Some(parse_param(value)?),
                "r" => r = Some(parse_param(value)?),
                "p" => p = Some(parse_param(value)?),
                _ => return Err(invalid_format("unknown scrypt parameter")),
            }
        }

        let (Some(log_n), Some(r), Some(p)) = (log_n, r, p) else {
            return Err(invalid_format("missing scrypt parameter"));
        };

        let (salt, digest) = (decode_b64(salt)?, decode_b64(digest)?);
        if salt.is_empty() || digest.is_empty() {
            return Err(invalid_format("empty scrypt salt or hash"));
        }

        Ok(Self {
            log_n,
            r,
            p,
            salt,
            digest,
        })
    }
}

impl fmt::Display for ScryptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}ln={},r={},p={}${}${}",
            SCRYPT_PREFIX,
            self.log_n,
            self.r,
            self.p,
            STANDARD_NO_PAD.encode(&self.salt),
            STANDARD_NO_PAD.encode(&self.digest)
        )
    }
}

fn parse_param<T: std::str::FromStr>(value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| invalid_format("invalid scrypt parameter value"))
}

fn decode_b64(value: &str) -> Result<Vec<u8>> {
    STANDARD_NO_PAD
        .decode(value)
        .map_err(|_| invalid_format("invalid base64 in scrypt hash"))
}

fn invalid_format(msg: &str) -> Error {
    Error::PasswordHash(PasswordHashError::InvalidFormat(msg.to_string()))
}

// ============================================================================
// 便捷函数
// ============================================================================

/// 使用指定算法和参数哈希密码
///
/// # Example
///
/// ```rust
/// use hashrs::password::{Algorithm, HashOptions, hash_password};
///
/// let options = HashOptions::recommended().with_cost(4);
/// let hash = hash_password("my_password", Algorithm::Bcrypt, &options).unwrap();
/// assert!(hash.starts_with("$2b$04$"));
/// ```
pub fn hash_password(password: &str, algorithm: Algorithm, options: &HashOptions) -> Result<String> {
    driver_for(algorithm).hash(password.as_bytes(), options)
}

/// 验证密码是否匹配哈希
///
/// 根据哈希前缀自动检测算法（bcrypt 或 scrypt）。
///
/// # Returns
///
/// 如果密码正确返回 `Ok(true)`，密码错误返回 `Ok(false)`
///
/// # Example
///
/// ```rust
/// use hashrs::password::{Algorithm, HashOptions, hash_password, verify_password};
///
/// let options = HashOptions::recommended().with_scrypt(10, 8, 1);
/// let hash = hash_password("my_password", Algorithm::Scrypt, &options).unwrap();
///
/// assert!(verify_password("my_password", &hash).unwrap());
/// assert!(!verify_password("wrong_password", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let driver = Algorithm::ALL
        .into_iter()
        .map(driver_for)
        .find(|driver| driver.recognizes(hash))
        .ok_or_else(|| invalid_format("unknown hash format"))?;

    driver.verify(password.as_bytes(), hash)
}
