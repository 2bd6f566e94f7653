//! 密码哈希模块
//!
//! 提供参数合并与各算法的密钥派生驱动。
//!
//! ## 支持的算法
//!
//! - **bcrypt**: 经典的密码哈希算法，只有一个 cost 参数
//! - **scrypt**: 内存硬哈希算法，参数为 N (log2)、r、p，以及盐值和输出长度
//!
//! ## 示例
//!
//! ```rust
//! use hashrs::password::{Algorithm, HashOverrides, HashOptions, driver_for, resolve_options};
//!
//! let defaults = HashOptions::recommended();
//! let overrides = HashOverrides::new().with_n(10);
//! let options = resolve_options(Some(&overrides), &defaults).unwrap();
//!
//! let driver = driver_for(Algorithm::Scrypt);
//! let hash = driver.hash(b"my_password", &options).unwrap();
//! assert!(driver.verify(b"my_password", &hash).unwrap());
//! ```

mod hasher;
mod options;

pub use hasher::{
    Algorithm, BCRYPT_DEFAULT_COST, BCRYPT_MIN_COST, BcryptDriver, HashDriver, ScryptDriver,
    driver_for, hash_password, verify_password,
};
pub use options::{
    DEFAULT_BLOCK_SIZE, DEFAULT_COST, DEFAULT_HASH_SIZE, DEFAULT_LOG_N, DEFAULT_PARALLELISM,
    DEFAULT_SALT_SIZE, HashLimits, HashOptions, HashOverrides, resolve_options,
};
