//! # hashrs
//!
//! 一个通过 HTTP 提供密码哈希计算的服务。
//!
//! ## 功能特性
//!
//! - **多算法**: bcrypt 与 scrypt，按算法标识符分发
//! - **参数合并**: 调用方参数逐字段覆盖进程级默认值
//! - **安全下限**: bcrypt cost 过低时自动提升到推荐值
//! - **准入控制**: 可配置的参数上限，防止过大的计算开销
//! - **自描述输出**: 哈希字符串自带算法、参数和盐值，可直接用于验证
//!
//! ## 请求处理流程
//!
//! 解码后的请求 → 校验 → 参数合并 → 分发 → 算法驱动 → 统一的响应或错误
//!
//! ## 示例
//!
//! ```rust
//! use hashrs::password::{HashOverrides, verify_password};
//! use hashrs::service::{Dispatcher, HashRequest};
//!
//! let dispatcher = Dispatcher::default();
//!
//! let request = HashRequest::new("bcrypt", "hunter2")
//!     .with_options(HashOverrides::new().with_cost(4));
//! let response = dispatcher.dispatch(&request).unwrap();
//!
//! assert!(response.hash.starts_with("$2b$04$"));
//! assert!(verify_password("hunter2", &response.hash).unwrap());
//! ```
//!
//! ## 错误处理
//!
//! ```rust
//! use hashrs::{Error, ErrorStatus};
//! use hashrs::service::{Dispatcher, HashRequest};
//!
//! let dispatcher = Dispatcher::default();
//! let err = dispatcher.dispatch(&HashRequest::new("md5", "x")).unwrap_err();
//!
//! assert!(matches!(err, Error::BadRequest(_)));
//! assert_eq!(err.status(), ErrorStatus::BadRequest);
//! ```

pub mod config;
pub mod error;
pub mod password;
pub mod random;
pub mod server;
pub mod service;

pub use error::{Error, ErrorStatus, Result};

// ============================================================================
// 常用类型导出
// ============================================================================

pub use config::ServiceConfig;
pub use password::{Algorithm, HashDriver, HashOptions, HashOverrides, resolve_options};
pub use service::{Dispatcher, HashRequest, HashResponse, VerifyRequest, VerifyResponse};
