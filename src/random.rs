//! 安全随机数模块
//!
//! 提供密码学安全的随机字节生成（用于盐值）以及常量时间比较。

use rand::{TryRngCore, rngs::OsRng};

use crate::error::{CryptoError, Error, Result};

/// 生成指定长度的随机字节数组
///
/// 使用操作系统提供的密码学安全随机数生成器 (CSPRNG)
///
/// # Arguments
///
/// * `length` - 要生成的字节数
///
/// # Example
///
/// ```rust
/// use hashrs::random::generate_random_bytes;
///
/// let salt = generate_random_bytes(32).unwrap();
/// assert_eq!(salt.len(), 32);
/// ```
pub fn generate_random_bytes(length: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Crypto(CryptoError::RngFailed(format!("{:?}", e))))?;
    Ok(bytes)
}

/// 常量时间比较两个字节切片
///
/// 用于比较派生出的摘要，防止时序攻击。长度不同直接返回 `false`。
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_bytes() {
        let bytes = generate_random_bytes(32).unwrap();
        assert_eq!(bytes.len(), 32);

        // 两次生成不应相同
        let bytes2 = generate_random_bytes(32).unwrap();
        assert_ne!(bytes, bytes2);
    }

    #[test]
    fn test_generate_zero_bytes() {
        assert!(generate_random_bytes(0).unwrap().is_empty());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"digest", b"digest"));
        assert!(!constant_time_compare(b"digest", b"digesT"));
        assert!(!constant_time_compare(b"digest", b"digest-longer"));
    }
}
