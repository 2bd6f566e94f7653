//! 分发流程集成测试
//!
//! 从解码后的请求出发，覆盖校验、参数合并、算法分发和结果归一化。

use hashrs::error::PasswordHashError;
use hashrs::password::{
    BCRYPT_DEFAULT_COST, HashLimits, HashOptions, HashOverrides, resolve_options, verify_password,
};
use hashrs::service::{Dispatcher, HashRequest, VerifyRequest};
use hashrs::{Error, ErrorStatus};

/// 低开销的默认参数，加快测试
fn fast_dispatcher() -> Dispatcher {
    Dispatcher::new(HashOptions::recommended().with_cost(4).with_scrypt(10, 8, 1))
}

/// 无参数的 bcrypt 请求使用默认 cost 14
#[test]
fn test_bcrypt_without_options_uses_default_cost() {
    let dispatcher = Dispatcher::default();
    let request = HashRequest::new("bcrypt", "hunter2");

    let response = dispatcher.dispatch(&request).expect("bcrypt hash should succeed");
    assert!(!response.hash.is_empty());
    assert!(response.hash.starts_with("$2b$14$"));
    assert!(verify_password("hunter2", &response.hash).unwrap());
}

/// 空算法标识符返回 BadRequest
#[test]
fn test_empty_algorithm_is_bad_request() {
    let err = fast_dispatcher()
        .dispatch(&HashRequest::new("", "x"))
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
    assert_eq!(err.status(), ErrorStatus::BadRequest);
}

/// 缺少字段时，无论参数如何都返回 BadRequest
#[test]
fn test_missing_fields_regardless_of_options() {
    let dispatcher = fast_dispatcher();
    let option_sets = [
        None,
        Some(HashOverrides::new()),
        Some(HashOverrides::new().with_cost(5)),
        Some(HashOverrides::new().with_n(300)),
    ];

    for options in option_sets {
        for (algorithm, password) in [("", "x"), ("bcrypt", ""), ("", "")] {
            let request = HashRequest {
                algorithm: algorithm.to_string(),
                password: password.to_string(),
                options,
            };
            let err = dispatcher.dispatch(&request).unwrap_err();
            assert!(
                matches!(err, Error::BadRequest(_)),
                "expected BadRequest for {:?}",
                request
            );
        }
    }
}

/// 未知算法返回 "invalid algorithm"
#[test]
fn test_unknown_algorithm() {
    let dispatcher = fast_dispatcher();
    for algorithm in ["argon2", "md5", "Bcrypt", "SCRYPT"] {
        let err = dispatcher
            .dispatch(&HashRequest::new(algorithm, "x"))
            .unwrap_err();
        assert_eq!(err.status(), ErrorStatus::BadRequest);
        assert_eq!(err.message(), "invalid algorithm");
    }
}

/// scrypt 只覆盖 salt_size 时，其余字段保持默认
#[test]
fn test_scrypt_salt_size_override_resolution() {
    let defaults = HashOptions::recommended();
    let overrides = HashOverrides::new().with_salt_size(16);

    let resolved = resolve_options(Some(&overrides), &defaults).unwrap();
    assert_eq!(resolved.salt_size, 16);
    assert_eq!(resolved.n, 14);
    assert_eq!(resolved.r, 8);
    assert_eq!(resolved.p, 1);
    assert_eq!(resolved.hash_size, 32);
    assert_eq!(resolved.cost, 14);
}

/// 同一请求经由分发器也得到 16 字节盐值
#[test]
fn test_scrypt_salt_size_override_end_to_end() {
    let request =
        HashRequest::new("scrypt", "x").with_options(HashOverrides::new().with_salt_size(16));
    let response = fast_dispatcher().dispatch(&request).unwrap();

    // $scrypt$ln=10,r=8,p=1$<salt>$<hash>
    let parts: Vec<&str> = response.hash.split('$').collect();
    assert_eq!(parts[1], "scrypt");
    assert_eq!(parts[2], "ln=10,r=8,p=1");
    // 16 字节 → 22 个无填充 Base64 字符；32 字节 → 43 个
    assert_eq!(parts[3].len(), 22);
    assert_eq!(parts[4].len(), 43);
}

/// 只覆盖 cost 时，其余字段等于默认值
#[test]
fn test_cost_only_override_is_field_wise() {
    let defaults = HashOptions::recommended();
    let overrides = HashOverrides::new().with_cost(9);

    let resolved = resolve_options(Some(&overrides), &defaults).unwrap();
    assert_eq!(resolved, defaults.with_cost(9));
}

/// 低于最小值的 cost 被提升到推荐值，而不是最小值或调用方的值
#[test]
fn test_bcrypt_cost_below_minimum() {
    let request = HashRequest::new("bcrypt", "pw").with_options(HashOverrides::new().with_cost(3));
    let response = fast_dispatcher().dispatch(&request).unwrap();

    let expected = format!("$2b${:02}$", BCRYPT_DEFAULT_COST);
    assert!(response.hash.starts_with(&expected));
    assert!(verify_password("pw", &response.hash).unwrap());
}

/// 相同输入的两次 scrypt 计算得到不同的哈希，但都能验证通过
#[test]
fn test_scrypt_fresh_salt_per_request() {
    let dispatcher = fast_dispatcher();
    let request = HashRequest::new("scrypt", "correct horse");

    let first = dispatcher.dispatch(&request).unwrap().hash;
    let second = dispatcher.dispatch(&request).unwrap().hash;

    assert_ne!(first, second);
    assert!(verify_password("correct horse", &first).unwrap());
    assert!(verify_password("correct horse", &second).unwrap());
}

/// 所有算法的往返验证
#[test]
fn test_round_trip_for_every_algorithm() {
    let dispatcher = fast_dispatcher();

    for algorithm in dispatcher.algorithms() {
        let request = HashRequest::new(algorithm, "s3cret!");
        let hash = dispatcher.dispatch(&request).unwrap().hash;

        let ok = dispatcher
            .verify(&VerifyRequest::new("s3cret!", hash.clone()))
            .unwrap();
        assert!(ok.valid, "{} should verify", algorithm);

        let wrong = dispatcher
            .verify(&VerifyRequest::new("wrong_password", hash))
            .unwrap();
        assert!(!wrong.valid, "{} should reject wrong password", algorithm);
    }
}

/// 超出上限的参数被拒绝
#[test]
fn test_admission_limits() {
    let dispatcher = fast_dispatcher();

    let request = HashRequest::new("bcrypt", "x").with_options(HashOverrides::new().with_cost(28));
    let err = dispatcher.dispatch(&request).unwrap_err();
    assert!(matches!(err, Error::InvalidOptions(_)));
    assert_eq!(err.status(), ErrorStatus::BadRequest);

    let request =
        HashRequest::new("scrypt", "x").with_options(HashOverrides::new().with_n(22).with_r(16));
    assert!(matches!(
        dispatcher.dispatch(&request),
        Err(Error::InvalidOptions(_))
    ));
}

/// 关闭上限后，由底层原语报告错误
#[test]
fn test_primitive_failure_is_internal_error() {
    let dispatcher = Dispatcher::builder()
        .with_defaults(HashOptions::recommended().with_cost(4))
        .with_limits(HashLimits::unbounded())
        .build();

    let request = HashRequest::new("bcrypt", "x").with_options(HashOverrides::new().with_cost(40));
    let err = dispatcher.dispatch(&request).unwrap_err();
    assert!(matches!(
        err,
        Error::PasswordHash(PasswordHashError::HashFailed(_))
    ));
    assert_eq!(err.status(), ErrorStatus::InternalError);
}

/// 无法放入目标类型的参数返回 InvalidOptions
#[test]
fn test_unrepresentable_option() {
    let request = HashRequest::new("scrypt", "x").with_options(HashOverrides::new().with_n(1000));
    let err = fast_dispatcher().dispatch(&request).unwrap_err();
    assert!(matches!(err, Error::InvalidOptions(_)));
}

/// 错误信息不包含明文密码
#[test]
fn test_errors_do_not_leak_password() {
    let password = "super-secret-password-value-that-is-way-too-long-for-bcrypt-to-handle-safely";
    let dispatcher = fast_dispatcher();

    let err = dispatcher
        .dispatch(&HashRequest::new("bcrypt", password))
        .unwrap_err();
    assert_eq!(err.status(), ErrorStatus::InternalError);
    assert!(!err.to_string().contains(password));
    assert!(!err.message().contains(password));

    let err = dispatcher
        .dispatch(&HashRequest::new("nope", password))
        .unwrap_err();
    assert!(!err.to_string().contains(password));
}

/// 分发器可在线程间共享
#[test]
fn test_concurrent_requests() {
    let dispatcher = std::sync::Arc::new(fast_dispatcher());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            std::thread::spawn(move || {
                let password = format!("password-{}", i);
                let hash = dispatcher
                    .dispatch(&HashRequest::new("scrypt", password.clone()))
                    .unwrap()
                    .hash;
                verify_password(&password, &hash).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
