//! 端到端测试：限流到封禁的完整流程
//!
//! 测试场景：
//! 1. 客户端在窗口内正常请求（每分钟 2 次）
//! 2. 第 3 次请求超限，被限流并登记封禁（1 分钟）
//! 3. 封禁期间的请求直接拒绝，不计入限流
//! 4. 封禁到期后自动解封，恢复正常访问

use crate::common::{create_guard, init_test_tracing, CountingProvider};
use resguard::{AddOrUpdateRequest, Clock, ErrorType, GetRequest};
use std::time::Duration;

#[tokio::test]
async fn test_burst_is_throttled_then_banned() {
    init_test_tracing();
    let counting = CountingProvider::constant(5);
    let (guard, clock) = create_guard(counting.provider.clone());

    let first = guard.get_resource(GetRequest::new("X", "x@example.com", "K")).await;
    let second = guard.get_resource(GetRequest::new("X", "x@example.com", "K")).await;
    let third = guard.get_resource(GetRequest::new("X", "x@example.com", "K")).await;

    assert!(first.success);
    assert_eq!(first.resource_data, Some(5));
    assert!(second.success);
    assert_eq!(third.error(), ErrorType::Throttled);
    assert_eq!(third.resource_data, None);

    let record = guard.ban_record("X").expect("identity should be banned");
    assert_eq!(record.ban_end_time, clock.now() + chrono::Duration::seconds(60));

    let fourth = guard.get_resource(GetRequest::new("X", "x@example.com", "K")).await;
    assert_eq!(fourth.error(), ErrorType::Banned);
    assert_eq!(counting.fetch_count(), 1);
}

#[tokio::test]
async fn test_window_resets_after_quiet_period() {
    init_test_tracing();
    let counting = CountingProvider::constant(5);
    let (guard, clock) = create_guard(counting.provider.clone());

    assert!(guard.get_resource(GetRequest::new("X", "", "K")).await.success);

    clock.advance(Duration::from_secs(120));
    assert!(guard.get_resource(GetRequest::new("X", "", "K")).await.success);

    clock.advance(Duration::from_secs(1));
    assert!(guard.get_resource(GetRequest::new("X", "", "K")).await.success);

    assert_eq!(guard.throttle_entry("X").unwrap().request_count, 2);
    assert!(guard.active_bans().is_empty());
}

#[tokio::test]
async fn test_banned_identity_is_not_counted() {
    init_test_tracing();
    let counting = CountingProvider::constant(5);
    let (guard, clock) = create_guard(counting.provider.clone());

    for _ in 0..3 {
        guard.get_resource(GetRequest::new("X", "", "K")).await;
    }
    let count_at_ban = guard.throttle_entry("X").unwrap().request_count;

    for _ in 0..10 {
        clock.advance(Duration::from_secs(1));
        let response = guard.get_resource(GetRequest::new("X", "", "K")).await;
        assert_eq!(response.error(), ErrorType::Banned);
        let write = guard
            .add_or_update_resource(AddOrUpdateRequest::new("X", "", "K", 1))
            .await;
        assert_eq!(write.error(), ErrorType::Banned);
    }

    assert_eq!(guard.throttle_entry("X").unwrap().request_count, count_at_ban);
    assert_eq!(counting.store_count(), 0);
}

#[tokio::test]
async fn test_access_restored_after_ban_expires() {
    init_test_tracing();
    let counting = CountingProvider::constant(5);
    let (guard, clock) = create_guard(counting.provider.clone());

    for _ in 0..3 {
        guard.get_resource(GetRequest::new("X", "", "K")).await;
    }

    clock.advance(Duration::from_secs(59));
    assert_eq!(
        guard.get_resource(GetRequest::new("X", "", "K")).await.error(),
        ErrorType::Banned
    );

    // 解封时刻本身即不再封禁；距上次计数已超过窗口，计数重新开始
    clock.advance(Duration::from_secs(2));
    let response = guard.get_resource(GetRequest::new("X", "", "K")).await;
    assert!(response.success);
    assert_eq!(guard.throttle_entry("X").unwrap().request_count, 1);
    assert!(guard.ban_record("X").is_none());
}

#[tokio::test]
async fn test_other_identities_unaffected_by_ban() {
    init_test_tracing();
    let counting = CountingProvider::constant(5);
    let (guard, _) = create_guard(counting.provider.clone());

    for _ in 0..3 {
        guard.get_resource(GetRequest::new("X", "", "K")).await;
    }

    let response = guard.get_resource(GetRequest::new("Y", "", "K")).await;
    assert!(response.success);
    assert_eq!(response.resource_data, Some(5));
}
