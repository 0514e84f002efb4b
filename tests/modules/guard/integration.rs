//! ResourceGuard 集成测试

use crate::common::{
    create_guard, init_test_tracing, memory_provider, read_only_provider, CountingProvider,
};
use resguard::{
    AddOrUpdateRequest, ErrorType, FnProvider, GetRequest, ProviderError, ResourceProvider,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_email_is_not_part_of_identity() {
    init_test_tracing();
    let counting = CountingProvider::constant(1);
    let (guard, _) = create_guard(counting.provider.clone());

    guard.get_resource(GetRequest::new("1.1.1.1", "a@example.com", "id1")).await;
    guard.get_resource(GetRequest::new("1.1.1.1", "b@example.com", "id1")).await;
    let third = guard.get_resource(GetRequest::new("1.1.1.1", "c@example.com", "id1")).await;

    assert_eq!(third.error(), ErrorType::Throttled);
}

#[tokio::test]
async fn test_provider_error_maps_to_resource_not_found() {
    init_test_tracing();
    let provider: Arc<dyn ResourceProvider<i32>> = Arc::new(FnProvider::new(
        |_: &str| Err(ProviderError::Unavailable("backend down".to_string())),
        |_: &str, _: i32| Ok(()),
    ));
    let (guard, _) = create_guard(provider);

    let response = guard.get_resource(GetRequest::new("1.1.1.1", "", "id1")).await;
    assert!(!response.success);
    assert_eq!(response.error(), ErrorType::ResourceNotFound);
    assert_eq!(guard.stats().resource_not_found, 1);
}

#[tokio::test]
async fn test_provider_panic_is_contained() {
    init_test_tracing();
    let provider: Arc<dyn ResourceProvider<i32>> = Arc::new(FnProvider::new(
        |_: &str| panic!("fetch exploded"),
        |_: &str, _: i32| panic!("store exploded"),
    ));
    let (guard, _) = create_guard(provider);

    let read = guard.get_resource(GetRequest::new("1.1.1.1", "", "id1")).await;
    assert_eq!(read.error(), ErrorType::ResourceNotFound);

    let write = guard
        .add_or_update_resource(AddOrUpdateRequest::new("2.2.2.2", "", "id1", 5))
        .await;
    assert_eq!(write.error(), ErrorType::UpdateFailed);
    assert_eq!(guard.cache_len(), 0);
}

#[tokio::test]
async fn test_update_failure_reported() {
    init_test_tracing();
    let (guard, _) = create_guard(read_only_provider(3));

    let response = guard
        .add_or_update_resource(AddOrUpdateRequest::new("1.1.1.1", "", "id1", 4))
        .await;
    assert!(!response.success);
    assert_eq!(response.error(), ErrorType::UpdateFailed);
    assert_eq!(guard.cached("id1"), None);
}

#[tokio::test]
async fn test_write_then_read_from_cache() {
    init_test_tracing();
    let provider = memory_provider(&[]);
    let (guard, _) = create_guard(provider.clone());

    let write = guard
        .add_or_update_resource(AddOrUpdateRequest::new("1.1.1.1", "", "doc", 77))
        .await;
    assert!(write.success);
    assert_eq!(write.error_type, None);

    let read = guard.get_resource(GetRequest::new("2.2.2.2", "", "doc")).await;
    assert_eq!(read.resource_data, Some(77));
    assert_eq!(provider.fetch_count(), 0);
    assert_eq!(provider.store_count(), 1);
}

#[tokio::test]
async fn test_rejected_write_never_reaches_provider() {
    init_test_tracing();
    let counting = CountingProvider::constant(0);
    let (guard, _) = create_guard(counting.provider.clone());

    guard.ban("1.1.1.1");
    let response = guard
        .add_or_update_resource(AddOrUpdateRequest::new("1.1.1.1", "", "id1", 1))
        .await;

    assert_eq!(response.error(), ErrorType::Banned);
    assert_eq!(counting.store_count(), 0);
}

#[tokio::test]
async fn test_ban_for_custom_duration() {
    init_test_tracing();
    let counting = CountingProvider::constant(0);
    let (guard, clock) = create_guard(counting.provider.clone());

    guard.ban_for("1.1.1.1", Duration::from_secs(5));
    clock.advance(Duration::from_secs(4));
    assert_eq!(
        guard.get_resource(GetRequest::new("1.1.1.1", "", "id1")).await.error(),
        ErrorType::Banned
    );

    clock.advance(Duration::from_secs(1));
    assert!(guard.get_resource(GetRequest::new("1.1.1.1", "", "id1")).await.success);
}

#[tokio::test]
async fn test_unban_clears_throttle_counter() {
    init_test_tracing();
    let counting = CountingProvider::constant(0);
    let (guard, _) = create_guard(counting.provider.clone());

    for _ in 0..3 {
        guard.get_resource(GetRequest::new("1.1.1.1", "", "id1")).await;
    }
    assert!(guard.unban("1.1.1.1"));
    assert!(guard.throttle_entry("1.1.1.1").is_none());
    assert!(guard.get_resource(GetRequest::new("1.1.1.1", "", "id1")).await.success);
    assert!(!guard.unban("9.9.9.9"));
}
