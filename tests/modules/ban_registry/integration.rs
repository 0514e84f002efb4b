//! BanRegistry 集成测试

use chrono::{DateTime, Utc};
use resguard::BanRegistry;
use std::sync::Arc;
use std::time::Duration;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
}

#[test]
fn test_ban_boundary_is_exclusive() {
    let registry = BanRegistry::new();
    registry.ban("10.0.0.1", at(100), Duration::from_secs(60));

    assert!(registry.is_banned("10.0.0.1", at(159)));
    assert!(!registry.is_banned("10.0.0.1", at(160)));
    assert!(registry.is_empty());
}

#[test]
fn test_reban_overwrites_end_time() {
    let registry = BanRegistry::new();
    registry.ban("10.0.0.1", at(0), Duration::from_secs(60));
    let record = registry.ban("10.0.0.1", at(30), Duration::from_secs(60));

    assert_eq!(record.ban_end_time, at(90));
    assert_eq!(registry.len(), 1);
    assert!(registry.is_banned("10.0.0.1", at(80)));
}

#[test]
fn test_remaining_saturates_at_zero() {
    let registry = BanRegistry::new();
    let record = registry.ban("10.0.0.1", at(0), Duration::from_secs(60));

    assert_eq!(record.remaining(at(20)), Duration::from_secs(40));
    assert_eq!(record.remaining(at(600)), Duration::ZERO);
}

#[test]
fn test_active_bans_and_cleanup() {
    let registry = BanRegistry::new();
    registry.ban("a", at(0), Duration::from_secs(10));
    registry.ban("b", at(0), Duration::from_secs(100));
    registry.ban("c", at(0), Duration::from_secs(1000));

    let active: Vec<String> = {
        let mut ids: Vec<String> = registry
            .active_bans(at(50))
            .into_iter()
            .map(|record| record.identity)
            .collect();
        ids.sort();
        ids
    };
    assert_eq!(active, vec!["b".to_string(), "c".to_string()]);

    assert_eq!(registry.cleanup_expired(at(500)), 2);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_huge_duration_does_not_overflow() {
    let registry = BanRegistry::new();
    let record = registry.ban("a", at(0), Duration::from_secs(u64::MAX));
    assert_eq!(record.ban_end_time, DateTime::<Utc>::MAX_UTC);
    assert!(registry.is_banned("a", at(4_000_000_000)));
}

#[tokio::test]
async fn test_concurrent_bans_on_distinct_identities() {
    let registry = Arc::new(BanRegistry::new());
    let mut handles = vec![];

    for i in 0..16 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            for j in 0..50 {
                registry.ban(&format!("{}-{}", i, j), at(0), Duration::from_secs(60));
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(registry.len(), 800);
    assert_eq!(registry.active_bans(at(59)).len(), 800);
}
