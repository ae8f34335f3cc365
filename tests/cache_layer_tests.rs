//! End-to-end tests for the cache layer
//!
//! Exercises the public API the way application services use it: typed
//! values, canonical keys, dependency cascades and the caching wrappers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use itsm_cache::{
    domain, with_cache, CacheConfig, CacheInvalidate, CacheKeys, CacheLayer, CacheManager,
    Cacheable, StoreMode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Project {
    id: u32,
    name: String,
    members: Vec<String>,
}

fn sample_project() -> Project {
    Project {
        id: 42,
        name: "Service desk rollout".to_string(),
        members: vec!["alice".to_string(), "bob".to_string()],
    }
}

// == Typed storage ==

#[tokio::test]
async fn test_typed_roundtrip_through_layer() {
    let layer = CacheLayer::in_memory(3600);
    let manager = layer.manager();

    manager.set(&CacheKeys::project("42"), &sample_project(), None).await;
    let read: Option<Project> = manager.get(&CacheKeys::project("42")).await;
    assert_eq!(read, Some(sample_project()));

    let never: Option<Project> = manager.get(&CacheKeys::project("7")).await;
    assert!(never.is_none());
}

#[tokio::test]
async fn test_wrong_type_reads_as_miss() {
    let layer = CacheLayer::in_memory(3600);
    layer.manager().set("project:42", &"plain string", None).await;

    let read: Option<Project> = layer.manager().get("project:42").await;
    assert!(read.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_ttl() {
    let layer = CacheLayer::in_memory(3600);
    let manager = layer.manager();

    manager.set("dashboard:u1:overview", &vec![1, 2, 3], Some(5)).await;
    assert!(manager.exists("dashboard:u1:overview").await);

    tokio::time::advance(Duration::from_secs(6)).await;

    let read: Option<Vec<i32>> = manager.get("dashboard:u1:overview").await;
    assert!(read.is_none());
    assert_eq!(manager.get_ttl("dashboard:u1:overview").await, -2);
}

#[tokio::test(start_paused = true)]
async fn test_set_ttl_extends_expiry() {
    let layer = CacheLayer::in_memory(3600);
    let manager = layer.manager();

    manager.set("kb:a5", &"article", Some(5)).await;
    assert!(manager.set_ttl("kb:a5", 60).await);

    tokio::time::advance(Duration::from_secs(10)).await;
    assert!(manager.exists("kb:a5").await);
    assert!(!manager.set_ttl("kb:missing", 60).await);
}

#[tokio::test]
async fn test_counters() {
    let layer = CacheLayer::in_memory(3600);
    let manager = layer.manager();

    let key = CacheKeys::analytics("logins", "2024-05-01");
    assert_eq!(manager.increment(&key).await, 1);
    assert_eq!(manager.increment(&key).await, 2);
    assert_eq!(manager.increment_by(&key, 10).await, 12);
}

// == Invalidation ==

#[tokio::test]
async fn test_project_update_cascades_to_task_lists() {
    let layer = CacheLayer::in_memory(3600);
    let manager = layer.manager();
    let invalidation = layer.invalidation();

    let project = CacheKeys::project("42");
    let all_tasks = CacheKeys::tasks("42", None);
    let members = CacheKeys::project_members("42");
    let other_tasks = CacheKeys::tasks("7", None);

    manager.set(&project, &sample_project(), None).await;
    manager.set(&all_tasks, &vec!["t1", "t2"], None).await;
    manager.set(&members, &vec!["alice"], None).await;
    manager.set(&other_tasks, &vec!["t9"], None).await;

    invalidation.register_dependency(&project, &all_tasks);
    invalidation.register_dependency(&all_tasks, &members);

    assert_eq!(invalidation.invalidate(&project).await, 3);

    assert!(!manager.exists(&project).await);
    assert!(!manager.exists(&all_tasks).await);
    assert!(!manager.exists(&members).await);
    assert!(manager.exists(&other_tasks).await);
}

#[tokio::test]
async fn test_entity_invalidation_spares_other_entities() {
    let layer = CacheLayer::in_memory(3600);
    let manager = layer.manager();

    for key in [
        CacheKeys::form_template("f1"),
        CacheKeys::form_submissions("f1", Some("pending")),
        CacheKeys::form_submission("f1", "s1"),
        CacheKeys::form_template("f2"),
    ] {
        manager.set(&key, &"x", None).await;
    }

    let deleted = layer.invalidation().invalidate_entity(domain::FORM, "f1").await;
    assert_eq!(deleted, 3);
    assert!(manager.exists(&CacheKeys::form_template("f2")).await);
}

#[tokio::test]
async fn test_domain_invalidation() {
    let layer = CacheLayer::in_memory(3600);
    let manager = layer.manager();
    manager.set(&CacheKeys::incident("i1"), &1, None).await;
    manager.set(&CacheKeys::incidents(Some("open")), &2, None).await;
    manager.set(&CacheKeys::change_request("c1"), &3, None).await;

    assert_eq!(layer.invalidation().invalidate_domain(domain::INCIDENT).await, 2);
    assert!(manager.exists(&CacheKeys::change_request("c1")).await);
}

// == Wrappers ==

#[tokio::test]
async fn test_read_through_then_invalidate_on_write() {
    let layer = CacheLayer::in_memory(3600);
    let loads = Arc::new(AtomicUsize::new(0));

    let counter = loads.clone();
    let load_project = Cacheable::new(
        layer.manager().clone(),
        |id: &u32| CacheKeys::project(&id.to_string()),
        move |id: u32| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(Project {
                    id,
                    ..sample_project()
                })
            }
        },
    );

    let rename_project = CacheInvalidate::new(
        layer.invalidation().clone(),
        [CacheKeys::project("42"), CacheKeys::entity_pattern(domain::PROJECT, "42")],
        |name: String| async move { Ok::<_, String>(name) },
    );

    load_project.call(42).await.unwrap();
    load_project.call(42).await.unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    rename_project.call("Renamed".to_string()).await.unwrap();

    load_project.call(42).await.unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_with_cache_shares_entries_with_manager() {
    let layer = CacheLayer::in_memory(3600);
    let key = CacheKeys::report("sla", "2024-q1");

    let report: Result<Vec<u32>, String> =
        with_cache(layer.manager(), &key, Some(600), || async { Ok(vec![99, 97]) }).await;
    assert_eq!(report, Ok(vec![99, 97]));

    let cached: Option<Vec<u32>> = layer.manager().get(&key).await;
    assert_eq!(cached, Some(vec![99, 97]));
}

// == Degraded mode ==

#[tokio::test]
async fn test_degraded_layer_is_safe_everywhere() {
    let layer = CacheLayer::connect(&CacheConfig::default()).await;
    let manager = layer.manager();
    assert_eq!(manager.mode(), StoreMode::Degraded);
    assert_eq!(manager.backend_name(), "none");

    manager.set("k", &1, None).await;
    assert_eq!(manager.get::<i32>("k").await, None);
    manager.delete("k").await;
    assert_eq!(manager.delete_pattern("*").await, 0);
    manager.clear().await;
    assert!(!manager.exists("k").await);
    assert_eq!(manager.get_ttl("k").await, -1);
    assert!(!manager.set_ttl("k", 10).await);
    assert_eq!(manager.increment("k").await, 0);
    assert!(manager.get_stats().await.is_empty());
    manager.close().await;

    layer.invalidation().register_dependency("a", "b");
    assert_eq!(layer.invalidation().invalidate("a").await, 2);
}

#[tokio::test]
async fn test_unreachable_redis_degrades() {
    let config = CacheConfig {
        operation_timeout_ms: 300,
        ..CacheConfig::redis("redis://127.0.0.1:1")
    };
    let layer = CacheLayer::connect(&config).await;

    assert_eq!(layer.manager().mode(), StoreMode::Degraded);
    assert_eq!(layer.manager().get::<String>("anything").await, None);
}

#[tokio::test]
async fn test_closed_manager_degrades() {
    let manager = Arc::new(CacheManager::connect(&CacheConfig::memory()).await);
    let layer = CacheLayer::from_manager(manager);
    layer.manager().set("k", &1, None).await;

    layer.manager().close().await;
    layer.manager().close().await;

    assert_eq!(layer.manager().mode(), StoreMode::Degraded);
    assert_eq!(layer.manager().get::<i32>("k").await, None);
}
