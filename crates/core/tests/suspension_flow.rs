//! Suspension flow integration tests.
//!
//! These tests drive the service end to end: creation through the public
//! input type, storage in the memory repository, and enforcement through the
//! default matchers and strategies.

#![allow(clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use maplit::hashmap;
use sanction_common::RegexLimits;
use sanction_core::{
    Clock, ConditionalStrategy, CreateSuspensionInput, EntityReference, FixedClock, GeoLocation,
    HeaderDeviceResolver, HeaderIpResolver, MatcherRegistry, MemorySuspensionRepository, Metadata,
    RecordingEventPublisher, RequestContext, StaticGeoResolver, SuspensionEvent,
    SuspensionRepository, SuspensionService, SuspensionStatus, StrategyRegistry,
};
use serde_json::{Value, json};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sanction=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Wednesday 2024-06-12 12:00 UTC.
fn noon() -> DateTime<Utc> {
    DateTime::from_timestamp(1_718_193_600, 0).unwrap()
}

fn service_at(repository: Arc<MemorySuspensionRepository>, now: DateTime<Utc>) -> SuspensionService {
    init_tracing();

    let clock: Arc<dyn Clock> = Arc::new(FixedClock(now));
    let geo = StaticGeoResolver::new()
        .with_location("203.0.113.7", GeoLocation::country("KP"))
        .with_location("198.51.100.4", GeoLocation::country("NZ"));

    let mut strategies = StrategyRegistry::with_defaults(
        Arc::new(HeaderIpResolver::default()),
        Arc::new(geo),
        Arc::new(HeaderDeviceResolver::default()),
        Tz::UTC,
        clock.clone(),
    );
    strategies.register(Arc::new(ConditionalStrategy::new(
        "write_paths",
        |ctx: &RequestContext, metadata: &Metadata| {
            let listed = metadata
                .get("paths")
                .and_then(Value::as_array)
                .is_some_and(|paths| paths.iter().any(|p| p.as_str() == Some(ctx.path())));
            Value::Bool(ctx.method() != "GET" && listed)
        },
    )));

    SuspensionService::new(
        repository,
        Arc::new(MatcherRegistry::with_defaults(RegexLimits::default())),
        Arc::new(strategies),
    )
    .with_clock(clock)
}

fn metadata(value: Value) -> Metadata {
    value.as_object().cloned().unwrap()
}

fn forwarded(ip: &str) -> RequestContext {
    RequestContext::new("GET", "/")
        .with_header("X-Forwarded-For", ip)
        .with_remote_addr(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[tokio::test]
async fn test_signup_screening() {
    let repository = Arc::new(MemorySuspensionRepository::new());
    let service = service_at(repository.clone(), noon());

    let bans = [
        ("email", "*@spam.example"),
        ("domain", "*.spam.example"),
        ("ip", "203.0.113.0/24"),
        ("phone", "+99*"),
        ("glob", "bot-*"),
        ("regex", "/^admin\\d+$/i"),
    ];
    for (match_type, match_value) in bans {
        service
            .suspend(CreateSuspensionInput {
                match_type: Some(match_type.to_string()),
                match_value: Some(match_value.to_string()),
                reason: Some("signup abuse".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    assert_eq!(repository.len().await, bans.len());

    let ctx = RequestContext::new("POST", "/signup");

    let blocked = hashmap! {
        "email" => "Mallory@SPAM.example",
        "domain" => "https://mx.spam.example:443/path",
        "ip" => "203.0.113.250",
        "phone" => "+99 555 0100",
        "glob" => "BOT-42",
        "regex" => "ADMIN7",
    };
    for (match_type, candidate) in &blocked {
        let hit = service.check_value(match_type, candidate, &ctx).await.unwrap();
        assert!(hit.is_some(), "{match_type} should block {candidate}");
    }

    let allowed = hashmap! {
        "email" => "alice@example.com",
        "domain" => "spam.example.org",
        "ip" => "203.0.114.1",
        "phone" => "+1 555 0100",
        "glob" => "robot-42",
        "regex" => "admin",
    };
    for (match_type, candidate) in &allowed {
        let hit = service.check_value(match_type, candidate, &ctx).await.unwrap();
        assert!(hit.is_none(), "{match_type} should allow {candidate}");
    }
}

#[tokio::test]
async fn test_business_hours_ban() {
    let repository = Arc::new(MemorySuspensionRepository::new());
    let service = service_at(repository.clone(), noon());
    let subject = EntityReference::new("user", "42");

    service
        .suspend(CreateSuspensionInput {
            subject: Some(subject.clone()),
            strategy_type: Some("time_window".to_string()),
            strategy_metadata: Some(metadata(json!({
                "start": "09:00",
                "end": "17:00",
                "days": [1, 2, 3, 4, 5],
            }))),
            ..Default::default()
        })
        .await
        .unwrap();

    let ctx = RequestContext::default();
    assert!(service.is_subject_suspended(&subject, &ctx).await.unwrap());

    let evening = service_at(repository.clone(), noon() + Duration::hours(8));
    assert!(!evening.is_subject_suspended(&subject, &ctx).await.unwrap());

    let saturday = service_at(repository, noon() + Duration::days(3));
    assert!(!saturday.is_subject_suspended(&subject, &ctx).await.unwrap());
}

#[tokio::test]
async fn test_scheduled_ban_lifecycle() {
    let repository = Arc::new(MemorySuspensionRepository::new());
    let service = service_at(repository.clone(), noon());
    let subject = EntityReference::new("user", "7");

    let created = service
        .suspend(CreateSuspensionInput {
            subject: Some(subject.clone()),
            starts_at: Some(noon() + Duration::days(1)),
            expires_at: Some(noon() + Duration::days(8)),
            ..Default::default()
        })
        .await
        .unwrap();

    let ctx = RequestContext::default();
    let timeline = [
        (noon(), SuspensionStatus::Pending, false),
        (noon() + Duration::days(1), SuspensionStatus::Active, true),
        (noon() + Duration::days(8), SuspensionStatus::Expired, false),
    ];
    for (at, status, enforced) in timeline {
        let service = service_at(repository.clone(), at);
        let stored = service.get(created.id()).await.unwrap();
        assert_eq!(stored.status_at(at), status);
        assert_eq!(service.is_subject_suspended(&subject, &ctx).await.unwrap(), enforced);
    }

    // Revoking during the active window ends enforcement for good.
    let mid = service_at(repository.clone(), noon() + Duration::days(2));
    mid.revoke(created.id(), None, None).await.unwrap();
    assert!(!mid.is_subject_suspended(&subject, &ctx).await.unwrap());
    assert_eq!(
        repository.find_by_id(created.id()).await.unwrap().unwrap().status_at(noon()),
        SuspensionStatus::Revoked
    );
}

#[tokio::test]
async fn test_country_and_conditional_gates() {
    let repository = Arc::new(MemorySuspensionRepository::new());
    let service = service_at(repository, noon());

    service
        .suspend(CreateSuspensionInput {
            strategy_type: Some("country".to_string()),
            strategy_metadata: Some(metadata(json!({"countries": ["kp", "IR"]}))),
            reason: Some("sanctioned region".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let read_only = service
        .suspend(CreateSuspensionInput {
            subject: Some(EntityReference::new("organization", "acme")),
            strategy_type: Some("write_paths".to_string()),
            strategy_metadata: Some(metadata(json!({"paths": ["/notes", "/drive"]}))),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(service.check_global(&forwarded("203.0.113.7")).await.unwrap().is_some());
    assert!(service.check_global(&forwarded("198.51.100.4")).await.unwrap().is_none());
    assert!(service.check_global(&RequestContext::default()).await.unwrap().is_none());

    let acme = read_only.subject().unwrap().clone();
    let post = RequestContext::new("POST", "/notes");
    let get = RequestContext::new("GET", "/notes");
    let other = RequestContext::new("POST", "/i");
    assert!(service.is_subject_suspended(&acme, &post).await.unwrap());
    assert!(!service.is_subject_suspended(&acme, &get).await.unwrap());
    assert!(!service.is_subject_suspended(&acme, &other).await.unwrap());
}

#[tokio::test]
async fn test_device_fingerprint_gate() {
    let repository = Arc::new(MemorySuspensionRepository::new());
    let service = service_at(repository, noon());
    let subject = EntityReference::new("user", "9");

    service
        .suspend(CreateSuspensionInput {
            subject: Some(subject.clone()),
            strategy_type: Some("device_fingerprint".to_string()),
            strategy_metadata: Some(metadata(json!({"fingerprint": "fp_4b1d2e9a"}))),
            ..Default::default()
        })
        .await
        .unwrap();

    let same = RequestContext::new("GET", "/").with_header("X-Device-Fingerprint", "fp_4b1d2e9a");
    let other = RequestContext::new("GET", "/").with_header("X-Device-Fingerprint", "fp_00000000");
    assert!(service.is_subject_suspended(&subject, &same).await.unwrap());
    assert!(!service.is_subject_suspended(&subject, &other).await.unwrap());
    assert!(!service
        .is_subject_suspended(&subject, &RequestContext::default())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_events_and_history() {
    let repository = Arc::new(MemorySuspensionRepository::new());
    let mut service = service_at(repository, noon());
    let publisher = RecordingEventPublisher::new();
    service.set_event_publisher(Arc::new(publisher.clone()));

    let subject = EntityReference::new("user", "1");
    let moderator = EntityReference::new("user", "mod");

    let first = service
        .suspend(CreateSuspensionInput {
            subject: Some(subject.clone()),
            suspended_by: Some(moderator.clone()),
            reason: Some("first strike".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    service
        .revoke(first.id(), Some(moderator.clone()), Some("appeal granted".to_string()))
        .await
        .unwrap();
    service
        .suspend(CreateSuspensionInput {
            subject: Some(subject.clone()),
            suspended_by: Some(moderator),
            reason: Some("second strike".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let history = service.history_for_subject(&subject).await.unwrap();
    let reasons: Vec<_> = history.iter().map(|s| s.reason()).collect();
    assert_eq!(reasons, vec![Some("appeal granted"), Some("second strike")]);

    let active = service.active_for_subject(&subject).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].reason(), Some("second strike"));

    let names: Vec<_> = publisher.events().iter().map(SuspensionEvent::name).collect();
    assert_eq!(names, vec!["suspended", "revoked", "suspended"]);
}

#[tokio::test]
async fn test_concurrent_checks() {
    let repository = Arc::new(MemorySuspensionRepository::new());
    let service = service_at(repository, noon());

    service
        .suspend(CreateSuspensionInput {
            match_type: Some("regex".to_string()),
            match_value: Some("/(a+)+$/".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                let candidate = if i % 2 == 0 {
                    "a".repeat(10_000)
                } else {
                    format!("{}!", "a".repeat(10_000))
                };
                service
                    .check_value("regex", &candidate, &RequestContext::default())
                    .await
                    .unwrap()
                    .is_some()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), i % 2 == 0);
    }
}
