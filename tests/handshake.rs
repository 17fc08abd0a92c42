//! End-to-end token handshake through the public API.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing_subscriber::EnvFilter;

use portal_bridge::{
    CookieTokenStore, Delivery, FrameKind, Host, HostConfig, IgnoreReason, LoginForm,
    LoginOutcome, MemoryCookieJar, MemoryFrameWindow, MemoryFrames, MessageEvent,
    MessageOutcome, TokenChannel, TokenStore, Visibility,
};

const ORIGIN: &str = "http://localhost:4300";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config() -> anyhow::Result<HostConfig> {
    Ok(HostConfig::from_json(
        r#"{
            "patientUrl": "http://localhost:4300/patient",
            "staffUrl": "http://localhost:4300/staff",
            "settleDelayMs": 500
        }"#,
    )?)
}

#[tokio::test(start_paused = true)]
async fn login_show_deliver_close() -> anyhow::Result<()> {
    init_tracing();

    let jar = Arc::new(MemoryCookieJar::new());
    let store = Arc::new(CookieTokenStore::new(jar));
    let frames = Arc::new(MemoryFrames::new());
    let host = Host::new(config()?, store.clone(), frames.clone());

    let mut form = LoginForm::new();
    form.set_input("eyJhbGciOi.J9;x y");
    assert_eq!(form.submit(&host), LoginOutcome::Stored);
    assert!(store.has());
    assert!(!host.is_visible(FrameKind::Patient));

    let patient = frames.mount(FrameKind::Patient, MemoryFrameWindow::new(ORIGIN));
    assert_eq!(host.toggle(FrameKind::Patient), Visibility::Shown);
    assert_eq!(
        host.frame_url(FrameKind::Patient).as_str(),
        "http://localhost:4300/patient?token=eyJhbGciOi.J9%3Bx%20y"
    );

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(
        patient.received(),
        vec![json!({ "type": "AUTH_TOKEN", "token": "eyJhbGciOi.J9;x y" })]
    );

    let snapshot = host.snapshot(FrameKind::Patient);
    assert_eq!(snapshot.last_delivery, Some(Delivery::Posted));
    assert_eq!(
        snapshot.token_channels(),
        vec![TokenChannel::UrlParameter, TokenChannel::Message]
    );

    let spoofed = MessageEvent::new("http://localhost:4301", json!({ "type": "CLOSE_PATIENT_IFRAME" }));
    assert_eq!(
        host.handle_message(&spoofed),
        MessageOutcome::Ignored(IgnoreReason::ForeignOrigin)
    );
    assert!(host.is_visible(FrameKind::Patient));

    let close = MessageEvent::new(ORIGIN, json!({ "type": "CLOSE_PATIENT_IFRAME" }));
    assert_eq!(
        host.handle_message(&close),
        MessageOutcome::Closed(FrameKind::Patient)
    );
    assert!(!host.is_visible(FrameKind::Patient));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn token_change_applies_on_next_show() -> anyhow::Result<()> {
    init_tracing();

    let store = Arc::new(CookieTokenStore::new(Arc::new(MemoryCookieJar::new())));
    let frames = Arc::new(MemoryFrames::new());
    let host = Host::new(config()?, store, frames.clone());
    let staff = frames.mount(FrameKind::Staff, MemoryFrameWindow::new(ORIGIN));

    host.login("one");
    host.toggle(FrameKind::Staff);
    tokio::time::sleep(Duration::from_secs(1)).await;

    host.login("two");
    assert_eq!(staff.received().len(), 1);
    assert_eq!(host.frame_url(FrameKind::Staff).token().as_deref(), Some("two"));

    host.toggle(FrameKind::Staff);
    host.toggle(FrameKind::Staff);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(
        staff.received(),
        vec![
            json!({ "type": "AUTH_TOKEN", "token": "one" }),
            json!({ "type": "AUTH_TOKEN", "token": "two" }),
        ]
    );
    Ok(())
}

#[test]
fn detached_store_leaves_urls_bare() -> anyhow::Result<()> {
    let host = Host::new(
        config()?,
        Arc::new(CookieTokenStore::detached()),
        Arc::new(MemoryFrames::new()),
    );

    assert_eq!(host.login("ignored by storage"), LoginOutcome::Stored);
    assert_eq!(host.token(), None);
    assert_eq!(
        host.frame_url(FrameKind::Staff).as_str(),
        "http://localhost:4300/staff"
    );
    Ok(())
}
