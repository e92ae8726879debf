//! Integration tests for the tgsend library
//!
//! These tests verify the public API: credential resolution through the
//! layered sources, and a full resolve-then-dispatch round against a mock
//! Bot API server.

use std::fs;
use std::path::PathBuf;
use std::sync::{LazyLock, Mutex};

use httpmock::prelude::*;
use tempfile::TempDir;

use tgsend::{
    config::{self, Credentials, DEFAULT_SECTION, ENV_CHAT_ID, ENV_TOKEN},
    Error, MessageRequest, ParseMode, Telegram,
};

static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

struct EnvGuard {
    key: String,
    original: Option<String>,
}

impl EnvGuard {
    fn set(key: &str, value: &str) -> Self {
        let original = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self {
            key: key.to_string(),
            original,
        }
    }

    fn unset(key: &str) -> Self {
        let original = std::env::var(key).ok();
        std::env::remove_var(key);
        Self {
            key: key.to_string(),
            original,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.original {
            Some(v) => std::env::set_var(&self.key, v),
            None => std::env::remove_var(&self.key),
        }
    }
}

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("tgsend.conf");
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// Resolver
// ============================================================================

#[test]
fn explicit_arguments_always_win() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _guards = [
        EnvGuard::set(ENV_TOKEN, "env-token"),
        EnvGuard::set(ENV_CHAT_ID, "env-chat"),
    ];
    let dir = TempDir::new().unwrap();
    let file = write_config(&dir, "[Default]\nBotToken = file-token\nChatID = file-chat\n");

    let creds = config::resolve_with_search(
        Some("arg-token"),
        Some("arg-chat"),
        DEFAULT_SECTION,
        Some(&file),
        &[],
    )
    .unwrap();

    assert_eq!(creds, Credentials::new("arg-token", "arg-chat"));
}

#[test]
fn environment_wins_over_valid_file() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _guards = [
        EnvGuard::set(ENV_TOKEN, "env-token"),
        EnvGuard::set(ENV_CHAT_ID, "env-chat"),
    ];
    let dir = TempDir::new().unwrap();
    let file = write_config(&dir, "[Default]\nBotToken = file-token\nChatID = file-chat\n");

    let creds =
        config::resolve_with_search(None, None, DEFAULT_SECTION, None, &[file]).unwrap();

    assert_eq!(creds, Credentials::new("env-token", "env-chat"));
}

#[test]
fn explicit_file_path_that_does_not_exist_is_fatal() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _guards = [EnvGuard::unset(ENV_TOKEN), EnvGuard::unset(ENV_CHAT_ID)];
    let dir = TempDir::new().unwrap();
    let fallback = write_config(&dir, "[Default]\nBotToken = A\nChatID = B\n");
    let missing = dir.path().join("missing.conf");

    let err = config::resolve_with_search(
        None,
        None,
        DEFAULT_SECTION,
        Some(&missing),
        &[fallback],
    )
    .unwrap_err();

    assert!(matches!(err, Error::ConfigFileNotFound(_)));
}

#[test]
fn profile_sections_select_distinct_credentials() {
    let _lock = ENV_LOCK.lock().unwrap();
    let _guards = [EnvGuard::unset(ENV_TOKEN), EnvGuard::unset(ENV_CHAT_ID)];
    let dir = TempDir::new().unwrap();
    let file = write_config(
        &dir,
        "[Default]\nBotToken = A\nChatID = B\n\n[Alt]\nBotToken = C\nChatID = D\n",
    );

    let default = config::resolve_with_search(None, None, DEFAULT_SECTION, Some(&file), &[])
        .unwrap();
    let alt = config::resolve_with_search(None, None, "Alt", Some(&file), &[]).unwrap();

    assert_eq!(default, Credentials::new("A", "B"));
    assert_eq!(alt, Credentials::new("C", "D"));
}

// ============================================================================
// Resolve + dispatch round trip
// ============================================================================

#[tokio::test]
async fn credentials_from_file_drive_a_successful_dispatch() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/botfile-token/sendMessage")
            .json_body_includes(
                serde_json::json!({
                    "chat_id": "file-chat",
                    "text": "deploy finished",
                })
                .to_string(),
            );
        then.status(200)
            .json_body(serde_json::json!({"ok": true, "result": {"message_id": 101}}));
    });

    let creds = {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guards = [EnvGuard::unset(ENV_TOKEN), EnvGuard::unset(ENV_CHAT_ID)];
        let dir = TempDir::new().unwrap();
        let file = write_config(&dir, "[Default]\nBotToken = file-token\nChatID = file-chat\n");
        config::resolve_with_search(None, None, DEFAULT_SECTION, Some(&file), &[]).unwrap()
    };

    let telegram =
        Telegram::with_base_url(creds, format!("{}/bot", server.base_url())).unwrap();
    let dispatch = telegram
        .send(&MessageRequest::text("deploy finished"))
        .await
        .unwrap();

    mock.assert_calls(1);
    assert_eq!(dispatch.message_id, Some(101));
}

#[tokio::test]
async fn wrong_chat_id_surfaces_the_remote_error() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/bottok/sendMessage");
        then.status(400).json_body(serde_json::json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        }));
    });

    let telegram = Telegram::with_base_url(
        Credentials::new("tok", "wrong-chat"),
        format!("{}/bot", server.base_url()),
    )
    .unwrap();

    let err = telegram
        .send(&MessageRequest::text("hello"))
        .await
        .unwrap_err();

    match err {
        Error::Api { code, description } => {
            assert_eq!(code, 400);
            assert!(description.contains("chat not found"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

// ============================================================================
// Message model
// ============================================================================

#[test]
fn request_composition_matches_the_documented_layout() {
    let mut request = MessageRequest::text("*bold*");
    request.title = "Hi".to_string();
    request.icon = "\u{2705}".to_string();

    // No parse mode: markup stays literal, icon and title prefix the body.
    assert_eq!(request.composed_text(), "\u{2705} Hi\n\n*bold*");

    request.parse_mode = ParseMode::Markdown;
    assert_eq!(request.composed_text(), "\u{2705} *Hi*\n\n*bold*");
}

#[test]
fn error_variants_have_useful_display_messages() {
    let errors = vec![
        Error::MissingCredential("BotToken"),
        Error::SectionNotFound {
            section: "Alt".into(),
            path: "tgsend.conf".into(),
        },
        Error::ConfigFileNotFound("missing.conf".into()),
        Error::Network("connection refused".into()),
        Error::MalformedResponse("truncated".into()),
    ];

    for err in errors {
        assert!(!err.to_string().is_empty());
    }
}
