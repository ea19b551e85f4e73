// tests/common/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use chrono::{Duration, Utc};
use serde_json::json;
use tempfile::TempDir;

use crate::cache::token_cache::TokenCache;
use crate::config::profile::ProfileStore;
use crate::engine::refresh::RefreshEngine;
use crate::login::{InteractiveLogin, LoginFailure};
use crate::sinks::credentials_file::CredentialStore;
use crate::sources::{ExchangeCredentials, ExchangeRequest, ResolvedCredentials};

pub const DEV_PROFILE_CONFIG: &str = r#"
[default]
region = eu-west-1

[profile dev]
sso_start_url = https://example.awsapps.com/start
sso_region = eu-west-1
sso_account_id = 111122223333
sso_role_name = Developer
region = eu-west-1
"#;

/// Isolated `~/.aws` tree.
pub struct AwsHome {
    _dir: TempDir,
    pub root: PathBuf,
}

impl AwsHome {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join(".aws");
        fs::create_dir_all(root.join("sso").join("cache")).expect("create sso cache");
        Self { _dir: dir, root }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config")
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.root.join("credentials")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("sso").join("cache")
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("write config");
    }

    pub fn write_credentials(&self, content: &str) {
        fs::write(self.credentials_path(), content).expect("write credentials");
    }

    pub fn read_credentials(&self) -> String {
        fs::read_to_string(self.credentials_path()).expect("read credentials")
    }

    pub fn write_token(&self, name: &str, access_token: &str, expires_at: &str) {
        write_token_file(&self.cache_dir(), name, access_token, expires_at);
    }

    pub fn profile_store(&self) -> ProfileStore {
        ProfileStore::new(self.config_path())
    }

    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(self.credentials_path())
    }

    pub fn token_cache(&self) -> TokenCache {
        TokenCache::new(self.cache_dir())
    }

    pub fn engine<L, X>(&self, login: L, exchanger: X) -> RefreshEngine<L, X>
    where
        L: InteractiveLogin,
        X: ExchangeCredentials,
    {
        RefreshEngine::new(
            self.profile_store(),
            self.credential_store(),
            self.token_cache(),
            login,
            exchanger,
        )
    }
}

pub fn write_token_file(dir: &Path, name: &str, access_token: &str, expires_at: &str) {
    let doc = json!({
        "startUrl": "https://example.awsapps.com/start",
        "region": "eu-west-1",
        "accessToken": access_token,
        "expiresAt": expires_at,
    });
    fs::write(dir.join(name), doc.to_string()).expect("write token");
}

pub fn in_one_hour() -> String {
    (Utc::now() + Duration::hours(1)).format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn one_hour_ago() -> String {
    (Utc::now() - Duration::hours(1)).format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn millis_from_now(delta: Duration) -> i64 {
    (Utc::now() + delta).timestamp_millis()
}

pub fn fixed_credentials() -> ResolvedCredentials {
    ResolvedCredentials {
        access_key_id: "ASIAEXAMPLEKEY".to_owned(),
        secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_owned(),
        session_token: "IQoJb3JpZ2luX2VjEXAMPLE/session+token==".to_owned(),
        expiration: millis_from_now(Duration::hours(1)),
    }
}

/// What a fake login does when invoked.
#[derive(Clone)]
pub enum LoginBehavior {
    Succeed,
    /// succeed and leave a fresh token in the cache, like `aws sso login`
    SucceedWritingToken { dir: PathBuf, token: String },
    FailWithCode(i32),
}

#[derive(Clone)]
pub struct FakeLogin {
    pub calls: Arc<AtomicUsize>,
    behavior: LoginBehavior,
}

impl FakeLogin {
    pub fn new(behavior: LoginBehavior) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            behavior,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InteractiveLogin for FakeLogin {
    async fn login(&self, _profile: &str) -> Result<(), LoginFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            LoginBehavior::Succeed => Ok(()),
            LoginBehavior::SucceedWritingToken { dir, token } => {
                write_token_file(dir, "login-result.json", token, &in_one_hour());
                Ok(())
            }
            LoginBehavior::FailWithCode(code) => Err(LoginFailure::ExitCode(*code)),
        }
    }
}

#[derive(Clone)]
pub struct FakeExchanger {
    pub calls: Arc<AtomicUsize>,
    pub seen_tokens: Arc<Mutex<Vec<String>>>,
    result: Result<ResolvedCredentials, String>,
}

impl FakeExchanger {
    pub fn returning(credentials: ResolvedCredentials) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            seen_tokens: Arc::new(Mutex::new(Vec::new())),
            result: Ok(credentials),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            seen_tokens: Arc::new(Mutex::new(Vec::new())),
            result: Err(message.to_owned()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().expect("lock").clone()
    }
}

impl ExchangeCredentials for FakeExchanger {
    async fn exchange(&self, request: ExchangeRequest<'_>) -> Result<ResolvedCredentials, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens
            .lock()
            .expect("lock")
            .push(request.access_token.to_owned());
        self.result.clone().map_err(|message| anyhow!(message))
    }
}
