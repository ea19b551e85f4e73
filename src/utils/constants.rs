//! Shared constants and invariants

pub const DEFAULT_PROFILE: &str = "default";
pub const PROFILE_SECTION_PREFIX: &str = "profile ";
pub const SSO_SESSION_SECTION_PREFIX: &str = "sso-session ";

// profile fields (config file)
pub const FIELD_SSO_REGION: &str = "sso_region";
pub const FIELD_SSO_ACCOUNT_ID: &str = "sso_account_id";
pub const FIELD_SSO_ROLE_NAME: &str = "sso_role_name";
pub const FIELD_SSO_SESSION: &str = "sso_session";
pub const REQUIRED_PROFILE_FIELDS: [&str; 3] = [FIELD_SSO_REGION, FIELD_SSO_ACCOUNT_ID, FIELD_SSO_ROLE_NAME];

// credentials fields (credentials file)
pub const FIELD_ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const FIELD_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
pub const FIELD_SESSION_TOKEN: &str = "aws_session_token";
pub const FIELD_EXPIRATION: &str = "expiration";

// external login
pub const DEFAULT_LOGIN_PROGRAM: &str = "aws";
pub const DEFAULT_LOGIN_ARGS: [&str; 3] = ["sso", "login", "--profile"];

// sso portal
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const SSO_BEARER_TOKEN_HEADER: &str = "x-amz-sso_bearer_token";
pub const ROLE_CREDENTIALS_PATH: &str = "/federation/credentials";

// settings file under the user config directory
pub const SETTINGS_DIR_NAME: &str = "sso-refresh";
pub const SETTINGS_FILE_NAME: &str = "settings.yaml";
