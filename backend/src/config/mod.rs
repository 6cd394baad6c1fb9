//! Central module for application-wide configuration settings.
//!
//! Configuration is read from the environment with typed helpers and sane
//! defaults, covering the bind address, database URL, auth bootstrap and the
//! SMS gateway selection used by the background services.

use std::env;
use std::time::Duration;

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_duration_secs(name: &str, default_secs: u64) -> Duration {
    let secs = env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

/// Which SMS gateway implementation the dispatcher uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayKind {
    Console,
    Twilio,
}

#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub gateway: GatewayKind,
    pub sender_id: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub dispatch_interval: Duration,
    pub automation_interval: Duration,
    pub stats_interval: Duration,
    pub max_retries: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    /// Token for the seeded admin account, created when no staff exist.
    pub bootstrap_admin_token: Option<String>,
    pub run_background_tasks: bool,
    pub sms: SmsConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let gateway = match env_string("INNKEEPER_SMS_GATEWAY", "console").as_str() {
            "twilio" => GatewayKind::Twilio,
            _ => GatewayKind::Console,
        };
        Self {
            bind_addr: env_string("INNKEEPER_BIND", "127.0.0.1:3000"),
            database_url: env_string("DATABASE_URL", "sqlite://innkeeper.db?mode=rwc"),
            bootstrap_admin_token: env::var("INNKEEPER_BOOTSTRAP_TOKEN").ok(),
            run_background_tasks: env_bool("INNKEEPER_BACKGROUND_TASKS", true),
            sms: SmsConfig {
                gateway,
                sender_id: env_string("INNKEEPER_SMS_SENDER", "INNKEEPER"),
                twilio_account_sid: env_string("TWILIO_ACCOUNT_SID", ""),
                twilio_auth_token: env_string("TWILIO_AUTH_TOKEN", ""),
                dispatch_interval: env_duration_secs("INNKEEPER_SMS_DISPATCH_SECS", 10),
                automation_interval: env_duration_secs("INNKEEPER_SMS_AUTOMATION_SECS", 60),
                stats_interval: env_duration_secs("INNKEEPER_SMS_STATS_SECS", 3600),
                max_retries: env_u32("INNKEEPER_SMS_MAX_RETRIES", 3),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_bool_parses_common_forms() {
        assert!(env_bool("INNKEEPER_TEST_MISSING_FLAG", true));
        std::env::set_var("INNKEEPER_TEST_FLAG_NO", "no");
        assert!(!env_bool("INNKEEPER_TEST_FLAG_NO", true));
        std::env::remove_var("INNKEEPER_TEST_FLAG_NO");
    }
}
