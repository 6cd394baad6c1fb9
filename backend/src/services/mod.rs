//! Module for core business logic services.
//!
//! Background tasks run on the fixed schedule below: the SMS dispatcher, the
//! automation rule engine and the daily usage-stats rollup.

pub mod automation;
pub mod dispatcher;

use std::time::Duration;

use tracing::info;

use crate::AppState;

/// One background task registration.
pub struct ScheduledTask {
    pub name: &'static str,
    pub interval: Duration,
}

/// The periodic task table, resolved from configuration.
pub fn schedule(state: &AppState) -> [ScheduledTask; 3] {
    [
        ScheduledTask {
            name: "sms_dispatch",
            interval: state.config.sms.dispatch_interval,
        },
        ScheduledTask {
            name: "sms_automation",
            interval: state.config.sms.automation_interval,
        },
        ScheduledTask {
            name: "sms_daily_stats",
            interval: state.config.sms.stats_interval,
        },
    ]
}

/// Spawns every periodic task onto the runtime.
pub fn spawn_background_tasks(state: &AppState) {
    for task in schedule(state) {
        info!(task = task.name, interval_secs = task.interval.as_secs(), "registering background task");
    }
    tokio::spawn(dispatcher::run(
        state.pool.clone(),
        state.gateway.clone(),
        state.config.sms.sender_id.clone(),
        state.config.sms.max_retries,
        state.config.sms.dispatch_interval,
    ));
    tokio::spawn(automation::run(
        state.pool.clone(),
        state.config.sms.automation_interval,
    ));
    tokio::spawn(dispatcher::run_stats(
        state.pool.clone(),
        state.config.sms.stats_interval,
    ));
}
