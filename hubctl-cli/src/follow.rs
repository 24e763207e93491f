//! Deployment log following
//!
//! After a deploy or undeploy the CLI can stay attached to the instance,
//! printing new log output of its latest inflight operation until that
//! operation finishes. The terminal status of the operation becomes the
//! process exit status.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use hubctl_client::HubClient;
use hubctl_core::domain::instance::StackInstance;
use std::io::{self, Write};
use std::time::Duration;
use tokio::time::{self, Interval};
use tracing::{debug, info, warn};

/// Exit status when the operation finished successfully
pub const SUCCEEDED: i32 = 0;
/// Exit status when the operation failed
pub const FAILED: i32 = 1;
/// Exit status when the operator interrupted the follow
pub const INTERRUPTED: i32 = 130;

/// Operations started this long before the follow began still count
const CLOCK_SKEW_SECS: i64 = 30;

/// Streams the log of an instance's running operation
#[async_trait]
pub trait LogFollower: Send + Sync {
    /// Follow until the operation ends; returns the exit status
    async fn follow(&self, domain: &str) -> Result<i32>;
}

/// Follower polling the hub for the instance state
pub struct PollingFollower {
    client: HubClient,
    poll_interval: Duration,
}

impl PollingFollower {
    pub fn new(client: HubClient, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    async fn poll(
        &self,
        domain: &str,
        ticker: &mut Interval,
        progress: &mut FollowProgress,
    ) -> Result<Option<i32>> {
        ticker.tick().await;

        let instance = self.client.instance_by(domain).await?;
        let observation = progress.observe(&instance);
        if !observation.output.is_empty() {
            let mut stdout = io::stdout().lock();
            stdout.write_all(observation.output.as_bytes())?;
            stdout.flush()?;
        }
        Ok(observation.exit)
    }
}

#[async_trait]
impl LogFollower for PollingFollower {
    async fn follow(&self, domain: &str) -> Result<i32> {
        info!("Following `{}` (interval: {:?})", domain, self.poll_interval);

        let since = Utc::now() - ChronoDuration::seconds(CLOCK_SKEW_SECS);
        let mut progress = FollowProgress::since(since);
        let mut ticker = time::interval(self.poll_interval);
        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        loop {
            tokio::select! {
                _ = &mut interrupt => {
                    warn!("Interrupted, `{}` keeps running on the hub", domain);
                    return Ok(INTERRUPTED);
                }
                exit = self.poll(domain, &mut ticker, &mut progress) => {
                    if let Some(code) = exit? {
                        return Ok(code);
                    }
                }
            }
        }
    }
}

/// What a single poll produced
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Observation {
    /// Log text not printed before
    pub output: String,
    /// Exit status once the operation is over
    pub exit: Option<i32>,
}

/// Log position within the operation being followed
#[derive(Debug)]
pub struct FollowProgress {
    since: DateTime<Utc>,
    operation_id: Option<String>,
    printed: usize,
}

impl FollowProgress {
    /// Track operations started at or after `since`, or not stamped at all
    pub fn since(since: DateTime<Utc>) -> Self {
        Self {
            since,
            operation_id: None,
            printed: 0,
        }
    }

    pub fn observe(&mut self, instance: &StackInstance) -> Observation {
        let latest = instance
            .inflight_operations
            .iter()
            .filter(|op| op.timestamp.is_none_or(|t| t >= self.since))
            .max_by_key(|op| op.timestamp);

        let Some(op) = latest else {
            // A followed operation disappears once the hub settles it
            if self.operation_id.is_some() {
                let failed = instance.status.status.contains("fail");
                return Observation {
                    output: String::new(),
                    exit: Some(if failed { FAILED } else { SUCCEEDED }),
                };
            }
            debug!("No operation on `{}` yet", instance.domain);
            return Observation::default();
        };

        if self.operation_id.as_deref() != Some(op.id.as_str()) {
            self.operation_id = Some(op.id.clone());
            self.printed = 0;
        }
        if op.logs.len() < self.printed || !op.logs.is_char_boundary(self.printed) {
            self.printed = 0;
        }
        let output = op.logs[self.printed..].to_string();
        self.printed = op.logs.len();

        let exit = if op.is_running() {
            None
        } else if op.is_success() {
            Some(SUCCEEDED)
        } else {
            Some(FAILED)
        };
        Observation { output, exit }
    }
}
