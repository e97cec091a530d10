use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::platform::{Message, PushClient};
use crate::registry::Target;

/// Per-target outcome of one broadcast attempt.
#[derive(Debug, Serialize)]
pub struct DispatchOutcome {
    pub target: Target,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a broadcast: either there was nothing to send to, or every
/// target got exactly one delivery attempt.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DispatchReport {
    NoTargets,
    Completed {
        sent: usize,
        failed: usize,
        outcomes: Vec<DispatchOutcome>,
    },
}

impl DispatchReport {
    /// Whether any delivery attempt was made.
    pub fn attempted(&self) -> bool {
        matches!(self, DispatchReport::Completed { .. })
    }
}

impl std::fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchReport::NoTargets => write!(f, "no targets registered"),
            DispatchReport::Completed { sent, failed, .. } => {
                write!(f, "sent {sent}, failed {failed}")
            }
        }
    }
}

/// Deliver one message to every target: one attempt each, failures
/// independent per target, fan-out joined without short-circuiting.
pub async fn broadcast(
    client: &dyn PushClient,
    message: &Message,
    targets: &[Target],
) -> DispatchReport {
    if targets.is_empty() {
        info!("No targets yet. Invite the bot to a group and send a message to capture its id.");
        return DispatchReport::NoTargets;
    }

    let attempts = targets.iter().map(|target| async move {
        match client.push(&target.id, std::slice::from_ref(message)).await {
            Ok(()) => DispatchOutcome {
                target: target.clone(),
                ok: true,
                error: None,
            },
            Err(e) => {
                warn!("Push failed to {:?} {}: {}", target.kind, target.id, e);
                DispatchOutcome {
                    target: target.clone(),
                    ok: false,
                    error: Some(e.to_string()),
                }
            }
        }
    });

    let outcomes = join_all(attempts).await;
    let sent = outcomes.iter().filter(|o| o.ok).count();
    let failed = outcomes.len() - sent;

    DispatchReport::Completed {
        sent,
        failed,
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RelayError, RelayResult};
    use crate::registry::TargetKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Push client that fails for configured destination ids.
    struct FakePush {
        calls: AtomicUsize,
        delivered: Mutex<Vec<String>>,
        fail_for: Vec<String>,
    }

    impl FakePush {
        fn new(fail_for: &[&str]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delivered: Mutex::new(Vec::new()),
                fail_for: fail_for.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    #[async_trait::async_trait]
    impl PushClient for FakePush {
        async fn push(&self, to: &str, _messages: &[Message]) -> RelayResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_for.iter().any(|id| id == to) {
                return Err(RelayError::Delivery("boom".to_string()));
            }
            self.delivered.lock().await.push(to.to_string());
            Ok(())
        }
    }

    fn targets(ids: &[&str]) -> Vec<Target> {
        ids.iter()
            .map(|id| Target {
                kind: TargetKind::Group,
                id: id.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn middle_failure_does_not_abort_the_rest() {
        let push = FakePush::new(&["G2"]);
        let report = broadcast(&push, &Message::text("hi"), &targets(&["G1", "G2", "G3"])).await;

        assert_eq!(push.calls.load(Ordering::SeqCst), 3);
        let delivered = push.delivered.lock().await;
        assert!(delivered.contains(&"G1".to_string()));
        assert!(delivered.contains(&"G3".to_string()));

        match report {
            DispatchReport::Completed {
                sent,
                failed,
                outcomes,
            } => {
                assert_eq!(sent, 2);
                assert_eq!(failed, 1);
                let bad = outcomes.iter().find(|o| o.target.id == "G2").unwrap();
                assert!(!bad.ok);
                assert!(bad.error.is_some());
            }
            DispatchReport::NoTargets => panic!("expected a completed report"),
        }
    }

    #[tokio::test]
    async fn empty_target_set_makes_no_calls() {
        let push = FakePush::new(&[]);
        let report = broadcast(&push, &Message::text("hi"), &[]).await;

        assert_eq!(push.calls.load(Ordering::SeqCst), 0);
        assert!(matches!(report, DispatchReport::NoTargets));
        assert!(!report.attempted());
    }

    #[tokio::test]
    async fn every_target_gets_exactly_one_attempt() {
        let push = FakePush::new(&[]);
        broadcast(&push, &Message::text("hi"), &targets(&["A", "B"])).await;
        assert_eq!(push.calls.load(Ordering::SeqCst), 2);
    }
}
