//! Native dialog interception for dialog-gated actions.
//!
//! Confirm-gated cancellation and prompt-gated checkout both hinge on the
//! same protocol: a one-shot interception is armed *before* the click that
//! can raise the dialog, and the workflow then awaits the armed gate with
//! a bounded timeout. Arming after the click is a race: a fast dialog is
//! dropped and the action hangs. [`ArmedDialog`] makes the suspension
//! point and its failure mode explicit instead of hiding them in a
//! fire-and-forget callback.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::result::{ComprarError, ComprarResult};

/// Default bound on waiting for an expected dialog (5 seconds)
pub const DEFAULT_DIALOG_TIMEOUT_MS: u64 = 5_000;

/// Type of native browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogKind {
    /// Alert dialog (OK button only)
    Alert,
    /// Confirm dialog (OK/Cancel buttons)
    Confirm,
    /// Prompt dialog (text input + OK/Cancel)
    Prompt,
    /// Before-unload dialog (Leave/Stay buttons)
    BeforeUnload,
}

impl std::fmt::Display for DialogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => write!(f, "alert"),
            Self::Confirm => write!(f, "confirm"),
            Self::Prompt => write!(f, "prompt"),
            Self::BeforeUnload => write!(f, "beforeunload"),
        }
    }
}

/// How the next dialog should be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogIntent {
    /// Accept the dialog (OK/Yes/Leave)
    Accept,
    /// Accept with input text (for prompt dialogs)
    AcceptWith(String),
    /// Dismiss the dialog (Cancel/No/Stay)
    Dismiss,
}

impl DialogIntent {
    /// Whether this intent accepts the dialog
    #[must_use]
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept | Self::AcceptWith(_))
    }

    /// Input text supplied to a prompt, if any
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        match self {
            Self::AcceptWith(text) => Some(text),
            Self::Accept | Self::Dismiss => None,
        }
    }
}

/// Terminal outcome of a handled dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogOutcome {
    /// Dialog was accepted
    Accepted,
    /// Dialog was dismissed
    Dismissed,
}

/// A dialog that arrived and was resolved by the armed interception
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogResolution {
    /// Kind of dialog that arrived
    pub kind: DialogKind,
    /// Message the dialog displayed
    pub message: String,
    /// How it was resolved
    pub outcome: DialogOutcome,
    /// Input passed to a prompt's accept, if any
    pub input: Option<String>,
}

/// Lifecycle of a single dialog-gated action.
///
/// `Idle → Triggered → DialogPending → {Accepted | Dismissed | TimedOut}`.
/// Accepted and Dismissed complete normally with different downstream
/// effects; TimedOut is a failure terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionPhase {
    /// Nothing triggered yet
    Idle,
    /// The click has been dispatched
    Triggered,
    /// Waiting on the armed dialog
    DialogPending,
    /// Dialog accepted
    Accepted,
    /// Dialog dismissed
    Dismissed,
    /// No dialog arrived within the bound
    TimedOut,
}

impl ActionPhase {
    /// Whether this phase is terminal
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Dismissed | Self::TimedOut)
    }
}

/// An in-flight dialog-gated mutation awaiting confirmation
#[derive(Debug, Clone)]
pub struct PendingAction {
    /// Logical name of the triggering control
    pub action: String,
    /// Configured resolution for the expected dialog
    pub intent: DialogIntent,
    /// Current lifecycle phase
    pub phase: ActionPhase,
}

impl PendingAction {
    /// Create a pending action in the `Idle` phase
    #[must_use]
    pub fn new(action: impl Into<String>, intent: DialogIntent) -> Self {
        Self {
            action: action.into(),
            intent,
            phase: ActionPhase::Idle,
        }
    }

    /// Advance to a new phase
    pub fn advance(&mut self, phase: ActionPhase) {
        self.phase = phase;
    }
}

/// A one-shot armed interception for the next native dialog.
///
/// Returned by [`crate::driver::StoreDriver::arm_dialog`]; consumed by
/// awaiting [`ArmedDialog::resolved`]. Registration happens at creation,
/// strictly before the triggering click.
#[derive(Debug)]
pub struct ArmedDialog {
    action: String,
    rx: oneshot::Receiver<DialogResolution>,
}

impl ArmedDialog {
    /// Pair an armed gate with the sender the driver fires on arrival
    #[must_use]
    pub fn channel(action: impl Into<String>) -> (oneshot::Sender<DialogResolution>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            tx,
            Self {
                action: action.into(),
                rx,
            },
        )
    }

    /// Await the dialog with a bounded timeout.
    ///
    /// # Errors
    ///
    /// [`ComprarError::DialogTimeout`] if no dialog arrives within the
    /// bound, or if the driver dropped the interception without firing it.
    pub async fn resolved(self, timeout: Duration) -> ComprarResult<DialogResolution> {
        let ms = timeout.as_millis() as u64;
        match tokio::time::timeout(timeout, self.rx).await {
            Ok(Ok(resolution)) => Ok(resolution),
            // Sender dropped: the session ended with the gate still armed.
            Ok(Err(_)) | Err(_) => Err(ComprarError::DialogTimeout {
                action: self.action,
                ms,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod intent_tests {
        use super::*;

        #[test]
        fn test_accept_is_accept() {
            assert!(DialogIntent::Accept.is_accept());
            assert!(DialogIntent::AcceptWith("addr".to_string()).is_accept());
            assert!(!DialogIntent::Dismiss.is_accept());
        }

        #[test]
        fn test_input_only_for_accept_with() {
            assert_eq!(DialogIntent::Accept.input(), None);
            assert_eq!(DialogIntent::Dismiss.input(), None);
            assert_eq!(
                DialogIntent::AcceptWith("12 Main St".to_string()).input(),
                Some("12 Main St")
            );
        }
    }

    mod phase_tests {
        use super::*;

        #[test]
        fn test_terminal_phases() {
            assert!(!ActionPhase::Idle.is_terminal());
            assert!(!ActionPhase::Triggered.is_terminal());
            assert!(!ActionPhase::DialogPending.is_terminal());
            assert!(ActionPhase::Accepted.is_terminal());
            assert!(ActionPhase::Dismissed.is_terminal());
            assert!(ActionPhase::TimedOut.is_terminal());
        }

        #[test]
        fn test_pending_action_advances() {
            let mut pending = PendingAction::new("cancel order", DialogIntent::Accept);
            assert_eq!(pending.phase, ActionPhase::Idle);
            pending.advance(ActionPhase::Triggered);
            pending.advance(ActionPhase::DialogPending);
            pending.advance(ActionPhase::Accepted);
            assert!(pending.phase.is_terminal());
        }
    }

    mod kind_tests {
        use super::*;

        #[test]
        fn test_kind_display() {
            assert_eq!(DialogKind::Alert.to_string(), "alert");
            assert_eq!(DialogKind::Confirm.to_string(), "confirm");
            assert_eq!(DialogKind::Prompt.to_string(), "prompt");
            assert_eq!(DialogKind::BeforeUnload.to_string(), "beforeunload");
        }
    }

    mod gate_tests {
        use super::*;

        #[tokio::test]
        async fn test_gate_resolves_when_fired() {
            let (tx, gate) = ArmedDialog::channel("cancel order");
            tx.send(DialogResolution {
                kind: DialogKind::Confirm,
                message: "Cancel this order?".to_string(),
                outcome: DialogOutcome::Accepted,
                input: None,
            })
            .unwrap();

            let resolution = gate.resolved(Duration::from_millis(100)).await.unwrap();
            assert_eq!(resolution.outcome, DialogOutcome::Accepted);
            assert_eq!(resolution.kind, DialogKind::Confirm);
        }

        #[tokio::test(start_paused = true)]
        async fn test_gate_times_out_without_dialog() {
            let (tx, gate) = ArmedDialog::channel("cancel order");

            let result = gate.resolved(Duration::from_secs(5)).await;
            match result {
                Err(ComprarError::DialogTimeout { action, ms }) => {
                    assert_eq!(action, "cancel order");
                    assert_eq!(ms, 5_000);
                }
                other => panic!("expected DialogTimeout, got {other:?}"),
            }
            drop(tx);
        }

        #[tokio::test]
        async fn test_gate_errors_when_driver_drops_sender() {
            let (tx, gate) = ArmedDialog::channel("checkout");
            drop(tx);

            let result = gate.resolved(Duration::from_millis(100)).await;
            assert!(matches!(result, Err(ComprarError::DialogTimeout { .. })));
        }

        #[tokio::test]
        async fn test_prompt_resolution_carries_input_once() {
            let (tx, gate) = ArmedDialog::channel("checkout");
            tx.send(DialogResolution {
                kind: DialogKind::Prompt,
                message: "Enter shipping address".to_string(),
                outcome: DialogOutcome::Accepted,
                input: Some("221B Baker Street".to_string()),
            })
            .unwrap();

            let resolution = gate.resolved(Duration::from_millis(100)).await.unwrap();
            assert_eq!(resolution.input.as_deref(), Some("221B Baker Street"));
        }
    }
}
