use domain::screens::Screen;

use crate::state::AppStore;

/// How a destination is guarded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Policy {
    Open,
    /// Fixed passcode shared out of band; blank means unprotected.
    Static(&'static str),
    /// Membership in the approver roster; the approver's id is the key.
    Roster,
}

fn policy(screen: Screen) -> Policy {
    match screen {
        Screen::Home => Policy::Open,
        // Static passcodes are currently blank, which leaves these
        // destinations open; the entries are kept as configuration
        // points.
        Screen::Request | Screen::Consultation => Policy::Static(""),
        Screen::Delivery | Screen::Inventory => Policy::Roster,
    }
}

/// Outcome of a gate interaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GateOutcome {
    /// Navigation may proceed to the destination.
    Granted(Screen),
    /// Validation is pending; the passcode prompt is showing.
    Pending(Screen),
    /// Wrong passcode. The prompt stays up with the input cleared.
    Denied,
}

/// Gate state: closed, or holding exactly one destination pending
/// validation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GateState {
    #[default]
    Closed,
    Open(Screen),
}

/// Gates navigation into protected screens behind a passcode.
///
/// On a successful roster validation for the delivery destination
/// specifically, the matched approver is logged in before navigation
/// proceeds.
#[derive(Debug, Default)]
pub struct AccessGate {
    state: GateState,
}

impl AccessGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Attempt to navigate. Unprotected destinations bypass the gate
    /// entirely; protected ones open it for passcode validation.
    pub fn request_access(&mut self, screen: Screen) -> GateOutcome {
        match policy(screen) {
            Policy::Open => GateOutcome::Granted(screen),
            Policy::Static(code) if code.is_empty() => GateOutcome::Granted(screen),
            _ => {
                self.state = GateState::Open(screen);
                GateOutcome::Pending(screen)
            }
        }
    }

    /// Abandon the pending attempt.
    pub fn cancel(&mut self) {
        self.state = GateState::Closed;
    }

    /// Validate a passcode for the pending destination. The input is
    /// consumed either way; a miss leaves the gate open and navigation
    /// does not happen.
    pub async fn submit(&mut self, passcode: &str, store: &AppStore) -> GateOutcome {
        let GateState::Open(screen) = self.state else {
            return GateOutcome::Denied;
        };

        let granted = match policy(screen) {
            Policy::Open => true,
            Policy::Static(expected) => passcode == expected,
            Policy::Roster => match store.find_approver_by_id(passcode).await {
                Some(approver) => {
                    if screen == Screen::Delivery {
                        store.login_approver(approver).await;
                    }
                    true
                }
                None => false,
            },
        };

        if granted {
            self.state = GateState::Closed;
            GateOutcome::Granted(screen)
        } else {
            GateOutcome::Denied
        }
    }
}
