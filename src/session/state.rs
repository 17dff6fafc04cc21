//! Session lifecycle states

use std::fmt;

/// Where a browser session is in its lifecycle.
///
/// `Connected` is the resting state; the busy states return to it when their
/// operation finishes, successfully or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Navigating,
    Uploading,
    Deleting,
    CreatingDirectory,
}

impl SessionState {
    /// True for every state that holds credentials.
    pub fn is_connected(self) -> bool {
        !matches!(self, SessionState::Disconnected | SessionState::Connecting)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (_, Disconnected) => true,
            (Disconnected, Connecting) => true,
            (Connecting, Connected) => true,
            (Connected, Navigating | Uploading | Deleting | CreatingDirectory) => true,
            (Navigating | Uploading | Deleting | CreatingDirectory, Connected) => true,
            // Mutations refresh the listing before settling.
            (Uploading | Deleting | CreatingDirectory, Navigating) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Navigating => "navigating",
            SessionState::Uploading => "uploading",
            SessionState::Deleting => "deleting",
            SessionState::CreatingDirectory => "creating directory",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        use SessionState::*;
        assert!(Disconnected.can_transition_to(Connecting));
        assert!(Connecting.can_transition_to(Disconnected));
        assert!(Connected.can_transition_to(Uploading));
        assert!(Uploading.can_transition_to(Navigating));
        assert!(Navigating.can_transition_to(Disconnected));
        assert!(!Disconnected.can_transition_to(Navigating));
        assert!(!Connecting.can_transition_to(Uploading));
        assert!(!Navigating.can_transition_to(Deleting));
    }

    #[test]
    fn test_is_connected() {
        assert!(!SessionState::Disconnected.is_connected());
        assert!(!SessionState::Connecting.is_connected());
        assert!(SessionState::Uploading.is_connected());
    }
}
