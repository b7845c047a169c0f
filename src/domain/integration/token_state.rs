//! Per-tenant OAuth token state.

use serde::Serialize;

use crate::domain::foundation::StateMachine;

/// Lifecycle of a tenant's token bundle.
///
/// ```text
///   Valid ──(401 observed)──▶ Refreshing ──ok──▶ Valid
///     ▲                           │
///     │                          err/timeout
///     └──(re-authorization)── Invalid ◀┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    /// Access token usable as far as we know.
    Valid,
    /// A refresh grant is in flight.
    Refreshing,
    /// Refresh failed; a new authorization is required.
    Invalid,
}

impl TokenState {
    pub fn is_usable(&self) -> bool {
        matches!(self, TokenState::Valid)
    }
}

impl StateMachine for TokenState {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            // Valid -> Valid covers a re-authorization overwriting the bundle.
            TokenState::Valid => vec![TokenState::Refreshing, TokenState::Valid],
            TokenState::Refreshing => vec![TokenState::Valid, TokenState::Invalid],
            TokenState::Invalid => vec![TokenState::Valid],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_cycle_is_allowed() {
        let refreshing = TokenState::Valid.transition_to(TokenState::Refreshing).unwrap();
        assert_eq!(refreshing.transition_to(TokenState::Valid), Ok(TokenState::Valid));
    }

    #[test]
    fn invalid_only_recovers_through_authorization() {
        assert!(TokenState::Invalid.can_transition_to(&TokenState::Valid));
        assert!(!TokenState::Invalid.can_transition_to(&TokenState::Refreshing));
    }

    #[test]
    fn valid_cannot_jump_to_invalid() {
        assert!(TokenState::Valid.transition_to(TokenState::Invalid).is_err());
    }

    #[test]
    fn only_valid_is_usable() {
        assert!(TokenState::Valid.is_usable());
        assert!(!TokenState::Refreshing.is_usable());
        assert!(!TokenState::Invalid.is_usable());
    }
}
