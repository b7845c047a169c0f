//! State machine trait for status enums.
//!
//! Lifecycle enums (such as the per-tenant token state) implement this trait
//! so that every state change goes through a single validated path.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their valid transitions; `transition_to` rejects
/// anything else.
///
/// ```ignore
/// let next = TokenState::Valid.transition_to(TokenState::Refreshing)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Off,
        On,
        Broken,
    }

    impl StateMachine for Light {
        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Light::Off => vec![Light::On, Light::Broken],
                Light::On => vec![Light::Off, Light::Broken],
                Light::Broken => vec![],
            }
        }
    }

    #[test]
    fn transition_to_accepts_listed_target() {
        assert_eq!(Light::Off.transition_to(Light::On), Ok(Light::On));
    }

    #[test]
    fn transition_to_rejects_unlisted_target() {
        let err = Light::Broken.transition_to(Light::On).unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn terminal_state_has_no_transitions() {
        assert!(Light::Broken.is_terminal());
        assert!(!Light::On.is_terminal());
    }
}
