//! Guarded lifecycle transitions for status enums.

use super::ValidationError;

/// A status enum whose legal moves are a fixed table.
///
/// Implementors list the successors of each state; everything else is derived.
///
/// ```ignore
/// let next = BookingStatus::Pending.transition_to(BookingStatus::Confirmed)?;
/// ```
pub trait StateMachine:
    Sized + Copy + PartialEq + std::fmt::Debug + std::fmt::Display + 'static
{
    /// States reachable in one step from `self`.
    fn successors(&self) -> &'static [Self];

    fn can_transition_to(&self, target: &Self) -> bool {
        self.successors().contains(target)
    }

    /// `target` if the move is legal, otherwise an invalid-transition error.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_transition(self, target))
        }
    }

    fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}
