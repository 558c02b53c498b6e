//! Split workflow state machine.

use serde::{Deserialize, Serialize};

/// The state of one order as it moves through the split workflow.
///
/// State transitions:
/// ```text
/// Received ──► CheckingIdempotency ──┬──► AlreadyProcessed
///                                    ├──► InProgressElsewhere
///                                    ├──► NoLineItems
///                                    ├──► Marking (tag repair)
///                                    ├──► Aborted
///                                    └──► ProcessingItems ──┬──► Marking ──┬──► Done
///                                                           └──► Aborted   └──► PartiallyDone
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SplitState {
    /// The notification has been accepted for processing.
    #[default]
    Received,

    /// Looking at the sentinel tag and the idempotency ledger.
    CheckingIdempotency,

    /// The order was split on an earlier delivery (terminal state).
    AlreadyProcessed,

    /// Another delivery of the same order holds the ledger entry (terminal state).
    InProgressElsewhere,

    /// The order has no line items and nothing was done (terminal state).
    NoLineItems,

    /// Resolving capacity and creating child orders, item by item.
    ProcessingItems,

    /// Appending the sentinel tag to the original order.
    Marking,

    /// Children created and the original order tagged (terminal state).
    Done,

    /// Items processed but the tag update failed (terminal state).
    PartiallyDone,

    /// A fatal condition stopped the workflow (terminal state).
    Aborted,
}

impl SplitState {
    /// Returns true if the workflow may move from `self` to `next`.
    pub fn can_transition_to(&self, next: SplitState) -> bool {
        use SplitState::*;
        matches!(
            (*self, next),
            (Received, CheckingIdempotency)
                | (
                    CheckingIdempotency,
                    AlreadyProcessed
                        | InProgressElsewhere
                        | NoLineItems
                        | ProcessingItems
                        | Marking
                        | Aborted
                )
                | (ProcessingItems, Marking | Aborted)
                | (Marking, Done | PartiallyDone)
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SplitState::AlreadyProcessed
                | SplitState::InProgressElsewhere
                | SplitState::NoLineItems
                | SplitState::Done
                | SplitState::PartiallyDone
                | SplitState::Aborted
        )
    }

    /// Returns true if the workflow stopped before any outbound write.
    pub fn is_short_circuit(&self) -> bool {
        matches!(
            self,
            SplitState::AlreadyProcessed | SplitState::InProgressElsewhere | SplitState::NoLineItems
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitState::Received => "Received",
            SplitState::CheckingIdempotency => "CheckingIdempotency",
            SplitState::AlreadyProcessed => "AlreadyProcessed",
            SplitState::InProgressElsewhere => "InProgressElsewhere",
            SplitState::NoLineItems => "NoLineItems",
            SplitState::ProcessingItems => "ProcessingItems",
            SplitState::Marking => "Marking",
            SplitState::Done => "Done",
            SplitState::PartiallyDone => "PartiallyDone",
            SplitState::Aborted => "Aborted",
        }
    }
}

impl std::fmt::Display for SplitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
