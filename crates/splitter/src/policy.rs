//! Named failure and scope policies for the split workflow.

use std::str::FromStr;

use thiserror::Error;

/// What to do when the catalog cannot be reached for a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupFailurePolicy {
    /// Abort the whole request and surface the error so the sender retries.
    #[default]
    Abort,
    /// Record the failure on the line item and continue with the next one.
    SkipItem,
}

/// Which line items of an order are considered for splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemScope {
    /// Every line item, in order.
    #[default]
    AllItems,
    /// Only the first line item; the rest are reported as out of scope.
    FirstItemOnly,
}

/// How an order with an empty line-item list is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyOrderPolicy {
    /// Succeed without any outbound call.
    #[default]
    Accept,
    /// Reject as malformed input.
    Reject,
}

/// Default upper bound on child orders created for one line item.
pub const DEFAULT_MAX_SHIPMENTS_PER_ITEM: u32 = 1_000;

/// The complete set of policies applied by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPolicy {
    pub on_lookup_failure: LookupFailurePolicy,
    pub item_scope: ItemScope,
    pub empty_orders: EmptyOrderPolicy,
    /// Line items needing more shipments than this are left unsplit.
    pub max_shipments_per_item: u32,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            on_lookup_failure: LookupFailurePolicy::default(),
            item_scope: ItemScope::default(),
            empty_orders: EmptyOrderPolicy::default(),
            max_shipments_per_item: DEFAULT_MAX_SHIPMENTS_PER_ITEM,
        }
    }
}

impl SplitPolicy {
    pub fn with_lookup_failure(mut self, policy: LookupFailurePolicy) -> Self {
        self.on_lookup_failure = policy;
        self
    }

    pub fn with_item_scope(mut self, scope: ItemScope) -> Self {
        self.item_scope = scope;
        self
    }

    pub fn with_empty_orders(mut self, policy: EmptyOrderPolicy) -> Self {
        self.empty_orders = policy;
        self
    }

    pub fn with_max_shipments_per_item(mut self, max: u32) -> Self {
        self.max_shipments_per_item = max;
        self
    }
}

/// A policy name that does not match any known variant.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {policy} policy '{value}' (expected one of: {expected})")]
pub struct PolicyParseError {
    pub policy: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl FromStr for LookupFailurePolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" | "skip_item" => Ok(Self::SkipItem),
            _ => Err(PolicyParseError {
                policy: "lookup failure",
                value: s.to_string(),
                expected: "abort, skip",
            }),
        }
    }
}

impl FromStr for ItemScope {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::AllItems),
            "first" => Ok(Self::FirstItemOnly),
            _ => Err(PolicyParseError {
                policy: "item scope",
                value: s.to_string(),
                expected: "all, first",
            }),
        }
    }
}

impl FromStr for EmptyOrderPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            _ => Err(PolicyParseError {
                policy: "empty order",
                value: s.to_string(),
                expected: "accept, reject",
            }),
        }
    }
}
