//! Subscription plan tiers and the credit allotments attached to them.
//!
//! Credits are the unit of metering: one successful flyer generation
//! consumes exactly one credit. Plan changes and billing-cycle renewals
//! reset the balance to the tier's monthly allotment; they never add to
//! whatever is left over.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Credits granted on sign-up and whenever an account falls back to the
/// free tier.
pub const FREE_TIER_CREDITS: i32 = 3;

// ---------- Plan tiers ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Starter,
    Pro,
    Agency,
}

impl PlanTier {
    /// Credits granted at the start of each billing cycle.
    pub fn monthly_credits(self) -> i32 {
        match self {
            PlanTier::Free => FREE_TIER_CREDITS,
            PlanTier::Starter => 30,
            PlanTier::Pro => 100,
            PlanTier::Agency => 500,
        }
    }

    /// Stable lowercase token used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Starter => "starter",
            PlanTier::Pro => "pro",
            PlanTier::Agency => "agency",
        }
    }
}

impl FromStr for PlanTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanTier::Free),
            "starter" => Ok(PlanTier::Starter),
            "pro" => Ok(PlanTier::Pro),
            "agency" => Ok(PlanTier::Agency),
            other => Err(CoreError::Validation(format!(
                "Invalid plan '{other}'. Must be one of: free, starter, pro, agency"
            ))),
        }
    }
}

// ---------- Subscription status ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Cancelled,
    Inactive,
}

impl SubscriptionStatus {
    /// Stable token used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Inactive => "inactive",
        }
    }

    /// Map a billing provider's subscription state onto the local
    /// vocabulary. Unknown states collapse to `Inactive`.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "active" | "trialing" => SubscriptionStatus::Active,
            "past_due" => SubscriptionStatus::PastDue,
            "canceled" | "unpaid" => SubscriptionStatus::Cancelled,
            _ => SubscriptionStatus::Inactive,
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            "inactive" => Ok(SubscriptionStatus::Inactive),
            other => Err(CoreError::Validation(format!(
                "Invalid subscription status '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Plan allotments --

    #[test]
    fn monthly_credits_per_tier() {
        assert_eq!(PlanTier::Free.monthly_credits(), 3);
        assert_eq!(PlanTier::Starter.monthly_credits(), 30);
        assert_eq!(PlanTier::Pro.monthly_credits(), 100);
        assert_eq!(PlanTier::Agency.monthly_credits(), 500);
    }

    #[test]
    fn plan_tokens_round_trip() {
        for tier in [
            PlanTier::Free,
            PlanTier::Starter,
            PlanTier::Pro,
            PlanTier::Agency,
        ] {
            assert_eq!(tier.as_str().parse::<PlanTier>().unwrap(), tier);
        }
    }

    #[test]
    fn unknown_plan_is_rejected() {
        let err = "platinum".parse::<PlanTier>().unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    // -- Provider status mapping --

    #[test]
    fn provider_statuses_map_to_local_vocabulary() {
        assert_eq!(
            SubscriptionStatus::from_provider("active"),
            SubscriptionStatus::Active
        );
        assert_eq!(
            SubscriptionStatus::from_provider("trialing"),
            SubscriptionStatus::Active
        );
        assert_eq!(
            SubscriptionStatus::from_provider("past_due"),
            SubscriptionStatus::PastDue
        );
        assert_eq!(
            SubscriptionStatus::from_provider("canceled"),
            SubscriptionStatus::Cancelled
        );
        assert_eq!(
            SubscriptionStatus::from_provider("unpaid"),
            SubscriptionStatus::Cancelled
        );
        assert_eq!(
            SubscriptionStatus::from_provider("incomplete"),
            SubscriptionStatus::Inactive
        );
    }

    #[test]
    fn status_tokens_round_trip() {
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Inactive,
        ] {
            assert_eq!(
                status.as_str().parse::<SubscriptionStatus>().unwrap(),
                status
            );
        }
    }
}
