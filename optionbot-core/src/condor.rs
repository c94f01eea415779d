//! Iron condor structure: leg roles, strike ordering, risk profile.
//!
//! A condor is a short put spread plus a short call spread:
//! long put < short put < short call < long call, by strike.

use crate::domain::{IronCondorLegs, OptionType, TradeAction, CONTRACT_MULTIPLIER};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Role of a leg within the condor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CondorLeg {
    LongPut,
    ShortPut,
    ShortCall,
    LongCall,
}

impl CondorLeg {
    /// All legs in strike order.
    pub const ALL: [CondorLeg; 4] = [
        CondorLeg::LongPut,
        CondorLeg::ShortPut,
        CondorLeg::ShortCall,
        CondorLeg::LongCall,
    ];

    pub fn option_type(self) -> OptionType {
        match self {
            CondorLeg::LongPut | CondorLeg::ShortPut => OptionType::Put,
            CondorLeg::ShortCall | CondorLeg::LongCall => OptionType::Call,
        }
    }

    /// Action that opens this leg.
    pub fn opening_action(self) -> TradeAction {
        if self.is_short() {
            TradeAction::Sell
        } else {
            TradeAction::Buy
        }
    }

    pub fn is_short(self) -> bool {
        matches!(self, CondorLeg::ShortPut | CondorLeg::ShortCall)
    }

    /// Target delta configured for this leg, if any.
    pub fn target_delta(self, legs: &IronCondorLegs) -> Option<f64> {
        match self {
            CondorLeg::LongPut => legs.long_put,
            CondorLeg::ShortPut => legs.short_put,
            CondorLeg::ShortCall => legs.short_call,
            CondorLeg::LongCall => legs.long_call,
        }
    }
}

impl fmt::Display for CondorLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CondorLeg::LongPut => "longPut",
            CondorLeg::ShortPut => "shortPut",
            CondorLeg::ShortCall => "shortCall",
            CondorLeg::LongCall => "longCall",
        };
        f.write_str(name)
    }
}

/// A leg with its strike and per-share entry premium fixed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLeg {
    pub leg: CondorLeg,
    pub strike: f64,
    pub premium: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum CondorError {
    #[error("condor is missing its {0} leg")]
    MissingLeg(CondorLeg),
    #[error("strikes out of order: {lower} ({lower_strike}) must be below {upper} ({upper_strike})")]
    StrikeOrder {
        lower: CondorLeg,
        lower_strike: f64,
        upper: CondorLeg,
        upper_strike: f64,
    },
}

/// Risk profile of an opened condor, in dollars unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CondorProfile {
    /// Per-share credit: short premiums minus long premiums.
    pub net_credit: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    /// Lower and upper breakeven prices of the underlying.
    pub breakevens: [f64; 2],
}

/// An opened condor: resolved legs and contract count.
#[derive(Debug, Clone, PartialEq)]
pub struct CondorPosition {
    legs: Vec<ResolvedLeg>,
    quantity: u32,
}

impl CondorPosition {
    pub fn new(legs: Vec<ResolvedLeg>, quantity: u32) -> Self {
        Self { legs, quantity }
    }

    pub fn leg(&self, leg: CondorLeg) -> Option<&ResolvedLeg> {
        self.legs.iter().find(|l| l.leg == leg)
    }

    pub fn is_complete(&self) -> bool {
        CondorLeg::ALL.iter().all(|&leg| self.leg(leg).is_some())
    }

    /// Require all four legs with strictly increasing strikes.
    pub fn validate_strikes(&self) -> Result<(), CondorError> {
        let mut resolved = Vec::with_capacity(4);
        for leg in CondorLeg::ALL {
            resolved.push(*self.leg(leg).ok_or(CondorError::MissingLeg(leg))?);
        }
        for pair in resolved.windows(2) {
            if pair[0].strike >= pair[1].strike {
                return Err(CondorError::StrikeOrder {
                    lower: pair[0].leg,
                    lower_strike: pair[0].strike,
                    upper: pair[1].leg,
                    upper_strike: pair[1].strike,
                });
            }
        }
        Ok(())
    }

    /// Net credit per share: sold premium minus bought premium.
    pub fn net_credit(&self) -> f64 {
        self.legs
            .iter()
            .map(|l| if l.leg.is_short() { l.premium } else { -l.premium })
            .sum()
    }

    /// Profit, loss and breakevens. `None` unless all four legs are present.
    pub fn profile(&self) -> Option<CondorProfile> {
        let long_put = self.leg(CondorLeg::LongPut)?;
        let short_put = self.leg(CondorLeg::ShortPut)?;
        let short_call = self.leg(CondorLeg::ShortCall)?;
        let long_call = self.leg(CondorLeg::LongCall)?;

        let credit = self.net_credit();
        let contracts = self.quantity as f64 * CONTRACT_MULTIPLIER;
        let put_width = short_put.strike - long_put.strike;
        let call_width = long_call.strike - short_call.strike;
        let max_width = put_width.max(call_width);

        Some(CondorProfile {
            net_credit: credit,
            max_profit: credit * contracts,
            max_loss: (max_width - credit) * contracts,
            breakevens: [short_put.strike - credit, short_call.strike + credit],
        })
    }
}
