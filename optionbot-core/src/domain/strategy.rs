//! Strategy definitions: the unit a backtest is run against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported multi-leg strategy kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    #[serde(rename = "Iron Condor")]
    IronCondor,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::IronCondor => write!(f, "Iron Condor"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = StrategyError;

    /// Case-insensitive; accepts `iron condor`, `iron_condor` and `iron-condor`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "iron condor" => Ok(StrategyKind::IronCondor),
            _ => Err(StrategyError::UnknownKind(s.to_string())),
        }
    }
}

/// Expiration bucket of the legs relative to the entry day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpirationBucket {
    /// Legs expire on the entry day.
    #[serde(rename = "0DTE")]
    ZeroDte,
    /// Legs expire on the following trading day.
    #[serde(rename = "Next Day")]
    NextDay,
}

impl fmt::Display for ExpirationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpirationBucket::ZeroDte => write!(f, "0DTE"),
            ExpirationBucket::NextDay => write!(f, "Next Day"),
        }
    }
}

impl FromStr for ExpirationBucket {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "0dte" => Ok(ExpirationBucket::ZeroDte),
            "next day" | "nextday" => Ok(ExpirationBucket::NextDay),
            _ => Err(StrategyError::UnknownExpiration(s.to_string())),
        }
    }
}

/// Target deltas of the four iron condor legs.
///
/// Each value is a signed fraction: puts carry negative deltas, calls positive.
/// A stored strategy may leave legs unset; new strategies require all four.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IronCondorLegs {
    pub long_put: Option<f64>,
    pub short_put: Option<f64>,
    pub short_call: Option<f64>,
    pub long_call: Option<f64>,
}

impl IronCondorLegs {
    pub fn new(long_put: f64, short_put: f64, short_call: f64, long_call: f64) -> Self {
        Self {
            long_put: Some(long_put),
            short_put: Some(short_put),
            short_call: Some(short_call),
            long_call: Some(long_call),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.long_put.is_some()
            && self.short_put.is_some()
            && self.short_call.is_some()
            && self.long_call.is_some()
    }

    /// Require all four legs, each finite and on the correct side of zero.
    pub fn validate(&self) -> Result<(), StrategyError> {
        let puts = [("longPut", self.long_put), ("shortPut", self.short_put)];
        let calls = [("shortCall", self.short_call), ("longCall", self.long_call)];

        for (name, value) in puts {
            let delta = value.ok_or(StrategyError::MissingLeg(name))?;
            if !delta.is_finite() || !(-1.0..=0.0).contains(&delta) {
                return Err(StrategyError::DeltaOutOfRange { leg: name, delta });
            }
        }
        for (name, value) in calls {
            let delta = value.ok_or(StrategyError::MissingLeg(name))?;
            if !delta.is_finite() || !(0.0..=1.0).contains(&delta) {
                return Err(StrategyError::DeltaOutOfRange { leg: name, delta });
            }
        }
        Ok(())
    }
}

/// Strategy validation failures.
#[derive(Debug, Error, PartialEq)]
pub enum StrategyError {
    #[error("unknown strategy kind '{0}' (expected 'Iron Condor')")]
    UnknownKind(String),
    #[error("unknown expiration '{0}' (expected '0DTE' or 'Next Day')")]
    UnknownExpiration(String),
    #[error("symbol must not be empty")]
    EmptySymbol,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("leg '{0}' is required")]
    MissingLeg(&'static str),
    #[error("leg '{leg}' delta {delta} is out of range")]
    DeltaOutOfRange { leg: &'static str, delta: f64 },
}

/// A stored strategy definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub strategy: StrategyKind,
    pub expiration: ExpirationBucket,
    pub legs: IronCondorLegs,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

impl Strategy {
    /// Display name, e.g. `Iron Condor - SPY 0DTE`.
    pub fn display_name(kind: StrategyKind, symbol: &str, expiration: ExpirationBucket) -> String {
        format!("{kind} - {symbol} {expiration}")
    }

    /// Recompute `name` from the current kind, symbol and expiration.
    pub fn refresh_name(&mut self) {
        self.name = Self::display_name(self.strategy, &self.symbol, self.expiration);
    }
}

/// Fields accepted when creating a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStrategy {
    pub symbol: String,
    pub strategy: StrategyKind,
    pub expiration: ExpirationBucket,
    pub legs: IronCondorLegs,
    pub quantity: u32,
}

impl NewStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        validate_fields(&self.symbol, self.quantity, &self.legs)
    }

    /// Build the stored record. The caller supplies id and timestamp.
    pub fn into_strategy(self, id: String, created_at: DateTime<Utc>) -> Strategy {
        let symbol = normalize_symbol(&self.symbol);
        Strategy {
            name: Strategy::display_name(self.strategy, &symbol, self.expiration),
            id,
            symbol,
            strategy: self.strategy,
            expiration: self.expiration,
            legs: self.legs,
            quantity: self.quantity,
            created_at,
        }
    }
}

/// Partial update. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyPatch {
    pub symbol: Option<String>,
    pub strategy: Option<StrategyKind>,
    pub expiration: Option<ExpirationBucket>,
    pub legs: Option<IronCondorLegs>,
    pub quantity: Option<u32>,
}

impl StrategyPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to `strategy` and re-validate the result.
    ///
    /// `strategy` is only modified when the patched record is valid.
    pub fn apply(&self, strategy: &mut Strategy) -> Result<(), StrategyError> {
        let mut patched = strategy.clone();
        let renames = self.symbol.is_some() || self.strategy.is_some() || self.expiration.is_some();

        if let Some(symbol) = &self.symbol {
            patched.symbol = normalize_symbol(symbol);
        }
        if let Some(kind) = self.strategy {
            patched.strategy = kind;
        }
        if let Some(expiration) = self.expiration {
            patched.expiration = expiration;
        }
        if let Some(legs) = self.legs {
            patched.legs = legs;
        }
        if let Some(quantity) = self.quantity {
            patched.quantity = quantity;
        }

        validate_fields(&patched.symbol, patched.quantity, &patched.legs)?;
        if renames {
            patched.refresh_name();
        }
        *strategy = patched;
        Ok(())
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

fn validate_fields(symbol: &str, quantity: u32, legs: &IronCondorLegs) -> Result<(), StrategyError> {
    if symbol.trim().is_empty() {
        return Err(StrategyError::EmptySymbol);
    }
    if quantity == 0 {
        return Err(StrategyError::ZeroQuantity);
    }
    legs.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_condor() -> NewStrategy {
        NewStrategy {
            symbol: " spy ".into(),
            strategy: StrategyKind::IronCondor,
            expiration: ExpirationBucket::ZeroDte,
            legs: IronCondorLegs::new(-0.10, -0.20, 0.20, 0.10),
            quantity: 1,
        }
    }

    fn stored() -> Strategy {
        new_condor().into_strategy("abc".into(), Utc::now())
    }

    #[test]
    fn kind_and_bucket_parse_loosely() {
        assert_eq!("iron_condor".parse::<StrategyKind>(), Ok(StrategyKind::IronCondor));
        assert_eq!("Iron Condor".parse::<StrategyKind>(), Ok(StrategyKind::IronCondor));
        assert_eq!("0dte".parse::<ExpirationBucket>(), Ok(ExpirationBucket::ZeroDte));
        assert_eq!("next-day".parse::<ExpirationBucket>(), Ok(ExpirationBucket::NextDay));
        assert!("butterfly".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn enums_use_display_wire_strings() {
        assert_eq!(serde_json::to_value(StrategyKind::IronCondor).unwrap(), "Iron Condor");
        assert_eq!(serde_json::to_value(ExpirationBucket::NextDay).unwrap(), "Next Day");
        assert_eq!(serde_json::to_value(ExpirationBucket::ZeroDte).unwrap(), "0DTE");
    }

    #[test]
    fn into_strategy_normalizes_symbol_and_names() {
        let s = stored();
        assert_eq!(s.symbol, "SPY");
        assert_eq!(s.name, "Iron Condor - SPY 0DTE");
    }

    #[test]
    fn validate_rejects_missing_leg() {
        let mut req = new_condor();
        req.legs.short_call = None;
        assert_eq!(req.validate(), Err(StrategyError::MissingLeg("shortCall")));
    }

    #[test]
    fn validate_rejects_put_with_positive_delta() {
        let mut req = new_condor();
        req.legs.long_put = Some(0.15);
        assert!(matches!(
            req.validate(),
            Err(StrategyError::DeltaOutOfRange { leg: "longPut", .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_quantity_and_empty_symbol() {
        let mut req = new_condor();
        req.quantity = 0;
        assert_eq!(req.validate(), Err(StrategyError::ZeroQuantity));
        let mut req = new_condor();
        req.symbol = "  ".into();
        assert_eq!(req.validate(), Err(StrategyError::EmptySymbol));
    }

    #[test]
    fn patch_renames_when_symbol_changes() {
        let mut s = stored();
        let patch = StrategyPatch {
            symbol: Some("qqq".into()),
            ..Default::default()
        };
        patch.apply(&mut s).unwrap();
        assert_eq!(s.symbol, "QQQ");
        assert_eq!(s.name, "Iron Condor - QQQ 0DTE");
    }

    #[test]
    fn patch_quantity_keeps_name() {
        let mut s = stored();
        let before = s.name.clone();
        StrategyPatch {
            quantity: Some(3),
            ..Default::default()
        }
        .apply(&mut s)
        .unwrap();
        assert_eq!(s.quantity, 3);
        assert_eq!(s.name, before);
    }

    #[test]
    fn invalid_patch_leaves_strategy_untouched() {
        let mut s = stored();
        let before = s.clone();
        let result = StrategyPatch {
            quantity: Some(0),
            ..Default::default()
        }
        .apply(&mut s);
        assert_eq!(result, Err(StrategyError::ZeroQuantity));
        assert_eq!(s, before);
    }

    #[test]
    fn strategy_json_uses_camel_case() {
        let json = serde_json::to_value(stored()).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["legs"]["longPut"], -0.10);
        assert_eq!(json["strategy"], "Iron Condor");
    }
}
