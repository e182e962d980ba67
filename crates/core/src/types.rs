//! Core type definitions

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, CoreResult};

/// Fraction digits used when a token amount is displayed without an explicit precision
pub const DEFAULT_DISPLAY_PRECISION: usize = 2;

/// Network identifier reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub u64);

impl NetworkId {
    pub const MAINNET: NetworkId = NetworkId(1);
    pub const ROPSTEN: NetworkId = NetworkId(3);
    pub const RINKEBY: NetworkId = NetworkId(4);
    pub const KOVAN: NetworkId = NetworkId(42);

    pub fn id(&self) -> u64 {
        self.0
    }

    pub fn name(&self) -> &'static str {
        match self.0 {
            1 => "mainnet",
            3 => "ropsten",
            4 => "rinkeby",
            42 => "kovan",
            _ => "development",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

impl From<u64> for NetworkId {
    fn from(id: u64) -> Self {
        NetworkId(id)
    }
}

/// Token amount with proper decimal handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub raw: U256,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Parse a human-entered decimal string ("12.5") into raw units.
    ///
    /// Parsing is exact: more fraction digits than `decimals` is an error
    /// rather than a silent rounding.
    pub fn parse(text: &str, decimals: u8) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidAmount {
            input: text.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = text.trim();
        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("empty amount"));
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("only digits and one decimal point are allowed"));
        }
        if frac_part.len() > decimals as usize {
            return Err(invalid("too many fraction digits for token precision"));
        }

        let mut digits = String::with_capacity(int_part.len() + decimals as usize);
        digits.push_str(if int_part.is_empty() { "0" } else { int_part });
        digits.push_str(frac_part);
        digits.extend(std::iter::repeat('0').take(decimals as usize - frac_part.len()));

        let raw = digits
            .parse::<U256>()
            .map_err(|e| invalid(&e.to_string()))?;

        Ok(Self { raw, decimals })
    }

    /// Fixed-point rendering truncated to `precision` fraction digits
    pub fn format(&self, precision: usize) -> String {
        let digits = self.raw.to_string();
        let decimals = self.decimals as usize;

        // at least one integer digit
        let padded = if digits.len() <= decimals {
            format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - decimals);

        if precision == 0 {
            return int_part.to_string();
        }

        let mut frac: String = frac_part.chars().take(precision).collect();
        while frac.len() < precision {
            frac.push('0');
        }
        format!("{}.{}", int_part, frac)
    }

    pub fn to_human(&self) -> f64 {
        let divisor = 10f64.powi(self.decimals as i32);
        // Convert U256 to f64 safely
        let raw_f64: f64 = self.raw.to_string().parse().unwrap_or(0.0);
        raw_f64 / divisor
    }

    /// Estimated USD value at the given unit price
    pub fn value_usd(&self, price: f64) -> f64 {
        self.to_human() * price
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(DEFAULT_DISPLAY_PRECISION))
    }
}

/// A field that is fetched from a fallible source.
///
/// Keeps "the source failed" distinct from a legitimate zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fetched<T> {
    Available(T),
    Unavailable,
}

impl<T> Fetched<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Fetched::Available(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Fetched::Available(v) => Some(v),
            Fetched::Unavailable => None,
        }
    }
}

impl<T: Clone + Default> Fetched<T> {
    /// Value, or the type's default when the source failed
    pub fn value_or_default(&self) -> T {
        self.as_option().cloned().unwrap_or_default()
    }
}

/// Wallet connector a session is attached through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    MetaMask,
    WalletConnect,
    /// Read-only network access, never has an account
    #[default]
    Infura,
}

impl Connector {
    pub fn name(&self) -> &'static str {
        match self {
            Connector::MetaMask => "MetaMask",
            Connector::WalletConnect => "WalletConnect",
            Connector::Infura => "Infura",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Connector::Infura)
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Where a market's symbol came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolSource {
    OnChain,
    KnownTable,
    Unknown,
}
