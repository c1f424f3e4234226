use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Technical stack tier. A is the enterprise bundle, B the standard one and C the
/// lightweight one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StackTier {
    A,
    B,
    C,
}

/// Monthly infrastructure cost band, in euros.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfraCost {
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDefinition {
    pub tier: StackTier,
    pub infra_cost: InfraCost,
}

impl StackTier {
    pub const ALL: [StackTier; 3] = [StackTier::A, StackTier::B, StackTier::C];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }

    pub fn definition(self) -> StackDefinition {
        let (min, max) = match self {
            Self::A => (50, 300),
            Self::B => (25, 80),
            Self::C => (5, 30),
        };
        StackDefinition {
            tier: self,
            infra_cost: InfraCost { min: Decimal::from(min), max: Decimal::from(max) },
        }
    }
}

impl fmt::Display for StackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StackTier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            other => Err(format!("unknown stack tier `{other}` (expected A|B|C)")),
        }
    }
}
