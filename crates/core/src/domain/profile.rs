use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl ProfileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileCategory {
    Dev,
    Devops,
    Design,
    Management,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileLevel {
    Junior,
    Standard,
    Senior,
}

impl ProfileCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Devops => "devops",
            Self::Design => "design",
            Self::Management => "management",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for ProfileCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "devops" => Ok(Self::Devops),
            "design" => Ok(Self::Design),
            "management" => Ok(Self::Management),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown profile category `{other}`")),
        }
    }
}

impl ProfileLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Standard => "standard",
            Self::Senior => "senior",
        }
    }
}

impl std::str::FromStr for ProfileLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "junior" => Ok(Self::Junior),
            "standard" => Ok(Self::Standard),
            "senior" => Ok(Self::Senior),
            other => Err(format!("unknown profile level `{other}`")),
        }
    }
}

/// Staffing profile with its standard daily rate (TJM) and its default share of the
/// project workload, in percent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TjmProfile {
    pub id: ProfileId,
    pub name: String,
    pub category: ProfileCategory,
    pub level: ProfileLevel,
    pub tjm: Decimal,
    pub default_percentage: Decimal,
    #[serde(default)]
    pub sort: i64,
}

impl TjmProfile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tjm: Decimal,
        default_percentage: Decimal,
    ) -> Self {
        Self {
            id: ProfileId::new(id),
            name: name.into(),
            category: ProfileCategory::Other,
            level: ProfileLevel::Standard,
            tjm,
            default_percentage,
            sort: 0,
        }
    }

    pub fn with_category(mut self, category: ProfileCategory, level: ProfileLevel) -> Self {
        self.category = category;
        self.level = level;
        self
    }

    pub fn with_sort(mut self, sort: i64) -> Self {
        self.sort = sort;
        self
    }
}
