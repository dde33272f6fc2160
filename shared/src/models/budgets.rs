use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::events::UnknownStatus;

/// Treasurer decision on a budget line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BudgetStatus {
    Pending,
    Granted,
    Denied,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Pending => "Pending",
            BudgetStatus::Granted => "Granted",
            BudgetStatus::Denied => "Denied",
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(BudgetStatus::Pending),
            "granted" => Ok(BudgetStatus::Granted),
            "denied" => Ok(BudgetStatus::Denied),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl Serialize for BudgetStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BudgetStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A budget line item attached to an event request. Costs stay as the
/// backend's decimal strings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    pub id: i64,
    pub event: i64,
    pub item_name: String,
    #[serde(default)]
    pub item_quantity: u32,
    #[serde(default)]
    pub item_cost: String,
    #[serde(default)]
    pub total_cost: String,
    pub budget_status: BudgetStatus,
}

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetTally {
    pub pending: usize,
    pub granted: usize,
    pub denied: usize,
}

impl BudgetTally {
    pub fn of(budgets: &[Budget]) -> Self {
        budgets
            .iter()
            .fold(Self::default(), |mut tally, budget| {
                match budget.budget_status {
                    BudgetStatus::Pending => tally.pending += 1,
                    BudgetStatus::Granted => tally.granted += 1,
                    BudgetStatus::Denied => tally.denied += 1,
                }
                tally
            })
    }
}
