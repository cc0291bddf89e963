use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// What an availability rule is keyed on. Exactly one per rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleTarget {
    /// Recurring rule, 0 = Sunday .. 6 = Saturday.
    Weekday(u32),
    /// One-off rule for a single calendar date.
    Date(NaiveDate),
}

/// A blocking rule: either the whole day or a set of hours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRule {
    pub id: i32,
    pub target: RuleTarget,
    pub unavailable_hours: Vec<u32>,
    pub all_day: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AvailabilityRule {
    pub fn day_of_week(&self) -> Option<u32> {
        match self.target {
            RuleTarget::Weekday(day) => Some(day),
            RuleTarget::Date(_) => None,
        }
    }

    pub fn specific_date(&self) -> Option<NaiveDate> {
        match self.target {
            RuleTarget::Date(date) => Some(date),
            RuleTarget::Weekday(_) => None,
        }
    }

    /// Whether this rule blocks `hour`.
    pub fn blocks(&self, hour: u32) -> bool {
        self.all_day || self.unavailable_hours.contains(&hour)
    }
}

/// The mutable part of a rule, as sent by admins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBlock {
    pub unavailable_hours: Vec<u32>,
    pub all_day: bool,
}

/// Result of a find-or-create on a rule target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created,
    Updated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayRuleRequest {
    pub day_of_week: i64,
    #[serde(default)]
    pub unavailable_hours: Vec<i64>,
    #[serde(default)]
    pub all_day: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificDateRuleRequest {
    #[serde(default)]
    pub specific_date: String,
    #[serde(default)]
    pub unavailable_hours: Vec<i64>,
    #[serde(default)]
    pub all_day: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRuleRequest {
    #[serde(default)]
    pub unavailable_hours: Vec<i64>,
    #[serde(default)]
    pub all_day: bool,
}

/// Wire shape of a rule: the target is flattened into two nullable columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResponse {
    pub id: i32,
    pub day_of_week: Option<u32>,
    pub specific_date: Option<NaiveDate>,
    pub unavailable_hours: Vec<u32>,
    pub all_day: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AvailabilityRule> for RuleResponse {
    fn from(rule: AvailabilityRule) -> Self {
        Self {
            id: rule.id,
            day_of_week: rule.day_of_week(),
            specific_date: rule.specific_date(),
            unavailable_hours: rule.unavailable_hours,
            all_day: rule.all_day,
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleListResponse {
    pub rules: Vec<RuleResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMutationResponse {
    pub message: String,
    pub rule: RuleResponse,
}
