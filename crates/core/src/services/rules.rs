use std::sync::Arc;

use tracing::info;

use crate::{
    errors::{BookingError, BookingResult},
    models::rule::{
        RuleBlock, RuleResponse, RuleTarget, SpecificDateRuleRequest, UpdateRuleRequest, Upserted,
        WeekdayRuleRequest,
    },
    repository::AvailabilityRuleRepository,
    validation,
};

/// Validates the hour list of a rule, dropping duplicates.
pub fn rule_block(unavailable_hours: &[i64], all_day: bool) -> BookingResult<RuleBlock> {
    let mut hours = unavailable_hours
        .iter()
        .map(|hour| validation::check_hour(*hour))
        .collect::<BookingResult<Vec<u32>>>()?;
    hours.sort_unstable();
    hours.dedup();

    Ok(RuleBlock {
        unavailable_hours: hours,
        all_day,
    })
}

pub fn parse_weekday(day: i64) -> BookingResult<u32> {
    if (0..=6).contains(&day) {
        Ok(day as u32)
    } else {
        Err(BookingError::validation("Invalid day of week"))
    }
}

/// Admin management of weekday and specific-date blocking rules.
#[derive(Clone)]
pub struct RuleService {
    rules: Arc<dyn AvailabilityRuleRepository>,
}

impl RuleService {
    pub fn new(rules: Arc<dyn AvailabilityRuleRepository>) -> Self {
        Self { rules }
    }

    pub async fn list(&self) -> BookingResult<Vec<RuleResponse>> {
        let rules = self.rules.list().await?;
        Ok(rules.into_iter().map(RuleResponse::from).collect())
    }

    pub async fn upsert_weekday(
        &self,
        request: &WeekdayRuleRequest,
    ) -> BookingResult<(RuleResponse, Upserted)> {
        let day = parse_weekday(request.day_of_week)?;
        let block = rule_block(&request.unavailable_hours, request.all_day)?;
        self.upsert(RuleTarget::Weekday(day), block).await
    }

    pub async fn upsert_specific_date(
        &self,
        request: &SpecificDateRuleRequest,
    ) -> BookingResult<(RuleResponse, Upserted)> {
        let date = validation::parse_date(&request.specific_date)?;
        let block = rule_block(&request.unavailable_hours, request.all_day)?;
        self.upsert(RuleTarget::Date(date), block).await
    }

    async fn upsert(
        &self,
        target: RuleTarget,
        block: RuleBlock,
    ) -> BookingResult<(RuleResponse, Upserted)> {
        let (rule, outcome) = self.rules.upsert(target, &block).await?;
        info!("Availability rule {} {:?} ({:?})", rule.id, target, outcome);
        Ok((rule.into(), outcome))
    }

    pub async fn update(&self, id: i32, request: &UpdateRuleRequest) -> BookingResult<RuleResponse> {
        let block = rule_block(&request.unavailable_hours, request.all_day)?;
        let mut rule = self
            .rules
            .find(id)
            .await?
            .ok_or_else(|| BookingError::not_found("Rule"))?;

        rule.unavailable_hours = block.unavailable_hours;
        rule.all_day = block.all_day;
        rule.updated_at = chrono::Utc::now();

        let rule = self.rules.save(&rule).await?;
        info!("Availability rule {} updated", rule.id);
        Ok(rule.into())
    }

    pub async fn delete(&self, id: i32) -> BookingResult<()> {
        if !self.rules.delete(id).await? {
            return Err(BookingError::not_found("Rule"));
        }
        info!("Availability rule {} deleted", id);
        Ok(())
    }

    pub async fn delete_weekday(&self, day: &str) -> BookingResult<()> {
        let day = day
            .trim()
            .parse::<i64>()
            .map_err(|_| BookingError::validation("Invalid day of week"))
            .and_then(parse_weekday)?;
        self.delete_target(RuleTarget::Weekday(day)).await
    }

    pub async fn delete_specific_date(&self, date: &str) -> BookingResult<()> {
        let date = validation::parse_date(date)?;
        self.delete_target(RuleTarget::Date(date)).await
    }

    async fn delete_target(&self, target: RuleTarget) -> BookingResult<()> {
        if self.rules.delete_by_target(target).await? == 0 {
            return Err(BookingError::not_found("Rule"));
        }
        info!("Availability rule for {:?} deleted", target);
        Ok(())
    }
}
