use async_trait::async_trait;
use eyre::Result;
use slotbook_core::{
    errors::{BookingError, BookingResult},
    models::rule::{AvailabilityRule, RuleBlock, RuleTarget, Upserted},
    repository::AvailabilityRuleRepository,
};

use crate::{
    DbPool,
    models::{DbAvailabilityRule, DbUpsertedRule, RULE_COLUMNS, hour_column, target_columns},
};

pub async fn get_rules(pool: &DbPool) -> Result<Vec<DbAvailabilityRule>> {
    let rules = sqlx::query_as::<_, DbAvailabilityRule>(&format!(
        r#"
        SELECT {RULE_COLUMNS}
        FROM availability_rules
        ORDER BY day_of_week IS NULL, day_of_week, specific_date
        "#
    ))
    .fetch_all(pool)
    .await?;

    Ok(rules)
}

pub async fn get_rule_by_id(pool: &DbPool, id: i32) -> Result<Option<DbAvailabilityRule>> {
    let rule = sqlx::query_as::<_, DbAvailabilityRule>(&format!(
        "SELECT {RULE_COLUMNS} FROM availability_rules WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(rule)
}

pub async fn get_rules_by_target(
    pool: &DbPool,
    target: RuleTarget,
) -> Result<Vec<DbAvailabilityRule>> {
    let (day_of_week, specific_date) = target_columns(target);
    let rules = sqlx::query_as::<_, DbAvailabilityRule>(&format!(
        r#"
        SELECT {RULE_COLUMNS}
        FROM availability_rules
        WHERE ($1::smallint IS NOT NULL AND day_of_week = $1)
           OR ($2::date IS NOT NULL AND specific_date = $2)
        ORDER BY id
        "#
    ))
    .bind(day_of_week)
    .bind(specific_date)
    .fetch_all(pool)
    .await?;

    Ok(rules)
}

/// Inserts the rule for `target` or overwrites the one already there. The
/// conflict target matches the partial unique index of the target column.
pub async fn upsert_rule(
    pool: &DbPool,
    target: RuleTarget,
    block: &RuleBlock,
) -> Result<DbUpsertedRule> {
    let (day_of_week, specific_date) = target_columns(target);
    let conflict_target = match target {
        RuleTarget::Weekday(_) => "(day_of_week) WHERE day_of_week IS NOT NULL",
        RuleTarget::Date(_) => "(specific_date) WHERE specific_date IS NOT NULL",
    };

    tracing::debug!("Upserting availability rule for {:?}", target);

    let rule = sqlx::query_as::<_, DbUpsertedRule>(&format!(
        r#"
        INSERT INTO availability_rules (day_of_week, specific_date, unavailable_hours, all_day)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT {conflict_target}
        DO UPDATE SET unavailable_hours = EXCLUDED.unavailable_hours,
                      all_day = EXCLUDED.all_day,
                      updated_at = NOW()
        RETURNING {RULE_COLUMNS}, (xmax = 0) AS inserted
        "#
    ))
    .bind(day_of_week)
    .bind(specific_date)
    .bind(hour_column(&block.unavailable_hours))
    .bind(block.all_day)
    .fetch_one(pool)
    .await?;

    Ok(rule)
}

pub async fn update_rule(pool: &DbPool, rule: &AvailabilityRule) -> Result<DbAvailabilityRule> {
    let updated = sqlx::query_as::<_, DbAvailabilityRule>(&format!(
        r#"
        UPDATE availability_rules
        SET unavailable_hours = $2, all_day = $3, updated_at = $4
        WHERE id = $1
        RETURNING {RULE_COLUMNS}
        "#
    ))
    .bind(rule.id)
    .bind(hour_column(&rule.unavailable_hours))
    .bind(rule.all_day)
    .bind(rule.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

pub async fn delete_rule(pool: &DbPool, id: i32) -> Result<u64> {
    let result = sqlx::query("DELETE FROM availability_rules WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete_rules_by_target(pool: &DbPool, target: RuleTarget) -> Result<u64> {
    let result = match target {
        RuleTarget::Weekday(day) => {
            sqlx::query("DELETE FROM availability_rules WHERE day_of_week = $1")
                .bind(day as i16)
                .execute(pool)
                .await?
        }
        RuleTarget::Date(date) => {
            sqlx::query("DELETE FROM availability_rules WHERE specific_date = $1")
                .bind(date)
                .execute(pool)
                .await?
        }
    };

    Ok(result.rows_affected())
}

#[derive(Clone)]
pub struct PgAvailabilityRuleRepository {
    pool: DbPool,
}

impl PgAvailabilityRuleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_domain(rows: Vec<DbAvailabilityRule>) -> BookingResult<Vec<AvailabilityRule>> {
    rows.into_iter()
        .map(|row| AvailabilityRule::try_from(row).map_err(BookingError::Database))
        .collect()
}

#[async_trait]
impl AvailabilityRuleRepository for PgAvailabilityRuleRepository {
    async fn list(&self) -> BookingResult<Vec<AvailabilityRule>> {
        into_domain(get_rules(&self.pool).await?)
    }

    async fn find(&self, id: i32) -> BookingResult<Option<AvailabilityRule>> {
        Ok(get_rule_by_id(&self.pool, id)
            .await?
            .map(AvailabilityRule::try_from)
            .transpose()?)
    }

    async fn find_by_target(&self, target: RuleTarget) -> BookingResult<Vec<AvailabilityRule>> {
        into_domain(get_rules_by_target(&self.pool, target).await?)
    }

    async fn upsert(
        &self,
        target: RuleTarget,
        block: &RuleBlock,
    ) -> BookingResult<(AvailabilityRule, Upserted)> {
        let row = upsert_rule(&self.pool, target, block).await?;
        let outcome = if row.inserted {
            Upserted::Created
        } else {
            Upserted::Updated
        };
        Ok((AvailabilityRule::try_from(row.rule)?, outcome))
    }

    async fn save(&self, rule: &AvailabilityRule) -> BookingResult<AvailabilityRule> {
        Ok(AvailabilityRule::try_from(update_rule(&self.pool, rule).await?)?)
    }

    async fn delete(&self, id: i32) -> BookingResult<bool> {
        Ok(delete_rule(&self.pool, id).await? > 0)
    }

    async fn delete_by_target(&self, target: RuleTarget) -> BookingResult<u64> {
        Ok(delete_rules_by_target(&self.pool, target).await?)
    }
}
