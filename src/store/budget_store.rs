use crate::store::database::Database;
use crate::store::error::StoreError;
use crate::types::request_budget::RequestBudget;
use chrono::NaiveDate;
use sqlx::sqlite::SqlitePool;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Persisted per-day request counters, one row per calendar day.
#[derive(Clone)]
pub struct BudgetStore {
    pool: SqlitePool,
}

impl BudgetStore {
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }

    /// The budget recorded for `day`, or a fresh one if no request was made that day.
    pub async fn load(&self, day: NaiveDate) -> Result<RequestBudget, StoreError> {
        let count: Option<i64> = sqlx::query_scalar("SELECT count FROM request_budget WHERE day = ?1")
            .bind(day.format(DAY_FORMAT).to_string())
            .fetch_optional(&self.pool)
            .await?;

        match count {
            None => Ok(RequestBudget::fresh(day)),
            Some(count) => {
                let count = u32::try_from(count).map_err(|_| StoreError::NegativeCount(count))?;
                Ok(RequestBudget { date: day, count })
            }
        }
    }

    /// Writes `budget`, replacing any earlier count for its day. Committed on return.
    pub async fn save(&self, budget: RequestBudget) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO request_budget (day, count) VALUES (?1, ?2) \
             ON CONFLICT(day) DO UPDATE SET count = excluded.count",
        )
        .bind(budget.date.format(DAY_FORMAT).to_string())
        .bind(i64::from(budget.count))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 10, d).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_day_starts_fresh() -> Result<(), StoreError> {
        let db = Database::in_memory().await?;
        let budgets = BudgetStore::new(&db);
        assert_eq!(budgets.load(day(1)).await?, RequestBudget::fresh(day(1)));
        Ok(())
    }

    #[tokio::test]
    async fn test_saved_count_survives_a_new_store_handle() -> Result<(), StoreError> {
        let db = Database::in_memory().await?;
        BudgetStore::new(&db)
            .save(RequestBudget { date: day(2), count: 12 })
            .await?;
        BudgetStore::new(&db)
            .save(RequestBudget { date: day(2), count: 13 })
            .await?;

        let reopened = BudgetStore::new(&db);
        assert_eq!(reopened.load(day(2)).await?.count, 13);
        assert_eq!(reopened.load(day(3)).await?.count, 0);
        Ok(())
    }
}
