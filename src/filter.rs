//! Filtering criteria for transaction queries.
//!
//! A [TransactionFilter] is an explicit description of which transactions a
//! query should match. Every field is optional; an unset field places no
//! restriction. Store implementations convert the filter into SQL conditions
//! with [TransactionFilter::to_sql_conditions].

use std::ops::RangeInclusive;

use rusqlite::types::Value;
use time::{Date, macros::time};

use crate::models::{Category, TransactionType, UserId};

/// Criteria restricting which transactions a query returns.
///
/// The default filter matches every transaction owned by the querying user.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Only match transactions of this type.
    pub kind: Option<TransactionType>,
    /// Only match transactions in this category.
    pub category: Option<Category>,
    /// Only match transactions recorded within these dates, inclusive on
    /// both ends.
    pub date_range: Option<RangeInclusive<Date>>,
}

impl TransactionFilter {
    /// Convert the filter into SQL `WHERE` clause parts and their parameters.
    ///
    /// The first condition always restricts rows to `owner`, so the returned
    /// vectors are never empty. Conditions use positional placeholders
    /// numbered from `?1` in the order the parameters appear.
    pub(crate) fn to_sql_conditions(&self, owner: UserId) -> (Vec<String>, Vec<Value>) {
        let mut conditions = vec!["user_id = ?1".to_string()];
        let mut params = vec![Value::Integer(owner.as_i64())];

        if let Some(kind) = self.kind {
            conditions.push(format!("type = ?{}", params.len() + 1));
            params.push(Value::Text(kind.as_str().to_string()));
        }

        if let Some(category) = self.category {
            conditions.push(format!("category = ?{}", params.len() + 1));
            params.push(Value::Text(category.as_str().to_string()));
        }

        if let Some(date_range) = &self.date_range {
            conditions.push(format!(
                "created_at BETWEEN ?{} AND ?{}",
                params.len() + 1,
                params.len() + 2
            ));
            params.push(Value::Integer(day_start(*date_range.start())));
            params.push(Value::Integer(day_end(*date_range.end())));
        }

        (conditions, params)
    }
}

/// The first second of `date` as a unix timestamp.
fn day_start(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

/// The last second of `date` as a unix timestamp.
fn day_end(date: Date) -> i64 {
    date.with_time(time!(23:59:59)).assume_utc().unix_timestamp()
}

#[cfg(test)]
mod transaction_filter_tests {
    use rusqlite::types::Value;
    use time::macros::date;

    use crate::{
        filter::TransactionFilter,
        models::{Category, TransactionType, UserId},
    };

    #[test]
    fn empty_filter_only_restricts_owner() {
        let filter = TransactionFilter::default();

        let (conditions, params) = filter.to_sql_conditions(UserId::new(42));

        assert_eq!(conditions, vec!["user_id = ?1".to_string()]);
        assert_eq!(params, vec![Value::Integer(42)]);
    }

    #[test]
    fn full_filter_produces_all_conditions_in_order() {
        let filter = TransactionFilter {
            kind: Some(TransactionType::Expense),
            category: Some(Category::Food),
            date_range: Some(date!(2025 - 09 - 01)..=date!(2025 - 09 - 30)),
        };

        let (conditions, params) = filter.to_sql_conditions(UserId::new(1));

        assert_eq!(
            conditions,
            vec![
                "user_id = ?1".to_string(),
                "type = ?2".to_string(),
                "category = ?3".to_string(),
                "created_at BETWEEN ?4 AND ?5".to_string(),
            ]
        );
        assert_eq!(
            params,
            vec![
                Value::Integer(1),
                Value::Text("expense".to_string()),
                Value::Text("food".to_string()),
                Value::Integer(1756684800),
                Value::Integer(1759276799),
            ]
        );
    }

    #[test]
    fn date_range_covers_whole_days() {
        let filter = TransactionFilter {
            kind: None,
            category: None,
            date_range: Some(date!(2025 - 01 - 01)..=date!(2025 - 01 - 01)),
        };

        let (_, params) = filter.to_sql_conditions(UserId::new(1));

        let Value::Integer(start) = params[1] else {
            panic!("want integer start timestamp, got {:?}", params[1]);
        };
        let Value::Integer(end) = params[2] else {
            panic!("want integer end timestamp, got {:?}", params[2]);
        };

        assert_eq!(end - start, 86_399, "a single day spans 86400 seconds");
    }
}
