//! Repository layer for database operations

/// Append `, column = $n` to an UPDATE builder when the field is present.
/// The column names listed at each call site form the entity's write allow-list.
macro_rules! push_set {
    ($builder:expr, $field:expr, $column:literal) => {
        if let Some(value) = $field.clone() {
            $builder.push(concat!(", ", $column, " = ")).push_bind(value);
        }
    };
}

pub mod badges;
pub mod bands;
pub mod checkins;
pub mod events;
pub mod reviews;
pub mod users;
pub mod venues;

use sqlx::{
    postgres::PgArguments,
    query::{QueryAs, QueryScalar},
    Pool, Postgres,
};
use uuid::Uuid;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub venues: venues::VenuesRepository,
    pub bands: bands::BandsRepository,
    pub reviews: reviews::ReviewsRepository,
    pub events: events::EventsRepository,
    pub checkins: checkins::CheckinsRepository,
    pub badges: badges::BadgesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            venues: venues::VenuesRepository::new(pool.clone()),
            bands: bands::BandsRepository::new(pool.clone()),
            reviews: reviews::ReviewsRepository::new(pool.clone()),
            events: events::EventsRepository::new(pool.clone()),
            checkins: checkins::CheckinsRepository::new(pool.clone()),
            badges: badges::BadgesRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connectivity probe used by the readiness endpoint
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// A value bound to a dynamic WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Float(f64),
    Int(i32),
    Uuid(Uuid),
    OptionalUuid(Option<Uuid>),
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Float(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(v)
    }
}

impl From<Uuid> for FilterValue {
    fn from(v: Uuid) -> Self {
        FilterValue::Uuid(v)
    }
}

impl From<Option<Uuid>> for FilterValue {
    fn from(v: Option<Uuid>) -> Self {
        FilterValue::OptionalUuid(v)
    }
}

/// Dynamic WHERE clause shared by a count query and a page query
#[derive(Debug, Default)]
pub struct Filters {
    conditions: Vec<String>,
    values: Vec<FilterValue>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value without a condition and return its placeholder index
    pub fn push_value(&mut self, value: impl Into<FilterValue>) -> usize {
        self.values.push(value.into());
        self.values.len()
    }

    /// Add a condition; every `{}` in the template becomes the value's placeholder
    pub fn add(&mut self, template: &str, value: impl Into<FilterValue>) {
        let idx = self.push_value(value);
        self.conditions.push(template.replace("{}", &format!("${}", idx)));
    }

    /// Add a condition without a bound value
    pub fn add_raw(&mut self, condition: &str) {
        self.conditions.push(condition.to_string());
    }

    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn bind_as<'q, O>(
        &self,
        mut query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for value in &self.values {
            query = match value.clone() {
                FilterValue::Text(v) => query.bind(v),
                FilterValue::Float(v) => query.bind(v),
                FilterValue::Int(v) => query.bind(v),
                FilterValue::Uuid(v) => query.bind(v),
                FilterValue::OptionalUuid(v) => query.bind(v),
            };
        }
        query
    }

    pub fn bind_scalar<'q, O>(
        &self,
        mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    ) -> QueryScalar<'q, Postgres, O, PgArguments> {
        for value in &self.values {
            query = match value.clone() {
                FilterValue::Text(v) => query.bind(v),
                FilterValue::Float(v) => query.bind(v),
                FilterValue::Int(v) => query.bind(v),
                FilterValue::Uuid(v) => query.bind(v),
                FilterValue::OptionalUuid(v) => query.bind(v),
            };
        }
        query
    }
}

/// `%term%` pattern for ILIKE searches
pub fn like_pattern(term: &str) -> String {
    format!("%{}%", term.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters() {
        assert_eq!(Filters::new().where_clause(), "");
    }

    #[test]
    fn test_placeholders_are_numbered_in_order() {
        let mut filters = Filters::new();
        filters.add_raw("v.is_active = TRUE");
        filters.add("(v.name ILIKE {} OR v.city ILIKE {})", like_pattern(" crocodile "));
        filters.add("v.average_rating >= {}", 4.0);
        assert_eq!(
            filters.where_clause(),
            "WHERE v.is_active = TRUE AND (v.name ILIKE $1 OR v.city ILIKE $1) AND v.average_rating >= $2"
        );
        assert_eq!(filters.values[0], FilterValue::Text("%crocodile%".to_string()));
    }

    #[test]
    fn test_push_value_reserves_placeholder() {
        let mut filters = Filters::new();
        assert_eq!(filters.push_value(Some(Uuid::nil())), 1);
        filters.add("c.user_id = {}", Uuid::nil());
        assert_eq!(filters.where_clause(), "WHERE c.user_id = $2");
    }
}
