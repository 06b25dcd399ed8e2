pub mod entity;
pub mod error;
pub mod movie;
pub mod project;
pub mod validation;

use std::str::FromStr as _;

pub use entity::{Column, ColumnKind, Entity, Record, Repository};
pub use error::Error;
pub use sqlx::Error as SqlxError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type ChosenRow = sqlx::sqlite::SqliteRow;
pub type ChosenConnection = sqlx::SqliteConnection;
pub type ChosenQuery<'q> =
    sqlx::query::Query<'q, ChosenDB, <ChosenDB as sqlx::Database>::Arguments<'q>>;
pub type Pool = sqlx::Pool<ChosenDB>;

pub const MAX_LIMIT: usize = 10_000;

pub async fn new_pool(database_url: &str) -> Result<Pool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(50)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    Asc(String),
    Desc(String),
}

impl AsRef<str> for Order {
    fn as_ref(&self) -> &str {
        match self {
            Order::Asc(s) => s.as_str(),
            Order::Desc(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingParams {
    pub offset: i64,
    pub limit: i64,
    pub order: Option<Vec<Order>>,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_LIMIT as i64,
            order: None,
        }
    }
}

impl ListingParams {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            order: None,
        }
    }

    pub fn with_order(mut self, order: Vec<Order>) -> Self {
        self.order = Some(order);
        self
    }

    /// Builds `ORDER BY` clause content for entity `T`.
    ///
    /// Requested fields are API attribute names, they are resolved to columns,
    /// unknown or unsortable fields are rejected. `id` closes the ordering,
    /// so records with equal keys keep insertion order.
    pub fn ordering<T: Entity>(&self) -> Result<String> {
        let mut has_id = false;
        let mut ordering = self
            .order
            .iter()
            .flatten()
            .map(|o| {
                let column =
                    T::sort_column(o.as_ref()).ok_or_else(|| Error::InvalidOrderByField {
                        field: o.as_ref().to_string(),
                        entity: T::NAME,
                    })?;
                has_id |= column == "id";
                Ok(match o {
                    Order::Asc(_) => column.to_string(),
                    Order::Desc(_) => format!("{} DESC", column),
                })
            })
            .collect::<Result<Vec<String>>>()?;
        if !has_id {
            ordering.push("id".to_string());
        }
        Ok(ordering.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectAttributes;

    #[test]
    fn test_default_ordering_is_by_id() {
        let params = ListingParams::default();
        assert_eq!("id", params.ordering::<ProjectAttributes>().unwrap());
    }

    #[test]
    fn test_composite_ordering() {
        let params = ListingParams::new(0, 10).with_order(vec![
            Order::Asc("teamSize".to_string()),
            Order::Desc("startDate".to_string()),
        ]);
        assert_eq!(
            "team_size, start_date DESC, id",
            params.ordering::<ProjectAttributes>().unwrap()
        );

        let params = ListingParams::new(0, 10).with_order(vec![Order::Desc("id".to_string())]);
        assert_eq!("id DESC", params.ordering::<ProjectAttributes>().unwrap());
    }

    #[test]
    fn test_invalid_ordering() {
        let params =
            ListingParams::new(0, 10).with_order(vec![Order::Asc("myUnknownField".to_string())]);
        let err = params.ordering::<ProjectAttributes>().unwrap_err();
        assert_eq!(
            "myUnknownField column was not found in the Project entity.",
            err.to_string()
        );
    }

    #[test]
    fn test_ordering_by_text_column() {
        let params =
            ListingParams::new(0, 10).with_order(vec![Order::Desc("description".to_string())]);
        assert_eq!(
            "description DESC, id",
            params.ordering::<ProjectAttributes>().unwrap()
        );
    }
}
