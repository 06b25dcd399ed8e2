use std::marker::PhantomData;

use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::Row as _;
use tracing::debug;

use crate::{
    ChosenConnection, ChosenQuery, ChosenRow, ListingParams, MAX_LIMIT,
    error::{Error, Result},
};

/// Type of value stored in a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
    Boolean,
}

impl ColumnKind {
    /// Message for an attribute value of another type
    pub fn type_message(&self) -> &'static str {
        match self {
            ColumnKind::Text => "must be a string",
            ColumnKind::Integer => "must be an integer number",
            ColumnKind::Real => "must be a number",
            ColumnKind::Boolean => "must be a boolean value",
        }
    }
}

/// Mapping of one entity attribute to its table column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// column name, same as struct field name
    pub name: &'static str,
    /// attribute name as visible in API
    pub attribute: &'static str,
    pub kind: ColumnKind,
    pub sortable: bool,
}

/// Attributes of an entity stored in a table row.
///
/// Implement by `#[derive(scaffold_macros::Entity)]` on a struct named
/// `<Entity>Attributes`. All attributes are optional, so the same type can
/// represent a partial input, which is then checked by `garde` validation.
pub trait Entity:
    Serialize + DeserializeOwned + Validate<Context = ()> + Send + Sync + Unpin + Sized + 'static
{
    const NAME: &'static str;
    const TABLE: &'static str;
    /// Resource type in API
    const KIND: &'static str;
    const COLUMNS: &'static [Column];

    /// Binds all column values, in `COLUMNS` order
    fn bind_columns<'q>(&self, query: ChosenQuery<'q>) -> ChosenQuery<'q>;

    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error>;

    fn column_list() -> String {
        Self::COLUMNS
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn sort_column(attribute: &str) -> Option<&'static str> {
        if attribute == "id" {
            return Some("id");
        }
        Self::COLUMNS
            .iter()
            .find(|c| c.sortable && c.attribute == attribute)
            .map(|c| c.name)
    }

    fn attribute_name(column: &str) -> Option<&'static str> {
        Self::COLUMNS
            .iter()
            .find(|c| c.name == column || c.attribute == column)
            .map(|c| c.attribute)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub id: i64,
    pub attributes: T,
}

impl<T: Entity> Record<T> {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        Ok(Record {
            id: row.try_get("id")?,
            attributes: T::from_row(row)?,
        })
    }
}

/// Generic CRUD repository, works within given connection (or transaction)
pub struct Repository<'c, T> {
    conn: &'c mut ChosenConnection,
    entity: PhantomData<T>,
}

impl<'c, T: Entity> Repository<'c, T> {
    pub fn new(conn: &'c mut ChosenConnection) -> Self {
        Self {
            conn,
            entity: PhantomData,
        }
    }

    pub async fn create(&mut self, attributes: &T) -> Result<Record<T>> {
        let placeholders = vec!["?"; T::COLUMNS.len()].join(", ");
        let insert_cmd = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::TABLE,
            T::column_list(),
            placeholders
        );
        let result = attributes
            .bind_columns(sqlx::query(&insert_cmd))
            .execute(&mut *self.conn)
            .await?;

        let id = result.last_insert_rowid();
        debug!("Created {} with id {}", T::NAME, id);
        self.get(id).await
    }

    pub async fn update(&mut self, id: i64, attributes: &T) -> Result<Record<T>> {
        let update_fields = T::COLUMNS
            .iter()
            .map(|c| format!("{} = ?", c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let update_cmd = format!("UPDATE {} SET {} WHERE id = ?", T::TABLE, update_fields);
        let result = attributes
            .bind_columns(sqlx::query(&update_cmd))
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound {
                entity: T::NAME,
                id,
            })
        } else {
            self.get(id).await
        }
    }

    pub async fn count(&mut self) -> Result<u64> {
        let count_cmd = format!("SELECT count(*) FROM {}", T::TABLE);
        let count: i64 = sqlx::query_scalar(&count_cmd)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn list(&mut self, params: &ListingParams) -> Result<Vec<Record<T>>> {
        let order = params.ordering::<T>()?;
        let select_many_query = format!(
            "SELECT id, {} FROM {} ORDER BY {} LIMIT ? OFFSET ?",
            T::column_list(),
            T::TABLE,
            order
        );
        let records = sqlx::query(&select_many_query)
            .bind(params.limit)
            .bind(params.offset)
            .fetch(&mut *self.conn)
            .take(MAX_LIMIT)
            .map(|row| Record::from_row(&row?))
            .try_collect::<Vec<_>>()
            .await?;
        Ok(records)
    }

    pub async fn delete(&mut self, id: i64) -> Result<()> {
        let delete_cmd = format!("DELETE FROM {} WHERE id = ?", T::TABLE);
        let res = sqlx::query(&delete_cmd)
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound {
                entity: T::NAME,
                id,
            })
        } else {
            debug!("Deleted {} with id {}", T::NAME, id);
            Ok(())
        }
    }

    pub async fn find(&mut self, id: i64) -> Result<Option<Record<T>>> {
        let select_one_query = format!(
            "SELECT id, {} FROM {} WHERE id = ?",
            T::column_list(),
            T::TABLE
        );
        let row = sqlx::query(&select_one_query)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        let record = row.map(|row| Record::from_row(&row)).transpose()?;
        Ok(record)
    }

    pub async fn get(&mut self, id: i64) -> Result<Record<T>> {
        self.find(id).await?.ok_or(Error::RecordNotFound {
            entity: T::NAME,
            id,
        })
    }
}
