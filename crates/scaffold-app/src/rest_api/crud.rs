use std::{fmt::Display, marker::PhantomData};

use garde::Validate as _;
use scaffold_dal::{ChosenConnection, ColumnKind, Entity, Record, Repository};
use scaffold_types::ResourceObject;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::paging::Paging;
use crate::error::{ApiError, ApiResult, AttributeError};

/// Operations a controller can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudMethod {
    FindAll,
    FindByPk,
    Save,
    Create,
    Remove,
}

impl Display for CrudMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CrudMethod::FindAll => "findAll",
            CrudMethod::FindByPk => "findByPk",
            CrudMethod::Save => "save",
            CrudMethod::Create => "create",
            CrudMethod::Remove => "remove",
        };
        f.write_str(name)
    }
}

const ALL_METHODS: &[CrudMethod] = &[
    CrudMethod::FindAll,
    CrudMethod::FindByPk,
    CrudMethod::Save,
    CrudMethod::Create,
    CrudMethod::Remove,
];

const READ_ONLY_METHODS: &[CrudMethod] = &[CrudMethod::FindAll, CrudMethod::FindByPk];

/// Payload of successful response
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Data<T> {
    One(ResourceObject<T>),
    Many(Vec<ResourceObject<T>>),
}

/// Request inputs relevant for controller
#[derive(Debug, Default)]
pub struct CrudParams {
    pub id: Option<String>,
    pub paging: Paging,
    pub body: Option<Map<String, Value>>,
}

pub struct CrudController<T> {
    operations: &'static [CrudMethod],
    entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Default for CrudController<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> CrudController<T> {
    pub fn new() -> Self {
        CrudController {
            operations: ALL_METHODS,
            entity: PhantomData,
        }
    }

    pub fn read_only() -> Self {
        CrudController {
            operations: READ_ONLY_METHODS,
            entity: PhantomData,
        }
    }

    pub fn implements(&self, method: CrudMethod) -> bool {
        self.operations.contains(&method)
    }

    pub fn response_parser(record: Record<T>) -> ResourceObject<T> {
        ResourceObject {
            kind: T::KIND.to_string(),
            id: record.id,
            attributes: record.attributes,
        }
    }

    pub async fn create(
        &self,
        conn: &mut ChosenConnection,
        body: Map<String, Value>,
    ) -> ApiResult<ResourceObject<T>> {
        let attributes = checked_attributes::<T>(body)?;
        let record = Repository::<T>::new(conn).create(&attributes).await?;
        Ok(Self::response_parser(record))
    }

    pub async fn find_all(
        &self,
        conn: &mut ChosenConnection,
        paging: Paging,
        max_items: u32,
    ) -> ApiResult<Vec<ResourceObject<T>>> {
        let params = paging.into_listing_params(max_items)?;
        let records = Repository::<T>::new(conn).list(&params).await?;
        debug!("Listed {} {} records", records.len(), T::NAME);
        Ok(records.into_iter().map(Self::response_parser).collect())
    }

    pub async fn find_by_pk(
        &self,
        conn: &mut ChosenConnection,
        id: &str,
    ) -> ApiResult<ResourceObject<T>> {
        let id = parse_id(id)?;
        let record = Repository::<T>::new(conn).get(id).await?;
        Ok(Self::response_parser(record))
    }

    /// Merges `partial` over stored attributes, `null` values override too
    pub async fn save(
        &self,
        conn: &mut ChosenConnection,
        id: &str,
        partial: Map<String, Value>,
    ) -> ApiResult<ResourceObject<T>> {
        let id = parse_id(id)?;
        let mut repository = Repository::<T>::new(conn);
        let existing = repository.get(id).await?;
        let mut merged = match serde_json::to_value(&existing.attributes) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(ApiError::Internal(format!(
                    "{} attributes are not serialized as an object",
                    T::NAME
                )))
            }
            Err(e) => return Err(ApiError::Internal(e.to_string())),
        };
        merged.extend(partial);
        let attributes = checked_attributes::<T>(merged)?;
        let record = repository.update(id, &attributes).await?;
        Ok(Self::response_parser(record))
    }

    pub async fn remove(
        &self,
        conn: &mut ChosenConnection,
        id: &str,
    ) -> ApiResult<ResourceObject<T>> {
        let id = parse_id(id)?;
        let mut repository = Repository::<T>::new(conn);
        let record = repository.get(id).await?;
        repository.delete(id).await?;
        Ok(Self::response_parser(record))
    }

    /// Dispatches request to operation `method`
    pub async fn invoke(
        &self,
        method: CrudMethod,
        conn: &mut ChosenConnection,
        params: CrudParams,
        max_items: u32,
    ) -> ApiResult<Data<T>> {
        if !self.implements(method) {
            return Err(ApiError::NotImplemented(format!(
                "{} controller does not implement {method}",
                T::NAME
            )));
        }
        let CrudParams { id, paging, body } = params;
        let body = body.unwrap_or_default();
        let data = match method {
            CrudMethod::FindAll => Data::Many(self.find_all(conn, paging, max_items).await?),
            CrudMethod::Create => Data::One(self.create(conn, body).await?),
            CrudMethod::FindByPk => Data::One(self.find_by_pk(conn, required_id(&id)?).await?),
            CrudMethod::Save => Data::One(self.save(conn, required_id(&id)?, body).await?),
            CrudMethod::Remove => Data::One(self.remove(conn, required_id(&id)?).await?),
        };
        Ok(data)
    }
}

fn required_id(id: &Option<String>) -> ApiResult<&str> {
    id.as_deref()
        .ok_or_else(|| ApiError::Internal("Missing id path parameter".to_string()))
}

/// Ids are integers, anything else cannot be found
fn parse_id(id: &str) -> ApiResult<i64> {
    id.trim()
        .parse()
        .map_err(|_| ApiError::NotFound(id.to_string()))
}

fn matches_kind(kind: ColumnKind, value: &Value) -> bool {
    match kind {
        ColumnKind::Text => value.is_string(),
        ColumnKind::Integer => value.is_i64(),
        ColumnKind::Real => value.is_number(),
        ColumnKind::Boolean => value.is_boolean(),
    }
}

/// Replaces attribute values of a wrong JSON type by `null`, returning an error for each
fn type_errors<T: Entity>(body: &mut Map<String, Value>) -> Vec<AttributeError> {
    let mut errors = Vec::new();
    for column in T::COLUMNS {
        if let Some(value) = body.get_mut(column.attribute) {
            if !value.is_null() && !matches_kind(column.kind, value) {
                errors.push(AttributeError {
                    attribute: column.attribute.to_string(),
                    value: value.take(),
                    message: column.kind.type_message().to_string(),
                });
            }
        }
    }
    errors
}

fn from_body<T: Entity>(body: Map<String, Value>) -> ApiResult<T> {
    serde_json::from_value(Value::Object(body))
        .map_err(|e| ApiError::BadRequest(format!("Invalid {} attributes: {e}", T::NAME)))
}

/// Deserializes and validates attributes from request body.
///
/// Errors are ordered by attribute as declared in entity, an attribute with
/// wrong type is reported only for its type.
fn checked_attributes<T: Entity>(mut body: Map<String, Value>) -> ApiResult<T> {
    let type_errors = type_errors::<T>(&mut body);
    let attributes = from_body::<T>(body)?;
    let constraint_errors = match attributes.validate() {
        Ok(()) => Vec::new(),
        Err(report) => attribute_errors(&attributes, report),
    };
    if type_errors.is_empty() && constraint_errors.is_empty() {
        return Ok(attributes);
    }

    let mut errors = Vec::with_capacity(type_errors.len() + constraint_errors.len());
    for column in T::COLUMNS {
        match type_errors.iter().find(|e| e.attribute == column.attribute) {
            Some(type_error) => errors.push(type_error.clone()),
            None => errors.extend(
                constraint_errors
                    .iter()
                    .filter(|e| e.attribute == column.attribute)
                    .cloned(),
            ),
        }
    }
    errors.extend(
        constraint_errors
            .into_iter()
            .filter(|e| T::COLUMNS.iter().all(|c| c.attribute != e.attribute)),
    );
    Err(ApiError::InvalidAttributes(errors))
}

/// One error entry per violated constraint, values taken from the invalid entity
fn attribute_errors<T: Entity>(attributes: &T, report: garde::Report) -> Vec<AttributeError> {
    let values = serde_json::to_value(attributes).unwrap_or(Value::Null);
    report
        .iter()
        .map(|(path, error)| {
            let path = path.to_string();
            let attribute = T::attribute_name(&path)
                .map(str::to_string)
                .unwrap_or(path);
            let value = values.get(&attribute).cloned().unwrap_or(Value::Null);
            AttributeError {
                attribute,
                value,
                message: error.message().to_string(),
            }
        })
        .collect()
}
