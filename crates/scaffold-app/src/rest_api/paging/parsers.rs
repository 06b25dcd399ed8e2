use scaffold_dal::Order;

use crate::error::{ApiError, ApiResult};

/// Parses `name,-other,+third`, leading `-` means descending
pub(super) fn parse_ordering(orderings: &str) -> ApiResult<Vec<Order>> {
    orderings
        .split(',')
        .map(|name| {
            let (field_name, descending) = match name.trim() {
                "" => return Err(ApiError::BadRequest("Empty ordering name".to_string())),
                name if name.len() > 100 => {
                    return Err(ApiError::BadRequest("Ordering name too long".to_string()))
                }
                name if name.starts_with('+') => (&name[1..], false),
                name if name.starts_with('-') => (&name[1..], true),
                name => (name, false),
            };

            let order = if descending {
                Order::Desc(field_name.to_string())
            } else {
                Order::Asc(field_name.to_string())
            };

            Ok(order)
        })
        .collect::<Result<Vec<_>, _>>()
}

/// Lenient number parsing, anything unparsable is treated as absent
pub(super) fn parse_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}
