//! Shape checks for the resources carried in a successful envelope's `data`.
//!
//! Each entity is validated by composing a handful of field predicates, so
//! every rule can be exercised on its own. A field that is absent or `null`
//! yields `MissingResource`; a field that is present with the wrong type or
//! value yields `InvalidResource`.

use serde_json::{Map, Value};

use crate::endpoint::expand;
use crate::error::{ApiError, Resource};
use crate::types::{Placeholder, Template};

type Object = Map<String, Value>;

fn field<'a>(obj: &'a Object, name: &'static str, resource: Resource) -> Result<&'a Value, ApiError> {
    obj.get(name)
        .filter(|v| !v.is_null())
        .ok_or(ApiError::missing(resource, name))
}

pub(crate) fn string_field<'a>(
    obj: &'a Object,
    name: &'static str,
    resource: Resource,
) -> Result<&'a str, ApiError> {
    field(obj, name, resource)?
        .as_str()
        .ok_or_else(|| ApiError::invalid(resource, format!("`{name}` is not a string")))
}

pub(crate) fn count_field(obj: &Object, name: &'static str, resource: Resource) -> Result<u64, ApiError> {
    let value = field(obj, name, resource)?;
    if !value.is_i64() && !value.is_u64() {
        return Err(ApiError::invalid(resource, format!("`{name}` is not an integer")));
    }
    value
        .as_u64()
        .ok_or_else(|| ApiError::invalid(resource, format!("`{name}` is negative")))
}

pub(crate) fn array_field<'a>(
    obj: &'a Object,
    name: &'static str,
    resource: Resource,
) -> Result<&'a Vec<Value>, ApiError> {
    field(obj, name, resource)?
        .as_array()
        .ok_or_else(|| ApiError::invalid(resource, format!("`{name}` is not an array")))
}

fn as_object(value: &Value, resource: Resource) -> Result<&Object, ApiError> {
    value
        .as_object()
        .ok_or_else(|| ApiError::invalid(resource, "list entry is not an object"))
}

fn expect_id(actual: &str, expected: Option<&str>, resource: Resource) -> Result<(), ApiError> {
    match expected {
        Some(expected) if expected != actual => Err(ApiError::invalid(
            resource,
            format!("id `{actual}` does not match requested `{expected}`"),
        )),
        _ => Ok(()),
    }
}

/// Validate one placeholder. With `expected_id`, this is a fetch-by-id result
/// and must also carry `rawData` and the requested id.
pub fn placeholder(obj: &Object, expected_id: Option<&str>) -> Result<Placeholder, ApiError> {
    const R: Resource = Resource::Placeholder;

    let id = string_field(obj, "id", R)?;
    let name = string_field(obj, "name", R)?;
    let last_modification_date = string_field(obj, "lastModificationDate", R)?;
    let number_of_referenced_templates = count_field(obj, "numberOfReferencedTemplates", R)?;

    let raw_data = match expected_id {
        Some(_) => {
            let raw = string_field(obj, "rawData", R)?;
            expect_id(id, expected_id, R)?;
            Some(raw.to_string())
        }
        None => None,
    };

    Ok(Placeholder {
        id: id.to_string(),
        name: name.to_string(),
        last_modification_date: last_modification_date.to_string(),
        number_of_referenced_templates,
        raw_data,
    })
}

/// Validate a `{placeholders: [...]}` list.
pub fn placeholders(obj: &Object) -> Result<Vec<Placeholder>, ApiError> {
    array_field(obj, "placeholders", Resource::Placeholders)?
        .iter()
        .map(|entry| placeholder(as_object(entry, Resource::Placeholder)?, None))
        .collect()
}

/// Validate one template. With `expected_id`, this is a fetch-by-id result
/// and must also carry `usedPlaceholders` (strings only) and the requested id.
pub fn template(obj: &Object, expected_id: Option<&str>) -> Result<Template, ApiError> {
    const R: Resource = Resource::Template;

    let id = string_field(obj, "id", R)?;
    let name = string_field(obj, "name", R)?;
    let last_modification_date = string_field(obj, "lastModificationDate", R)?;
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);

    let used_placeholders = match expected_id {
        Some(_) => {
            let used = array_field(obj, "usedPlaceholders", R)?
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| {
                        ApiError::invalid(R, "`usedPlaceholders` contains a non-string")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            expect_id(id, expected_id, R)?;
            Some(used)
        }
        None => None,
    };

    Ok(Template {
        id: id.to_string(),
        name: name.to_string(),
        last_modification_date: last_modification_date.to_string(),
        description,
        used_placeholders,
    })
}

/// Validate a `{templates: [...]}` list.
pub fn templates(obj: &Object) -> Result<Vec<Template>, ApiError> {
    array_field(obj, "templates", Resource::Templates)?
        .iter()
        .map(|entry| template(as_object(entry, Resource::Template)?, None))
        .collect()
}

/// Validate a `{url}` payload.
///
/// With `id`, the url must equal `expected` with `{id}` filled in. Without,
/// it must start with `expected` followed by `suffix`; an empty `expected`
/// and `suffix` accept any string.
pub fn url(obj: &Object, expected: &str, id: Option<&str>, suffix: &str) -> Result<String, ApiError> {
    const R: Resource = Resource::Url;

    let url = string_field(obj, "url", R)?;
    let ok = match id {
        Some(id) => url == expand(expected, id),
        None => url.starts_with(&format!("{expected}{suffix}")),
    };
    if !ok {
        return Err(ApiError::invalid(R, format!("unexpected URL `{url}`")));
    }
    Ok(url.to_string())
}

/// Validate a `{pdf}` payload and return the Base64 text.
pub fn pdf(obj: &Object) -> Result<String, ApiError> {
    string_field(obj, "pdf", Resource::Pdf).map(str::to_string)
}
