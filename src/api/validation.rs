use axum::{Json, extract::rejection::JsonRejection};
use validator::{Validate, ValidationErrors};

use super::ApiError;
use super::error::FieldErrors;

pub const MAX_PAGE_SIZE: i64 = 1000;

/// Checks the 1-based page window requested by a client.
pub fn validate_page(page_number: i64, page_size: i64) -> Result<(u64, u64), ApiError> {
    let mut fields = FieldErrors::new();

    if page_number < 1 {
        fields
            .entry("pageNumber".to_string())
            .or_default()
            .push(format!("must be at least 1, got {page_number}"));
    }

    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        fields
            .entry("pageSize".to_string())
            .or_default()
            .push(format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"));
    }

    if !fields.is_empty() {
        return Err(ApiError::invalid_fields(fields));
    }

    Ok((page_number.unsigned_abs(), page_size.unsigned_abs()))
}

/// Unwraps a JSON body and runs its field validators.
pub fn validated_body<T: Validate>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(payload) = body.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    payload.validate().map_err(field_errors)?;
    Ok(payload)
}

pub fn field_errors(errors: ValidationErrors) -> ApiError {
    let mut fields = FieldErrors::new();

    for (field, errs) in errors.field_errors() {
        let messages = errs
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map_or_else(|| e.code.to_string(), ToString::to_string)
            })
            .collect();
        fields.insert(camel_case(&field), messages);
    }

    ApiError::invalid_fields(fields)
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
