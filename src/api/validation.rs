use actix_web::{HttpResponse, web};
use serde::Serialize;
use validator::ValidationErrors;

/// Key validator uses for struct-level (schema) errors
const SCHEMA_KEY: &str = "__all__";

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub fields: serde_json::Value,
}

/// Creates a configured JsonConfig with standardized error handling for the entire project
pub fn json_config() -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default().error_handler(|err, _req| bad_request(err))
}

/// Same error shape for query strings
pub fn query_config() -> actix_web_validator::QueryConfig {
    actix_web_validator::QueryConfig::default().error_handler(|err, _req| bad_request(err))
}

/// Unparseable path ids answer 404 in the same error shape
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req| {
        let error_response = ErrorResponse {
            error: "Not found".to_string(),
            fields: serde_json::json!({
                "message": format!("No resource at {}: {}", req.path(), err)
            }),
        };
        actix_web::error::InternalError::from_response(
            "",
            HttpResponse::NotFound().json(error_response)
        ).into()
    })
}

/// Flatten validation failures into one human readable line
pub fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Validation error in field: {}", field))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

fn field_name(field: &str) -> &str {
    if field == SCHEMA_KEY { "non_field" } else { field }
}

fn malformed_message(err_string: &str) -> &'static str {
    if err_string.contains("EOF while parsing") {
        "Request body is empty. Expected JSON payload"
    } else if err_string.contains("unknown variant") {
        "Invalid enum value. Check allowed values for this field"
    } else if err_string.contains("invalid digit")
        || err_string.contains("invalid characters")
        || err_string.contains("premature end of input")
        || err_string.contains("input is out of range")
    {
        "Invalid value. Dates use YYYY-MM-DD and ids are integers"
    } else {
        "Invalid request format"
    }
}

fn bad_request(err: actix_web_validator::Error) -> actix_web::Error {
    let mut fields = serde_json::Map::new();

    let error = match err {
        actix_web_validator::Error::Validate(validation_errors) => {
            for (field, errors) in validation_errors.field_errors() {
                let messages: Vec<String> = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Validation error in field: {}", field))
                    })
                    .collect();
                fields.insert(
                    field_name(&field).to_string(),
                    serde_json::json!({"errors": messages})
                );
            }
            "Validation failed"
        }
        other => {
            let err_string = other.to_string();
            fields.insert(
                "message".to_string(),
                serde_json::json!(malformed_message(&err_string))
            );
            "Request validation failed"
        }
    };

    let error_response = ErrorResponse {
        error: error.to_string(),
        fields: serde_json::Value::Object(fields),
    };
    actix_web::error::InternalError::from_response(
        "",
        HttpResponse::BadRequest().json(error_response)
    ).into()
}
