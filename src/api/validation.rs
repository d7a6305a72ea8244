use actix_web::HttpResponse;
use serde::Serialize;

/// Error body shared by every endpoint
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub fields: serde_json::Value,
}

fn bad_request(error: &str, fields: serde_json::Map<String, serde_json::Value>) -> actix_web::Error {
    let error_response = ErrorResponse {
        error: error.to_string(),
        fields: serde_json::Value::Object(fields),
    };
    actix_web::error::InternalError::from_response("", HttpResponse::BadRequest().json(error_response))
        .into()
}

/// Creates a configured JsonConfig with standardized error handling for the entire project
///
/// Deserializer messages are not echoed back; the client gets a fixed hint
/// per failure kind.
pub fn json_config() -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default()
        .error_handler(|err, _req| {
            let mut fields = serde_json::Map::new();

            match err {
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
                        fields.insert(field.to_string(), serde_json::json!({"errors": messages}));
                    }
                    bad_request("Validation failed", fields)
                }
                actix_web_validator::Error::Deserialize(de_err) => {
                    let message = if de_err.to_string().contains("missing field") {
                        "Missing required field. Expected {\"name\": string}"
                    } else {
                        "Invalid JSON format"
                    };
                    fields.insert("message".to_string(), serde_json::json!(message));
                    bad_request("Request validation failed", fields)
                }
                actix_web_validator::Error::JsonPayloadError(payload_err) => {
                    let message = match payload_err {
                        actix_web::error::JsonPayloadError::ContentType => {
                            "Content-Type must be application/json"
                        }
                        actix_web::error::JsonPayloadError::OverflowKnownLength { .. }
                        | actix_web::error::JsonPayloadError::Overflow { .. } => {
                            "Request body is too large"
                        }
                        _ => "Invalid JSON format",
                    };
                    fields.insert("message".to_string(), serde_json::json!(message));
                    bad_request("Request validation failed", fields)
                }
                _ => {
                    fields.insert("message".to_string(), serde_json::json!("Validation error"));
                    bad_request("Validation failed", fields)
                }
            }
        })
}
