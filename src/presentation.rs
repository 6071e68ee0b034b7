//! Response shaping for whatever boundary calls the category engine.
//!
//! The engine returns one typed result. Callers pick a shape here: API clients get a
//! JSON payload with a status code, and form submissions get a redirect carrying a flash
//! message. Infrastructure failures are logged and replaced with a generic message.

use crate::errors::{Error, ErrorKind, Result};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

/// Kind of client that sent the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    /// Programmatic client expecting JSON
    Api,
    /// Traditional form submission expecting a redirect
    Browser,
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    /// The operation went through
    Success,
    /// The operation was rejected or failed
    Error,
}

/// One-shot message shown after a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    /// Severity
    pub level: FlashLevel,
    /// Text for the user
    pub message: String,
}

/// Response handed back to the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Machine-readable payload
    Json {
        /// HTTP-style status code
        status: u16,
        /// Response body
        body: Value,
    },
    /// Redirect with a flash message
    Redirect {
        /// Where to send the browser
        location: String,
        /// Message to display there
        flash: Flash,
    },
}

/// Status code for an error kind.
#[must_use]
pub const fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::Validation | ErrorKind::InvalidParent | ErrorKind::CircularReference => 422,
        ErrorKind::NotFound => 404,
        ErrorKind::CascadeBlocked => 409,
        ErrorKind::Infrastructure => 500,
    }
}

/// User-facing text for an error, hiding infrastructure details.
fn public_message(err: &Error) -> String {
    if err.is_infrastructure() {
        error!(error = %err, "internal failure surfaced to client");
        GENERIC_FAILURE.to_string()
    } else {
        err.to_string()
    }
}

fn error_response(err: &Error, client: ClientKind, redirect_to: &str) -> Response {
    let message = public_message(err);
    match client {
        ClientKind::Api => {
            let mut body = json!({ "success": false, "message": message });
            if let Some(field) = err.field() {
                body["errors"] = json!({ field: [message] });
            }
            Response::Json {
                status: status_for(err.kind()),
                body,
            }
        }
        ClientKind::Browser => Response::Redirect {
            location: redirect_to.to_string(),
            flash: Flash {
                level: FlashLevel::Error,
                message,
            },
        },
    }
}

/// Turns an operation result into a response for `client`.
///
/// `success_message` builds the confirmation text from the successful value. Browser
/// clients are redirected to `redirect_to` in both outcomes.
pub fn respond<T, F>(
    result: Result<T>,
    client: ClientKind,
    redirect_to: &str,
    success_message: F,
) -> Response
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    let value = match result {
        Ok(value) => value,
        Err(err) => return error_response(&err, client, redirect_to),
    };

    let message = success_message(&value);
    match client {
        ClientKind::Api => match serde_json::to_value(&value) {
            Ok(data) => Response::Json {
                status: 200,
                body: json!({ "success": true, "message": message, "data": data }),
            },
            Err(e) => {
                error!(error = %e, "failed to serialize response payload");
                Response::Json {
                    status: 500,
                    body: json!({ "success": false, "message": GENERIC_FAILURE }),
                }
            }
        },
        ClientKind::Browser => Response::Redirect {
            location: redirect_to.to_string(),
            flash: Flash {
                level: FlashLevel::Success,
                message,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        CategoryScope,
        category::{self, CategoryInput, StatusChange},
    };
    use crate::errors::CascadeBlock;
    use crate::test_utils::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Validation), 422);
        assert_eq!(status_for(ErrorKind::CircularReference), 422);
        assert_eq!(status_for(ErrorKind::InvalidParent), 422);
        assert_eq!(status_for(ErrorKind::NotFound), 404);
        assert_eq!(status_for(ErrorKind::CascadeBlocked), 409);
        assert_eq!(status_for(ErrorKind::Infrastructure), 500);
    }

    #[test]
    fn test_api_error_carries_field_errors() {
        let result: Result<()> = Err(Error::validation("name", "The category name is required."));
        let response = respond(result, ClientKind::Api, "/categories", |_| String::new());

        let Response::Json { status, body } = response else {
            panic!("expected JSON response");
        };
        assert_eq!(status, 422);
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"]["name"][0], "The category name is required.");
    }

    #[test]
    fn test_browser_error_redirects_with_flash() {
        let result: Result<()> = Err(Error::CascadeBlocked(CascadeBlock::HasChildren { count: 2 }));
        let response = respond(result, ClientKind::Browser, "/admin/categories", |_| {
            String::new()
        });

        assert_eq!(
            response,
            Response::Redirect {
                location: "/admin/categories".to_string(),
                flash: Flash {
                    level: FlashLevel::Error,
                    message: "Cannot delete category. It has 2 sub-category(s).".to_string(),
                },
            }
        );
    }

    #[test]
    fn test_infrastructure_errors_are_redacted() {
        let result: Result<()> = Err(Error::Database(sea_orm::DbErr::Custom(
            "disk I/O error at /var/lib/db".to_string(),
        )));
        let Response::Json { status, body } =
            respond(result, ClientKind::Api, "/categories", |_| String::new())
        else {
            panic!("expected JSON response");
        };
        assert_eq!(status, 500);
        assert_eq!(body["message"], GENERIC_FAILURE);
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_toggle_status_responses() -> Result<()> {
        let db = setup_test_db().await?;
        let created =
            category::create_category(&db, CategoryScope::Global, CategoryInput::new("Herbs"))
                .await?;

        let result = category::toggle_status(&db, CategoryScope::Global, created.id).await;
        let response = respond(result, ClientKind::Api, "/categories", |change: &StatusChange| {
            format!("Category {} successfully.", change.verb())
        });
        let Response::Json { status, body } = response else {
            panic!("expected JSON response");
        };
        assert_eq!(status, 200);
        assert_eq!(body["message"], "Category deactivated successfully.");
        assert_eq!(body["data"]["category"]["is_active"], false);
        assert_eq!(body["data"]["category"]["name"], "Herbs");

        let result = category::toggle_status(&db, CategoryScope::Global, created.id).await;
        let response = respond(result, ClientKind::Browser, "/categories", |change| {
            format!("Category {} successfully.", change.verb())
        });
        assert_eq!(
            response,
            Response::Redirect {
                location: "/categories".to_string(),
                flash: Flash {
                    level: FlashLevel::Success,
                    message: "Category activated successfully.".to_string(),
                },
            }
        );

        Ok(())
    }
}
