// events.rs
//! Dispatch on the `X-GitHub-Event` type.
//!
//! Every field read goes through `serde_json::Value` indexing, which yields
//! `Null` for missing keys and for non-object parents, so dispatch never fails.

use axum::http::StatusCode;
use serde_json::{json, Value};

pub const PUSH_EVENT: &str = "push";
pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// Build the response body for a verified delivery.
pub fn dispatch(event_type: Option<&str>, payload: &Value) -> (StatusCode, Value) {
    match event_type {
        Some(PUSH_EVENT) => (
            StatusCode::OK,
            json!({
                "message": "Push event received",
                "repository": payload["repository"]["name"],
                "branch": branch_name(payload),
            }),
        ),
        Some(PULL_REQUEST_EVENT) => (
            StatusCode::OK,
            json!({
                "message": "Pull request event received",
                "action": payload["action"],
                "pr_number": payload["pull_request"]["number"],
            }),
        ),
        // Absent type reads `None` in the message, `null` in `event_type`.
        other => (
            StatusCode::OK,
            json!({
                "message": format!("Received {} event", other.unwrap_or("None")),
                "event_type": other,
            }),
        ),
    }
}

/// Last `/`-delimited segment of `ref`, e.g. `refs/heads/main` -> `main`.
fn branch_name(payload: &Value) -> &str {
    payload["ref"]
        .as_str()
        .and_then(|git_ref| git_ref.rsplit('/').next())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_event() {
        let payload = json!({
            "ref": "refs/heads/main",
            "repository": { "name": "repo1", "full_name": "octo/repo1" },
        });

        let (status, body) = dispatch(Some("push"), &payload);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "message": "Push event received",
                "repository": "repo1",
                "branch": "main",
            })
        );
    }

    #[test]
    fn test_push_branch_uses_last_segment() {
        let payload = json!({ "ref": "refs/heads/feature/login" });
        let (_, body) = dispatch(Some("push"), &payload);
        assert_eq!(body["branch"], "login");

        let payload = json!({ "ref": "main" });
        let (_, body) = dispatch(Some("push"), &payload);
        assert_eq!(body["branch"], "main");

        let payload = json!({ "ref": "refs/tags/" });
        let (_, body) = dispatch(Some("push"), &payload);
        assert_eq!(body["branch"], "");
    }

    #[test]
    fn test_push_missing_fields() {
        let (status, body) = dispatch(Some("push"), &json!({}));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["repository"], Value::Null);
        assert_eq!(body["branch"], "");

        let payload = json!({ "ref": "", "repository": null });
        let (_, body) = dispatch(Some("push"), &payload);
        assert_eq!(body["repository"], Value::Null);
        assert_eq!(body["branch"], "");
    }

    #[test]
    fn test_pull_request_event() {
        let payload = json!({
            "action": "opened",
            "pull_request": { "number": 42, "title": "Add feature" },
        });

        let (status, body) = dispatch(Some("pull_request"), &payload);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "message": "Pull request event received",
                "action": "opened",
                "pr_number": 42,
            })
        );
    }

    #[test]
    fn test_pull_request_missing_fields() {
        let (_, body) = dispatch(Some("pull_request"), &json!({ "action": "closed" }));
        assert_eq!(body["action"], "closed");
        assert_eq!(body["pr_number"], Value::Null);
    }

    #[test]
    fn test_unknown_event() {
        let (status, body) = dispatch(Some("issues"), &json!({ "action": "opened" }));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "message": "Received issues event",
                "event_type": "issues",
            })
        );
    }

    #[test]
    fn test_absent_event_type() {
        let (status, body) = dispatch(None, &json!({}));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Received None event");
        assert_eq!(body["event_type"], Value::Null);
    }

    #[test]
    fn test_event_type_is_case_sensitive() {
        let (_, body) = dispatch(Some("Push"), &json!({ "ref": "refs/heads/main" }));
        assert_eq!(body["message"], "Received Push event");
    }

    #[test]
    fn test_non_object_payloads_never_fail() {
        for payload in [json!([1, 2, 3]), json!("text"), json!(null), json!(7)] {
            let (status, body) = dispatch(Some("push"), &payload);
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["repository"], Value::Null);
            assert_eq!(body["branch"], "");

            let (status, body) = dispatch(Some("pull_request"), &payload);
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["action"], Value::Null);
        }
    }

    #[test]
    fn test_non_string_ref_yields_empty_branch() {
        let (_, body) = dispatch(Some("push"), &json!({ "ref": 12 }));
        assert_eq!(body["branch"], "");
    }
}
