use serde_json::json;
use tracing::debug;

use crate::error::SessionError;
use crate::extract::{Strategy, non_empty_string, probe_body};
use crate::http::HttpRequest;
use crate::metrics::Group;
use crate::pipeline::PipelineContext;

use super::{Credentials, Token, Worker};

fn top_level_access_token(body: &serde_json::Value) -> Option<String> {
    non_empty_string(body, &["access_token"])
}

fn top_level_token(body: &serde_json::Value) -> Option<String> {
    non_empty_string(body, &["token"])
}

fn nested_data_token(body: &serde_json::Value) -> Option<String> {
    non_empty_string(body, &["data", "token"])
}

/// Accepted login response shapes, highest priority first.
pub const TOKEN_STRATEGIES: [Strategy<String>; 3] = [
    Strategy {
        name: "access_token",
        probe: top_level_access_token,
    },
    Strategy {
        name: "token",
        probe: top_level_token,
    },
    Strategy {
        name: "data.token",
        probe: nested_data_token,
    },
];

/// Returns the worker's cached token, logging in on first use.
///
/// The login uses credential record `(index - 1) mod len`. A failed login
/// caches nothing, so the next iteration tries again.
///
/// # Errors
///
/// Returns an error when the login call does not succeed or the response
/// carries no token in any accepted shape.
pub async fn acquire_token(
    worker: &mut Worker,
    context: &PipelineContext,
) -> Result<Token, SessionError> {
    if let Some(token) = worker.session.token() {
        return Ok(token.clone());
    }

    let worker_index = worker.index();
    let credentials = context
        .users
        .get(worker.credential_index())
        .and_then(Credentials::from_record)
        .ok_or(SessionError::NoCredentials {
            worker: worker_index,
        })?;

    let body = json!({
        "email": credentials.email,
        "password": credentials.password,
    })
    .to_string();
    let request = HttpRequest::post(context.endpoints.login(), body)
        .header("Content-Type", "application/json")
        .header("Accept", "application/json");

    worker.session.note_login_call();
    let response = context.client.request(request).await;
    context
        .metrics
        .record_request(Group::Login, response.status, response.elapsed);
    context
        .metrics
        .record_check(Group::Login, "login 200", response.status == 200);

    let token = probe_body(&TOKEN_STRATEGIES, &response.body);
    context
        .metrics
        .record_check(Group::Login, "have token", token.is_some());

    if !response.is_success() {
        return Err(SessionError::Authentication {
            worker: worker_index,
            status: response.status,
        });
    }
    let (shape, value) = token.ok_or(SessionError::MissingToken {
        worker: worker_index,
    })?;
    debug!(
        "Worker {} logged in as {} (token from '{}')",
        worker_index, credentials.email, shape
    );

    let token = Token::new(value);
    worker.session.store(token.clone());
    Ok(token)
}
