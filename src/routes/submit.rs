use std::{fmt::Debug, net::SocketAddr};

use actix_web::{web, HttpRequest, HttpResponse, ResponseError};

use crate::{
    domain::{ErrorCode, FormMessage, SubmissionRequest},
    listener::{FormListener, FormServices},
    util::{error_chain_fmt, see_other},
};

#[derive(serde::Serialize)]
pub struct SubmitResult {
    form_id: u32,
    success: bool,
    errors: Vec<ErrorCode>,
    messages: Vec<FormMessage>,
}

#[tracing::instrument(
    name = "handling form submission",
    skip_all,
    fields(client_ip = tracing::field::Empty)
)]
pub async fn submit(
    request: HttpRequest,
    form: web::Form<Vec<(String, String)>>,
    query: web::Query<Vec<(String, String)>>,
    services: web::Data<FormServices>,
) -> Result<HttpResponse, SubmitError> {
    let submission = submission_request(&request, form.into_inner(), query.into_inner());
    tracing::Span::current().record("client_ip", submission.client_ip());

    let mut listener = FormListener::new(services.get_ref().clone());
    if !listener.listen(&submission).await {
        return Err(SubmitError::NotAFormSubmission);
    }

    if let Some(url) = listener.redirect() {
        return Ok(see_other(url.as_str()));
    }

    let form = listener
        .submitted_form
        .ok_or_else(|| anyhow::anyhow!("the listener handled a submission without a form."))?;

    Ok(HttpResponse::Ok().json(SubmitResult {
        form_id: form.id(),
        success: !form.has_errors(),
        errors: form.errors().to_vec(),
        messages: form.response_messages(),
    }))
}

fn submission_request(
    request: &HttpRequest,
    post: Vec<(String, String)>,
    query: Vec<(String, String)>,
) -> SubmissionRequest {
    let client_ip = request
        .connection_info()
        .realip_remote_addr()
        .map(|addr| match addr.parse::<SocketAddr>() {
            Ok(addr) => addr.ip().to_string(),
            Err(_) => addr.to_owned(),
        })
        .unwrap_or_default();
    let is_async = request
        .headers()
        .get("X-Requested-With")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("XMLHttpRequest"));

    SubmissionRequest::new(post, query, client_ip, is_async)
}

#[derive(thiserror::Error)]
pub enum SubmitError {
    #[error("The request is not a form submission.")]
    NotAFormSubmission,
    #[error("Something went wrong.")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubmitError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            SubmitError::NotAFormSubmission => actix_web::http::StatusCode::BAD_REQUEST,
            SubmitError::UnexpectedError(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
