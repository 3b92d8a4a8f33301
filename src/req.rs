use reqwest::{header::CONTENT_TYPE, StatusCode};

use crate::api::Problem;

pub(crate) type ReqResult<T> = std::result::Result<T, Problem>;

pub(crate) async fn req_handle_error(res: reqwest::Response) -> ReqResult<reqwest::Response> {
    // ok responses pass through
    if res.status().is_success() {
        return Ok(res);
    }

    let status = res.status();
    let is_problem_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/problem+json"));

    let body = req_safe_read_body(res).await;

    let problem = if is_problem_json {
        // if we were sent a problem+json, deserialize it
        serde_json::from_str(&body).unwrap_or_else(|err| Problem {
            _type: "problemJsonFail".into(),
            detail: Some(format!(
                "Failed to deserialize application/problem+json ({err}) body: {body}"
            )),
        })
    } else if status == StatusCode::NOT_FOUND {
        Problem {
            _type: "notFound".into(),
            detail: Some(format!("{status} body: {body}")),
        }
    } else {
        // some other problem
        Problem {
            _type: "httpReqError".into(),
            detail: Some(format!("{status} body: {body}")),
        }
    };

    Err(problem)
}

pub(crate) async fn req_safe_read_body(res: reqwest::Response) -> String {
    // a truncated body is still worth reporting
    res.text().await.unwrap_or_default()
}
