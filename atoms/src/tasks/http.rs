use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::draft::TaskDraft;
use super::model::TaskPayload;
use super::service;
use crate::executions::model::{seed_checklist, TaskChecklist};
use crate::executions::session::generate_test_id;
use crate::respond::{self, Accepted};

/// Parses and validates a task form body into its persisted shape.
fn accept_draft(body: &[u8]) -> Result<Accepted<TaskPayload>, Error> {
    let draft: TaskDraft = match respond::parse_body(body)? {
        Ok(draft) => draft,
        Err(resp) => return Ok(Err(resp)),
    };
    let errors = draft.validate();
    if !errors.is_empty() {
        tracing::info!("Rejected task submission: {}", errors);
        return respond::invalid(&errors).map(Err);
    }
    Ok(Ok(draft.into_payload()))
}

/// HTTP Handler: GET /tasks
pub async fn list_tasks(
    client: &DynamoClient,
    table_name: &str,
    search: Option<&str>,
) -> Result<Response<Body>, Error> {
    match service::load_tasks(client, table_name).await {
        Ok(tasks) => {
            let matching: Vec<_> = match search {
                Some(term) => tasks.into_iter().filter(|t| t.matches_search(term)).collect(),
                None => tasks,
            };
            respond::json(StatusCode::OK, &matching)
        }
        Err(e) => respond::store_error(e),
    }
}

/// HTTP Handler: POST /tasks
pub async fn create_task(
    client: &DynamoClient,
    table_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload = match accept_draft(body)? {
        Ok(payload) => payload,
        Err(resp) => return Ok(resp),
    };

    match service::create_task(client, table_name, payload).await {
        Ok(task) => respond::json(StatusCode::CREATED, &task),
        Err(e) => respond::store_error(e),
    }
}

/// HTTP Handler: GET /tasks/{id}
pub async fn get_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    match service::get_task(client, table_name, task_id).await {
        Ok(task) => respond::json(StatusCode::OK, &task),
        Err(e) => respond::store_error(e),
    }
}

/// HTTP Handler: PUT /tasks/{id}
pub async fn update_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload = match accept_draft(body)? {
        Ok(payload) => payload,
        Err(resp) => return Ok(resp),
    };

    match service::update_task(client, table_name, task_id, payload).await {
        Ok(task) => respond::json(StatusCode::OK, &task),
        Err(e) => respond::store_error(e),
    }
}

/// HTTP Handler: DELETE /tasks/{id}
pub async fn delete_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    match service::delete_task(client, table_name, task_id).await {
        Ok(()) => respond::no_content(),
        Err(e) => respond::store_error(e),
    }
}

/// HTTP Handler: GET /tasks/{id}/checklist
///
/// What an execution form shows right after the task is picked.
pub async fn get_task_checklist(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    match service::get_task(client, table_name, task_id).await {
        Ok(task) => respond::json(
            StatusCode::OK,
            &TaskChecklist {
                test_cases: seed_checklist(&task.test_cases),
                task_id: task.task_id,
                test_id: generate_test_id(),
            },
        ),
        Err(e) => respond::store_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_draft_becomes_field_errors() {
        let resp = accept_draft(br#"{"tags":[],"description":"  ","test_cases":[""]}"#)
            .unwrap()
            .unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json: serde_json::Value = serde_json::from_slice(resp.body().as_ref()).unwrap();
        assert_eq!(json["errors"]["tags"], "At least one tag is required");
        assert_eq!(json["errors"]["description"], "Description is required");
        assert_eq!(json["errors"]["test_cases"], "At least one test case is required");
    }

    #[test]
    fn valid_draft_drops_blank_slots() {
        let payload = accept_draft(
            br#"{"tags":["smoke"],"description":"Login flow","test_cases":["Valid login","","Invalid password"]}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(payload.test_cases, vec!["Valid login", "Invalid password"]);
    }
}
