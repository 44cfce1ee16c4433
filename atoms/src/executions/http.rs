use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use std::collections::HashMap;

use super::model::{ExecutionPayload, ExecutionRow, ExecutionStatus, TestExecution};
use super::service;
use crate::error::StoreError;
use crate::respond;
use crate::tasks;

/// Rows for the executions table, filtered by search term and status.
pub fn filter_rows<'a>(
    executions: &'a [TestExecution],
    descriptions: &'a HashMap<String, String>,
    search: Option<&str>,
    status: Option<ExecutionStatus>,
) -> Vec<ExecutionRow<'a>> {
    executions
        .iter()
        .map(|e| (e, descriptions.get(&e.task_id).map(String::as_str)))
        .filter(|(e, _)| status.map_or(true, |s| e.status == s))
        .filter(|(e, desc)| search.map_or(true, |term| e.matches_search(term, *desc)))
        .map(|(e, desc)| ExecutionRow::new(e, desc))
        .collect()
}

/// HTTP Handler: GET /executions
pub async fn list_executions(
    client: &DynamoClient,
    table_name: &str,
    search: Option<&str>,
    status: Option<&str>,
) -> Result<Response<Body>, Error> {
    let status = match status.map(str::parse::<ExecutionStatus>).transpose() {
        Ok(status) => status,
        Err(e) => return respond::error(StatusCode::BAD_REQUEST, &e),
    };

    // Backend join: executions with the description of the task they reference
    let (executions_result, tasks_result) = tokio::join!(
        service::load_executions(client, table_name),
        tasks::service::load_tasks(client, table_name)
    );

    let executions = match executions_result {
        Ok(executions) => executions,
        Err(e) => return respond::store_error(e),
    };
    let tasks = match tasks_result {
        Ok(tasks) => tasks,
        Err(e) => return respond::store_error(e),
    };

    let descriptions: HashMap<String, String> =
        tasks.into_iter().map(|t| (t.task_id, t.description)).collect();

    respond::json(
        StatusCode::OK,
        &filter_rows(&executions, &descriptions, search, status),
    )
}

/// Description of the referenced task, or `None` once it is gone.
async fn task_description(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<Option<String>, StoreError> {
    match tasks::service::get_task(client, table_name, task_id).await {
        Ok(task) => Ok(Some(task.description)),
        Err(StoreError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

async fn respond_with_row(
    client: &DynamoClient,
    table_name: &str,
    status: StatusCode,
    execution: &TestExecution,
) -> Result<Response<Body>, Error> {
    match task_description(client, table_name, &execution.task_id).await {
        Ok(description) => respond::json(status, &ExecutionRow::new(execution, description.as_deref())),
        Err(e) => respond::store_error(e),
    }
}

/// HTTP Handler: POST /executions
pub async fn create_execution(
    client: &DynamoClient,
    table_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: ExecutionPayload = match respond::parse_body(body)? {
        Ok(payload) => payload,
        Err(resp) => return Ok(resp),
    };

    // Reject before touching DynamoDB
    let errors = payload.validate();
    if !errors.is_empty() {
        return respond::invalid(&errors);
    }

    match service::create_execution(client, table_name, payload).await {
        Ok(execution) => respond_with_row(client, table_name, StatusCode::CREATED, &execution).await,
        Err(e) => respond::store_error(e),
    }
}

/// HTTP Handler: GET /executions/{id}
pub async fn get_execution(
    client: &DynamoClient,
    table_name: &str,
    execution_id: &str,
) -> Result<Response<Body>, Error> {
    match service::get_execution(client, table_name, execution_id).await {
        Ok(execution) => respond_with_row(client, table_name, StatusCode::OK, &execution).await,
        Err(e) => respond::store_error(e),
    }
}

/// HTTP Handler: PUT /executions/{id}
pub async fn update_execution(
    client: &DynamoClient,
    table_name: &str,
    execution_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: ExecutionPayload = match respond::parse_body(body)? {
        Ok(payload) => payload,
        Err(resp) => return Ok(resp),
    };

    let errors = payload.validate();
    if !errors.is_empty() {
        return respond::invalid(&errors);
    }

    match service::update_execution(client, table_name, execution_id, payload).await {
        Ok(execution) => respond_with_row(client, table_name, StatusCode::OK, &execution).await,
        Err(e) => respond::store_error(e),
    }
}

/// HTTP Handler: DELETE /executions/{id}
pub async fn delete_execution(
    client: &DynamoClient,
    table_name: &str,
    execution_id: &str,
) -> Result<Response<Body>, Error> {
    match service::delete_execution(client, table_name, execution_id).await {
        Ok(()) => respond::no_content(),
        Err(e) => respond::store_error(e),
    }
}
