use aws_sdk_dynamodb::Client as DynamoClient;
use chrono::Utc;
use lambda_http::{http::StatusCode, Body, Error, Response};
use qa_atoms::executions::{service::load_executions, TestExecution};
use qa_atoms::respond::{self, Accepted};
use qa_atoms::tasks::{service::load_tasks, Task};

use crate::export::{build_export, export_file_name, TimeRange};
use crate::report::{build_dashboard, build_report, DEFAULT_RECENT_LIMIT};

/// Loads both collections concurrently; aggregates always see full scans.
async fn load_everything(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Accepted<(Vec<Task>, Vec<TestExecution>)>, Error> {
    let (tasks_result, executions_result) = tokio::join!(
        load_tasks(client, table_name),
        load_executions(client, table_name)
    );

    let tasks = match tasks_result {
        Ok(tasks) => tasks,
        Err(e) => return respond::store_error(e).map(Err),
    };
    let executions = match executions_result {
        Ok(executions) => executions,
        Err(e) => return respond::store_error(e).map(Err),
    };

    Ok(Ok((tasks, executions)))
}

pub fn parse_recent_limit(raw: Option<&str>) -> Result<usize, String> {
    match raw {
        None => Ok(DEFAULT_RECENT_LIMIT),
        Some(s) => s
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("Invalid recent limit: {}", s)),
    }
}

pub fn parse_time_range(raw: Option<&str>) -> Result<TimeRange, String> {
    raw.map(str::parse::<TimeRange>)
        .transpose()
        .map(Option::unwrap_or_default)
}

/// HTTP Handler: GET /dashboard
pub async fn dashboard_handler(
    client: &DynamoClient,
    table_name: &str,
    recent: Option<&str>,
) -> Result<Response<Body>, Error> {
    let recent_limit = match parse_recent_limit(recent) {
        Ok(limit) => limit,
        Err(msg) => return respond::error(StatusCode::BAD_REQUEST, &msg),
    };

    let (tasks, executions) = match load_everything(client, table_name).await? {
        Ok(data) => data,
        Err(resp) => return Ok(resp),
    };

    let stats = build_dashboard(&tasks, &executions, recent_limit, &mut rand::rng());
    tracing::info!(
        "Dashboard over {} task(s) and {} execution(s)",
        stats.total_tasks,
        stats.total_executions
    );
    respond::json(StatusCode::OK, &stats)
}

/// HTTP Handler: GET /reports
pub async fn reports_handler(
    client: &DynamoClient,
    table_name: &str,
    time_range: Option<&str>,
) -> Result<Response<Body>, Error> {
    if let Err(msg) = parse_time_range(time_range) {
        return respond::error(StatusCode::BAD_REQUEST, &msg);
    }

    let (tasks, executions) = match load_everything(client, table_name).await? {
        Ok(data) => data,
        Err(resp) => return Ok(resp),
    };

    let report = build_report(&tasks, &executions, Utc::now().date_naive(), &mut rand::rng());
    respond::json(StatusCode::OK, &report)
}

/// HTTP Handler: GET /reports/export
/// Pretty-printed JSON served as a file download.
pub async fn export_handler(
    client: &DynamoClient,
    table_name: &str,
    time_range: Option<&str>,
) -> Result<Response<Body>, Error> {
    let time_range = match parse_time_range(time_range) {
        Ok(range) => range,
        Err(msg) => return respond::error(StatusCode::BAD_REQUEST, &msg),
    };

    let (tasks, executions) = match load_everything(client, table_name).await? {
        Ok(data) => data,
        Err(resp) => return Ok(resp),
    };

    let now = Utc::now();
    let report = build_report(&tasks, &executions, now.date_naive(), &mut rand::rng());
    let export = build_export(now, time_range, &report, &tasks, &executions);
    let file_name = export_file_name(now.date_naive());

    tracing::info!("Exporting {} ({})", file_name, time_range.as_str());

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", file_name),
        )
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string_pretty(&export)?.into())
        .map_err(Box::new)?)
}
