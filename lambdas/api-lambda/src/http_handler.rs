use qa_atoms::{executions, media, respond, tasks};
use qa_shared::{cors::with_cors_headers, AppState};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, RequestExt, Response,
};
use std::sync::Arc;

fn finalize_response(
    resp: Result<Response<Body>, Error>,
    state: &AppState,
    request_origin: Option<&str>,
) -> Result<Response<Body>, Error> {
    resp.map(|r| with_cors_headers(r, &state.config.allowed_origins, request_origin))
}

fn method_not_allowed() -> Result<Response<Body>, Error> {
    respond::error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Main Lambda handler - routes requests to the task, execution, upload and report endpoints
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    let request_origin = event.headers().get("Origin").and_then(|v| v.to_str().ok());
    let table_name = state.config.table_name.as_str();
    let client = &state.dynamo_client;
    tracing::info!("🚀 QA API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if *method == Method::OPTIONS {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp, &state.config.allowed_origins, request_origin));
    }

    let query = |name: &str| -> Option<String> {
        event
            .query_string_parameters_ref()
            .and_then(|params| params.first(name))
            .map(str::to_string)
    };

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let resp = match (method, parts.as_slice()) {
        // Tasks
        (&Method::GET, ["tasks"]) => {
            let search = query("search");
            tasks::http::list_tasks(client, table_name, search.as_deref()).await
        }
        (&Method::POST, ["tasks"]) => tasks::http::create_task(client, table_name, body).await,
        (&Method::GET, ["tasks", task_id]) => tasks::http::get_task(client, table_name, task_id).await,
        (&Method::PUT, ["tasks", task_id]) => {
            tasks::http::update_task(client, table_name, task_id, body).await
        }
        (&Method::DELETE, ["tasks", task_id]) => {
            tasks::http::delete_task(client, table_name, task_id).await
        }
        (&Method::GET, ["tasks", task_id, "checklist"]) => {
            tasks::http::get_task_checklist(client, table_name, task_id).await
        }
        (_, ["tasks"]) | (_, ["tasks", _]) | (_, ["tasks", _, "checklist"]) => method_not_allowed(),

        // Executions
        (&Method::GET, ["executions"]) => {
            let search = query("search");
            let status = query("status");
            executions::http::list_executions(client, table_name, search.as_deref(), status.as_deref())
                .await
        }
        (&Method::POST, ["executions"]) => {
            executions::http::create_execution(client, table_name, body).await
        }
        (&Method::GET, ["executions", execution_id]) => {
            executions::http::get_execution(client, table_name, execution_id).await
        }
        (&Method::PUT, ["executions", execution_id]) => {
            executions::http::update_execution(client, table_name, execution_id, body).await
        }
        (&Method::DELETE, ["executions", execution_id]) => {
            executions::http::delete_execution(client, table_name, execution_id).await
        }
        (_, ["executions"]) | (_, ["executions", _]) => method_not_allowed(),

        // Uploads
        (&Method::POST, ["uploads"]) => {
            media::http::upload_images_handler(&state.s3_client, &state.config.bucket_name, body).await
        }
        (_, ["uploads"]) => method_not_allowed(),

        // Dashboard and reports
        (&Method::GET, ["dashboard"]) => {
            let recent = query("recent");
            reports_block::dashboard_handler(client, table_name, recent.as_deref()).await
        }
        (&Method::GET, ["reports"]) => {
            let time_range = query("time_range");
            reports_block::reports_handler(client, table_name, time_range.as_deref()).await
        }
        (&Method::GET, ["reports", "export"]) => {
            let time_range = query("time_range");
            reports_block::export_handler(client, table_name, time_range.as_deref()).await
        }
        (_, ["dashboard"]) | (_, ["reports"]) | (_, ["reports", "export"]) => method_not_allowed(),

        _ => {
            tracing::warn!("⚠️ No route matched - Method: {} Path: {}", method, path);
            respond::not_found()
        }
    };

    if let Ok(r) = &resp {
        tracing::info!("{} {} -> {}", method, path, r.status());
    }

    finalize_response(resp, &state, request_origin)
}
