use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::model::{Task, TaskPayload};
use crate::dynamo::{self, get_s, get_string_list, string_list, Item};
use crate::error::StoreError;
use crate::executions::TestExecution;

const TASK_PK: &str = "TASK";
const TASK_SK_PREFIX: &str = "TASK#";

/// Builds a task from its DynamoDB row
pub fn item_to_task(task_id: &str, item: &Item) -> Task {
    Task {
        task_id: task_id.to_string(),
        tags: get_string_list(item, "tags"),
        description: get_s(item, "description"),
        test_cases: get_string_list(item, "test_cases"),
        notes: get_s(item, "notes"),
        attached_images: get_string_list(item, "attached_images"),
        created_at: get_s(item, "created_at"),
        updated_at: get_s(item, "updated_at"),
    }
}

/// Load all tasks, newest first (pure domain logic, no HTTP)
pub async fn load_tasks(client: &DynamoClient, table_name: &str) -> Result<Vec<Task>, StoreError> {
    let items = dynamo::query_all(client, table_name, TASK_PK, TASK_SK_PREFIX).await?;

    let mut tasks: Vec<Task> = items
        .iter()
        .filter_map(|item| {
            dynamo::id_from_sk(item, TASK_SK_PREFIX).map(|task_id| item_to_task(task_id, item))
        })
        .collect();

    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(tasks)
}

/// Create a new task
pub async fn create_task(
    client: &DynamoClient,
    table_name: &str,
    payload: TaskPayload,
) -> Result<Task, StoreError> {
    let task_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(TASK_PK.to_string()))
        .item("SK", AttributeValue::S(format!("{}{}", TASK_SK_PREFIX, task_id)))
        .item("tags", string_list(&payload.tags))
        .item("description", AttributeValue::S(payload.description.clone()))
        .item("test_cases", string_list(&payload.test_cases))
        .item("notes", AttributeValue::S(payload.notes.clone()))
        .item("attached_images", string_list(&payload.attached_images))
        .item("created_at", AttributeValue::S(now.clone()))
        .item("updated_at", AttributeValue::S(now.clone()))
        .send()
        .await
        .map_err(|e| StoreError::backend("DynamoDB put_item", e))?;

    tracing::info!("Created task {} with {} test cases", task_id, payload.test_cases.len());

    Ok(Task {
        task_id,
        tags: payload.tags,
        description: payload.description,
        test_cases: payload.test_cases,
        notes: payload.notes,
        attached_images: payload.attached_images,
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Get a specific task
pub async fn get_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<Task, StoreError> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(TASK_PK.to_string()))
        .key("SK", AttributeValue::S(format!("{}{}", TASK_SK_PREFIX, task_id)))
        .send()
        .await
        .map_err(|e| StoreError::backend("DynamoDB get_item", e))?;

    match result.item() {
        Some(item) => Ok(item_to_task(task_id, item)),
        None => Err(StoreError::NotFound("Task")),
    }
}

/// Replace a task's content. Executions already recorded keep their own copy
/// of the checklist and are not touched.
pub async fn update_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
    payload: TaskPayload,
) -> Result<Task, StoreError> {
    // 404 rather than an upsert
    get_task(client, table_name, task_id).await?;

    let now = chrono::Utc::now().to_rfc3339();

    client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(TASK_PK.to_string()))
        .key("SK", AttributeValue::S(format!("{}{}", TASK_SK_PREFIX, task_id)))
        .update_expression(
            "SET tags = :tags, description = :description, test_cases = :test_cases, \
             notes = :notes, attached_images = :attached_images, updated_at = :updated_at",
        )
        .expression_attribute_values(":tags", string_list(&payload.tags))
        .expression_attribute_values(":description", AttributeValue::S(payload.description))
        .expression_attribute_values(":test_cases", string_list(&payload.test_cases))
        .expression_attribute_values(":notes", AttributeValue::S(payload.notes))
        .expression_attribute_values(":attached_images", string_list(&payload.attached_images))
        .expression_attribute_values(":updated_at", AttributeValue::S(now))
        .send()
        .await
        .map_err(|e| StoreError::backend("DynamoDB update_item", e))?;

    get_task(client, table_name, task_id).await
}

/// Conflict while any of `executions` points at `task_id`.
pub fn ensure_unreferenced(task_id: &str, executions: &[TestExecution]) -> Result<(), StoreError> {
    let count = executions.iter().filter(|e| e.task_id == task_id).count();
    if count == 0 {
        return Ok(());
    }
    Err(StoreError::Conflict(format!(
        "Task is referenced by {} test execution(s); delete those first",
        count
    )))
}

/// Delete a task. Refused while any execution still references it.
pub async fn delete_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<(), StoreError> {
    get_task(client, table_name, task_id).await?;

    let referencing =
        crate::executions::service::load_executions_for_task(client, table_name, task_id).await?;
    ensure_unreferenced(task_id, &referencing)?;

    client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(TASK_PK.to_string()))
        .key("SK", AttributeValue::S(format!("{}{}", TASK_SK_PREFIX, task_id)))
        .send()
        .await
        .map_err(|e| StoreError::backend("DynamoDB delete_item", e))?;

    tracing::info!("Deleted task {}", task_id);
    Ok(())
}
