use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::{resolve_checklist, ExecutionPayload, TestCaseResult, TestExecution};
use crate::dynamo::{self, get_bool, get_s, get_string_list, string_list, Item};
use crate::error::StoreError;
use crate::tasks;

const EXECUTION_PK: &str = "EXECUTION";
const EXECUTION_SK_PREFIX: &str = "EXECUTION#";

fn checklist_value(test_cases: &[TestCaseResult]) -> AttributeValue {
    AttributeValue::L(
        test_cases
            .iter()
            .map(|tc| {
                AttributeValue::M(HashMap::from([
                    ("test_case".to_string(), AttributeValue::S(tc.test_case.clone())),
                    ("passed".to_string(), AttributeValue::Bool(tc.passed)),
                    ("notes".to_string(), AttributeValue::S(tc.notes.clone())),
                ]))
            })
            .collect(),
    )
}

fn checklist_from_item(item: &Item) -> Vec<TestCaseResult> {
    item.get("test_cases")
        .and_then(|v| v.as_l().ok())
        .map(|list| {
            list.iter()
                .filter_map(|v| v.as_m().ok())
                .map(|entry| TestCaseResult {
                    test_case: get_s(entry, "test_case"),
                    passed: get_bool(entry, "passed"),
                    notes: get_s(entry, "notes"),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Builds an execution from its DynamoDB row. An unreadable status falls back to pending.
pub fn item_to_execution(execution_id: &str, item: &Item) -> TestExecution {
    TestExecution {
        execution_id: execution_id.to_string(),
        task_id: get_s(item, "task_id"),
        test_id: get_s(item, "test_id"),
        tester_name: get_s(item, "tester_name"),
        test_cases: checklist_from_item(item),
        status: get_s(item, "status").parse().unwrap_or_default(),
        feedback: get_s(item, "feedback"),
        attached_images: get_string_list(item, "attached_images"),
        created_at: get_s(item, "created_at"),
        updated_at: get_s(item, "updated_at"),
    }
}

/// Load all executions, newest first
pub async fn load_executions(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Vec<TestExecution>, StoreError> {
    let items = dynamo::query_all(client, table_name, EXECUTION_PK, EXECUTION_SK_PREFIX).await?;

    let mut executions: Vec<TestExecution> = items
        .iter()
        .filter_map(|item| {
            dynamo::id_from_sk(item, EXECUTION_SK_PREFIX)
                .map(|execution_id| item_to_execution(execution_id, item))
        })
        .collect();

    executions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(executions)
}

/// Executions recorded against one task
pub async fn load_executions_for_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<Vec<TestExecution>, StoreError> {
    let all = load_executions(client, table_name).await?;
    Ok(all.into_iter().filter(|e| e.task_id == task_id).collect())
}

fn validated(payload: ExecutionPayload) -> Result<ExecutionPayload, StoreError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(StoreError::Invalid(errors));
    }
    Ok(payload.trimmed())
}

/// Referenced task, reported as a field error rather than a 404 when missing.
async fn referenced_task(
    client: &DynamoClient,
    table_name: &str,
    task_id: &str,
) -> Result<tasks::model::Task, StoreError> {
    match tasks::service::get_task(client, table_name, task_id).await {
        Err(StoreError::NotFound(_)) => Err(StoreError::invalid("task_id", "Selected task does not exist")),
        other => other,
    }
}

/// Create a new execution. The checklist is seeded from the task when the
/// payload carries none, and must otherwise mirror the task's test cases.
pub async fn create_execution(
    client: &DynamoClient,
    table_name: &str,
    payload: ExecutionPayload,
) -> Result<TestExecution, StoreError> {
    let mut payload = validated(payload)?;

    let task = referenced_task(client, table_name, &payload.task_id).await?;
    payload.test_cases =
        resolve_checklist(payload.test_cases, &task.test_cases).map_err(StoreError::Invalid)?;

    let execution_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S(EXECUTION_PK.to_string()))
        .item("SK", AttributeValue::S(format!("{}{}", EXECUTION_SK_PREFIX, execution_id)))
        .item("task_id", AttributeValue::S(payload.task_id.clone()))
        .item("test_id", AttributeValue::S(payload.test_id.clone()))
        .item("tester_name", AttributeValue::S(payload.tester_name.clone()))
        .item("test_cases", checklist_value(&payload.test_cases))
        .item("status", AttributeValue::S(payload.status.as_str().to_string()))
        .item("feedback", AttributeValue::S(payload.feedback.clone()))
        .item("attached_images", string_list(&payload.attached_images))
        .item("created_at", AttributeValue::S(now.clone()))
        .item("updated_at", AttributeValue::S(now.clone()))
        .send()
        .await
        .map_err(|e| StoreError::backend("DynamoDB put_item", e))?;

    tracing::info!(
        "Created execution {} ({}) for task {} by {}",
        execution_id,
        payload.test_id,
        payload.task_id,
        payload.tester_name
    );

    Ok(TestExecution {
        execution_id,
        task_id: payload.task_id,
        test_id: payload.test_id,
        tester_name: payload.tester_name,
        test_cases: payload.test_cases,
        status: payload.status,
        feedback: payload.feedback,
        attached_images: payload.attached_images,
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Get a specific execution
pub async fn get_execution(
    client: &DynamoClient,
    table_name: &str,
    execution_id: &str,
) -> Result<TestExecution, StoreError> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(EXECUTION_PK.to_string()))
        .key("SK", AttributeValue::S(format!("{}{}", EXECUTION_SK_PREFIX, execution_id)))
        .send()
        .await
        .map_err(|e| StoreError::backend("DynamoDB get_item", e))?;

    match result.item() {
        Some(item) => Ok(item_to_execution(execution_id, item)),
        None => Err(StoreError::NotFound("Test execution")),
    }
}

/// Checklist to store on update. Against the same task (`new_task` is `None`)
/// an empty submission keeps the stored checklist and a non-empty one is
/// checked against the stored case texts. A new task re-resolves against its cases.
pub fn resolve_update_checklist(
    existing: &TestExecution,
    submitted: Vec<TestCaseResult>,
    new_task: Option<&tasks::model::Task>,
) -> Result<Vec<TestCaseResult>, StoreError> {
    let resolved = match new_task {
        Some(task) => resolve_checklist(submitted, &task.test_cases),
        None if submitted.is_empty() => Ok(existing.test_cases.clone()),
        None => {
            let expected: Vec<String> = existing
                .test_cases
                .iter()
                .map(|tc| tc.test_case.clone())
                .collect();
            resolve_checklist(submitted, &expected)
        }
    };
    resolved.map_err(StoreError::Invalid)
}

/// Update an execution. `test_id` and `created_at` are fixed at creation.
pub async fn update_execution(
    client: &DynamoClient,
    table_name: &str,
    execution_id: &str,
    payload: ExecutionPayload,
) -> Result<TestExecution, StoreError> {
    let mut payload = validated(payload)?;
    let existing = get_execution(client, table_name, execution_id).await?;

    let new_task = if payload.task_id == existing.task_id {
        None
    } else {
        Some(referenced_task(client, table_name, &payload.task_id).await?)
    };
    payload.test_cases =
        resolve_update_checklist(&existing, payload.test_cases, new_task.as_ref())?;

    let now = chrono::Utc::now().to_rfc3339();

    client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(EXECUTION_PK.to_string()))
        .key("SK", AttributeValue::S(format!("{}{}", EXECUTION_SK_PREFIX, execution_id)))
        .update_expression(
            "SET task_id = :task_id, tester_name = :tester_name, test_cases = :test_cases, \
             #status = :status, feedback = :feedback, attached_images = :attached_images, \
             updated_at = :updated_at",
        )
        .expression_attribute_names("#status", "status")
        .expression_attribute_values(":task_id", AttributeValue::S(payload.task_id.clone()))
        .expression_attribute_values(":tester_name", AttributeValue::S(payload.tester_name.clone()))
        .expression_attribute_values(":test_cases", checklist_value(&payload.test_cases))
        .expression_attribute_values(":status", AttributeValue::S(payload.status.as_str().to_string()))
        .expression_attribute_values(":feedback", AttributeValue::S(payload.feedback.clone()))
        .expression_attribute_values(":attached_images", string_list(&payload.attached_images))
        .expression_attribute_values(":updated_at", AttributeValue::S(now))
        .send()
        .await
        .map_err(|e| StoreError::backend("DynamoDB update_item", e))?;

    get_execution(client, table_name, execution_id).await
}

/// Delete an execution
pub async fn delete_execution(
    client: &DynamoClient,
    table_name: &str,
    execution_id: &str,
) -> Result<(), StoreError> {
    get_execution(client, table_name, execution_id).await?;

    client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S(EXECUTION_PK.to_string()))
        .key("SK", AttributeValue::S(format!("{}{}", EXECUTION_SK_PREFIX, execution_id)))
        .send()
        .await
        .map_err(|e| StoreError::backend("DynamoDB delete_item", e))?;

    tracing::info!("Deleted execution {}", execution_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executions::model::ExecutionStatus;

    #[test]
    fn checklist_survives_the_item_encoding() {
        let checklist = vec![
            TestCaseResult {
                test_case: "Valid login".into(),
                passed: true,
                notes: "fast".into(),
            },
            TestCaseResult::unchecked("Invalid password"),
        ];

        let mut item = Item::new();
        item.insert("test_cases".into(), checklist_value(&checklist));
        item.insert("status".into(), AttributeValue::S("in-progress".into()));
        item.insert("tester_name".into(), AttributeValue::S("Alice".into()));

        let execution = item_to_execution("e-1", &item);
        assert_eq!(execution.test_cases, checklist);
        assert_eq!(execution.status, ExecutionStatus::InProgress);
        assert_eq!(execution.passed_test_cases(), 1);
        assert_eq!(execution.total_test_cases(), 2);
    }

    #[test]
    fn unknown_status_reads_as_pending() {
        let mut item = Item::new();
        item.insert("status".into(), AttributeValue::S("archived".into()));
        assert_eq!(item_to_execution("e", &item).status, ExecutionStatus::Pending);
        assert!(item_to_execution("e", &Item::new()).test_cases.is_empty());
    }

    fn stored_execution() -> TestExecution {
        let mut test_cases = crate::executions::model::seed_checklist(&[
            "Valid login".to_string(),
            "Invalid password".to_string(),
        ]);
        test_cases[0].passed = true;
        TestExecution {
            execution_id: "e-1".into(),
            task_id: "t-1".into(),
            test_id: "TEST-000001-AAA".into(),
            tester_name: "Alice".into(),
            test_cases,
            status: ExecutionStatus::InProgress,
            feedback: "ok".into(),
            attached_images: vec![],
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn same_task_update_without_checklist_keeps_the_stored_one() {
        let existing = stored_execution();
        let resolved = resolve_update_checklist(&existing, vec![], None).unwrap();
        assert_eq!(resolved, existing.test_cases);
    }

    #[test]
    fn same_task_update_keeps_stored_case_text() {
        let existing = stored_execution();
        let submitted = vec![
            TestCaseResult::unchecked("Rewritten"),
            TestCaseResult {
                test_case: "Also rewritten".into(),
                passed: true,
                notes: "now passes".into(),
            },
        ];

        let resolved = resolve_update_checklist(&existing, submitted, None).unwrap();
        assert_eq!(resolved[0], TestCaseResult::unchecked("Valid login"));
        assert_eq!(resolved[1].test_case, "Invalid password");
        assert!(resolved[1].passed);
        assert_eq!(resolved[1].notes, "now passes");
    }

    #[test]
    fn same_task_update_cannot_change_checklist_length() {
        let existing = stored_execution();
        let err = resolve_update_checklist(
            &existing,
            vec![TestCaseResult::unchecked("Valid login")],
            None,
        )
        .unwrap_err();
        match err {
            StoreError::Invalid(errors) => assert_eq!(
                errors.get("test_cases"),
                Some("Expected 2 test case results, got 1")
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn switching_task_reseeds_from_the_new_task() {
        let existing = stored_execution();
        let task = tasks::model::Task {
            task_id: "t-2".into(),
            tags: vec!["checkout".into()],
            description: "Checkout".into(),
            test_cases: vec!["Pay".into(), "Refund".into(), "Cancel".into()],
            notes: String::new(),
            attached_images: vec![],
            created_at: "2024-01-02T00:00:00Z".into(),
            updated_at: "2024-01-02T00:00:00Z".into(),
        };

        let reseeded = resolve_update_checklist(&existing, vec![], Some(&task)).unwrap();
        assert_eq!(reseeded.len(), 3);
        assert!(reseeded.iter().all(|tc| !tc.passed));
        assert_eq!(reseeded[2].test_case, "Cancel");

        let stale = existing.test_cases.clone();
        assert!(matches!(
            resolve_update_checklist(&existing, stale, Some(&task)),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn invalid_payload_is_rejected_before_any_io() {
        let err = validated(ExecutionPayload::default()).unwrap_err();
        match err {
            StoreError::Invalid(errors) => assert_eq!(errors.len(), 4),
            other => panic!("unexpected {:?}", other),
        }
    }
}
