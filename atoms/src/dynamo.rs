use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use crate::error::StoreError;

/// One DynamoDB row.
pub type Item = HashMap<String, AttributeValue>;

/// String attribute, empty when missing or not a string.
pub fn get_s(item: &Item, key: &str) -> String {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

pub fn get_bool(item: &Item, key: &str) -> bool {
    item.get(key)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .unwrap_or(false)
}

/// List of string attributes; non-string members are skipped.
pub fn get_string_list(item: &Item, key: &str) -> Vec<String> {
    item.get(key)
        .and_then(|v| v.as_l().ok())
        .map(|list| {
            list.iter()
                .filter_map(|v| v.as_s().ok())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Order-preserving `L` value. String sets (`SS`) would lose the entry order.
pub fn string_list(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().cloned().map(AttributeValue::S).collect())
}

/// Id part of a sort key such as `TASK#<id>`.
pub fn id_from_sk<'a>(item: &'a Item, prefix: &str) -> Option<&'a str> {
    item.get("SK")
        .and_then(|v| v.as_s().ok())
        .and_then(|sk| sk.strip_prefix(prefix))
}

/// All rows under `pk` whose sort key starts with `sk_prefix`, following
/// `LastEvaluatedKey` until the partition is exhausted.
pub async fn query_all(
    client: &DynamoClient,
    table_name: &str,
    pk: &str,
    sk_prefix: &str,
) -> Result<Vec<Item>, StoreError> {
    let mut items = Vec::new();
    let mut start_key: Option<Item> = None;

    loop {
        let result = client
            .query()
            .table_name(table_name)
            .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
            .expression_attribute_values(":pk", AttributeValue::S(pk.to_string()))
            .expression_attribute_values(":sk_prefix", AttributeValue::S(sk_prefix.to_string()))
            .set_exclusive_start_key(start_key.take())
            .send()
            .await
            .map_err(|e| StoreError::backend("DynamoDB query", e))?;

        items.extend(result.items().iter().cloned());

        match result.last_evaluated_key() {
            Some(key) if !key.is_empty() => start_key = Some(key.clone()),
            _ => break,
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pairs: Vec<(&str, AttributeValue)>) -> Item {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn missing_attributes_fall_back_to_defaults() {
        let row = item(vec![("flag", AttributeValue::S("yes".into()))]);
        assert_eq!(get_s(&row, "absent"), "");
        assert!(!get_bool(&row, "flag"));
        assert!(get_string_list(&row, "absent").is_empty());
    }

    #[test]
    fn string_list_keeps_order() {
        let tags = vec!["smoke".to_string(), "auth".to_string(), "api".to_string()];
        let row = item(vec![("tags", string_list(&tags))]);
        assert_eq!(get_string_list(&row, "tags"), tags);
    }

    #[test]
    fn id_is_stripped_from_sort_key() {
        let row = item(vec![("SK", AttributeValue::S("TASK#abc".into()))]);
        assert_eq!(id_from_sk(&row, "TASK#"), Some("abc"));
        assert_eq!(id_from_sk(&row, "EXECUTION#"), None);
    }
}
