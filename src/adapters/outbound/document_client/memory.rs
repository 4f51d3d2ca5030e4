use crate::ports::outbound::document_client::{
    CommitResponse, DocumentClient, DocumentError, DocumentPath, Fields, Query, Where, WhereOp,
    WriteBatch,
};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-process document backend keyed by full document path.
#[derive(Default)]
pub struct Memory {
    documents: RwLock<BTreeMap<String, Fields>>,
}

impl Memory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolves a dotted path such as `set.alias` through nested maps.
fn lookup<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Orders values by type first, then by value within a type.
fn compare(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
        (Value::Number(left), Value::Number(right)) => {
            let left = left.as_f64().unwrap_or_default();
            let right = right.as_f64().unwrap_or_default();
            left.partial_cmp(&right).unwrap_or(Ordering::Equal)
        }
        (Value::String(left), Value::String(right)) => left.cmp(right),
        (Value::Array(left), Value::Array(right)) => left
            .iter()
            .zip(right)
            .map(|(left, right)| compare(left, right))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| left.len().cmp(&right.len())),
        _ => rank(left).cmp(&rank(right)),
    }
}

fn matches(fields: &Fields, clause: &Where) -> bool {
    let Some(value) = lookup(fields, &clause.field) else {
        return false;
    };
    match clause.op {
        WhereOp::Equal => compare(value, &clause.value).is_eq(),
        WhereOp::GreaterThanOrEqual => {
            rank(value) == rank(&clause.value) && compare(value, &clause.value).is_ge()
        }
    }
}

#[async_trait]
impl DocumentClient for Memory {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Fields>, DocumentError> {
        Ok(self.documents.read().await.get(&path.to_string()).cloned())
    }

    async fn get_all(&self, paths: &[DocumentPath]) -> Result<Vec<Option<Fields>>, DocumentError> {
        let documents = self.documents.read().await;
        Ok(paths
            .iter()
            .map(|path| documents.get(&path.to_string()).cloned())
            .collect())
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<Fields>, DocumentError> {
        let prefix = format!("{}/", query.collection);
        let documents = self.documents.read().await;

        let mut found: Vec<Fields> = documents
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter(|(path, _)| !path[prefix.len()..].contains('/'))
            .filter(|(_, fields)| query.filters.iter().all(|clause| matches(fields, clause)))
            .map(|(_, fields)| fields.clone())
            .collect();

        found.sort_by(|left, right| {
            query
                .order_by
                .iter()
                .map(|field| match (lookup(left, field), lookup(right, field)) {
                    (Some(left), Some(right)) => compare(left, right),
                    (left, right) => left.is_some().cmp(&right.is_some()),
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        Ok(found)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitResponse, DocumentError> {
        let mut documents = self.documents.write().await;
        for (path, fields) in batch.into_writes() {
            documents.insert(path.to_string(), fields);
        }
        Ok(CommitResponse::default())
    }
}
