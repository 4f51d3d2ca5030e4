use crate::domain::Timestamp;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

pub type Fields = Map<String, Value>;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document backend request failed: {0}")]
    Transport(String),
    #[error("Document backend answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// `environments/{env}/{collection}`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    env: String,
    collection: String,
}

impl CollectionPath {
    #[must_use]
    pub fn new(env: &str, collection: &str) -> Self {
        Self {
            env: env.to_string(),
            collection: collection.to_string(),
        }
    }

    #[must_use]
    pub fn env(&self) -> &str {
        &self.env
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Path of the document holding the collection, `environments/{env}`.
    #[must_use]
    pub fn parent(&self) -> String {
        format!("environments/{}", self.env)
    }

    #[must_use]
    pub fn doc(&self, id: &str) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.to_string(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "environments/{}/{}", self.env, self.collection)
    }
}

/// `environments/{env}/{collection}/{id}`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    #[must_use]
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WhereOp {
    Equal,
    GreaterThanOrEqual,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Where {
    pub field: String,
    pub op: WhereOp,
    pub value: Value,
}

/// Conjunctive where-clauses over one collection, ascending order.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub collection: CollectionPath,
    pub filters: Vec<Where>,
    pub order_by: Vec<String>,
}

impl Query {
    #[must_use]
    pub fn new(collection: CollectionPath) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: Vec::new(),
        }
    }

    #[must_use]
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Where {
            field: field.to_string(),
            op: WhereOp::Equal,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn where_gte(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Where {
            field: field.to_string(),
            op: WhereOp::GreaterThanOrEqual,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: &str) -> Self {
        self.order_by.push(field.to_string());
        self
    }
}

/// Full-document writes applied together by a single commit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<(DocumentPath, Fields)>,
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: DocumentPath, fields: Fields) {
        self.writes.push((path, fields));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    #[must_use]
    pub fn writes(&self) -> &[(DocumentPath, Fields)] {
        &self.writes
    }

    #[must_use]
    pub fn into_writes(self) -> Vec<(DocumentPath, Fields)> {
        self.writes
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CommitResponse {
    /// Backend commit time when the backend reports one.
    pub commit_time: Option<Timestamp>,
}

#[async_trait]
pub trait DocumentClient: Send + Sync {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Fields>, DocumentError>;
    /// One entry per requested path, in request order.
    async fn get_all(&self, paths: &[DocumentPath]) -> Result<Vec<Option<Fields>>, DocumentError>;
    async fn run_query(&self, query: &Query) -> Result<Vec<Fields>, DocumentError>;
    async fn commit(&self, batch: WriteBatch) -> Result<CommitResponse, DocumentError>;
}
