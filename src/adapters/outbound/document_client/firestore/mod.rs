mod value;

use crate::config::DocumentConfig;
use crate::domain::Timestamp;
use crate::ports::outbound::document_client::{
    CommitResponse, DocumentClient, DocumentError, DocumentPath, Fields, Query, WhereOp,
    WriteBatch,
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// Firestore REST client.
pub struct Firestore {
    http: reqwest::Client,
    base_url: String,
    database: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Option<Value>,
}

#[derive(Deserialize)]
struct BatchGetEntry {
    #[serde(default)]
    found: Option<RawDocument>,
}

#[derive(Deserialize)]
struct QueryEntry {
    #[serde(default)]
    document: Option<RawDocument>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCommit {
    #[serde(default)]
    commit_time: Option<String>,
}

impl RawDocument {
    fn into_fields(self) -> Result<Fields, DocumentError> {
        match self.fields {
            None => Ok(Fields::new()),
            Some(fields) => value::decode_fields(&fields),
        }
    }
}

impl Firestore {
    pub fn new(config: &DocumentConfig) -> Result<Self, DocumentError> {
        match &config.emulator_host {
            Some(host) => Self::with_base_url(&format!("http://{host}/v1"), &config.project_id, None),
            None => Self::with_base_url(FIRESTORE_URL, &config.project_id, config.token.clone()),
        }
    }

    pub fn with_base_url(
        base_url: &str,
        project_id: &str,
        token: Option<String>,
    ) -> Result<Self, DocumentError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|why| DocumentError::Transport(why.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            database: format!("projects/{project_id}/databases/(default)"),
            token,
        })
    }

    fn document_name(&self, path: &DocumentPath) -> String {
        format!("{}/documents/{path}", self.database)
    }

    fn request(&self, method: Method, resource: &str) -> RequestBuilder {
        let request = self
            .http
            .request(method, format!("{}/{resource}", self.base_url));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, DocumentError> {
        let response = request
            .send()
            .await
            .map_err(|why| DocumentError::Transport(why.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DocumentError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|why| DocumentError::Malformed(why.to_string()))
    }
}

fn operator(op: WhereOp) -> &'static str {
    match op {
        WhereOp::Equal => "EQUAL",
        WhereOp::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
    }
}

fn structured_query(query: &Query) -> Value {
    let mut filters: Vec<Value> = query
        .filters
        .iter()
        .map(|clause| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": clause.field },
                    "op": operator(clause.op),
                    "value": value::encode(&clause.value),
                }
            })
        })
        .collect();

    let mut structured = json!({
        "from": [{ "collectionId": query.collection.collection() }],
    });

    match filters.len() {
        0 => {}
        1 => structured["where"] = filters.remove(0),
        _ => {
            structured["where"] = json!({
                "compositeFilter": { "op": "AND", "filters": filters }
            })
        }
    }

    if !query.order_by.is_empty() {
        structured["orderBy"] = query
            .order_by
            .iter()
            .map(|field| json!({ "field": { "fieldPath": field }, "direction": "ASCENDING" }))
            .collect();
    }

    json!({ "structuredQuery": structured })
}

#[async_trait]
impl DocumentClient for Firestore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Fields>, DocumentError> {
        let request = self.request(Method::GET, &self.document_name(path));
        match self.send::<RawDocument>(request).await {
            Ok(document) => document.into_fields().map(Some),
            Err(DocumentError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(why) => Err(why),
        }
    }

    async fn get_all(&self, paths: &[DocumentPath]) -> Result<Vec<Option<Fields>>, DocumentError> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let names: Vec<String> = paths.iter().map(|path| self.document_name(path)).collect();
        let request = self
            .request(Method::POST, &format!("{}/documents:batchGet", self.database))
            .json(&json!({ "documents": names }));

        let mut found: HashMap<String, Fields> = HashMap::new();
        for entry in self.send::<Vec<BatchGetEntry>>(request).await? {
            if let Some(document) = entry.found {
                let name = document.name.clone();
                found.insert(name, document.into_fields()?);
            }
        }

        Ok(names.iter().map(|name| found.get(name).cloned()).collect())
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<Fields>, DocumentError> {
        let parent = format!("{}/documents/{}", self.database, query.collection.parent());
        let request = self
            .request(Method::POST, &format!("{parent}:runQuery"))
            .json(&structured_query(query));

        self.send::<Vec<QueryEntry>>(request)
            .await?
            .into_iter()
            .filter_map(|entry| entry.document)
            .map(RawDocument::into_fields)
            .collect()
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitResponse, DocumentError> {
        let writes: Vec<Value> = batch
            .writes()
            .iter()
            .map(|(path, fields)| {
                json!({
                    "update": {
                        "name": self.document_name(path),
                        "fields": value::encode_fields(fields),
                    }
                })
            })
            .collect();

        let request = self
            .request(Method::POST, &format!("{}/documents:commit", self.database))
            .json(&json!({ "writes": writes }));
        let committed = self.send::<RawCommit>(request).await?;

        let commit_time = match committed.commit_time {
            None => None,
            Some(time) => Some(
                Timestamp::parse(&time).map_err(|why| DocumentError::Malformed(why.to_string()))?,
            ),
        };
        Ok(CommitResponse { commit_time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::document_client::CollectionPath;
    use mockito::{Matcher, Server, ServerGuard};

    const DATABASE: &str = "/v1/projects/project-id/databases/\\(default\\)/documents";

    fn create_test_client(server: &ServerGuard) -> Firestore {
        Firestore::with_base_url(&format!("{}/v1", server.url()), "project-id", None).unwrap()
    }

    fn cards() -> CollectionPath {
        CollectionPath::new("test", "cards")
    }

    #[tokio::test]
    async fn test_get_decodes_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex(format!("^{DATABASE}/environments/test/cards/c1$")))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "name": "projects/project-id/databases/(default)/documents/environments/test/cards/c1",
                    "fields": {
                        "name": {"stringValue": "Card Mock"},
                        "orderExternal": {"integerValue": "3"},
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = create_test_client(&server);
        let fields = client.get(&cards().doc("c1")).await.unwrap().unwrap();
        assert_eq!(fields["name"], "Card Mock");
        assert_eq!(fields["orderExternal"], 3);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Regex(format!("^{DATABASE}/environments/test/cards/nope$")))
            .with_status(404)
            .with_body(r#"{"error": {"code": 404, "status": "NOT_FOUND"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server);
        assert!(client.get(&cards().doc("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_keeps_request_order() {
        let mut server = Server::new_async().await;
        let prefix = "projects/project-id/databases/(default)/documents/environments/test/cards";
        server
            .mock("POST", Matcher::Regex(format!("^{DATABASE}:batchGet$")))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    {"missing": format!("{prefix}/c2"), "readTime": "2024-05-01T12:00:00Z"},
                    {"found": {"name": format!("{prefix}/c1"), "fields": {"name": {"stringValue": "A"}}}},
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let client = create_test_client(&server);
        let found = client
            .get_all(&[cards().doc("c1"), cards().doc("c2")])
            .await
            .unwrap();
        assert_eq!(found[0].as_ref().unwrap()["name"], "A");
        assert!(found[1].is_none());
    }

    #[tokio::test]
    async fn test_run_query_sends_structured_query() {
        let mut server = Server::new_async().await;
        let query = Query::new(cards())
            .where_gte("name", "Card")
            .where_eq("set.alias", "stm")
            .order_by("name");

        let mock = server
            .mock("POST", Matcher::Regex(format!("^{DATABASE}/environments/test:runQuery$")))
            .match_body(Matcher::PartialJson(json!({
                "structuredQuery": {
                    "from": [{"collectionId": "cards"}],
                    "where": {"compositeFilter": {"op": "AND"}},
                    "orderBy": [{"field": {"fieldPath": "name"}, "direction": "ASCENDING"}],
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    {"readTime": "2024-05-01T12:00:00Z"},
                    {"document": {"name": "x/c1", "fields": {"name": {"stringValue": "Card Mock"}}}},
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let client = create_test_client(&server);
        let found = client.run_query(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["name"], "Card Mock");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_commit_returns_backend_time() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", Matcher::Regex(format!("^{DATABASE}:commit$")))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"writeResults": [{}], "commitTime": "2024-05-01T12:00:00.123456Z"}"#)
            .create_async()
            .await;

        let mut batch = WriteBatch::new();
        batch.set(cards().doc("c1"), Fields::new());

        let client = create_test_client(&server);
        let response = client.commit(batch).await.unwrap();
        assert_eq!(
            response.commit_time.unwrap().to_rfc3339(),
            "2024-05-01T12:00:00.123456Z"
        );
    }

    #[tokio::test]
    async fn test_server_errors_surface_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let client = create_test_client(&server);
        let result = client.run_query(&Query::new(cards())).await;
        assert!(matches!(
            result,
            Err(DocumentError::Status { status: 503, .. })
        ));
    }

    #[test]
    fn test_single_filter_is_not_composite() {
        let query = Query::new(cards()).where_eq("idSet", "s1");
        let body = structured_query(&query);
        assert_eq!(
            body["structuredQuery"]["where"]["fieldFilter"]["op"],
            "EQUAL"
        );
        assert!(body["structuredQuery"].get("orderBy").is_none());
    }
}
