use axum::body::{to_bytes, Body};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use cardgate::adapters::inbound::http::router;
use cardgate::adapters::outbound::asset_store::file_system::FileSystem;
use cardgate::adapters::outbound::card_store::document::Document;
use cardgate::adapters::outbound::document_client::memory::Memory;
use cardgate::app::{App, Services};
use cardgate::config::Config;
use cardgate::domain::{id, CardInput, Lifecycle, Rarity, SetInput};
use cardgate::ports::outbound::card_store::{CardWriter, StoreError};
use reqwest::Url;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const S1_QUERY: &str =
    r#"{ card(id:"c1"){ id name types costs numberCost set{id name} rarity{id alias} } }"#;

fn create_test_config() -> Config {
    Config::from_lookup(|name| match name {
        "data_store" => Some(String::from("memory")),
        _ => None,
    })
    .unwrap()
}

fn create_test_card(id: &str, name: &str, types: &[&str], order_external: i32) -> CardInput {
    CardInput {
        id: Some(id.to_string()),
        name: name.to_string(),
        types: types.iter().map(|kind| kind.to_string()).collect(),
        costs: vec![String::from("1"), String::from("B")],
        number_cost: 2.0,
        order_external,
        id_rarity: String::from("r1"),
        id_set: String::from("s1"),
        ..CardInput::default()
    }
}

async fn seed(store: &Document) -> Result<(), StoreError> {
    store
        .upsert_rarity(Rarity {
            id: String::from("r1"),
            name: String::from("Mythic Rare"),
            alias: String::from("M"),
            lifecycle: Lifecycle::default(),
        })
        .await?;
    store
        .upsert_set(SetInput {
            id: Some(String::from("s1")),
            name: String::from("Set Mock"),
            alias: String::from("stm"),
            ..SetInput::default()
        })
        .await?;
    store
        .upsert_cards(vec![CardInput {
            costs: vec![
                String::from("1"),
                String::from("R"),
                String::from("R"),
                String::from("R"),
            ],
            number_cost: 4.0,
            ..create_test_card("c1", "Card Mock", &["Legendary", "Creature", "Goblin"], 1)
        }])
        .await?;
    Ok(())
}

async fn create_test_app() -> (App, Arc<Document>) {
    let store = Arc::new(Document::new(Arc::new(Memory::new()), "test"));
    seed(&store).await.unwrap();
    let assets = FileSystem::new(std::env::temp_dir().join("cardgate-query-tests"));
    let services = Services::new(store.clone(), Arc::new(assets));
    (App::with_services(create_test_config(), services), store)
}

async fn send(app: &App, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router(app.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn graphql(query: &str) -> Request<Body> {
    Request::post("/query")
        .header(CONTENT_TYPE, "application/graphql")
        .body(Body::from(query.to_string()))
        .unwrap()
}

fn json_envelope(envelope: Value) -> Request<Body> {
    Request::post("/query")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(envelope.to_string()))
        .unwrap()
}

fn url_encoded(query: &str) -> Request<Body> {
    let url = Url::parse_with_params("http://localhost/query", &[("query", query)]).unwrap();
    Request::get(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
        .body(Body::empty())
        .unwrap()
}

fn parse(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_card_by_id() {
    let (app, _) = create_test_app().await;

    let (status, body) = send(&app, graphql(S1_QUERY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse(&body),
        json!({"data": {"card": {
            "id": "c1",
            "name": "Card Mock",
            "types": ["Legendary", "Creature", "Goblin"],
            "costs": ["1", "R", "R", "R"],
            "numberCost": 4.0,
            "set": {"id": "s1", "name": "Set Mock"},
            "rarity": {"id": "r1", "alias": "M"},
        }}})
    );
}

#[tokio::test]
async fn test_card_by_id_miss() {
    let (app, _) = create_test_app().await;

    let (status, body) = send(&app, graphql(r#"{card(id:"nope"){id}}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"data": {"card": null}}));
}

#[tokio::test]
async fn test_filter_composition() {
    let (app, store) = create_test_app().await;
    store
        .upsert_cards(vec![
            create_test_card("c3", "Card Mock Zeta", &["Instant"], 3),
            create_test_card("c2", "Card Mock Alpha", &["Instant"], 2),
            create_test_card("c4", "Card Mock Beta", &["Creature"], 4),
        ])
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        graphql(
            r#"{ cardBy(filter:{name:"Card Mock", types:["Instant"], costs:["B"], set:{alias:"stm"}, rarity:{alias:"M"}}){ id } }"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse(&body),
        json!({"data": {"cardBy": [{"id": "c2"}, {"id": "c3"}]}})
    );
}

#[tokio::test]
async fn test_delete_method_is_not_allowed() {
    let (app, _) = create_test_app().await;

    let request = Request::delete("/query").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_malformed_envelope_is_bad_request() {
    let (app, _) = create_test_app().await;

    let request = Request::post("/query")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(r#""<xml/>""#))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body)["data"], Value::Null);
}

#[tokio::test]
async fn test_malformed_scalar_literals_are_bad_requests() {
    let (app, _) = create_test_app().await;

    for literal in [r#"data: "{oops""#, "data: 5", r#"data: "[1, 2]""#] {
        let query = format!(
            r#"mutation {{ upsertCards(input: [{{name: "A", idSet: "s1", idRarity: "r1", {literal}}}]) {{ affectedRecords }} }}"#
        );
        let (status, body) = send(&app, graphql(&query)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{literal}");
        let errors = parse(&body)["errors"].as_array().cloned().unwrap();
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|error| error.get("path").is_none()));
    }

    let query = format!(r#"{{card(id:"{}"){{id}}}}"#, id::card_id("s1", "A"));
    let (_, body) = send(&app, graphql(&query)).await;
    assert_eq!(parse(&body), json!({"data": {"card": null}}));
}

#[tokio::test]
async fn test_bulk_upsert() {
    let (app, _) = create_test_app().await;

    let (status, body) = send(
        &app,
        graphql(
            r#"mutation {
                upsertCards(input: [
                    {id: "b1", name: "Bulk One", idSet: "s1", idRarity: "r1", orderExternal: 1},
                    {id: "b2", name: "Bulk Two", idSet: "s1", idRarity: "r1", orderExternal: 2},
                    {id: "b3", name: "Bulk Three", idSet: "s1", idRarity: "r1", orderExternal: 3},
                    {id: "b4", name: "Bulk Four", idSet: "s1", idRarity: "r1", orderExternal: 4},
                    {id: "b5", name: "Bulk Five", idSet: "s1", idRarity: "r1", orderExternal: 5}
                ]) { affectedRecords committedAt }
            }"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let result = parse(&body);
    assert_eq!(result["data"]["upsertCards"]["affectedRecords"], json!(5));
    assert!(result["data"]["upsertCards"]["committedAt"].is_string());

    let (status, body) = send(
        &app,
        graphql(r#"{ cardBy(filter:{name:"Bulk"}){ id updatedAt } }"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let cards = parse(&body)["data"]["cardBy"].as_array().cloned().unwrap();
    let bulk: Vec<&Value> = cards
        .iter()
        .filter(|card| card["id"].as_str().is_some_and(|id| id.starts_with('b')))
        .collect();
    let ids: Vec<&str> = bulk.iter().filter_map(|card| card["id"].as_str()).collect();
    assert_eq!(ids, ["b1", "b2", "b3", "b4", "b5"]);
    assert!(bulk.iter().all(|card| card["updatedAt"].is_string()));
}

#[tokio::test]
async fn test_unknown_set_rejects_batch() {
    let (app, _) = create_test_app().await;

    let (status, body) = send(
        &app,
        graphql(
            r#"mutation {
                upsertCards(input: [
                    {id: "x1", name: "Kept Out", idSet: "s1", idRarity: "r1"},
                    {id: "x2", name: "Orphan", idSet: "nope", idRarity: "r1"}
                ]) { affectedRecords }
            }"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!parse(&body)["errors"].as_array().unwrap().is_empty());

    let (_, body) = send(&app, graphql(r#"{card(id:"x1"){id}}"#)).await;
    assert_eq!(parse(&body), json!({"data": {"card": null}}));
}

#[tokio::test]
async fn test_deleted_card_reads_as_null() {
    let (app, store) = create_test_app().await;
    store.delete_card("c1").await.unwrap();

    let (status, body) = send(&app, graphql(r#"{card(id:"c1"){id}}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"data": {"card": null}}));
}

#[tokio::test]
async fn test_encodings_yield_identical_envelopes() {
    let (app, _) = create_test_app().await;

    let (_, raw) = send(&app, graphql(S1_QUERY)).await;
    let (_, envelope) = send(&app, json_envelope(json!({"query": S1_QUERY}))).await;
    let (_, url) = send(&app, url_encoded(S1_QUERY)).await;

    assert_eq!(raw, envelope);
    assert_eq!(raw, url);
}

#[tokio::test]
async fn test_envelope_variables_are_bound() {
    let (app, _) = create_test_app().await;

    let (status, body) = send(
        &app,
        json_envelope(json!({
            "query": "query Lookup($id: ID!) { card(id: $id) { name } }",
            "operationName": "Lookup",
            "variables": {"id": "c1"},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"data": {"card": {"name": "Card Mock"}}}));
}

#[tokio::test]
async fn test_healthz() {
    let (app, _) = create_test_app().await;

    let request = Request::get("/healthz").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"alive");
}
