use std::collections::HashMap;

use reqwest::StatusCode;
use serde_json::{Value, json};

use catalog_infra::CatalogConfig;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(&[]).await
    }

    async fn spawn_with(env: &[(&str, &str)]) -> Self {
        // Same router as prod over an in-memory store, bound to an ephemeral port.
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = CatalogConfig::from_lookup(|key| env.get(key).cloned())
            .expect("invalid test configuration");
        let app = catalog_api::app::build_app(&config)
            .await
            .expect("failed to build app");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_tee(client: &reqwest::Client, srv: &TestServer) -> Value {
    let res = client
        .post(srv.url("/products"))
        .json(&json!({
            "name": "Basic Tee",
            "description": "Cotton",
            "options": [
                { "name": "Size", "values": ["S", "M"] },
                { "name": "Color", "values": "Red, Blue" }
            ],
            "base_price": "10.00",
            "base_stock": 5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_product_generates_variants() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create_tee(&client, &srv).await;
    assert_eq!(created["success"], json!(true));

    let variants = created["variants"].as_array().unwrap();
    assert_eq!(variants.len(), 4);
    let skus: Vec<&str> = variants.iter().map(|v| v["sku"].as_str().unwrap()).collect();
    assert_eq!(
        skus,
        vec![
            "BASIC-TEE-S-RED-0",
            "BASIC-TEE-S-BLUE-1",
            "BASIC-TEE-M-RED-2",
            "BASIC-TEE-M-BLUE-3",
        ]
    );
    assert!(variants.iter().all(|v| v["price"] == json!(1000) && v["stock"] == json!(5)));
}

#[tokio::test]
async fn product_detail_groups_by_pivot() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let created = create_tee(&client, &srv).await;
    let id = created["product"]["id"].as_str().unwrap();

    let res = client
        .get(srv.url(&format!("/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let detail: Value = res.json().await.unwrap();
    assert_eq!(detail["pivot"], json!("Size"));
    let keys: Vec<&str> = detail["groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["S", "M"]);
    assert_eq!(detail["unassigned"], json!([]));
    assert_eq!(detail["variants"][0]["label"], json!("Size: S / Color: Red"));

    let res = client
        .get(srv.url(&format!("/products/{id}?pivot=Color")))
        .send()
        .await
        .unwrap();
    let detail: Value = res.json().await.unwrap();
    assert_eq!(detail["groups"][0]["key"], json!("Red"));

    let res = client
        .get(srv.url(&format!("/products/{id}?pivot=Material")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn variant_edits_round_trip() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let created = create_tee(&client, &srv).await;
    let product_id = created["product"]["id"].as_str().unwrap();
    let first = created["variants"][0]["id"].as_str().unwrap();
    let second = created["variants"][1]["id"].as_str().unwrap();

    let res = client
        .patch(srv.url(&format!("/variants/{first}")))
        .json(&json!({ "price": 9.99 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(srv.url("/variants/bulk"))
        .json(&json!({
            "updates": [
                { "id": first, "stock": 3 },
                { "id": second, "sku": "TEE-CUSTOM", "price": "12.50", "stock": 0 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "updated": 2 }));

    let detail: Value = client
        .get(srv.url(&format!("/products/{product_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let variants = detail["variants"].as_array().unwrap();
    let find = |id: &str| variants.iter().find(|v| v["id"] == json!(id)).unwrap().clone();
    assert_eq!(find(first)["price"], json!(999));
    assert_eq!(find(first)["stock"], json!(3));
    assert_eq!(find(second)["sku"], json!("TEE-CUSTOM"));
    assert_eq!(find(second)["price"], json!(1250));
}

#[tokio::test]
async fn bulk_update_with_unknown_variant_changes_nothing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let created = create_tee(&client, &srv).await;
    let product_id = created["product"]["id"].as_str().unwrap();
    let first = created["variants"][0]["id"].as_str().unwrap();

    let res = client
        .post(srv.url("/variants/bulk"))
        .json(&json!({
            "updates": [
                { "id": first, "stock": 99 },
                { "id": "0190f3a0-0000-7000-8000-000000000000", "stock": 1 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().is_some());

    let detail: Value = client
        .get(srv.url(&format!("/products/{product_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(
        detail["variants"]
            .as_array()
            .unwrap()
            .iter()
            .all(|v| v["stock"] == json!(5))
    );
}

#[tokio::test]
async fn duplicate_sku_is_a_conflict() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let widget = json!({ "name": "Widget", "base_price": 2.5 });
    let res = client
        .post(srv.url("/products"))
        .json(&widget)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["variants"][0]["sku"], json!("WIDGET-DEFAULT"));

    let res = client
        .post(srv.url("/products"))
        .json(&widget)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let list: Value = client
        .get(srv.url("/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["products"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_the_store() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .json(&json!({
            "name": "Tee",
            "options": [{ "name": "Size", "values": " , " }],
            "base_price": 10
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/products"))
        .json(&json!({ "name": "Tee", "base_price": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .delete(srv.url("/products/not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn variant_limit_comes_from_configuration() {
    let srv = TestServer::spawn_with(&[
        ("CATALOG_VARIANT_WARN_THRESHOLD", "2"),
        ("CATALOG_VARIANT_FLAG_THRESHOLD", "3"),
        ("CATALOG_MAX_VARIANTS", "3"),
    ])
    .await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .json(&json!({
            "name": "Tee",
            "options": [
                { "name": "Size", "values": ["S", "M"] },
                { "name": "Color", "values": ["Red", "Blue"] }
            ],
            "base_price": 10
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_and_delete_product() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let created = create_tee(&client, &srv).await;
    let id = created["product"]["id"].as_str().unwrap();

    let res = client
        .patch(srv.url(&format!("/products/{id}")))
        .json(&json!({ "name": "Premium Tee" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let detail: Value = client
        .get(srv.url(&format!("/products/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["product"]["name"], json!("Premium Tee"));
    assert_eq!(detail["product"]["description"], json!("Cotton"));

    let res = client
        .delete(srv.url(&format!("/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url(&format!("/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(srv.url(&format!("/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_bodies_get_the_failure_envelope() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let created = create_tee(&client, &srv).await;
    let variant = created["variants"][0]["id"].as_str().unwrap();

    let cases = [
        (
            srv.url("/products"),
            json!({ "name": "Tee", "base_price": "10.00", "base_stock": -1 }),
        ),
        (srv.url("/products"), json!({ "name": "Tee" })),
        (
            srv.url("/variants/bulk"),
            json!({ "updates": [{ "id": "not-a-uuid", "stock": 1 }] }),
        ),
    ];
    for (url, body) in cases {
        let res = client.post(&url).json(&body).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
        let reply: Value = res.json().await.unwrap();
        assert_eq!(reply["success"], json!(false));
        assert!(reply["error"].as_str().is_some());
    }

    let res = client
        .patch(srv.url(&format!("/variants/{variant}")))
        .json(&json!({ "stock": "lots" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let reply: Value = res.json().await.unwrap();
    assert_eq!(reply["success"], json!(false));

    let res = client
        .post(srv.url("/products"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let reply: Value = res.json().await.unwrap();
    assert_eq!(reply["success"], json!(false));
}
