use std::time::Duration;

use cordra_api::{ClientSettings, CordraClient};
use cordra_mcp::operations::{RepositoryOperations, SearchRequest};
use cordra_mcp::types::ErrorKind;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn operations_for(uri: &str, max_search_results: u64) -> RepositoryOperations {
    let mut settings = ClientSettings::new(Url::parse(uri).expect("mock server uri"));
    settings.timeout = Duration::from_secs(2);
    RepositoryOperations::new(CordraClient::new(settings).expect("client builds"), max_search_results)
}

fn document_with_payload() -> Value {
    json!({
        "id": "test/123",
        "type": "Document",
        "content": { "id": "test/123", "title": "Field report" },
        "acl": { "readers": ["public", "team/1"], "writers": ["admin"] },
        "metadata": { "createdOn": 1700000000000u64, "createdBy": "admin", "txnId": 42 },
        "payloads": [
            { "name": "file.pdf", "filename": "report.pdf", "size": 2048, "mediaType": "application/pdf" }
        ]
    })
}

async fn mount_object(server: &MockServer, id: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/objects/{id}")))
        .and(query_param("full", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16, message: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "message": message })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn get_object_reports_requested_id() {
    let server = MockServer::start().await;
    mount_object(&server, "test/123", document_with_payload()).await;

    let object = operations_for(&server.uri(), 1000).get_object("test/123").await.expect("object found");
    assert_eq!(object.id, "test/123");
    assert_eq!(object.type_name, "Document");
    assert_eq!(object.content["title"], json!("Field report"));
    let metadata = object.metadata.expect("metadata");
    assert!(metadata.get("txnId").is_none());
}

#[tokio::test]
async fn unknown_object_is_not_found() {
    let server = MockServer::start().await;
    mount_status(&server, "/objects/test/missing", 404, "Missing object").await;

    let error = operations_for(&server.uri(), 1000).get_object("test/missing").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert_eq!(error.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn blank_object_id_never_reaches_repository() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let error = operations_for(&server.uri(), 1000).get_object("   ").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::BadRequest);
}

#[tokio::test]
async fn oversized_page_request_is_clamped() {
    let server = MockServer::start().await;
    let hits = (0..3)
        .map(|n| json!({ "id": format!("test/{n}"), "type": "Document", "content": {} }))
        .collect::<Vec<Value>>();
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "type:\"Document\""))
        .and(query_param("pageNum", "1"))
        .and(query_param("pageSize", "1000"))
        .and(query_param("full", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pageNum": 1,
            "pageSize": 1000,
            "size": 1003,
            "results": hits
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = operations_for(&server.uri(), 1000)
        .search_objects(SearchRequest {
            type_name: Some("Document".to_string()),
            page_num: Some(1),
            page_size: Some(5000),
            ..Default::default()
        })
        .await
        .expect("search succeeds");

    assert_eq!(page.page_size, 1000);
    assert_eq!(page.page_num, 1);
    assert_eq!(page.total_count, 1003);
    assert!(page.results.len() <= 1000);
}

#[tokio::test]
async fn query_and_type_are_combined() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "(title:report) AND type:\"Document\""))
        .and(query_param("pageNum", "0"))
        .and(query_param("pageSize", "25"))
        .and(query_param("sortFields", "/title ASC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "size": 2,
            "results": [
                { "id": "test/1", "type": "Document", "content": { "title": "report" } },
                { "id": "test/2", "type": "Person", "content": { "title": "report" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = operations_for(&server.uri(), 1000)
        .search_objects(SearchRequest {
            query: Some("title:report".to_string()),
            type_name: Some("Document".to_string()),
            sort_fields: Some("/title ASC".to_string()),
            ..Default::default()
        })
        .await
        .expect("search succeeds");

    assert!(page.results.iter().all(|object| object.type_name == "Document"));
    assert_eq!(page.results.len(), 1);
}

#[tokio::test]
async fn negative_page_number_is_a_bad_request() {
    let server = MockServer::start().await;
    let error = operations_for(&server.uri(), 1000)
        .search_objects(SearchRequest {
            page_num: Some(-1),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::BadRequest);
}

#[tokio::test]
async fn list_payloads_returns_descriptors_only() {
    let server = MockServer::start().await;
    mount_object(&server, "test/123", document_with_payload()).await;

    let payloads = operations_for(&server.uri(), 1000).list_payloads("test/123").await.expect("payloads listed");
    assert_eq!(
        serde_json::to_value(payloads).expect("serialize payloads"),
        json!([{ "name": "file.pdf", "size": 2048, "contentType": "application/pdf" }])
    );
}

#[tokio::test]
async fn object_without_payloads_lists_none() {
    let server = MockServer::start().await;
    mount_object(&server, "test/plain", json!({ "id": "test/plain", "type": "Document", "content": {} })).await;

    let payloads = operations_for(&server.uri(), 1000).list_payloads("test/plain").await.expect("payloads listed");
    assert!(payloads.is_empty());
}

#[tokio::test]
async fn acl_matches_repository_lists() {
    let server = MockServer::start().await;
    mount_object(&server, "test/123", document_with_payload()).await;

    let acl = operations_for(&server.uri(), 1000).get_object_acl("test/123").await.expect("acl returned");
    let mut readers = acl.readers.clone();
    readers.sort();
    assert_eq!(readers, vec!["public".to_string(), "team/1".to_string()]);
    assert_eq!(acl.writers, vec!["admin".to_string()]);
}

#[tokio::test]
async fn schemas_are_listed_and_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schemas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "User": { "type": "object" },
            "Document": { "type": "object" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/schemas/User"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        })))
        .mount(&server)
        .await;

    let operations = operations_for(&server.uri(), 1000);
    assert_eq!(operations.list_schemas().await.expect("schemas listed"), vec!["Document", "User"]);

    let schema = operations.get_schema("User").await.expect("schema found");
    assert_eq!(schema.type_name, "User");
    assert_eq!(schema.schema["required"], json!(["name"]));
}

#[tokio::test]
async fn unknown_schema_is_not_found() {
    let server = MockServer::start().await;
    mount_status(&server, "/schemas/NoSuchType", 404, "Not found").await;

    let error = operations_for(&server.uri(), 1000).get_schema("NoSuchType").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn design_object_and_server_info_are_read() {
    let server = MockServer::start().await;
    mount_object(
        &server,
        "design",
        json!({ "id": "design", "type": "CordraDesign", "content": { "uiConfig": { "title": "Wildlife" } } }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/versionInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "2.5.2", "gitCommit": "abc123" })))
        .mount(&server)
        .await;

    let operations = operations_for(&server.uri(), 1000);
    let design = operations.get_design_object().await.expect("design object");
    assert_eq!(design.content["uiConfig"]["title"], json!("Wildlife"));

    let info = operations.get_server_info().await.expect("server info");
    assert_eq!(info.version.as_deref(), Some("2.5.2"));
}

#[tokio::test]
async fn rejected_credentials_are_forbidden() {
    let server = MockServer::start().await;
    mount_status(&server, "/objects/test/secret", 403, "Forbidden").await;
    mount_status(&server, "/objects/test/private", 401, "Unauthorized").await;

    let operations = operations_for(&server.uri(), 1000);
    assert_eq!(operations.get_object("test/secret").await.unwrap_err().kind(), ErrorKind::Forbidden);
    assert_eq!(operations.get_object_acl("test/private").await.unwrap_err().kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn rejected_query_is_a_bad_request() {
    let server = MockServer::start().await;
    mount_status(&server, "/search", 400, "Cannot parse query").await;

    let error = operations_for(&server.uri(), 1000)
        .search_objects(SearchRequest {
            query: Some("title:(unbalanced".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::BadRequest);
    assert!(error.message().contains("Cannot parse query"));
}

#[tokio::test]
async fn server_failures_are_upstream_errors() {
    let server = MockServer::start().await;
    mount_status(&server, "/versionInfo", 500, "boom").await;

    let error = operations_for(&server.uri(), 1000).get_server_info().await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UpstreamError);
    assert!(error.is_retryable());
}

#[tokio::test]
async fn unreachable_repository_is_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let address = listener.local_addr().expect("local address");
    drop(listener);

    let error = operations_for(&format!("http://{address}"), 1000).list_schemas().await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UpstreamUnavailable);
    assert_eq!(error.message(), "schema listing: could not connect to repository");
}
