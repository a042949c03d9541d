mod common;

use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zoho_crm::error::{CrmError, ErrorKind};
use zoho_crm::pagination::PageRequest;
use zoho_crm::records::{Facade, ListRequest, Record, SearchRequest};

use common::{api_path, contacts, page_body};

fn list_contacts(per_page: Option<u32>, strict: bool) -> ListRequest {
    ListRequest::builder()
        .module_name("Contacts")
        .fields("Email")
        .maybe_per_page(per_page)
        .strict(strict)
        .build()
}

fn ids(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.id().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn bound_smaller_than_page_stops_mid_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "10"))
        .and(query_param("fields", "Email"))
        .and(query_param("sort_by", "id"))
        .and(query_param("sort_order", "desc"))
        .and(header("authorization", format!("Zoho-oauthtoken {}", common::TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(contacts(1..=100), 1, true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(contacts(101..=200), 2, true)))
        .expect(0)
        .mount(&server)
        .await;
    let client = common::client(&server);

    let mut cursor = client.records().list(list_contacts(Some(10), false)).expect("cursor");
    let mut records = Vec::new();
    while let Some(record) = cursor.next().await {
        records.push(record.expect("record"));
    }

    assert_eq!(records.len(), 10);
    assert_eq!(cursor.requests_issued(), 1);
    assert_eq!(cursor.emitted_count(), 10);
    assert!(cursor.is_done());
}

#[tokio::test]
async fn follows_pages_until_more_records_is_false() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(contacts(1..=3), 1, true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(contacts(4..=5), 2, false)))
        .expect(1)
        .mount(&server)
        .await;
    let client = common::client(&server);

    let cursor = client.records().list(list_contacts(None, false)).expect("cursor");
    let records = cursor.try_collect_all().await.expect("records");

    assert_eq!(ids(&records), vec!["1", "2", "3", "4", "5"]);
}

#[tokio::test]
async fn missing_list_key_ends_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"info": {"more_records": true}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let client = common::client(&server);

    let records = client
        .records()
        .list(list_contacts(None, true))
        .expect("cursor")
        .try_collect_all()
        .await
        .expect("no error");

    assert!(records.is_empty());
}

#[tokio::test]
async fn empty_body_ends_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts/search")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let client = common::client(&server);

    let request = SearchRequest::builder()
        .module_name("Contacts")
        .email("nobody@example.com")
        .strict(true)
        .build();
    let mut cursor = client.records().search(request).expect("cursor");

    assert!(cursor.next().await.is_none());
    assert!(cursor.next().await.is_none());
    assert_eq!(cursor.requests_issued(), 1);
}

#[tokio::test]
async fn next_page_follows_server_reported_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(contacts([1]), 5, true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .and(query_param("page", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(contacts([2]), 6, false)))
        .expect(1)
        .mount(&server)
        .await;
    let client = common::client(&server);

    let records = client
        .records()
        .list(list_contacts(None, true))
        .expect("cursor")
        .try_collect_all()
        .await
        .expect("records");

    assert_eq!(ids(&records), vec!["1", "2"]);
}

#[tokio::test]
async fn starting_page_is_honored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("Leads")))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(contacts([7]), 3, false)))
        .expect(1)
        .mount(&server)
        .await;
    let client = common::client(&server);

    let request = ListRequest::builder()
        .module_name("Leads")
        .fields("Email")
        .page(3)
        .build();
    let mut cursor = client.records().list(request).expect("cursor");

    assert_eq!(cursor.current_page(), 3);
    let record = cursor.next().await.expect("item").expect("record");
    assert_eq!(record.id(), Some("7"));
}

#[tokio::test]
async fn strict_cursor_yields_error_with_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(contacts(1..=3), 1, true)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"code": "INTERNAL_ERROR"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let client = common::client(&server);

    let mut cursor = client.records().list(list_contacts(None, true)).expect("cursor");
    for _ in 0..3 {
        cursor.next().await.expect("item").expect("record");
    }
    let err = cursor.next().await.expect("error item").expect_err("failure");

    assert_eq!(err.kind(), Some(ErrorKind::InternalServerError));
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.page(), Some(2));
    assert!(cursor.next().await.is_none());
}

#[tokio::test]
async fn lenient_cursor_ends_silently_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(contacts(1..=3), 1, true)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;
    let client = common::client(&server);

    let records = client
        .records()
        .list(list_contacts(None, false))
        .expect("cursor")
        .try_collect_all()
        .await
        .expect("lenient");

    assert_eq!(ids(&records), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn too_many_requests_quirk_is_classified_on_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Access Denied",
            "error_description": "You have made too many requests continuously. Please try again after some time.",
            "status": "failure"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = common::client(&server);

    let err = client
        .records()
        .list(list_contacts(Some(5), true))
        .expect("cursor")
        .try_collect_all()
        .await
        .expect_err("rate limited");

    assert!(err.is_too_many_requests());
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.page(), Some(1));
}

#[tokio::test]
async fn validation_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = common::client(&server);

    let blank_fields = ListRequest::builder().module_name("Contacts").fields("").build();
    assert!(matches!(
        client.records().list(blank_fields),
        Err(CrmError::Validation(_))
    ));

    let zero_page = ListRequest::builder()
        .module_name("Contacts")
        .fields("Email")
        .page(0)
        .build();
    assert!(matches!(
        client.records().list(zero_page),
        Err(CrmError::Validation(_))
    ));

    let zero_bound = list_contacts(Some(0), false);
    assert!(matches!(
        client.records().list(zero_bound),
        Err(CrmError::Validation(_))
    ));

    let blank_key = PageRequest::new("Contacts", " ", Ok::<Value, CrmError>);
    assert!(matches!(
        client.paginate(blank_key),
        Err(CrmError::Validation(_))
    ));

    assert!(server
        .received_requests()
        .await
        .unwrap_or_default()
        .is_empty());
}

#[tokio::test]
async fn generic_cursor_uses_custom_list_key_and_decoder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("settings/modules")))
        .and(query_param("per_page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "modules": [{"api_name": "Leads"}, {"api_name": "Contacts"}, {"api_name": "Deals"}],
            "info": {"page": 1, "more_records": false}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = common::client(&server);

    let request = PageRequest::new("settings/modules", "modules", |item: Value| {
        item.get("api_name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CrmError::Decode("module without api_name".to_string()))
    })
    .limit(2);
    let names: Vec<String> = client
        .paginate(request)
        .expect("cursor")
        .into_stream()
        .map(|item| item.expect("name"))
        .collect()
        .await;

    assert_eq!(names, vec!["Leads", "Contacts"]);
}

#[tokio::test]
async fn decode_failure_follows_strict_policy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("Contacts")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "1"}, "not-a-record", {"id": "3"}],
            "info": {"page": 1, "more_records": false}
        })))
        .mount(&server)
        .await;
    let client = common::client(&server);

    let mut strict = client.records().list(list_contacts(None, true)).expect("cursor");
    strict.next().await.expect("item").expect("record");
    let err = strict.next().await.expect("error item").expect_err("decode");
    assert!(matches!(err, CrmError::Decode(_)));

    let lenient = client
        .records()
        .list(list_contacts(None, false))
        .expect("cursor")
        .try_collect_all()
        .await
        .expect("lenient");
    assert_eq!(ids(&lenient), vec!["1"]);
}
