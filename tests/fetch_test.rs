mod support;

use chargepoint_console::collection::{get_all, get_by_id, search, Filter, SearchParameters, Sort};
use chargepoint_console::error::FetchError;
use chargepoint_console::model::{Firmware, UserRole};
use chargepoint_console::resources;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use support::{ok, page, status, unreachable, RecordingTransport};

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: i64,
}

#[tokio::test]
async fn search_returns_envelope_unmodified() {
    let transport = RecordingTransport::with_responses(vec![page(&[3, 1, 2], 7)]);
    let params = SearchParameters::new(3, 0);
    let result = search::<Item, _>(&transport, "/api/user/search", Some(&params))
        .await
        .unwrap();
    assert_eq!(result.total, 7);
    assert_eq!(result.data, vec![Item { id: 3 }, Item { id: 1 }, Item { id: 2 }]);

    let requests = transport.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].target, "/api/user/search?size=3&page=0");
    assert!(requests[0].body.is_none());
}

#[tokio::test]
async fn search_encodes_filters_and_sort_in_target() {
    let transport = RecordingTransport::with_responses(vec![page(&[], 0)]);
    let params = SearchParameters::new(20, 2)
        .with_filter(Filter::new("email", "notEmail"))
        .with_filter(Filter::less_than("lastUpdate", "2024-01-01"))
        .with_sort(Sort::desc("lastUpdate"));
    search::<Item, _>(&transport, "/api/chargepoint/search", Some(&params))
        .await
        .unwrap();
    assert_eq!(
        transport.targets().await,
        vec![
            "/api/chargepoint/search?size=20&page=2&request=email:%60notEmail%60,lastUpdate%3C%602024-01-01%60&sortBy=lastUpdate&order=desc"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn search_without_parameters_requests_bare_path() {
    let transport = RecordingTransport::with_responses(vec![page(&[1], 1)]);
    search::<Item, _>(&transport, "/api/log/business/search", None)
        .await
        .unwrap();
    assert_eq!(transport.targets().await, vec!["/api/log/business/search".to_string()]);
}

#[tokio::test]
async fn non_success_status_is_absent() {
    let transport = RecordingTransport::with_responses(vec![status(500, "boom")]);
    let err = search::<Item, _>(&transport, "/api/user/search", Some(&SearchParameters::new(10, 0)))
        .await
        .unwrap_err();
    assert!(err.is_absent());
    match err {
        FetchError::Status { path, status } => {
            assert_eq!(path, "/api/user/search?size=10&page=0");
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_and_empty_payloads_are_absent() {
    let transport = RecordingTransport::with_responses(vec![
        ok(json!({ "unexpected": true })),
        status(200, ""),
    ]);
    let err = search::<Item, _>(&transport, "/api/firmware/search", None)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
    let err = get_by_id::<Item, _, _>(&transport, "/api/firmware", 9)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Empty { .. }));
    assert_eq!(err.path(), Some("/api/firmware/9"));
}

#[tokio::test]
async fn transport_failure_is_not_absent() {
    let transport = RecordingTransport::with_responses(vec![unreachable()]);
    let err = get_all::<Item, _>(&transport, "/api/type/all").await.unwrap_err();
    assert!(!err.is_absent());
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn get_all_and_get_by_id() {
    let transport = RecordingTransport::with_responses(vec![
        ok(json!([{ "id": 1 }, { "id": 2 }])),
        ok(json!({ "id": 42 })),
    ]);
    let all: Vec<Item> = get_all(&transport, "/api/configuration/all").await.unwrap();
    assert_eq!(all.len(), 2);
    let one: Item = get_by_id(&transport, "/api/configuration/", 42).await.unwrap();
    assert_eq!(one, Item { id: 42 });
    assert_eq!(
        transport.targets().await,
        vec!["/api/configuration/all".to_string(), "/api/configuration/42".to_string()]
    );
}

#[tokio::test]
async fn typed_resources_decode_backend_entities() {
    let transport = RecordingTransport::with_responses(vec![
        ok(json!({
            "id": 5,
            "version": "2.1.0",
            "constructor": "Schneider",
            "url": "https://firmware.example.com/2.1.0.bin",
            "typesAllowed": [{ "id": 1, "constructor": "Schneider", "type": "EVlink" }]
        })),
        ok(json!(["VISUALIZER", "EDITOR", "ADMINISTRATOR"])),
    ]);
    let firmware: Firmware = resources::get_firmware(&transport, 5).await.unwrap();
    assert_eq!(firmware.version, "2.1.0");
    assert_eq!(firmware.types_allowed[0].kind, "EVlink");

    let roles = resources::all_roles(&transport).await.unwrap();
    assert_eq!(roles, UserRole::ALL.to_vec());
    assert_eq!(
        transport.targets().await,
        vec!["/api/firmware/5".to_string(), "/api/user/allRoles".to_string()]
    );
}
