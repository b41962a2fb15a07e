//! Integration tests using wiremock to simulate the Apify API.

use apify_client::models::{Run, Task};
use apify_client::resources::RunOptions;
use apify_client::{
    encode_webhooks, ActorJobStatus, ApifyClient, Capabilities, Error, ErrorKind, ListOptions,
    QueryParams, ResourceClient, ResourceCollectionClient, ResourceOptions, Result, Transport,
    TransportRequest, TransportResponse, WaitForFinishOptions, Webhook, WebhookEventType,
};
use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, max_retries: usize) -> ApifyClient {
    ApifyClient::builder()
        .base_url(server.uri())
        .unwrap()
        .token("secret")
        .max_retries(max_retries)
        .min_delay_between_retries(Duration::from_millis(1))
        .build()
        .unwrap()
}

fn data(value: Value) -> Value {
    json!({ "data": value })
}

fn api_error(error_type: &str, message: &str) -> Value {
    json!({ "error": { "type": error_type, "message": message } })
}

fn run_json(status: &str) -> Value {
    json!({ "id": "run1", "actId": "a1", "status": status })
}

#[tokio::test]
async fn test_get_sends_token_and_decodes_dates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/user~actor"))
        .and(query_param("token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(json!({
            "id": "a1",
            "name": "actor",
            "createdAt": "2019-12-12T07:34:14.202Z",
            "versions": [{ "versionNumber": "0.1" }],
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 0);
    let actor = client.actor("user/actor").get().await.unwrap().unwrap();

    assert_eq!(actor.name, "actor");
    assert_eq!(
        actor.created_at.map(|date| date.timestamp_millis()),
        Some(1576136054202)
    );
    assert_eq!(actor.extra["versions"][0]["versionNumber"], "0.1");
}

#[tokio::test]
async fn test_get_missing_record_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/datasets/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(api_error("record-not-found", "Dataset was not found")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 3);
    assert!(client.dataset("missing").get().await.unwrap().is_none());
    assert_eq!(client.stats().requests, 1);
}

#[tokio::test]
async fn test_delete_missing_record_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/actor-tasks/t1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(api_error("record-not-found", "gone")))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, 3).task("t1").delete().await.unwrap();
}

#[tokio::test]
async fn test_other_not_found_is_client_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/a1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(api_error("page-not-found", "No such page")))
        .expect(1)
        .mount(&server)
        .await;

    let error = client(&server, 3).actor("a1").get().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Client);
    assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(error.error_type(), Some("page-not-found"));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/acts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(api_error("invalid-input", "Name is required")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 5);
    let error = client.actors().create(&json!({})).await.unwrap_err();

    match &error {
        Error::HttpError { status, message, .. } => {
            assert_eq!(*status, StatusCode::BAD_REQUEST);
            assert_eq!(message.as_deref(), Some("Name is required"));
        }
        other => panic!("Expected HttpError, got {:?}", other),
    }
    assert_eq!(client.stats().calls, 1);
    assert_eq!(client.stats().requests, 1);
}

#[tokio::test]
async fn test_server_errors_are_retried_and_counted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/a1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal error"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(json!({ "id": "a1", "name": "n" }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 4);
    let actor = client.actor("a1").get().await.unwrap();

    assert!(actor.is_some());
    let stats = client.stats();
    assert_eq!(stats.calls, 1);
    assert_eq!(stats.requests, 3);
    assert!(stats.rate_limit_errors.iter().all(|&count| count == 0));
}

#[tokio::test]
async fn test_rate_limit_errors_recorded_by_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/logs/r1"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/logs/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2020-01-01 line"))
        .mount(&server)
        .await;

    let client = client(&server, 3);
    let log = client.log("r1").get().await.unwrap();

    assert_eq!(log.as_deref(), Some("2020-01-01 line"));
    let stats = client.stats();
    assert_eq!(stats.requests, 2);
    assert_eq!(stats.rate_limit_errors, vec![1, 0, 0]);
}

#[tokio::test]
async fn test_exhausted_budget_reports_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/datasets"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = client(&server, 2);
    let error = client
        .datasets()
        .list(&ListOptions::new(), false)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::RetryBudgetExhausted);
    match error {
        Error::RetryBudgetExhausted { attempts, last_error } => {
            assert_eq!(attempts, 3);
            assert_eq!(last_error.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        }
        other => panic!("Expected RetryBudgetExhausted, got {:?}", other),
    }
    assert_eq!(client.stats().requests, 3);
}

#[tokio::test]
async fn test_list_sends_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/a1/runs"))
        .and(query_param("limit", "5"))
        .and(query_param("offset", "3"))
        .and(query_param("desc", "true"))
        .and(query_param("status", "SUCCEEDED"))
        .and(query_param("token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(json!({
            "total": 9,
            "offset": 3,
            "limit": 5,
            "count": 1,
            "desc": true,
            "items": [{
                "id": "run1",
                "status": "SUCCEEDED",
                "startedAt": "2019-12-12T07:34:14.202Z",
            }],
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server, 0)
        .actor("a1")
        .runs()
        .list(
            &ListOptions::new().limit(5).offset(3).desc(true),
            Some(ActorJobStatus::Succeeded),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 9);
    assert_eq!(page.items[0].status, ActorJobStatus::Succeeded);
    assert!(page.items[0].started_at.is_some());
}

#[tokio::test]
async fn test_get_or_create_has_one_shape() {
    let server = MockServer::start().await;
    let dataset = data(json!({ "id": "d1", "name": "results" }));

    Mock::given(method("POST"))
        .and(path("/v2/datasets"))
        .and(query_param("name", "results"))
        .respond_with(ResponseTemplate::new(201).set_body_json(&dataset))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/datasets"))
        .and(query_param("name", "results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&dataset))
        .mount(&server)
        .await;

    let datasets = client(&server, 0).datasets();
    let created = datasets.get_or_create("results").await.unwrap();
    let existing = datasets.get_or_create("results").await.unwrap();

    assert_eq!(created, existing);
    assert_eq!(created.name.as_deref(), Some("results"));
}

#[tokio::test]
async fn test_disabled_verb_sends_nothing() {
    let server = MockServer::start().await;
    let client = client(&server, 0);

    let runs = ResourceCollectionClient::new(
        ResourceOptions::new(client.http_client().clone(), "actor-runs", QueryParams::new()),
        Capabilities::read_only(),
    );
    let error = runs.create::<_, Value>(&json!({})).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NotSupported);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(client.stats().requests, 0);
}

#[tokio::test]
async fn test_start_sends_options_and_webhooks() {
    let server = MockServer::start().await;
    let webhooks = vec![Webhook::new(
        [WebhookEventType::RunSucceeded],
        "https://example.com/hook",
    )];

    Mock::given(method("POST"))
        .and(path("/v2/actor-tasks/t1/runs"))
        .and(query_param("memory", "256"))
        .and(query_param("webhooks", encode_webhooks(&webhooks).unwrap().as_str()))
        .and(body_json(json!({ "url": "https://example.com" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(data(run_json("READY"))))
        .expect(1)
        .mount(&server)
        .await;

    let options = RunOptions {
        webhooks,
        ..RunOptions::new()
            .memory_mbytes(256)
            .input(json!({ "url": "https://example.com" }))
    };
    let run = client(&server, 0).task("t1").start(&options).await.unwrap();

    assert_eq!(run.status, ActorJobStatus::Ready);
}

#[tokio::test]
async fn test_wait_for_finish_on_finished_job_fetches_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/user~actor/builds/b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(json!({
            "id": "b1",
            "status": "SUCCEEDED",
            "finishedAt": "2019-12-12T07:34:14.202Z",
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let started = Instant::now();
    let build = client(&server, 0)
        .build("b1", "user/actor")
        .wait_for_finish(&WaitForFinishOptions::new().wait_secs(0))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(build.status, ActorJobStatus::Succeeded);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_wait_for_finish_without_representable_deadline() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/a1/runs/run1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(run_json("SUCCEEDED"))))
        .expect(1)
        .mount(&server)
        .await;

    let run = client(&server, 0)
        .run("run1", "a1")
        .wait_for_finish(&WaitForFinishOptions::new().wait_secs(u64::MAX))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(run.status, ActorJobStatus::Succeeded);
}

#[tokio::test]
async fn test_wait_for_finish_zero_wait_returns_unfinished_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/a1/runs/run1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(run_json("RUNNING"))))
        .expect(1)
        .mount(&server)
        .await;

    let run = client(&server, 0)
        .run("run1", "a1")
        .wait_for_finish(&WaitForFinishOptions::new().wait_secs(0))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(run.status, ActorJobStatus::Running);
}

#[tokio::test]
async fn test_wait_for_finish_polls_until_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/a1/runs/run1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(run_json("RUNNING"))))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/a1/runs/run1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(run_json("FAILED"))))
        .expect(1)
        .mount(&server)
        .await;

    let options = WaitForFinishOptions::new()
        .wait_secs(30)
        .poll_interval(Duration::from_millis(5))
        .max_poll_interval(Duration::from_millis(10));
    let client = client(&server, 0);
    let run = client
        .run("run1", "a1")
        .wait_for_finish(&options)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(run.status, ActorJobStatus::Failed);
    assert_eq!(client.stats().calls, 3);
}

#[tokio::test]
async fn test_wait_for_finish_on_missing_job_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/a1/runs/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(api_error("record-not-found", "Run not found")))
        .expect(1)
        .mount(&server)
        .await;

    let run = client(&server, 0)
        .run("gone", "a1")
        .wait_for_finish(&WaitForFinishOptions::new())
        .await
        .unwrap();

    assert!(run.is_none());
}

#[tokio::test]
async fn test_abort_and_log() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/acts/a1/runs/run1/abort"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(run_json("ABORTING"))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/a1/runs/run1/log"))
        .respond_with(ResponseTemplate::new(404).set_body_json(api_error("record-not-found", "No log")))
        .expect(1)
        .mount(&server)
        .await;

    let run = client(&server, 0).run("run1", "a1");

    assert_eq!(run.abort().await.unwrap().status, ActorJobStatus::Aborting);
    assert!(run.log().await.unwrap().is_none());
}

#[tokio::test]
async fn test_derived_clients_share_statistics() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(json!({
            "id": "x",
            "name": "x",
            "total": 0,
            "offset": 0,
            "limit": 0,
            "items": [],
        }))))
        .mount(&server)
        .await;

    let client = client(&server, 0);
    let actor = client.actor("a1");
    actor.get().await.unwrap();
    actor.builds().list(&ListOptions::new()).await.unwrap();
    client.dataset("d1").get().await.unwrap();

    let stats = client.stats();
    assert_eq!(stats.calls, 3);
    assert_eq!(stats.requests, 3);
}

/// Fails the first `failures` attempts without a response, then answers.
struct FlakyTransport {
    failures: usize,
    attempts: AtomicUsize,
}

#[async_trait]
impl Transport for FlakyTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(Error::Transport("connection reset".to_string()));
        }
        assert_eq!(request.url.path(), "/v2/acts/a1");
        Ok(TransportResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: data(json!({ "id": "a1", "name": "flaky" })).to_string(),
        })
    }
}

#[tokio::test]
async fn test_custom_transport_failures_are_retried() {
    let transport = Arc::new(FlakyTransport {
        failures: 2,
        attempts: AtomicUsize::new(0),
    });

    let client = ApifyClient::builder()
        .base_url("http://localhost:1")
        .unwrap()
        .max_retries(2)
        .min_delay_between_retries(Duration::from_millis(1))
        .transport(transport.clone())
        .build()
        .unwrap();

    let actor = client.actor("a1").get().await.unwrap().unwrap();

    assert_eq!(actor.name, "flaky");
    assert_eq!(transport.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(client.stats().requests, 3);
}

#[tokio::test]
async fn test_empty_id_rejected_before_io() {
    let server = MockServer::start().await;
    let client = client(&server, 0);

    let error = client.actor("").get().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Validation);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_puts_patch_and_unwraps_data() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/actor-tasks/t1"))
        .and(query_param("token", "secret"))
        .and(body_json(json!({ "name": "renamed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(json!({
            "id": "t1",
            "name": "renamed",
            "modifiedAt": "2020-01-01T00:00:00.000Z",
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let task: Task = client(&server, 0)
        .task("t1")
        .update(&json!({ "name": "renamed" }))
        .await
        .unwrap();

    assert_eq!(task.name.as_deref(), Some("renamed"));
    assert!(task.modified_at.is_some());
}

#[tokio::test]
async fn test_resource_list_under_sub_resource() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/acts/user~actor/runs"))
        .and(query_param("limit", "5"))
        .and(query_param("offset", "3"))
        .and(query_param("desc", "true"))
        .and(query_param("token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(json!({
            "total": 4,
            "offset": 3,
            "limit": 5,
            "count": 1,
            "desc": true,
            "items": [run_json("ABORTED")],
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 0);
    let runs = ResourceClient::new(
        client
            .actor("user/actor")
            .resource()
            .sub_resource_options("runs", None),
    );
    let page = runs
        .list::<Run>(&ListOptions::new().limit(5).offset(3).desc(true))
        .await
        .unwrap();

    assert_eq!((page.total, page.offset, page.limit), (4, 3, 5));
    assert_eq!(page.count, Some(1));
    assert_eq!(page.desc, Some(true));
    assert_eq!(page.items[0].id, "run1");
    assert_eq!(page.items[0].status, ActorJobStatus::Aborted);
}
