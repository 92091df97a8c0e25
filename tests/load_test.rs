//! Concurrent requests against a real listener.

use std::time::Duration;

use axum::http::StatusCode;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_get_identical_payloads() {
    let (addr, shutdown) = common::start_service(None).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let url = format!("http://{}/news", addr);

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..100 {
        let client = client.clone();
        let url = url.clone();
        tasks.spawn(async move {
            let res = client.get(&url).send().await.expect("service unreachable");
            let status = res.status();
            let content_type = res
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body: serde_json::Value = res.json().await.unwrap();
            (status, content_type, body)
        });
    }

    let expected = common::expected_json();
    let mut completed = 0;
    while let Some(result) = tasks.join_next().await {
        let (status, content_type, body) = result.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, expected);
        completed += 1;
    }
    assert_eq!(completed, 100);

    shutdown.trigger();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_monitored_requests_each_record_a_transaction() {
    let (app, reporter) = common::monitored_app();
    let (addr, shutdown) = common::start_service(Some(app.clone())).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..100 {
        let client = client.clone();
        let url = format!("http://{}/path/{}", addr, i);
        tasks.spawn(async move { client.post(&url).send().await.unwrap().status() });
    }
    while let Some(status) = tasks.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::OK);
    }

    assert_eq!(app.harvest(), 100);

    let events = reporter.events();
    assert_eq!(events.len(), 100);
    assert!(events.iter().all(|e| e.name == "GET /news"));

    let mut guids: Vec<_> = events.iter().map(|e| e.guid.clone()).collect();
    guids.sort();
    guids.dedup();
    assert_eq!(guids.len(), 100);

    shutdown.trigger();
}

#[tokio::test]
async fn service_stops_on_shutdown() {
    let (addr, shutdown) = common::start_service(None).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let url = format!("http://{}/", addr);

    assert!(client.get(&url).send().await.unwrap().status().is_success());
    drop(client);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let fresh = reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap();
    assert!(fresh.get(&url).send().await.is_err());
}
