use httpmock::prelude::*;
use mongodb_monitor::{HttpPusher, Instance, MonitorConfig, PushOutcome, Runner};
use mongodb_monitor_devkit::fixtures::MINIMAL_STATUS;
use mongodb_monitor_devkit::ScriptedFetcher;
use std::time::Duration;

fn config(instances: Vec<Instance>) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.instances = instances;
    config
}

#[tokio::test]
async fn test_combined_batch_is_posted_once() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/push")
                .body_includes("\"metric\":\"mongo.opcounters.insert\"")
                .body_includes("\"tags\":\"port=27018\"")
                .body_includes("\"counterType\":\"COUNTER\"");
            then.status(200).body("success");
        })
        .await;

    let healthy = Instance::new("10.0.0.1", 27018);
    let down = Instance::new("10.0.0.2", 27017);
    let fetcher = ScriptedFetcher::new().alive(&healthy, MINIMAL_STATUS).unreachable(&down);
    let pusher = HttpPusher::with_timeout(server.url("/v1/push"), Duration::from_secs(5)).unwrap();

    let summary = Runner::new(&config(vec![healthy, down]), fetcher, pusher, "collector01")
        .run()
        .await;

    mock.assert_calls_async(1).await;
    assert_eq!(
        summary.push,
        PushOutcome::Delivered {
            status: 200,
            body: "success".into()
        }
    );
}

#[tokio::test]
async fn test_no_request_when_everything_is_down() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/push");
            then.status(200);
        })
        .await;

    let down = Instance::new("10.0.0.2", 27017);
    let fetcher = ScriptedFetcher::new().unreachable(&down);
    let pusher = HttpPusher::with_timeout(server.url("/v1/push"), Duration::from_secs(5)).unwrap();

    let summary = Runner::new(&config(vec![down]), fetcher, pusher, "collector01").run().await;

    mock.assert_calls_async(0).await;
    assert_eq!(summary.push, PushOutcome::Skipped);
}

#[tokio::test]
async fn test_push_agent_down_still_completes() {
    let healthy = Instance::new("10.0.0.1", 27017);
    let fetcher = ScriptedFetcher::new().alive(&healthy, MINIMAL_STATUS);
    let pusher = HttpPusher::with_timeout("http://127.0.0.1:9/v1/push", Duration::from_secs(2)).unwrap();

    let summary = Runner::new(&config(vec![healthy]), fetcher, pusher, "collector01").run().await;

    assert_eq!(summary.records, 2);
    assert!(matches!(summary.push, PushOutcome::Failed(_)));
}
