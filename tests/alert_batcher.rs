use std::{collections::HashSet, sync::Arc, time::Duration};

use alert_digest::{
    channels::WebhookChannel,
    config::WebhookChannelConfig,
    engine::{AlertBatcher, BatcherSettings, SystemClock},
    models::Severity,
    notification::DigestRenderer,
    test_helpers::{AlertInputBuilder, ManualClock, RecordingChannel, settle},
};
use tokio::time::sleep;

const WINDOW: Duration = Duration::from_secs(30);

fn create_batcher(channel: Arc<RecordingChannel>) -> (AlertBatcher, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let batcher = AlertBatcher::new(
        BatcherSettings { window: WINDOW, default_notify_target: None },
        clock.clone(),
        channel,
        DigestRenderer::default(),
    );
    (batcher, clock)
}

#[tokio::test]
async fn test_dashboard_scenario_is_delivered_as_one_digest() {
    let channel = Arc::new(RecordingChannel::new());
    let (batcher, clock) = create_batcher(channel.clone());

    let inputs = [
        AlertInputBuilder::new("web-2").severity("warning").metric("CPU").values(81, 80),
        AlertInputBuilder::new("db-1").severity("critical").metric("disk").values(97, 90),
        AlertInputBuilder::new("web-1").severity("warning").metric("mem").values(88, 85),
    ];
    for input in inputs {
        batcher.add_alert(input.build()).await.unwrap();
        clock.advance(Duration::from_secs(5));
    }

    clock.advance(Duration::from_secs(15));
    let notification = channel.next_delivery().await.expect("digest after the window closes");

    assert_eq!(notification.subject, "3 alerts across 3 hosts — highest severity: CRITICAL");
    let sections: Vec<(Severity, Vec<&str>)> = notification
        .digest
        .sections
        .iter()
        .map(|s| (s.severity, s.alerts.iter().map(|a| a.host.as_str()).collect()))
        .collect();
    assert_eq!(
        sections,
        vec![(Severity::Critical, vec!["db-1"]), (Severity::Warning, vec!["web-1", "web-2"])]
    );

    settle().await;
    assert_eq!(channel.deliveries().len(), 1);
    assert_eq!(batcher.pending_count().await, 0);
}

#[tokio::test]
async fn test_alerts_added_during_delivery_start_a_new_window() {
    let channel = Arc::new(RecordingChannel::gated());
    let (batcher, _clock) = create_batcher(channel.clone());

    batcher.add_alert(AlertInputBuilder::new("a").build()).await.unwrap();
    batcher.add_alert(AlertInputBuilder::new("b").build()).await.unwrap();

    let flushing = batcher.clone();
    let in_flight = tokio::spawn(async move { flushing.force_flush().await });
    channel.wait_for_send_started().await;

    batcher.add_alert(AlertInputBuilder::new("c").build()).await.unwrap();
    let stats = batcher.stats().await;
    assert_eq!(stats.pending_alerts, 1);
    assert_eq!(stats.next_flush_in_ms, Some(30_000));

    channel.release();
    assert!(in_flight.await.unwrap());

    let first = channel.next_delivery().await.unwrap();
    let hosts: Vec<&str> =
        first.digest.sections[0].alerts.iter().map(|a| a.host.as_str()).collect();
    assert_eq!(hosts, vec!["a", "b"]);

    channel.release();
    assert!(batcher.force_flush().await);
    let second = channel.next_delivery().await.unwrap();
    assert_eq!(second.digest.total_alerts, 1);
    assert_eq!(second.digest.sections[0].alerts[0].host, "c");
}

#[tokio::test]
async fn test_concurrent_force_flushes_deliver_once() {
    let channel = Arc::new(RecordingChannel::gated());
    let (batcher, _clock) = create_batcher(channel.clone());
    batcher.add_alert(AlertInputBuilder::new("web-1").build()).await.unwrap();

    let first = tokio::spawn({
        let batcher = batcher.clone();
        async move { batcher.force_flush().await }
    });
    channel.wait_for_send_started().await;
    let second = tokio::spawn({
        let batcher = batcher.clone();
        async move { batcher.force_flush().await }
    });
    settle().await;
    channel.release();

    let results = [first.await.unwrap(), second.await.unwrap()];
    assert_eq!(results.iter().filter(|flushed| **flushed).count(), 1);
    assert_eq!(channel.deliveries().len(), 1);
}

#[tokio::test]
async fn test_timer_expiring_during_forced_flush_is_ignored() {
    let channel = Arc::new(RecordingChannel::gated());
    let (batcher, clock) = create_batcher(channel.clone());
    batcher.add_alert(AlertInputBuilder::new("web-1").build()).await.unwrap();

    let in_flight = tokio::spawn({
        let batcher = batcher.clone();
        async move { batcher.force_flush().await }
    });
    channel.wait_for_send_started().await;

    clock.advance(WINDOW);
    settle().await;
    channel.release();
    assert!(in_flight.await.unwrap());

    settle().await;
    assert_eq!(channel.deliveries().len(), 1);
    assert_eq!(batcher.stats().await.flushes, 1);
}

#[tokio::test]
async fn test_delivery_failure_is_counted_and_next_window_recovers() {
    let channel = Arc::new(RecordingChannel::new());
    let (batcher, clock) = create_batcher(channel.clone());

    channel.set_failing(true);
    batcher.add_alert(AlertInputBuilder::new("web-1").build()).await.unwrap();
    clock.advance(WINDOW);
    settle().await;

    let stats = batcher.stats().await;
    assert_eq!(stats.delivery_failures, 1);
    assert_eq!(stats.pending_alerts, 0);
    assert!(channel.deliveries().is_empty());

    channel.set_failing(false);
    batcher.add_alert(AlertInputBuilder::new("web-2").build()).await.unwrap();
    clock.advance(WINDOW);

    let notification = channel.next_delivery().await.expect("next window should be delivered");
    assert_eq!(notification.digest.sections[0].alerts[0].host, "web-2");
    assert_eq!(batcher.stats().await.alerts_delivered, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_land_in_a_single_batch() {
    let channel = Arc::new(RecordingChannel::new());
    let (batcher, _clock) = create_batcher(channel.clone());

    let mut producers = Vec::new();
    for producer in 0..8 {
        let batcher = batcher.clone();
        producers.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for i in 0..25 {
                let host = format!("host-{producer}-{i}");
                ids.push(batcher.add_alert(AlertInputBuilder::new(&host).build()).await.unwrap());
            }
            ids
        }));
    }

    let mut ids = HashSet::new();
    for producer in producers {
        ids.extend(producer.await.unwrap());
    }
    assert_eq!(ids.len(), 200);

    assert!(batcher.force_flush().await);
    let deliveries = channel.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].digest.total_alerts, 200);
    assert_eq!(deliveries[0].digest.host_count, 200);
}

#[tokio::test]
async fn test_window_flushes_to_webhook_with_system_clock() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/digest")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"recipients": ["ops@example.com"], "digest": {"total_alerts": 2}}"#.to_string(),
        ))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let channel = WebhookChannel::new(WebhookChannelConfig {
        url: format!("{}/digest", server.url()).parse().unwrap(),
        timeout: Duration::from_secs(5),
        headers: Default::default(),
    })
    .unwrap();
    let batcher = AlertBatcher::new(
        BatcherSettings {
            window: Duration::from_millis(200),
            default_notify_target: Some("ops@example.com".to_string()),
        },
        Arc::new(SystemClock),
        Arc::new(channel),
        DigestRenderer::default(),
    );

    batcher.add_alert(AlertInputBuilder::new("web-1").build()).await.unwrap();
    batcher.add_alert(AlertInputBuilder::new("web-2").build()).await.unwrap();

    sleep(Duration::from_millis(800)).await;

    mock.assert_async().await;
    let stats = batcher.stats().await;
    assert_eq!(stats.flushes, 1);
    assert_eq!(stats.alerts_delivered, 2);
}
