use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use balance_exporter::handlers::router;
use balance_exporter::models::ShellTarget;
use balance_exporter::{
    Aggregator, CommandOutput, CommandRunner, DispatchAdapter, ExpositionLayout, RefreshScheduler,
    RpcAdapter, RpcTransport, SchedulerState, ShellAdapter, SnapshotCache, Target,
};

/// Prints a balance that grows by one ETH per call, after a delay
struct SlowNode {
    calls: AtomicU64,
    delay: Duration,
}

#[async_trait]
impl CommandRunner for SlowNode {
    async fn run(&self, target: &ShellTarget) -> balance_exporter::Result<CommandOutput> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if target.ssh_target.contains("offline") {
            return Ok(CommandOutput {
                stdout: String::new(),
                stderr: "ssh: connect to host offline port 22: Connection refused\n".to_string(),
                exit_code: Some(255),
            });
        }
        Ok(CommandOutput {
            stdout: format!("Balances\nETH: {}.0\nsITX: 10\n", call),
            stderr: String::new(),
            exit_code: Some(0),
        })
    }
}

struct StaticChain;

#[async_trait]
impl RpcTransport for StaticChain {
    async fn call(&self, method: &str, _params: Value) -> balance_exporter::Result<Value> {
        Ok(match method {
            "eth_getBalance" => json!({"jsonrpc": "2.0", "id": 1, "result": "0xde0b6b3a7640000"}),
            _ => json!({"jsonrpc": "2.0", "id": 2, "error": {"code": -32000, "message": "execution reverted"}}),
        })
    }
}

async fn get(cache: &SnapshotCache, uri: &str) -> (StatusCode, String) {
    let response = router(cache.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn reward_scheduler(delay: Duration) -> (Arc<RefreshScheduler>, SnapshotCache) {
    let runner = Arc::new(SlowNode {
        calls: AtomicU64::new(0),
        delay,
    });
    let adapter = DispatchAdapter::new().with_shell(Arc::new(ShellAdapter::new(
        runner,
        Duration::from_secs(5),
    )));
    let aggregator = Arc::new(Aggregator::new(Arc::new(adapter), ExpositionLayout::reward()));
    let targets = vec![
        Target::shell("alpha", "builder@alpha", "/opt/intmax2/cli", "/opt/keys/alpha"),
        Target::shell("beta", "builder@offline", "/opt/intmax2/cli", "/opt/keys/beta"),
    ];
    let cache = SnapshotCache::new();
    let scheduler = Arc::new(RefreshScheduler::new(
        aggregator,
        targets,
        cache.clone(),
        Duration::from_secs(3600),
    ));
    (scheduler, cache)
}

fn is_complete(doc: &str) -> bool {
    doc.lines().filter(|l| l.starts_with("intmax_builder_reward_eth{")).count() == 2
        && doc.lines().filter(|l| l.starts_with("intmax_builder_reward_check_success{")).count() == 2
        && doc.contains("intmax_builder_reward_total_eth ")
        && doc.trim_end().lines().last().unwrap().starts_with("intmax_builder_reward_last_check ")
}

#[tokio::test]
async fn test_first_snapshot_is_served_after_prime() {
    let (scheduler, cache) = reward_scheduler(Duration::ZERO);
    scheduler.prime().await;

    let (status, doc) = get(&cache, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(is_complete(&doc));
    assert!(doc.contains("intmax_builder_reward_eth{node=\"alpha\"} 1\n"));
    assert!(doc.contains("intmax_builder_reward_sitx{node=\"alpha\"} 10\n"));
    assert!(doc.contains("intmax_builder_reward_check_success{node=\"alpha\"} 1\n"));
    assert!(doc.contains("intmax_builder_reward_eth{node=\"beta\"} 0\n"));
    assert!(doc.contains("intmax_builder_reward_check_success{node=\"beta\"} 0\n"));
    assert!(doc.contains("intmax_builder_reward_total_eth 1\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reads_during_refresh_see_complete_snapshots() {
    let (scheduler, cache) = reward_scheduler(Duration::from_millis(100));
    scheduler.prime().await;
    let before = cache.load().rendered_text.clone();

    let refreshing = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.refresh_once().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(scheduler.state(), SchedulerState::Refreshing);

    let mut readers = Vec::new();
    for _ in 0..32 {
        let cache = cache.clone();
        readers.push(tokio::spawn(async move {
            let mut docs = Vec::new();
            for _ in 0..10 {
                let (status, doc) = get(&cache, "/metrics").await;
                assert_eq!(status, StatusCode::OK);
                docs.push(doc);
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            let (status, body) = get(&cache, "/health").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, "OK");
            docs
        }));
    }

    refreshing.await.unwrap().unwrap();
    let after = cache.load().rendered_text.clone();
    assert_ne!(before, after);

    for reader in readers {
        for doc in reader.await.unwrap() {
            assert!(is_complete(&doc));
            assert!(doc == before || doc == after, "reader saw an unpublished document");
        }
    }
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[tokio::test]
async fn test_wallet_exporter_degrades_rpc_errors_to_zero() {
    let adapter = DispatchAdapter::new().with_rpc(Arc::new(RpcAdapter::new(
        Arc::new(StaticChain),
        "0xc0579287f3CDE6BF796BE6E2bB61DbB06DA85024".to_string(),
    )));
    let aggregator = Arc::new(Aggregator::new(Arc::new(adapter), ExpositionLayout::wallet()));
    let cache = SnapshotCache::new();
    let scheduler = RefreshScheduler::new(
        aggregator,
        vec![Target::rpc("0x1111111111111111111111111111111111111111")],
        cache.clone(),
        Duration::from_secs(3600),
    );
    scheduler.prime().await;

    let (_, doc) = get(&cache, "/metrics").await;
    let address = "0x1111111111111111111111111111111111111111";
    assert!(doc.contains(&format!("intmax_wallet_eth{{address=\"{}\"}} 1\n", address)));
    assert!(doc.contains(&format!("intmax_wallet_sitx{{address=\"{}\"}} 0\n", address)));
    assert!(doc.contains(&format!(
        "intmax_wallet_check_success{{address=\"{}\"}} 1\n",
        address
    )));
    assert!(doc.contains("intmax_wallet_sitx_total 0\n"));
}

#[tokio::test]
async fn test_zero_targets_keeps_serving() {
    let aggregator = Arc::new(Aggregator::new(
        Arc::new(DispatchAdapter::new()),
        ExpositionLayout::reward(),
    ));
    let cache = SnapshotCache::new();
    let scheduler =
        RefreshScheduler::new(aggregator, Vec::new(), cache.clone(), Duration::from_secs(3600));
    scheduler.prime().await;

    let (status, doc) = get(&cache, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc.starts_with("# No targets configured\n"));
    assert!(doc.contains("intmax_builder_reward_total_eth 0\n"));
    assert!(doc.contains("intmax_builder_reward_total_sitx 0\n"));

    let (status, body) = get(&cache, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let (status, _) = get(&cache, "/favicon.ico").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
