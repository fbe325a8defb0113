use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use balance_exporter::config::{ExporterConfig, Profile};
use balance_exporter::handlers;
use balance_exporter::{
  Aggregator, DispatchAdapter, HttpRpcTransport, RefreshScheduler, RpcAdapter,
  ShellAdapter, SnapshotCache, SourceAdapter, SshCommandRunner,
};

fn build_adapter(config: &ExporterConfig) -> anyhow::Result<Arc<dyn SourceAdapter>> {
  let adapter = match config.profile {
    Profile::Reward => {
      let runner = SshCommandRunner::new(
        config.shell.ssh_key_path.clone(),
        config.shell.connect_timeout,
      )
      .with_remote_binary(config.shell.remote_binary.clone());

      DispatchAdapter::new().with_shell(Arc::new(ShellAdapter::new(
        Arc::new(runner),
        config.shell.command_timeout,
      )))
    }
    Profile::Wallet => {
      let transport =
        HttpRpcTransport::new(config.rpc.url.clone(), config.rpc.call_timeout)
          .context("failed to build RPC client")?;

      DispatchAdapter::new().with_rpc(Arc::new(RpcAdapter::new(
        Arc::new(transport),
        config.rpc.token_contract.clone(),
      )))
    }
  };

  Ok(Arc::new(adapter))
}

fn log_config(config: &ExporterConfig) {
  info!("=== {} ===", config.profile.title());
  info!("Listen: {}", config.listen_addr);
  info!("Update interval: {}s", config.update_interval.as_secs());

  match config.profile {
    Profile::Reward => {
      if let Some(key) = &config.shell.ssh_key_path {
        info!("SSH key: {}", key.display());
      }
    }
    Profile::Wallet => {
      info!("sITX Contract: {}", config.rpc.token_contract);
      info!("RPC URL: {}", config.rpc.url);
    }
  }

  if config.targets.is_empty() {
    match config.profile {
      Profile::Reward => {
        error!("No nodes configured!");
        error!("Set NODES_CONFIG environment variable");
        error!("Format: name1:user@host:cli_dir:spend_key_file,name2:...");
      }
      Profile::Wallet => {
        error!("No wallet addresses configured!");
        error!("Set WALLET_ADDRESSES environment variable");
      }
    }
    warn!("Serving an empty document until targets are configured");
  } else {
    info!("Configured targets: {:?}", config.target_names());
  }
}

fn main() -> anyhow::Result<()> {
  // Initialize logging
  tracing_subscriber::fmt()
    .with_level(true)
    .with_target(false)
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_file(true)
    .with_line_number(true)
    .init();

  dotenvy::dotenv().ok();

  let config = ExporterConfig::from_env().context("invalid configuration")?;
  log_config(&config);

  tokio::runtime::Runtime::new()?.block_on(async {
    let cache = SnapshotCache::new();
    let aggregator = Arc::new(
      Aggregator::new(build_adapter(&config)?, config.profile.layout())
        .with_concurrency(config.concurrency),
    );
    let scheduler = Arc::new(RefreshScheduler::new(
      aggregator,
      config.targets.clone(),
      cache.clone(),
      config.update_interval,
    ));

    // First pass completes before the listener accepts connections
    scheduler.prime().await;
    let refresh = scheduler.clone().spawn();

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
      .await
      .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    handlers::serve(listener, cache).await?;

    refresh.abort();
    Ok(())
  })
}
