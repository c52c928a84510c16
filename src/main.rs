//! crane-ingress - render, apply and delete ingresses for crane deployments

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crane::cli::{Cli, Commands, DeleteArgs, IntentArgs};
use crane_common::kube_utils::KubeconfigProvider;
use crane_common::telemetry::{init_telemetry, TelemetryConfig};
use crane_common::IngressConfig;
use crane_ingress::{render, DeployIntent, IngressDeployer, KubeIngressStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_telemetry(TelemetryConfig {
        service_name: "crane-ingress".to_string(),
        json: cli.log_json,
    })?;

    let config = cli.config.resolve()?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    match cli.command {
        Commands::Render(args) => run_render(args, &config).await,
        Commands::Apply(args) => {
            let store = KubeIngressStore::new(
                KubeconfigProvider::new(cli.kubeconfig)
                    .with_read_timeout(config.request_timeout()),
            );
            let deployer = IngressDeployer::new(config, store)?;
            run_apply(args, &deployer, &cancel).await
        }
        Commands::Delete(args) => {
            let store = KubeIngressStore::new(
                KubeconfigProvider::new(cli.kubeconfig)
                    .with_read_timeout(config.request_timeout()),
            );
            let deployer = IngressDeployer::new(config, store)?;
            run_delete(args, &deployer, &cancel).await
        }
    }
}

async fn read_intent(args: &IntentArgs) -> anyhow::Result<DeployIntent> {
    let content = tokio::fs::read_to_string(&args.file)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read intent file {:?}: {}", args.file, e))?;
    Ok(DeployIntent::from_yaml(&content)?)
}

/// Print the manifest for an intent
async fn run_render(args: IntentArgs, config: &IngressConfig) -> anyhow::Result<()> {
    config.validate()?;
    let intent = read_intent(&args).await?;
    let manifest = render(&intent, config)?;
    print!("{}", manifest.to_yaml()?);
    Ok(())
}

/// Apply the ingress for an intent and print what the server stored
async fn run_apply(
    args: IntentArgs,
    deployer: &IngressDeployer<KubeIngressStore<KubeconfigProvider>>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let intent = read_intent(&args).await?;
    let applied = deployer.deploy(&intent, cancel).await?;
    let yaml = serde_yaml::to_string(&applied)
        .map_err(|e| anyhow::anyhow!("Failed to serialize applied ingress: {}", e))?;
    print!("{yaml}");
    Ok(())
}

/// Delete an ingress; not-found only succeeds with `--ignore-not-found`
async fn run_delete(
    args: DeleteArgs,
    deployer: &IngressDeployer<KubeIngressStore<KubeconfigProvider>>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    match deployer.remove(&args.namespace, &args.name, cancel).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() && args.ignore_not_found => {
            info!(namespace = %args.namespace, name = %args.name, "ingress already absent");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
