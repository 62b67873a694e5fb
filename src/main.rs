use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use maven_meta::config::CacheConfig;
use maven_meta::registries::{GitHubSourceHost, MavenCentralRegistry};
use maven_meta::{MetadataResolver, is_pre_release};

#[derive(Parser)]
#[command(name = "maven-meta")]
#[command(version, about = "Metadata lookups for Maven artifact repositories")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a version specifier (latest, exact, or range) to one version
    Resolve {
        group_id: String,
        artifact_id: String,
        #[arg(default_value = "latest")]
        specifier: String,
    },
    /// List all known versions, newest first
    Versions {
        group_id: String,
        artifact_id: String,
    },
    /// Show the newest version without a pre-release keyword
    LatestStable {
        group_id: String,
        artifact_id: String,
    },
    /// Check whether any artifact exists at the coordinate
    Exists {
        group_id: String,
        artifact_id: String,
    },
    /// Print the POM for a version specifier (defaults to latest)
    Manifest {
        group_id: String,
        artifact_id: String,
        specifier: Option<String>,
    },
    /// Search for artifacts matching a free-text query
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value_t = 0.8)]
        relevance_weight: f64,
        #[arg(long, default_value_t = 0.6)]
        popularity_weight: f64,
    },
    /// Fetch a project README from its source host (best effort)
    Readme { owner: String, repo: String },
    /// Report whether a version string is a pre-release
    PreRelease { version: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command))
}

async fn run(command: Command) -> anyhow::Result<()> {
    let resolver = MetadataResolver::new(
        Arc::new(MavenCentralRegistry::default()),
        &CacheConfig::from_env(),
    )
    .with_source_host(Arc::new(GitHubSourceHost::default()));

    match command {
        Command::Resolve {
            group_id,
            artifact_id,
            specifier,
        } => {
            let version = resolver
                .resolve_version(&group_id, &artifact_id, &specifier)
                .await?;
            println!("{version}");
        }
        Command::Versions {
            group_id,
            artifact_id,
        } => {
            for version in resolver
                .get_available_versions(&group_id, &artifact_id)
                .await?
            {
                println!("{version}");
            }
        }
        Command::LatestStable {
            group_id,
            artifact_id,
        } => {
            let version = resolver
                .get_latest_stable_version(&group_id, &artifact_id)
                .await?;
            println!("{version}");
        }
        Command::Exists {
            group_id,
            artifact_id,
        } => {
            let exists = resolver.exists_package(&group_id, &artifact_id).await?;
            println!("{exists}");
        }
        Command::Manifest {
            group_id,
            artifact_id,
            specifier,
        } => {
            let manifest = resolver
                .get_manifest(&group_id, &artifact_id, specifier.as_deref())
                .await?;
            println!("{manifest}");
        }
        Command::Search {
            query,
            limit,
            relevance_weight,
            popularity_weight,
        } => {
            let hits = resolver
                .search(&query, limit, relevance_weight, popularity_weight)
                .await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Command::Readme { owner, repo } => match resolver.get_readme(&owner, &repo).await {
            Some(readme) => println!("{readme}"),
            None => anyhow::bail!("no README available for {owner}/{repo}"),
        },
        Command::PreRelease { version } => {
            println!("{}", is_pre_release(&version));
        }
    }

    Ok(())
}
