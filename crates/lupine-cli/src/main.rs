mod archive;
mod remote;
mod repl;
mod select;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lupine::{map_archive, MappingStore, MappingVersion};

use crate::archive::ZipSource;
use crate::remote::HttpFetch;

/// Remaps the intermediary names in decompiled Fabric mod sources to
/// human-readable Yarn names.
#[derive(Parser)]
#[command(name = "lupine", version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Target Yarn mapping version. If omitted, picks the most recent
    /// mapping compatible with the game version in the mod metadata.
    #[arg(short, long)]
    mapping_version: Option<String>,

    /// Tiny v1 mapping file to use instead of online version discovery.
    #[arg(short, long)]
    tiny: Option<PathBuf>,

    /// Directory the mapping database is stored in.
    #[arg(short, long, default_value = "./")]
    config_dir: PathBuf,

    /// Directory mapped output is written under.
    #[arg(short, long, default_value = "./")]
    output_dir: PathBuf,

    /// Input sources jar or zip file. If omitted, runs in interactive
    /// mode.
    input: Option<PathBuf>,

    /// Output directory for the mapped sources. If omitted, a directory
    /// named after the input file is used.
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log to stderr so mapped output and shell prompts stay clean.
    const CRATES: &[&str] = &["lupine", "lupine_cli"];
    let level = cli.verbose.tracing_level_filter();
    let allowlist: Vec<String> = CRATES.iter().map(|c| format!("{c}={level}")).collect();
    let filter = EnvFilter::new(format!("warn,{}", allowlist.join(",")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.input {
        None => repl::run(&cli.config_dir, &cli.output_dir),
        Some(input) => remap(&cli, input),
    }
}

/// One-shot mode: pick a mapping version, make sure it is cached, then
/// remap the whole archive.
fn remap(cli: &Cli, input: &Path) -> Result<()> {
    if !input.exists() {
        bail!("input file \"{}\" does not exist", input.display());
    }

    info!("loading mapping database");
    let mut store = MappingStore::open(cli.config_dir.join("mappings.db"))?;

    let version = if let Some(tiny) = &cli.tiny {
        info!("loading mappings from local file");
        if !tiny.exists() {
            bail!("tiny v1 file \"{}\" does not exist", tiny.display());
        }

        store.use_local_file(tiny)?;
        MappingVersion::local(tiny.display().to_string())
    } else {
        let fetch = HttpFetch::default();
        let version = discover_version(cli, input, &store, &fetch)?;
        select::ensure_cached(&store, &fetch, &version)?;
        version
    };

    let output = match &cli.output {
        Some(output) => output.clone(),
        None => repl::default_output_dir(input),
    };
    let dest = cli.output_dir.join(output);

    let source = store
        .get_mapping_set(&version)?
        .with_context(|| format!("mapping set for {} is missing", version.version))?;

    let mut archive = ZipSource::open(input)?;
    let unresolved = map_archive(&*source, &mut archive, &dest)?;
    report_unresolved(&unresolved);

    Ok(())
}

/// Resolves which Yarn version to use: the explicitly requested one, or
/// the latest one compatible with the game version declared in the
/// archive's `fabric.mod.json`.
fn discover_version(
    cli: &Cli,
    input: &Path,
    store: &MappingStore,
    fetch: &HttpFetch,
) -> Result<MappingVersion> {
    info!("fetching mapping versions");
    let listing = select::version_listing(fetch, store)?;

    let requested = match &cli.mapping_version {
        Some(requested) => Some(
            listing
                .iter()
                .find(|v| &v.version == requested)
                .cloned()
                .with_context(|| format!("could not find mapping version {requested}"))?,
        ),
        None => None,
    };

    info!("retrieving game version from archive");
    let game_version = archive::game_version(input)?;

    match requested {
        Some(version) => {
            // A mismatch is only a warning: picking a version by hand
            // usually means the caller knows what they are doing.
            if let Some(game_version) = &game_version {
                if !select::matches_game_version(&version, game_version) {
                    warn!(
                        "game version {game_version} is not compatible with yarn version {}; \
                         some mappings might not exist",
                        version.version
                    );
                }
            }
            Ok(version)
        }
        None => {
            let game_version = game_version.context(
                "could not find fabric.mod.json in archive; specify the Yarn version manually",
            )?;
            info!("found game version {game_version}");

            let version = listing
                .iter()
                .find(|v| select::matches_game_version(v, &game_version))
                .cloned()
                .with_context(|| {
                    format!("could not find a mapping compatible with game version {game_version}")
                })?;

            info!(
                "latest mapping that matches the game version is {}",
                version.version
            );
            Ok(version)
        }
    }
}

/// Prints the soft-failure report of a remap pass.
pub(crate) fn report_unresolved(unresolved: &[String]) {
    if unresolved.is_empty() {
        info!("no failed mappings");
        return;
    }

    warn!("{} failed mappings:", unresolved.len());
    for token in unresolved {
        warn!("  {token}");
    }
}
