//! The build run: clean, compile every target, optionally pack.

use crate::cli::RuntimeConfig;
use crate::config::BuildConfig;
use crate::error::{CliError, Result};
use crate::pack::{self, Context, PackedArchive};
use crate::target::{TargetBuilder, TargetOs};
use std::path::PathBuf;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Built targets and their output directories, in build order
    pub targets: Vec<(TargetOs, PathBuf)>,
    /// Archive, when packing was requested
    pub archive: Option<PackedArchive>,
    /// Checksum sidecar path and hex digest, when requested
    pub checksum: Option<(PathBuf, String)>,
}

/// Run the whole build described by `config`.
///
/// Phases run strictly in order and the first failure ends the run.
pub async fn execute_build(config: &BuildConfig, runtime: &RuntimeConfig) -> Result<BuildSummary> {
    runtime.verbose_println(&format!("Cleaning {}", config.build_dir.display()));
    crate::utils::fs::remove_dir_all(&config.build_dir)
        .await
        .map_err(|e| CliError::ExecutionFailed {
            command: format!("remove {}", config.build_dir.display()),
            reason: e.to_string(),
        })?;

    let builder = TargetBuilder::new(config)?;
    runtime.verbose_println(&format!("Using Go toolchain at {}", builder.go().display()));

    let mut targets = Vec::new();
    for os in config.targets() {
        runtime.section(&format!("{}/{}", os, config.arch));
        let output_dir = builder.build(os, runtime).await?;
        runtime.success_println(&format!("Built {} into {}", os, output_dir.display()));
        targets.push((os, output_dir));
    }

    let mut archive = None;
    let mut checksum = None;

    if config.pack {
        let source = config.bin_dir();
        let destination = config.archive_path();

        runtime.section("pack");
        runtime.progress(&format!(
            "Packing {} into {}",
            source.display(),
            destination.display()
        ));

        let packed = pack::pack(&source, &destination, config.pack_options)
            .await
            .with_context(|| format!("packing {}", source.display()))?;
        runtime.success_println(&format!(
            "Created {} ({} entries, {} files, {} bytes)",
            packed.path.display(),
            packed.entries,
            packed.files,
            packed.size
        ));

        if config.checksum {
            let archive_path = packed.path.clone();
            let (sidecar, digest) =
                tokio::task::spawn_blocking(move || pack::write_checksum_file(&archive_path))
                    .await
                    .map_err(|e| pack::Error::TaskFailed(e.to_string()))??;
            runtime.indent(&format!("SHA256: {}", digest));
            runtime.indent(&format!("Checksum file: {}", sidecar.display()));
            checksum = Some((sidecar, digest));
        }

        archive = Some(packed);
    } else if config.checksum {
        runtime.warning_println("Checksum requested without packing; nothing to hash");
    }

    runtime.println("\nDone!!!");

    Ok(BuildSummary {
        targets,
        archive,
        checksum,
    })
}
