use anyhow::{bail, Context};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::cli::{Command, SourceArgs};
use crate::generate;
use crate::locate::{Locator, SourceCache};

pub fn execute_command(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Generate { source, trait_path, name, out } => {
            let locator = build_locator(&source)?;
            let text = generate::generate_stub(&locator, &trait_path, name.as_deref())?;
            emit(out.as_deref(), &text)
        }
        Command::Instrument { source, trait_path, name, out } => {
            let locator = build_locator(&source)?;
            let text = generate::generate_monitor(&locator, &trait_path, name.as_deref())?;
            emit(out.as_deref(), &text)
        }
        Command::Methods { source, trait_path, pretty } => {
            let locator = build_locator(&source)?;
            let report = generate::trait_report(&locator, &trait_path)?;
            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{json}");
            Ok(())
        }
    }
}

fn build_locator(source: &SourceArgs) -> anyhow::Result<Locator> {
    let mut cache = SourceCache::new();
    if let Some(workspace) = &source.workspace {
        let found = cache.discover_roots(workspace)?;
        info!(workspace = %workspace.display(), found, "scanned workspace");
    }
    for (name, dir) in &source.roots {
        cache.add_root(name, dir);
    }
    if !cache.has_any_root() {
        bail!("no source roots configured; pass --root name=path or --workspace dir");
    }
    Ok(Locator::new(cache))
}

/// Generated text reaches the filesystem only after generation has fully
/// succeeded, so a failed run never leaves a half-written file behind.
fn emit(out: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create `{}`", parent.display()))?;
            }
            fs::write(path, text)
                .with_context(|| format!("failed to write `{}`", path.display()))?;
            info!(path = %path.display(), "wrote generated source");
        }
        None => print!("{text}"),
    }
    Ok(())
}
