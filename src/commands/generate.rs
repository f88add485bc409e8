//! Generate static files

use anyhow::Result;
use notify::Watcher;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::generator::{Generator, Report};
use crate::Site;

/// Generate the static site
pub async fn run(site: &Site) -> Result<()> {
    run_with_report(site).await.map(|_| ())
}

pub async fn run_with_report(site: &Site) -> Result<Report> {
    let start = Instant::now();
    let generator = Generator::new(site)?;
    let report = generator.generate().await?;

    tracing::info!(
        "Generated {:?} in {:.2}s",
        site.public_dir,
        start.elapsed().as_secs_f64()
    );
    Ok(report)
}

/// Watch content, static files and configuration, and regenerate on change
pub async fn watch(site: &Site) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    let mut watched = vec![
        (site.static_dir.clone(), notify::RecursiveMode::Recursive),
        (site.config_path(), notify::RecursiveMode::NonRecursive),
    ];
    if site.config.data_url.as_deref().map_or(true, str::is_empty) {
        watched.push((site.data_dir(), notify::RecursiveMode::Recursive));
    }
    for (path, mode) in watched {
        if path.exists() {
            watcher.watch(&path, mode)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut last_rebuild = Instant::now();
    while let Some(event) = rx.recv().await {
        // Debounce: only rebuild if more than 500ms since last rebuild
        if last_rebuild.elapsed() <= Duration::from_millis(500) {
            continue;
        }
        // Output written by ourselves never triggers a rebuild
        if event.paths.iter().all(|p| p.starts_with(&site.public_dir)) {
            continue;
        }

        tracing::info!("File changed, regenerating...");
        // Pick up configuration edits as well
        let result = match Site::new(&site.base_dir) {
            Ok(site) => run(&site).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::error!("Generation failed: {:#}", e);
        }
        last_rebuild = Instant::now();
    }

    Ok(())
}
