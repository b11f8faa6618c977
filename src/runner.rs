// src/runner.rs
use std::sync::Arc;
use std::time::Instant;

use crate::archive::{self, ArchiveName, ExtractedProject};
use crate::build::BuildCommand;
use crate::config::RunnerConfig;
use crate::errors::Result;
use crate::models::{TestResultsResponse, UploadedArchive};
use crate::reports;

/// Unpack an uploaded project, run its tests and return the raw report texts.
///
/// All files live in a workspace that is owned by this call. It is removed
/// when the call returns, fails, or is dropped mid-flight. Blocking tasks
/// hold their own handle to the workspace, so a dropped call removes it only
/// once the last of them has finished writing.
pub async fn run_tests(config: &RunnerConfig, upload: UploadedArchive) -> Result<TestResultsResponse> {
    let run_start = Instant::now();
    let name = ArchiveName::parse(&upload.filename)?;
    let workspace = Arc::new(config.new_workspace()?);
    let workspace_path = workspace.path().to_path_buf();

    log::info!(
        "Received {} ({} bytes), workspace {}",
        name.file_name,
        upload.bytes.len(),
        workspace_path.display()
    );

    let project = {
        let workspace = Arc::clone(&workspace);
        let name = name.clone();
        let descriptor = config.descriptor_file.clone();
        let bytes = upload.bytes;
        tokio::task::spawn_blocking(move || -> Result<ExtractedProject> {
            let dir = workspace.path();
            let archive_path = archive::save_upload(dir, &name, &bytes)?;
            let files = archive::extract_zip(&archive_path, dir)?;
            log::debug!("Extracted {} file(s) from {}", files, name.file_name);
            archive::locate_project(dir, &name, &descriptor)
        })
        .await??
    };

    let command = BuildCommand::from_config(config);
    log::info!("Running '{}' in {}", command.display(), project.root.display());
    let outcome = command.run(&project.root).await?;
    log::info!(
        "Build for {} finished with {} after {}ms",
        project.name,
        outcome.status,
        outcome.elapsed_ms
    );
    outcome.into_result()?;

    let results = {
        let workspace = Arc::clone(&workspace);
        let root = project.root.clone();
        let reports_dir = config.reports_dir.clone();
        let extension = config.report_extension.clone();
        let sorted = config.sort_reports;
        tokio::task::spawn_blocking(move || {
            let reports = reports::collect_reports(&root, &reports_dir, &extension, sorted);
            // Moves the handle into this task.
            drop(workspace);
            reports
        })
        .await??
    };

    match Arc::try_unwrap(workspace) {
        Ok(dir) => {
            if let Err(e) = dir.close() {
                log::warn!("Failed to remove workspace {}: {}", workspace_path.display(), e);
            }
        }
        Err(shared) => drop(shared),
    }

    log::info!(
        "Collected {} report(s) for {} in {}ms",
        results.len(),
        project.name,
        run_start.elapsed().as_millis()
    );

    Ok(TestResultsResponse {
        project_name: project.name,
        results,
    })
}
