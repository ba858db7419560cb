//! CLI route: single route table and run context. Dispatches to the generation service
//! and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_generation_json, format_generation_text, format_node_json, format_node_text,
    GenerationReport,
};
use crate::config::{AppConfig, ConfigLoader};
use crate::error::{ApiError, SchedulerError};
use crate::job::{JobId, JobRecord};
use crate::scene::find_node_by_id;
use crate::service::GenerationService;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Runtime context for CLI execution: workspace, loaded config and the generation service.
pub struct RunContext {
    service: GenerationService,
    config: AppConfig,
    workspace_root: PathBuf,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::from_config(workspace_root, config)
    }

    pub fn from_config(workspace_root: PathBuf, config: AppConfig) -> Result<Self, ApiError> {
        let service = GenerationService::from_config(&config, &workspace_root)?;
        Ok(Self {
            service,
            config,
            workspace_root,
        })
    }

    pub fn service(&self) -> &GenerationService {
        &self.service
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = match command {
            Commands::Generate {
                files,
                format,
                timeout_secs,
            } => {
                self.handle_generate(files, format, timeout_secs.map(Duration::from_secs))
                    .await
            }
            Commands::Outline { file } => self.handle_outline(file).await,
            Commands::Find { file, id, format } => self.handle_find(file, id, format).await,
            Commands::Config => self.handle_config(),
        };
        info!(
            command = command.name(),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    async fn handle_generate(
        &self,
        files: &[PathBuf],
        format: &str,
        timeout: Option<Duration>,
    ) -> Result<String, ApiError> {
        check_format(format)?;

        // Subscribe before submitting: with a retention cap a finished job may be
        // evicted before its turn to be waited on.
        let scheduler = self.service.scheduler();
        let mut events = scheduler.event_channel();

        let mut queued: Vec<(PathBuf, JobId)> = Vec::with_capacity(files.len());
        for file in files {
            let plan = self.read_plan(file)?;
            let job_id = self.service.enqueue_generation(plan)?;
            debug!(job_id = %job_id, file = %file.display(), "Plan submitted");
            queued.push((file.clone(), job_id));
        }

        let wanted: HashSet<JobId> = queued.iter().map(|(_, id)| id.clone()).collect();
        let mut finished: HashMap<JobId, JobRecord> = HashMap::with_capacity(queued.len());
        let collect = async {
            while finished.len() < wanted.len() {
                match events.recv().await {
                    Some(job) if job.status.is_terminal() && wanted.contains(&job.id) => {
                        finished.insert(job.id.clone(), job);
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        };
        match timeout {
            Some(limit) => tokio::time::timeout(limit, collect).await.map_err(|_| {
                SchedulerError::Timeout(format!("{} generation jobs", wanted.len()))
            })?,
            None => collect.await,
        }

        let mut reports = Vec::with_capacity(queued.len());
        for (plan_file, job_id) in queued {
            let job = finished
                .remove(&job_id)
                .ok_or(SchedulerError::JobNotFound(job_id))?;
            reports.push(GenerationReport { plan_file, job });
        }

        let failed = reports.iter().filter(|r| r.job.error.is_some()).count();
        if failed > 0 {
            warn!(failed, total = reports.len(), "Some generations failed");
        }

        if format == "json" {
            format_generation_json(&reports)
        } else {
            Ok(format_generation_text(&reports))
        }
    }

    async fn handle_outline(&self, file: &Path) -> Result<String, ApiError> {
        let plan = self.read_plan(file)?;
        let layout = self.service.generate_layout(plan, None).await?;
        Ok(crate::scene::outline(&layout))
    }

    async fn handle_find(&self, file: &Path, id: &str, format: &str) -> Result<String, ApiError> {
        check_format(format)?;
        let plan = self.read_plan(file)?;
        let layout = self.service.generate_layout(plan, None).await?;

        // Search covers descendants only; the root is matched here.
        let node = if layout.id() == id {
            Some(layout.clone())
        } else {
            find_node_by_id(&layout, id)
        };
        let node = node.ok_or_else(|| ApiError::NodeNotFound(id.to_string()))?;

        if format == "json" {
            format_node_json(&node)
        } else {
            Ok(format_node_text(&node))
        }
    }

    fn handle_config(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(&self.config)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e)))
    }

    fn read_plan(&self, file: &Path) -> Result<String, ApiError> {
        let path = if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.workspace_root.join(file)
        };
        std::fs::read_to_string(&path).map_err(|source| ApiError::PlanRead { path, source })
    }
}

fn check_format(format: &str) -> Result<(), ApiError> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(ApiError::ConfigError(format!(
            "Invalid output format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}
