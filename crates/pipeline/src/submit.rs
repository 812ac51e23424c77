//! Starting a new run.

use std::sync::Arc;

use adapt_cloud::{ObjectStore, ObjectUri};
use adapt_core::artifacts::validate_run_key;
use adapt_core::brief::generate_short_id;
use adapt_core::error::CoreError;
use adapt_core::job::JobType;
use adapt_core::types::DbId;
use adapt_db::models::job::Job;
use adapt_db::models::run::{CreateRun, PipelineRun};
use adapt_db::repositories::{CreativeRepo, JobRepo, PipelineRunRepo};
use adapt_events::{event_types, EventBus};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::publish;

/// Inputs for a new run. With `creative_id` set, the catalog entry fills
/// in the title, landing page and image when they are not given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitRun {
    pub run_key: Option<String>,
    pub creative_id: Option<DbId>,
    pub campaign_id: Option<String>,
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_description: String,
    pub landing_page_url: Option<String>,
    pub creative_title: Option<String>,
    #[serde(default)]
    pub image_uris: Vec<String>,
    pub submitted_by: Option<String>,
}

/// Create the run and queue its `analyze` job.
///
/// Image URIs the configured storage backend cannot serve are refused here
/// rather than at analysis time.
pub async fn submit_run(
    pool: &PgPool,
    store: &Arc<dyn ObjectStore>,
    events: &EventBus,
    config: &PipelineConfig,
    input: SubmitRun,
) -> Result<(PipelineRun, Job), PipelineError> {
    let create = resolve_inputs(pool, config, input).await?;
    check_backend_support(store.as_ref(), &create.image_uris)?;

    let run = PipelineRunRepo::create(pool, &create).await?;
    let job = JobRepo::submit(pool, run.id, JobType::Analyze, &serde_json::json!({})).await?;

    tracing::info!(
        run_id = run.id,
        run_key = %run.run_key,
        job_id = job.id,
        images = create.image_uris.len(),
        "Run submitted"
    );
    let actor = run.submitted_by.as_deref().unwrap_or("api");
    events.publish(publish::run_event(event_types::RUN_CREATED, &run, actor));
    Ok((run, job))
}

async fn resolve_inputs(
    pool: &PgPool,
    config: &PipelineConfig,
    mut input: SubmitRun,
) -> Result<CreateRun, PipelineError> {
    if let Some(creative_id) = input.creative_id {
        let creative = CreativeRepo::find_by_id(pool, creative_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "creative",
                id: creative_id,
            })?;
        if blank(&input.creative_title) {
            input.creative_title = Some(creative.title);
        }
        if blank(&input.landing_page_url) && !creative.landing_page_url.is_empty() {
            input.landing_page_url = Some(creative.landing_page_url);
        }
        if input.image_uris.is_empty() && !creative.image_url.is_empty() {
            input.image_uris.push(creative.image_url);
        }
    }

    let create = CreateRun {
        run_key: input
            .run_key
            .filter(|k| !k.trim().is_empty())
            .map(|k| k.trim().to_string())
            .unwrap_or_else(|| format!("run-{}", Uuid::now_v7().simple())),
        creative_id: input.creative_id,
        campaign_id: non_blank(input.campaign_id).unwrap_or_else(|| generate_short_id("campaign")),
        product_id: non_blank(input.product_id).unwrap_or_else(|| generate_short_id("product")),
        product_description: input.product_description.trim().to_string(),
        landing_page_url: non_blank(input.landing_page_url),
        creative_title: non_blank(input.creative_title),
        image_uris: input
            .image_uris
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect(),
        artifact_root: config.artifact_root.clone(),
        submitted_by: non_blank(input.submitted_by),
    };
    validate(&create)?;
    Ok(create)
}

fn validate(run: &CreateRun) -> Result<(), PipelineError> {
    validate_run_key(&run.run_key)?;
    if run.product_description.is_empty()
        && run.landing_page_url.is_none()
        && run.creative_title.is_none()
    {
        return Err(PipelineError::InvalidInput(
            "A product description, landing page URL or creative title is required".into(),
        ));
    }
    if let Some(url) = &run.landing_page_url {
        if !is_http(url) {
            return Err(PipelineError::InvalidInput(format!(
                "Landing page URL '{url}' must be http(s)"
            )));
        }
    }
    if run.image_uris.is_empty() {
        return Err(PipelineError::InvalidInput(
            "At least one brand image is required".into(),
        ));
    }
    for uri in &run.image_uris {
        if ObjectUri::is_object_uri(uri) {
            ObjectUri::parse(uri)?;
        } else if !is_http(uri) {
            return Err(PipelineError::InvalidInput(format!(
                "Image '{uri}' must be a gs://, s3://, file:// or http(s) location"
            )));
        }
    }
    Ok(())
}

fn check_backend_support(store: &dyn ObjectStore, image_uris: &[String]) -> Result<(), PipelineError> {
    for uri in image_uris.iter().filter(|u| ObjectUri::is_object_uri(u)) {
        if !store.supports(&ObjectUri::parse(uri)?) {
            return Err(PipelineError::InvalidInput(format!(
                "Image '{uri}' cannot be read by the configured storage backend"
            )));
        }
    }
    Ok(())
}

fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
