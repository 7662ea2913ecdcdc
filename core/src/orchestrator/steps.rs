// merchforge/src/orchestrator/steps.rs

//! The run as a pipeline: one step per state, one handler per transition.

use crate::adapters::{AdapterError, MockupRequest};
use crate::core::context_data::ContextData;
use crate::core::control::StepControl;
use crate::core::step::SkipCondition;
use crate::orchestrator::context::{RunContext, RunState};
use crate::orchestrator::error::RunError;
use crate::parser::parse_draft;
use crate::pipeline::definition::Pipeline;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub(crate) fn build_pipeline() -> Pipeline<RunContext, RunError> {
  let commerce_unconfigured: SkipCondition<RunContext> =
    Arc::new(|ctx: ContextData<RunContext>| ctx.read().services.commerce.is_none());

  let mut p = Pipeline::<RunContext, RunError>::new(&[
    (RunState::Generating.step_name(), false, None),
    (RunState::CheckingIdempotency.step_name(), false, None),
    (RunState::MockupRequested.step_name(), false, None),
    (RunState::Captioning.step_name(), false, None),
    (RunState::PublishingLocal.step_name(), false, None),
    (RunState::Recording.step_name(), false, None),
    (
      RunState::PublishingExternal.step_name(),
      true,
      Some(commerce_unconfigured),
    ),
  ]);

  p.before_each(|step_name: &str, ctx: ContextData<RunContext>| {
    let state = RunState::from_step_name(step_name);
    async move {
      if let Some(state) = state {
        ctx.update(|run| run.enter(state));
      }
      Ok::<_, RunError>(StepControl::Continue)
    }
  });

  p.on(RunState::Generating.step_name(), generate);
  p.on(RunState::CheckingIdempotency.step_name(), check_idempotency);
  p.before(RunState::MockupRequested.step_name(), generate_artwork);
  p.on(RunState::MockupRequested.step_name(), request_mockup);
  p.on(RunState::Captioning.step_name(), caption_mockup);
  p.on(RunState::PublishingLocal.step_name(), publish_to_sink);
  p.on(RunState::Recording.step_name(), record);
  p.on(RunState::PublishingExternal.step_name(), publish_to_commerce);
  p
}

/// Last path or URL segment: `http://h/output/m.png` → `m.png`.
pub fn basename(reference: &str) -> &str {
  reference
    .rsplit(|c: char| c == '/' || c == '\\')
    .next()
    .unwrap_or(reference)
}

fn absolute(path: &Path) -> Result<PathBuf, RunError> {
  std::path::absolute(path).map_err(|source| RunError::LocalPath {
    path: path.to_path_buf(),
    source,
  })
}

async fn generate(ctx: ContextData<RunContext>) -> Result<StepControl, RunError> {
  let (text, prompt) = ctx.with(|run| (run.services.text.clone(), run.settings.prompt.clone()));

  info!("Requesting product generation.");
  let raw = text.generate(&prompt).await?;
  let draft = parse_draft(&raw);
  if !draft.has_title() {
    warn!(raw_len = raw.len(), "Generated text has no usable product title.");
    return Err(RunError::EmptyTitle);
  }
  if !draft.is_known_product_type() {
    warn!(product_type = %draft.product_type, "Generated product type is not one of the known templates.");
  }

  info!(title = %draft.title, "Generated product.");
  ctx.update(|run| run.draft = Some(draft));
  Ok(StepControl::Continue)
}

async fn check_idempotency(ctx: ContextData<RunContext>) -> Result<StepControl, RunError> {
  let (store, title) = ctx.with(|run| (run.services.store.clone(), run.title()));

  if store.is_published(&title).await? {
    info!(%title, "Product already published. Skipping.");
    ctx.update(|run| run.already_published = true);
    return Ok(StepControl::Stop);
  }
  Ok(StepControl::Continue)
}

async fn generate_artwork(ctx: ContextData<RunContext>) -> Result<StepControl, RunError> {
  let (image, image_prompt, assets_dir) = ctx.with(|run| {
    run.draft().map(|d| {
      (
        run.services.image.clone(),
        d.image_prompt.clone(),
        run.settings.assets_dir.clone(),
      )
    })
  })?;

  let reference = image.generate(&image_prompt).await?;
  let image_path = absolute(&assets_dir.join(basename(&reference)))?;
  debug!(%reference, image_path = %image_path.display(), "Artwork ready.");

  ctx.update(|run| run.image_path = Some(image_path));
  Ok(StepControl::Continue)
}

async fn request_mockup(ctx: ContextData<RunContext>) -> Result<StepControl, RunError> {
  let (mockup, request, output_dir) = ctx.with(|run| -> Result<_, RunError> {
    let draft = run.draft()?;
    let image_path = run.image_path.as_ref().ok_or(RunError::MissingContext("the artwork path"))?;
    let request = MockupRequest {
      image_url: image_path.to_string_lossy().into_owned(),
      product_type: draft.mockup_product_type(),
      color: run.settings.mockup_color.clone(),
    };
    Ok((run.services.mockup.clone(), request, run.settings.mockup_output_dir.clone()))
  })?;

  info!(product_type = %request.product_type, color = %request.color, "Calling mockup API.");
  let response = mockup.render(&request).await?;
  if let Some(mockup_id) = &response.mockup_id {
    debug!(%mockup_id, "Mockup rendered.");
  }

  let file_name = basename(&response.mockup_url);
  if file_name.is_empty() {
    return Err(RunError::Adapter(AdapterError::InvalidResponse {
      service: "mockup service",
      message: format!("mockup_url '{}' names no file", response.mockup_url),
    }));
  }
  let mockup_path = absolute(&output_dir.join(file_name))?;

  ctx.update(|run| run.mockup_path = Some(mockup_path));
  Ok(StepControl::Continue)
}

async fn caption_mockup(ctx: ContextData<RunContext>) -> Result<StepControl, RunError> {
  let (captioner, mockup_path) = ctx.with(|run| -> Result<_, RunError> {
    let path = run.mockup_path.as_ref().ok_or(RunError::MissingContext("the mockup path"))?;
    Ok((run.services.captioner.clone(), path.to_string_lossy().into_owned()))
  })?;

  info!("Generating caption for mockup image.");
  let caption = match captioner.caption(&mockup_path).await {
    Ok(caption) => caption,
    Err(e) => {
      warn!(error = %e, diagnostic = %e.diagnostic(), "Captioning failed; continuing without a caption.");
      String::new()
    }
  };
  info!(%caption, "Caption ready.");

  ctx.update(|run| run.caption = caption);
  Ok(StepControl::Continue)
}

async fn publish_to_sink(ctx: ContextData<RunContext>) -> Result<StepControl, RunError> {
  let (publisher, product) = ctx.with(|run| run.enriched().map(|p| (run.services.publisher.clone(), p)))?;

  info!("Publishing product.");
  let response = publisher.publish(&product).await?;
  info!(fake_product_id = %response.fake_product_id, "Product published.");

  ctx.update(|run| run.external_id = Some(response.fake_product_id));
  Ok(StepControl::Continue)
}

async fn record(ctx: ContextData<RunContext>) -> Result<StepControl, RunError> {
  let (store, title, external_id, mockup_path, caption, tags) = ctx.with(|run| -> Result<_, RunError> {
    let draft = run.draft()?;
    Ok((
      run.services.store.clone(),
      draft.title.clone(),
      run.external_id.clone().ok_or(RunError::MissingContext("the external id"))?,
      run
        .mockup_path
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .ok_or(RunError::MissingContext("the mockup path"))?,
      run.caption.clone(),
      draft.tags.clone(),
    ))
  })?;

  if let Err(source) = store.save_record(&title, &external_id, &mockup_path, &caption, &tags).await {
    error!(
      %title,
      %external_id,
      error = %source,
      "Record not saved after a successful publish; reconcile the publisher and the local store by hand."
    );
    return Err(RunError::RecordAfterPublish {
      title,
      external_id,
      source,
    });
  }

  info!("Record saved to state DB.");
  Ok(StepControl::Continue)
}

async fn publish_to_commerce(ctx: ContextData<RunContext>) -> Result<StepControl, RunError> {
  let (commerce, product) = ctx.with(|run| run.enriched().map(|p| (run.services.commerce.clone(), p)))?;
  let Some(commerce) = commerce else {
    return Ok(StepControl::Continue);
  };

  info!("Publishing to the commerce platform.");
  let receipt = commerce.publish(&product).await;
  ctx.update(|run| run.commerce = Some(receipt.clone()));

  if receipt.is_success() {
    info!(shopify_product_id = ?receipt.shopify_product_id, "Commerce publish succeeded.");
    Ok(StepControl::Continue)
  } else {
    Err(RunError::Commerce(receipt.message.unwrap_or_else(|| "no message".to_string())))
  }
}
