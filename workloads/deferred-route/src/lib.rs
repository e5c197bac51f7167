//! Deferred route - reference workload for progressive loading.
//!
//! This workload demonstrates:
//! - An eager person lookup the page waits for
//! - A slow person lookup and a delayed message, both deferred
//! - Fallbacks replaced in place as each deferred unit settles

mod config;
mod data;
mod sections;

use std::fmt::Display;

use anyhow::Context;
use futures::Sink;
use tracing::{info, warn};

use defer_sdk::defer_executor::{LoadOrchestrator, LoadPlan, LoadResult, PlanError};
use defer_sdk::defer_observability::{BoundaryOutcome, LoadMetrics, LoadMetricsCollector};
use defer_sdk::defer_streaming::{BoundaryState, Frame, ProgressiveRenderer, StreamingSink};

pub use config::RouteConfig;
pub use data::*;
pub use sections::*;

/// Route path.
pub const ROUTE_PATH: &str = "/deferred";
/// Eager person unit.
pub const PERSON: &str = "person";
/// Slow, deferred person unit.
pub const DEFERRED_PERSON: &str = "deferredPerson";
/// Delayed message unit.
pub const DEFERRED_STUFF: &str = "deferredStuff";

/// Build the route's load plan.
pub fn build_plan(config: &RouteConfig) -> Result<LoadPlan<RouteValue>, PlanError> {
    let message = config.message.clone();
    let message_delay = config.message_delay();
    let slow_name = config.deferred_person_name.clone();
    let slow_delay = config.slow_delay();
    let person_name = config.person_name.clone();

    LoadPlan::builder()
        .deferred(DEFERRED_STUFF, move || async move {
            Ok(RouteValue::Message(
                deferred_message(message, message_delay).await?,
            ))
        })
        .deferred(DEFERRED_PERSON, move || async move {
            Ok(RouteValue::Person(
                slow_server_fn(&slow_name, slow_delay).await?,
            ))
        })
        .eager(PERSON, move || async move {
            Ok(RouteValue::Person(person_server_fn(&person_name).await?))
        })
        .build()
}

/// Render the route into a streaming sink.
///
/// Streams the shell, then the eager person once it resolved, then a
/// placeholder per deferred unit, then each unit's final markup as it
/// settles. Returns the load metrics of the navigation.
pub async fn render_route<S, E>(
    orchestrator: &LoadOrchestrator,
    config: &RouteConfig,
    sink: &mut StreamingSink<S, E>,
) -> anyhow::Result<LoadMetrics>
where
    S: Sink<Vec<u8>, Error = E> + Unpin,
    E: Display,
{
    let shell = create_shell();
    sink.send_shell(&shell.render_opening()).await?;

    let plan = build_plan(config)?;
    let result = match orchestrator.run(plan).await {
        Ok(result) => result,
        Err(error) => {
            warn!(route = ROUTE_PATH, error = %error, "route failed to load");
            sink.send_ready(&render_route_error(&error.to_string()))
                .await?;
            sink.complete(&shell.render_closing()).await?;
            return Err(error).context("loading deferred route");
        }
    };

    let mut metrics = LoadMetricsCollector::new(result.navigation_id());
    metrics.set_route(ROUTE_PATH);
    metrics.record_ready(1, result.ready_after());

    let person = result
        .value(PERSON)
        .and_then(RouteValue::as_person)
        .context("eager person missing from load result")?;
    sink.send_ready(&render_regular_person(person)).await?;

    let mut renderer = mount_boundaries(&result)?;

    for frame in renderer.initial_frames() {
        send_frame(sink, &frame, &result, &mut metrics).await?;
    }
    sink.send_raw(&render_counter()).await?;

    while let Some(frame) = renderer.next_frame().await {
        send_frame(sink, &frame, &result, &mut metrics).await?;
    }

    sink.complete(&shell.render_closing()).await?;
    let metrics = metrics.finalize();
    info!(
        navigation = %metrics.navigation_id,
        boundaries = metrics.boundaries.len(),
        "route streamed"
    );
    Ok(metrics)
}

/// Mount both deferred boundaries, in page order.
pub fn mount_boundaries(
    result: &LoadResult<RouteValue>,
) -> anyhow::Result<ProgressiveRenderer<RouteValue>> {
    let mut renderer = ProgressiveRenderer::new();

    let handle = result
        .handle(DEFERRED_PERSON)
        .context("deferred person missing from load result")?;
    renderer.mount(DEFERRED_PERSON, &handle, deferred_person_view(DEFERRED_PERSON))?;

    let handle = result
        .handle(DEFERRED_STUFF)
        .context("deferred stuff missing from load result")?;
    renderer.mount(DEFERRED_STUFF, &handle, deferred_stuff_view(DEFERRED_STUFF))?;

    Ok(renderer)
}

async fn send_frame<S, E>(
    sink: &mut StreamingSink<S, E>,
    frame: &Frame,
    result: &LoadResult<RouteValue>,
    metrics: &mut LoadMetricsCollector,
) -> anyhow::Result<()>
where
    S: Sink<Vec<u8>, Error = E> + Unpin,
    E: Display,
{
    sink.send_frame(frame).await?;

    let outcome = match frame.state {
        BoundaryState::Fallback => return Ok(()),
        BoundaryState::Resolved => BoundaryOutcome::Resolved,
        BoundaryState::Error => BoundaryOutcome::Error,
    };
    let after = result
        .settle_duration(&frame.boundary)
        .unwrap_or_else(|| metrics.elapsed());
    metrics.record_boundary(&frame.boundary, outcome, after);
    Ok(())
}
