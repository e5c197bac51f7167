//! Deferred route command.
//!
//! Without `--html` each deferred boundary is a spinner showing its
//! fallback, replaced by the unit's value once its handle settles.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use console::style;
use futures::channel::mpsc;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use defer_sdk::prelude::*;
use deferred_route::{
    build_plan, person_line, render_route, RouteConfig, RouteValue, DEFERRED_PERSON,
    DEFERRED_STUFF, PERSON, ROUTE_PATH,
};

use super::DeferredArgs;
use crate::context::Context;
use crate::output::format_duration;

/// Boundaries in page order, with their terminal fallbacks.
const BOUNDARIES: [(&str, &str); 2] = [
    (DEFERRED_PERSON, "Loading person..."),
    (DEFERRED_STUFF, "Loading stuff..."),
];

/// Run the deferred command.
pub async fn run(args: DeferredArgs, ctx: &Context) -> Result<()> {
    let route = match &args.route_config {
        Some(path) => load_route_config(&ctx.resolve_path(path))?,
        None => ctx.config.route.clone(),
    };
    let orchestrator = LoadOrchestrator::new(ctx.config.orchestrator.clone());

    if args.html {
        stream_html(&orchestrator, &route).await
    } else {
        show_progress(&orchestrator, &route, ctx).await
    }
}

fn load_route_config(path: &Path) -> Result<RouteConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read route config: {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON route config: {}", path.display()))
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML route config: {}", path.display()))
    }
}

/// Stream the route's HTML to stdout as chunks are produced.
async fn stream_html(orchestrator: &LoadOrchestrator, route: &RouteConfig) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded::<Vec<u8>>();

    // The sink lives inside the render future so the channel closes when
    // rendering ends, whether or not the page completed.
    let render = async move {
        let mut sink = StreamingSink::new(tx, TimingContext::new());
        render_route(orchestrator, route, &mut sink).await
    };
    let write = async {
        let mut stdout = tokio::io::stdout();
        while let Some(chunk) = rx.next().await {
            stdout.write_all(&chunk).await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    };

    let (rendered, written) = futures::join!(render, write);
    written.context("Failed to write HTML to stdout")?;
    let metrics = rendered?;
    info!(metrics = %metrics.to_json(), "load metrics");
    Ok(())
}

/// Show the route as terminal spinners.
async fn show_progress(
    orchestrator: &LoadOrchestrator,
    route: &RouteConfig,
    ctx: &Context,
) -> Result<()> {
    let trace = PhaseTrace { route: ROUTE_PATH };
    let started = Instant::now();
    trace.on_phase(LifecyclePhase::Start, Duration::ZERO);

    ctx.output.header(&format!("Route {}", ROUTE_PATH));
    let loading = ctx.output.spinner("Loading person...");
    let result = match orchestrator.run(build_plan(route)?).await {
        Ok(result) => result,
        Err(error) => {
            loading.finish_and_clear();
            trace.on_phase(LifecyclePhase::Error(error.to_string()), started.elapsed());
            return Err(error).context("Failed to load deferred route");
        }
    };
    loading.finish_and_clear();
    trace.on_phase(LifecyclePhase::Ready, result.ready_after());
    ctx.output
        .debug(&format!("Navigation {} ready", result.navigation_id()));

    let mut metrics = LoadMetricsCollector::new(result.navigation_id());
    metrics.set_route(ROUTE_PATH);
    metrics.record_ready(1, result.ready_after());

    let person = result
        .value(PERSON)
        .and_then(RouteValue::as_person)
        .context("eager person missing from load result")?;
    ctx.output.success(&format!(
        "{} - {} {}",
        person.name,
        person.resolve_at_iso(),
        style(format!("(ready after {})", format_duration(result.ready_after()))).dim()
    ));

    let group = ctx.output.spinner_group();
    let mut settling = FuturesUnordered::new();
    for (id, fallback) in BOUNDARIES {
        let handle = result
            .handle(id)
            .with_context(|| format!("{} missing from load result", id))?;
        let bar = ctx.output.group_spinner(&group, fallback);
        settling.push(async move {
            let state = handle.settled().await;
            (id, bar, state)
        });
    }

    while let Some((id, bar, state)) = settling.next().await {
        let after = result
            .settle_duration(id)
            .unwrap_or_else(|| metrics.elapsed());
        trace.on_phase(LifecyclePhase::BoundarySettled(id.to_string()), after);

        match state {
            ExecutionState::Resolved(value) => {
                bar.finish_with_message(format!(
                    "{} {} {}",
                    style("✓").green(),
                    describe(&value),
                    style(format!("({})", format_duration(after))).dim()
                ));
                metrics.record_boundary(id, BoundaryOutcome::Resolved, after);
            }
            ExecutionState::Failed(error) => {
                bar.finish_with_message(format!("{} {}", style("✗").red(), style(&error).red()));
                metrics.record_boundary(id, BoundaryOutcome::Error, after);
            }
            ExecutionState::Pending => bar.finish_and_clear(),
        }
    }
    trace.on_phase(LifecyclePhase::Completion, started.elapsed());

    let metrics = metrics.finalize();
    if ctx.output.is_json() {
        ctx.output.json(&metrics);
    } else {
        ctx.output.header("Load Metrics");
        println!("{}", metrics.to_summary());
    }
    Ok(())
}

fn describe(value: &RouteValue) -> String {
    match value {
        RouteValue::Person(person) => person_line(person),
        RouteValue::Message(message) => message.clone(),
    }
}

/// Lifecycle observer that forwards phases to the log.
struct PhaseTrace {
    route: &'static str,
}

impl LifecycleObserver for PhaseTrace {
    fn on_phase(&self, phase: LifecyclePhase, elapsed: Duration) {
        let elapsed_ms = elapsed.as_millis() as u64;
        match phase {
            LifecyclePhase::Error(message) => {
                warn!(route = self.route, elapsed_ms, error = %message, "navigation failed")
            }
            phase => debug!(route = self.route, elapsed_ms, phase = ?phase, "navigation phase"),
        }
    }
}
