//! Progressive renderer for deferred boundaries.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use defer_data::{ExecutionState, PendingHandle, Subscription, UnitError};
use futures::channel::oneshot;
use futures::stream::{self, FuturesUnordered, Stream, StreamExt};
use tracing::{debug, trace};

use crate::error::RenderError;

/// How one boundary renders each state of its unit.
pub trait BoundaryView<T>: Send + Sync + 'static {
    /// Markup shown while the unit is pending.
    fn fallback(&self) -> String;

    /// Markup for a resolved value.
    fn resolved(&self, value: &T) -> String;

    /// Markup for a failure. `None` leaves the boundary empty.
    fn error(&self, error: &UnitError) -> Option<String>;
}

/// Display state of one mounted boundary.
///
/// `Fallback` moves to exactly one of `Resolved` or `Error`; both are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryState {
    Fallback,
    Resolved,
    Error,
}

impl BoundaryState {
    /// Get the name of this state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fallback => "fallback",
            Self::Resolved => "resolved",
            Self::Error => "error",
        }
    }

    /// Check if this state is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Fallback)
    }
}

/// Output produced for one boundary state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Boundary id.
    pub boundary: String,
    /// State the boundary is now in.
    pub state: BoundaryState,
    /// Markup for that state; `None` when an error view skips the boundary
    /// or the unit was cancelled.
    pub html: Option<String>,
}

impl Frame {
    fn render<T, V: BoundaryView<T>>(boundary: &str, state: &ExecutionState<T>, view: &V) -> Self {
        let (state, html) = match state {
            ExecutionState::Pending => (BoundaryState::Fallback, Some(view.fallback())),
            ExecutionState::Resolved(value) => (BoundaryState::Resolved, Some(view.resolved(value))),
            // Cancellation is not a failure the user should see.
            ExecutionState::Failed(error) if error.is_cancelled() => (BoundaryState::Error, None),
            ExecutionState::Failed(error) => (BoundaryState::Error, view.error(error)),
        };
        Self {
            boundary: boundary.to_string(),
            state,
            html,
        }
    }
}

type SharedState = Arc<Mutex<BoundaryState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, BoundaryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Mounted<T: Clone + Send + 'static> {
    state: SharedState,
    _subscription: Option<Subscription<T>>,
}

/// Mounts boundaries on pending handles and emits a frame per transition.
///
/// A boundary re-renders alone when its own handle settles; it never waits
/// on its siblings. Fallback frames come first, then terminal frames in the
/// order boundaries settle.
pub struct ProgressiveRenderer<T: Clone + Send + 'static> {
    queued: VecDeque<Frame>,
    settling: FuturesUnordered<oneshot::Receiver<Frame>>,
    mounted: HashMap<String, Mounted<T>>,
}

impl<T: Clone + Send + 'static> ProgressiveRenderer<T> {
    /// Create a renderer with no boundaries.
    pub fn new() -> Self {
        Self {
            queued: VecDeque::new(),
            settling: FuturesUnordered::new(),
            mounted: HashMap::new(),
        }
    }

    /// Mount a boundary on a handle.
    ///
    /// A pending unit emits the fallback frame right away and a terminal
    /// frame when it settles. A unit that already settled is emitted
    /// directly in its terminal state. Returns the state after mounting.
    pub fn mount<V>(
        &mut self,
        boundary: impl Into<String>,
        handle: &PendingHandle<T>,
        view: V,
    ) -> Result<BoundaryState, RenderError>
    where
        V: BoundaryView<T>,
    {
        let boundary = boundary.into();
        if self.mounted.contains_key(&boundary) {
            return Err(RenderError::AlreadyMounted(boundary));
        }

        let initial = handle.current_state();
        let frame = Frame::render(&boundary, &initial, &view);
        let state = Arc::new(Mutex::new(frame.state));
        self.queued.push_back(frame);

        let subscription = if initial.is_pending() {
            let (tx, rx) = oneshot::channel();
            self.settling.push(rx);
            let shared = Arc::clone(&state);
            let id = boundary.clone();
            Some(handle.subscribe(move |terminal| {
                let frame = Frame::render(&id, &terminal, &view);
                let next = frame.state;
                trace!(boundary = %id, state = next.name(), "boundary settled");
                *lock(&shared) = next;
                let _ = tx.send(frame);
            }))
        } else {
            None
        };

        let current = *lock(&state);
        debug!(boundary = %boundary, state = current.name(), "boundary mounted");
        self.mounted.insert(
            boundary,
            Mounted {
                state,
                _subscription: subscription,
            },
        );

        Ok(current)
    }

    /// Stop observing a boundary. Returns false if it was not mounted.
    pub fn unmount(&mut self, boundary: &str) -> bool {
        let removed = self.mounted.remove(boundary).is_some();
        if removed {
            debug!(boundary = %boundary, "boundary unmounted");
        }
        removed
    }

    /// Current state of a mounted boundary.
    pub fn state(&self, boundary: &str) -> Option<BoundaryState> {
        self.mounted.get(boundary).map(|m| *lock(&m.state))
    }

    /// Number of mounted boundaries still showing their fallback.
    pub fn pending_count(&self) -> usize {
        self.mounted
            .values()
            .filter(|m| !lock(&m.state).is_terminal())
            .count()
    }

    /// Take the frames produced by mounting, without waiting.
    ///
    /// One frame per boundary mounted since the last call: its fallback, or
    /// its terminal state if the unit had already settled.
    pub fn initial_frames(&mut self) -> Vec<Frame> {
        self.queued.drain(..).collect()
    }

    /// Next frame, in settle order.
    ///
    /// Returns `None` once no mounted boundary can produce another frame.
    /// Boundaries that were unmounted or whose navigation was superseded
    /// produce nothing further.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        if let Some(frame) = self.queued.pop_front() {
            return Some(frame);
        }
        while let Some(outcome) = self.settling.next().await {
            if let Ok(frame) = outcome {
                return Some(frame);
            }
        }
        None
    }

    /// Turn the renderer into a stream of frames.
    pub fn into_frames(self) -> impl Stream<Item = Frame> {
        stream::unfold(self, |mut renderer| async move {
            let frame = renderer.next_frame().await?;
            Some((frame, renderer))
        })
    }
}

impl<T: Clone + Send + 'static> Default for ProgressiveRenderer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use defer_data::{AsyncUnit, UnitControl, UnitMode};
    use tokio::time::{sleep, Instant};

    use super::*;
    use crate::boundary::Boundary;
    use crate::fallback::ErrorView;

    fn unit(id: &str, ms: u64, value: Result<&'static str, &'static str>) -> AsyncUnit<String> {
        AsyncUnit::new(id, UnitMode::Deferred, move || async move {
            sleep(Duration::from_millis(ms)).await;
            value.map(str::to_string).map_err(|e| anyhow::anyhow!(e))
        })
    }

    fn text_view(fallback: &str) -> impl BoundaryView<String> {
        Boundary::builder("unused")
            .with_fallback(fallback)
            .with_error_view(ErrorView::message("Could not load"))
            .build()
            .view(|s: &String| format!("<p>{}</p>", s))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_then_resolution_in_settle_order() {
        let slow = unit("slow", 2000, Ok("Hello deferred!"));
        let fast = unit("fast", 1000, Ok("42"));
        slow.start().unwrap();
        fast.start().unwrap();

        let mut renderer = ProgressiveRenderer::new();
        assert_eq!(
            renderer.mount("slow", &slow.handle(), text_view("Loading stuff...")),
            Ok(BoundaryState::Fallback)
        );
        renderer
            .mount("fast", &fast.handle(), text_view("Loading person..."))
            .unwrap();
        assert_eq!(renderer.pending_count(), 2);

        let start = Instant::now();
        let mut frames = Vec::new();
        while let Some(frame) = renderer.next_frame().await {
            frames.push((frame.boundary, frame.state, frame.html, start.elapsed()));
        }

        let order: Vec<(&str, BoundaryState)> = frames
            .iter()
            .map(|(b, s, _, _)| (b.as_str(), *s))
            .collect();
        assert_eq!(
            order,
            vec![
                ("slow", BoundaryState::Fallback),
                ("fast", BoundaryState::Fallback),
                ("fast", BoundaryState::Resolved),
                ("slow", BoundaryState::Resolved),
            ]
        );
        assert_eq!(frames[0].2.as_deref(), Some("Loading stuff..."));
        assert_eq!(frames[2].2.as_deref(), Some("<p>42</p>"));
        assert!(frames[2].3 >= Duration::from_millis(1000) && frames[2].3 < Duration::from_millis(1100));
        assert!(frames[3].3 >= Duration::from_millis(2000));
        assert_eq!(renderer.pending_count(), 0);
        assert_eq!(renderer.state("fast"), Some(BoundaryState::Resolved));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_renders_only_its_boundary() {
        let broken = unit("broken", 100, Err("stuff service down"));
        let healthy = unit("healthy", 200, Ok("fine"));
        broken.start().unwrap();
        healthy.start().unwrap();

        let mut renderer = ProgressiveRenderer::new();
        renderer.mount("broken", &broken.handle(), text_view("...")).unwrap();
        renderer.mount("healthy", &healthy.handle(), text_view("...")).unwrap();

        let frames: Vec<Frame> = renderer.into_frames().collect().await;
        let terminal: Vec<&Frame> = frames.iter().filter(|f| f.state.is_terminal()).collect();
        assert_eq!(terminal.len(), 2);
        assert_eq!(terminal[0].boundary, "broken");
        assert_eq!(terminal[0].state, BoundaryState::Error);
        assert_eq!(
            terminal[0].html.as_deref(),
            Some(r#"<div class="boundary-error">Could not load</div>"#)
        );
        assert_eq!(terminal[1].state, BoundaryState::Resolved);
    }

    #[tokio::test]
    async fn test_settled_unit_mounts_without_fallback() {
        let done = unit("done", 0, Ok("ready"));
        done.start().unwrap();
        done.settled().await;

        let mut renderer = ProgressiveRenderer::new();
        assert_eq!(
            renderer.mount("done", &done.handle(), text_view("Loading...")),
            Ok(BoundaryState::Resolved)
        );

        let frame = renderer.next_frame().await.unwrap();
        assert_eq!(frame.state, BoundaryState::Resolved);
        assert_eq!(frame.html.as_deref(), Some("<p>ready</p>"));
        assert_eq!(renderer.next_frame().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_stops_observation() {
        let slow = unit("slow", 1000, Ok("late"));
        slow.start().unwrap();
        let handle = slow.handle();

        let mut renderer = ProgressiveRenderer::new();
        renderer.mount("slow", &handle, text_view("...")).unwrap();
        assert_eq!(handle.observer_count(), 1);
        assert_eq!(
            renderer.mount("slow", &handle, text_view("...")),
            Err(RenderError::AlreadyMounted("slow".to_string()))
        );

        assert!(renderer.unmount("slow"));
        assert!(!renderer.unmount("slow"));
        assert_eq!(handle.observer_count(), 0);

        let frame = renderer.next_frame().await.unwrap();
        assert_eq!(frame.state, BoundaryState::Fallback);
        assert_eq!(renderer.next_frame().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_unit_renders_no_error() {
        let cancelled = unit("number", 1000, Ok("never"));
        cancelled.start().unwrap();
        let view = Boundary::builder("number")
            .with_fallback("Loading number...")
            .build()
            .view(|s: &String| s.clone());

        let mut renderer = ProgressiveRenderer::new();
        renderer.mount("number", &cancelled.handle(), view).unwrap();
        assert!(cancelled.control().upgrade().unwrap().cancel());

        let frames: Vec<Frame> = renderer.into_frames().collect().await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].state, BoundaryState::Error);
        assert_eq!(frames[1].html, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_frames_cover_every_mount() {
        let done = unit("done", 0, Ok("ready"));
        done.start().unwrap();
        done.settled().await;
        let slow = unit("slow", 500, Ok("late"));
        let other = unit("other", 800, Ok("later"));
        slow.start().unwrap();
        other.start().unwrap();

        let mut renderer = ProgressiveRenderer::new();
        for (id, handle) in [("done", done.handle()), ("slow", slow.handle()), ("other", other.handle())] {
            renderer.mount(id, &handle, text_view("...")).unwrap();
        }

        let initial: Vec<(String, BoundaryState)> = renderer
            .initial_frames()
            .into_iter()
            .map(|f| (f.boundary, f.state))
            .collect();
        assert_eq!(
            initial,
            vec![
                ("done".to_string(), BoundaryState::Resolved),
                ("slow".to_string(), BoundaryState::Fallback),
                ("other".to_string(), BoundaryState::Fallback),
            ]
        );
        assert!(renderer.initial_frames().is_empty());

        let next = renderer.next_frame().await.unwrap();
        assert_eq!((next.boundary.as_str(), next.state), ("slow", BoundaryState::Resolved));
    }
}
