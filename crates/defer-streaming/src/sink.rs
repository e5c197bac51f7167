//! Shell-first streaming sink.

use std::fmt::Display;

use defer_core::{LifecyclePhase, TimingContext};
use futures::{Sink, SinkExt};
use tracing::debug;

use crate::error::RenderError;
use crate::renderer::{BoundaryState, Frame};
use crate::swap::{inline_boundary, resolution_frame, wrap_placeholder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    Initial,
    ShellSent,
    Completed,
}

/// Streaming sink that enforces the shell-first pattern.
///
/// Generic over any `Sink<Vec<u8>>`, so the same code writes to an HTTP
/// body, a channel or a buffer in tests.
pub struct StreamingSink<S, E>
where
    S: Sink<Vec<u8>, Error = E> + Unpin,
    E: Display,
{
    inner: S,
    state: SinkState,
    timing: TimingContext,
    placeholders: Vec<String>,
    settled: Vec<String>,
}

impl<S, E> StreamingSink<S, E>
where
    S: Sink<Vec<u8>, Error = E> + Unpin,
    E: Display,
{
    /// Create a new streaming sink.
    pub fn new(sink: S, timing: TimingContext) -> Self {
        Self {
            inner: sink,
            state: SinkState::Initial,
            timing,
            placeholders: Vec::new(),
            settled: Vec::new(),
        }
    }

    /// Send the shell. Must come before anything else.
    pub async fn send_shell(&mut self, html: &str) -> Result<(), RenderError> {
        if self.state != SinkState::Initial {
            return Err(RenderError::ShellAlreadySent);
        }

        self.write(html).await?;
        self.timing.mark("shell_sent");
        self.state = SinkState::ShellSent;
        Ok(())
    }

    /// Send content that was ready when the page became ready.
    pub async fn send_ready(&mut self, html: &str) -> Result<(), RenderError> {
        self.check_open()?;
        self.write(html).await?;
        self.timing.mark_ready();
        Ok(())
    }

    /// Send one renderer frame.
    ///
    /// Fallback frames become placeholders. Terminal frames replace their
    /// placeholder, or are written inline if the boundary never had one.
    pub async fn send_frame(&mut self, frame: &Frame) -> Result<(), RenderError> {
        self.check_open()?;

        let html = frame.html.as_deref().unwrap_or("");
        let state = frame.state.name();
        let has_placeholder = self.placeholders.contains(&frame.boundary);
        let output = match frame.state {
            BoundaryState::Fallback => wrap_placeholder(&frame.boundary, html),
            _ if has_placeholder => resolution_frame(&frame.boundary, state, html),
            _ => inline_boundary(&frame.boundary, state, html),
        };
        self.write(&output).await?;

        if frame.state.is_terminal() {
            self.timing.mark_boundary_settled(&frame.boundary);
            self.settled.push(frame.boundary.clone());
            debug!(boundary = %frame.boundary, state, "boundary streamed");
        } else {
            self.placeholders.push(frame.boundary.clone());
        }
        Ok(())
    }

    /// Send raw HTML. Shell must be sent first.
    pub async fn send_raw(&mut self, html: &str) -> Result<(), RenderError> {
        self.check_open()?;
        self.write(html).await
    }

    /// Send the closing HTML and complete the response.
    pub async fn complete(&mut self, closing: &str) -> Result<(), RenderError> {
        self.check_open()?;
        self.write(closing).await?;
        self.inner
            .close()
            .await
            .map_err(|e| RenderError::Stream(e.to_string()))?;
        self.state = SinkState::Completed;
        self.timing.mark("complete");
        Ok(())
    }

    /// Boundaries that reached a terminal state, in stream order.
    pub fn settled(&self) -> &[String] {
        &self.settled
    }

    /// Boundaries written as placeholders that have not settled yet.
    pub fn open_placeholders(&self) -> Vec<&str> {
        self.placeholders
            .iter()
            .filter(|id| !self.settled.contains(id))
            .map(String::as_str)
            .collect()
    }

    /// Get the current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        match (self.state, self.settled.last()) {
            (SinkState::Initial, _) => LifecyclePhase::Start,
            (SinkState::ShellSent, None) => LifecyclePhase::Ready,
            (SinkState::ShellSent, Some(last)) => LifecyclePhase::BoundarySettled(last.clone()),
            (SinkState::Completed, _) => LifecyclePhase::Completion,
        }
    }

    /// Get timing context reference.
    pub fn timing(&self) -> &TimingContext {
        &self.timing
    }

    /// Consume the sink and return the inner value.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn check_open(&self) -> Result<(), RenderError> {
        match self.state {
            SinkState::Initial => Err(RenderError::ShellNotSent),
            SinkState::Completed => Err(RenderError::Completed),
            SinkState::ShellSent => Ok(()),
        }
    }

    async fn write(&mut self, html: &str) -> Result<(), RenderError> {
        self.inner
            .send(html.as_bytes().to_vec())
            .await
            .map_err(|e| RenderError::Stream(e.to_string()))
    }
}
