//! Public SDK for deferred page loading.
//!
//! This crate re-exports the whole stack:
//!
//! ```ignore
//! use defer_sdk::prelude::*;
//!
//! let plan = LoadPlan::builder()
//!     .eager("person", || async { Ok(load_person().await?) })
//!     .deferred("reviews", || async { Ok(load_reviews().await?) })
//!     .build()?;
//!
//! let result = LoadOrchestrator::default().run(plan).await?;
//! let mut renderer = ProgressiveRenderer::new();
//! renderer.mount("reviews", &result.handle("reviews").unwrap(), reviews_view)?;
//! while let Some(frame) = renderer.next_frame().await {
//!     sink.send_frame(&frame).await?;
//! }
//! ```

pub use defer_core;
pub use defer_data;
pub use defer_executor;
pub use defer_observability;
pub use defer_streaming;

/// Prelude for convenient imports.
pub mod prelude {
    pub use defer_core::*;
    pub use defer_data::*;
    pub use defer_executor::*;
    pub use defer_observability::*;
    pub use defer_streaming::*;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::prelude::*;

    #[tokio::test(start_paused = true)]
    async fn test_plan_to_frames() {
        let plan = LoadPlan::builder()
            .eager("greeting", || async { Ok("John Doe".to_string()) })
            .deferred("message", || async {
                tokio::time::sleep(Duration::from_millis(2000)).await;
                Ok("Hello deferred!".to_string())
            })
            .build()
            .unwrap();
        let result = LoadOrchestrator::default().run(plan).await.unwrap();
        assert_eq!(result.value("greeting").map(String::as_str), Some("John Doe"));

        let mut renderer = ProgressiveRenderer::new();
        let view = Boundary::builder("message")
            .with_fallback("Loading stuff...")
            .build()
            .view(|msg: &String| format!("<h3>{}</h3>", msg));
        renderer
            .mount("message", &result.handle("message").unwrap(), view)
            .unwrap();

        let mut states = Vec::new();
        while let Some(frame) = renderer.next_frame().await {
            states.push((frame.state, frame.html));
        }
        assert_eq!(
            states,
            vec![
                (BoundaryState::Fallback, Some("Loading stuff...".to_string())),
                (BoundaryState::Resolved, Some("<h3>Hello deferred!</h3>".to_string())),
            ]
        );
    }
}
