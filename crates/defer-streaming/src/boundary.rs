//! Boundary declarations.

use std::marker::PhantomData;

use defer_data::UnitError;

use crate::fallback::ErrorView;
use crate::renderer::BoundaryView;

/// A boundary is a region of output that follows one pending handle.
#[derive(Debug, Clone)]
pub struct Boundary {
    /// Boundary id (matches the unit it shows).
    pub id: String,
    /// Markup shown while the unit is pending.
    pub fallback: String,
    /// Markup shown when the unit fails.
    pub error_view: ErrorView,
}

impl Boundary {
    /// Create a boundary with an empty fallback.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fallback: String::new(),
            error_view: ErrorView::default(),
        }
    }

    /// Create a boundary using the builder.
    pub fn builder(id: impl Into<String>) -> BoundaryBuilder {
        BoundaryBuilder::new(id)
    }

    /// Pair this boundary with a render function for resolved values.
    pub fn view<T, F>(self, resolved: F) -> HtmlView<T, F>
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        HtmlView {
            boundary: self,
            resolved,
            _value: PhantomData,
        }
    }
}

/// Builder for ergonomic boundary definition.
pub struct BoundaryBuilder {
    id: String,
    fallback: String,
    error_view: ErrorView,
}

impl BoundaryBuilder {
    /// Create a new boundary builder.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fallback: String::new(),
            error_view: ErrorView::default(),
        }
    }

    /// Set fallback HTML.
    pub fn with_fallback(mut self, html: impl Into<String>) -> Self {
        self.fallback = html.into();
        self
    }

    /// Set the error view.
    pub fn with_error_view(mut self, view: ErrorView) -> Self {
        self.error_view = view;
        self
    }

    /// Build the boundary.
    pub fn build(self) -> Boundary {
        Boundary {
            id: self.id,
            fallback: self.fallback,
            error_view: self.error_view,
        }
    }
}

/// A [`BoundaryView`] built from a [`Boundary`] and a render function.
pub struct HtmlView<T, F> {
    boundary: Boundary,
    resolved: F,
    _value: PhantomData<fn(&T)>,
}

impl<T, F> HtmlView<T, F> {
    /// The boundary this view renders.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }
}

impl<T: 'static, F> BoundaryView<T> for HtmlView<T, F>
where
    F: Fn(&T) -> String + Send + Sync + 'static,
{
    fn fallback(&self) -> String {
        self.boundary.fallback.clone()
    }

    fn resolved(&self, value: &T) -> String {
        (self.resolved)(value)
    }

    fn error(&self, error: &UnitError) -> Option<String> {
        self.boundary.error_view.render(error)
    }
}
