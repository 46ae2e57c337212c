//! Annotation engine: dimensions and index callouts.
//!
//! Every annotation references faces or edges read back from the host for the
//! elements the layout produced, so the dimensions stay attached to the model
//! if it is edited later. Work is split into batches, one host transaction
//! each:
//!
//! - horizontal dimensions, per chain and per view ([`horizontal`])
//! - vertical dimensions in the elevation view ([`vertical`])
//! - index callouts in the elevation view ([`callout`])
//!
//! After each dimension batch is committed, any dimension from that batch
//! that resolved to exactly zero is deleted again in a cleanup transaction.

mod callout;
mod horizontal;
mod vertical;

use log::{debug, info};

use ahu_core::{
    geometry::{Bounds3, Vector3},
    host::{AnnotationId, Face, Host, HostError, View, ViewId},
};

use crate::{
    config::AnnotationConfig,
    error::AhuError,
    layout::{Chain, LayoutOutput},
};

/// Counts of what an annotation pass produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationSummary {
    dimensions: usize,
    removed_zero: usize,
    callouts: usize,
}

impl AnnotationSummary {
    /// Dimensions created, including those later removed as zero.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Dimensions deleted because they resolved to zero.
    pub fn removed_zero(&self) -> usize {
        self.removed_zero
    }

    pub fn callouts(&self) -> usize {
        self.callouts
    }
}

/// Places dimensions and callouts for a finished layout.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationEngine<'a> {
    config: &'a AnnotationConfig,
}

impl<'a> AnnotationEngine<'a> {
    pub fn new(config: &'a AnnotationConfig) -> Self {
        Self { config }
    }

    /// Annotates `layout` in the configured front and top views.
    ///
    /// # Errors
    ///
    /// Returns [`AhuError::Config`] before touching the document if either
    /// view is missing, and [`AhuError::Host`] if the host rejects an
    /// operation.
    pub fn add_annotations<H: Host>(
        &self,
        host: &mut H,
        layout: &LayoutOutput,
    ) -> Result<AnnotationSummary, AhuError> {
        let front = self.require_view(host, self.config.front_view())?;
        let top = self.require_view(host, self.config.top_view())?;

        let mut summary = AnnotationSummary::default();
        let Some(bounds) = model_bounds(host, layout)? else {
            debug!("Nothing to annotate");
            return Ok(summary);
        };

        for chain in [Chain::Intake, Chain::Exhaust] {
            for view in [&front, &top] {
                horizontal::annotate_chain(
                    host,
                    self.config,
                    layout,
                    chain,
                    view,
                    bounds,
                    &mut summary,
                )?;
            }
        }
        vertical::annotate(host, self.config, layout, &front, &mut summary)?;
        callout::annotate(host, self.config, layout, &front, &mut summary)?;

        info!(
            dimensions = summary.dimensions,
            removed_zero = summary.removed_zero,
            callouts = summary.callouts;
            "Annotations added"
        );
        Ok(summary)
    }

    fn require_view<H: Host>(&self, host: &H, name: &str) -> Result<View, AhuError> {
        host.view(name)
            .ok_or_else(|| AhuError::Config(format!("view `{name}` does not exist in the document")))
    }
}

/// Bounds of every element of the layout, or `None` for an empty layout.
fn model_bounds<H: Host>(host: &H, layout: &LayoutOutput) -> Result<Option<Bounds3>, HostError> {
    let mut bounds: Option<Bounds3> = None;
    for element in layout.elements().flat_map(|positioned| positioned.all_elements()) {
        let element_bounds = host.bounds(element)?;
        bounds = Some(bounds.map_or(element_bounds, |b| b.merge(element_bounds)));
    }
    Ok(bounds)
}

/// Deletes the dimensions among `created` that resolved to zero.
fn remove_zero_dimensions<H: Host>(
    host: &mut H,
    view: ViewId,
    created: &[AnnotationId],
) -> Result<usize, HostError> {
    let zero: Vec<AnnotationId> = host
        .dimensions(view)?
        .into_iter()
        .filter(|dimension| created.contains(&dimension.id()))
        .filter(|dimension| dimension.value() == Some(0.0))
        .map(|dimension| dimension.id())
        .collect();
    if zero.is_empty() {
        return Ok(0);
    }

    host.begin_transaction("Remove zero dimensions")?;
    host.delete_annotations(&zero)?;
    host.commit_transaction()?;
    debug!(count = zero.len(); "Removed zero-length dimensions");
    Ok(zero.len())
}

/// The face with normal `direction` that lies furthest along it.
fn extreme_face(faces: &[Face], direction: Vector3) -> Option<&Face> {
    faces
        .iter()
        .filter(|face| face.normal().is_almost_equal(direction))
        .max_by(|a, b| {
            a.origin()
                .to_vector()
                .dot(direction)
                .total_cmp(&b.origin().to_vector().dot(direction))
        })
}
