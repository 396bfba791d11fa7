use std::fmt;
use std::sync::Arc;

use super::{
    layer::{LayerConf, TrainingListener},
    params::{ParamLayout, ParamRole},
};

/// A layer bound to a slice of a caller-owned parameter buffer.
///
/// The layer never owns, copies or resizes its parameters. Every accessor
/// hands out a sub-slice of the borrowed view.
pub struct BoundLayer<'a> {
    conf: &'a dyn LayerConf,
    name: Option<String>,
    index: usize,
    listeners: Vec<Arc<dyn TrainingListener>>,
    params: &'a mut [f32],
    layout: ParamLayout,
}

impl<'a> BoundLayer<'a> {
    pub(crate) fn new(
        conf: &'a dyn LayerConf,
        name: Option<String>,
        index: usize,
        listeners: Vec<Arc<dyn TrainingListener>>,
        params: &'a mut [f32],
        layout: ParamLayout,
    ) -> Self {
        Self {
            conf,
            name,
            index,
            listeners,
            params,
            layout,
        }
    }

    pub fn conf(&self) -> &'a dyn LayerConf {
        self.conf
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    pub fn layout(&self) -> &ParamLayout {
        &self.layout
    }

    // Whole view, all roles back to back
    pub fn params(&self) -> &[f32] {
        &*self.params
    }

    pub fn params_mut(&mut self) -> &mut [f32] {
        &mut *self.params
    }

    pub fn param(&self, role: ParamRole) -> Option<&[f32]> {
        let slot = self.layout.get(role)?;
        Some(&self.params[slot.range.clone()])
    }

    pub fn param_mut(&mut self, role: ParamRole) -> Option<&mut [f32]> {
        let slot = self.layout.get(role)?;
        Some(&mut self.params[slot.range.clone()])
    }

    pub fn listeners(&self) -> &[Arc<dyn TrainingListener>] {
        &self.listeners
    }

    pub fn notify_iteration(&self, iteration: usize) {
        for listener in &self.listeners {
            listener.iteration_done(self.name(), self.index, iteration);
        }
    }
}

impl fmt::Debug for BoundLayer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundLayer")
            .field("layer_type", &self.conf.layer_type())
            .field("name", &self.name)
            .field("index", &self.index)
            .field("num_params", &self.params.len())
            .field("layout", &self.layout)
            .finish()
    }
}
