use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{
    error::{LayerConfError, Result},
    model::layer_conf::DenseLayerConf,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParamRole {
    Weight,
    Bias,
}

impl ParamRole {
    pub fn key(&self) -> &'static str {
        match self {
            ParamRole::Weight => "W",
            ParamRole::Bias => "b",
        }
    }
}

impl fmt::Display for ParamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// Where one parameter lives inside a layer's flat view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSlot {
    pub range: Range<usize>,
    pub shape: Vec<usize>,
}

impl ParamSlot {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Maps each parameter role of a layer to its sub-range of the flat
/// parameter view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamLayout {
    slots: BTreeMap<ParamRole, ParamSlot>,
}

impl ParamLayout {
    pub fn new() -> Self {
        Self::default()
    }

    // Appends after the last slot
    pub fn push(&mut self, role: ParamRole, shape: Vec<usize>) -> Result<&ParamSlot> {
        let start = self.total_len();
        let end = shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .and_then(|len| start.checked_add(len))
            .ok_or_else(|| LayerConfError::overflow(format!("parameter {} of shape {:?}", role, shape)))?;
        Ok(self.slots.entry(role).or_insert(ParamSlot { range: start..end, shape }))
    }

    pub fn get(&self, role: ParamRole) -> Option<&ParamSlot> {
        self.slots.get(&role)
    }

    pub fn roles(&self) -> impl Iterator<Item = ParamRole> + '_ {
        self.slots.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamRole, &ParamSlot)> {
        self.slots.iter().map(|(role, slot)| (*role, slot))
    }

    pub fn total_len(&self) -> usize {
        self.slots.values().map(|slot| slot.range.end).max().unwrap_or(0)
    }

    /// Slots are contiguous, non-overlapping and start at zero.
    pub fn is_contiguous(&self) -> bool {
        let mut ranges: Vec<&Range<usize>> = self.slots.values().map(|s| &s.range).collect();
        ranges.sort_by_key(|r| r.start);

        let mut expected = 0;
        for range in ranges {
            if range.start != expected {
                return false;
            }
            expected = range.end;
        }
        true
    }
}

/// Knows how many parameters a configuration needs and how they are laid
/// out in (and optionally initialized into) a flat buffer.
pub trait ParamInitializer<C: ?Sized> {
    fn num_params(&self, conf: &C) -> Result<usize>;

    /// Lays the parameters out from the start of `view`, which must hold at
    /// least `num_params(conf)` values. Writes only when `initialize` is
    /// true, and never past the last parameter.
    fn init(&self, conf: &C, view: &mut [f32], initialize: bool) -> Result<ParamLayout>;
}

/// Weight matrix followed by an optional bias row.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultParamInitializer;

impl DefaultParamInitializer {
    pub fn layout(n_in: usize, n_out: usize, has_bias: bool) -> Result<ParamLayout> {
        let mut layout = ParamLayout::new();
        layout.push(ParamRole::Weight, vec![n_in, n_out])?;
        if has_bias {
            layout.push(ParamRole::Bias, vec![1, n_out])?;
        }
        Ok(layout)
    }
}

impl ParamInitializer<DenseLayerConf> for DefaultParamInitializer {
    fn num_params(&self, conf: &DenseLayerConf) -> Result<usize> {
        let (n_in, n_out) = conf.base.require_n_in_n_out("DenseLayer", None)?;
        let bias = if conf.has_bias { n_out } else { 0 };
        n_in.checked_mul(n_out)
            .and_then(|weights| weights.checked_add(bias))
            .ok_or_else(|| LayerConfError::overflow(format!("nIn * nOut + bias ({} x {})", n_in, n_out)))
    }

    fn init(&self, conf: &DenseLayerConf, view: &mut [f32], initialize: bool) -> Result<ParamLayout> {
        let (n_in, n_out) = conf.base.require_n_in_n_out("DenseLayer", None)?;
        let layout = Self::layout(n_in, n_out, conf.has_bias)?;

        let required = layout.total_len();
        if view.len() < required {
            return Err(LayerConfError::BufferTooSmall {
                layer_name: conf.base.layer_name.clone(),
                required,
                available: view.len(),
            });
        }
        let view = &mut view[..required];

        if initialize {
            conf.base.weight_init.validate()?;
            if let Some(slot) = layout.get(ParamRole::Weight) {
                conf.base.weight_init.init(&mut view[slot.range.clone()], n_in, n_out);
            }
            if let Some(slot) = layout.get(ParamRole::Bias) {
                view[slot.range.clone()].fill(conf.base.bias_init);
            }
        }

        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::weight_init::WeightInit;

    #[test]
    fn layout_puts_bias_after_weights() {
        let layout = DefaultParamInitializer::layout(10, 5, true).unwrap();
        assert_eq!(layout.get(ParamRole::Weight).unwrap().range, 0..50);
        assert_eq!(layout.get(ParamRole::Bias).unwrap().range, 50..55);
        assert_eq!(layout.total_len(), 55);
        assert!(layout.is_contiguous());
    }

    #[test]
    fn layout_without_bias() {
        let layout = DefaultParamInitializer::layout(4, 3, false).unwrap();
        assert!(layout.get(ParamRole::Bias).is_none());
        assert_eq!(layout.roles().collect::<Vec<_>>(), vec![ParamRole::Weight]);
        assert_eq!(layout.total_len(), 12);
    }

    #[test]
    fn init_writes_bias_constant() {
        let conf = DenseLayerConf::builder()
            .n_in(2)
            .n_out(3)
            .weight_init(WeightInit::Constant(1.5))
            .bias_init(0.1)
            .build();
        let mut buf = vec![0.0f32; 9];
        DefaultParamInitializer.init(&conf, &mut buf, true).unwrap();

        assert_eq!(&buf[..6], &[1.5; 6]);
        assert_eq!(&buf[6..], &[0.1; 3]);
    }

    #[test]
    fn init_rejects_short_buffer() {
        let conf = DenseLayerConf::builder().n_in(2).n_out(3).build();
        let mut buf = vec![0.0f32; 4];
        let err = DefaultParamInitializer.init(&conf, &mut buf, false).unwrap_err();
        assert!(matches!(err, LayerConfError::BufferTooSmall { required: 9, available: 4, .. }));
    }

    #[test]
    fn oversized_widths_are_reported() {
        let conf = DenseLayerConf::builder().n_in(usize::MAX / 2).n_out(3).build();
        let err = DefaultParamInitializer.num_params(&conf).unwrap_err();
        assert!(matches!(err, LayerConfError::Overflow(_)));

        let mut buf = vec![0.0f32; 4];
        let err = DefaultParamInitializer.init(&conf, &mut buf, true).unwrap_err();
        assert!(matches!(err, LayerConfError::Overflow(_)));
        assert!(buf.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn layout_push_detects_wrapping_end() {
        let mut layout = ParamLayout::new();
        layout.push(ParamRole::Weight, vec![usize::MAX, 1]).unwrap();
        assert!(layout.push(ParamRole::Bias, vec![1, 1]).is_err());
    }

    #[test]
    fn inverted_uniform_bounds_fail_before_writing() {
        let conf = DenseLayerConf::builder()
            .n_in(2)
            .n_out(3)
            .weight_init(WeightInit::UniformRandom { min: 1.0, max: 0.0 })
            .build();
        let mut buf = vec![-7.0f32; 9];

        let err = DefaultParamInitializer.init(&conf, &mut buf, true).unwrap_err();
        assert!(matches!(err, LayerConfError::InvalidArgument(_)));
        assert!(buf.iter().all(|v| *v == -7.0));

        // Nothing is sampled when the buffer is only bound
        DefaultParamInitializer.init(&conf, &mut buf, false).unwrap();
    }
}
