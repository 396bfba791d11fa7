//! Property tests over random layer shapes
//!
//! - Parameter count formula
//! - Memory report purity
//! - Layout tiling

use dense_conf::{DenseLayerConf, Dropout, InputType, LayerConf, LayerContext, Updater};
use proptest::prelude::*;

fn dense(n_in: usize, n_out: usize, has_bias: bool, dropout: bool) -> DenseLayerConf {
    let builder = DenseLayerConf::builder()
        .n_in(n_in)
        .n_out(n_out)
        .has_bias(has_bias)
        .updater(Updater::adam(1e-3));
    if dropout {
        builder.dropout(Dropout::standard(0.5)).build()
    } else {
        builder.build()
    }
}

proptest! {
    #[test]
    fn prop_num_params_formula(n_in in 1usize..512, n_out in 1usize..512, has_bias: bool) {
        let conf = dense(n_in, n_out, has_bias, false);
        let expected = n_in * n_out + if has_bias { n_out } else { 0 };
        prop_assert_eq!(conf.num_params().unwrap(), expected);
    }

    #[test]
    fn prop_report_is_pure(n_in in 1usize..256, n_out in 1usize..256, has_bias: bool, dropout: bool) {
        let conf = dense(n_in, n_out, has_bias, dropout);
        let input = [InputType::feed_forward(n_in)];

        let first = conf.memory_report(&input).unwrap();
        let second = conf.memory_report(&input).unwrap();
        prop_assert_eq!(&first, &second);

        let dup = if dropout { n_in as u64 } else { 0 };
        prop_assert_eq!(first.working_memory_variable_train, n_out as u64 + dup);
        prop_assert_eq!(first.working_memory_variable_inference, n_out as u64);
        prop_assert_eq!(first.updater_state_size, 2 * first.parameter_size);
        prop_assert_eq!(first.cache_memory_fixed.host, 0);
        prop_assert_eq!(first.cache_memory_variable.device, 0);
    }

    #[test]
    fn prop_layout_tiles_buffer(n_in in 1usize..64, n_out in 1usize..64, has_bias: bool, extra in 0usize..8) {
        let conf = dense(n_in, n_out, has_bias, false);
        let required = conf.num_params().unwrap();
        let mut buf = vec![0.0f32; required + extra];

        let layer = conf.instantiate(LayerContext::new(0), &mut buf, false).unwrap();
        let covered: usize = layer.layout().iter().map(|(_, slot)| slot.len()).sum();

        prop_assert!(layer.layout().is_contiguous());
        prop_assert_eq!(covered, required);
        prop_assert_eq!(layer.num_params(), required);
    }
}
