use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::tensor::{data_type::DataType, input_type::InputType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheMode {
    None,
    Host,
    Device,
}

impl CacheMode {
    pub const ALL: [CacheMode; 3] = [CacheMode::None, CacheMode::Host, CacheMode::Device];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryUseMode {
    Inference,
    Training,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryType {
    Parameters,
    ParameterGradients,
    Activations,
    ActivationGradients,
    UpdaterState,
    WorkingMemoryFixed,
    WorkingMemoryVariable,
    CachedMemoryFixed,
    CachedMemoryVariable,
}

impl MemoryType {
    pub const ALL: [MemoryType; 9] = [
        MemoryType::Parameters,
        MemoryType::ParameterGradients,
        MemoryType::Activations,
        MemoryType::ActivationGradients,
        MemoryType::UpdaterState,
        MemoryType::WorkingMemoryFixed,
        MemoryType::WorkingMemoryVariable,
        MemoryType::CachedMemoryFixed,
        MemoryType::CachedMemoryVariable,
    ];
}

/// Element counts a layer keeps under each cache mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheModeMemory {
    pub none: u64,
    pub host: u64,
    pub device: u64,
}

impl CacheModeMemory {
    pub const fn all_zeros() -> Self {
        Self { none: 0, host: 0, device: 0 }
    }

    pub fn get(&self, mode: CacheMode) -> u64 {
        match mode {
            CacheMode::None => self.none,
            CacheMode::Host => self.host,
            CacheMode::Device => self.device,
        }
    }
}

/// Static memory footprint of one layer for one input shape.
///
/// Standard memory is in elements and independent of minibatch size.
/// Working memory "fixed" values are elements per minibatch, "variable"
/// values are elements per example.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMemoryReport {
    pub layer_name: Option<String>,
    pub layer_type: String,
    pub input_type: InputType,
    pub output_type: InputType,

    pub parameter_size: u64,
    pub updater_state_size: u64,

    pub working_memory_fixed_inference: u64,
    pub working_memory_variable_inference: u64,
    pub working_memory_fixed_train: u64,
    pub working_memory_variable_train: u64,

    pub cache_memory_fixed: CacheModeMemory,
    pub cache_memory_variable: CacheModeMemory,
}

impl LayerMemoryReport {
    pub fn builder(
        layer_name: Option<String>,
        layer_type: impl Into<String>,
        input_type: InputType,
        output_type: InputType,
    ) -> LayerMemoryReportBuilder {
        LayerMemoryReportBuilder {
            report: LayerMemoryReport {
                layer_name,
                layer_type: layer_type.into(),
                input_type,
                output_type,
                parameter_size: 0,
                updater_state_size: 0,
                working_memory_fixed_inference: 0,
                working_memory_variable_inference: 0,
                working_memory_fixed_train: 0,
                working_memory_variable_train: 0,
                cache_memory_fixed: CacheModeMemory::all_zeros(),
                cache_memory_variable: CacheModeMemory::all_zeros(),
            },
        }
    }

    pub fn memory_bytes(
        &self,
        memory_type: MemoryType,
        minibatch_size: u64,
        use_mode: MemoryUseMode,
        cache_mode: CacheMode,
        data_type: DataType,
    ) -> u64 {
        let bytes = data_type.bytes_per_element();
        let training = use_mode == MemoryUseMode::Training;

        let elements = match memory_type {
            MemoryType::Parameters => self.parameter_size,
            MemoryType::ParameterGradients if training => self.parameter_size,
            // Shapes too large to count saturate like every other total here
            MemoryType::Activations => {
                let per_example = self.output_type.elements_per_example().unwrap_or(u64::MAX);
                minibatch_size.saturating_mul(per_example)
            }
            MemoryType::ActivationGradients if training => {
                let per_example = self.input_type.elements_per_example().unwrap_or(u64::MAX);
                minibatch_size.saturating_mul(per_example)
            }
            MemoryType::UpdaterState if training => self.updater_state_size,
            MemoryType::WorkingMemoryFixed => {
                if training {
                    self.working_memory_fixed_train
                } else {
                    self.working_memory_fixed_inference
                }
            }
            MemoryType::WorkingMemoryVariable => {
                let per_example = if training {
                    self.working_memory_variable_train
                } else {
                    self.working_memory_variable_inference
                };
                minibatch_size.saturating_mul(per_example)
            }
            MemoryType::CachedMemoryFixed if training => self.cache_memory_fixed.get(cache_mode),
            MemoryType::CachedMemoryVariable if training => {
                minibatch_size.saturating_mul(self.cache_memory_variable.get(cache_mode))
            }
            // Gradient, updater and cache memory only exist while training
            _ => 0,
        };

        elements.saturating_mul(bytes)
    }

    pub fn total_memory_bytes(
        &self,
        minibatch_size: u64,
        use_mode: MemoryUseMode,
        cache_mode: CacheMode,
        data_type: DataType,
    ) -> u64 {
        MemoryType::ALL
            .iter()
            .map(|mt| self.memory_bytes(*mt, minibatch_size, use_mode, cache_mode, data_type))
            .fold(0u64, |acc, b| acc.saturating_add(b))
    }

    /// Per-memory-type byte table for both phases.
    pub fn summary(&self, minibatch_size: u64, data_type: DataType) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self);
        let _ = writeln!(out, "Minibatch Size: {}", minibatch_size);
        let _ = writeln!(out, "{:-<64}", "");
        let _ = writeln!(out, "{:<24} {:<18} {:<18}", "Memory Type", "Inference", "Training");
        let _ = writeln!(out, "{:-<64}", "");

        for mt in MemoryType::ALL {
            let inference = self.memory_bytes(mt, minibatch_size, MemoryUseMode::Inference, CacheMode::None, data_type);
            let training = self.memory_bytes(mt, minibatch_size, MemoryUseMode::Training, CacheMode::None, data_type);
            let _ = writeln!(
                out,
                "{:<24} {:<18} {:<18}",
                format!("{:?}", mt),
                format_memory(inference),
                format_memory(training)
            );
        }

        let _ = writeln!(out, "{:-<64}", "");
        let _ = writeln!(
            out,
            "{:<24} {:<18} {:<18}",
            "Total",
            format_memory(self.total_memory_bytes(minibatch_size, MemoryUseMode::Inference, CacheMode::None, data_type)),
            format_memory(self.total_memory_bytes(minibatch_size, MemoryUseMode::Training, CacheMode::None, data_type))
        );
        out
    }
}

impl fmt::Display for LayerMemoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) {} -> {}: params={}, updater={}, working(inference)={}+{}/ex, working(train)={}+{}/ex",
            self.layer_type,
            self.layer_name.as_deref().unwrap_or("-"),
            self.input_type,
            self.output_type,
            self.parameter_size,
            self.updater_state_size,
            self.working_memory_fixed_inference,
            self.working_memory_variable_inference,
            self.working_memory_fixed_train,
            self.working_memory_variable_train,
        )
    }
}

pub fn format_memory(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub struct LayerMemoryReportBuilder {
    report: LayerMemoryReport,
}

impl LayerMemoryReportBuilder {
    pub fn standard_memory(mut self, parameter_size: u64, updater_state_size: u64) -> Self {
        self.report.parameter_size = parameter_size;
        self.report.updater_state_size = updater_state_size;
        self
    }

    pub fn working_memory(
        mut self,
        fixed_inference: u64,
        variable_inference: u64,
        fixed_train: u64,
        variable_train: u64,
    ) -> Self {
        self.report.working_memory_fixed_inference = fixed_inference;
        self.report.working_memory_variable_inference = variable_inference;
        self.report.working_memory_fixed_train = fixed_train;
        self.report.working_memory_variable_train = variable_train;
        self
    }

    pub fn cache_memory(mut self, fixed: CacheModeMemory, variable_per_example: CacheModeMemory) -> Self {
        self.report.cache_memory_fixed = fixed;
        self.report.cache_memory_variable = variable_per_example;
        self
    }

    pub fn build(self) -> LayerMemoryReport {
        self.report
    }
}
