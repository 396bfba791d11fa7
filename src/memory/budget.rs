use crate::{
    error::{LayerConfError, Result},
    tensor::data_type::DataType,
};

use super::report::{format_memory, CacheMode, LayerMemoryReport, MemoryUseMode};

// Tracks bytes only. Element counts are converted by the caller or by reserve_report

pub struct MemoryBudget {
    maximum: u64,
    current: u64,
}

impl MemoryBudget {
    pub fn new(maximum: u64) -> Self {
        Self {
            maximum,
            current: 0,
        }
    }

    pub fn reserve(&mut self, size: u64) -> Result<()> {
        let new_usage = match self.current.checked_add(size) {
            Some(usage) => usage,
            None => return Err(LayerConfError::OutOfMemory(
                format!("Memory reservation would overflow: current {} + size {}",
                    self.current, size)
            )),
        };
        if new_usage > self.maximum {
            return Err(LayerConfError::OutOfMemory(
                format!("Memory limit exceeded: tried to reserve {} when {} of {} are used",
                    format_memory(size), format_memory(self.current), format_memory(self.maximum))
            ));
        }
        self.current = new_usage;
        Ok(())
    }

    /// Reserves the full footprint of a layer and returns the byte count taken.
    pub fn reserve_report(
        &mut self,
        report: &LayerMemoryReport,
        minibatch_size: u64,
        use_mode: MemoryUseMode,
        cache_mode: CacheMode,
        data_type: DataType,
    ) -> Result<u64> {
        let size = report.total_memory_bytes(minibatch_size, use_mode, cache_mode, data_type);
        self.reserve(size)?;
        Ok(size)
    }

    pub fn release(&mut self, size: u64) {
        self.current = self.current.saturating_sub(size);
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn maximum(&self) -> u64 {
        self.maximum
    }

    pub fn available(&self) -> u64 {
        self.maximum.saturating_sub(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_and_release() {
        let mut budget = MemoryBudget::new(100);
        budget.reserve(60).unwrap();
        assert_eq!(budget.available(), 40);

        let err = budget.reserve(41).unwrap_err();
        assert!(matches!(err, LayerConfError::OutOfMemory(_)));
        assert_eq!(budget.current(), 60);

        budget.release(100);
        assert_eq!(budget.current(), 0);
    }

    #[test]
    fn overflow_is_rejected() {
        let mut budget = MemoryBudget::new(u64::MAX);
        budget.reserve(u64::MAX).unwrap();
        assert!(budget.reserve(1).is_err());
    }
}
