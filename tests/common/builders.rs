//! Test data builders for creating test objects

use reduction_pipeline::config::{LogFormat, PipelineConfig};

/// Builder for creating test configs
pub struct ConfigBuilder {
    config: PipelineConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    pub fn processes(mut self, n: usize) -> Self {
        self.config.topology.process_count = n;
        self
    }

    pub fn sequence_len(mut self, len: usize) -> Self {
        self.config.sequence.length = len;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.transport.channel_capacity = capacity;
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new().processes(7).sequence_len(3).build();
        assert_eq!(config.topology.process_count, 7);
        assert_eq!(config.sequence.length, 3);
    }
}
