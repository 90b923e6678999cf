//! Runtime configuration
//!
//! Memory map of an instance:
//!
//! ```text
//! 0                 stack_base           stack_base + stack_size       memory_size
//! |  reserved       |  shadow stack  ->  |  heap (aligned start)  ->  |
//! ```

use crate::error::{RuntimeError, RuntimeResult};
use serde::{Deserialize, Serialize};
use wasmrt_core::{StringLayout, align_int};

/// Runtime instance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Linear memory size in bytes.
    /// Default: 16MB
    pub memory_size: u32,

    /// Address of the shadow stack base sentinel.
    /// Default: 1024
    pub stack_base: u32,

    /// Bytes reserved for the shadow stack region.
    /// Default: 64KB
    pub stack_size: u32,

    /// Alignment of heap allocations.
    /// Default: 8
    pub heap_alignment: i32,

    /// Where string objects keep their length and code units
    pub string_layout: StringLayout,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            memory_size: 16 * 1024 * 1024, // 16MB
            stack_base: 1024,
            stack_size: 64 * 1024, // 64KB
            heap_alignment: 8,
            string_layout: StringLayout::default(),
        }
    }
}

impl RuntimeConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Small instance for tests (256KB memory, 16KB stack)
    pub fn test() -> Self {
        Self {
            memory_size: 256 * 1024,
            stack_size: 16 * 1024,
            ..Default::default()
        }
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> RuntimeResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> RuntimeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the memory size
    pub fn memory_size(mut self, bytes: u32) -> Self {
        self.memory_size = bytes;
        self
    }

    /// Set the shadow stack base and size
    pub fn stack(mut self, base: u32, size: u32) -> Self {
        self.stack_base = base;
        self.stack_size = size;
        self
    }

    /// Set the heap alignment
    pub fn heap_alignment(mut self, alignment: i32) -> Self {
        self.heap_alignment = alignment;
        self
    }

    /// Set the string object layout
    pub fn string_layout(mut self, layout: StringLayout) -> Self {
        self.string_layout = layout;
        self
    }

    /// First heap address: the end of the stack region, aligned
    pub fn heap_start(&self) -> RuntimeResult<u32> {
        let end = self.stack_base as i64 + self.stack_size as i64;
        if end > i32::MAX as i64 {
            return Err(RuntimeError::Config(format!(
                "stack region ends past addressable memory ({end:#x})"
            )));
        }
        Ok(align_int(end as i32, self.heap_alignment)? as u32)
    }

    /// Check that the regions fit together
    pub fn validate(&self) -> RuntimeResult<()> {
        if self.heap_alignment <= 0 {
            return Err(RuntimeError::Config(format!(
                "heap_alignment must be positive, got {}",
                self.heap_alignment
            )));
        }
        if self.stack_base == 0 || self.stack_base % wasmrt_core::WORD_SIZE != 0 {
            return Err(RuntimeError::Config(format!(
                "stack_base must be a non-zero multiple of {}, got {}",
                wasmrt_core::WORD_SIZE,
                self.stack_base
            )));
        }
        let layout = &self.string_layout;
        if layout.length_offset < 0 || layout.chars_offset < 0 {
            return Err(RuntimeError::Config(
                "string layout offsets must be non-negative".to_string(),
            ));
        }
        let heap_start = self.heap_start()?;
        if heap_start >= self.memory_size {
            return Err(RuntimeError::Config(format!(
                "memory of {} bytes leaves no room for a heap after the stack (heap would start at {heap_start:#x})",
                self.memory_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.heap_start().unwrap(), 1024 + 64 * 1024);
        assert!(RuntimeConfig::test().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = RuntimeConfig::from_json(r#"{"memory_size": 131072, "stack_size": 4096}"#).unwrap();
        assert_eq!(config.memory_size, 131072);
        assert_eq!(config.stack_size, 4096);
        assert_eq!(config.stack_base, 1024);
        assert_eq!(config.string_layout, StringLayout::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = RuntimeConfig::test().heap_alignment(16);
        let parsed = RuntimeConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            RuntimeConfig::from_json("{not json"),
            Err(RuntimeError::Config(_))
        ));
        assert!(RuntimeConfig::from_json(r#"{"memory_size": -1}"#).is_err());
    }

    #[test]
    fn test_rejects_overlapping_regions() {
        let config = RuntimeConfig::new().memory_size(4096).stack(1024, 4096);
        assert!(matches!(config.validate(), Err(RuntimeError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_alignment_and_base() {
        assert!(RuntimeConfig::new().heap_alignment(0).validate().is_err());
        assert!(RuntimeConfig::new().stack(1026, 1024).validate().is_err());
        assert!(RuntimeConfig::new().stack(0, 1024).validate().is_err());
    }

    #[test]
    fn test_odd_heap_alignment() {
        let config = RuntimeConfig::new().stack(1024, 1000).heap_alignment(24);
        assert_eq!(config.heap_start().unwrap(), 2040);
    }
}
