//! Registry configuration.

/// Configuration for the Registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Force `recorded_at` / `created_at` to strictly increase across
    /// mutations. When false they are only non-decreasing.
    pub strict_monotonic_time: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            strict_monotonic_time: true,
        }
    }
}
