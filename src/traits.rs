//! Shared trait abstractions

use crate::{core::viewport::Viewport, Result};

/// Trait for viewport-aware components
/// Standardizes viewport change handling
pub trait ViewportAware {
    /// Handle viewport changes
    fn on_viewport(&mut self, viewport: &Viewport) -> Result<()>;

    /// Check if component requires viewport updates
    fn requires_viewport_updates(&self) -> bool {
        true
    }
}

/// Trait for configurable components
pub trait Configurable {
    type Config: Clone;

    /// Get the current configuration
    fn config(&self) -> &Self::Config;

    /// Set new configuration
    fn set_config(&mut self, config: Self::Config) -> Result<()>;

    /// Validate configuration
    fn validate_config(config: &Self::Config) -> Result<()> {
        let _ = config; // Default implementation accepts all configs
        Ok(())
    }

    /// Update configuration with a partial change
    fn update_config<F>(&mut self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Self::Config),
    {
        let mut config = self.config().clone();
        updater(&mut config);
        Self::validate_config(&config)?;
        self.set_config(config)
    }
}
