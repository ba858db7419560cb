//! Merge rules: built-in defaults under every file and environment source.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the built-in defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("scheduler.checkpoint_delay_ms", 50)?
        .set_default("storage.backend", "sled")?
        .set_default("storage.layouts_path", ".layout3d/layouts")?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
