//! Live message feed configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Live message feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Buffer size of each conversation's broadcast channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl RealtimeConfig {
    /// Validate realtime configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.channel_capacity == 0 || self.channel_capacity > 4096 {
            return Err(ValidationError::InvalidChannelCapacity);
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    128
}
