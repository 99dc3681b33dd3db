use crate::config::Config;
use clap::Args;

#[derive(Args, Clone, Default, Debug)]
pub struct CommonParams {
    /// Override the generation model
    #[arg(long, help = "Override the generation model")]
    pub model: Option<String>,

    /// Override the sampling temperature
    #[arg(
        long,
        help = "Override the sampling temperature (0.0 - 2.0)",
        value_parser = temperature_parser
    )]
    pub temperature: Option<f32>,
}

impl CommonParams {
    /// Apply per-invocation overrides; returns true if anything changed
    pub fn apply_to_config(&self, config: &mut Config) -> bool {
        let mut changes_made = false;

        if let Some(model) = &self.model
            && config.model != *model
        {
            config.model.clone_from(model);
            changes_made = true;
        }

        if let Some(temperature) = self.temperature
            && (config.temperature - temperature).abs() > f32::EPSILON
        {
            config.temperature = temperature;
            changes_made = true;
        }

        changes_made
    }
}

/// Validates a temperature argument
pub fn temperature_parser(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("Invalid temperature '{s}': expected a number"))?;
    if (0.0..=2.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("Invalid temperature '{s}': must be between 0.0 and 2.0"))
    }
}
