use anyhow::Result;
use serde::Serialize;

use crate::cli;

/// Structured formats; text output is printed by each command itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    /// `None` for text output
    pub fn structured(format: cli::OutputFormat) -> Option<Self> {
        match format {
            cli::OutputFormat::Text => None,
            cli::OutputFormat::Json => Some(Self::Json),
            cli::OutputFormat::Yaml => Some(Self::Yaml),
        }
    }
}

pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    println!("{}", render(&data, format)?);
    Ok(())
}

fn render<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    let json_value = serde_json::to_value(data)?;
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&json_value)?,
        OutputFormat::Yaml => serde_yaml::to_string(&json_value)?
            .trim_end()
            .to_string(),
    };
    Ok(rendered)
}
