//! "Time since" label calculator.

use clap::Args;
use serde::Serialize;

use crate::output::{self, OutputFormat};
use fieldops_core::error::AppError;
use fieldops_tracking::view::{TimeAgo, time_ago_seconds};

/// Arguments for the time-ago command
#[derive(Debug, Args)]
pub struct TimeAgoArgs {
    /// Age in seconds
    pub seconds: Vec<u64>,
}

#[derive(Debug, Serialize)]
struct Label {
    seconds: u64,
    bucket: TimeAgo,
    label: String,
}

/// Print the label for each age
pub fn execute(args: &TimeAgoArgs, format: OutputFormat) -> Result<(), AppError> {
    if args.seconds.is_empty() {
        return Err(AppError::validation("At least one age in seconds is required"));
    }

    let labels: Vec<Label> = args
        .seconds
        .iter()
        .map(|&seconds| {
            let bucket = time_ago_seconds(seconds);
            Label {
                seconds,
                bucket,
                label: bucket.to_string(),
            }
        })
        .collect();

    match format {
        OutputFormat::Table => {
            for label in &labels {
                output::print_kv(&format!("{}s", label.seconds), &label.label);
            }
        }
        OutputFormat::Json => output::print_item(&labels, format),
    }
    Ok(())
}
