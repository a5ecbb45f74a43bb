use crate::cli::commands::load_config;
use crate::errors::AppResult;
use crate::types::ScanPlan;
use crate::utils::time::format_timestamp;
use clap::Args;

/// Print the window plan without touching any data source
#[derive(Args)]
pub struct WindowsCommand {
    /// Unix timestamp of the first window (overrides config.toml)
    #[arg(long)]
    start: Option<i64>,

    /// Window length in seconds (overrides config.toml)
    #[arg(long)]
    window_seconds: Option<i64>,

    /// Number of windows (overrides config.toml)
    #[arg(long)]
    window_count: Option<usize>,
}

impl WindowsCommand {
    pub fn run(&self) -> AppResult<()> {
        let scan = load_config()?.scan;
        let plan = ScanPlan::new(
            self.start.unwrap_or(scan.start_timestamp),
            self.window_seconds.unwrap_or(scan.window_seconds),
            self.window_count.unwrap_or(scan.window_count),
        )?;

        for line in plan_lines(&plan) {
            println!("{}", line);
        }
        Ok(())
    }
}

/// One line per window plus the overall range
pub fn plan_lines(plan: &ScanPlan) -> Vec<String> {
    let end = plan.end().unwrap_or(plan.start);
    let mut lines = vec![
        format!("--> Scan start: {}", format_timestamp(plan.start)),
        format!("<-- Scan end: {}", format_timestamp(end)),
    ];
    lines.extend(plan.windows().enumerate().map(|(index, window)| {
        format!(
            "{:>4}: {} [{} - {})",
            index + 1,
            window,
            window.start,
            window.end
        )
    }));
    lines
}
