//! Visitor commands: stats / record

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::visitor::VisitorCounter;

/// Print today's and all-time visitor counts
pub async fn show_stats(counter: &VisitorCounter, json: bool) -> Result<(), CliError> {
    let stats = counter.get_stats().await?;

    if json {
        let out = serde_json::to_string_pretty(&stats)
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        println!("{}", out);
    } else {
        println!("{}", "Visitor Stats (UTC)".bold().green());
        println!("  {}: {}", "Today".cyan(), stats.daily_visitors);
        println!("  {}: {}", "Total".cyan(), stats.total_visitors);
    }

    Ok(())
}

/// Record one visit for today
pub async fn record_visit(counter: &VisitorCounter) -> Result<(), CliError> {
    counter.record_visit().await?;
    println!("{} Visit recorded", "✓".bold().green());
    Ok(())
}
