use std::fmt::Write;

use super::types::RankedResult;

/// Message posted after a successful registration
pub fn format_game_result(caller_id: &str, table_link: &str, results: &[RankedResult]) -> String {
    let mut out = format!("Thank you for registering a [game]({table_link}) <@{caller_id}>!\n```\n");
    let _ = writeln!(out, "{:<5} {:<20} {:<10}", "Rank", "Name", "Elo Change");
    let _ = writeln!(
        out,
        "{:<5} {:<20} {:<10}",
        "-".repeat(5),
        "-".repeat(20),
        "-".repeat(10)
    );
    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<5} {:<20} {:<10}",
            i + 1,
            result.name,
            result.elo_change
        );
    }
    out.push_str("```");
    out
}

/// Message sent back to a caller whose registration failed
pub fn format_error(caller_id: &str, error: &impl std::fmt::Display) -> String {
    format!("<@{caller_id}> Error: {error}")
}
