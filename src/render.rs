//! Colored terminal rendering for ctfpost-core types.

use ctfpost_core::document::Settings;
use ctfpost_core::reconcile::CycleReport;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Settings {
    fn render(&self) -> String {
        let preview = if self.disable_web_preview { "off" } else { "on" };
        [
            "Settings".bold().to_string(),
            format!("  Interval:   {}s", self.interval_sec),
            format!("  Horizon:    {} days", self.horizon_days),
            format!("  Min weight: {}", self.min_weight),
            format!("  Preview:    {preview}"),
        ]
        .join("\n")
    }
}

impl Render for CycleReport {
    fn render(&self) -> String {
        if self.is_quiet() {
            return format!(
                "{} {}",
                "No changes".dimmed(),
                format!("({} fetched, {} tracked)", self.fetched, self.tracked).dimmed()
            );
        }

        let mut lines = Vec::new();
        if self.posted > 0 {
            lines.push(format!("   {} {} posted", "+".green(), self.posted));
        }
        if self.edited > 0 {
            lines.push(format!("   {} {} edited", "~".yellow(), self.edited));
        }
        if self.forgotten > 0 {
            lines.push(format!(
                "   {} {} deleted messages forgotten",
                "-".red(),
                self.forgotten
            ));
        }
        if self.failed > 0 {
            lines.push(format!(
                "   {} {} failed, will retry",
                "!".red(),
                self.failed
            ));
        }
        lines.push(
            format!(
                "   {} fetched, {} filtered, {} invalid",
                self.fetched, self.filtered, self.invalid
            )
            .dimmed()
            .to_string(),
        );
        lines.join("\n")
    }
}
