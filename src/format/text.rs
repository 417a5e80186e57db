//! Human-readable text output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::viewport::ViewportResult;

/// Text formatter - outputs a human-readable summary per cluster
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable cluster summary"
    }

    fn format(&self, result: &ViewportResult, config: &Config) -> Result<String> {
        let mut output = String::new();

        let prefixes: Vec<&str> = result.ranges.iter().map(|r| r.prefix()).collect();
        output.push_str(&format!(
            "{} clusters from {} records ({} fetched, key prefix {})\n",
            result.clusters.len(),
            result.visible,
            result.fetched,
            prefixes.join(", ")
        ));

        for cluster in &result.clusters {
            output.push_str(&format!(
                "\n{}: {} report{} at ({:.6}, {:.6})\n",
                cluster.id,
                cluster.count,
                if cluster.count == 1 { "" } else { "s" },
                cluster.center.lat,
                cluster.center.lng
            ));
            output.push_str(&format!(
                "  complaints: {}  compliments: {}\n",
                cluster.modes.complaint, cluster.modes.compliment
            ));
            for (category, tally) in &cluster.categories {
                output.push_str(&format!(
                    "  {:10} -{} +{}\n",
                    category.as_str(),
                    tally.complaint,
                    tally.compliment
                ));
            }
            let url = config.format_url(None, cluster.center.lat, cluster.center.lng)?;
            output.push_str(&format!("  {}\n", url));
        }

        Ok(output)
    }
}
