use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::evolution::GenerationStats;

/// Append-only csv log of generation summaries, one row per completed
/// generation, emitted in generation order.
pub struct StatsLog {
    writer: Writer<File>,
}

impl StatsLog {
    /// creates the file and writes the header line
    pub fn create(path: &Path) -> Result<Self, csv::Error> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record([
            "generation",
            "best_agent",
            "best_score",
            "record_score",
            "best_fitness",
            "mean_fitness",
        ])?;
        writer.flush()?;
        Ok(Self { writer })
    }

    /// one generation, fitness columns rounded to two decimals
    pub fn append(&mut self, stats: &GenerationStats) -> Result<(), csv::Error> {
        self.writer.write_record([
            stats.generation.to_string(),
            stats.best_index.to_string(),
            stats.best_score.to_string(),
            stats.record_score.to_string(),
            format!("{:.2}", stats.best_fitness),
            format!("{:.2}", stats.mean_fitness),
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}
