use crate::core::{PartitionResult, Pipeline};
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<String>,
    pub sections: usize,
    pub contracts: usize,
    pub coverage_gaps: usize,
}

pub struct PartitionEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> PartitionEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Extract + transform only. Nothing is written.
    pub fn analyze(&self) -> Result<PartitionResult> {
        tracing::info!("Reading sources...");
        let sources = self.pipeline.extract()?;
        tracing::info!(
            "Read interface and {} implementation sources",
            sources.implementations.len()
        );

        tracing::info!("Analyzing...");
        let result = self.pipeline.transform(sources)?;
        tracing::info!(
            "Found {} sections, {} contracts, {} coverage gaps",
            result.extraction.sections.len(),
            result.artifact.facade.contracts.len(),
            result.coverage.total_gaps()
        );
        for status in result.coverage.implementations.iter().filter(|s| !s.found) {
            tracing::warn!(
                "Implementation `{}` (class {}) was not found; every method is reported missing",
                status.label,
                status.class
            );
        }

        Ok(result)
    }

    pub fn run(&self) -> Result<RunSummary> {
        let result = self.analyze()?;

        tracing::info!("Writing artifacts...");
        let written = self.pipeline.load(&result)?;
        for path in &written {
            tracing::info!("Wrote {}", path);
        }

        Ok(RunSummary {
            written,
            sections: result.extraction.sections.len(),
            contracts: result.artifact.facade.contracts.len(),
            coverage_gaps: result.coverage.total_gaps(),
        })
    }
}
