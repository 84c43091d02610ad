use crate::core::contracts::ContractGenerator;
use crate::core::coverage::CoverageAnalyzer;
use crate::core::sections::SectionExtractor;
use crate::core::vocabulary::MethodSetExtractor;
use crate::core::{ConfigProvider, PartitionResult, Pipeline, SourceSet, Storage};
use crate::domain::model::ImplementationSource;
use crate::utils::error::Result;

pub struct PartitionPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> PartitionPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for PartitionPipeline<S, C> {
    fn extract(&self) -> Result<SourceSet> {
        let interface_path = self.config.interface_path();
        let interface = self.storage.read_to_string(interface_path)?;

        let mut implementations = Vec::new();
        for spec in self.config.implementations() {
            // 實作與介面同檔時不重複讀取
            let text = if spec.path == interface_path {
                interface.clone()
            } else {
                self.storage.read_to_string(&spec.path)?
            };
            implementations.push(ImplementationSource {
                spec: spec.clone(),
                text,
            });
        }

        Ok(SourceSet {
            interface,
            implementations,
        })
    }

    fn transform(&self, sources: SourceSet) -> Result<PartitionResult> {
        let extraction = SectionExtractor::new()
            .extract_from_source(&sources.interface, self.config.interface_name())?;
        if extraction.skipped_lines > 0 {
            tracing::debug!(
                "{} interface lines matched neither a marker nor a signature",
                extraction.skipped_lines
            );
        }

        let extractor = MethodSetExtractor::new();
        let vocabularies = sources
            .implementations
            .iter()
            .map(|source| extractor.extract(&source.text, &source.spec))
            .collect::<Result<Vec<_>>>()?;

        let coverage = CoverageAnalyzer::analyze(&extraction.sections, &vocabularies);
        let artifact = ContractGenerator::new(self.config.generator_options())
            .generate(&extraction.sections, self.config.domains());

        Ok(PartitionResult {
            extraction,
            vocabularies,
            coverage,
            artifact,
        })
    }

    fn load(&self, result: &PartitionResult) -> Result<Vec<String>> {
        let outputs = self.config.outputs();
        let mut written = Vec::new();

        self.storage
            .write_file(&outputs.report_path, result.coverage.render_text().as_bytes())?;
        written.push(outputs.report_path.clone());

        self.storage
            .write_file(&outputs.contracts_path, result.artifact.text.as_bytes())?;
        written.push(outputs.contracts_path.clone());

        if let Some(path) = &outputs.json_report_path {
            let json = result.coverage.render_json(&result.extraction)?;
            self.storage.write_file(path, json.as_bytes())?;
            written.push(path.clone());
        }

        if let Some(path) = &outputs.matrix_csv_path {
            let csv = result.coverage.render_matrix_csv()?;
            self.storage.write_file(path, csv.as_bytes())?;
            written.push(path.clone());
        }

        Ok(written)
    }
}
