use crate::domain::model::{
    CoverageEntry, CoverageReport, ImplementationGap, ImplementationStatus, MethodPresence,
    SectionExtraction, SectionMap, Vocabulary,
};
use crate::utils::error::{PartitionError, Result};
use serde::Serialize;

pub struct CoverageAnalyzer;

impl CoverageAnalyzer {
    /// Joins sections against vocabularies. Gaps are reported, never raised.
    pub fn analyze(sections: &SectionMap, vocabularies: &[Vocabulary]) -> CoverageReport {
        let implementations = vocabularies
            .iter()
            .map(|v| ImplementationStatus {
                label: v.implementation.clone(),
                class: v.class.clone(),
                found: v.found,
                declared_methods: v.methods.len(),
            })
            .collect();

        let entries = sections
            .iter()
            .map(|section| {
                let methods = section.distinct_methods();

                let missing_by_implementation = vocabularies
                    .iter()
                    .map(|v| ImplementationGap {
                        implementation: v.implementation.clone(),
                        missing: methods
                            .iter()
                            .filter(|name| !v.contains(name))
                            .map(|name| name.to_string())
                            .collect(),
                    })
                    .collect();

                let presence = methods
                    .iter()
                    .map(|name| MethodPresence {
                        name: name.to_string(),
                        present: vocabularies.iter().map(|v| v.contains(name)).collect(),
                    })
                    .collect();

                CoverageEntry {
                    section: section.title.clone(),
                    total_methods: methods.len(),
                    missing_by_implementation,
                    methods: presence,
                }
            })
            .collect();

        CoverageReport {
            implementations,
            entries,
        }
    }
}

/// `mem` → `inMem`
fn presence_flag(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => format!("in{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "in".to_string(),
    }
}

impl CoverageReport {
    /// Plain-text report: summary lines per section, then a per-method breakdown.
    pub fn render_text(&self) -> String {
        let mut lines = vec!["SECTION_SUMMARY".to_string()];

        for entry in &self.entries {
            let mut summary = format!("[{}] total={}", entry.section, entry.total_methods);
            for gap in &entry.missing_by_implementation {
                summary.push_str(&format!(" missing_{}={}", gap.implementation, gap.missing.len()));
            }
            lines.push(summary);

            // 只有真的缺方法時才輸出清單
            for gap in &entry.missing_by_implementation {
                if !gap.missing.is_empty() {
                    lines.push(format!(
                        "  missing_{}_list={}",
                        gap.implementation,
                        gap.missing.join(", ")
                    ));
                }
            }
        }

        lines.push("\nDETAILED_METHODS".to_string());
        let flags: Vec<String> = self
            .implementations
            .iter()
            .map(|i| presence_flag(&i.label))
            .collect();

        for entry in self.entries.iter().filter(|e| !e.methods.is_empty()) {
            lines.push(format!("## {}", entry.section));
            for method in &entry.methods {
                let cells: Vec<String> = flags
                    .iter()
                    .zip(&method.present)
                    .map(|(flag, present)| format!("{}={}", flag, if *present { 'Y' } else { 'N' }))
                    .collect();
                if cells.is_empty() {
                    lines.push(format!("- {}", method.name));
                } else {
                    lines.push(format!("- {}: {}", method.name, cells.join(", ")));
                }
            }
        }

        lines.join("\n")
    }

    pub fn render_json(&self, extraction: &SectionExtraction) -> Result<String> {
        #[derive(Serialize)]
        struct JsonReport<'a> {
            implementations: &'a [ImplementationStatus],
            sections: &'a [CoverageEntry],
            skipped_lines: usize,
            relocated: usize,
            total_gaps: usize,
        }

        let report = JsonReport {
            implementations: &self.implementations,
            sections: &self.entries,
            skipped_lines: extraction.skipped_lines,
            relocated: extraction.relocated,
            total_gaps: self.total_gaps(),
        };
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        Ok(json)
    }

    /// One row per method, one `Y`/`N` column per implementation.
    pub fn render_matrix_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["section".to_string(), "method".to_string()];
        header.extend(self.implementations.iter().map(|i| i.label.clone()));
        writer.write_record(&header)?;

        for entry in &self.entries {
            for method in &entry.methods {
                let mut row = vec![entry.section.clone(), method.name.clone()];
                row.extend(
                    method
                        .present
                        .iter()
                        .map(|present| if *present { "Y" } else { "N" }.to_string()),
                );
                writer.write_record(&row)?;
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| PartitionError::ProcessingError {
                message: format!("Failed to flush coverage matrix: {}", e),
            })?;
        String::from_utf8(bytes).map_err(|e| PartitionError::ProcessingError {
            message: format!("Coverage matrix is not UTF-8: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> SectionMap {
        let mut map = SectionMap::new();
        for name in ["a", "b", "c"] {
            map.entry("Letters").methods.push(name.to_string());
        }
        map.entry("Empty");
        map
    }

    fn vocabulary(label: &str, names: &[&str]) -> Vocabulary {
        let mut v = Vocabulary::new(label, "Impl");
        v.methods.extend(names.iter().map(|n| n.to_string()));
        v
    }

    #[test]
    fn test_missing_preserves_section_order() {
        let report = CoverageAnalyzer::analyze(&sections(), &[vocabulary("impl", &["c", "a"])]);
        let entry = report.entry("Letters").unwrap();
        assert_eq!(entry.total_methods, 3);
        assert_eq!(entry.missing_for("impl").unwrap().to_vec(), vec!["b"]);
    }

    #[test]
    fn test_render_text_layout() {
        let report = CoverageAnalyzer::analyze(
            &sections(),
            &[vocabulary("mem", &["a", "b", "c"]), vocabulary("db", &["a"])],
        );
        let expected = [
            "SECTION_SUMMARY",
            "[Letters] total=3 missing_mem=0 missing_db=2",
            "  missing_db_list=b, c",
            "[Empty] total=0 missing_mem=0 missing_db=0",
            "",
            "DETAILED_METHODS",
            "## Letters",
            "- a: inMem=Y, inDb=Y",
            "- b: inMem=Y, inDb=N",
            "- c: inMem=Y, inDb=N",
        ]
        .join("\n");
        assert_eq!(report.render_text(), expected);
        assert_eq!(report.total_gaps(), 2);
    }

    #[test]
    fn test_render_text_without_implementations() {
        let report = CoverageAnalyzer::analyze(&sections(), &[]);
        let expected = [
            "SECTION_SUMMARY",
            "[Letters] total=3",
            "[Empty] total=0",
            "",
            "DETAILED_METHODS",
            "## Letters",
            "- a",
            "- b",
            "- c",
        ]
        .join("\n");
        assert_eq!(report.render_text(), expected);
        assert_eq!(report.total_gaps(), 0);
    }

    #[test]
    fn test_duplicate_and_constructor_names_are_not_counted() {
        let mut map = SectionMap::new();
        for name in ["a", "a", "constructor"] {
            map.entry("S").methods.push(name.to_string());
        }
        let report = CoverageAnalyzer::analyze(&map, &[vocabulary("x", &[])]);
        assert_eq!(report.entry("S").unwrap().total_methods, 1);
        assert_eq!(report.entry("S").unwrap().missing_for("x").unwrap().to_vec(), vec!["a"]);
    }

    #[test]
    fn test_render_matrix_csv() {
        let report = CoverageAnalyzer::analyze(
            &sections(),
            &[vocabulary("mem", &["a"]), vocabulary("db", &["b"])],
        );
        let csv = report.render_matrix_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "section,method,mem,db");
        assert_eq!(lines[1], "Letters,a,Y,N");
        assert_eq!(lines[2], "Letters,b,N,Y");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_render_json_includes_diagnostics() {
        let extraction = SectionExtraction {
            sections: sections(),
            skipped_lines: 2,
            relocated: 0,
        };
        let report = CoverageAnalyzer::analyze(&extraction.sections, &[vocabulary("mem", &[])]);
        let json: serde_json::Value =
            serde_json::from_str(&report.render_json(&extraction).unwrap()).unwrap();
        assert_eq!(json["skipped_lines"], 2);
        assert_eq!(json["total_gaps"], 3);
        assert_eq!(json["sections"][0]["section"], "Letters");
    }

    #[test]
    fn test_presence_flag() {
        assert_eq!(presence_flag("mem"), "inMem");
        assert_eq!(presence_flag("db"), "inDb");
    }
}
