use crate::core::scanner::{
    annotate_lines, classify_line, find_body_open, find_closing, is_code_at, scan_signature,
    section_marker, LineKind,
};
use crate::domain::model::{SectionExtraction, SectionMap, GENERAL_SECTION};
use crate::utils::error::{PartitionError, Result};
use regex::Regex;

/// Locates `interface <name> { ... }` and returns the text between its braces.
pub fn locate_interface_body<'a>(source: &'a str, name: &str) -> Result<&'a str> {
    let pattern = format!(
        r"(?m)^[ \t]*(?:export\s+)?(?:declare\s+)?interface\s+{}\b",
        regex::escape(name)
    );
    let re = Regex::new(&pattern).map_err(|e| PartitionError::ConfigValidationError {
        field: "interface.name".to_string(),
        message: e.to_string(),
    })?;

    let open = re
        .find_iter(source)
        .filter(|m| is_code_at(source, m.start()))
        .find_map(|m| find_body_open(source, m.end()))
        .ok_or_else(|| PartitionError::InterfaceNotFound {
            name: name.to_string(),
        })?;
    let close = find_closing(source, open).ok_or_else(|| PartitionError::UnbalancedBody {
        construct: format!("interface {}", name),
    })?;

    Ok(&source[open + 1..close])
}

/// Groups interface methods under the most recent `//` marker.
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    default_title: String,
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self {
            default_title: GENERAL_SECTION.to_string(),
        }
    }
}

impl SectionExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extract_from_source(
        &self,
        source: &str,
        interface_name: &str,
    ) -> Result<SectionExtraction> {
        let body = locate_interface_body(source, interface_name)?;
        Ok(self.extract(body))
    }

    /// `body` is the interface text between its outer braces. Never fails.
    pub fn extract(&self, body: &str) -> SectionExtraction {
        let mut extraction = SectionExtraction::default();
        let mut current = self.default_title.clone();

        for (start, raw) in annotate_lines(body) {
            // 巢狀型別成員與多行簽章的後續行
            if !start.is_member() {
                continue;
            }

            if let Some(title) = section_marker(raw) {
                current = title.to_string();
                extraction.sections.entry(&current);
                continue;
            }

            if let Some(signature) = scan_signature(raw) {
                place(&mut extraction, &current, signature.name);
                continue;
            }

            if classify_line(raw) == LineKind::Code {
                tracing::trace!("Skipped interface line: {}", raw.trim());
                extraction.skipped_lines += 1;
            }
        }

        tracing::debug!(
            "Extracted {} sections ({} skipped lines, {} relocated names)",
            extraction.sections.len(),
            extraction.skipped_lines,
            extraction.relocated
        );
        extraction
    }
}

fn place(extraction: &mut SectionExtraction, current: &str, name: String) {
    if let Some(owner) = owner_elsewhere(&extraction.sections, current, &name) {
        tracing::debug!(
            "`{}` repeated under [{}], keeping it in [{}]",
            name,
            current,
            owner
        );
        extraction.relocated += 1;
        return;
    }
    extraction.sections.entry(current).methods.push(name);
}

fn owner_elsewhere(sections: &SectionMap, current: &str, name: &str) -> Option<String> {
    sections
        .section_of(name)
        .filter(|owner| *owner != current)
        .map(str::to_string)
}
