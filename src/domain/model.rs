use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// 第一個區段標記出現前的方法歸屬
pub const GENERAL_SECTION: &str = "General";

/// 建構子永遠不算領域方法
pub const CONSTRUCTOR: &str = "constructor";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSignature {
    pub name: String,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    /// 宣告順序，同區段內的重複名稱（overload）會保留
    pub methods: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            methods: Vec::new(),
        }
    }

    /// Distinct method names in first-declaration order, constructor excluded.
    pub fn distinct_methods(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.methods
            .iter()
            .map(String::as_str)
            .filter(|name| *name != CONSTRUCTOR && seen.insert(*name))
            .collect()
    }
}

/// Sections in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionMap {
    sections: Vec<Section>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得區段，不存在時依出現順序新增
    pub fn entry(&mut self, title: &str) -> &mut Section {
        let index = match self.sections.iter().position(|s| s.title == title) {
            Some(index) => index,
            None => {
                self.sections.push(Section::new(title));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    pub fn get(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section_of(&self, method: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.methods.iter().any(|m| m == method))
            .map(|s| s.title.as_str())
    }

    pub fn all_methods(&self) -> Vec<&str> {
        self.sections
            .iter()
            .flat_map(|s| s.distinct_methods())
            .collect()
    }
}

impl<'a> IntoIterator for &'a SectionMap {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionExtraction {
    pub sections: SectionMap,
    /// 非空白、非註解、非括號，卻無法辨識的行數
    pub skipped_lines: usize,
    /// 已在前面區段出現過而未重新歸屬的名稱數
    pub relocated: usize,
}

/// Method names one implementation class declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    pub implementation: String,
    pub class: String,
    pub methods: BTreeSet<String>,
    pub found: bool,
}

impl Vocabulary {
    pub fn new(implementation: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            implementation: implementation.into(),
            class: class.into(),
            methods: BTreeSet::new(),
            found: true,
        }
    }

    pub fn unresolved(implementation: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            found: false,
            ..Self::new(implementation, class)
        }
    }

    pub fn contains(&self, method: &str) -> bool {
        self.methods.contains(method)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImplementationGap {
    pub implementation: String,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodPresence {
    pub name: String,
    /// 與 CoverageReport::implementations 同順序
    pub present: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageEntry {
    pub section: String,
    pub total_methods: usize,
    pub missing_by_implementation: Vec<ImplementationGap>,
    pub methods: Vec<MethodPresence>,
}

impl CoverageEntry {
    pub fn missing_for(&self, implementation: &str) -> Option<&[String]> {
        self.missing_by_implementation
            .iter()
            .find(|gap| gap.implementation == implementation)
            .map(|gap| gap.missing.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImplementationStatus {
    pub label: String,
    pub class: String,
    pub found: bool,
    pub declared_methods: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub implementations: Vec<ImplementationStatus>,
    pub entries: Vec<CoverageEntry>,
}

impl CoverageReport {
    pub fn entry(&self, section: &str) -> Option<&CoverageEntry> {
        self.entries.iter().find(|e| e.section == section)
    }

    pub fn total_gaps(&self) -> usize {
        self.entries
            .iter()
            .flat_map(|e| e.missing_by_implementation.iter())
            .map(|gap| gap.missing.len())
            .sum()
    }
}

/// One row of the hand-maintained domain table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMapping {
    pub section: String,
    pub type_name: String,
    pub property: String,
}

impl DomainMapping {
    pub fn new(
        section: impl Into<String>,
        type_name: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            type_name: type_name.into(),
            property: property.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedContract {
    pub type_name: String,
    pub property: String,
    pub section: String,
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateFacade {
    pub type_name: String,
    pub factory_name: String,
    pub contracts: Vec<GeneratedContract>,
}

impl AggregateFacade {
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.contracts
            .iter()
            .map(|c| (c.property.as_str(), c.type_name.as_str()))
    }

    pub fn contract(&self, property: &str) -> Option<&GeneratedContract> {
        self.contracts.iter().find(|c| c.property == property)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub facade: AggregateFacade,
    /// 有方法但沒有對應設定的區段
    pub unconfigured: Vec<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    pub interface_name: String,
    pub import_path: String,
    pub aggregate_name: String,
    pub factory_name: String,
    pub view_param: String,
    pub checked_factory: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            interface_name: "IStorage".to_string(),
            import_path: "../storage".to_string(),
            aggregate_name: "StorageRepositories".to_string(),
            factory_name: "createStorageRepositories".to_string(),
            view_param: "storage".to_string(),
            checked_factory: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationSpec {
    pub label: String,
    pub path: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTargets {
    pub report_path: String,
    pub contracts_path: String,
    pub json_report_path: Option<String>,
    pub matrix_csv_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImplementationSource {
    pub spec: ImplementationSpec,
    pub text: String,
}

/// Raw input texts, produced by the extract phase.
#[derive(Debug, Clone)]
pub struct SourceSet {
    pub interface: String,
    pub implementations: Vec<ImplementationSource>,
}

/// Everything the load phase writes.
#[derive(Debug, Clone)]
pub struct PartitionResult {
    pub extraction: SectionExtraction,
    pub vocabularies: Vec<Vocabulary>,
    pub coverage: CoverageReport,
    pub artifact: GeneratedArtifact,
}
