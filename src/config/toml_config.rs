use crate::domain::model::{DomainMapping, GeneratorOptions, ImplementationSpec, OutputTargets};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{PartitionError, Result};
use crate::utils::validation::{
    validate_identifier, validate_path, validate_required_value, validate_unique, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub project: ProjectConfig,
    pub interface: InterfaceConfig,
    #[serde(default)]
    pub implementations: Vec<ImplementationSpec>,
    pub output: OutputTargets,
    pub generator: Option<GeneratorConfig>,
    #[serde(default)]
    pub domains: Vec<DomainMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub root: Option<String>, // 所有相對路徑的基準目錄
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub path: String,
    #[serde(default = "default_interface_name")]
    pub name: String,
    #[serde(default = "default_import_path")]
    pub import_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub aggregate_name: Option<String>,
    pub factory_name: Option<String>,
    pub view_param: Option<String>,
    pub checked_factory: Option<bool>,
}

fn default_interface_name() -> String {
    GeneratorOptions::default().interface_name
}

fn default_import_path() -> String {
    GeneratorOptions::default().import_path
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PartitionError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| PartitionError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STORAGE_ROOT})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_required_value("project.name", &self.project.name)?;
        if let Some(root) = &self.project.root {
            validate_path("project.root", root)?;
        }

        validate_path("interface.path", &self.interface.path)?;
        validate_identifier("interface.name", &self.interface.name)?;
        validate_required_value("interface.import_path", &self.interface.import_path)?;

        for implementation in &self.implementations {
            validate_identifier("implementations.label", &implementation.label)?;
            validate_path("implementations.path", &implementation.path)?;
            validate_identifier("implementations.class", &implementation.class)?;
        }
        validate_unique(
            "implementations.label",
            self.implementations.iter().map(|i| i.label.as_str()),
        )?;

        validate_path("output.report_path", &self.output.report_path)?;
        validate_path("output.contracts_path", &self.output.contracts_path)?;
        if let Some(path) = &self.output.json_report_path {
            validate_path("output.json_report_path", path)?;
        }
        if let Some(path) = &self.output.matrix_csv_path {
            validate_path("output.matrix_csv_path", path)?;
        }

        let options = self.generator_options();
        validate_identifier("generator.aggregate_name", &options.aggregate_name)?;
        validate_identifier("generator.factory_name", &options.factory_name)?;
        validate_identifier("generator.view_param", &options.view_param)?;

        for domain in &self.domains {
            validate_required_value("domains.section", &domain.section)?;
            validate_identifier("domains.type_name", &domain.type_name)?;
            validate_identifier("domains.property", &domain.property)?;
        }
        validate_unique(
            "domains.property",
            self.domains.iter().map(|d| d.property.as_str()),
        )?;
        validate_unique(
            "domains.type_name",
            self.domains.iter().map(|d| d.type_name.as_str()),
        )?;

        Ok(())
    }

    /// 取得基準目錄
    pub fn root(&self) -> &str {
        self.project.root.as_deref().unwrap_or(".")
    }

    /// 命令列覆蓋 checked_factory
    pub fn set_checked_factory(&mut self, checked: bool) {
        self.generator.get_or_insert_with(GeneratorConfig::default).checked_factory = Some(checked);
    }
}

impl ConfigProvider for TomlConfig {
    fn interface_path(&self) -> &str {
        &self.interface.path
    }

    fn interface_name(&self) -> &str {
        &self.interface.name
    }

    fn implementations(&self) -> &[ImplementationSpec] {
        &self.implementations
    }

    fn domains(&self) -> &[DomainMapping] {
        &self.domains
    }

    fn outputs(&self) -> &OutputTargets {
        &self.output
    }

    fn generator_options(&self) -> GeneratorOptions {
        let defaults = GeneratorOptions::default();
        let generator = self.generator.clone().unwrap_or_default();
        GeneratorOptions {
            interface_name: self.interface.name.clone(),
            import_path: self.interface.import_path.clone(),
            aggregate_name: generator.aggregate_name.unwrap_or(defaults.aggregate_name),
            factory_name: generator.factory_name.unwrap_or(defaults.factory_name),
            view_param: generator.view_param.unwrap_or(defaults.view_param),
            checked_factory: generator.checked_factory.unwrap_or(defaults.checked_factory),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
