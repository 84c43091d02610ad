use crate::domain::model::{
    DomainMapping, GeneratorOptions, ImplementationSpec, OutputTargets, PartitionResult, SourceSet,
};
use crate::utils::error::Result;

pub trait Storage {
    fn read_to_string(&self, path: &str) -> Result<String>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn interface_path(&self) -> &str;
    fn interface_name(&self) -> &str;
    fn implementations(&self) -> &[ImplementationSpec];
    fn domains(&self) -> &[DomainMapping];
    fn outputs(&self) -> &OutputTargets;
    fn generator_options(&self) -> GeneratorOptions;
}

pub trait Pipeline {
    fn extract(&self) -> Result<SourceSet>;
    fn transform(&self, sources: SourceSet) -> Result<PartitionResult>;
    fn load(&self, result: &PartitionResult) -> Result<Vec<String>>;
}
