use crate::domain::model::{
    AggregateFacade, DomainMapping, GeneratedArtifact, GeneratedContract, GeneratorOptions,
    SectionMap,
};

/// Emits narrowed `Pick<...>` contracts, the aggregate interface and its factory.
///
/// Output depends only on the section order and the order of `domains`, so identical input
/// produces identical bytes.
#[derive(Debug, Clone, Default)]
pub struct ContractGenerator {
    options: GeneratorOptions,
}

impl ContractGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn contracts(
        &self,
        sections: &SectionMap,
        domains: &[DomainMapping],
    ) -> Vec<GeneratedContract> {
        domains
            .iter()
            .filter_map(|domain| {
                let methods: Vec<String> = sections
                    .get(&domain.section)?
                    .distinct_methods()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                if methods.is_empty() {
                    tracing::debug!("Domain `{}` has no methods, skipping", domain.section);
                    return None;
                }
                Some(GeneratedContract {
                    type_name: domain.type_name.clone(),
                    property: domain.property.clone(),
                    section: domain.section.clone(),
                    methods,
                })
            })
            .collect()
    }

    pub fn generate(&self, sections: &SectionMap, domains: &[DomainMapping]) -> GeneratedArtifact {
        let contracts = self.contracts(sections, domains);

        let unconfigured: Vec<String> = sections
            .iter()
            .filter(|s| !s.distinct_methods().is_empty())
            .filter(|s| !domains.iter().any(|d| d.section == s.title))
            .map(|s| s.title.clone())
            .collect();
        for title in &unconfigured {
            tracing::info!("Section [{}] has no domain mapping; left out of contracts", title);
        }

        let facade = AggregateFacade {
            type_name: self.options.aggregate_name.clone(),
            factory_name: self.options.factory_name.clone(),
            contracts,
        };
        let text = self.render(&facade);

        GeneratedArtifact {
            facade,
            unconfigured,
            text,
        }
    }

    fn render(&self, facade: &AggregateFacade) -> String {
        let opts = &self.options;
        let mut lines = vec![
            format!(
                "import type {{ {} }} from '{}';",
                opts.interface_name, opts.import_path
            ),
            String::new(),
        ];

        for contract in &facade.contracts {
            let keys: Vec<String> = contract.methods.iter().map(|m| format!("'{}'", m)).collect();
            lines.push(format!(
                "export type {} = Pick<{},\n  {}\n>;\n",
                contract.type_name,
                opts.interface_name,
                keys.join(" |\n  ")
            ));
        }

        lines.push(format!("export interface {} {{", facade.type_name));
        for (property, type_name) in facade.properties() {
            lines.push(format!("  {}: {};", property, type_name));
        }
        lines.push("}\n".to_string());

        if opts.checked_factory {
            self.render_checked_factory(facade, &mut lines);
        } else {
            self.render_factory(facade, &mut lines);
        }

        lines.join("\n")
    }

    fn render_factory(&self, facade: &AggregateFacade, lines: &mut Vec<String>) {
        let opts = &self.options;
        lines.push("/**".to_string());
        lines.push(format!(
            " * Every property aliases the same `{}` instance. The narrowing casts are not checked at runtime.",
            opts.view_param
        ));
        lines.push(" */".to_string());
        lines.push(format!(
            "export const {} = ({}: {}): {} => ({{",
            facade.factory_name, opts.view_param, opts.interface_name, facade.type_name
        ));
        for (property, type_name) in facade.properties() {
            lines.push(format!("  {}: {} as {},", property, opts.view_param, type_name));
        }
        lines.push("});\n".to_string());
    }

    fn render_checked_factory(&self, facade: &AggregateFacade, lines: &mut Vec<String>) {
        let opts = &self.options;
        let param = &opts.view_param;

        lines.push(format!(
            "export const REQUIRED_METHODS: Record<keyof {}, readonly (keyof {})[]> = {{",
            facade.type_name, opts.interface_name
        ));
        for contract in &facade.contracts {
            let keys: Vec<String> = contract.methods.iter().map(|m| format!("'{}'", m)).collect();
            lines.push(format!("  {}: [{}],", contract.property, keys.join(", ")));
        }
        lines.push("};\n".to_string());

        lines.push("/**".to_string());
        lines.push(format!(
            " * Every property aliases the same `{}` instance. Throws if any contract method is missing.",
            param
        ));
        lines.push(" */".to_string());
        lines.push(format!(
            "export const {} = ({}: {}): {} => {{",
            facade.factory_name, param, opts.interface_name, facade.type_name
        ));
        lines.push("  for (const [property, methods] of Object.entries(REQUIRED_METHODS)) {".to_string());
        lines.push(format!(
            "    const missing = methods.filter((name) => typeof {}[name] !== 'function');",
            param
        ));
        lines.push("    if (missing.length > 0) {".to_string());
        lines.push(
            "      throw new Error(`${property}: missing ${missing.join(', ')}`);".to_string(),
        );
        lines.push("    }".to_string());
        lines.push("  }".to_string());
        lines.push("  return {".to_string());
        for (property, type_name) in facade.properties() {
            lines.push(format!("    {}: {} as {},", property, param, type_name));
        }
        lines.push("  };".to_string());
        lines.push("};\n".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> SectionMap {
        let mut map = SectionMap::new();
        map.entry("Users").methods.push("getUser".to_string());
        map.entry("Users").methods.push("createUser".to_string());
        map.entry("Invoices").methods.push("getInvoice".to_string());
        map.entry("Empty");
        map
    }

    fn domains() -> Vec<DomainMapping> {
        vec![
            DomainMapping::new("Users", "UserRepository", "users"),
            DomainMapping::new("Empty", "EmptyRepository", "empty"),
            DomainMapping::new("Ghost", "GhostRepository", "ghost"),
        ]
    }

    #[test]
    fn test_generate_unchecked_contracts() {
        let artifact = ContractGenerator::default().generate(&sections(), &domains());

        let expected = [
            "import type { IStorage } from '../storage';",
            "",
            "export type UserRepository = Pick<IStorage,",
            "  'getUser' |",
            "  'createUser'",
            ">;",
            "",
            "export interface StorageRepositories {",
            "  users: UserRepository;",
            "}",
            "",
            "/**",
            " * Every property aliases the same `storage` instance. The narrowing casts are not checked at runtime.",
            " */",
            "export const createStorageRepositories = (storage: IStorage): StorageRepositories => ({",
            "  users: storage as UserRepository,",
            "});",
            "",
        ]
        .join("\n");
        assert_eq!(artifact.text, expected);
        assert_eq!(artifact.unconfigured, vec!["Invoices".to_string()]);
    }

    #[test]
    fn test_empty_and_unknown_domains_are_skipped() {
        let contracts = ContractGenerator::default().contracts(&sections(), &domains());
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].property, "users");
        assert_eq!(contracts[0].methods, vec!["getUser", "createUser"]);
    }

    #[test]
    fn test_checked_factory_verifies_methods() {
        let options = GeneratorOptions {
            checked_factory: true,
            ..GeneratorOptions::default()
        };
        let artifact = ContractGenerator::new(options).generate(&sections(), &domains());

        assert!(artifact.text.contains(
            "export const REQUIRED_METHODS: Record<keyof StorageRepositories, readonly (keyof IStorage)[]> = {"
        ));
        assert!(artifact.text.contains("  users: ['getUser', 'createUser'],"));
        assert!(artifact.text.contains("typeof storage[name] !== 'function'"));
        assert!(artifact.text.contains("    users: storage as UserRepository,"));
        assert!(artifact.text.ends_with("};\n"));
    }

    #[test]
    fn test_custom_names() {
        let options = GeneratorOptions {
            interface_name: "IBackend".to_string(),
            import_path: "./backend".to_string(),
            aggregate_name: "Backends".to_string(),
            factory_name: "splitBackend".to_string(),
            view_param: "backend".to_string(),
            checked_factory: false,
        };
        let artifact = ContractGenerator::new(options).generate(&sections(), &domains());
        assert!(artifact.text.starts_with("import type { IBackend } from './backend';\n"));
        assert!(artifact
            .text
            .contains("export const splitBackend = (backend: IBackend): Backends => ({"));
        assert_eq!(artifact.facade.type_name, "Backends");
    }

    #[test]
    fn test_output_is_deterministic() {
        let generator = ContractGenerator::default();
        let first = generator.generate(&sections(), &domains());
        let second = generator.generate(&sections(), &domains());
        assert_eq!(first.text, second.text);
    }
}
