use crate::core::scanner::{
    annotate_lines, classify_line, find_body_open, find_closing, is_code_at, LineKind,
};
use crate::domain::model::{ImplementationSpec, Vocabulary, CONSTRUCTOR};
use crate::utils::error::{PartitionError, Result};
use regex::Regex;
use std::sync::LazyLock;

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:public|private|protected|static|override|abstract)\s+)*(async\s+)?([A-Za-z0-9_]+)\s*(?:<[^(]*>)?\s*\(",
    )
    .expect("declaration pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationShape {
    Synchronous,
    Asynchronous,
}

/// Name and shape of a method declared on `line`; both shapes yield the same name.
pub fn scan_declaration(line: &str) -> Option<(String, DeclarationShape)> {
    if classify_line(line) != LineKind::Code {
        return None;
    }
    let caps = DECLARATION.captures(line.trim())?;
    let name = &caps[2];
    if name == CONSTRUCTOR {
        return None;
    }

    let shape = if caps.get(1).is_some() {
        DeclarationShape::Asynchronous
    } else {
        DeclarationShape::Synchronous
    };
    Some((name.to_string(), shape))
}

/// Collects the methods one class declares directly in its body.
#[derive(Debug, Clone, Default)]
pub struct MethodSetExtractor;

impl MethodSetExtractor {
    pub fn new() -> Self {
        Self
    }

    /// An absent class yields an unresolved, empty vocabulary rather than an error.
    pub fn extract(&self, source: &str, spec: &ImplementationSpec) -> Result<Vocabulary> {
        let Some(body) = locate_class_body(source, &spec.class)? else {
            tracing::warn!(
                "Class `{}` ({}) not found in {}",
                spec.class,
                spec.label,
                spec.path
            );
            return Ok(Vocabulary::unresolved(&spec.label, &spec.class));
        };

        let mut vocabulary = Vocabulary::new(&spec.label, &spec.class);
        let mut asynchronous = 0usize;

        for (start, raw) in annotate_lines(body) {
            // 只看類別本身的成員，巢狀結構內的宣告不算
            if !start.is_member() {
                continue;
            }
            if let Some((name, shape)) = scan_declaration(raw) {
                if shape == DeclarationShape::Asynchronous {
                    asynchronous += 1;
                }
                vocabulary.methods.insert(name);
            }
        }

        tracing::debug!(
            "{} ({}): {} methods, {} async",
            spec.class,
            spec.label,
            vocabulary.methods.len(),
            asynchronous
        );
        Ok(vocabulary)
    }
}

/// `Ok(None)` when the class is absent; an error when it is present without a usable body.
pub fn locate_class_body<'a>(source: &'a str, class: &str) -> Result<Option<&'a str>> {
    let pattern = format!(r"\bclass\s+{}\b", regex::escape(class));
    let re = Regex::new(&pattern).map_err(|e| PartitionError::ConfigValidationError {
        field: "implementations.class".to_string(),
        message: e.to_string(),
    })?;

    // 註解或字串裡提到的 `class X` 不算
    let Some(found) = re.find_iter(source).find(|m| is_code_at(source, m.start())) else {
        return Ok(None);
    };

    let open = find_body_open(source, found.end()).ok_or_else(|| {
        PartitionError::ImplementationBodyNotFound {
            class: class.to_string(),
        }
    })?;
    let close = find_closing(source, open).ok_or_else(|| PartitionError::UnbalancedBody {
        construct: format!("class {}", class),
    })?;

    Ok(Some(&source[open + 1..close]))
}
