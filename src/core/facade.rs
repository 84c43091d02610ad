//! Capability views over one shared backing value.
//!
//! A [`RepositoryFacade`] hands out one [`DomainView`] per generated contract. Every view holds
//! a clone of the same `Arc`, so state changed through one view is visible through all the
//! others and through the original handle. A view only lends out the backing value through
//! [`DomainView::for_method`], which refuses methods outside its contract.
//! [`RepositoryFacade::assemble`] checks that the backing value provides every contract method
//! before any view exists.
//! [`RepositoryFacade::assemble_unchecked`] skips that check, like the generated
//! TypeScript factory does by default.

use crate::domain::model::{AggregateFacade, GeneratedContract, Vocabulary};
use crate::utils::error::{PartitionError, Result};
use std::collections::BTreeSet;
use std::sync::Arc;

pub trait CapabilitySet {
    fn provides(&self, method: &str) -> bool;
}

impl CapabilitySet for Vocabulary {
    fn provides(&self, method: &str) -> bool {
        self.contains(method)
    }
}

impl CapabilitySet for BTreeSet<String> {
    fn provides(&self, method: &str) -> bool {
        self.contains(method)
    }
}

impl<T: CapabilitySet + ?Sized> CapabilitySet for Arc<T> {
    fn provides(&self, method: &str) -> bool {
        (**self).provides(method)
    }
}

#[derive(Debug)]
pub struct DomainView<T: ?Sized> {
    contract: GeneratedContract,
    backing: Arc<T>,
}

impl<T: ?Sized> DomainView<T> {
    pub fn property(&self) -> &str {
        &self.contract.property
    }

    pub fn contract(&self) -> &GeneratedContract {
        &self.contract
    }

    /// Whether `method` belongs to this view's contract.
    pub fn permits(&self, method: &str) -> bool {
        self.contract.methods.iter().any(|m| m == method)
    }

    /// The backing value, lent for a call to `method`. Methods outside the contract are refused.
    pub fn for_method(&self, method: &str) -> Result<&T> {
        if !self.permits(method) {
            return Err(PartitionError::MethodOutsideContract {
                property: self.contract.property.clone(),
                method: method.to_string(),
            });
        }
        Ok(&self.backing)
    }

    pub fn shares_backing_with(&self, other: &DomainView<T>) -> bool {
        Arc::ptr_eq(&self.backing, &other.backing)
    }
}

impl<T: ?Sized> Clone for DomainView<T> {
    fn clone(&self) -> Self {
        Self {
            contract: self.contract.clone(),
            backing: Arc::clone(&self.backing),
        }
    }
}

#[derive(Debug)]
pub struct RepositoryFacade<T: ?Sized> {
    type_name: String,
    views: Vec<DomainView<T>>,
}

impl<T: CapabilitySet + ?Sized> RepositoryFacade<T> {
    /// Builds the views after verifying every contract against `backing`.
    pub fn assemble(backing: Arc<T>, facade: &AggregateFacade) -> Result<Self> {
        for contract in &facade.contracts {
            let missing: Vec<&str> = contract
                .methods
                .iter()
                .map(String::as_str)
                .filter(|method| !backing.provides(method))
                .collect();
            if !missing.is_empty() {
                return Err(PartitionError::MissingCapabilities {
                    property: contract.property.clone(),
                    missing: missing.join(", "),
                });
            }
        }
        Ok(Self::assemble_unchecked(backing, facade))
    }
}

impl<T: ?Sized> RepositoryFacade<T> {
    /// Builds the views without looking at `backing`.
    pub fn assemble_unchecked(backing: Arc<T>, facade: &AggregateFacade) -> Self {
        let views = facade
            .contracts
            .iter()
            .map(|contract| DomainView {
                contract: contract.clone(),
                backing: Arc::clone(&backing),
            })
            .collect();
        Self {
            type_name: facade.type_name.clone(),
            views,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn view(&self, property: &str) -> Option<&DomainView<T>> {
        self.views.iter().find(|v| v.property() == property)
    }

    pub fn views(&self) -> impl Iterator<Item = &DomainView<T>> {
        self.views.iter()
    }
}
