//! Measurement request types.
//!
//! A request is built once from caller input and never mutated afterwards.

use clap::ValueEnum;
use serde::Serialize;

/// How the injected dependency is linked into the reference application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkingMode {
    Static,
    Dynamic,
}

/// Where the dependency comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencySource {
    /// A git repository URL, pinned to a tag.
    Git { url: String },
    /// A crates.io package coordinate.
    Registry { name: String },
}

/// Immutable description of one measurement run.
#[derive(Debug, Clone)]
pub struct MeasurementRequest {
    pub source: DependencySource,
    pub version: String,
    pub product: Option<String>,
    pub linking: LinkingMode,
    pub verbose: bool,
}

impl MeasurementRequest {
    pub fn new(
        identifier: &str,
        version: &str,
        product: Option<String>,
        linking: LinkingMode,
        verbose: bool,
    ) -> Self {
        Self {
            source: classify_identifier(identifier),
            version: version.to_string(),
            product,
            linking,
            verbose,
        }
    }

    /// The crate name to declare in the reference app's manifest.
    ///
    /// Explicit `--product` wins; otherwise the registry coordinate itself,
    /// or the last path segment of the git URL with any `.git` suffix
    /// stripped.
    pub fn product_name(&self) -> String {
        if let Some(product) = &self.product {
            return product.clone();
        }
        match &self.source {
            DependencySource::Registry { name } => name.clone(),
            DependencySource::Git { url } => derive_name_from_url(url),
        }
    }

    /// What the dependency injector writes into the manifest.
    pub fn dependency_spec(&self) -> DependencySpec {
        DependencySpec {
            name: self.product_name(),
            source: self.source.clone(),
            version: self.version.clone(),
            linking: self.linking,
        }
    }
}

/// The manifest-level description of the dependency to declare.
#[derive(Debug, Clone)]
pub struct DependencySpec {
    pub name: String,
    pub source: DependencySource,
    pub version: String,
    pub linking: LinkingMode,
}

fn classify_identifier(identifier: &str) -> DependencySource {
    if identifier.contains("://") || identifier.starts_with("git@") {
        DependencySource::Git {
            url: identifier.to_string(),
        }
    } else {
        DependencySource::Registry {
            name: identifier.to_string(),
        }
    }
}

fn derive_name_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    let name = last.trim_end_matches(".git");
    if name.is_empty() {
        trimmed.to_string()
    } else {
        name.to_string()
    }
}
