//! Manifest-based dependency injector.
//!
//! Mutates the reference application's `Cargo.toml` in place to declare the
//! requested dependency, writing the change to disk before returning so the
//! next build observes it. Dynamic linking additionally persists a
//! `.cargo/config.toml` carrying the prefer-dynamic rustflags.

use std::fs;
use std::path::Path;

use crate::error::InjectionError;
use crate::pipeline::contract::DependencyInjector;
use crate::request::{DependencySource, DependencySpec, LinkingMode};

const DYNAMIC_LINKING_CONFIG: &str = "[build]\nrustflags = [\"-C\", \"prefer-dynamic\"]\n";

pub struct ManifestInjector;

impl ManifestInjector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ManifestInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyInjector for ManifestInjector {
    fn inject(&self, checkout: &Path, spec: &DependencySpec) -> Result<(), InjectionError> {
        let manifest_path = checkout.join("Cargo.toml");
        let text = fs::read_to_string(&manifest_path).map_err(|e| {
            InjectionError::new(format!(
                "cannot read manifest {}: {}",
                manifest_path.display(),
                e
            ))
        })?;

        let mut manifest: toml::Table = text.parse().map_err(|e| {
            InjectionError::new(format!(
                "malformed manifest {}: {}",
                manifest_path.display(),
                e
            ))
        })?;

        let package_name = manifest
            .get("package")
            .and_then(|v| v.as_table())
            .and_then(|t| t.get("name"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                InjectionError::new(format!(
                    "{} has no [package] name; not an application manifest",
                    manifest_path.display()
                ))
            })?;
        if package_name == spec.name {
            return Err(InjectionError::new(format!(
                "dependency '{}' collides with the reference app's own name",
                spec.name
            )));
        }

        let dependencies = manifest
            .entry("dependencies")
            .or_insert_with(|| toml::Value::Table(toml::Table::new()))
            .as_table_mut()
            .ok_or_else(|| {
                InjectionError::new("manifest [dependencies] is not a table".to_string())
            })?;

        if dependencies.contains_key(&spec.name) {
            return Err(InjectionError::new(format!(
                "dependency '{}' is already declared in the reference app",
                spec.name
            )));
        }

        dependencies.insert(spec.name.clone(), dependency_entry(spec));

        let rendered = toml::to_string_pretty(&manifest)
            .map_err(|e| InjectionError::new(format!("failed to render manifest: {}", e)))?;
        fs::write(&manifest_path, rendered).map_err(|e| {
            InjectionError::new(format!(
                "cannot write manifest {}: {}",
                manifest_path.display(),
                e
            ))
        })?;

        if spec.linking == LinkingMode::Dynamic {
            write_dynamic_linking_config(checkout)?;
        }

        Ok(())
    }
}

fn dependency_entry(spec: &DependencySpec) -> toml::Value {
    match &spec.source {
        DependencySource::Registry { .. } => toml::Value::String(spec.version.clone()),
        DependencySource::Git { url } => {
            let mut table = toml::Table::new();
            table.insert("git".to_string(), toml::Value::String(url.clone()));
            table.insert("tag".to_string(), toml::Value::String(spec.version.clone()));
            toml::Value::Table(table)
        }
    }
}

fn write_dynamic_linking_config(checkout: &Path) -> Result<(), InjectionError> {
    let config_dir = checkout.join(".cargo");
    fs::create_dir_all(&config_dir).map_err(|e| {
        InjectionError::new(format!(
            "cannot create {}: {}",
            config_dir.display(),
            e
        ))
    })?;
    let config_path = config_dir.join("config.toml");
    fs::write(&config_path, DYNAMIC_LINKING_CONFIG).map_err(|e| {
        InjectionError::new(format!("cannot write {}: {}", config_path.display(), e))
    })
}
