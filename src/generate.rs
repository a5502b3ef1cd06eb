//! End-to-end generation pipeline: locate the trait, flatten its supertrait
//! closure, normalize every method, and drive one of the synthesis models.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::flatten::{self, TraitRef};
use crate::instrument::MonitorModel;
use crate::locate::Locator;
use crate::report::{self, TraitReport};
use crate::resolve::Resolver;
use crate::synth::{ImportTable, StubModel};

/// Splits `demo::store::Store` into its module path and trait name.
pub fn split_trait_path(trait_path: &str) -> Result<(&str, &str)> {
    trait_path
        .rsplit_once("::")
        .filter(|(module, name)| !module.is_empty() && !name.is_empty())
        .ok_or_else(|| Error::InvalidTraitPath(trait_path.to_string()))
}

fn flattened(locator: &Locator, trait_path: &str) -> Result<(TraitRef, Vec<flatten::FlatMethod>)> {
    let (module, name) = split_trait_path(trait_path)?;
    let ctx = locator.context_for(module)?;
    let discovery = locator.find_ident_type(&ctx, name)?;
    discovery.as_trait()?;
    let root = TraitRef { module_path: module.to_string(), name: name.to_string() };
    let methods = flatten::flatten(locator, &discovery)?;
    debug!(trait_path, methods = methods.len(), "flattened trait");
    Ok((root, methods))
}

/// Generates the stub source for one trait. `name` overrides the default
/// `{Trait}Stub` struct name.
pub fn generate_stub(locator: &Locator, trait_path: &str, name: Option<&str>) -> Result<String> {
    let (root, methods) = flattened(locator, trait_path)?;
    let stub_name = name.map(str::to_string).unwrap_or_else(|| format!("{}Stub", root.name));
    let mut model = StubModel::new(&stub_name);
    let resolver = Resolver::new(locator);
    for flat in &methods {
        let sig = flatten::normalize(&resolver, model.imports_mut(), flat)?;
        model.add_method(&flat.declaring, &sig)?;
    }
    info!(trait_path, stub = %stub_name, "generated stub");
    model.render()
}

/// Generates the instrumented-wrapper source for one trait. `name` overrides
/// the default `{Trait}Monitor` struct name.
pub fn generate_monitor(
    locator: &Locator,
    trait_path: &str,
    name: Option<&str>,
) -> Result<String> {
    let (root, methods) = flattened(locator, trait_path)?;
    let monitor_name =
        name.map(str::to_string).unwrap_or_else(|| format!("{}Monitor", root.name));
    let mut model = MonitorModel::new(&monitor_name, &root);
    let resolver = Resolver::new(locator);
    for flat in &methods {
        let sig = flatten::normalize(&resolver, model.imports_mut(), flat)?;
        model.add_method(&flat.declaring, &sig)?;
    }
    info!(trait_path, monitor = %monitor_name, "generated monitor");
    model.render()
}

/// Summarizes the flattened method surface of one trait without generating
/// any code.
pub fn trait_report(locator: &Locator, trait_path: &str) -> Result<TraitReport> {
    let (root, methods) = flattened(locator, trait_path)?;
    let resolver = Resolver::new(locator);
    let mut table = ImportTable::new();
    let mut reports = Vec::with_capacity(methods.len());
    for flat in &methods {
        let sig = flatten::normalize(&resolver, &mut table, flat)?;
        reports.push(report::method_report(&flat.declaring, &sig));
    }
    Ok(TraitReport { module: root.module_path, name: root.name, methods: reports })
}
