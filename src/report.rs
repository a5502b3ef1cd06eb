//! Serializable summary of a flattened trait, for tooling that wants the
//! method surface without generating any code.

use quote::ToTokens;
use serde::{Deserialize, Serialize};

use crate::flatten::{MethodSig, NormalizedField, TraitRef};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraitReport {
    pub module: String,
    pub name: String,
    pub methods: Vec<MethodReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodReport {
    pub name: String,
    pub declaring_trait: String,
    pub mut_receiver: bool,
    pub params: Vec<FieldReport>,
    pub results: Vec<FieldReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldReport {
    pub name: String,
    pub ty: String,
}

fn field_report(field: &NormalizedField) -> FieldReport {
    FieldReport {
        name: field.name.to_string(),
        ty: field.ty.to_token_stream().to_string(),
    }
}

pub fn method_report(declaring: &TraitRef, sig: &MethodSig) -> MethodReport {
    MethodReport {
        name: sig.name.to_string(),
        declaring_trait: format!("{}::{}", declaring.module_path, declaring.name),
        mut_receiver: sig.mut_receiver,
        params: sig.params.iter().map(field_report).collect(),
        results: sig.results.iter().map(field_report).collect(),
    }
}
