use std::path::PathBuf;
use thiserror::Error;

/// Terminal generation errors. Every variant aborts the run; there is no
/// partial-output recovery.
#[derive(Debug, Error)]
pub enum Error {
    #[error("`{0}` is not a module-qualified trait path")]
    InvalidTraitPath(String),

    #[error("type `{name}` not found in module `{module}`")]
    TypeNotFound { module: String, name: String },

    #[error("no source file for module `{0}` under any configured root")]
    ModuleNotFound(String),

    #[error("module `{module}` has conflicting source files `{first}` and `{second}`")]
    AmbiguousModule { module: String, first: PathBuf, second: PathBuf },

    #[error("`{qualifier}` does not name a module in scope of `{file}`")]
    UnknownQualifier { qualifier: String, file: PathBuf },

    #[error("`{module}::{name}` is not a trait")]
    NotATrait { module: String, name: String },

    #[error("supertrait cycle detected at `{module}::{name}`")]
    CycleDetected { module: String, name: String },

    #[error("unsupported member `{member}` in trait `{trait_name}`: {detail}")]
    MalformedMember { trait_name: String, member: String, detail: String },

    #[error("generic traits are not supported: `{0}`")]
    UnsupportedGenerics(String),

    #[error("unsupported type shape: {0}")]
    UnsupportedType(String),

    #[error("failed to read `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse `{path}`")]
    Parse {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
