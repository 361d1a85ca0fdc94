#[derive(Debug, thiserror::Error)]
pub enum KeyVarError {
    #[error("reading targets file {path}")]
    ReadTargets {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("reading key-variable manifest {path}")]
    ReadManifest {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("writing key-variable manifest {path}")]
    WriteManifest {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
