#[derive(Debug, thiserror::Error)]
pub enum GfuzzError {
    #[error("{requested} key variables requested but the state map only holds {max} slots")]
    KeyVarCountExceeds { requested: usize, max: usize },
}

impl From<GfuzzError> for libafl::Error {
    fn from(err: GfuzzError) -> Self {
        libafl::Error::illegal_argument(err.to_string())
    }
}
