use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("unknown {kind} `{value}`")]
    UnknownVariant { kind: &'static str, value: String },
}

impl DomainError {
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}
