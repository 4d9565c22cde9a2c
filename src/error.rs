pub type SpritemillResult<T> = Result<T, SpritemillError>;

#[derive(thiserror::Error, Debug)]
pub enum SpritemillError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("input error: {0}")]
    Input(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpritemillError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            SpritemillError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            SpritemillError::input("x")
                .to_string()
                .contains("input error:")
        );
        assert!(
            SpritemillError::encode("x")
                .to_string()
                .contains("encode error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = SpritemillError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
