use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid trait data at item {index}{}: {reason}", trait_label(.trait_name))]
    Validation {
        index: usize,
        trait_name: Option<String>,
        reason: String,
    },

    #[error("No distribution for trait '{trait_name}' of item {token_id}")]
    MissingDistribution { token_id: usize, trait_name: String },

    #[error("Item not found: {0}")]
    UnknownItem(usize),

    #[error("Internal invariant violated: {0}")]
    Internal(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    pub(crate) fn validation(index: usize, trait_name: Option<&str>, reason: impl Into<String>) -> Self {
        Error::Validation {
            index,
            trait_name: trait_name.map(str::to_string),
            reason: reason.into(),
        }
    }
}

fn trait_label(trait_name: &Option<String>) -> String {
    match trait_name {
        Some(name) => format!(", trait '{}'", name),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let cases = [
            (Error::validation(4, Some("hat"), "bad"), "Invalid trait data at item 4, trait 'hat': bad"),
            (Error::validation(0, None, "not a map"), "Invalid trait data at item 0: not a map"),
            (
                Error::MissingDistribution { token_id: 2, trait_name: "eyes".to_string() },
                "No distribution for trait 'eyes' of item 2",
            ),
            (Error::UnknownItem(9), "Item not found: 9"),
            (Error::Internal("p = 0".to_string()), "Internal invariant violated: p = 0"),
            (Error::InvalidConfig("empty".to_string()), "Invalid configuration: empty"),
            (Error::Storage("disk full".to_string()), "Storage error: disk full"),
        ];

        for (err, expected) in cases {
            // exhaustive so a new variant needs a message case here
            match &err {
                Error::Validation { .. }
                | Error::MissingDistribution { .. }
                | Error::UnknownItem(_)
                | Error::Internal(_)
                | Error::InvalidConfig(_)
                | Error::Storage(_) => {}
            }
            assert_eq!(err.to_string(), expected);
        }
    }
}
