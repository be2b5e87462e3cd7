use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LookupError {
    #[error("unknown station: {0}")]
    UnknownStation(String),
    #[error("unknown {kind} option: {value}")]
    UnknownOption { kind: &'static str, value: String },
    #[error("no rating record for ward {0}")]
    NoRating(String),
}
