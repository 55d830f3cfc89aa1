use crate::automata::{self, Format};
use crate::binary_op;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] automata::Error),
    #[error(transparent)]
    Op(#[from] binary_op::Error),
}

pub fn union(first: &PathBuf, second: &PathBuf, format: Format, minimize: bool) -> Result<String, Error> {
    let a = automata::load_file(first, format)?;
    let b = automata::load_file(second, format)?;
    let combined = binary_op::union(a, b)?;
    let combined = if minimize {
        binary_op::minimize(combined)
    } else {
        combined
    };
    Ok(combined.render())
}
