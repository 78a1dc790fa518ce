use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReturnsError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReturnsError {
    /// A rate needs at least one inflow and one outflow on distinct dates.
    #[error("cash-flow series has no solvable rate")]
    InsufficientData,

    #[error("rate solver did not converge")]
    NoConvergence,
}
