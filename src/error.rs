use ethers::types::Address;
use thiserror::Error;

/// Recoverable engine errors.
///
/// Economic infeasibility (an exact-output request the pool cannot satisfy, a
/// degenerate spot price) is deliberately *not* represented here: those flow
/// back as sentinel values (zero amount, absent price) so batch evaluation of
/// many candidates can continue. Arithmetic invariant violations are fatal
/// assertions in the math layer, never silently masked.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("token {token:?} is not part of pool {pool:?}")]
    TokenNotInPool { token: Address, pool: Address },

    #[error("invalid pool snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("pool path is empty")]
    EmptyRoute,

    #[error("route requires at least a repayment pool and one proceeds hop")]
    RouteTooShort,

    #[error("no edge between {0:?} and {1:?}")]
    MissingEdge(Address, Address),
}
