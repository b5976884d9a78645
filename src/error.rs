//! Error types for sources and the equipment feed.

use thiserror::Error;

/// Errors a data source reports through a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Could not reach or lost the backing connection.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The upstream closed the stream.
    #[error("Connection closed")]
    Closed,

    /// Received data that could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The subscriber fell behind and updates were dropped.
    #[error("Subscription lagged by {0} messages")]
    Lagged(u64),
}

/// Terminal failures of a monitoring session.
///
/// The display text is the user-visible `error` of the published state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The equipment identifier has no backing record.
    #[error("Equipment not found")]
    NotFound,

    /// The metadata subscription failed.
    #[error("Failed to fetch equipment data")]
    EquipmentTransport(#[source] SourceError),

    /// The readings subscription failed.
    #[error("Failed to fetch readings")]
    ReadingsTransport(#[source] SourceError),
}
