//! The [`MapperError`] which makes it easy for downstream users of the error type to match on the exact error.

use context_error::{BoxedError, ErrorKind};

/// All kinds of errors and warnings raised while building or querying a [`crate::Registry`].
///
/// Only the fatal kinds ever end up in the `Err` side of a result, all others are signals that
/// are returned next to a (partial) result.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum MapperError {
    /// The primary reference source does not exist
    #[default]
    MissingPrimarySource,
    /// A required (non optional) reference source does not exist
    MissingSource,
    /// A reference source exists but could not be opened or read
    SourceCouldNotBeOpened,
    /// A reference source could not be parsed
    SourceCouldNotBeParsed,
    /// A user source could not be written
    SourceCouldNotBeWritten,
    /// One composition maps to more than one distinct monoisotopic mass
    InconsistentComposition,
    /// A configuration could not be read
    InvalidConfiguration,
    /// A name, id, or composition could not be found in the registry
    Unmapped,
    /// A composition is known but under a different name
    Ambiguous,
    /// An explicitly given field disagrees with the resolved record
    Conflict,
    /// A modification intent did not give any of name, id, or composition
    MissingKey,
    /// The modification type is not one of fixed or optional
    InvalidModType,
    /// A composition could not be parsed
    InvalidComposition,
    /// More than one record matched, the first by record order was taken
    Disambiguated,
    /// A composition was accepted as a user defined modification
    UserDefined,
}

impl MapperError {
    /// Check if this error invalidates the whole operation, instead of only one item.
    pub const fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::MissingPrimarySource
                | Self::MissingSource
                | Self::SourceCouldNotBeOpened
                | Self::SourceCouldNotBeParsed
                | Self::SourceCouldNotBeWritten
                | Self::InconsistentComposition
                | Self::InvalidConfiguration
        )
    }
}

impl ErrorKind for MapperError {
    type Settings = ();
    fn descriptor(&self) -> &'static str {
        if self.is_fatal() { "error" } else { "warning" }
    }
    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }
    fn is_error(&self, _settings: Self::Settings) -> bool {
        self.is_fatal()
    }
}

/// A single error or warning
pub type MapperIssue = BoxedError<'static, MapperError>;

/// The result of a batch operation, contains the result and a list of warnings if it succeeded
/// and the fatal error if it failed.
pub type MapperResult<T> = Result<(T, Vec<MapperIssue>), MapperIssue>;
