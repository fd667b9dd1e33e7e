use meristem_concepts::*;

use core::fmt::Display;

macro_rules! impl_error_variant {
    ($name: ident, $($err_var: ident),+) => {
        // Implement Display for ErrorVariant
        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        $name::$err_var(message) => write!(f, "{}", message),
                    )+
                }
            }
        }
    }
}

macro_rules! impl_from_error {
    ($name: ident, $(($err_var: ident, $err_type: ty)),+) => {
        $(
            // Implement conversion from error to errorvariant
            impl From<$err_type> for $name {
                fn from(err: $err_type) -> Self {
                    $name::$err_var(err)
                }
            }
        )+
    }
}

/// Covers all errors that can occur while setting up and running a tissue.
///
/// The errors are listed from very likely to be a user error to almost certainly an
/// internal error.
#[derive(Debug)]
pub enum SimulationError {
    // Very likely to be user errors
    /// Invalid settings or seed cells
    SetupError(SetupError),
    /// Numerical problems while integrating the node positions
    CalcError(CalcError),
    /// Settings could not be parsed from RON
    RonError(ron::error::SpannedError),
    /// Settings could not be written as RON
    RonSerializeError(ron::Error),
    /// Settings could not be parsed from JSON
    JsonError(serde_json::Error),
    /// Settings file could not be read
    IoError(std::io::Error),

    // Highly unlikely to be user errors
    /// A handle did not resolve to a cell
    IndexError(IndexError),
    /// A structural invariant of a cell or of the tissue was violated
    InvariantError(InvariantError),
}

impl_from_error! {SimulationError,
    (SetupError, SetupError),
    (CalcError, CalcError),
    (RonError, ron::error::SpannedError),
    (RonSerializeError, ron::Error),
    (JsonError, serde_json::Error),
    (IoError, std::io::Error),
    (IndexError, IndexError),
    (InvariantError, InvariantError)
}

impl_error_variant! {SimulationError,
    SetupError,
    CalcError,
    RonError,
    RonSerializeError,
    JsonError,
    IoError,
    IndexError,
    InvariantError
}

// Implement the general error property
impl std::error::Error for SimulationError {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_forwards_message() {
        let err: SimulationError = InvariantError("ring broken".into()).into();
        assert_eq!(format!("{err}"), "ring broken");
        assert!(matches!(err, SimulationError::InvariantError(_)));
    }
}
