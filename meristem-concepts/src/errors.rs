use core::fmt::Display;
use std::error::Error;

macro_rules! define_errors {
    ($(($err_name: ident, $err_descr: expr)),+) => {
        $(
            #[doc = $err_descr]
            #[derive(Debug,Clone,PartialEq)]
            pub struct $err_name(
                #[doc = "Error message associated with "]
                #[doc = stringify!($err_name)]
                #[doc = " error type."]
                pub String,
            );

            impl Display for $err_name {
                fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl Error for $err_name {}

            impl From<String> for $err_name {
                fn from(value: String) -> Self {
                    $err_name(value)
                }
            }

            impl From<&str> for $err_name {
                fn from(value: &str) -> Self {
                    $err_name(value.to_owned())
                }
            }
        )+
    }
}

define_errors!(
    (SetupError, "Occurs during setup of a new simulation"),
    (CalcError, "General Calculation Error"),
    (DivisionError, "Errors related to a cell dividing process"),
    (
        TopologyError,
        "Editing the wall ring of a cell would break its closed cyclic structure"
    ),
    (
        InvariantError,
        "An internal invariant of a cell or the tissue does not hold. This indicates a bug."
    ),
    (
        IndexError,
        "Can occur internally when information is not present at expected place"
    )
);

impl From<CalcError> for SetupError {
    fn from(value: CalcError) -> Self {
        SetupError(format!("{}", value))
    }
}

impl From<TopologyError> for DivisionError {
    fn from(value: TopologyError) -> Self {
        DivisionError(format!("{}", value))
    }
}

/// For internal use: formats an error message to include the location where it was raised.
#[macro_export]
macro_rules! format_error_message(
    (@function) => {
        {
            fn f() {}
            let name = std::any::type_name_of_val(&f);
            name.strip_suffix("::f").unwrap_or(name)
        }
    };
    ($bug_title:expr, $error_msg:expr) => {
        {
            format!("Internal Error in function {}: +++ {} +++ {} (file {} line {} column {})",
                $crate::format_error_message!(@function),
                $bug_title,
                $error_msg,
                file!(),
                line!(),
                column!(),
            )
        }
    };
);
