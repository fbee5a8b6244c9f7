//! String-to-value conversion for param fields.
//!
//! Parsers hand every scalar over as a raw string. A type becomes usable as a
//! param (and as a param-list element or dictionary value) by implementing
//! [`StringConverter`]. The standard scalar types are covered here through
//! their `FromStr` impls; user types implement the trait directly.

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Why a raw string couldn't be converted. The message may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StringConversionError {
    pub message: String,
}

impl StringConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn from_display(err: impl Display) -> Self {
        Self::new(err.to_string())
    }
}

/// Conversion from a raw config string.
///
/// ```
/// use figbind::{StringConversionError, StringConverter};
///
/// #[derive(Debug, Default, PartialEq)]
/// enum Level {
///     #[default]
///     Low,
///     High,
/// }
///
/// impl StringConverter for Level {
///     fn from_config_str(raw: &str) -> Result<Self, StringConversionError> {
///         match raw {
///             "low" => Ok(Level::Low),
///             "high" => Ok(Level::High),
///             _ => Err(StringConversionError::new("expected 'low' or 'high'")),
///         }
///     }
/// }
///
/// assert_eq!(Level::from_config_str("high"), Ok(Level::High));
/// ```
pub trait StringConverter: Sized {
    /// Whether a field of this type may be absent from the document.
    const OPTIONAL: bool = false;

    fn from_config_str(raw: &str) -> Result<Self, StringConversionError>;
}

impl<T: StringConverter> StringConverter for Option<T> {
    const OPTIONAL: bool = true;

    fn from_config_str(raw: &str) -> Result<Self, StringConversionError> {
        T::from_config_str(raw).map(Some)
    }
}

macro_rules! from_str_converter {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StringConverter for $ty {
                fn from_config_str(raw: &str) -> Result<Self, StringConversionError> {
                    raw.parse::<$ty>().map_err(StringConversionError::from_display)
                }
            }
        )*
    };
}

from_str_converter!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    String, PathBuf, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_parse() {
        assert_eq!(i32::from_config_str("42"), Ok(42));
        assert_eq!(u16::from_config_str("8080"), Ok(8080));
    }

    #[test]
    fn invalid_integer_carries_message() {
        let err = i32::from_config_str("abc").unwrap_err();
        assert_eq!(err.message, "invalid digit found in string");
    }

    #[test]
    fn overflow_is_an_error() {
        assert!(u8::from_config_str("300").is_err());
    }

    #[test]
    fn strings_pass_through() {
        assert_eq!(
            String::from_config_str("Hello world"),
            Ok("Hello world".to_string())
        );
    }

    #[test]
    fn bool_accepts_true_false() {
        assert_eq!(bool::from_config_str("true"), Ok(true));
        assert_eq!(bool::from_config_str("false"), Ok(false));
        assert!(bool::from_config_str("yes").is_err());
    }

    #[test]
    fn option_wraps_inner_value() {
        assert_eq!(Option::<f64>::from_config_str("1.5"), Ok(Some(1.5)));
        assert!(Option::<f64>::from_config_str("x").is_err());
        const { assert!(<Option<f64> as StringConverter>::OPTIONAL) };
        const { assert!(!<f64 as StringConverter>::OPTIONAL) };
    }

    #[test]
    fn socket_addr_parses() {
        let addr = SocketAddr::from_config_str("127.0.0.1:9000").unwrap();
        assert_eq!(addr.port(), 9000);
    }
}
