use crate::error::ConfigError;
use crate::tree::Tree;

/// Turns document text into a [`Tree`].
///
/// Implementations own the format grammar. They report syntax errors with
/// [`ConfigError::parse`] and must give every node, param and list element
/// the position it was read from. The root is either an item (one config)
/// or a list of items (one config per element).
pub trait Parser {
    fn parse(&mut self, content: &str) -> Result<Tree, ConfigError>;
}

impl<P: Parser + ?Sized> Parser for &mut P {
    fn parse(&mut self, content: &str) -> Result<Tree, ConfigError> {
        (**self).parse(content)
    }
}

impl<P: Parser + ?Sized> Parser for Box<P> {
    fn parse(&mut self, content: &str) -> Result<Tree, ConfigError> {
        (**self).parse(content)
    }
}
