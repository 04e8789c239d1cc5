//! The narrow XML capability the assertion parser depends on.
//!
//! Implementations must bind the `saml2` prefix to [`SAML_ASSERTION_NS`] and the
//! `saml2p` prefix to [`SAML_PROTOCOL_NS`] before evaluating expressions.
//!
//! [`SAML_ASSERTION_NS`]: crate::SAML_ASSERTION_NS
//! [`SAML_PROTOCOL_NS`]: crate::SAML_PROTOCOL_NS

use crate::SamlError;

/// An element returned by [`XmlQuery::nodes`].
pub trait XmlNode: Sized {
    fn attribute(&self, name: &str) -> Option<String>;

    /// Concatenated text content of the node and its descendants.
    fn text(&self) -> String;

    /// Direct child elements with the given namespace and local name, in document order.
    fn children(&self, namespace: &str, local_name: &str) -> Vec<Self>;
}

pub trait XmlQuery {
    type Node: XmlNode;

    /// String value of the first node matched by `xpath`.
    ///
    /// Returns `None` when nothing matches, so an element or attribute that is present
    /// but empty comes back as `Some("")`.
    fn value(&self, xpath: &str) -> Result<Option<String>, SamlError>;

    /// All element nodes matched by `xpath`, in document order.
    fn nodes(&self, xpath: &str) -> Result<Vec<Self::Node>, SamlError>;
}
