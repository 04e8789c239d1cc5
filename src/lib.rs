use libxml::parser::XmlParseError;
use thiserror::Error;

mod assertion;
mod document;
mod query;
mod response;
mod utils;
mod validator;

pub use assertion::{parse_assertion, Assertion, DEFAULT_LIFETIME};
pub use document::AssertionDocument;
pub use query::{XmlNode, XmlQuery};
pub use response::{decode_response, parse_response};
pub use validator::{check_conditions, Rejection};

pub const SAML_ASSERTION_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";
pub const SAML_PROTOCOL_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// NameID format to compare against [`Assertion::nameid_format`] for email-address subjects.
pub const NAME_ID_FORMAT_EMAIL_ADDRESS: &str =
    "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress";

#[derive(Debug, Error)]
pub enum SamlError {
    #[error("response is not valid base64")]
    InvalidResponse,
    #[error("malformed XML: {0:?}")]
    InvalidXml(XmlParseError),
    #[error("XPath query failed: {0}")]
    InvalidQuery(String),
    #[error("expected exactly one assertion, found {0}")]
    InvalidAssertion(usize),
    #[error("malformed timestamp in {field}: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },
    #[error("missing mandatory field {0}")]
    MissingField(&'static str),
}
