use crate::{assertion::Assertion, utils::decode_xml_base64, SamlError};

/// Decodes an HTTP-POST `SAMLResponse` form value into XML bytes.
///
/// The result must still pass signature verification before it is parsed.
pub fn decode_response(input: &str) -> Result<Vec<u8>, SamlError> {
    decode_xml_base64(input).map_err(|_| SamlError::InvalidResponse)
}

pub fn parse_response(input: &str) -> Result<Assertion, SamlError> {
    Assertion::parse(&decode_response(input)?)
}
