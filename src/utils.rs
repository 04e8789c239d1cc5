use base64::{prelude::BASE64_STANDARD, Engine};

use crate::SamlError;

pub fn single_node<N>(mut nodes: Vec<N>) -> Result<N, SamlError> {
    if nodes.len() != 1 {
        return Err(SamlError::InvalidAssertion(nodes.len()));
    }
    Ok(nodes.remove(0))
}

pub fn decode_xml_base64(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let stripped = input.replace([' ', '\n', '\r', '\t'], "");
    BASE64_STANDARD.decode(stripped)
}
