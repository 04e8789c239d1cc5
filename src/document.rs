use libxml::{
    parser::Parser as XmlParser,
    tree::{Document, Node},
    xpath::Context,
};

use crate::{
    query::{XmlNode, XmlQuery},
    SamlError, SAML_ASSERTION_NS, SAML_PROTOCOL_NS,
};

const NAMESPACES: [(&str, &str); 2] = [
    ("saml2", SAML_ASSERTION_NS),
    ("saml2p", SAML_PROTOCOL_NS),
];

/// A parsed SAML document answering namespace-scoped XPath queries through libxml.
pub struct AssertionDocument {
    document: Document,
}

impl AssertionDocument {
    pub fn parse(input: &[u8]) -> Result<Self, SamlError> {
        let parser = XmlParser::default();

        let document = parser.parse_string(input).map_err(SamlError::InvalidXml)?;

        Ok(Self { document })
    }

    fn context(&self) -> Result<Context, SamlError> {
        let context = Context::new(&self.document)
            .map_err(|_| SamlError::InvalidQuery("failed to create XPath context".into()))?;
        for (prefix, href) in NAMESPACES {
            context.register_namespace(prefix, href).map_err(|_| {
                SamlError::InvalidQuery(format!("failed to register namespace {prefix}"))
            })?;
        }
        Ok(context)
    }
}

impl XmlQuery for AssertionDocument {
    type Node = Node;

    fn value(&self, xpath: &str) -> Result<Option<String>, SamlError> {
        let object = self
            .context()?
            .evaluate(xpath)
            .map_err(|_| SamlError::InvalidQuery(xpath.into()))?;
        if object.get_number_of_nodes() == 0 {
            return Ok(None);
        }
        Ok(Some(object.to_string()))
    }

    fn nodes(&self, xpath: &str) -> Result<Vec<Node>, SamlError> {
        Ok(self
            .context()?
            .evaluate(xpath)
            .map_err(|_| SamlError::InvalidQuery(xpath.into()))?
            .get_nodes_as_vec())
    }
}

impl XmlNode for Node {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn text(&self) -> String {
        self.get_content()
    }

    fn children(&self, namespace: &str, local_name: &str) -> Vec<Node> {
        self.get_child_elements()
            .into_iter()
            .filter(|child| {
                child.get_name() == local_name
                    && child
                        .get_namespace()
                        .is_some_and(|ns| ns.get_href() == namespace)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &[u8] = include_bytes!("../static/response.xml");

    #[test]
    fn distinguishes_absent_from_empty_values() {
        let document = AssertionDocument::parse(SAMPLE_RESPONSE).unwrap();

        assert_eq!(
            document.value("//saml2p:Response/@InResponseTo").unwrap(),
            Some("req-123".to_string())
        );
        assert_eq!(document.value("//saml2p:Response/@Consent").unwrap(), None);
        assert_eq!(
            document
                .value("//saml2:AudienceRestriction/saml2:Audience")
                .unwrap(),
            Some("https://sp.example.com".to_string())
        );

        let empty = AssertionDocument::parse(
            br#"<saml2:Assertion xmlns:saml2="urn:oasis:names:tc:SAML:2.0:assertion"><saml2:Issuer/></saml2:Assertion>"#,
        )
        .unwrap();
        assert_eq!(
            empty.value("//saml2:Assertion/saml2:Issuer").unwrap(),
            Some(String::new())
        );
    }

    #[test]
    fn lists_namespaced_children_in_order() {
        let document = AssertionDocument::parse(SAMPLE_RESPONSE).unwrap();
        let attributes = document
            .nodes("//saml2:AttributeStatement/saml2:Attribute[@Name=\"groups\"]")
            .unwrap();
        assert_eq!(attributes.len(), 1);

        let values: Vec<String> = attributes[0]
            .children(SAML_ASSERTION_NS, "AttributeValue")
            .iter()
            .map(|value| value.text())
            .collect();
        assert_eq!(values, ["admins", "staff", "ops"]);
        assert!(attributes[0]
            .children(SAML_PROTOCOL_NS, "AttributeValue")
            .is_empty());
    }

    #[test]
    fn rejects_unparseable_input() {
        assert!(matches!(
            AssertionDocument::parse(b""),
            Err(SamlError::InvalidXml(_))
        ));
    }

    #[test]
    fn reports_invalid_xpath() {
        let document = AssertionDocument::parse(SAMPLE_RESPONSE).unwrap();
        assert!(matches!(
            document.nodes("//saml2:Assertion["),
            Err(SamlError::InvalidQuery(_))
        ));
    }
}
