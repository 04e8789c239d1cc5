use std::collections::HashMap;

use time::{format_description::well_known::Iso8601, Duration, OffsetDateTime};

use crate::{
    document::AssertionDocument,
    query::{XmlNode, XmlQuery},
    utils::single_node,
    SamlError, SAML_ASSERTION_NS,
};

/// Lifetime given to assertions whose conditions carry no `NotOnOrAfter`.
pub const DEFAULT_LIFETIME: Duration = Duration::seconds(1000);

const ASSERTION: &str = "//saml2:Assertion";
const ISSUER: &str = "//saml2:Assertion/saml2:Issuer";
const DESTINATION: &str = "//saml2p:Response/@Destination";
const SESSION: &str = "//saml2:Assertion/saml2:AuthnStatement/@SessionIndex";
const NAME_ID: &str = "//saml2:Assertion/saml2:Subject/saml2:NameID";
const NAME_ID_FORMAT: &str = "//saml2:Assertion/saml2:Subject/saml2:NameID/@Format";
const AUDIENCE: &str =
    "//saml2:Assertion/saml2:Conditions/saml2:AudienceRestriction/saml2:Audience";
const NOT_BEFORE: &str = "//saml2:Assertion/saml2:Conditions/@NotBefore";
const NOT_ON_OR_AFTER: &str = "//saml2:Assertion/saml2:Conditions/@NotOnOrAfter";
const SUBJECT_IN_RESPONSE_TO: &str = "//saml2:Assertion/saml2:Subject/saml2:SubjectConfirmation/saml2:SubjectConfirmationData/@InResponseTo";
const RESPONSE_IN_RESPONSE_TO: &str = "//saml2p:Response/@InResponseTo";
const AUTHN_CONTEXT_CLASS_REFS: &str = "//saml2:Assertion/saml2:AuthnStatement/saml2:AuthnContext/saml2:AuthnContextClassRef";

/// The claims and validity conditions carried by a single SAML assertion.
///
/// Built once by [`Assertion::parse`] (or [`Assertion::from_query`]) and read-only afterwards.
/// Signature verification must already have happened upstream: nothing here establishes
/// that the assertion is authentic.
#[derive(Debug, Clone)]
pub struct Assertion {
    issuer: String,
    destination: Option<String>,
    attributes: HashMap<String, Vec<String>>,
    session: Option<String>,
    nameid: String,
    nameid_format: Option<String>,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
    audience: String,
    in_response_to: Option<String>,
    authn_context_class_refs: Vec<String>,
    raw: Option<Box<[u8]>>,
}

/// Parses `input`, using the current time for any missing validity bound.
pub fn parse_assertion(input: &[u8]) -> Result<Assertion, SamlError> {
    Assertion::parse(input)
}

impl Assertion {
    pub fn parse(input: &[u8]) -> Result<Self, SamlError> {
        Self::parse_at(input, OffsetDateTime::now_utc())
    }

    /// Parses `input` as if the current time were `now`.
    pub fn parse_at(input: &[u8], now: OffsetDateTime) -> Result<Self, SamlError> {
        let document = AssertionDocument::parse(input)?;
        let assertion = Self::from_query(&document, now)?;
        Ok(Self {
            raw: Some(input.into()),
            ..assertion
        })
    }

    /// Builds an assertion from any [`XmlQuery`] implementation.
    ///
    /// Missing `NotBefore` defaults to `now`; missing `NotOnOrAfter` defaults to
    /// `now + DEFAULT_LIFETIME`. Assertions built this way have no [`raw_xml`](Self::raw_xml).
    pub fn from_query<Q: XmlQuery>(query: &Q, now: OffsetDateTime) -> Result<Self, SamlError> {
        let assertion = single_node(query.nodes(ASSERTION)?)?;

        let not_before = timestamp(query, NOT_BEFORE, "not_before")?.unwrap_or(now);
        let not_after =
            timestamp(query, NOT_ON_OR_AFTER, "not_after")?.unwrap_or(now + DEFAULT_LIFETIME);
        if not_before > not_after {
            tracing::warn!(
                %not_before,
                %not_after,
                "assertion validity window is inverted and can never be satisfied"
            );
        }

        let in_response_to = match query.value(SUBJECT_IN_RESPONSE_TO)? {
            Some(id) => Some(id),
            None => query.value(RESPONSE_IN_RESPONSE_TO)?,
        };

        let authn_context_class_refs = query
            .nodes(AUTHN_CONTEXT_CLASS_REFS)?
            .iter()
            .map(|node| node.text())
            .collect();

        let parsed = Self {
            issuer: required(query, ISSUER, "issuer")?,
            destination: query.value(DESTINATION)?,
            attributes: attributes(&assertion),
            session: query.value(SESSION)?,
            nameid: required(query, NAME_ID, "nameid")?,
            nameid_format: query.value(NAME_ID_FORMAT)?,
            not_before,
            not_after,
            audience: required(query, AUDIENCE, "audience")?,
            in_response_to,
            authn_context_class_refs,
            raw: None,
        };

        tracing::debug!(
            issuer = %parsed.issuer,
            audience = %parsed.audience,
            attributes = parsed.attributes.len(),
            "parsed SAML assertion"
        );

        Ok(parsed)
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn attributes(&self) -> &HashMap<String, Vec<String>> {
        &self.attributes
    }

    /// Values of attribute `name`, in document order.
    pub fn attribute(&self, name: &str) -> Option<&[String]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    /// First value of the `CN` attribute.
    pub fn name(&self) -> Option<&str> {
        self.attribute("CN")
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    pub fn nameid(&self) -> &str {
        &self.nameid
    }

    pub fn nameid_format(&self) -> Option<&str> {
        self.nameid_format.as_deref()
    }

    /// Inclusive lower bound of the validity window.
    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    /// Exclusive upper bound of the validity window.
    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn in_response_to(&self) -> Option<&str> {
        self.in_response_to.as_deref()
    }

    pub fn authn_context_class_refs(&self) -> &[String] {
        &self.authn_context_class_refs
    }

    /// The XML this assertion was parsed from.
    pub fn raw_xml(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    /// Re-parses the source XML for queries beyond the extracted fields.
    pub fn document(&self) -> Option<Result<AssertionDocument, SamlError>> {
        self.raw_xml().map(AssertionDocument::parse)
    }
}

fn required<Q: XmlQuery>(
    query: &Q,
    xpath: &str,
    field: &'static str,
) -> Result<String, SamlError> {
    match query.value(xpath)? {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SamlError::MissingField(field)),
    }
}

fn timestamp<Q: XmlQuery>(
    query: &Q,
    xpath: &str,
    field: &'static str,
) -> Result<Option<OffsetDateTime>, SamlError> {
    query
        .value(xpath)?
        .map(|value| {
            OffsetDateTime::parse(&value, &Iso8601::DEFAULT)
                .map_err(|_| SamlError::InvalidTimestamp { field, value })
        })
        .transpose()
}

fn attributes<N: XmlNode>(assertion: &N) -> HashMap<String, Vec<String>> {
    let mut attributes = HashMap::new();
    for statement in assertion.children(SAML_ASSERTION_NS, "AttributeStatement") {
        for attribute in statement.children(SAML_ASSERTION_NS, "Attribute") {
            let Some(name) = attribute.attribute("Name") else {
                tracing::warn!("skipping SAML attribute without a Name");
                continue;
            };
            let values = attribute
                .children(SAML_ASSERTION_NS, "AttributeValue")
                .iter()
                .map(|node| node.text())
                .collect();
            attributes.insert(name, values);
        }
    }
    attributes
}
