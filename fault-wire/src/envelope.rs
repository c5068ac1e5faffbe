use xmltree::{Element, Namespace, XMLNode};

use crate::{FaultCode, ProtocolVersion, QName, Subcode, WireError};

/// Complete wire-level fault representation for one protocol version.
///
/// Created fresh per translation call and never mutated afterwards. The
/// `code` and `reason` fields are always populated (defaulted when they
/// could not be resolved); `actor` exists only for version 1, `role` and
/// `node` only for version 2.
#[derive(Debug, Clone)]
pub struct FaultEnvelope {
    pub version: ProtocolVersion,
    pub code: FaultCode,
    pub reason: String,
    pub actor: Option<String>,
    pub role: Option<String>,
    pub node: Option<String>,
    /// Ordered detail payload entries.
    pub detail: Vec<Element>,
}

impl FaultEnvelope {
    /// Qualified name of the first detail entry, used for descriptor lookup
    /// on decode and for caller-side pre-routing on encode.
    pub fn first_detail_name(&self) -> Option<QName> {
        self.detail.first().map(QName::of_element)
    }

    /// Serialize this envelope as the version-correct `<Fault>` element.
    pub fn to_element(&self) -> Element {
        match self.version {
            ProtocolVersion::V1 => self.to_soap11(),
            ProtocolVersion::V2 => self.to_soap12(),
        }
    }

    /// Read an envelope back from a `<Fault>` element.
    pub fn parse(version: ProtocolVersion, fault: &Element) -> Result<Self, WireError> {
        match version {
            ProtocolVersion::V1 => parse_soap11(fault),
            ProtocolVersion::V2 => parse_soap12(fault),
        }
    }

    /// Parse an envelope from XML text. The document root may be the
    /// `<Fault>` element itself or a full SOAP envelope, in which case the
    /// fault is located under `Body`.
    pub fn parse_str(version: ProtocolVersion, xml: &str) -> Result<Self, WireError> {
        let root = Element::parse(xml.as_bytes()).map_err(|e| WireError::Parse(e.to_string()))?;
        if root.name == "Fault" {
            return Self::parse(version, &root);
        }
        let fault = root
            .get_child("Body")
            .and_then(|body| body.get_child("Fault"))
            .ok_or(WireError::MissingElement("Fault"))?;
        Self::parse(version, fault)
    }

    fn to_soap11(&self) -> Element {
        let env_ns = ProtocolVersion::V1.envelope_namespace();
        let mut bindings = Namespace::empty();
        bindings.put("env", env_ns);
        let mut next_prefix = 0usize;

        let mut fault = env_element(env_ns, "Fault");
        // SOAP 1.1 fault subelements are unqualified.
        let code_text = qname_text(&self.code.value, env_ns, &mut bindings, &mut next_prefix);
        fault
            .children
            .push(XMLNode::Element(text_element("faultcode", &code_text)));
        fault
            .children
            .push(XMLNode::Element(text_element("faultstring", &self.reason)));
        if let Some(actor) = &self.actor {
            fault
                .children
                .push(XMLNode::Element(text_element("faultactor", actor)));
        }
        if !self.detail.is_empty() {
            let mut detail = Element::new("detail");
            for entry in &self.detail {
                detail.children.push(XMLNode::Element(entry.clone()));
            }
            fault.children.push(XMLNode::Element(detail));
        }
        fault.namespaces = Some(bindings);
        fault
    }

    fn to_soap12(&self) -> Element {
        let env_ns = ProtocolVersion::V2.envelope_namespace();
        let mut bindings = Namespace::empty();
        bindings.put("env", env_ns);
        let mut next_prefix = 0usize;

        let mut fault = env_element(env_ns, "Fault");

        let mut code = env_element(env_ns, "Code");
        let value_text = qname_text(&self.code.value, env_ns, &mut bindings, &mut next_prefix);
        code.children
            .push(XMLNode::Element(env_text_element(env_ns, "Value", &value_text)));
        if let Some(subcode) = self.code.subcode.as_deref() {
            code.children.push(XMLNode::Element(subcode_element(
                subcode,
                env_ns,
                &mut bindings,
                &mut next_prefix,
            )));
        }
        fault.children.push(XMLNode::Element(code));

        let mut reason = env_element(env_ns, "Reason");
        reason
            .children
            .push(XMLNode::Element(env_text_element(env_ns, "Text", &self.reason)));
        fault.children.push(XMLNode::Element(reason));

        if let Some(node) = &self.node {
            fault
                .children
                .push(XMLNode::Element(env_text_element(env_ns, "Node", node)));
        }
        if let Some(role) = &self.role {
            fault
                .children
                .push(XMLNode::Element(env_text_element(env_ns, "Role", role)));
        }
        if !self.detail.is_empty() {
            let mut detail = env_element(env_ns, "Detail");
            for entry in &self.detail {
                detail.children.push(XMLNode::Element(entry.clone()));
            }
            fault.children.push(XMLNode::Element(detail));
        }
        fault.namespaces = Some(bindings);
        fault
    }
}

fn env_element(env_ns: &str, name: &str) -> Element {
    let mut element = Element::new(name);
    element.prefix = Some("env".to_string());
    element.namespace = Some(env_ns.to_string());
    element
}

fn text_element(name: &str, text: &str) -> Element {
    let mut element = Element::new(name);
    element.children.push(XMLNode::Text(text.to_string()));
    element
}

fn env_text_element(env_ns: &str, name: &str, text: &str) -> Element {
    let mut element = env_element(env_ns, name);
    element.children.push(XMLNode::Text(text.to_string()));
    element
}

fn subcode_element(
    subcode: &Subcode,
    env_ns: &str,
    bindings: &mut Namespace,
    next_prefix: &mut usize,
) -> Element {
    let mut element = env_element(env_ns, "Subcode");
    let value_text = qname_text(&subcode.value, env_ns, bindings, next_prefix);
    element
        .children
        .push(XMLNode::Element(env_text_element(env_ns, "Value", &value_text)));
    if let Some(next) = subcode.subcode.as_deref() {
        element
            .children
            .push(XMLNode::Element(subcode_element(next, env_ns, bindings, next_prefix)));
    }
    element
}

/// Render a qualified name as prefixed text, registering a namespace binding
/// on the fault element when one is not already in scope.
fn qname_text(
    name: &QName,
    env_ns: &str,
    bindings: &mut Namespace,
    next_prefix: &mut usize,
) -> String {
    if name.namespace_uri.is_empty() {
        return name.local_name.clone();
    }
    if name.namespace_uri == env_ns {
        return format!("env:{}", name.local_name);
    }
    if let Some((prefix, _)) = bindings
        .0
        .iter()
        .find(|(_, uri)| uri.as_str() == name.namespace_uri)
    {
        return format!("{}:{}", prefix, name.local_name);
    }
    let prefix = format!("flt{}", *next_prefix);
    *next_prefix += 1;
    bindings.put(prefix.as_str(), name.namespace_uri.as_str());
    format!("{}:{}", prefix, name.local_name)
}

/// Resolve prefixed QName text against the in-scope bindings of the given
/// elements, innermost first. An unresolvable prefix degrades to an empty
/// namespace rather than failing.
fn resolve_qname_text(text: &str, scopes: &[&Element]) -> QName {
    match text.split_once(':') {
        Some((prefix, local)) => {
            for element in scopes {
                if let Some(uri) = element.namespaces.as_ref().and_then(|ns| ns.get(prefix)) {
                    return QName::new(uri, local);
                }
            }
            QName::new("", local)
        }
        None => QName::new("", text),
    }
}

fn child_text(parent: &Element, name: &'static str) -> Option<String> {
    parent
        .get_child(name)
        .and_then(|e| e.get_text())
        .map(|t| t.trim().to_string())
}

fn detail_entries(parent: &Element, name: &str) -> Vec<Element> {
    parent
        .get_child(name)
        .map(|detail| {
            detail
                .children
                .iter()
                .filter_map(XMLNode::as_element)
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn parse_soap11(fault: &Element) -> Result<FaultEnvelope, WireError> {
    let code_element = fault
        .get_child("faultcode")
        .ok_or(WireError::MissingElement("faultcode"))?;
    let code_text = code_element
        .get_text()
        .ok_or(WireError::MissingText("faultcode"))?;
    let value = resolve_qname_text(code_text.trim(), &[code_element, fault]);

    let reason = child_text(fault, "faultstring").ok_or(WireError::MissingElement("faultstring"))?;
    let actor = child_text(fault, "faultactor");
    let detail = detail_entries(fault, "detail");

    Ok(ProtocolVersion::V1.build_envelope(FaultCode::new(value), reason, actor, None, None, detail))
}

fn parse_soap12(fault: &Element) -> Result<FaultEnvelope, WireError> {
    let code_element = fault
        .get_child("Code")
        .ok_or(WireError::MissingElement("Code"))?;
    let value_element = code_element
        .get_child("Value")
        .ok_or(WireError::MissingElement("Code/Value"))?;
    let value_text = value_element
        .get_text()
        .ok_or(WireError::MissingText("Code/Value"))?;
    let value = resolve_qname_text(value_text.trim(), &[value_element, fault]);

    let mut subcodes = Vec::new();
    let mut current = code_element.get_child("Subcode");
    while let Some(subcode) = current {
        let subcode_value = subcode
            .get_child("Value")
            .ok_or(WireError::MissingElement("Subcode/Value"))?;
        let subcode_text = subcode_value
            .get_text()
            .ok_or(WireError::MissingText("Subcode/Value"))?;
        subcodes.push(resolve_qname_text(subcode_text.trim(), &[subcode_value, fault]));
        current = subcode.get_child("Subcode");
    }
    let code = FaultCode::with_subcodes(value, &subcodes);

    let reason = fault
        .get_child("Reason")
        .and_then(|r| child_text(r, "Text"))
        .ok_or(WireError::MissingElement("Reason/Text"))?;
    let node = child_text(fault, "Node");
    let role = child_text(fault, "Role");
    let detail = detail_entries(fault, "Detail");

    Ok(ProtocolVersion::V2.build_envelope(code, reason, None, role, node, detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SOAP11_ENVELOPE_NS, SOAP12_ENVELOPE_NS};

    fn find_child<'a>(parent: &'a Element, name: &str) -> Option<&'a Element> {
        parent.get_child(name)
    }

    #[test]
    fn test_soap11_element_shape() {
        let envelope = ProtocolVersion::V1.build_envelope(
            FaultCode::new(QName::new(SOAP11_ENVELOPE_NS, "Server")),
            "boom".to_string(),
            Some("urn:actor".to_string()),
            None,
            None,
            Vec::new(),
        );
        let fault = envelope.to_element();
        assert_eq!(fault.name, "Fault");
        assert_eq!(fault.namespace.as_deref(), Some(SOAP11_ENVELOPE_NS));
        assert_eq!(
            find_child(&fault, "faultcode").unwrap().get_text().unwrap(),
            "env:Server"
        );
        assert_eq!(
            find_child(&fault, "faultstring").unwrap().get_text().unwrap(),
            "boom"
        );
        assert_eq!(
            find_child(&fault, "faultactor").unwrap().get_text().unwrap(),
            "urn:actor"
        );
        assert!(find_child(&fault, "detail").is_none());
    }

    #[test]
    fn test_soap12_roundtrip_preserves_subcode_order() {
        let code = FaultCode::with_subcodes(
            QName::new(SOAP12_ENVELOPE_NS, "Sender"),
            &[
                QName::new("urn:a", "A"),
                QName::new("urn:b", "B"),
                QName::new("urn:a", "C"),
            ],
        );
        let envelope = ProtocolVersion::V2.build_envelope(
            code,
            "rejected".to_string(),
            None,
            Some("urn:role".to_string()),
            Some("urn:node".to_string()),
            Vec::new(),
        );

        let parsed = FaultEnvelope::parse(ProtocolVersion::V2, &envelope.to_element()).unwrap();
        assert_eq!(parsed.code.value, QName::new(SOAP12_ENVELOPE_NS, "Sender"));
        let traversed: Vec<QName> = parsed.code.subcodes().cloned().collect();
        assert_eq!(
            traversed,
            vec![
                QName::new("urn:a", "A"),
                QName::new("urn:b", "B"),
                QName::new("urn:a", "C"),
            ]
        );
        assert_eq!(parsed.reason, "rejected");
        assert_eq!(parsed.role.as_deref(), Some("urn:role"));
        assert_eq!(parsed.node.as_deref(), Some("urn:node"));
    }

    #[test]
    fn test_parse_str_with_full_soap11_envelope() {
        let xml = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <s:Fault>
                        <faultcode>s:Server</faultcode>
                        <faultstring>Internal Error</faultstring>
                        <detail>
                            <e:Overflow xmlns:e="urn:example">
                                <limit>10</limit>
                            </e:Overflow>
                        </detail>
                    </s:Fault>
                </s:Body>
            </s:Envelope>
        "#;

        let envelope = FaultEnvelope::parse_str(ProtocolVersion::V1, xml).unwrap();
        assert_eq!(envelope.code.value, QName::new(SOAP11_ENVELOPE_NS, "Server"));
        assert_eq!(envelope.reason, "Internal Error");
        assert_eq!(
            envelope.first_detail_name(),
            Some(QName::new("urn:example", "Overflow"))
        );
    }

    #[test]
    fn test_parse_soap12_text_envelope() {
        let xml = r#"
            <env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
                <env:Body>
                    <env:Fault>
                        <env:Code>
                            <env:Value>env:Sender</env:Value>
                            <env:Subcode>
                                <env:Value xmlns:ns="urn:example">ns:Bad</env:Value>
                            </env:Subcode>
                        </env:Code>
                        <env:Reason>
                            <env:Text>rejected upstream</env:Text>
                        </env:Reason>
                    </env:Fault>
                </env:Body>
            </env:Envelope>
        "#;

        let envelope = FaultEnvelope::parse_str(ProtocolVersion::V2, xml).unwrap();
        assert_eq!(envelope.code.value, QName::new(SOAP12_ENVELOPE_NS, "Sender"));
        let subcodes: Vec<QName> = envelope.code.subcodes().cloned().collect();
        assert_eq!(subcodes, vec![QName::new("urn:example", "Bad")]);
        assert_eq!(envelope.reason, "rejected upstream");
    }

    #[test]
    fn test_parse_missing_faultcode() {
        let xml = r#"<Fault><faultstring>boom</faultstring></Fault>"#;
        let result = FaultEnvelope::parse_str(ProtocolVersion::V1, xml);
        assert!(matches!(result, Err(WireError::MissingElement("faultcode"))));
    }

    #[test]
    fn test_unresolvable_prefix_degrades_to_empty_namespace() {
        let xml = r#"<Fault><faultcode>nope:Server</faultcode><faultstring>x</faultstring></Fault>"#;
        let envelope = FaultEnvelope::parse_str(ProtocolVersion::V1, xml).unwrap();
        assert_eq!(envelope.code.value, QName::new("", "Server"));
    }

    #[test]
    fn test_detail_entries_survive_roundtrip() {
        let entry = Element::parse(r#"<e:Overflow xmlns:e="urn:example"><limit>3</limit></e:Overflow>"#.as_bytes())
            .unwrap();
        let envelope = ProtocolVersion::V2.build_envelope(
            FaultCode::new(QName::new(SOAP12_ENVELOPE_NS, "Receiver")),
            "overflow".to_string(),
            None,
            None,
            None,
            vec![entry],
        );
        let parsed = FaultEnvelope::parse(ProtocolVersion::V2, &envelope.to_element()).unwrap();
        assert_eq!(parsed.detail.len(), 1);
        assert_eq!(
            parsed.first_detail_name(),
            Some(QName::new("urn:example", "Overflow"))
        );
    }
}
