use crate::QName;

/// One link in the version-2 subcode chain.
///
/// Subcodes form a singly linked, order-preserving chain under a
/// [`FaultCode`]. Version-1 codes never carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcode {
    pub value: QName,
    pub subcode: Option<Box<Subcode>>,
}

/// Fault code: a primary qualified name plus, for protocol version 2, an
/// optional subcode chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultCode {
    pub value: QName,
    pub subcode: Option<Box<Subcode>>,
}

impl FaultCode {
    pub fn new(value: QName) -> Self {
        Self { value, subcode: None }
    }

    /// Build a code carrying the given subcode values, preserving order:
    /// `subcodes[0]` becomes the first link of the chain.
    pub fn with_subcodes(value: QName, subcodes: &[QName]) -> Self {
        let mut chain = None;
        for subcode in subcodes.iter().rev() {
            chain = Some(Box::new(Subcode {
                value: subcode.clone(),
                subcode: chain,
            }));
        }
        Self { value, subcode: chain }
    }

    /// Traverse the subcode chain in construction order.
    pub fn subcodes(&self) -> Subcodes<'_> {
        Subcodes {
            next: self.subcode.as_deref(),
        }
    }

    /// The same code with the subcode chain removed. Used by the version-1
    /// adapter, which has no subcode concept.
    pub fn without_subcodes(&self) -> Self {
        Self::new(self.value.clone())
    }
}

/// Iterator over the subcode values of a [`FaultCode`].
pub struct Subcodes<'a> {
    next: Option<&'a Subcode>,
}

impl<'a> Iterator for Subcodes<'a> {
    type Item = &'a QName;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.subcode.as_deref();
        Some(&current.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(local: &str) -> QName {
        QName::new("urn:test", local)
    }

    #[test]
    fn test_plain_code_has_no_subcodes() {
        let code = FaultCode::new(name("Server"));
        assert_eq!(code.subcodes().count(), 0);
    }

    #[test]
    fn test_subcode_chain_preserves_order() {
        let code = FaultCode::with_subcodes(name("Sender"), &[name("A"), name("B"), name("C")]);
        let traversed: Vec<&str> = code.subcodes().map(|q| q.local_name.as_str()).collect();
        assert_eq!(traversed, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_with_empty_subcode_slice() {
        let code = FaultCode::with_subcodes(name("Sender"), &[]);
        assert!(code.subcode.is_none());
    }

    #[test]
    fn test_without_subcodes() {
        let code = FaultCode::with_subcodes(name("Sender"), &[name("Bad")]);
        let stripped = code.without_subcodes();
        assert_eq!(stripped.value, name("Sender"));
        assert!(stripped.subcode.is_none());
    }
}
