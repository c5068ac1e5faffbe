//! Detail bridges: typed detail values to and from XML elements

use std::any::Any;
use std::marker::PhantomData;

use fault_wire::QName;
use serde::de::DeserializeOwned;
use serde::Serialize;
use xmltree::{Element, Namespace};

use crate::error::BridgeError;

/// Opaque detail value passed between a descriptor's codec and its bridge.
/// The translator never looks inside.
pub type DetailValue = Box<dyn Any + Send>;

/// Marshals a typed detail value to and from one XML element.
///
/// Bridges are supplied per descriptor by the offline model compiler.
/// Calls are synchronous, blocking and possibly failing; the translator
/// never invokes them while holding a lock.
pub trait DetailBridge: Send + Sync {
    fn marshal(&self, detail: &DetailValue) -> Result<Element, BridgeError>;
    fn unmarshal(&self, element: &Element) -> Result<DetailValue, BridgeError>;
}

/// Serde-backed bridge for plain data details, writing the value under the
/// descriptor's qualified detail name via `quick-xml`.
pub struct SerdeXmlBridge<T> {
    detail_name: QName,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeXmlBridge<T> {
    pub fn new(detail_name: QName) -> Self {
        Self {
            detail_name,
            _marker: PhantomData,
        }
    }
}

impl<T> DetailBridge for SerdeXmlBridge<T>
where
    T: Serialize + DeserializeOwned + Any + Send,
{
    fn marshal(&self, detail: &DetailValue) -> Result<Element, BridgeError> {
        let value = detail.downcast_ref::<T>().ok_or_else(|| {
            BridgeError::Marshal(format!(
                "detail value is not a {}",
                std::any::type_name::<T>()
            ))
        })?;
        let xml = quick_xml::se::to_string_with_root(&self.detail_name.local_name, value)
            .map_err(|e| BridgeError::Marshal(e.to_string()))?;
        let mut element =
            Element::parse(xml.as_bytes()).map_err(|e| BridgeError::Marshal(e.to_string()))?;
        if !self.detail_name.namespace_uri.is_empty() {
            element.namespace = Some(self.detail_name.namespace_uri.clone());
            let mut bindings = Namespace::empty();
            bindings.put("", self.detail_name.namespace_uri.as_str());
            element.namespaces = Some(bindings);
        }
        Ok(element)
    }

    fn unmarshal(&self, element: &Element) -> Result<DetailValue, BridgeError> {
        let mut buffer = Vec::new();
        element
            .write(&mut buffer)
            .map_err(|e| BridgeError::Unmarshal(e.to_string()))?;
        let text =
            String::from_utf8(buffer).map_err(|e| BridgeError::Unmarshal(e.to_string()))?;
        let value: T =
            quick_xml::de::from_str(&text).map_err(|e| BridgeError::Unmarshal(e.to_string()))?;
        Ok(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct OverflowDetail {
        limit: u32,
        attempted: u32,
    }

    fn bridge() -> SerdeXmlBridge<OverflowDetail> {
        SerdeXmlBridge::new(QName::new("urn:example", "Overflow"))
    }

    #[test]
    fn test_marshal_uses_detail_name() {
        let detail: DetailValue = Box::new(OverflowDetail {
            limit: 10,
            attempted: 42,
        });
        let element = bridge().marshal(&detail).unwrap();
        assert_eq!(element.name, "Overflow");
        assert_eq!(element.namespace.as_deref(), Some("urn:example"));
        assert_eq!(
            element.get_child("limit").unwrap().get_text().unwrap(),
            "10"
        );
    }

    #[test]
    fn test_roundtrip() {
        let original = OverflowDetail {
            limit: 10,
            attempted: 42,
        };
        let detail: DetailValue = Box::new(original.clone());
        let element = bridge().marshal(&detail).unwrap();
        let back = bridge().unmarshal(&element).unwrap();
        assert_eq!(back.downcast_ref::<OverflowDetail>(), Some(&original));
    }

    #[test]
    fn test_marshal_rejects_wrong_detail_type() {
        let detail: DetailValue = Box::new("not a detail".to_string());
        let result = bridge().marshal(&detail);
        assert!(matches!(result, Err(BridgeError::Marshal(_))));
    }

    #[test]
    fn test_unmarshal_rejects_malformed_entry() {
        let element = Element::parse(r#"<Overflow><limit>oops</limit></Overflow>"#.as_bytes())
            .unwrap();
        let result = bridge().unmarshal(&element);
        assert!(matches!(result, Err(BridgeError::Unmarshal(_))));
    }
}
