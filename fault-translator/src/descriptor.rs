//! Descriptor model supplied by the offline WSDL/schema compiler
//!
//! The compiler maps each declared checked exception to a qualified detail
//! name, a variant, a bridge and a codec pair. The table is built once and
//! read-only for the process lifetime; concurrent lookups need no
//! synchronization.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use fault_wire::QName;

use crate::bridge::DetailBridge;
use crate::codec::ExceptionCodec;

/// How a declared exception relates to its wire detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailVariant {
    /// The exception exposes a dedicated fault-info value.
    Generic,
    /// The detail is the exception itself, or a mapped copy of it.
    UserDefined,
}

/// Immutable mapping from one qualified detail name to the exception type
/// behind it.
#[derive(Clone)]
pub struct ExceptionDescriptor {
    detail_name: QName,
    variant: DetailVariant,
    bridge: Arc<dyn DetailBridge>,
    codec: Arc<dyn ExceptionCodec>,
}

impl ExceptionDescriptor {
    pub fn new(
        detail_name: QName,
        variant: DetailVariant,
        bridge: Arc<dyn DetailBridge>,
        codec: Arc<dyn ExceptionCodec>,
    ) -> Self {
        Self {
            detail_name,
            variant,
            bridge,
            codec,
        }
    }

    pub fn detail_name(&self) -> &QName {
        &self.detail_name
    }

    pub fn variant(&self) -> DetailVariant {
        self.variant
    }

    pub fn bridge(&self) -> &dyn DetailBridge {
        self.bridge.as_ref()
    }

    pub fn codec(&self) -> &dyn ExceptionCodec {
        self.codec.as_ref()
    }
}

impl fmt::Debug for ExceptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionDescriptor")
            .field("detail_name", &self.detail_name)
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

/// Lookup service over the compiled descriptors of one service contract.
#[derive(Clone, Default)]
pub struct DescriptorTable {
    entries: HashMap<QName, ExceptionDescriptor>,
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its qualified detail name. Intended for
    /// table construction only; tables are read-only once translation
    /// starts.
    pub fn insert(&mut self, descriptor: ExceptionDescriptor) {
        self.entries
            .insert(descriptor.detail_name().clone(), descriptor);
    }

    pub fn lookup(&self, detail_name: &QName) -> Option<&ExceptionDescriptor> {
        self.entries.get(detail_name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl FromIterator<ExceptionDescriptor> for DescriptorTable {
    fn from_iter<I: IntoIterator<Item = ExceptionDescriptor>>(iter: I) -> Self {
        let mut table = Self::new();
        for descriptor in iter {
            table.insert(descriptor);
        }
        table
    }
}

impl fmt::Debug for DescriptorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k.to_string(), v.variant())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::SerdeXmlBridge;
    use crate::codec::MappedCodec;
    use crate::fault::ServiceFault;
    use serde::{Deserialize, Serialize};
    use std::any::Any;

    #[derive(Debug)]
    struct LimitError {
        message: String,
        limit: u32,
    }

    impl std::fmt::Display for LimitError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for LimitError {}

    impl ServiceFault for LimitError {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct LimitDetail {
        limit: u32,
    }

    fn descriptor(name: QName) -> ExceptionDescriptor {
        ExceptionDescriptor::new(
            name.clone(),
            DetailVariant::Generic,
            Arc::new(SerdeXmlBridge::<LimitDetail>::new(name)),
            Arc::new(MappedCodec::<LimitError, LimitDetail>::new(
                |e| LimitDetail { limit: e.limit },
                |reason, d| LimitError {
                    message: reason,
                    limit: d.limit,
                },
            )),
        )
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let name = QName::new("urn:example", "Limit");
        let table: DescriptorTable = [descriptor(name.clone())].into_iter().collect();

        assert!(!table.is_empty());
        assert_eq!(table.len(), 1);
        let hit = table.lookup(&name).unwrap();
        assert_eq!(hit.variant(), DetailVariant::Generic);
        assert!(table.lookup(&QName::new("urn:example", "Other")).is_none());
    }

    #[test]
    fn test_empty_table() {
        let table = DescriptorTable::new();
        assert!(table.is_empty());
        assert!(table.lookup(&QName::new("urn:example", "Limit")).is_none());
    }
}
