//! Statically generated exception/detail conversion pairs
//!
//! The offline model compiler emits one codec per declared exception. Each
//! codec is a plain pair of functions: one deriving the detail value carried
//! on the wire, one reconstructing the exception from a received detail.
//! There is no runtime reflection; a codec that cannot handle the value it
//! is given reports an error, which the translator treats as a model
//! mismatch.

use std::any::Any;
use std::marker::PhantomData;

use crate::bridge::DetailValue;
use crate::error::CodecError;
use crate::fault::ServiceFault;

/// Conversion pair between an exception type and its wire detail value.
pub trait ExceptionCodec: Send + Sync {
    /// Derive the detail value to marshal for `source`.
    fn to_detail(&self, source: &dyn ServiceFault) -> Result<DetailValue, CodecError>;

    /// Reconstruct the exception from an unmarshaled detail value and the
    /// received reason text.
    fn from_detail(
        &self,
        detail: DetailValue,
        reason: &str,
    ) -> Result<Box<dyn ServiceFault>, CodecError>;
}

/// Codec for user-defined exceptions whose detail type is the exception
/// itself: the wire detail is the exception, so both directions are moves
/// of the same value.
pub struct IdentityCodec<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> IdentityCodec<E> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for IdentityCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ExceptionCodec for IdentityCodec<E>
where
    E: ServiceFault + Clone,
{
    fn to_detail(&self, source: &dyn ServiceFault) -> Result<DetailValue, CodecError> {
        let source = source.as_any().downcast_ref::<E>().ok_or_else(|| {
            CodecError::Detail(format!(
                "source error is not a {}",
                std::any::type_name::<E>()
            ))
        })?;
        Ok(Box::new(source.clone()))
    }

    fn from_detail(
        &self,
        detail: DetailValue,
        _reason: &str,
    ) -> Result<Box<dyn ServiceFault>, CodecError> {
        // The unmarshaled value already is the exception; the reason text
        // adds nothing it does not carry itself.
        let exception = detail.downcast::<E>().map_err(|_| {
            CodecError::Construction(format!(
                "detail value is not a {}",
                std::any::type_name::<E>()
            ))
        })?;
        Ok(exception)
    }
}

/// Codec backed by an explicit function pair, covering both the generic
/// variant (dedicated fault-info accessor) and user-defined exceptions with
/// a separate detail type (the compiler generates the field mapping that
/// used to be done reflectively).
pub struct MappedCodec<E, D> {
    to_detail: fn(&E) -> D,
    from_detail: fn(String, D) -> E,
}

impl<E, D> MappedCodec<E, D> {
    pub fn new(to_detail: fn(&E) -> D, from_detail: fn(String, D) -> E) -> Self {
        Self {
            to_detail,
            from_detail,
        }
    }
}

impl<E, D> ExceptionCodec for MappedCodec<E, D>
where
    E: ServiceFault,
    D: Any + Send,
{
    fn to_detail(&self, source: &dyn ServiceFault) -> Result<DetailValue, CodecError> {
        let source = source.as_any().downcast_ref::<E>().ok_or_else(|| {
            CodecError::Detail(format!(
                "source error is not a {}",
                std::any::type_name::<E>()
            ))
        })?;
        Ok(Box::new((self.to_detail)(source)))
    }

    fn from_detail(
        &self,
        detail: DetailValue,
        reason: &str,
    ) -> Result<Box<dyn ServiceFault>, CodecError> {
        let detail = detail.downcast::<D>().map_err(|_| {
            CodecError::Construction(format!(
                "detail value is not a {}",
                std::any::type_name::<D>()
            ))
        })?;
        Ok(Box::new((self.from_detail)(reason.to_string(), *detail)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug, Clone, PartialEq)]
    struct QuotaError {
        message: String,
        limit: u32,
    }

    impl fmt::Display for QuotaError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for QuotaError {}

    impl ServiceFault for QuotaError {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct QuotaDetail {
        limit: u32,
    }

    #[test]
    fn test_identity_codec_roundtrip() {
        let codec = IdentityCodec::<QuotaError>::new();
        let original = QuotaError {
            message: "over quota".to_string(),
            limit: 5,
        };

        let detail = codec.to_detail(&original).unwrap();
        let back = codec.from_detail(detail, "ignored").unwrap();
        let back = back.as_any().downcast_ref::<QuotaError>().unwrap();
        assert_eq!(back, &original);
    }

    #[test]
    fn test_identity_codec_rejects_foreign_error() {
        #[derive(Debug, Clone)]
        struct Other;
        impl fmt::Display for Other {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "other")
            }
        }
        impl std::error::Error for Other {}
        impl ServiceFault for Other {
            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let codec = IdentityCodec::<QuotaError>::new();
        assert!(matches!(
            codec.to_detail(&Other),
            Err(CodecError::Detail(_))
        ));
    }

    #[test]
    fn test_mapped_codec_uses_reason() {
        let codec = MappedCodec::<QuotaError, QuotaDetail>::new(
            |e| QuotaDetail { limit: e.limit },
            |reason, d| QuotaError {
                message: reason,
                limit: d.limit,
            },
        );

        let source = QuotaError {
            message: "over quota".to_string(),
            limit: 5,
        };
        let detail = codec.to_detail(&source).unwrap();
        let rebuilt = codec.from_detail(detail, "over quota").unwrap();
        let rebuilt = rebuilt.as_any().downcast_ref::<QuotaError>().unwrap();
        assert_eq!(rebuilt, &source);
    }

    #[test]
    fn test_mapped_codec_rejects_wrong_detail_type() {
        let codec = MappedCodec::<QuotaError, QuotaDetail>::new(
            |e| QuotaDetail { limit: e.limit },
            |reason, d| QuotaError {
                message: reason,
                limit: d.limit,
            },
        );
        let detail: DetailValue = Box::new(17u64);
        assert!(matches!(
            codec.from_detail(detail, "x"),
            Err(CodecError::Construction(_))
        ));
    }
}
