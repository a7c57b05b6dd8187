use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced at the transport boundary. The pipeline itself never
/// leaks an error to the end user: resolution misses are ordinary
/// `QueryResolution` outcomes and collaborator faults are masked behind
/// fallback copy, so only malformed input and genuine service faults
/// reach this layer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn bad_request(message: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into(), correlation_id: correlation_id.into() }
    }

    /// User-safe reply text; the detailed message stays in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "Please enter a message.",
            Self::ServiceUnavailable { .. } | Self::Internal { .. } => {
                "Sorry, I encountered an error while processing your request. Please try again."
            }
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl StoreError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        InterfaceError::ServiceUnavailable {
            message: self.to_string(),
            correlation_id: correlation_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::InterfaceError;
    use crate::store::StoreError;

    #[test]
    fn store_failure_maps_to_service_unavailable_with_correlation_id() {
        let interface =
            StoreError::Unavailable("connection refused".to_string()).into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::ServiceUnavailable { ref correlation_id, .. } if correlation_id == "req-1"
        ));
    }

    #[test]
    fn bad_request_has_user_safe_message() {
        let interface = InterfaceError::bad_request("empty message body", "req-2");
        assert_eq!(interface.user_message(), "Please enter a message.");
        assert_eq!(interface.correlation_id(), "req-2");
    }

    #[test]
    fn service_faults_share_the_generic_user_copy() {
        let unavailable =
            StoreError::Decode("missing order_id column".to_string()).into_interface("req-3");

        assert_eq!(
            unavailable.user_message(),
            "Sorry, I encountered an error while processing your request. Please try again."
        );
    }
}
