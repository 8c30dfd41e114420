use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown use case `{0}`")]
    UnknownUseCase(String),
    #[error("tool `{tool}` requires argument `{argument}`")]
    MissingArgument { tool: String, argument: &'static str },
    #[error("tool `{0}` is not supported")]
    UnsupportedTool(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("product `{0}` not found")]
    ProductNotFound(String),
    #[error("precondition failed: {0}")]
    Precondition(String),
    #[error("upstream failure: {0}")]
    Upstream(String),
    #[error("too many tool calls without a final response (limit {limit})")]
    ToolBudgetExhausted { limit: u32 },
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("precondition failed: {message}")]
    PreconditionFailed { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => "The requested product could not be found.",
            Self::PreconditionFailed { .. } => {
                "The service is not ready for this request yet. See the error detail."
            }
            Self::ServiceUnavailable { .. } => {
                "A dependent service failed. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::NotFound { message, .. }
            | Self::PreconditionFailed { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::PreconditionFailed { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::PreconditionFailed { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let unassigned = || "unassigned".to_owned();
        match value {
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id: unassigned() }
            }
            error @ ApplicationError::ProductNotFound(_) => {
                Self::NotFound { message: error.to_string(), correlation_id: unassigned() }
            }
            ApplicationError::Precondition(message) => {
                Self::PreconditionFailed { message, correlation_id: unassigned() }
            }
            ApplicationError::Upstream(message) | ApplicationError::Persistence(message) => {
                Self::ServiceUnavailable { message, correlation_id: unassigned() }
            }
            error @ ApplicationError::ToolBudgetExhausted { .. } => {
                Self::Internal { message: error.to_string(), correlation_id: unassigned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: unassigned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn domain_error_maps_to_bad_request_interface_error() {
        let interface =
            ApplicationError::from(DomainError::UnknownUseCase("sauna".to_owned()))
                .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ref message,
            } if correlation_id == "req-1" && message.contains("sauna")
        ));
    }

    #[test]
    fn bad_request_has_user_safe_message() {
        let interface = ApplicationError::from(DomainError::MissingArgument {
            tool: "check_usage".to_owned(),
            argument: "use_case",
        })
        .into_interface("req-2");

        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn missing_product_maps_to_not_found() {
        let interface = ApplicationError::ProductNotFound("1001".to_owned()).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::NotFound { .. }));
        assert_eq!(interface.message(), "product `1001` not found");
        assert_eq!(interface.correlation_id(), "req-3");
    }

    #[test]
    fn missing_index_maps_to_precondition_failed() {
        let interface = ApplicationError::Precondition("semantic index not built".to_owned())
            .into_interface("req-4");

        assert!(matches!(interface, InterfaceError::PreconditionFailed { .. }));
    }

    #[test]
    fn upstream_error_maps_to_service_unavailable() {
        let interface =
            ApplicationError::Upstream("llm returned no content".to_owned()).into_interface("req-5");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(interface.user_message(), "A dependent service failed. Please retry shortly.");
    }

    #[test]
    fn exhausted_tool_budget_is_an_internal_error_not_a_validation_error() {
        let interface =
            ApplicationError::ToolBudgetExhausted { limit: 3 }.into_interface("req-6");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert!(interface.message().contains("too many tool calls"));
    }
}
