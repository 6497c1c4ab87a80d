/// Server-level error types shared by the HTTP API and the live update endpoint
use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{}", describe_bind_failure(.addr, .source))]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read local address: {0}")]
    LocalAddr(#[source] io::Error),

    #[error("Server error: {0}")]
    Serve(#[source] io::Error),
}

impl ServerError {
    /// True when the port is already taken by another process
    pub fn is_addr_in_use(&self) -> bool {
        matches!(self, ServerError::Bind { source, .. } if source.kind() == io::ErrorKind::AddrInUse)
    }
}

/// Human-readable bind failure with hints for the common cases
fn describe_bind_failure(addr: &str, source: &io::Error) -> String {
    match source.kind() {
        io::ErrorKind::AddrInUse => format!(
            "Failed to bind to {}: Address already in use\n\
             \n\
             Another orderdesk instance (or another service) owns this port.\n\
             Stop it or choose a different port in the config / environment.",
            addr
        ),
        io::ErrorKind::PermissionDenied => format!(
            "Failed to bind to {}: Permission denied\n\
             \n\
             Consider using a port above 1024 or running with appropriate permissions.",
            addr
        ),
        _ => format!("Failed to bind to {}: {}", addr, source),
    }
}
