//! Custom exit codes for the zcrm application
//!
//! This module defines specific exit codes for different error
//! conditions to make scripting and automation easier.

/// Custom exit codes for zcrm
///
/// These codes follow the BSD sysexits.h conventions where possible:
/// - 0: Success
/// - 64-78: Standard exit codes from sysexits.h
/// - 100+: Custom application-specific codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZcrmExitCode {
    /// Success (0) - Command completed successfully
    Success = 0,

    /// Command line usage error (64) - User input error
    UsageError = 64,

    /// Data format error (65) - Input data was incorrect
    DataError = 65,

    /// Internal software error (70) - Unexpected application error
    SoftwareError = 70,

    /// Configuration error (78) - Application configuration issue
    ConfigError = 78,

    /// Authentication error (100) - Login or token issues
    AuthError = 100,

    /// Network error (101) - Connection or communication issues
    NetworkError = 101,

    /// API error (102) - Remote API returned an error
    ApiError = 102,
}

impl ZcrmExitCode {
    /// Convert to numeric exit code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get descriptive message for the exit code
    pub fn message(&self) -> &'static str {
        match self {
            ZcrmExitCode::Success => "Success",
            ZcrmExitCode::UsageError => "Command line usage error",
            ZcrmExitCode::DataError => "Data format error",
            ZcrmExitCode::SoftwareError => "Internal software error",
            ZcrmExitCode::ConfigError => "Configuration error",
            ZcrmExitCode::AuthError => "Authentication error",
            ZcrmExitCode::NetworkError => "Network communication error",
            ZcrmExitCode::ApiError => "Remote API error",
        }
    }
}

impl From<ZcrmExitCode> for i32 {
    fn from(code: ZcrmExitCode) -> Self {
        code.code()
    }
}
