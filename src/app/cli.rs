use std::future::Future;

use tracing::{error, warn};

use super::error::AppError;

/// Reusable CLI application runner that handles:
/// - Signal handling (SIGINT, SIGTERM, SIGHUP)
/// - Stdout buffering
/// - Exit codes (0 = success, 1 = error, 130 = SIGINT, 143 = SIGTERM, 129 = SIGHUP)
pub struct CliApp {
    name: String,
}

impl CliApp {
    /// Create a new CLI application runner
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the CLI application with signal handling
    ///
    /// The main function receives a buffered stdout writer and is responsible
    /// for flushing it. Never returns; exits the process with the code for
    /// the outcome.
    pub async fn run<F, Fut>(self, main_fn: F) -> !
    where
        F: FnOnce(tokio::io::BufWriter<tokio::io::Stdout>) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let writer = tokio::io::BufWriter::new(tokio::io::stdout());

        let code = tokio::select! {
            result = main_fn(writer) => self.exit_code(result),
            signal_code = wait_for_signal() => signal_code,
        };
        std::process::exit(code)
    }

    /// Report a failure on stderr and map the outcome to an exit code
    pub fn exit_code(&self, result: Result<(), AppError>) -> i32 {
        match result {
            Ok(()) => 0,
            Err(e) => {
                error!(error = %e, "Command failed");
                eprintln!("{}: {}", self.name, e);
                1
            }
        }
    }
}

/// Wait for any Unix signal (SIGINT, SIGTERM, SIGHUP) or Ctrl+C
///
/// Returns the exit code to use. Pends forever if handlers cannot be installed.
async fn wait_for_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (Ok(mut sigterm), Ok(mut sigint), Ok(mut sighup)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
            signal(SignalKind::hangup()),
        ) else {
            warn!("Failed to install signal handlers");
            return std::future::pending().await;
        };

        tokio::select! {
            _ = sigterm.recv() => {
                eprintln!("Received SIGTERM");
                143 // 128 + 15
            }
            _ = sigint.recv() => {
                eprintln!("Received SIGINT");
                130 // 128 + 2
            }
            _ = sighup.recv() => {
                eprintln!("Received SIGHUP");
                129 // 128 + 1
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            return std::future::pending().await;
        }
        eprintln!("Received Ctrl+C");
        130
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_app_new() {
        let app = CliApp::new("test-app");
        assert_eq!(app.name(), "test-app");
    }

    #[test]
    fn exit_codes_follow_outcome() {
        let app = CliApp::new("test-app");
        assert_eq!(app.exit_code(Ok(())), 0);
        assert_eq!(
            app.exit_code(Err(AppError::InvalidArguments("nope".to_string()))),
            1
        );
    }
}
