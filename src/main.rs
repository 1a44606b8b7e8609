use tracing_subscriber::EnvFilter;
use willa::prelude::*;

#[tokio::main]
async fn main() {
    init_tracing();

    let app = CliApp::new("willa");
    let args: Vec<String> = std::env::args().collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => std::process::exit(app.exit_code(Err(e))),
    };

    app.run(|stdout| async move {
        let registry = PipelineRegistry::with_builtins();
        command.execute(&registry, stdout).await
    })
    .await
}

/// Log to stderr, filtered by `WILLA_LOG` (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_env("WILLA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
