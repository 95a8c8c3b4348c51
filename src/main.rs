use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    ghost_mcp::infra::logging::init();
    ghost_mcp::cli::run().await
}
