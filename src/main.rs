use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists; must happen before any config is read from environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    match lbclone::cli::run_cli().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            lbclone::cli::report_error(&error);
            ExitCode::FAILURE
        }
    }
}
