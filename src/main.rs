// src/main.rs

use cmdrun::{EXIT_TOOL_FAILURE, cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("cmdrun error: {err:?}");
            std::process::exit(EXIT_TOOL_FAILURE);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
