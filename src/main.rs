// Flipper Remote - Flipper Zero serial console client
use clap::Parser;
use flipper_remote::cli::args::Args;
use flipper_remote::cli::commands::execute_command;
use flipper_remote::cli::output::{ConsoleWriter, OutputWriter};
use flipper_remote::FlipperError;

#[tokio::main]
async fn main() -> Result<(), FlipperError> {
    let args = Args::parse();
    let writer = ConsoleWriter::new(args.output.clone());

    match execute_command(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if writer.write_error(&e.to_string()).is_err() {
                eprintln!("Error: {}", e);
            }
            std::process::exit(1);
        }
    }
}
