// src/main.rs

use kubelint::{cli, logging, run};

fn main() {
    match run_main() {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("kubelint error: {err:?}");
            std::process::exit(2);
        }
    }
}

fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    let summary = run(args)?;
    Ok(summary.exit_code())
}
