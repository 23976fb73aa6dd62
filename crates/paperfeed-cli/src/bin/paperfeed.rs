fn main() {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")
        .and_then(|logger| logger.start())
        .map_err(|err| eprintln!("logger init failed: {err}"))
        .ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    std::process::exit(paperfeed_cli::run_cli(&args));
}
