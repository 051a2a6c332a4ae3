fn main() {
    #[cfg(feature = "cli")]
    rollsync::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("rollsync: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
