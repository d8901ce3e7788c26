fn main() {
    if let Err(error) = splitflash_cli::run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
