fn main() {
    if let Err(err) = reservecraft::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
