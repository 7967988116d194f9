fn main() {
    if let Err(err) = archboard::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
