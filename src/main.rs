fn main() {
    if let Err(e) = emma_lib::run() {
        eprintln!("emma: {}", e);
        std::process::exit(1);
    }
}
