fn main() {
    if let Err(err) = kopcup::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
