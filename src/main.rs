fn main() {
    if let Err(err) = table_audit::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
