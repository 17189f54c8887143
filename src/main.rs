fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = memo::entry() {
        eprintln!("memo: {err}");
        std::process::exit(1);
    }
}
