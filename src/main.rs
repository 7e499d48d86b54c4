use kcbtrack::utils::Console;

fn main() {
    if let Err(e) = kcbtrack::app::run_cli() {
        Console::new(0).error(e);
        std::process::exit(1);
    }
}
