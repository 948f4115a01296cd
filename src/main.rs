use conch::flags::Flags;
use conch::logging::init_logging;
use conch::shell::{run_once, Shell};
use std::env;

fn main() -> Result<(), conch::error::ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(());
    }

    if flags.is_set("version") {
        println!("Conch {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(flags.is_set("debug"))?;

    let status = match flags.get_value("command").cloned() {
        Some(line) => run_once(&flags, line)?,
        None => Shell::new(flags)?.run()?,
    };
    std::process::exit(status)
}
