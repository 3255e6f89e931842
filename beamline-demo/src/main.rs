mod cli;
mod stages;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = std::env::args().collect();

    let selection = match args.iter().position(|a| a == "--stage") {
        Some(index) => {
            let value = args
                .get(index + 1)
                .ok_or_else(|| anyhow::anyhow!("--stage needs a stage number"))?;
            Some(value.parse::<u32>()?)
        }
        None => None,
    };

    cli::run(selection)
}
