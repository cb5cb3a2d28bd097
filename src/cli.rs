use habitual::Cli;

fn main() -> anyhow::Result<()> {
    Cli::run()
}
