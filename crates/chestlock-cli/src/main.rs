use chestlock_cli::CliResult;

#[tokio::main]
async fn main() -> CliResult<()> {
    chestlock_cli::run().await
}
