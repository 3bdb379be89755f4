#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lib_actor_host::init().await
}
