#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    neuroflow_lib::run().await
}
