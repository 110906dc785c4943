use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    interact_mcp::run().await
}
