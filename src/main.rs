#[tokio::main]
async fn main() {
    if let Err(e) = arogya_bridge::run().await {
        eprintln!("fatal: {e}");
        std::process::exit(1);
    }
}
