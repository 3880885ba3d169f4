#[tokio::main]
async fn main() {
    if let Err(e) = radiolens::run().await {
        eprintln!("radiolens: {e}");
        std::process::exit(1);
    }
}
