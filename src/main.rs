#[tokio::main]
async fn main() {
    cliptrail_lib::run().await
}
