use mongodb::{Client, bson::doc};

async fn ping(client: &Client) -> Result<(), mongodb::error::Error> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
}

/// Check MongoDB health with a `ping` command
///
/// # Example
/// ```ignore
/// use database::mongodb::check_health;
///
/// let healthy = check_health(&client).await;
/// ```
pub async fn check_health(client: &Client) -> bool {
    ping(client).await.is_ok()
}
