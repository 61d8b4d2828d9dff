use amazon_pay::ApiClient;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let client = ApiClient::from_env().expect("Failed to create API client");

    println!("Checking service status...");
    match client.get_service_status().await {
        Ok(response) if response.is_success() => {
            println!("Service status ({}):\n{}", response.status, response.body);
        }
        Ok(response) => match response.error_response() {
            Some(error) => eprintln!("Service returned {}: {} ({})", response.status, error.code, error.message),
            None => eprintln!("Service returned {}:\n{}", response.status, response.body),
        },
        Err(e) => {
            eprintln!("Error calling GetServiceStatus: {:?}", e);
        }
    }
}
