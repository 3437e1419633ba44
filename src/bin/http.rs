#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use quarterly_tasks::http_api;

    let addr: SocketAddr = std::env::var("QUARTERLY_TASKS_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    println!("quarterly-tasks HTTP API listening on http://{addr}");

    #[cfg(feature = "sqlite")]
    {
        let db_path = std::env::var("QUARTERLY_TASKS_DB")
            .unwrap_or_else(|_| "quarterly-tasks.db".to_string());
        let store = quarterly_tasks::SqliteStore::new(&db_path)?;
        http_api::serve(addr, store).await?;
    }
    #[cfg(not(feature = "sqlite"))]
    {
        let store = quarterly_tasks::MemoryStore::new();
        http_api::serve(addr, store).await?;
    }
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
