use serqlite::{Connection, Serqlite, Server};

const TEST_SCHEMA: &str = include_str!("setup.sql");

// Make a new private in-memory connection
pub fn connection() -> anyhow::Result<Connection> {
    Ok(Serqlite::new().open()?)
}

/// Open a connection to a named shared-cache in-memory database.
///
/// Every connection opened with the same `name` sees the same data for as long as at
/// least one of them stays open.
pub fn shared_connection(name: &str) -> anyhow::Result<Connection> {
    Ok(Serqlite::new().shared_memory(name).open()?)
}

/// Return a connection to a database pre-configured with our test schema.
pub fn tdb() -> anyhow::Result<Connection> {
    let conn = connection()?;
    conn.exec(TEST_SCHEMA)?;
    Ok(conn)
}

/// Start a server on a fresh in-memory database with the test schema applied.
pub async fn server() -> anyhow::Result<Server> {
    server_with(Serqlite::new()).await
}

/// Start a server with custom options and apply the test schema.
pub async fn server_with(options: Serqlite) -> anyhow::Result<Server> {
    let server = options.start().await?;
    server.exec(TEST_SCHEMA).await?;
    Ok(server)
}
