//! Tool and tool-server queries.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::models::{Tool, ToolServer};

/// Create a new tool, returning the assigned id.
pub async fn create_tool(pool: &SqlitePool, tool: &Tool) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO tools (created_at, updated_at, user_id, version, component, server_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(tool.created_at)
    .bind(tool.updated_at)
    .bind(&tool.user_id)
    .bind(&tool.version)
    .bind(&tool.component)
    .bind(tool.server_id)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Get a tool by id.
pub async fn get_tool(pool: &SqlitePool, id: i64) -> DbResult<Option<Tool>> {
    let tool = sqlx::query_as::<_, Tool>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, component, server_id
        FROM tools WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(tool)
}

/// List the tools a server provides.
pub async fn list_tools_for_server(pool: &SqlitePool, server_id: i64) -> DbResult<Vec<Tool>> {
    let tools = sqlx::query_as::<_, Tool>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, component, server_id
        FROM tools WHERE server_id = ? ORDER BY id ASC
        "#,
    )
    .bind(server_id)
    .fetch_all(pool)
    .await?;
    Ok(tools)
}

/// Delete a tool.
pub async fn delete_tool(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM tools WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Create a new tool server, returning the assigned id.
pub async fn create_tool_server(pool: &SqlitePool, server: &ToolServer) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO tool_servers (created_at, updated_at, user_id, version, last_connected, component)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(server.created_at)
    .bind(server.updated_at)
    .bind(&server.user_id)
    .bind(&server.version)
    .bind(server.last_connected)
    .bind(&server.component)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Get a tool server by id.
pub async fn get_tool_server(pool: &SqlitePool, id: i64) -> DbResult<Option<ToolServer>> {
    let server = sqlx::query_as::<_, ToolServer>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, last_connected, component
        FROM tool_servers WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(server)
}

/// List all tool servers.
pub async fn list_tool_servers(pool: &SqlitePool) -> DbResult<Vec<ToolServer>> {
    let servers = sqlx::query_as::<_, ToolServer>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, last_connected, component
        FROM tool_servers ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(servers)
}

/// Record a successful contact with the server.
pub async fn mark_server_connected(
    pool: &SqlitePool,
    id: i64,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result =
        sqlx::query("UPDATE tool_servers SET last_connected = ?, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a tool server.
pub async fn delete_tool_server(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM tool_servers WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::StudioDb;
    use chrono::Duration;
    use troupe_core::{Clock, ComponentModel, ComponentType, ManualClock};

    fn test_clock() -> ManualClock {
        ManualClock::new("2024-01-01T00:00:00Z".parse().unwrap())
    }

    #[tokio::test]
    async fn server_tracks_last_connected() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();

        let server = ToolServer::new(
            ComponentModel::new("troupe.tools.McpServer").with_label("search"),
            clock.now(),
        )
        .unwrap();
        let id = create_tool_server(db.pool(), &server).await.unwrap();

        let fresh = get_tool_server(db.pool(), id).await.unwrap().unwrap();
        assert!(fresh.last_connected.is_none());

        clock.advance(Duration::minutes(1));
        assert!(mark_server_connected(db.pool(), id, clock.now())
            .await
            .unwrap());

        let connected = get_tool_server(db.pool(), id).await.unwrap().unwrap();
        assert_eq!(connected.last_connected, Some(clock.now()));
        assert!(connected.updated_at > connected.created_at);
    }

    #[tokio::test]
    async fn tools_list_by_server() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();

        let server = ToolServer::new(ComponentModel::new("troupe.tools.McpServer"), clock.now())
            .unwrap();
        let server_id = create_tool_server(db.pool(), &server).await.unwrap();

        for name in ["fetch", "grep"] {
            let tool = Tool::new(
                ComponentModel::new("troupe.tools.McpTool")
                    .with_type(ComponentType::Tool)
                    .with_label(name),
                Some(server_id),
                clock.now(),
            )
            .unwrap();
            create_tool(db.pool(), &tool).await.unwrap();
        }
        // A standalone tool that belongs to no server
        let standalone = Tool::new(
            ComponentModel::new("troupe.tools.FunctionTool"),
            None,
            clock.now(),
        )
        .unwrap();
        create_tool(db.pool(), &standalone).await.unwrap();

        let tools = list_tools_for_server(db.pool(), server_id).await.unwrap();
        assert_eq!(tools.len(), 2);
        assert!(tools.iter().all(|t| t.server_id == Some(server_id)));
    }
}
