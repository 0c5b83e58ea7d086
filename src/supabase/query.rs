//! Query-string construction for the PostgREST dialect.
//!
//! Paths are assembled manually: filter values carry operator prefixes like
//! `eq.` that must reach the server without percent-encoding.

/// Builder for a table or view request under `/rest/v1/`.
#[derive(Debug, Clone, Default)]
pub struct TableQuery {
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<u32>,
}

impl TableQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Column projection (`select=id,title,name` or `select=*`).
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    /// Equality filter (`<column>=eq.<value>`). The value is used verbatim.
    #[must_use]
    pub fn filter_eq(mut self, column: &str, value: &str) -> Self {
        self.filters.push((column.to_string(), format!("eq.{value}")));
        self
    }

    #[must_use]
    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(format!("{column}.asc"));
        self
    }

    #[must_use]
    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(format!("{column}.desc"));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render the relative request path for `table`.
    #[must_use]
    pub fn to_path(&self, table: &str) -> String {
        let mut params: Vec<String> = Vec::new();

        if let Some(ref select) = self.select {
            params.push(format!("select={select}"));
        }
        for (column, condition) in &self.filters {
            params.push(format!("{column}={condition}"));
        }
        if let Some(ref order) = self.order {
            params.push(format!("order={order}"));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={limit}"));
        }

        if params.is_empty() {
            format!("/rest/v1/{table}")
        } else {
            format!("/rest/v1/{table}?{}", params.join("&"))
        }
    }
}

/// Path for invoking a remote procedure (`/rest/v1/rpc/<name>`).
#[must_use]
pub fn rpc_path(name: &str) -> String {
    format!("/rest/v1/rpc/{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_table_has_no_query_string() {
        assert_eq!(TableQuery::new().to_path("devices"), "/rest/v1/devices");
    }

    #[test]
    fn eq_filter_renders_verbatim() {
        let path = TableQuery::new()
            .filter_eq("id", "device_main_tank_001")
            .to_path("devices");
        assert_eq!(path, "/rest/v1/devices?id=eq.device_main_tank_001");
    }

    #[test]
    fn combined_parameters_are_joined() {
        let path = TableQuery::new()
            .select("id,title,name")
            .filter_eq("enabled", "true")
            .order_desc("device_created_at")
            .limit(10)
            .to_path("device_stats");
        assert_eq!(
            path,
            "/rest/v1/device_stats?select=id,title,name&enabled=eq.true&order=device_created_at.desc&limit=10"
        );
    }

    #[test]
    fn order_asc_renders_suffix() {
        let path = TableQuery::new().order_asc("created_at").to_path("sensor_data");
        assert_eq!(path, "/rest/v1/sensor_data?order=created_at.asc");
    }

    #[test]
    fn rpc_path_is_namespaced() {
        assert_eq!(rpc_path("get_device_stats"), "/rest/v1/rpc/get_device_stats");
    }
}
