#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub project_name: String,
    pub region: String,
    pub model_id: String,
    pub access_token: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Service identifiers default to empty strings when unset; the first
    /// downstream call fails instead of startup.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").unwrap_or_default();

        let project_name = std::env::var("GCP_PROJECT_NAME").unwrap_or_default();
        let region = std::env::var("GCP_REGION").unwrap_or_default();
        let model_id = std::env::var("AUTOML_MODEL").unwrap_or_default();
        let access_token = std::env::var("GCP_ACCESS_TOKEN").unwrap_or_default();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        Ok(Self {
            database_url,
            project_name,
            region,
            model_id,
            access_token,
            host,
            port,
        })
    }
}
