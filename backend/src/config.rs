//! Runtime configuration, read from the environment (a `.env` file in the
//! working directory is loaded first when present).

use std::env;
use std::io;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub fonts_dir: PathBuf,
    pub font_family: String,
    pub reports_dir: PathBuf,
    /// Placeholder and non-teaching staff records hidden from every listing.
    pub excluded_teacher_ids: Vec<String>,
    /// When set, only accounts under this email domain are accepted.
    pub school_email_domain: Option<String>,
    pub admin_token: Option<String>,
    pub admin_email: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from("teaching_hours.sqlite"),
            fonts_dir: PathBuf::from("./fonts"),
            font_family: "LiberationSans".to_string(),
            reports_dir: PathBuf::from("./reports"),
            excluded_teacher_ids: Vec::new(),
            school_email_domain: None,
            admin_token: None,
            admin_email: "admin@localhost".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> io::Result<Self> {
        let _ = dotenv::dotenv();
        let defaults = AppConfig::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("PORT must be a port number, got {:?}: {}", raw, e),
                )
            })?,
            Err(_) => defaults.port,
        };

        Ok(AppConfig {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            fonts_dir: env::var("FONTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.fonts_dir),
            font_family: env::var("FONT_FAMILY").unwrap_or(defaults.font_family),
            reports_dir: env::var("REPORTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.reports_dir),
            excluded_teacher_ids: env::var("EXCLUDED_TEACHER_IDS")
                .map(|raw| parse_id_list(&raw))
                .unwrap_or_default(),
            school_email_domain: env::var("SCHOOL_EMAIL_DOMAIN")
                .ok()
                .map(|d| d.trim().trim_start_matches('@').to_lowercase())
                .filter(|d| !d.is_empty()),
            admin_token: env::var("ADMIN_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            admin_email: env::var("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
        })
    }

    pub fn bind_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_id_list;

    #[test]
    fn id_list_ignores_blanks() {
        assert_eq!(parse_id_list(" a, ,b,,c "), vec!["a", "b", "c"]);
        assert!(parse_id_list("").is_empty());
    }
}
