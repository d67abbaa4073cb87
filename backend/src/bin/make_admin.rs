//! Grant the admin role to an existing user.
//!
//! Runs against the same database as the server; there is deliberately no
//! HTTP surface for creating admins.
//!
//! ```text
//! DATABASE_URL=postgres://... make-admin alice
//! ```

use std::env;

use clap::Parser;
use diesel::prelude::*;

#[derive(Parser)]
#[command(about = "Grant the admin role to an existing user")]
struct Args {
    /// Username to promote.
    username: String,

    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn resolve_database_url(cli: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(url) = cli {
        if url.trim().is_empty() {
            return Err("--database-url must not be empty when provided".into());
        }
        return Ok(url);
    }
    let from_env = env::var("DATABASE_URL")
        .map_err(|_| "database URL missing: set --database-url or DATABASE_URL")?;
    if from_env.trim().is_empty() {
        return Err("DATABASE_URL must not be empty".into());
    }
    Ok(from_env)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let database_url = resolve_database_url(args.database_url)?;
    let mut conn = PgConnection::establish(&database_url)?;

    use backend::outbound::persistence::schema::users::dsl::{role, username, users};
    let updated = diesel::update(users.filter(username.eq(&args.username)))
        .set(role.eq("admin"))
        .execute(&mut conn)?;

    if updated == 0 {
        return Err(format!("no user named {:?}", args.username).into());
    }
    eprintln!("{} is now an admin", args.username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::resolve_database_url;

    #[rstest]
    fn explicit_url_wins() {
        let url = resolve_database_url(Some("postgres://localhost/wines".into()))
            .expect("explicit URL resolves");
        assert_eq!(url, "postgres://localhost/wines");
    }

    #[rstest]
    fn blank_explicit_url_is_rejected() {
        let error = resolve_database_url(Some("  ".into())).expect_err("blank URL should fail");
        assert!(error.to_string().contains("must not be empty"));
    }
}
