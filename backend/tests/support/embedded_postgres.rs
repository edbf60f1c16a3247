//! Embedded PostgreSQL for adapter integration tests.
//!
//! Each context boots its own cluster, creates a uniquely named database on
//! it, and applies the crate's embedded migrations through
//! [`apply_migrations`], so tests run against the production schema.

use std::sync::{Mutex, OnceLock};

use diesel::pg::PgConnection;
use diesel::{Connection, RunQueryDsl};
use feedback_board::outbound::persistence::apply_migrations;
use pg_embedded_setup_unpriv::TestCluster;
use tokio::runtime::Runtime;
use uuid::Uuid;

static BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// A migrated database on a private cluster. Dropping it stops the cluster.
pub struct EmbeddedDatabase {
    url: String,
    _cluster: TestCluster,
}

impl EmbeddedDatabase {
    pub fn url(&self) -> &str {
        &self.url
    }
}

fn start_cluster() -> Result<TestCluster, String> {
    let _guard = BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());
    TestCluster::new().map_err(|err| format!("start cluster: {err:?}"))
}

fn create_database(cluster: &TestCluster, name: &str) -> Result<String, String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut conn = PgConnection::establish(&admin_url)
        .map_err(|err| format!("connect to maintenance database: {err}"))?;
    diesel::sql_query(format!("CREATE DATABASE \"{name}\""))
        .execute(&mut conn)
        .map_err(|err| format!("create database {name}: {err}"))?;
    Ok(cluster.connection().database_url(name))
}

/// Start a cluster and return a freshly migrated database on it.
pub fn provision(runtime: &Runtime) -> Result<EmbeddedDatabase, String> {
    let cluster = start_cluster()?;
    let name = format!("feedback_test_{}", Uuid::new_v4().simple());
    let url = create_database(&cluster, &name)?;
    runtime
        .block_on(apply_migrations(&url))
        .map_err(|err| err.to_string())?;
    Ok(EmbeddedDatabase {
        url,
        _cluster: cluster,
    })
}
