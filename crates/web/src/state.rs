use axum::extract::FromRef;
use league::Standings;
use storage::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub standings: Standings,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let standings = league::postgres::standings(&db);
        Self { db, standings }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Standings {
    fn from_ref(state: &AppState) -> Self {
        state.standings.clone()
    }
}
