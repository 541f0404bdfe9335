use axum::Router;
use std::sync::Arc;

use ladder::{
    auth::TokenConfig, rating::RatingConfig, AppState, GameOutcome, InMemoryOutcomeResolver,
    MemoryDatabase, Repositories, Settings,
};

use super::mocks::RecordingAnnouncer;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const SEASON: &str = "First Fan Faction Season";

pub struct TestSetup {
    pub db: Arc<MemoryDatabase>,
    pub repositories: Repositories,
    pub state: AppState,
    pub app: Router,
    pub announcer: Arc<RecordingAnnouncer>,
    pub resolver: Arc<InMemoryOutcomeResolver>,
    pub tokens: TokenConfig,
}

pub struct TestSetupBuilder {
    players: Vec<(String, String)>,
    outcomes: Vec<GameOutcome>,
    settings: Settings,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            outcomes: vec![],
            settings: Settings {
                season: SEASON.to_string(),
                ..Settings::default()
            },
        }
    }

    /// Registers players as (name, external id)
    pub fn with_players(mut self, players: &[(&str, &str)]) -> Self {
        self.players = players
            .iter()
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect();
        self
    }

    /// A, B, C and D with ids 1 to 4
    pub fn with_four_players(self) -> Self {
        self.with_players(&[("A", "1"), ("B", "2"), ("C", "3"), ("D", "4")])
    }

    pub fn with_outcome(mut self, outcome: GameOutcome) -> Self {
        self.outcomes.push(outcome);
        self
    }

    pub fn with_rating(mut self, rating: RatingConfig) -> Self {
        self.settings.rating = rating;
        self
    }

    pub async fn build(self) -> TestSetup {
        let db = Arc::new(MemoryDatabase::new());
        let repositories = Repositories::in_memory_with(Arc::clone(&db), &self.settings.season);
        for (name, id) in &self.players {
            repositories.players.insert_player(name, id).await.unwrap();
        }

        let announcer = Arc::new(RecordingAnnouncer::new());
        let resolver = Arc::new(InMemoryOutcomeResolver::with_outcomes(self.outcomes));

        let state = AppState::new(
            repositories.clone(),
            &self.settings,
            resolver.clone(),
            announcer.clone(),
        );
        let app = ladder::router(state.clone());

        TestSetup {
            db,
            repositories,
            state,
            app,
            announcer,
            resolver,
            tokens: self.settings.token.clone(),
        }
    }
}
