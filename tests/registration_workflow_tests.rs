use axum::http::StatusCode;
use futures::future::join_all;
use serde_json::Value;

use ladder::{
    game::GameWithParticipants, rating::RatingConfig, Board, FanFactionSetting, Rounding,
};

mod utils;

use utils::*;

fn leaderboard_rows(board: &Value) -> Vec<(String, i64, i64)> {
    board["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["player_name"].as_str().unwrap().to_string(),
                e["elo"].as_i64().unwrap(),
                e["games_played"].as_i64().unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_four_player_game_end_to_end() {
    let setup = TestSetupBuilder::new()
        .with_outcome(OutcomeBuilder::four_player_game("500000001").build())
        .build()
        .await;
    for (name, id) in [("A", "1"), ("B", "2"), ("C", "3"), ("D", "4")] {
        let response = setup.add_player("mod", name, id).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = setup
        .register_game("caller", false, "https://boardgamearena.com/table?table=500000001")
        .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let messages = setup.announcer.wait_for_messages("caller", 1).await;
    assert!(messages[0].starts_with(
        "Thank you for registering a [game](https://boardgamearena.com/table?table=500000001) <@caller>!"
    ));

    let rows = leaderboard_rows(&setup.leaderboard().await);
    assert_eq!(
        rows,
        vec![
            ("D".to_string(), 1033, 1),
            ("C".to_string(), 1011, 1),
            ("B".to_string(), 989, 1),
            ("A".to_string(), 967, 1),
        ]
    );

    let boards = setup.announcer.published_to(Board::Leaderboard).await;
    assert_eq!(boards.len(), 1);
    assert!(boards[0].contains("Leaderboard"));
    assert_eq!(setup.announcer.published_to(Board::Players).await.len(), 4);
}

#[tokio::test]
async fn test_result_message_ranks_by_elo_change() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_outcome(OutcomeBuilder::four_player_game("7").build())
        .build()
        .await;

    setup.register_and_wait("caller", "7").await;

    let message = &setup.announcer.messages_for("caller").await[0];
    let rows: Vec<&str> = message.lines().skip(4).take(4).collect();
    assert!(rows[0].starts_with("1     D"));
    assert!(rows[1].starts_with("2     C"));
    assert!(rows[2].starts_with("3     B"));
    assert!(rows[3].starts_with("4     A"));
}

#[tokio::test]
async fn test_registering_twice_changes_nothing() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_outcome(OutcomeBuilder::four_player_game("7").build())
        .build()
        .await;

    setup.register_and_wait("caller", "7").await;
    let before = leaderboard_rows(&setup.leaderboard().await);

    setup.register_and_wait("caller", "7").await;

    let messages = setup.announcer.messages_for("caller").await;
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[1],
        "<@caller> Error: game 7 is already registered"
    );
    assert_eq!(leaderboard_rows(&setup.leaderboard().await), before);
    assert_eq!(setup.db.game_participant_count(), 4);
}

#[tokio::test]
async fn test_single_registered_player_is_refused_without_writes() {
    let setup = TestSetupBuilder::new()
        .with_players(&[("A", "1")])
        .with_outcome(OutcomeBuilder::four_player_game("7").build())
        .build()
        .await;

    setup.register_and_wait("caller", "7").await;

    let messages = setup.announcer.messages_for("caller").await;
    assert!(messages[0].contains("less than two registered players"));
    assert!(leaderboard_rows(&setup.leaderboard().await).is_empty());
    assert_eq!(setup.db.game_participant_count(), 0);
    assert!(setup
        .announcer
        .published_to(Board::Leaderboard)
        .await
        .is_empty());
}

#[tokio::test]
async fn test_only_registered_players_are_rated() {
    let setup = TestSetupBuilder::new()
        .with_players(&[("B", "2"), ("D", "4")])
        .with_outcome(OutcomeBuilder::four_player_game("7").build())
        .build()
        .await;

    setup.register_and_wait("caller", "7").await;

    let token = setup.token_for("caller", false);
    let response = setup.send("GET", "/games/7", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let game: GameWithParticipants = response_json(response).await;

    let mut changes: Vec<(String, i32, i32)> = game
        .participants
        .iter()
        .map(|p| (p.player_id.clone(), p.score, p.elo_change))
        .collect();
    changes.sort();
    assert_eq!(
        changes,
        vec![("2".to_string(), 200, -11), ("4".to_string(), 400, 11)]
    );
}

#[tokio::test]
async fn test_unprivileged_caller_waits_for_cooldown() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;

    let first = setup.register_game("caller", false, "1").await;
    let second = setup.register_game("caller", false, "2").await;
    let other_caller = setup.register_game("someone-else", false, "3").await;
    let moderator = setup.register_game("caller", true, "4").await;

    assert_eq!(first.status(), StatusCode::ACCEPTED);
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(other_caller.status(), StatusCode::ACCEPTED);
    assert_eq!(moderator.status(), StatusCode::ACCEPTED);

    let body: Value = response_json(second).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("you are limited to one command per 60 minutes"));
}

#[tokio::test]
async fn test_unresolvable_and_invalid_games_are_reported() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_outcome(
            OutcomeBuilder::four_player_game("8")
                .with_setting(FanFactionSetting::Off)
                .build(),
        )
        .with_outcome(OutcomeBuilder::four_player_game("9").played_days_ago(90).build())
        .build()
        .await;

    setup.register_and_wait("caller", "123").await;
    setup.register_and_wait("caller", "8").await;
    setup.register_and_wait("caller", "9").await;
    setup.register_and_wait("caller", "https://example.com/nothing").await;

    let messages = setup.announcer.messages_for("caller").await;
    assert_eq!(messages.len(), 4);
    assert!(messages.iter().all(|m| m.starts_with("<@caller> Error: ")));
    assert!(messages[0].contains("table 123 does not exist"));
    assert!(messages[1].contains("fan factions are not enabled"));
    assert!(messages[2].contains("too old"));
    assert!(messages[3].contains("invalid table reference"));
    assert_eq!(setup.db.game_participant_count(), 0);
}

#[tokio::test]
async fn test_players_endpoints() {
    let setup = TestSetupBuilder::new().build().await;
    let member = setup.token_for("member", false);

    let denied = setup
        .send(
            "POST",
            "/players",
            Some(&member),
            Some(serde_json::json!({ "name": "A", "external_id": "1" })),
        )
        .await;
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(setup.add_player("mod", "bob", "2").await.status(), StatusCode::CREATED);
    assert_eq!(setup.add_player("mod", "Alice", "1").await.status(), StatusCode::CREATED);
    assert_eq!(setup.add_player("mod", "Alice", "3").await.status(), StatusCode::CONFLICT);

    let players: Value = response_json(setup.send("GET", "/players", Some(&member), None).await).await;
    let names: Vec<&str> = players
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "bob"]);

    let roster = setup.announcer.published_to(Board::Players).await;
    assert_eq!(roster.len(), 2);
    assert!(roster[1].contains("https://boardgamearena.com/player?id=1"));
}

#[tokio::test]
async fn test_rated_player_cannot_be_removed() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_outcome(OutcomeBuilder::four_player_game("7").build())
        .build()
        .await;
    setup.add_player("mod", "E", "5").await;
    setup.register_and_wait("caller", "7").await;
    let moderator = setup.token_for("mod", true);

    let rated = setup.send("DELETE", "/players/A", Some(&moderator), None).await;
    let unrated = setup.send("DELETE", "/players/E", Some(&moderator), None).await;
    let missing = setup.send("DELETE", "/players/E", Some(&moderator), None).await;

    assert_eq!(rated.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(unrated.status(), StatusCode::NO_CONTENT);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_registrations_lose_no_updates() {
    let mut builder = TestSetupBuilder::new().with_players(&[("A", "1"), ("B", "2")]);
    for id in 1..=20 {
        let (a, b) = if id % 3 == 0 { (50, 60) } else { (70, 60) };
        builder = builder.with_outcome(
            OutcomeBuilder::new(&id.to_string())
                .with_player("A", a)
                .with_player("B", b)
                .build(),
        );
    }
    let setup = builder.build().await;

    let handles: Vec<_> = (1..=20)
        .map(|id| {
            setup
                .state
                .dispatcher
                .submit("mod", true, &id.to_string())
                .unwrap()
        })
        .collect();
    for result in join_all(handles).await {
        result.unwrap();
    }

    let rows = leaderboard_rows(&setup.leaderboard().await);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|(_, _, games)| *games == 20));
    // Two-player games move exactly as many points as they take
    assert_eq!(rows.iter().map(|(_, elo, _)| elo).sum::<i64>(), 2000);
    assert_eq!(setup.db.game_participant_count(), 40);
}

#[tokio::test]
async fn test_same_game_submitted_concurrently_counts_once() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_outcome(OutcomeBuilder::four_player_game("7").build())
        .build()
        .await;

    let handles: Vec<_> = (0..5)
        .map(|i| {
            setup
                .state
                .dispatcher
                .submit(&format!("caller-{i}"), true, "7")
                .unwrap()
        })
        .collect();
    for result in join_all(handles).await {
        result.unwrap();
    }

    let rows = leaderboard_rows(&setup.leaderboard().await);
    assert!(rows.iter().all(|(_, _, games)| *games == 1));
    assert_eq!(setup.db.game_participant_count(), 4);
    assert_eq!(
        setup.announcer.published_to(Board::Leaderboard).await.len(),
        1
    );
}

#[tokio::test]
async fn test_per_player_rounding_is_configurable() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_rating(RatingConfig {
            rounding: Rounding::PerPlayer,
            ..RatingConfig::default()
        })
        .with_outcome(OutcomeBuilder::four_player_game("7").build())
        .build()
        .await;

    setup.register_and_wait("caller", "7").await;

    let elos: Vec<i64> = leaderboard_rows(&setup.leaderboard().await)
        .into_iter()
        .map(|(_, elo, _)| elo)
        .collect();
    assert_eq!(elos, vec![1032, 1011, 989, 968]);
}

#[tokio::test]
async fn test_resolver_accepts_outcomes_added_later() {
    let setup = TestSetupBuilder::new().with_four_players().build().await;
    setup
        .resolver
        .insert(OutcomeBuilder::four_player_game("77").build())
        .await;

    setup.register_and_wait("caller", "77").await;

    let rows = leaderboard_rows(&setup.leaderboard().await);
    assert_eq!(rows[0].1, 1033);
    assert_eq!(setup.repositories.games.list_games().await.unwrap().len(), 1);
}
