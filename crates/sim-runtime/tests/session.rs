use std::sync::Arc;

use persistence::{MemoryStore, SaveStore};
use sim_contracts::ContractError;
use sim_core::{CellCoord, ColorId, StateError};
use sim_econ::ShopError;
use sim_runtime::{Command, Game, Outcome, RuntimeError, Session};

fn session_with(money: u64) -> (Session, Arc<MemoryStore>) {
    let mut game = Game::new(11);
    if money > 0 {
        let _ = game.state.add_money(money).unwrap();
    }
    let store = Arc::new(MemoryStore::new());
    (Session::new(game, store.clone()), store)
}

async fn money(session: &Session) -> u64 {
    session.game().lock().await.state.money()
}

#[tokio::test]
async fn buying_red_through_commands() {
    let (session, _) = session_with(150);
    let outcome = session
        .execute(Command::BuyColor { id: "red".into() })
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Done);
    assert_eq!(money(&session).await, 100);

    let again = session.execute(Command::BuyColor { id: "red".into() }).await;
    assert!(matches!(
        again,
        Err(RuntimeError::Shop(ShopError::AlreadyOwned(_)))
    ));

    session
        .execute(Command::SelectColor { id: "red".into() })
        .await
        .unwrap();
    let painted = session
        .execute(Command::SetCell {
            x: 1,
            y: 1,
            color: None,
            erase: false,
        })
        .await
        .unwrap();
    assert_eq!(painted, Outcome::Changed(true));
    let game = session.game();
    let game = game.lock().await;
    assert_eq!(game.state.grid().get_cell(1, 1).map(ColorId::as_str), Some("red"));
}

#[tokio::test]
async fn locked_colors_cannot_be_painted() {
    let (session, _) = session_with(0);
    let err = session
        .execute(Command::SetCell {
            x: 0,
            y: 0,
            color: Some(ColorId::from("cyan")),
            erase: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::State(StateError::ColorLocked(ref id)) if id == "cyan"
    ));

    // A batch is rejected whole when any of its colors is not owned.
    let batch = session
        .execute(Command::SetCells {
            cells: vec![
                (CellCoord::new(0, 0), Some(ColorId::from("black"))),
                (CellCoord::new(1, 0), Some(ColorId::from("red"))),
            ],
        })
        .await;
    assert!(matches!(
        batch,
        Err(RuntimeError::State(StateError::ColorLocked(ref id))) if id == "red"
    ));
    let unknown = session
        .execute(Command::SetCells {
            cells: vec![(CellCoord::new(2, 0), Some(ColorId::from("mauve")))],
        })
        .await;
    assert!(matches!(
        unknown,
        Err(RuntimeError::State(StateError::UnknownColor(ref id))) if id == "mauve"
    ));
    let game = session.game();
    assert!(game.lock().await.state.grid().is_empty());
}

#[tokio::test]
async fn contract_lifecycle_commands() {
    let (session, _) = session_with(0);
    let Outcome::Contract(contract) = session
        .execute(Command::AcceptContract { rank: None })
        .await
        .unwrap()
    else {
        panic!("expected a contract");
    };
    assert_eq!(contract.rank_level, 1);

    let second = session.execute(Command::AcceptContract { rank: None }).await;
    assert!(matches!(
        second,
        Err(RuntimeError::Contract(ContractError::State(
            StateError::ContractActive
        )))
    ));
    let abandoned = session.execute(Command::AbandonContract).await.unwrap();
    assert_eq!(abandoned, Outcome::Contract(contract));

    let too_high = session
        .execute(Command::AcceptContract { rank: Some(5) })
        .await;
    assert!(matches!(
        too_high,
        Err(RuntimeError::Contract(ContractError::RankInaccessible(5)))
    ));
}

#[tokio::test]
async fn save_then_load_restores_the_game() {
    let (session, store) = session_with(300);
    session.execute(Command::Save).await.unwrap();
    assert!(store.load().unwrap().is_some());

    let _ = session
        .execute(Command::BuyColor { id: "red".into() })
        .await
        .unwrap();
    assert_eq!(money(&session).await, 250);
    assert_eq!(
        session.execute(Command::Load).await.unwrap(),
        Outcome::Loaded(true)
    );
    assert_eq!(money(&session).await, 300);
}

#[tokio::test]
async fn corrupt_save_leaves_state_untouched() {
    let (session, store) = session_with(42);
    store.put_raw("{\"version\": 1}").unwrap();
    assert!(session.execute(Command::Load).await.is_err());
    assert_eq!(money(&session).await, 42);

    store.clear().unwrap();
    assert_eq!(
        session.execute(Command::Load).await.unwrap(),
        Outcome::Loaded(false)
    );
}

#[tokio::test]
async fn export_import_between_sessions() {
    let (source, _) = session_with(777);
    let _ = source
        .execute(Command::SetCell {
            x: 3,
            y: 2,
            color: Some(ColorId::from("white")),
            erase: false,
        })
        .await
        .unwrap();
    let Outcome::Exported(blob) = source.execute(Command::Export).await.unwrap() else {
        panic!("expected an export string");
    };
    assert!(blob.starts_with("gridpaint:v4:"));

    let (target, _) = session_with(0);
    let bad = target
        .execute(Command::Import {
            blob: "gridpaint:v4:!!!".into(),
        })
        .await;
    assert!(matches!(bad, Err(RuntimeError::Transfer(_))));
    assert_eq!(money(&target).await, 0);

    assert_eq!(
        target.execute(Command::Import { blob }).await.unwrap(),
        Outcome::Loaded(true)
    );
    assert_eq!(money(&target).await, 777);
    let game = target.game();
    let game = game.lock().await;
    assert_eq!(
        game.state.grid().get_cell(3, 2).map(ColorId::as_str),
        Some("white")
    );
}

#[tokio::test]
async fn grid_expansion_and_upgrades() {
    let (session, _) = session_with(1_000);
    assert_eq!(
        session.execute(Command::BuyGridExpansion).await.unwrap(),
        Outcome::Level(5)
    );
    assert_eq!(
        session
            .execute(Command::BuyUpgrade {
                id: "money_boost".into()
            })
            .await
            .unwrap(),
        Outcome::Level(1)
    );
    session
        .execute(Command::SetAutomationEnabled {
            id: "money_boost".into(),
            enabled: false,
        })
        .await
        .unwrap();
    let game = session.game();
    assert!(!game.lock().await.state.is_automation_enabled("money_boost"));
}

#[test]
fn commands_parse_from_json() {
    let parsed: Command = serde_json::from_str(r#"{"command":"buy_color","id":"red"}"#).unwrap();
    assert_eq!(parsed, Command::BuyColor { id: "red".into() });
    let parsed: Command = serde_json::from_str(r#"{"command":"set_cell","x":1,"y":2}"#).unwrap();
    assert_eq!(
        parsed,
        Command::SetCell {
            x: 1,
            y: 2,
            color: None,
            erase: false
        }
    );
    let parsed: Command = serde_json::from_str(r#"{"command":"accept_contract"}"#).unwrap();
    assert_eq!(parsed, Command::AcceptContract { rank: None });
}
