use grid_conquest_core::{
    Battalion, BattalionId, BattalionIds, Board, Cell, CellId, CellKind, Command, CommandError,
    Event, Faction, GameSnapshot, GameStatus, MoveError, ProductionError, Resources, SeededChance,
    Specialization, SteadyChance, UnitType,
};
use grid_conquest_world::{self as world, query, Game, RulesConfig};

/// Hand-built match state, hydrated into a game for each scenario.
struct Scenario {
    size: u32,
    cells: Vec<Cell>,
    next_id: u32,
    resources: Resources,
    turn_number: u32,
    majority: (Option<Faction>, u32),
}

impl Scenario {
    fn new(size: u32) -> Self {
        let cells = (0..size)
            .flat_map(|row| (0..size).map(move |column| CellId::new(column, row)))
            .map(|id| Cell::new(id, CellKind::Neutral, None))
            .collect();
        Self {
            size,
            cells,
            next_id: 1,
            resources: Resources::default(),
            turn_number: 1,
            majority: (None, 0),
        }
    }

    fn slot(&mut self, id: CellId) -> &mut Cell {
        let index = (id.row() * self.size + id.column()) as usize;
        &mut self.cells[index]
    }

    fn base(mut self, id: CellId, specialization: Option<Specialization>) -> Self {
        *self.slot(id) = Cell::new(id, CellKind::Base, specialization);
        self
    }

    fn troops(mut self, id: CellId, owner: Faction, unit: UnitType, movement_left: u32) -> Self {
        let battalion =
            Battalion::from_blueprint(BattalionId::new(self.next_id), owner, unit, movement_left);
        self.next_id += 1;
        assert!(self.slot(id).station(battalion).is_ok());
        self
    }

    fn weak_troops(mut self, id: CellId, owner: Faction, soldiers: u32) -> Self {
        let mut battalion =
            Battalion::from_blueprint(BattalionId::new(self.next_id), owner, UnitType::Infantry, 0);
        battalion.soldiers = soldiers;
        self.next_id += 1;
        assert!(self.slot(id).station(battalion).is_ok());
        self
    }

    fn resources(mut self, player: u32, ai: u32) -> Self {
        self.resources = Resources { player, ai };
        self
    }

    fn turn(mut self, turn_number: u32) -> Self {
        self.turn_number = turn_number;
        self
    }

    fn majority(mut self, owner: Faction, streak: u32) -> Self {
        self.majority = (Some(owner), streak);
        self
    }

    fn snapshot(self) -> GameSnapshot {
        GameSnapshot {
            board: Board::from_cells(self.size, self.cells).expect("row-major cells"),
            current_turn: Faction::Player,
            turn_number: self.turn_number,
            majority_owner: self.majority.0,
            majority_streak: self.majority.1,
            status: GameStatus::Playing,
            last_action: None,
            resources: self.resources,
            battalion_ids: BattalionIds::starting_at(self.next_id),
            action_sequence: 0,
        }
    }

    fn into_game(self) -> Game {
        let snapshot = self.snapshot();
        let mut game = Game::new(
            RulesConfig::with_size(snapshot.grid_size()),
            &mut SteadyChance::neutral(),
        )
        .expect("default rules");
        let events = run(
            &mut game,
            Command::Hydrate {
                snapshot: Some(Box::new(snapshot)),
            },
        );
        assert_eq!(events, vec![Event::Hydrated { restored: true }]);
        game
    }
}

fn run(game: &mut Game, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(game, command, &mut SteadyChance::neutral(), &mut events);
    events
}

/// Two players on a 6×6 board with their garrisons doubled so that a single
/// move never empties a base.
fn quiet_frontier() -> Scenario {
    Scenario::new(6)
        .base(CellId::new(0, 0), None)
        .troops(CellId::new(0, 0), Faction::Player, UnitType::Infantry, 3)
        .troops(CellId::new(0, 0), Faction::Player, UnitType::Infantry, 3)
        .base(CellId::new(5, 5), None)
        .troops(CellId::new(5, 5), Faction::Ai, UnitType::Infantry, 0)
        .troops(CellId::new(5, 5), Faction::Ai, UnitType::Infantry, 0)
}

#[test]
fn selecting_an_owned_cell_twice_clears_the_selection() {
    let mut game = quiet_frontier().into_game();
    let home = CellId::new(0, 0);

    let events = run(&mut game, Command::SelectCell { cell: home });
    assert_eq!(
        events,
        vec![Event::CellSelected {
            cell: home,
            battalion: BattalionId::new(1),
        }]
    );

    let events = run(&mut game, Command::SelectCell { cell: home });
    assert_eq!(events, vec![Event::SelectionCleared]);
    assert_eq!(query::selection(&game), None);
}

#[test]
fn selection_prefers_battalions_that_can_still_move() {
    let mut game = Scenario::new(4)
        .base(CellId::new(0, 0), None)
        .troops(CellId::new(0, 0), Faction::Player, UnitType::Infantry, 0)
        .troops(CellId::new(0, 0), Faction::Player, UnitType::Infantry, 2)
        .base(CellId::new(3, 3), None)
        .troops(CellId::new(3, 3), Faction::Ai, UnitType::Infantry, 0)
        .into_game();

    let _ = run(&mut game, Command::SelectCell { cell: CellId::new(0, 0) });
    let selected = query::selected_battalion(&game).expect("selection");
    assert_eq!(selected.id, BattalionId::new(2));
    assert!(query::selection_reach(&game).contains(CellId::new(1, 0)));
}

#[test]
fn foreign_and_unknown_cells_cannot_be_selected() {
    let mut game = quiet_frontier().into_game();
    for cell in [CellId::new(5, 5), CellId::new(2, 2), CellId::new(9, 9)] {
        let events = run(&mut game, Command::SelectCell { cell });
        assert_eq!(
            events,
            vec![Event::CommandIgnored {
                reason: CommandError::UnselectableCell(cell),
            }]
        );
    }

    let events = run(
        &mut game,
        Command::SelectBattalion {
            battalion: BattalionId::new(3),
        },
    );
    assert_eq!(
        events,
        vec![Event::CommandIgnored {
            reason: CommandError::UnselectableBattalion(BattalionId::new(3)),
        }]
    );
}

#[test]
fn moving_without_a_selection_is_ignored() {
    let mut game = quiet_frontier().into_game();
    let before = query::snapshot(&game).clone();
    let events = run(&mut game, Command::MoveSelectedTo { cell: CellId::new(1, 0) });
    assert_eq!(
        events,
        vec![Event::CommandIgnored {
            reason: CommandError::NoSelection,
        }]
    );
    assert_eq!(query::snapshot(&game), &before);
}

#[test]
fn fresh_garrisons_cannot_move_on_the_opening_turn() {
    let mut game = Game::new(RulesConfig::default(), &mut SeededChance::from_seed(21))
        .expect("default rules");
    let before = query::snapshot(&game).clone();

    let _ = run(&mut game, Command::SelectCell { cell: CellId::new(0, 0) });
    let selection = query::selection(&game).expect("home garrison selected");
    let events = run(&mut game, Command::MoveSelectedTo { cell: CellId::new(1, 0) });

    assert_eq!(
        events,
        vec![Event::MoveRejected {
            faction: Faction::Player,
            reason: MoveError::Exhausted(selection.battalion),
        }]
    );
    assert_eq!(query::snapshot(&game), &before);
    assert_eq!(query::selection(&game), Some(selection));
}

#[test]
fn a_player_move_is_published_and_clears_the_selection() {
    let mut game = quiet_frontier().into_game();
    let _ = run(
        &mut game,
        Command::SelectBattalion {
            battalion: BattalionId::new(2),
        },
    );
    let events = run(&mut game, Command::MoveSelectedTo { cell: CellId::new(0, 1) });

    let action = query::last_action(&game).expect("published action");
    assert_eq!(action.from, CellId::new(0, 0));
    assert_eq!(action.to, CellId::new(0, 1));
    assert_eq!(action.conquered_owner, Some(Faction::Player));
    assert_eq!(action.timestamp, 1);
    assert_eq!(
        events,
        vec![Event::MoveResolved {
            faction: Faction::Player,
            action: action.clone(),
        }]
    );
    assert_eq!(query::selection(&game), None);
    assert_eq!(
        query::board(&game).cell(CellId::new(0, 1)).and_then(Cell::owner),
        Some(Faction::Player)
    );
}

#[test]
fn ending_the_turn_runs_the_opponent_and_returns_control() {
    let mut game = Game::new(RulesConfig::default(), &mut SeededChance::from_seed(3))
        .expect("default rules");
    let mut chance = SeededChance::from_seed(4);
    let mut events = Vec::new();
    world::apply(&mut game, Command::EndTurn, &mut chance, &mut events);

    assert_eq!(query::status(&game), GameStatus::Playing);
    assert_eq!(query::current_turn(&game), Faction::Player);
    assert_eq!(query::turn_number(&game), 2);
    assert!(events.contains(&Event::TurnStarted {
        faction: Faction::Ai,
        turn: 1,
    }));
    assert!(events.contains(&Event::TurnStarted {
        faction: Faction::Player,
        turn: 2,
    }));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::MoveResolved { faction: Faction::Ai, .. })));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::BattalionTrained {
            faction: Faction::Ai,
            unit: UnitType::Infantry,
            ..
        }
    )));

    let board = query::board(&game);
    assert!(board
        .battalions_of(Faction::Player)
        .all(|(_, battalion)| battalion.movement_left == battalion.max_movement));
    assert!(board.base_count(Faction::Ai) >= 1, "the opponent keeps its home garrisoned");
}

#[test]
fn capturing_the_last_enemy_base_wins_immediately() {
    let mut game = Scenario::new(4)
        .base(CellId::new(0, 0), None)
        .troops(CellId::new(0, 0), Faction::Player, UnitType::Infantry, 3)
        .troops(CellId::new(0, 0), Faction::Player, UnitType::Infantry, 3)
        .base(CellId::new(1, 0), None)
        .weak_troops(CellId::new(1, 0), Faction::Ai, 1)
        .majority(Faction::Ai, 3)
        .into_game();

    let _ = run(
        &mut game,
        Command::SelectBattalion {
            battalion: BattalionId::new(1),
        },
    );
    let events = run(&mut game, Command::MoveSelectedTo { cell: CellId::new(1, 0) });

    assert_eq!(query::status(&game), GameStatus::PlayerVictory);
    assert!(events.contains(&Event::GameOver {
        status: GameStatus::PlayerVictory,
    }));
    let snapshot = query::snapshot(&game);
    assert_eq!(snapshot.majority_owner, None);
    assert_eq!(snapshot.majority_streak, 0);

    let before = snapshot.clone();
    for command in [
        Command::EndTurn,
        Command::SelectCell {
            cell: CellId::new(0, 0),
        },
        Command::ProduceAt {
            cell: CellId::new(0, 0),
            unit: Some(UnitType::Infantry),
        },
    ] {
        let events = run(&mut game, command);
        assert_eq!(
            events,
            vec![Event::CommandIgnored {
                reason: CommandError::GameOver,
            }]
        );
    }
    assert_eq!(query::snapshot(&game), &before, "terminal states are absorbing");
}

#[test]
fn a_held_majority_wins_after_the_opponent_phase() {
    let mut game = quiet_frontier()
        .base(CellId::new(5, 4), None)
        .troops(CellId::new(5, 4), Faction::Ai, UnitType::Infantry, 0)
        .troops(CellId::new(5, 4), Faction::Ai, UnitType::Infantry, 0)
        .majority(Faction::Ai, 9)
        .into_game();

    let events = run(&mut game, Command::EndTurn);

    assert_eq!(query::status(&game), GameStatus::AiMajority);
    assert_eq!(query::current_turn(&game), Faction::Ai);
    assert_eq!(query::turn_number(&game), 1);
    assert!(events.contains(&Event::MajorityChanged {
        owner: Some(Faction::Ai),
        streak: 10,
    }));
    assert_eq!(
        events.last(),
        Some(&Event::GameOver {
            status: GameStatus::AiMajority,
        })
    );
}

#[test]
fn equal_bases_reset_the_majority_streak() {
    let mut game = quiet_frontier().majority(Faction::Ai, 5).into_game();

    let events = run(&mut game, Command::EndTurn);

    let snapshot = query::snapshot(&game);
    assert_eq!(snapshot.status, GameStatus::Playing);
    assert_eq!(snapshot.majority_owner, None);
    assert_eq!(snapshot.majority_streak, 0);
    assert!(events.contains(&Event::MajorityChanged {
        owner: None,
        streak: 0,
    }));
}

#[test]
fn a_new_contender_starts_its_streak_at_one() {
    let mut game = quiet_frontier()
        .base(CellId::new(1, 0), None)
        .troops(CellId::new(1, 0), Faction::Player, UnitType::Infantry, 0)
        .majority(Faction::Ai, 7)
        .into_game();

    let _ = run(&mut game, Command::EndTurn);

    let snapshot = query::snapshot(&game);
    assert_eq!(snapshot.majority_owner, Some(Faction::Player));
    assert_eq!(snapshot.majority_streak, 1);
}

#[test]
fn specialized_bases_pay_bonuses_and_levy_on_schedule() {
    let mut game = Scenario::new(6)
        .base(CellId::new(0, 0), Some(Specialization::Forge))
        .troops(CellId::new(0, 0), Faction::Player, UnitType::Infantry, 3)
        .base(CellId::new(5, 5), None)
        .troops(CellId::new(5, 5), Faction::Ai, UnitType::Infantry, 0)
        .troops(CellId::new(5, 5), Faction::Ai, UnitType::Infantry, 0)
        .turn(3)
        .into_game();

    let events = run(&mut game, Command::EndTurn);

    assert_eq!(query::turn_number(&game), 4);
    assert!(events.contains(&Event::IncomeCollected {
        faction: Faction::Player,
        amount: 2,
    }));
    let levy = events
        .iter()
        .find_map(|event| match event {
            Event::ReinforcementsArrived {
                faction: Faction::Player,
                cell,
                battalion,
                unit,
            } => Some((*cell, *battalion, *unit)),
            _ => None,
        })
        .expect("forge levies on turn 4");
    assert_eq!(levy.0, CellId::new(0, 0));
    assert_eq!(levy.2, UnitType::Artillery);

    let levied = query::board(&game)
        .cell(levy.0)
        .and_then(|cell| cell.battalion(levy.1))
        .expect("levy stationed at the forge");
    assert_eq!(levied.movement_left, 0);
    assert!(query::snapshot(&game).validate().is_ok());
}

#[test]
fn production_deducts_cost_and_spawns_without_movement() {
    let mut game = quiet_frontier().resources(2, 0).into_game();
    let home = CellId::new(0, 0);

    let mut offered = Vec::new();
    let mut events = Vec::new();
    world::produce_with(
        &mut game,
        home,
        |options| {
            offered = options.iter().map(|blueprint| blueprint.unit).collect();
            Some(UnitType::Infantry)
        },
        &mut events,
    );

    assert_eq!(offered, vec![UnitType::Infantry]);
    let trained = match events.as_slice() {
        [Event::BattalionTrained {
            faction: Faction::Player,
            cell,
            battalion,
            unit: UnitType::Infantry,
            cost: 1,
        }] if *cell == home => *battalion,
        other => panic!("unexpected events {other:?}"),
    };
    assert_eq!(query::resources(&game).player, 1);
    let battalion = query::board(&game)
        .cell(home)
        .and_then(|cell| cell.battalion(trained))
        .expect("trained battalion");
    assert_eq!(battalion.movement_left, 0);
    assert_eq!(query::snapshot(&game).battalion_ids.peek(), trained.get() + 1);
}

#[test]
fn rejected_production_changes_nothing() {
    let mut game = quiet_frontier()
        .base(CellId::new(2, 0), Some(Specialization::Forge))
        .resources(1, 0)
        .into_game();
    let home = CellId::new(0, 0);
    let before = query::snapshot(&game).clone();

    let cases = [
        (
            Command::ProduceAt {
                cell: home,
                unit: None,
            },
            ProductionError::Cancelled,
        ),
        (
            Command::ProduceAt {
                cell: home,
                unit: Some(UnitType::Vanguard),
            },
            ProductionError::Locked(UnitType::Vanguard),
        ),
        (
            Command::ProduceAt {
                cell: CellId::new(2, 0),
                unit: Some(UnitType::Infantry),
            },
            ProductionError::NotOwnedBase(CellId::new(2, 0)),
        ),
        (
            Command::ProduceAt {
                cell: CellId::new(0, 9),
                unit: Some(UnitType::Infantry),
            },
            ProductionError::UnknownCell(CellId::new(0, 9)),
        ),
    ];
    for (command, reason) in cases {
        assert_eq!(run(&mut game, command), vec![Event::ProductionRejected { reason }]);
    }

    let _ = run(
        &mut game,
        Command::ProduceAt {
            cell: home,
            unit: Some(UnitType::Infantry),
        },
    );
    let events = run(
        &mut game,
        Command::ProduceAt {
            cell: home,
            unit: Some(UnitType::Infantry),
        },
    );
    assert_eq!(
        events,
        vec![Event::ProductionRejected {
            reason: ProductionError::InsufficientResources {
                needed: 1,
                available: 0,
            },
        }]
    );
    assert_eq!(query::resources(&game).player, 0);
    assert_eq!(
        query::board(&game).soldier_total(Faction::Player),
        before.board.soldier_total(Faction::Player) + 10
    );
}

#[test]
fn production_options_respect_unlocks_and_budget() {
    let game = Scenario::new(6)
        .base(CellId::new(0, 0), Some(Specialization::Barracks))
        .troops(CellId::new(0, 0), Faction::Player, UnitType::Infantry, 0)
        .base(CellId::new(1, 0), Some(Specialization::Forge))
        .troops(CellId::new(1, 0), Faction::Player, UnitType::Infantry, 0)
        .base(CellId::new(5, 5), None)
        .troops(CellId::new(5, 5), Faction::Ai, UnitType::Infantry, 0)
        .resources(2, 0)
        .into_game();

    let units: Vec<UnitType> = query::production_options(&game, CellId::new(0, 0))
        .iter()
        .map(|blueprint| blueprint.unit)
        .collect();
    assert_eq!(units, vec![UnitType::Infantry, UnitType::Vanguard]);
    assert!(query::production_options(&game, CellId::new(5, 5)).is_empty());
    assert!(query::production_options(&game, CellId::new(3, 3)).is_empty());
}

#[test]
fn hydration_restores_valid_snapshots_only() {
    let mut game = Game::new(RulesConfig::default(), &mut SeededChance::from_seed(9))
        .expect("default rules");
    assert!(!query::is_hydrated(&game));

    let before = query::snapshot(&game).clone();
    let mut broken = quiet_frontier().snapshot();
    broken.turn_number = 0;
    let events = run(
        &mut game,
        Command::Hydrate {
            snapshot: Some(Box::new(broken)),
        },
    );
    assert_eq!(events, vec![Event::Hydrated { restored: false }]);
    assert!(query::is_hydrated(&game));
    assert_eq!(query::snapshot(&game), &before);

    let events = run(&mut game, Command::Hydrate { snapshot: None });
    assert_eq!(events, vec![Event::Hydrated { restored: false }]);
}

#[test]
fn grid_size_changes_start_a_new_match() {
    let mut game = quiet_frontier().into_game();

    assert_eq!(
        run(&mut game, Command::SetGridSize { size: 6 }),
        vec![Event::CommandIgnored {
            reason: CommandError::UnchangedGridSize(6),
        }]
    );
    assert_eq!(
        run(&mut game, Command::NewGame { size: Some(40) }),
        vec![Event::CommandIgnored {
            reason: CommandError::InvalidGridSize(40),
        }]
    );

    let events = run(&mut game, Command::SetGridSize { size: 10 });
    assert_eq!(events.first(), Some(&Event::GameStarted { size: 10 }));
    assert_eq!(query::board(&game).size(), 10);
    assert_eq!(query::turn_number(&game), 1);
    assert!(query::is_hydrated(&game), "hydration survives a new match");

    let events = run(&mut game, Command::NewGame { size: None });
    assert_eq!(events.first(), Some(&Event::GameStarted { size: 10 }));
}

#[test]
fn stats_summarise_both_factions() {
    let game = quiet_frontier().into_game();
    let stats = query::stats(&game);
    assert_eq!(stats.of(Faction::Player).bases, 1);
    assert_eq!(stats.of(Faction::Player).soldiers, 20);
    assert_eq!(stats.of(Faction::Ai).cells, 1);
    assert_eq!(stats.ai.resources, 0);
}
