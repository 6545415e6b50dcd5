use grid_conquest_core::{
    BattalionIds, CellId, CellKind, Faction, SeededChance, SteadyChance, UnitType,
};
use grid_conquest_system_map_generation::{home_base, MapConfig, MapGenerator};

fn generate(config: MapConfig, seed: u64) -> grid_conquest_core::Board {
    MapGenerator::new(config)
        .generate(&mut BattalionIds::default(), &mut SeededChance::from_seed(seed))
        .expect("valid configuration")
}

#[test]
fn home_bases_start_with_one_immobile_infantry_battalion() {
    let board = generate(MapConfig::with_size(8), 11);

    for faction in Faction::ALL {
        let home = board
            .cell(home_base(faction, 8))
            .expect("home base on board");
        assert_eq!(home.kind(), CellKind::Base);
        assert_eq!(home.owner(), Some(faction));
        assert_eq!(home.specialization(), None);

        let garrison = home.battalions();
        assert_eq!(garrison.len(), 1);
        assert_eq!(garrison[0].unit, UnitType::Infantry);
        assert_eq!(garrison[0].soldiers, 10);
        assert_eq!(
            garrison[0].movement_left, 0,
            "fresh garrisons cannot move on their first turn"
        );
        assert_eq!(garrison[0].max_movement, 3);
    }
}

#[test]
fn only_home_bases_are_owned_at_start() {
    let board = generate(MapConfig::with_size(10), 3);

    let owned: Vec<CellId> = board
        .cells()
        .iter()
        .filter(|cell| cell.owner().is_some())
        .map(|cell| cell.id())
        .collect();
    assert_eq!(owned, vec![CellId::new(0, 0), CellId::new(9, 9)]);
    assert!(board.validate().is_ok());
}

#[test]
fn certain_neutral_bases_fill_the_board_with_specializations() {
    let config = MapConfig {
        size: 6,
        neutral_base_chance: 1.0,
        resource_chance: 0.0,
    };
    let board = generate(config, 5);

    for cell in board.cells() {
        assert_eq!(cell.kind(), CellKind::Base);
        if cell.owner().is_none() {
            assert!(
                cell.specialization().is_some(),
                "neutral base {} lacks a specialization",
                cell.id()
            );
            assert!(cell.battalions().is_empty());
        }
    }
}

#[test]
fn zero_chances_leave_plain_territory() {
    let config = MapConfig {
        size: 5,
        neutral_base_chance: 0.0,
        resource_chance: 0.0,
    };
    let board = generate(config, 8);

    let bases = board.cells().iter().filter(|cell| cell.is_base()).count();
    assert_eq!(bases, 2, "only the two home bases remain");
    assert!(board
        .cells()
        .iter()
        .all(|cell| cell.kind() != CellKind::Resource));
}

#[test]
fn roll_thresholds_are_cumulative() {
    let config = MapConfig {
        size: 4,
        neutral_base_chance: 0.1,
        resource_chance: 0.2,
    };
    let generator = MapGenerator::new(config);

    let mut just_above_bases = SteadyChance::neutral().with_unit(0.15);
    let board = generator
        .generate(&mut BattalionIds::default(), &mut just_above_bases)
        .expect("valid configuration");
    let resources = board
        .cells()
        .iter()
        .filter(|cell| cell.kind() == CellKind::Resource)
        .count();
    assert_eq!(resources, 14, "every non-home cell becomes a resource site");

    let mut above_both = SteadyChance::neutral().with_unit(0.31);
    let board = generator
        .generate(&mut BattalionIds::default(), &mut above_both)
        .expect("valid configuration");
    assert!(board
        .cells()
        .iter()
        .filter(|cell| cell.owner().is_none())
        .all(|cell| cell.kind() == CellKind::Neutral));
}

#[test]
fn distribution_tracks_configured_probabilities() {
    let config = MapConfig {
        size: 12,
        neutral_base_chance: 0.1,
        resource_chance: 0.3,
    };
    let mut bases = 0usize;
    let mut resources = 0usize;
    let mut rolled = 0usize;
    for seed in 0..40 {
        let board = generate(config, seed);
        for cell in board.cells().iter().filter(|cell| cell.owner().is_none()) {
            rolled += 1;
            match cell.kind() {
                CellKind::Base => bases += 1,
                CellKind::Resource => resources += 1,
                CellKind::Neutral => {}
            }
        }
    }

    let base_share = bases as f64 / rolled as f64;
    let resource_share = resources as f64 / rolled as f64;
    assert!((0.07..0.13).contains(&base_share), "base share {base_share}");
    assert!(
        (0.26..0.34).contains(&resource_share),
        "resource share {resource_share}"
    );
}

#[test]
fn same_seed_generates_same_board() {
    let first = generate(MapConfig::with_size(9), 1234);
    let second = generate(MapConfig::with_size(9), 1234);
    assert_eq!(first, second);
}

#[test]
fn starting_battalions_draw_unique_ids() {
    let mut ids = BattalionIds::default();
    let board = MapGenerator::new(MapConfig::with_size(6))
        .generate(&mut ids, &mut SeededChance::from_seed(2))
        .expect("valid configuration");

    let player = board.cell(CellId::new(0, 0)).expect("player home").battalions()[0].id;
    let ai = board.cell(CellId::new(5, 5)).expect("ai home").battalions()[0].id;
    assert_ne!(player, ai);
    assert_eq!(ids.peek(), 3);
}
