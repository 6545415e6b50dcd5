use grid_conquest_core::{
    Battalion, BattalionId, Board, Cell, CellId, Chance, CellKind, ClaimLedger, Faction, SteadyChance,
    Specialization, UnitType,
};
use grid_conquest_system_combat::perform_move;
use grid_conquest_system_opponent::{Opponent, Tier, SPECIALIZED_BASE_BONUS};

/// Small board builder: every cell starts as plain neutral territory.
struct Layout {
    size: u32,
    cells: Vec<Cell>,
    next_id: u32,
}

impl Layout {
    fn new(size: u32) -> Self {
        let cells = (0..size)
            .flat_map(|row| (0..size).map(move |column| CellId::new(column, row)))
            .map(|id| Cell::new(id, CellKind::Neutral, None))
            .collect();
        Self {
            size,
            cells,
            next_id: 1,
        }
    }

    fn index(&self, id: CellId) -> usize {
        (id.row() * self.size + id.column()) as usize
    }

    fn kind(mut self, id: CellId, kind: CellKind, specialization: Option<Specialization>) -> Self {
        let index = self.index(id);
        self.cells[index] = Cell::new(id, kind, specialization);
        self
    }

    fn claimed_resource(mut self, id: CellId, claims: ClaimLedger) -> Self {
        let index = self.index(id);
        self.cells[index] = Cell::new(id, CellKind::Resource, None).with_claims(claims);
        self
    }

    fn troops(mut self, id: CellId, owner: Faction, soldiers: u32, movement_left: u32) -> Self {
        let mut battalion = Battalion::from_blueprint(
            BattalionId::new(self.next_id),
            owner,
            UnitType::Infantry,
            movement_left,
        );
        battalion.soldiers = soldiers;
        self.next_id += 1;
        let index = self.index(id);
        assert!(self.cells[index].station(battalion).is_ok());
        self
    }

    fn build(self) -> Board {
        Board::from_cells(self.size, self.cells).expect("row-major cells")
    }
}

#[test]
fn strikes_enemies_at_the_gates_first() {
    let board = Layout::new(5)
        .kind(CellId::new(4, 4), CellKind::Base, None)
        .troops(CellId::new(4, 4), Faction::Ai, 10, 3)
        .troops(CellId::new(4, 3), Faction::Player, 4, 0)
        .kind(CellId::new(3, 4), CellKind::Resource, None)
        .build();

    let decision = Opponent::default()
        .select_move(&board)
        .expect("a move is available");
    assert_eq!(decision.tier, Tier::DefendBase);
    assert_eq!(decision.order.to, CellId::new(4, 3));
    assert_eq!(decision.order.from, CellId::new(4, 4));
}

#[test]
fn economy_outranks_aggression_and_expansion() {
    let board = Layout::new(6)
        .kind(CellId::new(5, 5), CellKind::Base, None)
        .troops(CellId::new(5, 5), Faction::Ai, 10, 3)
        .kind(CellId::new(5, 4), CellKind::Base, Some(Specialization::Forge))
        .kind(CellId::new(4, 5), CellKind::Resource, None)
        .build();

    let decision = Opponent::default()
        .select_move(&board)
        .expect("a move is available");
    assert_eq!(decision.tier, Tier::Economy);
    assert_eq!(decision.order.to, CellId::new(4, 5));
}

#[test]
fn collected_resources_no_longer_count_as_economy() {
    let board = Layout::new(6)
        .troops(CellId::new(2, 2), Faction::Ai, 10, 1)
        .claimed_resource(
            CellId::new(3, 2),
            ClaimLedger {
                player: false,
                ai: true,
            },
        )
        .build();

    let decision = Opponent::default()
        .select_move(&board)
        .expect("a move is available");
    assert_eq!(decision.tier, Tier::Expansion);
}

#[test]
fn specialized_bases_earn_a_bonus() {
    // Both neighbouring bases are empty; the sanctuary is enumerated after the
    // plain base but wins on the bonus.
    let board = Layout::new(5)
        .troops(CellId::new(2, 2), Faction::Ai, 10, 1)
        .kind(CellId::new(1, 2), CellKind::Base, None)
        .kind(CellId::new(3, 2), CellKind::Base, Some(Specialization::Sanctuary))
        .build();

    let decision = Opponent::default()
        .select_move(&board)
        .expect("a move is available");
    assert_eq!(decision.tier, Tier::Aggression);
    assert_eq!(decision.order.to, CellId::new(3, 2));
    assert_eq!(decision.score, Tier::Aggression.weight() + SPECIALIZED_BASE_BONUS);
}

#[test]
fn scoring_prefers_winnable_engagements() {
    let board = Layout::new(5)
        .troops(CellId::new(2, 2), Faction::Ai, 10, 1)
        .troops(CellId::new(1, 2), Faction::Player, 30, 0)
        .troops(CellId::new(3, 2), Faction::Player, 3, 0)
        .build();

    let decision = Opponent::default()
        .select_move(&board)
        .expect("a move is available");
    assert_eq!(decision.tier, Tier::Aggression);
    assert_eq!(decision.order.to, CellId::new(3, 2));
}

#[test]
fn exhausted_armies_pass() {
    let board = Layout::new(4)
        .kind(CellId::new(3, 3), CellKind::Base, None)
        .troops(CellId::new(3, 3), Faction::Ai, 10, 0)
        .build();

    assert_eq!(Opponent::default().select_move(&board), None);
}

#[test]
fn decisions_are_legal_for_the_resolver() {
    let board = Layout::new(6)
        .kind(CellId::new(0, 0), CellKind::Base, None)
        .troops(CellId::new(0, 0), Faction::Player, 10, 3)
        .troops(CellId::new(1, 0), Faction::Player, 10, 3)
        .kind(CellId::new(5, 5), CellKind::Base, None)
        .troops(CellId::new(5, 5), Faction::Ai, 10, 3)
        .build();

    for faction in Faction::ALL {
        let mut opponent = Opponent::new(faction);
        let decision = opponent.select_move(&board).expect("a move is available");
        assert_eq!(decision.order.faction, faction);
        assert!(perform_move(&board, decision.order, &mut SteadyChance::neutral()).is_ok());
    }
}

#[test]
fn production_needs_funds_and_a_base() {
    let board = Layout::new(5)
        .kind(CellId::new(4, 4), CellKind::Base, None)
        .troops(CellId::new(4, 4), Faction::Ai, 10, 0)
        .kind(CellId::new(0, 4), CellKind::Base, None)
        .troops(CellId::new(0, 4), Faction::Ai, 10, 0)
        .troops(CellId::new(2, 2), Faction::Ai, 10, 0)
        .build();
    let opponent = Opponent::default();

    assert_eq!(
        opponent.plan_production(&board, 0, &mut SteadyChance::neutral()),
        None
    );

    let plan = opponent
        .plan_production(&board, 1, &mut SteadyChance::neutral().with_index(1))
        .expect("one infantry is affordable");
    assert_eq!(plan.unit, UnitType::Infantry);
    assert_eq!(plan.cost, 1);
    assert_eq!(plan.cell, CellId::new(4, 4), "second base in row-major order");

    let baseless = Layout::new(4)
        .troops(CellId::new(1, 1), Faction::Ai, 10, 0)
        .build();
    assert_eq!(
        opponent.plan_production(&baseless, 5, &mut SteadyChance::neutral()),
        None
    );
}

/// Source whose index draws fall outside the requested range.
struct OverreachingChance;

impl Chance for OverreachingChance {
    fn unit(&mut self) -> f64 {
        0.5
    }

    fn index(&mut self, len: usize) -> usize {
        len + 3
    }

    fn fortune(&mut self) -> f64 {
        1.0
    }

    fn reward(&mut self) -> u32 {
        2
    }
}

#[test]
fn out_of_range_base_draws_skip_production() {
    let board = Layout::new(4)
        .kind(CellId::new(3, 3), CellKind::Base, None)
        .troops(CellId::new(3, 3), Faction::Ai, 10, 0)
        .build();

    assert_eq!(
        Opponent::default().plan_production(&board, 5, &mut OverreachingChance),
        None
    );
}
