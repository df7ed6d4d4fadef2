//! The fixed per-round sequence and end-of-round settlement.

use log::{debug, error, info, warn};

use crate::error::EngineError;
use crate::provider::ActionProvider;
use crate::recorder::{ActionKind, ActionTarget, IslandSnapshot, RoundEvent, WellSnapshot};

use super::constants::{
    DESTABILIZE_DAMAGE, FLAG_BROADCAST_UPDATE_INTERVAL, FLAG_DROPPED_RESET_ROUNDS, GLOBAL_UPGRADE_ROUNDS,
    INITIAL_RESOURCES, PASSIVE_INCREASE_ROUNDS, PASSIVE_RESOURCES,
};
use super::invariants::check_invariants;
use super::{
    decide_winner, resolve_currents, Drifter, GameWorld, GlobalUpgrade, IslandTick, MatchOutcome, ResourceType,
    Robot, RobotController, RobotId, Team, TeamStanding,
};

/// Whether the match continues after a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    /// More rounds to play.
    Running,
    /// A winner is set; no further rounds run.
    Finished,
}

impl GameWorld {
    /// Play one round against `provider`.
    ///
    /// # Errors
    ///
    /// Returns the engine fault that abandoned the round. The round is not
    /// recorded, the match stops, and the log gets no footer.
    pub fn run_round(&mut self, provider: &mut dyn ActionProvider) -> Result<RoundStatus, EngineError> {
        if !self.running {
            return Ok(RoundStatus::Finished);
        }
        if self.round == 0 {
            provider.match_started(self);
            self.drain_notifications(provider);
        }
        if let Err(err) = self.play_round(provider) {
            error!("round {} abandoned: {err}", self.round);
            self.recorder.discard_round();
            self.running = false;
            provider.match_ended(None);
            return Err(err);
        }
        if self.running {
            return Ok(RoundStatus::Running);
        }
        provider.match_ended(self.outcome);
        Ok(RoundStatus::Finished)
    }

    /// Play rounds until the match ends.
    ///
    /// # Errors
    ///
    /// Returns the first engine fault.
    pub fn run_to_end(&mut self, provider: &mut dyn ActionProvider) -> Result<Option<MatchOutcome>, EngineError> {
        while self.run_round(provider)? == RoundStatus::Running {}
        Ok(self.outcome)
    }

    fn play_round(&mut self, provider: &mut dyn ActionProvider) -> Result<(), EngineError> {
        if self.round % FLAG_BROADCAST_UPDATE_INTERVAL == 0 {
            self.update_broadcasts();
        }
        self.round += 1;
        if self.round % GLOBAL_UPGRADE_ROUNDS == 0 {
            self.ledger.grant_upgrade_points();
        }
        for robot in self.registry.iter_mut() {
            robot.process_beginning_of_round();
        }
        provider.round_started(self.round);

        if self.round == 1 {
            for team in Team::ALL {
                self.ledger.add_all(team, INITIAL_RESOURCES)?;
            }
        }

        for id in self.registry.execution_order() {
            self.run_turn(id, provider);
            self.drain_notifications(provider);
            self.take_fault()?;
        }
        provider.round_ended(self.round);

        if self.round % PASSIVE_INCREASE_ROUNDS == 0 {
            for team in Team::ALL {
                self.ledger.add_all(team, PASSIVE_RESOURCES)?;
            }
        }

        self.settle(provider)
    }

    fn run_turn(&mut self, id: RobotId, provider: &mut dyn ActionProvider) {
        let Some(robot) = self.registry.get_mut(id) else {
            return;
        };
        robot.process_beginning_of_turn();

        let report = match RobotController::new(self, id) {
            Some(mut controller) => provider.run_robot(&mut controller),
            None => return,
        };

        self.recorder.record_instructions(id, report.instructions_used);
        let Some(robot) = self.registry.get_mut(id) else {
            return;
        };
        robot.set_instructions_used(report.instructions_used);

        if let Some(fault) = report.fault {
            warn!("robot {id} died in round {} after an uncaught fault: {fault}", self.round);
            self.record_action(id, ActionKind::DieException, ActionTarget::None);
            self.destroy_robot(id);
            return;
        }

        if let Some(robot) = self.registry.get_mut(id) {
            robot.process_end_of_turn();
        }
        if provider.is_terminated(id) {
            debug!("robot {id} terminated by its provider");
            self.despawn_robot(id);
        }
    }

    fn drain_notifications(&mut self, provider: &mut dyn ActionProvider) {
        for id in std::mem::take(&mut self.pending_spawns) {
            provider.robot_spawned(id);
        }
        for id in std::mem::take(&mut self.pending_kills) {
            provider.robot_killed(id);
        }
    }

    fn take_fault(&mut self) -> Result<(), EngineError> {
        match self.engine_fault.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn settle(&mut self, provider: &mut dyn ActionProvider) -> Result<(), EngineError> {
        self.advance_islands();

        if self.round == self.config.setup_rounds {
            for team in Team::ALL {
                if self.flags.confirm_placements(team) {
                    info!("{team:?} flags placed too close together; all reset to spawn locations");
                }
            }
        }
        if self.round > self.config.setup_rounds {
            self.reset_dropped_flags();
        }

        self.expire_effects();
        for robot in self.registry.iter() {
            self.recorder
                .record_indicators(robot.id(), robot.indicator_string(), robot.indicators());
        }
        self.apply_currents()?;
        self.drain_notifications(provider);

        if self.round >= self.round_limit && self.outcome.is_none() {
            let standings = self.standings();
            let outcome = decide_winner(standings, || self.coin_team());
            self.outcome = Some(outcome);
        }
        if let Some(outcome) = self.outcome {
            self.running = false;
            info!(
                "match on {} won by {:?} ({}) after {} rounds",
                self.name, outcome.winner, outcome.reason, self.round
            );
        }
        self.take_fault()?;

        if self.config.check_invariants {
            let violations = check_invariants(self);
            if !violations.is_empty() {
                let messages: Vec<String> = violations.iter().map(ToString::to_string).collect();
                return Err(EngineError::Inconsistent(messages.join("; ")));
            }
        }

        self.flush_round();
        Ok(())
    }

    fn advance_islands(&mut self) {
        for i in 0..self.islands.len() {
            let mut occupied = [0; 2];
            for cell in self.islands[i].cells() {
                let team = self
                    .registry
                    .robot_at(*cell)
                    .and_then(|id| self.registry.get(id))
                    .map(Robot::team);
                if let Some(team) = team {
                    occupied[team.index()] += 1;
                }
            }
            if let IslandTick::Lost { owner, anchor } = self.islands[i].advance(occupied) {
                if anchor.acceleration_radius_squared().is_some() {
                    self.effects.remove_anchor(&mut self.grid, &self.island_reach[i], owner);
                }
                let island = self.islands[i].id();
                info!("{owner:?} lost island {island} in round {}", self.round);
                self.recorder.record(RoundEvent::IslandLost { island, team: owner });
            }
        }
    }

    fn reset_dropped_flags(&mut self) {
        let ledger = &self.ledger;
        let reset = self.flags.age_dropped(|team| {
            if ledger.has_upgrade(team.opponent(), GlobalUpgrade::Capturing) {
                FLAG_DROPPED_RESET_ROUNDS + GlobalUpgrade::Capturing.flag_return_delay()
            } else {
                FLAG_DROPPED_RESET_ROUNDS
            }
        });
        for flag in reset {
            if let Some(location) = self.flags.get(flag).map(super::Flag::location) {
                debug!("flag {flag} returned to {location}");
                self.recorder.record(RoundEvent::FlagReset { flag, location });
            }
        }
    }

    fn expire_effects(&mut self) {
        for tick in self.effects.expire(&mut self.grid, self.round) {
            if let Some(victim) = self
                .registry
                .robot_at(tick.location)
                .filter(|id| self.registry.get(*id).is_some_and(|r| r.team() == tick.team))
            {
                self.damage_robot(victim, DESTABILIZE_DAMAGE);
            }
        }
    }

    fn apply_currents(&mut self) -> Result<(), EngineError> {
        let drifters: Vec<Drifter> = self
            .registry
            .iter()
            .filter_map(|r| {
                r.location().map(|location| Drifter {
                    id: r.id(),
                    location,
                    mobile: r.kind().can_move(),
                })
            })
            .collect();
        let moves = resolve_currents(&self.grid, &drifters, self.is_setup_phase());
        if moves.is_empty() {
            return Ok(());
        }
        self.registry.relocate_all(&moves)?;
        for &(id, to) in &moves {
            if let Some(from) = drifters.iter().find(|d| d.id == id).map(|d| d.location) {
                self.recorder.record(RoundEvent::Moved { id, from, to });
            }
            self.flags.follow_carrier(id, to);
        }
        Ok(())
    }

    fn standings(&self) -> [TeamStanding; 2] {
        Team::ALL.map(|team| {
            let mut standing = TeamStanding {
                flags_captured: self.ledger.flags_captured(team),
                base_resource: self.ledger.resource(team, ResourceType::Adamantium),
                flags_picked_up: self.ledger.flags_picked_up(team),
                ..TeamStanding::default()
            };
            for robot in self.registry.team(team).filter(|r| !r.kind().is_base()) {
                match robot.tier() {
                    tier if tier >= 3 => standing.tier_three += 1,
                    2 => standing.tier_two += 1,
                    _ => {}
                }
            }
            standing
        })
    }

    fn flush_round(&mut self) {
        let deltas = self.ledger.end_round();
        let islands = self
            .islands
            .iter()
            .map(|island| IslandSnapshot {
                id: island.id(),
                owner: island.owner(),
                anchor: island.anchor(),
                turns_left: island.turns_left(),
            })
            .collect();
        let wells = self
            .wells
            .iter()
            .map(|well| WellSnapshot {
                location: well.location(),
                kind: well.kind(),
                inventory: well.inventory(),
                upgraded: well.is_upgraded(),
            })
            .collect();
        self.recorder.flush_round(self.round, deltas, islands, wells);
        if !self.running {
            if let Some(outcome) = self.outcome {
                self.recorder.finish(outcome, self.round);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::provider::{ActionProvider, TurnReport};
    use crate::world::{Direction, MapBuilder, MapLocation, RobotType, Symmetry};

    #[derive(Default)]
    struct Scripted {
        started: bool,
        ended: Option<Option<MatchOutcome>>,
        spawned: Vec<RobotId>,
        killed: Vec<RobotId>,
        faulty: Option<RobotId>,
        quitter: Option<RobotId>,
        turns: Vec<(u32, RobotId)>,
        round: u32,
    }

    impl ActionProvider for Scripted {
        fn match_started(&mut self, _world: &GameWorld) {
            self.started = true;
        }

        fn round_started(&mut self, round: u32) {
            self.round = round;
        }

        fn run_robot(&mut self, controller: &mut RobotController<'_>) -> TurnReport {
            self.turns.push((self.round, controller.id()));
            if self.faulty == Some(controller.id()) {
                return TurnReport {
                    instructions_used: 7,
                    fault: Some("boom".into()),
                };
            }
            if self.quitter == Some(controller.id()) {
                let spot = controller.ally_spawn_locations()[0];
                controller.spawn(spot).unwrap();
                controller.disintegrate().unwrap();
                return TurnReport {
                    instructions_used: 123,
                    fault: None,
                };
            }
            TurnReport::default()
        }

        fn robot_spawned(&mut self, robot: RobotId) {
            self.spawned.push(robot);
        }

        fn robot_killed(&mut self, robot: RobotId) {
            self.killed.push(robot);
        }

        fn match_ended(&mut self, outcome: Option<MatchOutcome>) {
            self.ended = Some(outcome);
        }
    }

    fn create_test_world(rounds: u32) -> GameWorld {
        let mut builder = MapBuilder::new("round", 20, 20, Symmetry::Rotational)
            .rounds(rounds)
            .roster(vec![RobotType::Duck]);
        builder
            .spawn_zone(Team::A, MapLocation::new(2, 2))
            .spawn_zone(Team::B, MapLocation::new(17, 17))
            .headquarters(Team::A, MapLocation::new(0, 0))
            .headquarters(Team::B, MapLocation::new(19, 19));
        let config = MatchConfig {
            setup_rounds: 3,
            check_invariants: true,
            ..MatchConfig::default()
        };
        GameWorld::new(&builder.build(), config).unwrap()
    }

    #[test]
    fn test_initial_and_passive_income() {
        let mut world = create_test_world(50);
        let mut provider = Scripted::default();
        world.run_round(&mut provider).unwrap();
        assert_eq!(world.ledger().resources(Team::A), INITIAL_RESOURCES);
        for _ in 0..4 {
            world.run_round(&mut provider).unwrap();
        }
        assert_eq!(world.ledger().resource(Team::B, ResourceType::Adamantium), 206);
        assert_eq!(world.log().rounds.len(), 5);
        assert!(provider.started);
        assert_eq!(provider.spawned.len(), 2);
    }

    #[test]
    fn test_every_robot_gets_one_turn_per_round() {
        let mut world = create_test_world(50);
        let mut provider = Scripted::default();
        world.run_round(&mut provider).unwrap();
        assert_eq!(provider.turns.len(), 4);
        let mut ids: Vec<RobotId> = provider.turns.iter().map(|(_, id)| *id).collect();
        let expected = ids.clone();
        ids.sort_unstable();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_uncaught_fault_destroys_robot() {
        let mut world = create_test_world(50);
        let duck = world
            .robots()
            .iter()
            .find(|r| r.kind() == RobotType::Duck)
            .map(Robot::id)
            .unwrap();
        let mut provider = Scripted {
            faulty: Some(duck),
            ..Scripted::default()
        };
        world.run_round(&mut provider).unwrap();
        assert!(world.robot(duck).is_none());
        assert_eq!(provider.killed, vec![duck]);
        let record = &world.log().rounds[0];
        assert!(record.instructions.contains(&(duck, 7)));
        assert!(record.events.contains(&RoundEvent::Action {
            actor: duck,
            kind: ActionKind::DieException,
            target: ActionTarget::None,
        }));
    }

    #[test]
    fn test_instructions_recorded_for_robot_dying_on_its_turn() {
        let mut world = create_test_world(50);
        let duck = world
            .robots()
            .team(Team::A)
            .find(|r| r.kind() == RobotType::Duck)
            .map(Robot::id)
            .unwrap();
        let mut provider = Scripted {
            quitter: Some(duck),
            ..Scripted::default()
        };
        world.run_round(&mut provider).unwrap();
        assert!(world.robot(duck).is_none());
        assert_eq!(provider.killed, vec![duck]);
        assert!(world.log().rounds[0].instructions.contains(&(duck, 123)));
    }

    #[test]
    fn test_round_limit_decides_winner() {
        let mut world = create_test_world(6);
        let mut provider = Scripted::default();
        let outcome = world.run_to_end(&mut provider).unwrap().unwrap();
        assert_eq!(world.round(), 6);
        assert!(!world.is_running());
        assert_eq!(provider.ended, Some(Some(outcome)));
        let footer = world.log().footer.unwrap();
        assert_eq!(footer.rounds, 6);
        assert_eq!(footer.winner, outcome.winner);
        assert_eq!(world.run_round(&mut provider).unwrap(), RoundStatus::Finished);
    }

    #[test]
    fn test_engine_fault_abandons_round() {
        let mut world = create_test_world(50);
        let mut provider = Scripted::default();
        world.run_round(&mut provider).unwrap();
        world.fault(EngineError::Inconsistent("test".into()));
        let err = world.run_round(&mut provider).unwrap_err();
        assert_eq!(err, EngineError::Inconsistent("test".into()));
        assert!(!world.is_running());
        assert_eq!(world.log().rounds.len(), 1);
        assert!(world.log().footer.is_none());
        assert_eq!(provider.ended, Some(None));
    }

    #[test]
    fn test_currents_carry_spawned_robots() {
        let mut builder = MapBuilder::new("drift", 20, 20, Symmetry::Rotational).roster(vec![RobotType::Duck]);
        builder
            .spawn_zone(Team::A, MapLocation::new(2, 2))
            .spawn_zone(Team::B, MapLocation::new(17, 17))
            .current(MapLocation::new(8, 8), Direction::East);
        let mut world = GameWorld::new(&builder.build(), MatchConfig::default()).unwrap();
        let duck = world.robots().team(Team::A).map(Robot::id).next().unwrap();
        world.spawn_robot(duck, MapLocation::new(8, 8));
        world.run_round(&mut Scripted::default()).unwrap();
        assert_eq!(world.robot(duck).unwrap().location(), Some(MapLocation::new(9, 8)));
    }
}
