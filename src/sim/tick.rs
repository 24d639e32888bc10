//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::collision::{Rect, first_rail_hit};
use super::state::{Drop, GameState};
use crate::lerp;
use crate::stats::{GameStats, StatsSink};
use crate::tuning::Tuning;

/// Something notable that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    DropSpawned { score: i32 },
    /// A drop reached the bottom and its score was applied
    DropLanded { score: i32 },
    /// A drop was intercepted by a rail (no score change)
    DropBlocked { rail: usize },
    LevelUp { level: u32 },
    GameOver { level: u32, total_ticks: u64 },
    /// The game-over fade finished; reported once per game
    FadeComplete,
}

/// Events produced by one tick, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub events: Vec<GameEvent>,
}

impl TickOutcome {
    /// Whether control should pass to the game-over screen
    pub fn fade_complete(&self) -> bool {
        self.events.contains(&GameEvent::FadeComplete)
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, tuning: &Tuning, stats: &mut dyn StatsSink) -> TickOutcome {
    let mut events = Vec::new();

    // Decay effect counters
    state.bad_shake = (state.bad_shake - tuning.bad_shake_decay).max(0.0);
    state.good_flash = (state.good_flash - tuning.good_flash_decay).max(0.0);
    state.level_up_flash = (state.level_up_flash - tuning.level_up_flash_decay).max(0.0);

    // Falling drops move down, resolved drops float back up while popping
    for drop in &mut state.drops {
        drop.pos.y += if drop.collected {
            -tuning.retract_speed
        } else {
            tuning.fall_speed
        };
    }

    if state.is_game_over {
        state.game_over_fade = (state.game_over_fade - 1.0).max(0.0);
        state.progress.lerp_value =
            lerp(state.progress.lerp_value, state.progress.value, tuning.lerp_factor);
        if state.game_over_fade <= 0.0 && !state.fade_signaled {
            state.fade_signaled = true;
            events.push(GameEvent::FadeComplete);
        }
        return TickOutcome { events };
    }

    state.total_ticks += 1;

    state.progress.value -= state.progress.decay_speed;
    if state.progress.value <= 0.0 {
        events.extend(mark_game_over(state, tuning, stats));
        return TickOutcome { events };
    }

    state.progress.lerp_value =
        lerp(state.progress.lerp_value, state.progress.value, tuning.lerp_factor);

    // Apply the latest drag sample
    if let Some(drag) = state.drag {
        match state.rails.get_mut(drag.rail) {
            Some(rail) => rail.set_offset(drag.target_offset(), tuning.board_size()),
            None => log::warn!("Drag on missing rail {}, ignoring", drag.rail),
        }
    }

    resolve_drops(state, tuning, &mut events);
    state.drops.retain(|d| !d.is_spent());

    if state.progress.value <= 0.0 {
        events.extend(mark_game_over(state, tuning, stats));
        return TickOutcome { events };
    }

    if state.progress.value >= tuning.max_progress_value {
        let gained = apply_level_progress(state, tuning);
        log::info!("Level up x{} -> level {}", gained, state.level + 1);
        events.push(GameEvent::LevelUp { level: state.level });
    }

    state.spawn_drop_delay -= 1;
    if state.spawn_drop_delay <= 0 {
        events.push(spawn_drop(state, tuning));
    }

    TickOutcome { events }
}

/// Resolve every drop in spawn order: pop, land, or rail block
fn resolve_drops(state: &mut GameState, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    let board_size = tuning.board_size();

    for drop in &mut state.drops {
        if drop.collected {
            drop.collect_pop = (drop.collect_pop - tuning.collect_pop_decay).max(0.0);
        } else if drop.pos.y >= board_size {
            state.progress.value += drop.score as f32;
            if drop.score < 0 {
                state.bad_shake += -drop.score as f32;
            } else {
                state.good_flash = 100.0;
            }
            drop.collect();
            log::debug!("Drop landed: {:+} ({})", drop.score, drop.symbol);
            events.push(GameEvent::DropLanded { score: drop.score });
        } else if tuning.rails_enabled {
            let hitbox = Rect::centered(drop.pos, tuning.drop_size);
            if let Some(rail) = first_rail_hit(&hitbox, &state.rails, tuning) {
                drop.collect();
                log::debug!("Drop {} blocked by rail {}", drop.symbol, rail);
                events.push(GameEvent::DropBlocked { rail });
            }
        }
    }
}

/// Latch the game-over state and publish the run's stats
///
/// Returns `None` if the game was already over.
pub fn mark_game_over(
    state: &mut GameState,
    tuning: &Tuning,
    stats: &mut dyn StatsSink,
) -> Option<GameEvent> {
    if state.is_game_over {
        return None;
    }

    state.progress.value = 0.0;
    state.is_game_over = true;
    state.game_over_fade = tuning.game_over_fade_ticks;
    state.bad_shake = tuning.game_over_shake;
    state.drag = None;

    stats.record(GameStats {
        level: state.level,
        total_ticks: state.total_ticks,
    });
    log::info!(
        "Game over at level {} after {} ticks",
        state.level + 1,
        state.total_ticks
    );

    Some(GameEvent::GameOver {
        level: state.level,
        total_ticks: state.total_ticks,
    })
}

/// Roll any overflow of the progress meter into new levels
///
/// Each level consumes `max - start` points. Returns the number of levels
/// gained. Always re-derives the decay speed and triggers the level-up flash.
pub fn apply_level_progress(state: &mut GameState, tuning: &Tuning) -> u32 {
    let mut gained = 0;
    while state.progress.value >= tuning.max_progress_value {
        state.progress.value =
            tuning.start_progress_value + (state.progress.value - tuning.max_progress_value);
        state.level += 1;
        gained += 1;
        if tuning.max_progress_value <= tuning.start_progress_value {
            // Degenerate tuning would never drain the meter
            state.progress.value = tuning.start_progress_value.min(tuning.max_progress_value - 1.0);
            break;
        }
    }

    state.progress.decay_speed = tuning.decay_speed_for_level(state.level);
    state.progress.lerp_value = 0.0;
    state.bad_shake = 0.0;
    state.good_flash = 0.0;
    state.level_up_flash = 100.0;
    gained
}

/// Spawn a drop above a random column and schedule the next one
pub fn spawn_drop(state: &mut GameState, tuning: &Tuning) -> GameEvent {
    state.spawn_drop_delay = state
        .rng
        .random_int(tuning.spawn_delay.min, tuning.spawn_delay.max);

    let is_bonus = state.rng.random_int(0, tuning.bonus_roll_max) <= tuning.bonus_roll_threshold;
    let tier = if is_bonus {
        state
            .rng
            .pick(&tuning.bonus_tiers)
            .unwrap_or(&tuning.penalty_tier)
    } else {
        &tuning.penalty_tier
    };

    let column = state.rng.random_int(0, tuning.column_count as i32 - 1);
    let pos = Vec2::new(
        tuning.cell_size / 2.0 + column as f32 * tuning.cell_size,
        -tuning.cell_size / 2.0,
    );

    state.drops.push(Drop::new(pos, tier));
    log::debug!("Spawned {} ({:+}) in column {}", tier.symbol, tier.score, column);
    GameEvent::DropSpawned { score: tier.score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{DragSession, Rail, RailSection};
    use crate::tuning::DropTier;
    use proptest::prelude::*;

    fn new_state(tuning: &Tuning) -> GameState {
        let mut state = GameState::new(tuning, 12345);
        // Keep spawns out of the way unless a test wants them
        state.spawn_drop_delay = 1000;
        state
    }

    fn drop_at(x: f32, y: f32, score: i32) -> Drop {
        Drop::new(Vec2::new(x, y), &DropTier::new(score, "x"))
    }

    #[test]
    fn test_first_tick_spawns_a_drop() {
        let tuning = Tuning::default();
        let mut state = GameState::new(&tuning, 1);
        let mut stats = GameStats::default();

        let outcome = tick(&mut state, &tuning, &mut stats);

        assert_eq!(state.drops.len(), 1);
        assert!(matches!(outcome.events[..], [GameEvent::DropSpawned { .. }]));
        assert!((10..=30).contains(&state.spawn_drop_delay));
        let drop = &state.drops[0];
        assert_eq!(drop.pos.y, -25.0);
        assert_eq!((drop.pos.x - 25.0) % 50.0, 0.0);
    }

    #[test]
    fn test_decay_and_lerp() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();

        tick(&mut state, &tuning, &mut stats);

        assert_eq!(state.total_ticks, 1);
        assert_eq!(state.progress.value, 4997.0);
        assert_eq!(state.progress.lerp_value, 4997.0 * 0.25);
    }

    #[test]
    fn test_penalty_landing_shakes() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();
        state.bad_shake = 0.0;
        // Bottom of the board is 500; this drop lands after the fall step
        state.drops.push(drop_at(25.0, 496.0, -500));

        let outcome = tick(&mut state, &tuning, &mut stats);

        assert_eq!(state.bad_shake, 500.0);
        assert_eq!(state.progress.value, 5000.0 - 3.0 - 500.0);
        assert!(state.drops[0].collected);
        assert_eq!(state.drops[0].collect_pop, 100.0);
        assert!(outcome.events.contains(&GameEvent::DropLanded { score: -500 }));
    }

    #[test]
    fn test_bonus_landing_flashes_without_stacking() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();
        state.drops.push(drop_at(25.0, 500.0, 800));
        state.drops.push(drop_at(75.0, 500.0, 500));

        tick(&mut state, &tuning, &mut stats);

        assert_eq!(state.good_flash, 100.0);
        assert_eq!(state.progress.value, 5000.0 - 3.0 + 1300.0);
    }

    #[test]
    fn test_rail_blocks_drop_without_scoring() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();
        state.rails[0] = Rail::new(0.0, vec![RailSection::new(100.0, 400.0)], 500.0);
        // Hitbox bottom reaches the first rail row (y = 250) after falling 5
        state.drops.push(drop_at(25.0, 235.0, 1000));

        let outcome = tick(&mut state, &tuning, &mut stats);

        assert!(state.drops[0].collected);
        assert_eq!(state.drops[0].collect_pop, 100.0);
        assert_eq!(state.progress.value, 4997.0);
        assert!(outcome.events.contains(&GameEvent::DropBlocked { rail: 0 }));
    }

    #[test]
    fn test_simplified_variant_ignores_rails() {
        let tuning = Tuning::simplified();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();
        state.drops.push(drop_at(25.0, 300.0, 1000));

        tick(&mut state, &tuning, &mut stats);

        assert!(!state.drops[0].collected);
        assert_eq!(state.drops[0].pos.y, 305.0);
    }

    #[test]
    fn test_collected_drops_pop_and_prune() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();
        let mut drop = drop_at(25.0, 100.0, 500);
        drop.collect();
        state.drops.push(drop);

        for expected in [75.0, 50.0, 25.0] {
            tick(&mut state, &tuning, &mut stats);
            assert_eq!(state.drops[0].collect_pop, expected);
        }
        assert_eq!(state.drops[0].pos.y, 70.0);

        tick(&mut state, &tuning, &mut stats);
        assert!(state.drops.is_empty());
    }

    #[test]
    fn test_drag_moves_and_wraps_rail() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();
        state.rails[1].offset = 400.0;
        state.drag = Some(DragSession {
            rail: 1,
            start_offset: 400.0,
            start_x: 100.0,
            current_x: 1350.0,
        });

        tick(&mut state, &tuning, &mut stats);
        assert_eq!(state.rails[1].offset, 150.0);

        state.drag.as_mut().unwrap().current_x = -1000.0;
        tick(&mut state, &tuning, &mut stats);
        assert_eq!(state.rails[1].offset, 300.0);
    }

    #[test]
    fn test_decay_into_game_over() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();
        state.level = 3;
        state.total_ticks = 41;
        state.progress.value = 5.0;
        state.progress.decay_speed = 10.0;

        let outcome = tick(&mut state, &tuning, &mut stats);

        assert!(state.is_game_over);
        assert_eq!(state.progress.value, 0.0);
        assert_eq!(state.game_over_fade, 30.0);
        assert_eq!(state.bad_shake, 1000.0);
        assert_eq!(
            stats,
            GameStats {
                level: 3,
                total_ticks: 42
            }
        );
        assert_eq!(
            outcome.events,
            vec![GameEvent::GameOver {
                level: 3,
                total_ticks: 42
            }]
        );
    }

    #[test]
    fn test_penalty_into_game_over() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();
        state.progress.value = 400.0;
        state.drops.push(drop_at(25.0, 500.0, -500));

        tick(&mut state, &tuning, &mut stats);

        assert!(state.is_game_over);
        assert_eq!(state.progress.value, 0.0);
        assert_eq!(state.total_ticks, 1);
    }

    #[test]
    fn test_game_over_only_fades() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();
        state.progress.value = 1.0;
        state.progress.lerp_value = 800.0;
        tick(&mut state, &tuning, &mut stats);
        assert!(state.is_game_over);
        let ticks = state.total_ticks;

        let mut fade_events = 0;
        for _ in 0..40 {
            let outcome = tick(&mut state, &tuning, &mut stats);
            if outcome.fade_complete() {
                fade_events += 1;
            }
            assert_eq!(state.total_ticks, ticks);
            assert!(state.game_over_fade >= 0.0);
        }

        assert_eq!(fade_events, 1);
        assert_eq!(state.game_over_fade, 0.0);
        assert!(state.progress.lerp_value < 1.0);
    }

    #[test]
    fn test_fade_completes_after_thirty_ticks() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();
        mark_game_over(&mut state, &tuning, &mut stats);

        for _ in 0..29 {
            assert!(!tick(&mut state, &tuning, &mut stats).fade_complete());
        }
        assert!(tick(&mut state, &tuning, &mut stats).fade_complete());
    }

    #[test]
    fn test_mark_game_over_is_idempotent() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();

        assert!(mark_game_over(&mut state, &tuning, &mut stats).is_some());
        state.game_over_fade = 10.0;
        assert!(mark_game_over(&mut state, &tuning, &mut stats).is_none());
        assert_eq!(state.game_over_fade, 10.0);
    }

    #[test]
    fn test_level_rollover_multiple_levels() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        state.progress.value = 22000.0;
        state.bad_shake = 300.0;
        state.good_flash = 80.0;

        let gained = apply_level_progress(&mut state, &tuning);

        // Each level consumes max - start = 5000 points
        assert_eq!(gained, 3);
        assert_eq!(state.level, 3);
        assert_eq!(state.progress.value, 7000.0);
        assert_eq!(state.progress.decay_speed, 9.0);
        assert_eq!(state.progress.lerp_value, 0.0);
        assert_eq!(state.bad_shake, 0.0);
        assert_eq!(state.good_flash, 0.0);
        assert_eq!(state.level_up_flash, 100.0);
    }

    #[test]
    fn test_level_up_during_tick() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let mut stats = GameStats::default();
        state.progress.value = 9000.0;
        state.drops.push(drop_at(25.0, 500.0, 5000));

        let outcome = tick(&mut state, &tuning, &mut stats);

        assert_eq!(state.level, 1);
        assert_eq!(state.progress.value, 5000.0 + 3997.0);
        assert_eq!(state.progress.decay_speed, 5.0);
        assert!(outcome.events.contains(&GameEvent::LevelUp { level: 1 }));
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let mut state1 = GameState::new(&tuning, 99999);
        let mut state2 = GameState::new(&tuning, 99999);
        let mut stats = GameStats::default();

        for _ in 0..300 {
            tick(&mut state1, &tuning, &mut stats);
            tick(&mut state2, &tuning, &mut stats);
        }

        assert_eq!(state1.total_ticks, state2.total_ticks);
        assert_eq!(state1.drops, state2.drops);
        assert_eq!(state1.rails, state2.rails);
        assert_eq!(state1.progress, state2.progress);
    }

    #[test]
    fn test_spawn_odds_favor_bonuses() {
        let tuning = Tuning::default();
        let mut state = new_state(&tuning);
        let spawns = 3000;
        for _ in 0..spawns {
            spawn_drop(&mut state, &tuning);
        }

        let bonuses = state.drops.iter().filter(|d| d.is_bonus()).count();
        let share = bonuses as f32 / spawns as f32;
        // Two of three rolls are bonuses
        assert!((0.60..0.73).contains(&share), "bonus share {}", share);
    }

    proptest! {
        #[test]
        fn prop_spawned_drops_come_from_tuning(seed in any::<u64>(), spawns in 1usize..200) {
            let tuning = Tuning::default();
            let mut state = GameState::new(&tuning, seed);
            let board = tuning.board_size();

            for _ in 0..spawns {
                let event = spawn_drop(&mut state, &tuning);
                let drop = state.drops.last().unwrap();
                prop_assert_eq!(event, GameEvent::DropSpawned { score: drop.score });

                let tier = DropTier::new(drop.score, &drop.symbol);
                prop_assert!(tier == tuning.penalty_tier || tuning.bonus_tiers.contains(&tier));

                let column = (drop.pos.x - tuning.cell_size / 2.0) / tuning.cell_size;
                prop_assert_eq!(column.fract(), 0.0);
                prop_assert!(column >= 0.0 && drop.pos.x < board);
                prop_assert_eq!(drop.pos.y, -tuning.cell_size / 2.0);

                prop_assert!(state.spawn_drop_delay >= tuning.spawn_delay.min);
                prop_assert!(state.spawn_drop_delay <= tuning.spawn_delay.max);
            }
        }

        #[test]
        fn prop_counters_never_negative(
            seed in any::<u64>(),
            ticks in 1usize..400,
            shake in 0.0f32..2000.0,
            flash in 0.0f32..100.0,
        ) {
            let tuning = Tuning::default();
            let mut state = GameState::new(&tuning, seed);
            let mut stats = GameStats::default();
            state.bad_shake = shake;
            state.good_flash = flash;
            state.level_up_flash = flash;

            for _ in 0..ticks {
                tick(&mut state, &tuning, &mut stats);
                prop_assert!(state.bad_shake >= 0.0);
                prop_assert!(state.good_flash >= 0.0);
                prop_assert!(state.level_up_flash >= 0.0);
                prop_assert!(state.game_over_fade >= 0.0);
                prop_assert!(state.drops.iter().all(|d| d.collect_pop >= 0.0));
                prop_assert!(state.drops.iter().all(|d| !d.is_spent()));
            }
        }

        #[test]
        fn prop_dragged_offset_stays_on_track(
            start_offset in 0.0f32..500.0,
            start_x in -2000.0f32..2000.0,
            current_x in -5000.0f32..5000.0,
        ) {
            let tuning = Tuning::default();
            let mut state = new_state(&tuning);
            let mut stats = GameStats::default();
            state.drag = Some(DragSession { rail: 2, start_offset, start_x, current_x });

            tick(&mut state, &tuning, &mut stats);

            let offset = state.rails[2].offset;
            prop_assert!((0.0..500.0).contains(&offset), "offset {} off track", offset);
        }

        #[test]
        fn prop_lerp_converges_geometrically(target in 1000.0f32..9000.0, n in 1i32..20) {
            let tuning = Tuning::default();
            let mut state = new_state(&tuning);
            let mut stats = GameStats::default();
            state.progress.decay_speed = 0.0;
            state.progress.value = target;
            state.progress.lerp_value = 0.0;

            for _ in 0..n {
                tick(&mut state, &tuning, &mut stats);
            }

            let expected = target * (1.0 - 0.75f32.powi(n));
            prop_assert!((state.progress.lerp_value - expected).abs() < target * 1e-4);
        }

        #[test]
        fn prop_landing_always_resolves(x in 0.0f32..500.0, y in 495.0f32..900.0, score in -500i32..5000) {
            let tuning = Tuning::default();
            let mut state = new_state(&tuning);
            let mut stats = GameStats::default();
            state.progress.value = 9000.0;
            state.drops.push(drop_at(x, y, score));

            tick(&mut state, &tuning, &mut stats);

            prop_assert!(state.drops[0].collected);
        }

        #[test]
        fn prop_level_rollover_leaves_meter_below_max(value in 10000.0f32..100000.0) {
            let tuning = Tuning::default();
            let mut state = new_state(&tuning);
            state.progress.value = value;

            let gained = apply_level_progress(&mut state, &tuning);

            prop_assert!(gained >= 1);
            prop_assert!(state.progress.value < tuning.max_progress_value);
            prop_assert!(state.progress.value >= tuning.start_progress_value);
            prop_assert_eq!(state.level, gained);
        }
    }
}
