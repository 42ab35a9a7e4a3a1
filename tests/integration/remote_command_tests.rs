//! Game master commands arriving on the control topic.

use escaperoom::app::events::GameEvent;
use escaperoom::config::GameConfig;
use escaperoom::drivers::clock_display::encode_mmss;
use escaperoom::drivers::led_patterns::{COLOUR_OFF, COLOUR_WHEELS_HINT};
use escaperoom::fsm::Stage;
use escaperoom::inbox::INBOX_DEPTH;
use escaperoom::pins;
use escaperoom::puzzles::hint::HintState;
use escaperoom::puzzles::{Puzzle, PuzzleId, PuzzlePhase};

use crate::mock_hw::Room;

fn reset_broadcasts(room: &Room) -> usize {
    room.published()
        .iter()
        .filter(|&&(topic, payload)| topic == "esp" && payload == "global_reset")
        .count()
}

// ── Game lifecycle ────────────────────────────────────────────

#[test]
fn start_game_arms_countdown() {
    let mut room = Room::new();
    room.command("start_game");
    assert_eq!(room.stage(), Stage::Wheels);
    assert!(room.svc.countdown().is_running());
    assert!(room.log.contains(&GameEvent::StageChanged {
        from: Stage::Ready,
        to: Stage::Wheels
    }));

    room.run_for(2_000);
    assert_eq!(room.hw.clock, encode_mmss(898));
}

#[test]
fn start_game_only_from_ready() {
    let mut room = Room::new();
    room.start_and_solve_wheels();
    room.command("start_game");
    assert_eq!(room.stage(), Stage::Fuel);
}

#[test]
fn remote_reset_mid_game() {
    let mut room = Room::new();
    room.start_and_solve_wheels();
    room.pour(0, 1);

    room.command("global_reset");
    assert_eq!(room.stage(), Stage::Ready);
    assert!(room.log.contains(&GameEvent::GlobalReset { announce: false }));
    assert!(!room.svc.countdown().is_running());
    assert_eq!(room.fuel_volumes(), [8, 0, 0]);
    for id in PuzzleId::ALL {
        assert_eq!(room.svc.puzzle(id).phase(), PuzzlePhase::Unsolved);
    }

    // Only the boot announcement went out.
    assert_eq!(reset_broadcasts(&room), 1);
}

// ── Countdown adjustment ──────────────────────────────────────

#[test]
fn add_min_shows_and_publishes_at_once() {
    let mut room = Room::new();
    room.tick();
    room.command("add_min");
    assert_eq!(room.svc.countdown().duration_secs(), 960);
    assert_eq!(room.hw.clock, encode_mmss(960));
    assert!(room.published().contains(&("esp_timer", "16:00")));
}

#[test]
fn add_min_while_running_extends_remaining() {
    let mut room = Room::new();
    room.command("start_game");
    room.run_for(5_000);
    room.command("add_min");
    let remaining = room.svc.countdown().remaining_secs(room.now);
    assert!((954..=956).contains(&remaining), "remaining {remaining}");
}

#[test]
fn sub_min_keeps_at_least_one_step() {
    let config = GameConfig {
        game_duration_secs: 120,
        ..GameConfig::default()
    };
    let mut room = Room::with_config(config);
    room.command("sub_min");
    assert_eq!(room.svc.countdown().duration_secs(), 60);
    room.command("sub_min");
    assert_eq!(room.svc.countdown().duration_secs(), 60);
    room.tick();
    assert_eq!(room.hw.clock, encode_mmss(60));
}

// ── Remote solves ─────────────────────────────────────────────

#[test]
fn remote_solve_skips_stage_silently() {
    let mut room = Room::new();
    room.command("start_game");
    room.command("wheels_solve");

    assert_eq!(room.stage(), Stage::Fuel);
    assert!(!room.log.contains(&GameEvent::PuzzleSolved(PuzzleId::Wheels)));
    assert!(!room.published().contains(&("esp", "wheels_solved")));
    assert!(room.hw.relays[PuzzleId::Wheels.index()]);
}

#[test]
fn remote_solve_ahead_of_stage() {
    let mut room = Room::new();
    room.command("start_game");
    room.command("water_solved");
    assert_eq!(room.stage(), Stage::Wheels);
    assert_eq!(room.svc.puzzle(PuzzleId::Fuel).phase(), PuzzlePhase::Solving);

    room.hw.inputs.wheels_sensor = true;
    room.tick();
    assert_eq!(room.stage(), Stage::Fuel);
    room.tick();
    assert_eq!(room.stage(), Stage::Stars);
    assert!(room.log.contains(&GameEvent::PuzzleSolved(PuzzleId::Wheels)));
    assert!(!room.log.contains(&GameEvent::PuzzleSolved(PuzzleId::Fuel)));
}

#[test]
fn remote_solve_last_puzzle_completes_game() {
    let mut room = Room::new();
    room.command("start_game");
    for cmd in ["wheels_solve", "fuel_solve", "stars_solve"] {
        room.command(cmd);
    }
    room.tick();
    room.tick();
    assert_eq!(room.stage(), Stage::Solved);
    assert_eq!(
        room.log.count(|e| matches!(e, GameEvent::GameCompleted { .. })),
        1
    );
}

#[test]
fn repeated_solve_pulses_once() {
    let mut room = Room::new();
    room.command("stars_solve");
    room.run_for(300);
    room.command("stars_solve");
    room.run_for(2_000);
    assert_eq!(room.hw.release_count(PuzzleId::Stars), 1);
    assert_eq!(room.svc.puzzle(PuzzleId::Stars).phase(), PuzzlePhase::Solved);
}

// ── Hints ─────────────────────────────────────────────────────

#[test]
fn fuel_hint_pours_in_background() {
    let mut room = Room::new();
    room.start_and_solve_wheels();
    room.command("fuel_hint");
    room.run_for(5_000);

    assert_eq!(room.fuel_volumes(), [3, 2, 3]);
    assert_eq!(room.svc.puzzle(PuzzleId::Fuel).hint_state(), HintState::Given);
    assert_eq!(room.stage(), Stage::Fuel);
}

#[test]
fn fuel_reset_keeps_hint_global_reset_clears_it() {
    let mut room = Room::new();
    room.start_and_solve_wheels();
    room.command("fuel_hint");
    room.run_for(5_000);

    room.command("fuel_reset");
    assert_eq!(room.fuel_volumes(), [3, 2, 3]);

    room.press_fuel_reset();
    assert_eq!(room.fuel_volumes(), [3, 2, 3]);

    room.command("global_reset");
    assert_eq!(room.fuel_volumes(), [8, 0, 0]);
    assert_eq!(room.svc.puzzle(PuzzleId::Fuel).hint_state(), HintState::Off);
}

#[test]
fn fuel_hint_finishes_from_hinted_start() {
    let mut room = Room::new();
    room.start_and_solve_wheels();
    room.command("fuel_hint");
    room.run_for(5_000);

    // [3,2,3] → 2→0 → 1→2 → 0→1 → 1→2 reaches 4 in container 1.
    for (from, to) in [(2, 0), (1, 2), (0, 1), (1, 2)] {
        room.pour(from, to);
    }
    room.run_for(3_000);
    assert_eq!(room.stage(), Stage::Stars);
    assert!(room.log.contains(&GameEvent::PuzzleSolved(PuzzleId::Fuel)));
}

#[test]
fn wheels_hint_lights_its_led() {
    let mut room = Room::new();
    room.command("wheels_hint");
    room.tick();
    assert_eq!(room.hw.pixels[pins::WHEELS_HINT_LED], COLOUR_WHEELS_HINT);

    room.command("wheels_reset");
    assert_eq!(room.hw.pixels[pins::WHEELS_HINT_LED], COLOUR_WHEELS_HINT);

    room.command("global_reset");
    assert_eq!(room.hw.pixels[pins::WHEELS_HINT_LED], COLOUR_OFF);
}

#[test]
fn stars_hint_is_a_flag() {
    let mut room = Room::new();
    room.command("star_hint");
    assert_eq!(room.svc.puzzle(PuzzleId::Stars).hint_state(), HintState::Given);
}

#[test]
fn hint_after_solve_is_ignored() {
    let mut room = Room::new();
    room.command("wheels_solve");
    room.command("wheels_hint");
    assert_eq!(room.svc.puzzle(PuzzleId::Wheels).hint_state(), HintState::Off);
}

// ── Compartments ──────────────────────────────────────────────

#[test]
fn comp_open_pulses_without_solving() {
    let mut room = Room::new();
    room.command("comp_2_open");
    assert!(room.log.contains(&GameEvent::CompartmentOpened(PuzzleId::Fuel)));
    assert!(room.hw.relays[PuzzleId::Fuel.index()]);

    room.run_for(1_500);
    assert!(!room.hw.relays[PuzzleId::Fuel.index()]);
    assert_eq!(room.hw.release_count(PuzzleId::Fuel), 1);
    assert_eq!(room.svc.puzzle(PuzzleId::Fuel).phase(), PuzzlePhase::Unsolved);
}

#[test]
fn comp_open_out_of_range_is_ignored() {
    let mut room = Room::new();
    room.command("comp_4_open");
    room.command("comp_0_open");
    room.run_for(1_500);
    assert!(room.hw.releases().is_empty());
}

// ── Plumbing ──────────────────────────────────────────────────

#[test]
fn unknown_commands_change_nothing() {
    let mut room = Room::new();
    room.command("start_game");
    let events = room.log.events.len();
    for junk in ["fuel_pour", "START_GAME", "moon_hint", "comp_x_open"] {
        room.command(junk);
    }
    assert_eq!(room.stage(), Stage::Wheels);
    assert!(
        room.log.events[events..]
            .iter()
            .all(|e| matches!(e, GameEvent::TimerUpdate { .. }))
    );
}

#[test]
fn injected_payload_reaches_the_game() {
    let mut room = Room::new();
    assert!(room.broker.transport().inject(b"start_game\n"));
    room.tick();
    assert_eq!(room.stage(), Stage::Wheels);
}

#[test]
fn disconnected_transport_delivers_nothing() {
    let mut room = Room::new();
    room.broker.transport().drop_connection();
    assert!(!room.broker.transport().inject(b"start_game"));
    room.tick();
    assert_eq!(room.stage(), Stage::Ready);
}

#[test]
fn burst_beyond_inbox_depth_is_dropped() {
    let mut room = Room::new();
    for _ in 0..INBOX_DEPTH {
        assert!(room.inbox.push(b"add_min"));
    }
    assert!(!room.inbox.push(b"add_min"));
    room.tick();
    assert_eq!(
        room.svc.countdown().duration_secs(),
        900 + 60 * INBOX_DEPTH as u32
    );
}
