//! End-to-end room runs: keypad start, each puzzle solved with its own
//! inputs, the completion report, and the game master keypad.

use escaperoom::app::events::GameEvent;
use escaperoom::drivers::clock_display::encode_mmss;
use escaperoom::drivers::led_patterns::{COLOUR_CORRECT, COLOUR_FUEL, COLOUR_OFF};
use escaperoom::fsm::Stage;
use escaperoom::pins;
use escaperoom::puzzles::{Puzzle, PuzzleId, PuzzlePhase};

use crate::mock_hw::Room;

#[test]
fn boots_into_ready_showing_full_duration() {
    let mut room = Room::new();
    room.tick();

    assert_eq!(room.stage(), Stage::Ready);
    assert_eq!(room.log.events[0], GameEvent::Started(Stage::Ready));
    assert_eq!(room.hw.clock, encode_mmss(900));
    assert_eq!(room.hw.relays, [false; 3]);
    assert!(!room.svc.countdown().is_running());
}

#[test]
fn level_leds_show_starting_volumes() {
    let mut room = Room::new();
    room.tick();

    for &led in &pins::FUEL_LED_MAP[..8] {
        assert_eq!(room.hw.pixels[led], COLOUR_FUEL);
    }
    for &led in &pins::FUEL_LED_MAP[8..] {
        assert_eq!(room.hw.pixels[led], COLOUR_OFF);
    }
}

#[test]
fn broker_link_blinks_green_at_boot() {
    let mut room = Room::new();
    room.tick();
    for &led in &pins::STAR_PROGRESS_LEDS {
        assert_eq!(room.hw.pixels[led], COLOUR_CORRECT);
    }
    room.run_for(1_500);
    for &led in &pins::STAR_PROGRESS_LEDS {
        assert_eq!(room.hw.pixels[led], COLOUR_OFF);
    }
}

#[test]
fn full_game_in_order() {
    let mut room = Room::new();

    // Wheels
    room.start_and_solve_wheels();
    assert!(room.svc.countdown().is_running());
    assert!(room.log.contains(&GameEvent::PuzzleSolved(PuzzleId::Wheels)));
    assert!(room.hw.relays[PuzzleId::Wheels.index()]);
    room.run_for(1_500);
    assert!(!room.hw.relays[PuzzleId::Wheels.index()]);
    assert_eq!(room.svc.puzzle(PuzzleId::Wheels).phase(), PuzzlePhase::Solved);

    // Fuel
    room.solve_fuel();
    assert_eq!(room.fuel_volumes(), [1, 4, 3]);
    assert!(room.log.contains(&GameEvent::PuzzleSolved(PuzzleId::Fuel)));
    assert_eq!(room.stage(), Stage::Stars);
    assert!(!room.hw.transfer_led);

    // Stars
    room.type_keys("7031");
    room.run_for(1_500);
    assert!(room.log.contains(&GameEvent::PuzzleSolved(PuzzleId::Stars)));
    assert_eq!(room.stage(), Stage::Solved);

    let completed = room
        .log
        .events
        .iter()
        .find_map(|e| match e {
            GameEvent::GameCompleted { elapsed_secs } => Some(*elapsed_secs),
            _ => None,
        })
        .expect("completion reported");
    assert!(completed > 0 && completed < 60, "elapsed {completed}");

    // Each compartment released exactly once, in play order.
    room.run_for(1_500);
    assert_eq!(
        room.hw.releases(),
        vec![PuzzleId::Wheels, PuzzleId::Fuel, PuzzleId::Stars]
    );
}

#[test]
fn clock_freezes_once_solved() {
    let mut room = Room::new();
    room.start_and_solve_wheels();
    room.solve_fuel();
    room.type_keys("7031");
    room.run_for(1_500);
    assert_eq!(room.stage(), Stage::Solved);

    let frozen = room.hw.clock;
    let timer_updates = room.log.count(|e| matches!(e, GameEvent::TimerUpdate { .. }));
    room.run_for(5_000);
    assert_eq!(room.hw.clock, frozen);
    assert_eq!(
        room.log.count(|e| matches!(e, GameEvent::TimerUpdate { .. })),
        timer_updates
    );
}

#[test]
fn wrong_passcode_lets_players_retry() {
    let mut room = Room::new();
    room.start_and_solve_wheels();
    room.solve_fuel();

    room.type_keys("1234");
    room.run_for(1_500);
    assert_eq!(room.stage(), Stage::Stars);
    assert_eq!(room.svc.puzzle(PuzzleId::Stars).phase(), PuzzlePhase::Unsolved);

    room.type_keys("7031");
    room.run_for(1_500);
    assert_eq!(room.stage(), Stage::Solved);
}

#[test]
fn transfer_led_tracks_possible_pour() {
    let mut room = Room::new();
    room.start_and_solve_wheels();

    // 1 → 0: source empty, nothing can move.
    room.hw.inputs.port_link = Some((1, 0));
    room.tick();
    assert!(!room.hw.transfer_led);

    room.hw.inputs.port_link = Some((0, 1));
    room.tick();
    assert!(room.hw.transfer_led);

    // Unplugged before pressing: nothing poured.
    room.hw.inputs.port_link = None;
    room.tick();
    assert!(!room.hw.transfer_led);
    assert_eq!(room.fuel_volumes(), [8, 0, 0]);
}

#[test]
fn pour_runs_on_after_cable_pulled() {
    let mut room = Room::new();
    room.start_and_solve_wheels();

    room.hw.inputs.port_link = Some((0, 1));
    room.tick();
    room.press_transfer();
    room.hw.inputs.port_link = None;
    room.run_for(1_000);
    let [a, b, _] = room.fuel_volumes();
    assert_eq!(a + b, 8);
    assert!(b > 1 && b < 5, "poured {b}");

    room.run_for(2_000);
    assert_eq!(room.fuel_volumes(), [3, 5, 0]);
    assert!(!room.hw.transfer_led);
}

#[test]
fn fuel_reset_button_restores_start() {
    let mut room = Room::new();
    room.start_and_solve_wheels();
    room.pour(0, 1);
    assert_eq!(room.fuel_volumes(), [3, 5, 0]);

    room.press_fuel_reset();
    assert_eq!(room.fuel_volumes(), [8, 0, 0]);
    assert_eq!(room.stage(), Stage::Fuel);
}

#[test]
fn keys_are_ignored_outside_the_panel_and_stars() {
    let mut room = Room::new();
    room.start_and_solve_wheels();
    room.type_keys("#1*");
    assert_eq!(room.stage(), Stage::Fuel);
    assert_eq!(room.hw.release_count(PuzzleId::Wheels), 1);
    assert!(!room.log.contains(&GameEvent::GlobalReset { announce: true }));
}

#[test]
fn panel_digits_open_compartments() {
    let mut room = Room::new();
    room.press_key('2');
    assert_eq!(room.hw.release_count(PuzzleId::Fuel), 1);
    assert!(room.log.contains(&GameEvent::CompartmentOpened(PuzzleId::Fuel)));
    assert_eq!(room.svc.puzzle(PuzzleId::Fuel).phase(), PuzzlePhase::Unsolved);
    assert_eq!(room.stage(), Stage::Ready);

    room.press_key('9');
    assert_eq!(room.hw.release_count(PuzzleId::Stars), 0);
}

#[test]
fn hash_in_solved_returns_to_ready() {
    let mut room = Room::new();
    room.start_and_solve_wheels();
    room.solve_fuel();
    room.type_keys("7031");
    room.run_for(1_500);
    assert_eq!(room.stage(), Stage::Solved);

    // Start is ignored once solved.
    room.press_key('*');
    assert_eq!(room.stage(), Stage::Solved);

    room.press_key('#');
    assert_eq!(room.stage(), Stage::Ready);
    assert!(room.log.contains(&GameEvent::GlobalReset { announce: true }));
    assert_eq!(room.fuel_volumes(), [8, 0, 0]);
    for id in PuzzleId::ALL {
        assert_eq!(room.svc.puzzle(id).phase(), PuzzlePhase::Unsolved);
    }
    room.tick();
    assert_eq!(room.hw.clock, encode_mmss(900));
}

#[test]
fn wheels_already_aligned_at_start_solves_immediately() {
    let mut room = Room::new();
    room.hw.inputs.wheels_sensor = true;
    room.run_for(500);
    assert_eq!(room.stage(), Stage::Ready);

    room.press_key('*');
    assert_eq!(room.stage(), Stage::Fuel);
}
