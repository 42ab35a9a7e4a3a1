//! What the room tells the broker, and how it behaves when the broker
//! goes away.

use escaperoom::adapters::broker::LinkChange;
use escaperoom::config::GameConfig;
use escaperoom::drivers::led_patterns::{COLOUR_CORRECT, COLOUR_INCORRECT, COLOUR_OFF, COLOUR_PROGRESS};
use escaperoom::fsm::Stage;
use escaperoom::pins;

use crate::mock_hw::Room;

fn progress_leds(room: &Room) -> Vec<(u8, u8, u8)> {
    pins::STAR_PROGRESS_LEDS
        .iter()
        .map(|&led| room.hw.pixels[led])
        .collect()
}

fn count(room: &Room, topic: &str, payload: &str) -> usize {
    room.published()
        .iter()
        .filter(|&&(t, p)| t == topic && p == payload)
        .count()
}

#[test]
fn boot_subscribes_and_announces() {
    let room = Room::new();
    assert_eq!(room.broker.transport().subscriptions(), ["admin".to_string()]);
    assert_eq!(
        room.published(),
        vec![("esp", "global_reset"), ("esp_timer", "15:00")]
    );
}

#[test]
fn timer_is_rate_limited() {
    let mut room = Room::new();
    room.command("start_game");
    room.run_for(2_990);

    let timer: Vec<_> = room
        .published()
        .into_iter()
        .filter(|&(t, _)| t == "esp_timer")
        .collect();
    // Boot announce, then one update per 500 ms.
    assert!((6..=8).contains(&timer.len()), "{} updates", timer.len());
    assert!(timer.contains(&("esp_timer", "14:58")));
}

#[test]
fn room_solves_are_published() {
    let mut room = Room::new();
    room.start_and_solve_wheels();
    assert_eq!(count(&room, "esp", "wheels_solved"), 1);

    room.solve_fuel();
    assert_eq!(count(&room, "esp", "fuel_solved"), 1);

    room.type_keys("7031");
    room.run_for(1_500);
    assert_eq!(count(&room, "esp", "star_solved"), 1);
}

#[test]
fn completion_goes_to_finish_topic() {
    let mut config = GameConfig::default();
    config.network.finish_topic = heapless::String::try_from("esp_finish").unwrap();
    let mut room = Room::with_config(config);

    room.command("start_game");
    room.command("wheels_solve");
    room.command("fuel_solve");
    room.run_for(61_000);
    room.command("stars_solve");
    room.tick();

    assert_eq!(room.stage(), Stage::Solved);
    assert_eq!(count(&room, "esp_finish", "01:01"), 1);
}

#[test]
fn only_local_resets_are_broadcast() {
    let mut room = Room::new();
    room.command("global_reset");
    assert_eq!(count(&room, "esp", "global_reset"), 1);

    room.press_key('#');
    assert_eq!(count(&room, "esp", "global_reset"), 2);
}

#[test]
fn lost_link_flashes_red_and_drops_publications() {
    let mut room = Room::new();
    room.run_for(1_500);
    assert_eq!(progress_leds(&room), vec![COLOUR_OFF; 4]);

    room.broker.transport().drop_connection();
    assert_eq!(room.poll_broker(), Some(LinkChange::Lost));
    room.tick();
    assert_eq!(progress_leds(&room), vec![COLOUR_INCORRECT; 4]);

    let sent = room.published().len();
    room.command("start_game");
    room.run_for(1_000);
    assert_eq!(room.published().len(), sent);
    assert!(room.broker.dropped() > 0);
    assert_eq!(room.stage(), Stage::Wheels);
}

#[test]
fn reconnect_resubscribes_without_announcing() {
    let mut room = Room::new();
    room.broker.transport().drop_connection();
    assert_eq!(room.poll_broker(), Some(LinkChange::Lost));

    room.run_for(10_000);
    assert_eq!(room.poll_broker(), None);

    room.run_for(20_000);
    assert_eq!(room.poll_broker(), Some(LinkChange::Connected));
    assert_eq!(room.broker.transport().subscriptions().len(), 2);
    assert_eq!(count(&room, "esp", "global_reset"), 1);
    assert_eq!(count(&room, "esp_timer", "15:00"), 1);

    room.tick();
    assert_eq!(progress_leds(&room), vec![COLOUR_CORRECT; 4]);

    // Regular timer updates resume.
    room.run_for(600);
    assert!(count(&room, "esp_timer", "15:00") >= 2);
}

#[test]
fn client_reconnect_restores_control_topic_at_once() {
    let mut room = Room::new();
    room.broker.transport().drop_connection();
    assert_eq!(room.poll_broker(), Some(LinkChange::Lost));
    room.run_for(1_000);

    room.broker.transport().restore_connection();
    assert_eq!(room.poll_broker(), Some(LinkChange::Connected));
    assert_eq!(room.broker.transport().subscriptions().len(), 2);

    assert!(room.broker.transport().inject(b"start_game"));
    room.tick();
    assert_eq!(room.stage(), Stage::Wheels);
}

#[test]
fn link_blink_leaves_passcode_leds_alone() {
    let mut room = Room::new();
    room.command("start_game");
    room.command("wheels_solve");
    room.command("fuel_solve");
    room.tick();
    assert_eq!(room.stage(), Stage::Stars);

    room.type_keys("70");
    room.broker.transport().drop_connection();
    room.poll_broker();
    room.run_for(200);

    assert_eq!(
        progress_leds(&room),
        vec![COLOUR_PROGRESS, COLOUR_PROGRESS, COLOUR_OFF, COLOUR_OFF]
    );
}
