//! Headless demo entry point
//!
//! Loads a tiny built-in catalog, plays one level to completion with
//! scripted clicks, and prints every event the session emits.

use glam::Vec2;
use unbolt::sim::Session;
use unbolt::{Catalog, GameConfig, ProgressSave};

const DEMO_CATALOG: &str = r#"{
    "levels": [{
        "stages": [{
            "holes": [
                { "position": [0.0, 0.0], "has_screw": true },
                { "position": [4.0, 0.0], "has_screw": true },
                { "position": [-4.0, 0.0], "has_screw": true },
                { "position": [6.0, 0.0] },
                { "position": [0.0, -3.0] },
                { "position": [2.0, -3.0] }
            ],
            "planks": [{
                "kind": "Size2",
                "layer": 0,
                "position": [0.5, 0.0],
                "screw_holes": [[-0.5, 0.0], [0.5, 0.0]]
            }]
        }]
    }]
}"#;

fn drain(session: &mut Session) {
    for event in session.drain_events() {
        println!("  event: {event:?}");
    }
}

fn main() {
    env_logger::init();
    log::info!("Unbolt demo starting");

    let catalog = match Catalog::from_json(DEMO_CATALOG) {
        Ok(catalog) => catalog,
        Err(err) => {
            log::error!("Demo catalog failed to parse: {err}");
            return;
        }
    };

    let mut session = Session::new(
        catalog,
        GameConfig::default(),
        ProgressSave::default(),
        0xC0FFEE,
    );

    println!("Loading level 0");
    session.load_level(0);
    drain(&mut session);

    // Relocate the pinning screw into the free hole; the plank falls and
    // the endgame puzzle begins
    println!("Moving the pinning screw");
    session.click_at(Vec2::new(0.0, 0.0));
    session.click_at(Vec2::new(6.0, 0.0));
    drain(&mut session);

    println!("Waiting for the question");
    session.tick(5.0);
    drain(&mut session);

    let Some(question) = session.puzzle().question().cloned() else {
        log::error!("Puzzle never produced a question");
        return;
    };
    println!("Question: {} (answer {})", question.text, question.answer);

    // Answer it: move the screw carrying each digit into the matching slot
    let digits = [(question.answer / 10) as u8, (question.answer % 10) as u8];
    for (index, digit) in digits.into_iter().enumerate() {
        let screw_pos = session
            .stage
            .screws
            .iter()
            .find(|s| s.number == Some(digit))
            .map(|s| s.position);
        let hole_pos = session
            .stage
            .holes
            .iter()
            .find(|h| h.puzzle_index == Some(index))
            .map(|h| h.position);
        if let (Some(screw_pos), Some(hole_pos)) = (screw_pos, hole_pos) {
            println!("Placing digit {digit} in slot {index}");
            session.click_at(screw_pos);
            session.click_at(hole_pos);
            drain(&mut session);
        }
    }

    let completed = session.save.max_reached_level_index > 0;
    println!(
        "Demo finished; level {}",
        if completed { "completed" } else { "not completed" }
    );
}
