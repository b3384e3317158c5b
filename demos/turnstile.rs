//! Coin-operated Turnstile
//!
//! This example demonstrates the firing protocol on the classic turnstile.
//!
//! Key concepts:
//! - Guards that veto a firing based on the payload
//! - Entry/exit and will-fire/did-fire hooks and their order
//! - Rejected firings leave the machine untouched
//! - Snapshots for resuming a machine later
//!
//! Run with: cargo run --example turnstile

use turnstile::builder::{EventDef, MachineBuilder};
use turnstile::core::State;
use turnstile::machine::{FiringError, Machine};

const FARE: u32 = 50;

fn build() -> Machine<u32> {
    MachineBuilder::<u32>::new()
        .initial("Locked")
        .state(State::new("Locked").on_exit(|state, _| {
            println!("  [exit]  leaving {}", state.name());
            Ok(())
        }))
        .state(State::new("Unlocked").on_entry(|state, _| {
            println!("  [entry] arrived in {}", state.name());
            Ok(())
        }))
        .event(
            EventDef::new("coin")
                .transition(["Locked"], "Unlocked")
                .should_fire(|_, transition| transition.payload().is_some_and(|c| *c >= FARE))
                .will_fire(|_, transition| {
                    println!("  [will]  accepting {} cents", transition.payload().unwrap_or(&0));
                    Ok(())
                }),
        )
        .event(
            EventDef::new("push")
                .transition(["Unlocked"], "Locked")
                .did_fire(|event, transition| {
                    println!(
                        "  [did]   {} moved {} -> {}",
                        event.name(),
                        transition.source(),
                        transition.destination()
                    );
                    Ok(())
                }),
        )
        .build()
        .expect("turnstile configuration is valid")
}

fn report(result: Result<(), FiringError>) {
    match result {
        Ok(()) => {}
        Err(err) => println!("  rejected: {err}"),
    }
}

fn main() {
    println!("=== Turnstile State Machine ===\n");

    let machine = build();
    println!("Initial state: {}\n", machine.current_state());

    println!("Push while locked:");
    report(machine.fire_with("push", 0).map(drop));

    println!("\nInsert 20 cents:");
    report(machine.fire_with("coin", 20).map(drop));

    println!("\nInsert 50 cents:");
    report(machine.fire_with("coin", FARE).map(drop));

    println!("\nPush through:");
    report(machine.fire_with("push", 0).map(drop));

    println!("\nCurrent state: {}", machine.current_state());
    println!("Path: {}", machine.history().path().join(" -> "));

    let snapshot = machine.snapshot();
    match snapshot.to_json_pretty() {
        Ok(json) => println!("\nSnapshot:\n{json}"),
        Err(err) => println!("\nSnapshot failed: {err}"),
    }

    println!("\n=== Example Complete ===");
}
